//! Opaque id generation (spec §9 "Global state": "an opaque id
//! generator... replaceable by injection").
//!
//! `ContentPart::ToolCall.id` and stream text-region ids only need to
//! be unique within one parse, never persisted or compared across
//! parses, so a process-wide atomic counter would overshare state
//! between unrelated parser instances. Each parser instance owns its
//! own generator instead.

use std::sync::atomic::{AtomicU64, Ordering};

/// Generates ids unique within the lifetime of the owning parser
/// instance. Default implementation is a monotonic counter prefixed
/// with a short tag so ids stay visually distinguishable in logs.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

pub struct CounterIdGenerator {
    prefix: &'static str,
    counter: AtomicU64,
}

impl CounterIdGenerator {
    pub fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            counter: AtomicU64::new(0),
        }
    }
}

impl Default for CounterIdGenerator {
    fn default() -> Self {
        Self::new("call")
    }
}

impl IdGenerator for CounterIdGenerator {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}_{}", self.prefix, n)
    }
}

/// Alternative generator for hosts that want globally-unique ids (e.g.
/// ids forwarded into a shared event log rather than only compared
/// within one parse). Swappable for [`CounterIdGenerator`] without any
/// other code change, per spec.md's "replaceable by injection" note.
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_ordered() {
        let gen = CounterIdGenerator::new("call");
        let a = gen.next_id();
        let b = gen.next_id();
        assert_ne!(a, b);
        assert_eq!(a, "call_0");
        assert_eq!(b, "call_1");
    }

    #[test]
    fn uuid_generator_produces_unique_ids() {
        let gen = UuidIdGenerator;
        let a = gen.next_id();
        let b = gen.next_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }
}
