//! Recursive-descent parser over the relaxed-JSON token stream.

use serde_json::{Map, Number, Value};
use std::fmt;

use super::lexer::{Lexer, SpannedToken, Token};

/// How strictly the reader accepts non-standard JSON syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Reject anything outside strict JSON.
    Strict,
    /// Accept unquoted keys, single quotes, trailing commas, comments.
    #[default]
    Relaxed,
    /// Like `Relaxed`, but collects warnings instead of failing on
    /// recoverable oddities (e.g. a duplicate key) and keeps going.
    Tolerant,
}

/// What happens when an object literal repeats a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeyPolicy {
    #[default]
    LastWins,
    Reject,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub message: String,
    pub line: usize,
    pub warnings: Vec<String>,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for SyntaxError {}

pub struct ReaderOptions {
    pub mode: Mode,
    pub duplicate_keys: DuplicateKeyPolicy,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Relaxed,
            duplicate_keys: DuplicateKeyPolicy::LastWins,
        }
    }
}

pub struct Parsed {
    pub value: Value,
    pub warnings: Vec<String>,
}

/// Parse `src` per `options`, returning the value plus any accumulated
/// warnings (always empty outside `Mode::Tolerant`).
pub fn parse(src: &str, options: &ReaderOptions) -> Result<Parsed, SyntaxError> {
    let mut lexer = Lexer::new(src);
    let mut tokens = Vec::new();
    loop {
        match lexer.next_token() {
            Ok(Some(t)) => tokens.push(t),
            Ok(None) => break,
            Err(message) => {
                return Err(SyntaxError {
                    message,
                    line: lexer.line,
                    warnings: lexer.warnings.clone(),
                })
            }
        }
    }

    let mut parser = TokenParser {
        tokens,
        pos: 0,
        options,
        warnings: lexer.warnings,
    };
    let value = parser.parse_value()?;
    parser.skip_trailing()?;
    Ok(Parsed {
        value,
        warnings: parser.warnings,
    })
}

struct TokenParser<'o> {
    tokens: Vec<SpannedToken>,
    pos: usize,
    options: &'o ReaderOptions,
    warnings: Vec<String>,
}

impl<'o> TokenParser<'o> {
    fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<SpannedToken> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }

    fn err(&self, message: impl Into<String>) -> SyntaxError {
        let line = self.peek().map(|t| t.line).unwrap_or(0);
        SyntaxError {
            message: message.into(),
            line,
            warnings: self.warnings.clone(),
        }
    }

    fn skip_trailing(&mut self) -> Result<(), SyntaxError> {
        if self.pos != self.tokens.len() {
            return Err(self.err("unexpected trailing content"));
        }
        Ok(())
    }

    fn parse_value(&mut self) -> Result<Value, SyntaxError> {
        let tok = self
            .bump()
            .ok_or_else(|| self.err("unexpected end of input"))?;
        match tok.token {
            Token::LBrace => self.parse_object(),
            Token::LBracket => self.parse_array(),
            Token::String(s) => Ok(Value::String(s)),
            Token::Number(n) => Ok(num_to_value(n)),
            Token::True => Ok(Value::Bool(true)),
            Token::False => Ok(Value::Bool(false)),
            Token::Null => Ok(Value::Null),
            Token::Ident(i) => Err(self.err(format!("unexpected identifier '{}'", i))),
            other => Err(self.err(format!("unexpected token {:?}", other))),
        }
    }

    fn parse_object(&mut self) -> Result<Value, SyntaxError> {
        let mut map = Map::new();
        loop {
            match self.peek().map(|t| t.token.clone()) {
                Some(Token::RBrace) => {
                    self.bump();
                    break;
                }
                None => return Err(self.err("unterminated object")),
                _ => {}
            }

            let key = self.parse_key()?;

            let colon = self.bump();
            if !matches!(colon.map(|t| t.token), Some(Token::Colon)) {
                return Err(self.err("expected ':' after object key"));
            }

            let value = self.parse_value()?;

            if map.contains_key(&key) {
                match self.options.duplicate_keys {
                    DuplicateKeyPolicy::Reject => {
                        return Err(self.err(format!("duplicate key '{}'", key)));
                    }
                    DuplicateKeyPolicy::LastWins => {
                        if self.options.mode == Mode::Tolerant {
                            self.warnings.push(format!("duplicate key '{}', last wins", key));
                        }
                    }
                }
            }
            map.insert(key, value);

            match self.peek().map(|t| t.token.clone()) {
                Some(Token::Comma) => {
                    self.bump();
                    if matches!(self.peek().map(|t| t.token.clone()), Some(Token::RBrace)) {
                        if self.options.mode == Mode::Strict {
                            return Err(self.err("trailing comma not allowed in strict mode"));
                        }
                        self.bump();
                        break;
                    }
                }
                Some(Token::RBrace) => {
                    self.bump();
                    break;
                }
                _ => return Err(self.err("expected ',' or '}' in object")),
            }
        }
        Ok(Value::Object(map))
    }

    fn parse_key(&mut self) -> Result<String, SyntaxError> {
        let tok = self.bump().ok_or_else(|| self.err("expected object key"))?;
        match tok.token {
            Token::String(s) => Ok(s),
            Token::Ident(i) => {
                if self.options.mode == Mode::Strict {
                    return Err(self.err("unquoted keys not allowed in strict mode"));
                }
                Ok(i)
            }
            other => Err(self.err(format!("expected object key, found {:?}", other))),
        }
    }

    fn parse_array(&mut self) -> Result<Value, SyntaxError> {
        let mut items = Vec::new();
        loop {
            match self.peek().map(|t| t.token.clone()) {
                Some(Token::RBracket) => {
                    self.bump();
                    break;
                }
                None => return Err(self.err("unterminated array")),
                _ => {}
            }

            items.push(self.parse_value()?);

            match self.peek().map(|t| t.token.clone()) {
                Some(Token::Comma) => {
                    self.bump();
                    if matches!(self.peek().map(|t| t.token.clone()), Some(Token::RBracket)) {
                        if self.options.mode == Mode::Strict {
                            return Err(self.err("trailing comma not allowed in strict mode"));
                        }
                        self.bump();
                        break;
                    }
                }
                Some(Token::RBracket) => {
                    self.bump();
                    break;
                }
                _ => return Err(self.err("expected ',' or ']' in array")),
            }
        }
        Ok(Value::Array(items))
    }
}

fn num_to_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}
