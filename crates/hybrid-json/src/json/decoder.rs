//! `JsonDecoder`: parses RFC 8259 JSON text into a [`Value`].
//!
//! Arrays become tables keyed `1..N`; objects become tables keyed by member
//! name in source order. Numbers are always `f64`.

use super::error::DecodeError;
use super::util::{is_whitespace, scan_string};
use super::DEFAULT_MAX_DEPTH;
use crate::value::{Key, Table, Value};

/// Options controlling decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Maximum number of nested arrays/objects.
    pub max_depth: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

pub struct JsonDecoder {
    pub data: Vec<u8>,
    pub x: usize,
    pub options: DecoderOptions,
}

impl Default for JsonDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonDecoder {
    pub fn new() -> Self {
        Self::with_options(DecoderOptions::default())
    }

    pub fn with_options(options: DecoderOptions) -> Self {
        Self {
            data: Vec::new(),
            x: 0,
            options,
        }
    }

    /// Decodes a complete JSON document. Trailing non-whitespace is an error.
    pub fn decode(&mut self, input: &[u8]) -> Result<Value, DecodeError> {
        if let Err(e) = std::str::from_utf8(input) {
            return Err(DecodeError::InvalidUtf8 {
                position: e.valid_up_to(),
            });
        }
        self.data.clear();
        self.data.extend_from_slice(input);
        self.x = 0;
        let value = self.read_any(0)?;
        self.skip_whitespace();
        if self.x != self.data.len() {
            return Err(DecodeError::at(self.x));
        }
        Ok(value)
    }

    pub fn decode_str(&mut self, input: &str) -> Result<Value, DecodeError> {
        self.decode(input.as_bytes())
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.x).copied()
    }

    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            self.x += 1;
        }
    }

    /// Reads one value. `depth` is the number of enclosing containers.
    pub fn read_any(&mut self, depth: usize) -> Result<Value, DecodeError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'"') => Ok(Value::Str(self.read_str()?)),
            Some(b'[') => self.read_arr(depth),
            Some(b'{') => self.read_obj(depth),
            Some(b'n') => self.read_literal(b"null", Value::Null),
            Some(b't') => self.read_literal(b"true", Value::Bool(true)),
            Some(b'f') => self.read_literal(b"false", Value::Bool(false)),
            Some(b'-' | b'0'..=b'9') => self.read_num(),
            _ => Err(DecodeError::at(self.x)),
        }
    }

    fn read_literal(&mut self, word: &[u8], value: Value) -> Result<Value, DecodeError> {
        if !self.data[self.x..].starts_with(word) {
            return Err(DecodeError::at(self.x));
        }
        self.x += word.len();
        Ok(value)
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.x;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.x += 1;
        }
        self.x - start
    }

    pub fn read_num(&mut self) -> Result<Value, DecodeError> {
        let start = self.x;
        if self.peek() == Some(b'-') {
            self.x += 1;
        }
        match self.peek() {
            Some(b'0') => self.x += 1,
            Some(b'1'..=b'9') => {
                self.skip_digits();
            }
            _ => return Err(DecodeError::at(self.x)),
        }
        if self.peek() == Some(b'.') {
            self.x += 1;
            if self.skip_digits() == 0 {
                return Err(DecodeError::at(self.x));
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.x += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.x += 1;
            }
            if self.skip_digits() == 0 {
                return Err(DecodeError::at(self.x));
            }
        }
        // The scanned range is ASCII, so this cannot fail.
        let text = std::str::from_utf8(&self.data[start..self.x])
            .map_err(|_| DecodeError::InvalidUtf8 { position: start })?;
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Value::Number(n)),
            _ => Err(DecodeError::at(start)),
        }
    }

    pub fn read_str(&mut self) -> Result<String, DecodeError> {
        let start = self.x;
        if self.peek() != Some(b'"') {
            return Err(DecodeError::at(start));
        }
        let (end, escaped) = scan_string(&self.data, start + 1)?;
        let s = if escaped {
            // serde_json validates escapes and joins surrogate pairs.
            serde_json::from_slice::<String>(&self.data[start..=end])
                .map_err(|_| DecodeError::at(start))?
        } else {
            std::str::from_utf8(&self.data[start + 1..end])
                .map_err(|e| DecodeError::InvalidUtf8 {
                    position: start + 1 + e.valid_up_to(),
                })?
                .to_owned()
        };
        self.x = end + 1;
        Ok(s)
    }

    fn enter(&self, depth: usize) -> Result<(), DecodeError> {
        if depth >= self.options.max_depth {
            return Err(DecodeError::DepthLimitExceeded {
                position: self.x,
                limit: self.options.max_depth,
            });
        }
        Ok(())
    }

    pub fn read_arr(&mut self, depth: usize) -> Result<Value, DecodeError> {
        self.enter(depth)?;
        self.x += 1;
        let table = Table::new();
        self.skip_whitespace();
        if self.peek() == Some(b']') {
            self.x += 1;
            return Ok(Value::Table(table));
        }
        loop {
            table.push(self.read_any(depth + 1)?);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.x += 1,
                Some(b']') => {
                    self.x += 1;
                    return Ok(Value::Table(table));
                }
                _ => return Err(DecodeError::at(self.x)),
            }
        }
    }

    pub fn read_obj(&mut self, depth: usize) -> Result<Value, DecodeError> {
        self.enter(depth)?;
        self.x += 1;
        let table = Table::new();
        self.skip_whitespace();
        if self.peek() == Some(b'}') {
            self.x += 1;
            return Ok(Value::Table(table));
        }
        loop {
            self.skip_whitespace();
            let key = self.read_str()?;
            self.skip_whitespace();
            if self.peek() != Some(b':') {
                return Err(DecodeError::at(self.x));
            }
            self.x += 1;
            let value = self.read_any(depth + 1)?;
            table.set(Key::Name(key), value);
            self.skip_whitespace();
            match self.peek() {
                Some(b',') => self.x += 1,
                Some(b'}') => {
                    self.x += 1;
                    return Ok(Value::Table(table));
                }
                _ => return Err(DecodeError::at(self.x)),
            }
        }
    }
}
