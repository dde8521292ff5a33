//! File reader

use std::{
    io::{Error, ErrorKind, Result},
    iter::Peekable,
};

/// A peekable iterator for bytes that records line and column information.
pub struct Input<'a> {
    /// The source of the input data
    source: Peekable<Box<dyn Iterator<Item = u8> + 'a>>,
    /// The current line number
    line: usize,
    /// The current column
    column: usize,
}

impl<'a> Input<'a> {
    /// Create a new `Input` from some source
    pub fn new(source: Box<dyn Iterator<Item = u8> + 'a>) -> Self {
        Input {
            source: source.peekable(),
            line: 1,
            column: 1,
        }
    }
    /// Read from an in-memory buffer.
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Input::new(Box::new(bytes.iter().cloned()))
    }
    /// Look at the next byte without consuming it
    pub fn peek(&mut self) -> Option<u8> {
        self.source.peek().cloned()
    }
    /// The line of the next byte.
    pub fn line(&self) -> usize {
        self.line
    }
    /// Create an io::Error with the given message and position information.
    pub fn error(&self, why: &str) -> Error {
        Error::new(
            ErrorKind::InvalidData,
            format!("{} at line {} column {}", why, self.line, self.column),
        )
    }
    /// Create an io::Error about a whole line.
    pub fn error_in_line(why: &str, line: usize) -> Error {
        Error::new(ErrorKind::InvalidData, format!("{} in line {}", why, line))
    }

    /// Parse a decimal number with an optional leading minus.
    ///
    /// Fails if there is no digit, or if the number does not lie within the
    /// range [-i64::MAX , i64::MAX].
    pub fn parse_dec64(&mut self) -> Result<i64> {
        let sign = self.peek() == Some(b'-');
        if sign {
            self.next();
        }
        if !self.peek().map_or(false, Self::is_digit) {
            return Err(self.error(Self::NUMBER));
        }
        let mut value: i64 = 0;
        while let Some(c) = self.peek() {
            if !Self::is_digit(c) {
                break;
            }
            value = value
                .checked_mul(10)
                .and_then(|val| val.checked_add(i64::from(c - b'0')))
                .ok_or_else(|| self.error(Self::OVERFLOW))?;
            self.next();
        }
        Ok(if sign { -value } else { value })
    }

    /// Like parse_dec64, but fails if the number does not fit an i32.
    pub fn parse_dec32(&mut self) -> Result<i32> {
        let value = self.parse_dec64()?;
        if value.abs() > i64::from(i32::max_value()) {
            return Err(self.error(Self::OVERFLOW));
        }
        Ok(value as i32)
    }

    /// Parse a whole word as decimal number with an optional leading minus.
    ///
    /// Surrounding whitespace is allowed, anything else (including a plus
    /// sign) is not.
    pub fn parse_signed(text: &str) -> Option<i64> {
        let text = text.trim();
        let digits = text.strip_prefix('-').unwrap_or(text);
        if digits.is_empty() || !digits.bytes().all(Self::is_digit) {
            return None;
        }
        text.parse().ok()
    }

    /// Parse zero or more spaces or linebreaks.
    pub fn skip_any_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !Self::is_space(c) {
                break;
            }
            self.next();
        }
    }

    /// Skips whitespace, and returns an error if neither space nor EOF was parsed.
    pub fn skip_some_whitespace(&mut self) -> Result<()> {
        if let Some(c) = self.peek() {
            if !Self::is_space(c) {
                return Err(self.error(Self::SPACE));
            }
        }
        self.skip_any_whitespace();
        Ok(())
    }

    /// Consume the longest run of non-whitespace bytes.
    pub fn parse_word(&mut self) -> Vec<u8> {
        let mut word = Vec::new();
        while let Some(c) = self.peek() {
            if Self::is_space(c) {
                break;
            }
            word.push(c);
            self.next();
        }
        word
    }

    /// Consume exactly `expected`, or fail with `why`.
    pub fn expect(&mut self, expected: &[u8], why: &str) -> Result<()> {
        for &byte in expected {
            if self.peek() != Some(byte) {
                return Err(self.error(why));
            }
            self.next();
        }
        Ok(())
    }

    /// Consume the rest of the current line including the newline.
    ///
    /// Returns the line without the line terminator, or None at end of file.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        if self.peek().is_none() {
            return Ok(None);
        }
        let line = self.line;
        let mut bytes = Vec::new();
        while let Some(c) = self.next() {
            if c == b'\n' {
                break;
            }
            bytes.push(c);
        }
        if bytes.last() == Some(&b'\r') {
            bytes.pop();
        }
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| Self::error_in_line(Self::UTF8, line))
    }

    // Error messages.
    /// A numeric overflow. This should only happen for user input.
    pub const OVERFLOW: &'static str = "overflow while parsing number";
    /// Parser error ("unexpected EOF")
    pub const EOF: &'static str = "premature end of file";
    /// Parser error (`expected ...`)
    pub const NUMBER: &'static str = "expected number";
    /// Parser error (`expected ...`)
    pub const SPACE: &'static str = "expected space";
    /// Parser error (`expected ...`)
    pub const CNF: &'static str = "expected \"cnf\"";
    /// Parser error (`expected ...`)
    pub const SECTION: &'static str = "expected section header";
    /// Parser error (`expected ...`)
    pub const UTF8: &'static str = "expected UTF-8 text";

    /// Check if a character is a decimal digit.
    pub fn is_digit(value: u8) -> bool {
        value >= b'0' && value <= b'9'
    }

    /// Check if a character is a decimal digit or a dash.
    pub fn is_digit_or_dash(value: u8) -> bool {
        Self::is_digit(value) || value == b'-'
    }

    /// Returns true if the character is one of the whitespace characters we allow.
    pub fn is_space(c: u8) -> bool {
        [b' ', b'\t', b'\n', b'\r'].iter().any(|&s| s == c)
    }
}

impl Iterator for Input<'_> {
    type Item = u8;
    fn next(&mut self) -> Option<u8> {
        self.source.next().map(|c| {
            if c == b'\n' {
                self.line += 1;
                self.column = 0;
            }
            self.column += 1;
            c
        })
    }
}
