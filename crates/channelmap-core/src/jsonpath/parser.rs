//! Path expression parser
//!
//! Grammar:
//!
//! ```text
//! path    := root | root? chain
//! root    := "$"
//! chain   := (key | "[" index "]") ( "." key | "[" index "]" )*    -- after "$", a chain starts with "." or "["
//! key     := one or more characters other than '.', '[' and ']'
//! index   := one or more ASCII digits
//! ```
//!
//! Copyright (c) 2025 Channelmap Team
//! Licensed under the Apache-2.0 license

use super::ast::{PathExpr, Segment};
use super::error::PathError;
use std::iter::Peekable;
use std::str::CharIndices;

/// Single-pass parser for path expressions
pub struct Parser<'a> {
    /// Input string being parsed
    input: &'a str,
    /// Character iterator with byte offsets
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given input
    pub fn new(input: &'a str) -> Result<Self, PathError> {
        if input.trim().is_empty() {
            return Err(PathError::Empty);
        }

        Ok(Self {
            input,
            chars: input.char_indices().peekable(),
        })
    }

    /// Parse the expression into a [`PathExpr`]
    pub fn parse(mut self) -> Result<PathExpr, PathError> {
        let mut segments = Vec::new();

        if self.peek() == Some('$') {
            self.advance();
            match self.peek() {
                None => return Ok(PathExpr::new(segments)),
                Some('.') => {
                    self.advance();
                    segments.push(self.parse_key()?);
                }
                Some('[') => {}
                Some(_) => {
                    return Err(self.unexpected(
                        "Unexpected character after root",
                        &[".", "["],
                    ))
                }
            }
        } else if self.peek() != Some('[') {
            segments.push(self.parse_key()?);
        }

        while let Some(ch) = self.peek() {
            match ch {
                '.' => {
                    self.advance();
                    segments.push(self.parse_key()?);
                }
                '[' => {
                    self.advance();
                    segments.push(self.parse_index()?);
                }
                _ => return Err(self.unexpected("Unexpected character", &[".", "["])),
            }
        }

        Ok(PathExpr::new(segments))
    }

    /// Parse an object key up to the next delimiter
    fn parse_key(&mut self) -> Result<Segment, PathError> {
        let mut key = String::new();
        while let Some(ch) = self.peek() {
            if matches!(ch, '.' | '[' | ']') {
                break;
            }
            key.push(ch);
            self.advance();
        }

        if key.is_empty() {
            return Err(self.unexpected("Empty key", &["key"]));
        }

        Ok(Segment::Key(key))
    }

    /// Parse `digits]` after an opening bracket
    fn parse_index(&mut self) -> Result<Segment, PathError> {
        let start = self.position();
        let mut digits = String::new();
        while let Some(ch) = self.peek() {
            if !ch.is_ascii_digit() {
                break;
            }
            digits.push(ch);
            self.advance();
        }

        if digits.is_empty() {
            return Err(self.unexpected("Expected array index", &["digit"]));
        }

        if self.peek() != Some(']') {
            return Err(self.unexpected("Unclosed index", &["]"]));
        }
        self.advance();

        digits
            .parse::<usize>()
            .map(Segment::Index)
            .map_err(|_| PathError::IndexOverflow {
                digits,
                position: start,
            })
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, ch)| ch)
    }

    fn advance(&mut self) {
        self.chars.next();
    }

    /// Byte offset of the next character, or the input length at the end
    fn position(&mut self) -> usize {
        self.chars
            .peek()
            .map(|&(offset, _)| offset)
            .unwrap_or(self.input.len())
    }

    fn unexpected(&mut self, message: &str, expected: &[&str]) -> PathError {
        let found = self
            .peek()
            .map(|ch| ch.to_string())
            .unwrap_or_else(|| "end of input".to_string());
        PathError::syntax(
            message,
            self.position(),
            self.input,
            expected.iter().map(|s| s.to_string()).collect(),
            found,
        )
    }
}
