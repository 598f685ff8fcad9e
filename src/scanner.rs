//! Scanner primitives for GBNF source text
//!
//! A byte cursor over the source. End of input (and any embedded NUL byte)
//! reads as `0`, so every loop over the remaining input can test a single
//! sentinel and no read ever passes the end of the buffer.
//!
//! UTF-8 decoding assumes well-formed input but guards against overrun: a
//! sequence truncated by end of input decodes to a truncated value rather
//! than an error. Payloads are therefore `u32` codepoints, not `char`.

use crate::error::{GrammarError, Result};

/// Byte length of a UTF-8 sequence, keyed by the top nibble of its lead byte
const UTF8_LEN: [usize; 16] = [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 3, 4];

/// ASCII decimal digit
pub(crate) fn is_digit_char(c: u8) -> bool {
    c.is_ascii_digit()
}

/// Character allowed in a rule name: `[A-Za-z0-9_-]`
///
/// Underscore is included so synthesized rule names (`<base>_<id>`)
/// survive a print-and-recompile round trip.
pub(crate) fn is_word_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_'
}

/// Byte cursor over GBNF source text
pub(crate) struct Scanner<'a> {
    src: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    /// Create a scanner at the start of `text`
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            src: text.as_bytes(),
            pos: 0,
        }
    }

    /// Create a scanner over raw bytes, to exercise the overrun guard
    #[cfg(test)]
    pub(crate) fn from_bytes(src: &'a [u8]) -> Self {
        Self { src, pos: 0 }
    }

    /// Current byte offset
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    /// Byte at the cursor, or `0` at end of input
    pub(crate) fn peek(&self) -> u8 {
        self.src.get(self.pos).copied().unwrap_or(0)
    }

    /// Byte at `offset` past the cursor, or `0` past end of input
    pub(crate) fn peek_at(&self, offset: usize) -> u8 {
        self.src.get(self.pos + offset).copied().unwrap_or(0)
    }

    /// Advance the cursor one byte
    pub(crate) fn bump(&mut self) {
        self.pos += 1;
    }

    /// True once the cursor reads the end sentinel
    pub(crate) fn at_end(&self) -> bool {
        self.peek() == 0
    }

    /// Decode one UTF-8 sequence at the cursor
    ///
    /// The lead byte's top nibble selects a declared length of 1–4 bytes;
    /// continuation bytes contribute 6 bits each. Decoding stops early if
    /// the end sentinel appears before the declared length is consumed.
    /// The caller must ensure the cursor is not at end of input.
    pub(crate) fn decode_utf8(&mut self) -> u32 {
        let first = self.peek();
        let len = UTF8_LEN[usize::from(first >> 4)];
        let mut value = u32::from(first) & ((1 << (8 - len)) - 1);
        let end = self.pos + len;
        self.pos += 1;
        while self.pos < end && self.peek() != 0 {
            value = (value << 6) + u32::from(self.peek() & 0x3F);
            self.pos += 1;
        }
        value
    }

    /// Consume exactly `want` case-insensitive hex digits
    pub(crate) fn parse_hex(&mut self, want: usize) -> Result<u32> {
        let start = self.pos;
        let end = self.pos + want;
        let mut value: u32 = 0;
        while self.pos < end {
            let digit = match self.peek() {
                c @ b'0'..=b'9' => u32::from(c - b'0'),
                c @ b'a'..=b'f' => u32::from(c - b'a' + 10),
                c @ b'A'..=b'F' => u32::from(c - b'A' + 10),
                _ => break,
            };
            value = (value << 4) + digit;
            self.pos += 1;
        }
        if self.pos != end {
            return Err(GrammarError::MalformedEscape { want, pos: start });
        }
        Ok(value)
    }

    /// Skip spaces, tabs, and `#` line comments; CR/LF only when `newline_ok`
    pub(crate) fn skip_space(&mut self, newline_ok: bool) {
        loop {
            match self.peek() {
                b' ' | b'\t' => self.bump(),
                b'#' => {
                    while !matches!(self.peek(), 0 | b'\r' | b'\n') {
                        self.bump();
                    }
                }
                b'\r' | b'\n' if newline_ok => self.bump(),
                _ => break,
            }
        }
    }

    /// Consume a maximal run of word characters
    pub(crate) fn parse_name(&mut self) -> Result<&'a str> {
        let start = self.pos;
        while is_word_char(self.peek()) {
            self.bump();
        }
        if self.pos == start {
            return Err(GrammarError::ExpectedToken {
                expected: "name",
                pos: start,
            });
        }
        // word chars are ASCII, so the slice is always valid UTF-8
        std::str::from_utf8(&self.src[start..self.pos]).map_err(|_| {
            GrammarError::ExpectedToken {
                expected: "name",
                pos: start,
            }
        })
    }

    /// Consume a maximal run of decimal digits as a `u32`
    ///
    /// Overflow reports `ExpectedToken`, matching the original's behavior
    /// of catching the conversion failure at the same boundary.
    pub(crate) fn parse_int(&mut self) -> Result<u32> {
        let start = self.pos;
        while is_digit_char(self.peek()) {
            self.bump();
        }
        if self.pos == start {
            return Err(GrammarError::ExpectedToken {
                expected: "integer",
                pos: start,
            });
        }
        std::str::from_utf8(&self.src[start..self.pos])
            .ok()
            .and_then(|digits| digits.parse().ok())
            .ok_or(GrammarError::ExpectedToken {
                expected: "integer",
                pos: start,
            })
    }

    /// Decode one grammar character: an escape form or a raw codepoint
    ///
    /// Recognized escapes: `\xHH`, `\uHHHH`, `\UHHHHHHHH`, `\t`, `\r`,
    /// `\n`, and the literal escapes `\\`, `\"`, `\[`, `\]`.
    pub(crate) fn parse_char(&mut self) -> Result<u32> {
        if self.peek() == b'\\' {
            let escape_pos = self.pos;
            let value = match self.peek_at(1) {
                b'x' => {
                    self.pos += 2;
                    return self.parse_hex(2);
                }
                b'u' => {
                    self.pos += 2;
                    return self.parse_hex(4);
                }
                b'U' => {
                    self.pos += 2;
                    return self.parse_hex(8);
                }
                b't' => u32::from(b'\t'),
                b'r' => u32::from(b'\r'),
                b'n' => u32::from(b'\n'),
                c @ (b'\\' | b'"' | b'[' | b']') => u32::from(c),
                _ => return Err(GrammarError::UnknownEscape { pos: escape_pos }),
            };
            self.pos += 2;
            Ok(value)
        } else if self.peek() != 0 {
            Ok(self.decode_utf8())
        } else {
            Err(GrammarError::UnexpectedEnd)
        }
    }
}
