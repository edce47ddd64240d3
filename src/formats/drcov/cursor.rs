//! Byte cursor over a whole drcov log.
//!
//! The log mixes newline-terminated text sections with a packed binary
//! section, so the cursor hands out both lines and raw byte runs from the same
//! position. Everything borrows from the input; nothing is copied.

use memchr::memchr;

use crate::error::{DrcovError, Result, Stage};

#[derive(Debug, Clone)]
pub struct LogCursor<'a> {
    data: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> LogCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            line: 0,
        }
    }

    /// Byte offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// 0-based index of the next line `read_line` will return.
    pub fn line(&self) -> usize {
        self.line
    }

    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Consume one line, without its `\n` terminator.
    ///
    /// A final line lacking a terminator is still returned. `None` at end of
    /// input.
    pub fn read_line(&mut self) -> Option<&'a [u8]> {
        if self.is_eof() {
            return None;
        }
        let rest = self.remaining();
        let (line, consumed) = match memchr(b'\n', rest) {
            Some(idx) => (&rest[..idx], idx + 1),
            None => (rest, rest.len()),
        };
        self.pos += consumed;
        self.line += 1;
        Some(line)
    }

    /// Look at the next `len` bytes without consuming them.
    pub fn peek(&self, len: usize) -> Option<&'a [u8]> {
        self.remaining().get(..len)
    }

    /// Consume exactly `len` bytes, or nothing if fewer remain.
    pub fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        let bytes = self.peek(len)?;
        self.pos += len;
        Some(bytes)
    }

    /// Consume one line as trimmed UTF-8 text, returning it with its line index.
    pub fn text_line(&mut self, stage: Stage) -> Result<(usize, &'a str)> {
        let index = self.line;
        let raw = self.read_line().ok_or(DrcovError::UnexpectedEof {
            stage,
            line: index,
        })?;
        let text = std::str::from_utf8(raw).map_err(|e| {
            DrcovError::malformed(
                stage,
                index,
                String::from_utf8_lossy(raw),
                format!("line is not valid UTF-8: {e}"),
            )
        })?;
        Ok((index, text.trim()))
    }
}
