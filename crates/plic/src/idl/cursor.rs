// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read/write cursors for the type package primitive encodings.
//!
//! Integers are 4-byte fields in one of two forms:
//!
//! - **packed**: all four bytes have the high bit set; the value is
//!   `(b3&0x7f) + ((b2&0x7f)>>1) + ((b1&0x7f)>>2) + ((b0&0x7f)>>3)`
//! - **ASCII**: `b0` is a digit, `.` or `\n`; every digit byte of the four
//!   accumulates as a decimal digit and every other byte is skipped
//!
//! Strings are an integer length followed by the payload padded to a
//! 4-byte boundary. Decoded strings are [`StringRef`]s into the buffer;
//! nothing is copied.

use super::{IdlError, IdlResult};
use crate::config::{ASCII_INT_MAX, INT_FIELD_SIZE, PACKED_INT_MAX, STRING_ALIGNMENT};

/// Round `n` up to the string alignment.
#[inline]
#[must_use]
pub const fn ceil4(n: usize) -> usize {
    (n + (STRING_ALIGNMENT - 1)) & !(STRING_ALIGNMENT - 1)
}

fn truncated(offset: usize, needed: usize, buf: &[u8]) -> IdlError {
    IdlError::Truncated {
        offset,
        needed,
        available: buf.len().saturating_sub(offset),
    }
}

/// Decode one 4-byte integer at `pos`, returning the value and the position
/// after it.
pub fn parse_int(buf: &[u8], pos: usize) -> IdlResult<(u32, usize)> {
    let end = pos
        .checked_add(INT_FIELD_SIZE)
        .filter(|&end| end <= buf.len())
        .ok_or_else(|| truncated(pos, INT_FIELD_SIZE, buf))?;
    let b = &buf[pos..end];

    if b.iter().all(|&byte| byte >= 0x80) {
        let value = u32::from(b[3] & 0x7f)
            + u32::from((b[2] & 0x7f) >> 1)
            + u32::from((b[1] & 0x7f) >> 2)
            + u32::from((b[0] & 0x7f) >> 3);
        return Ok((value, end));
    }

    if b[0].is_ascii_digit() || b[0] == b'.' || b[0] == b'\n' {
        // Non-digit bytes are skipped wherever they sit ("1 2 " reads as 12).
        let value = b
            .iter()
            .filter(|byte| byte.is_ascii_digit())
            .fold(0u32, |acc, &byte| acc * 10 + u32::from(byte - b'0'));
        return Ok((value, end));
    }

    Err(IdlError::InvalidInteger { offset: pos })
}

/// Zero-copy reference to a string payload inside a package buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StringRef {
    /// Payload start, relative to the buffer it was parsed from.
    pub offset: usize,
    /// Payload length without padding.
    pub len: usize,
}

impl StringRef {
    /// Payload bytes inside `buf`.
    ///
    /// # Panics
    ///
    /// Panics if `buf` is not the buffer this reference was parsed from.
    #[must_use]
    pub fn bytes<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        &buf[self.offset..self.offset + self.len]
    }

    /// Payload as UTF-8.
    pub fn as_str<'a>(&self, buf: &'a [u8]) -> IdlResult<&'a str> {
        std::str::from_utf8(self.bytes(buf)).map_err(|_| IdlError::InvalidUtf8 {
            offset: self.offset,
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Decode one length-prefixed string at `pos`, returning the reference and
/// the position after its padding.
pub fn parse_string(buf: &[u8], pos: usize) -> IdlResult<(StringRef, usize)> {
    let (len, start) = parse_int(buf, pos)?;
    let len = len as usize;
    let padded = ceil4(len);
    let end = start
        .checked_add(padded)
        .filter(|&end| end <= buf.len())
        .ok_or_else(|| truncated(start, padded, buf))?;
    Ok((StringRef { offset: start, len }, end))
}

/// Encode `value` in the ASCII form (four zero-padded decimal digits).
pub fn encode_ascii_int(value: u32) -> IdlResult<[u8; 4]> {
    if value > ASCII_INT_MAX {
        return Err(IdlError::ValueTooLarge {
            value: u64::from(value),
        });
    }
    let mut out = [b'0'; 4];
    let mut rest = value;
    for byte in out.iter_mut().rev() {
        *byte = b'0' + (rest % 10) as u8;
        rest /= 10;
    }
    Ok(out)
}

/// Encode `value` in the packed form, the exact inverse of the decoder
/// formula for every value up to `PACKED_INT_MAX`.
pub fn encode_packed_int(value: u32) -> IdlResult<[u8; 4]> {
    if value > PACKED_INT_MAX {
        return Err(IdlError::ValueTooLarge {
            value: u64::from(value),
        });
    }
    let mut rest = value;
    let mut take = |cap: u32| {
        let part = rest.min(cap);
        rest -= part;
        part as u8
    };
    let c3 = take(0x7f);
    let c2 = take(0x3f);
    let c1 = take(0x1f);
    let c0 = take(0x0f);
    Ok([0x80 | (c0 << 3), 0x80 | (c1 << 2), 0x80 | (c2 << 1), 0x80 | c3])
}

/// Encode a length-prefixed, 4-byte padded string.
pub fn encode_string(s: &str) -> IdlResult<Vec<u8>> {
    let mut writer = Writer::new();
    writer.write_string(s)?;
    Ok(writer.into_inner())
}

/// Immutable cursor for reading (bounds-checked, zero-copy)
pub struct Cursor<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    pub fn at(buffer: &'a [u8], offset: usize) -> Self {
        Self { buffer, offset }
    }

    pub fn read_int(&mut self) -> IdlResult<u32> {
        let (value, next) = parse_int(self.buffer, self.offset)?;
        self.offset = next;
        Ok(value)
    }

    pub fn read_string_ref(&mut self) -> IdlResult<StringRef> {
        let (string, next) = parse_string(self.buffer, self.offset)?;
        self.offset = next;
        Ok(string)
    }

    /// Read a string and check it is UTF-8.
    pub fn read_str(&mut self) -> IdlResult<&'a str> {
        let string = self.read_string_ref()?;
        string.as_str(self.buffer)
    }

    /// Read a string payload as raw bytes.
    pub fn read_blob(&mut self) -> IdlResult<&'a [u8]> {
        let string = self.read_string_ref()?;
        Ok(string.bytes(self.buffer))
    }

    pub fn read_bytes(&mut self, len: usize) -> IdlResult<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.buffer.len())
            .ok_or_else(|| truncated(self.offset, len, self.buffer))?;
        let slice = &self.buffer[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    /// Everything after the current offset.
    pub fn rest(&self) -> &'a [u8] {
        &self.buffer[self.offset.min(self.buffer.len())..]
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }
}

/// Append-only writer producing the package encodings.
///
/// Integers are written in the ASCII form unless `write_packed_int` is used.
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buffer: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_int(&mut self, value: u32) -> IdlResult<()> {
        self.buffer.extend_from_slice(&encode_ascii_int(value)?);
        Ok(())
    }

    pub fn write_len(&mut self, len: usize) -> IdlResult<()> {
        let value = u32::try_from(len).map_err(|_| IdlError::ValueTooLarge { value: len as u64 })?;
        self.write_int(value)
    }

    pub fn write_packed_int(&mut self, value: u32) -> IdlResult<()> {
        self.buffer.extend_from_slice(&encode_packed_int(value)?);
        Ok(())
    }

    pub fn write_string(&mut self, s: &str) -> IdlResult<()> {
        self.write_blob(s.as_bytes())
    }

    /// Length-prefixed, padded raw payload.
    pub fn write_blob(&mut self, data: &[u8]) -> IdlResult<()> {
        self.write_len(data.len())?;
        self.buffer.extend_from_slice(data);
        self.buffer.resize(self.buffer.len() + ceil4(data.len()) - data.len(), 0);
        Ok(())
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}
