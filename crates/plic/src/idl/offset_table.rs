// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Offset tables: `count`, `count` relative offsets, a tail offset, then the
//! entries themselves.
//!
//! ```text
//! +-------+-----------+-----+-------------+------+---------------+
//! | count | offset[0] | ... | offset[n-1] | tail | entries ...   |
//! +-------+-----------+-----+-------------+------+---------------+
//!                                                ^ entries base
//! ```
//!
//! Offsets are relative to the entries base. `tail` equals the length of the
//! entries area and entry `i` spans `offset[i]..offset[i+1]` (or
//! `offset[n-1]..tail`). The same layout indexes namespaces inside a
//! package and types inside a namespace.

use super::cursor::Cursor;
use super::{IdlError, IdlResult};
use crate::config::INT_FIELD_SIZE;

/// Half-open byte range inside a package buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The bytes of this range, if it lies inside `buf`.
    pub fn slice<'a>(&self, buf: &'a [u8]) -> Option<&'a [u8]> {
        buf.get(self.start..self.end)
    }
}

/// A validated offset table.
///
/// Validation happens once in [`OffsetTable::validate`]; afterwards entry
/// ranges are served without touching the buffer again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetTable {
    region: ByteRange,
    entries_base: usize,
    offsets: Vec<u32>,
    tail: u32,
}

impl OffsetTable {
    /// Validate the table occupying `buf[start..]`.
    ///
    /// The region extends to the end of `buf`; callers pass a buffer cut at
    /// the end of the enclosing entry.
    pub fn validate(buf: &[u8], start: usize) -> IdlResult<Self> {
        if start > buf.len() {
            return Err(IdlError::Truncated {
                offset: start,
                needed: INT_FIELD_SIZE,
                available: 0,
            });
        }

        let mut cursor = Cursor::at(buf, start);
        let count = cursor.read_int()? as usize;

        // Header must fit before reading offsets one by one.
        let header_len = (count + 2) * INT_FIELD_SIZE;
        if cursor.remaining() + INT_FIELD_SIZE < header_len {
            return Err(IdlError::Truncated {
                offset: start,
                needed: header_len,
                available: buf.len() - start,
            });
        }

        let mut offsets = Vec::with_capacity(count);
        for _ in 0..count {
            offsets.push(cursor.read_int()?);
        }
        let tail = cursor.read_int()?;

        let entries_base = cursor.offset();
        let region_len = buf.len() - entries_base;
        if tail as usize != region_len {
            return Err(IdlError::InvalidTable {
                offset: start,
                reason: format!("tail offset {} != region length {}", tail, region_len),
            });
        }

        for (index, window) in offsets.windows(2).enumerate() {
            if window[1] <= window[0] {
                return Err(IdlError::ZeroLengthEntry { index });
            }
        }
        if let Some(&last) = offsets.last() {
            if tail <= last {
                return Err(IdlError::ZeroLengthEntry { index: count - 1 });
            }
        }

        log::trace!(
            "[idl] offset table at {}: {} entries, {} bytes",
            start,
            count,
            region_len
        );

        Ok(Self {
            region: ByteRange::new(start, buf.len()),
            entries_base,
            offsets,
            tail,
        })
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Whole table region, header included.
    pub fn region(&self) -> ByteRange {
        self.region
    }

    /// Absolute range of entry `index`.
    pub fn entry_range(&self, index: usize) -> Option<ByteRange> {
        let start = *self.offsets.get(index)?;
        let end = self.offsets.get(index + 1).copied().unwrap_or(self.tail);
        Some(ByteRange::new(
            self.entries_base + start as usize,
            self.entries_base + end as usize,
        ))
    }

    /// Absolute ranges of all entries, in table order.
    pub fn ranges(&self) -> impl Iterator<Item = ByteRange> + '_ {
        (0..self.len()).filter_map(move |index| self.entry_range(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idl::Writer;

    fn table(offsets: &[u32], tail: u32, entries: &[u8]) -> Vec<u8> {
        let mut writer = Writer::new();
        writer.write_len(offsets.len()).unwrap();
        for &offset in offsets {
            writer.write_int(offset).unwrap();
        }
        writer.write_int(tail).unwrap();
        writer.write_bytes(entries);
        writer.into_inner()
    }

    #[test]
    fn test_empty_table() {
        let bytes = table(&[], 0, &[]);
        let table = OffsetTable::validate(&bytes, 0).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.entry_range(0), None);
        assert_eq!(table.region(), ByteRange::new(0, 8));
    }

    #[test]
    fn test_entry_ranges() {
        let bytes = table(&[0, 3, 4], 10, b"aaabcccccc");
        let table = OffsetTable::validate(&bytes, 0).unwrap();
        assert_eq!(table.len(), 3);
        let slices: Vec<&[u8]> = table
            .ranges()
            .map(|range| range.slice(&bytes).unwrap())
            .collect();
        assert_eq!(slices, vec![&b"aaa"[..], &b"b"[..], &b"cccccc"[..]]);
    }

    #[test]
    fn test_table_at_nonzero_start() {
        let mut bytes = b"junk".to_vec();
        bytes.extend(table(&[0], 2, b"xy"));
        let table = OffsetTable::validate(&bytes, 4).unwrap();
        let range = table.entry_range(0).unwrap();
        assert_eq!(range.slice(&bytes).unwrap(), b"xy");
    }

    #[test]
    fn test_first_offset_may_skip_bytes() {
        let bytes = table(&[2], 4, b"--ok");
        let table = OffsetTable::validate(&bytes, 0).unwrap();
        assert_eq!(table.entry_range(0).unwrap().slice(&bytes).unwrap(), b"ok");
    }

    #[test]
    fn test_tail_mismatch() {
        let bytes = table(&[0], 3, b"ab");
        assert!(matches!(
            OffsetTable::validate(&bytes, 0),
            Err(IdlError::InvalidTable { .. })
        ));
    }

    #[test]
    fn test_non_increasing_offsets() {
        let bytes = table(&[0, 2, 2], 4, b"abcd");
        assert!(matches!(
            OffsetTable::validate(&bytes, 0),
            Err(IdlError::ZeroLengthEntry { index: 1 })
        ));

        let bytes = table(&[0, 4], 4, b"abcd");
        assert!(matches!(
            OffsetTable::validate(&bytes, 0),
            Err(IdlError::ZeroLengthEntry { index: 1 })
        ));
    }

    #[test]
    fn test_truncated_header() {
        // Claims 50 entries but has room for none.
        let bytes = b"00500000".to_vec();
        assert!(matches!(
            OffsetTable::validate(&bytes, 0),
            Err(IdlError::Truncated { .. })
        ));
        assert!(matches!(
            OffsetTable::validate(&bytes, 20),
            Err(IdlError::Truncated { .. })
        ));
    }

    #[test]
    fn test_single_offset_mutation_never_reads_wrong() {
        let entries = b"aaaabbbbccccdddd";
        let offsets = [0u32, 4, 8, 12];
        let mut rng = fastrand::Rng::with_seed(7);

        for _ in 0..500 {
            let mut mutated = offsets;
            let index = rng.usize(0..mutated.len());
            let value = rng.u32(0..=20);
            mutated[index] = value;
            let monotonic = mutated.windows(2).all(|w| w[0] < w[1]) && mutated[3] < 16;

            let bytes = table(&mutated, 16, entries);
            match OffsetTable::validate(&bytes, 0) {
                Ok(table) => {
                    assert!(monotonic, "accepted non-monotonic {:?}", mutated);
                    for range in table.ranges() {
                        assert!(!range.is_empty());
                        assert!(range.slice(&bytes).is_some());
                    }
                }
                Err(err) => {
                    assert!(!monotonic, "rejected valid {:?}: {}", mutated, err);
                    assert!(matches!(
                        err,
                        IdlError::ZeroLengthEntry { .. } | IdlError::InvalidTable { .. }
                    ));
                }
            }
        }
    }
}
