// baptismdata: Baptism Data Store Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Binary environment image.
//!
//! ```text
//! single:     | crc32 (LE) |       data ...        |
//! redundant:  | crc32 (LE) | flags |  data ...     |
//!
//! data: name=value\0 name=value\0 ... \0 [\0 padding up to size]
//! crc32 (IEEE) covers data only
//! ```

use super::table::EnvTable;
use crate::error::{StoreError, StoreResult};

/// Bytes taken by the checksum.
pub const CRC_LEN: usize = 4;

/// Header size of one copy.
#[must_use]
pub const fn header_len(redundant: bool) -> usize {
    if redundant { CRC_LEN + 1 } else { CRC_LEN }
}

/// A copy that passed the checksum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Flags counter, `0` for single copies.
    pub flags: u8,
    pub table: EnvTable,
}

/// Decode one copy, `None` if it is too short or its checksum does not match.
#[must_use]
pub fn decode(buf: &[u8], redundant: bool) -> Option<Decoded> {
    let header = header_len(redundant);
    if buf.len() <= header {
        return None;
    }

    let stored = u32::from_le_bytes(buf[..CRC_LEN].try_into().ok()?);
    let data = &buf[header..];
    if crc32fast::hash(data) != stored {
        return None;
    }

    Some(Decoded {
        flags: if redundant { buf[CRC_LEN] } else { 0 },
        table: parse_data(data),
    })
}

/// Parse the data area. Records without `=` are skipped; a later record
/// overrides an earlier one with the same name. Bytes are kept as found.
#[must_use]
pub fn parse_data(data: &[u8]) -> EnvTable {
    let mut table = EnvTable::new();
    for record in data.split(|&b| b == 0) {
        if record.is_empty() {
            break;
        }
        let Some(eq) = record.iter().position(|&b| b == b'=') else {
            continue;
        };
        if eq == 0 {
            continue;
        }
        table.insert_raw(&record[..eq], &record[eq + 1..]);
    }
    table
}

/// Encode `table` into a copy of exactly `size` bytes.
///
/// `flags` is written for redundant layouts and omitted when `None`.
///
/// # Errors
///
/// Returns [`StoreError::NoSpace`] if the table does not fit.
pub fn encode(table: &EnvTable, size: usize, flags: Option<u8>) -> StoreResult<Vec<u8>> {
    let header = header_len(flags.is_some());
    let needed = header + table.encoded_len();
    if needed > size {
        return Err(StoreError::NoSpace {
            needed,
            available: size,
        });
    }

    let mut buf = vec![0u8; size];
    let mut pos = header;
    for entry in table {
        let parts: [&[u8]; 4] = [entry.name_bytes(), b"=", entry.value_bytes(), b"\0"];
        for part in parts {
            buf[pos..pos + part.len()].copy_from_slice(part);
            pos += part.len();
        }
    }

    let crc = crc32fast::hash(&buf[header..]);
    buf[..CRC_LEN].copy_from_slice(&crc.to_le_bytes());
    if let Some(flags) = flags {
        buf[CRC_LEN] = flags;
    }
    Ok(buf)
}

/// Index of the newer of two valid redundant copies.
///
/// The flags byte counts up and wraps from 255 to 0; ties go to copy 0.
#[must_use]
pub const fn newer_copy(flags0: u8, flags1: u8) -> usize {
    match (flags0, flags1) {
        (0xFF, 0) => 1,
        (0, 0xFF) => 0,
        (a, b) if b > a => 1,
        _ => 0,
    }
}
