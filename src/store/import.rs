// baptismdata: Baptism Data Store Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Import script parser.
//!
//! ```text
//! # comment              -> ignored
//! serial#=4711           -> set("serial#", Some("4711"))
//! line ignored           -> ignored (no '=')
//! delete_this_var=       -> set("delete_this_var", None)
//! ```
//!
//! Values are taken verbatim up to the line terminator; there is no
//! quoting, escaping or line continuation.

use std::io::{self, BufRead};

/// One effective operation of an import script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLine {
    pub name: String,
    /// `None` deletes the variable.
    pub value: Option<String>,
}

/// Parse a single line, `None` if it carries no operation.
#[must_use]
pub fn parse_line(line: &str) -> Option<ImportLine> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);

    if line.trim_start().starts_with('#') {
        return None;
    }

    let (name, value) = line.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    Some(ImportLine {
        name: name.to_string(),
        value: (!value.is_empty()).then(|| value.to_string()),
    })
}

/// Lazily parse a whole script, yielding operations in file order.
///
/// A line that would set or delete a variable but is not valid UTF-8 yields
/// an [`io::ErrorKind::InvalidData`] error naming the line; ignored lines
/// may hold any bytes.
pub fn parse_script<R: BufRead>(mut reader: R) -> impl Iterator<Item = io::Result<ImportLine>> {
    let mut buf = Vec::new();
    let mut lineno = 0usize;
    std::iter::from_fn(move || {
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => return None,
                Ok(_) => lineno += 1,
                Err(e) => return Some(Err(e)),
            }

            match std::str::from_utf8(&buf) {
                Ok(line) => {
                    if let Some(op) = parse_line(line) {
                        return Some(Ok(op));
                    }
                }
                Err(_) if parse_line(&String::from_utf8_lossy(&buf)).is_none() => {}
                Err(e) => {
                    return Some(Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("line {lineno}: {e}"),
                    )));
                }
            }
        }
    })
}
