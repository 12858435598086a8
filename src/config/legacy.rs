// baptismdata: Baptism Data Store Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Legacy `fw_env.config` parser.

use std::path::{Path, PathBuf};

use super::{ConfigFormat, DEFAULT_LOCKFILE, Device, EnvLayout, parse_number};
use crate::error::ConfigError;

/// Read `path` as a legacy configuration file.
///
/// # Errors
///
/// Returns [`ConfigError::ReadError`] if the file cannot be read, or the
/// errors of [`parse_legacy_str`].
pub fn parse_legacy(path: &Path) -> Result<EnvLayout, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
        path: path.display().to_string(),
        source,
    })?;
    parse_legacy_str(&content, &path.display().to_string())
}

/// Parse legacy configuration text; `origin` is only used in messages.
///
/// # Errors
///
/// Returns [`ConfigError::ParseError`] for malformed lines, for more than two
/// devices, for devices disagreeing on the size, or for no device at all.
pub fn parse_legacy_str(content: &str, origin: &str) -> Result<EnvLayout, ConfigError> {
    let parse_error = |line: usize, message: String| ConfigError::ParseError {
        path: origin.to_string(),
        message: format!("line {line}: {message}"),
    };

    let mut devices = Vec::new();
    let mut size: Option<u64> = None;

    for (index, line) in content.lines().enumerate() {
        let lineno = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 || fields.len() > 5 {
            return Err(parse_error(
                lineno,
                format!("expected 3 to 5 fields, got {}", fields.len()),
            ));
        }

        let number = |field: &str, what: &str| {
            parse_number(field).ok_or_else(|| parse_error(lineno, format!("invalid {what} '{field}'")))
        };

        let offset = number(fields[1], "offset")?;
        let env_size = number(fields[2], "size")?;
        let sector_size = fields.get(3).copied().map(|f| number(f, "sector size")).transpose()?;
        let sectors = fields.get(4).copied().map(|f| number(f, "sector count")).transpose()?;

        match size {
            Some(first) if first != env_size => {
                return Err(parse_error(
                    lineno,
                    format!("size {env_size:#x} differs from first device ({first:#x})"),
                ));
            }
            _ => size = Some(env_size),
        }

        if devices.len() == 2 {
            return Err(parse_error(lineno, "more than two devices".to_string()));
        }

        devices.push(Device {
            path: PathBuf::from(fields[0]),
            offset,
            sector_size,
            sectors,
            unlock: false,
        });
    }

    let size = size.ok_or_else(|| ConfigError::ParseError {
        path: origin.to_string(),
        message: "no device configured".to_string(),
    })?;

    let size = usize::try_from(size).map_err(|_| ConfigError::InvalidValue {
        section: "env".to_string(),
        key: "size".to_string(),
        message: format!("{size} does not fit into memory"),
    })?;

    Ok(EnvLayout {
        format: ConfigFormat::Legacy,
        namespace: None,
        size,
        lockfile: PathBuf::from(DEFAULT_LOCKFILE),
        devices,
    })
}
