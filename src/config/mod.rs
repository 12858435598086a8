// baptismdata: Baptism Data Store Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Environment configuration: where the baptism data lives on the medium.
//!
//! # Format Resolution
//!
//! ```text
//! config source (default /etc/baptism-data.config)
//!        |
//!        v
//!   readable? --no--> SourceUnreachable
//!        |
//!        v
//!   Structured (YAML, namespaces) --fail--> Legacy (fw_env.config lines)
//!        |                                        |
//!        +-------------------+--------------------+
//!                            v
//!                        EnvLayout
//! ```
//!
//! # Structured Format
//!
//! ```yaml
//! uboot:
//!   size: 0x4000
//!   lockfile: /var/lock/fw_printenv.lock
//!   devices:
//!     - path: /dev/mtd0
//!       offset: 0xA0000
//!     - path: /dev/mtd0
//!       offset: 0xB0000
//! ```
//!
//! # Legacy Format
//!
//! ```text
//! # device   offset   size    [sectorsize [sectors]]
//! /dev/mtd1  0x0000   0x4000  0x4000
//! /dev/mtd2  0x0000   0x4000  0x4000
//! ```

pub mod legacy;
pub mod loader;
pub mod types;

#[cfg(test)]
mod tests;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Configuration source used when nothing else is given.
///
/// Can be replaced at build time through the `BAPTISMDATA_CONFIG`
/// environment variable.
pub const DEFAULT_CONFIG_PATH: &str = match option_env!("BAPTISMDATA_CONFIG") {
    Some(path) => path,
    None => "/etc/baptism-data.config",
};

/// Lock file used when the configuration does not name one.
pub const DEFAULT_LOCKFILE: &str = "/var/lock/fw_printenv.lock";

/// Smallest region that can hold a redundant header plus an empty table.
pub const MIN_REGION_SIZE: usize = 7;

/// Largest region accepted; a copy is held in memory while it is read or
/// written.
pub const MAX_REGION_SIZE: usize = 16 * 1024 * 1024;

/// Supported configuration formats, tried in [`ConfigFormat::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML with one or more named namespaces.
    Structured,
    /// Whitespace separated `fw_env.config` lines, single namespace.
    Legacy,
}

impl ConfigFormat {
    /// Richer format first, legacy as fallback.
    pub const ORDER: [Self; 2] = [Self::Structured, Self::Legacy];

    /// Parse `path` in this format.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file does not follow this format or
    /// describes an unusable layout.
    pub fn parse(self, path: &Path, namespace: Option<&str>) -> Result<EnvLayout, ConfigError> {
        let layout = match self {
            Self::Structured => types::parse_structured(path, namespace)?,
            Self::Legacy => legacy::parse_legacy(path)?,
        };
        layout.validate()?;
        Ok(layout)
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured => write!(f, "structured"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

/// One copy of the environment on a storage device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    /// Device node or image file.
    pub path: PathBuf,
    /// Byte offset of the region inside the device.
    pub offset: u64,
    /// Erase block size, informational.
    pub sector_size: Option<u64>,
    /// Number of erase blocks, informational.
    pub sectors: Option<u64>,
    /// Whether the device asks for a write unlock, informational.
    pub unlock: bool,
}

impl Device {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, offset: u64) -> Self {
        Self {
            path: path.into(),
            offset,
            sector_size: None,
            sectors: None,
            unlock: false,
        }
    }
}

/// Parsed environment layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvLayout {
    /// Format the layout was read from.
    pub format: ConfigFormat,
    /// Namespace name (structured format only).
    pub namespace: Option<String>,
    /// Size of one environment copy in bytes, header included.
    pub size: usize,
    /// Lock file guarding exclusive access.
    pub lockfile: PathBuf,
    /// One device for a single environment, two for a redundant one.
    pub devices: Vec<Device>,
}

impl EnvLayout {
    /// Whether two copies with a flags byte are used.
    #[must_use]
    pub fn is_redundant(&self) -> bool {
        self.devices.len() == 2
    }

    /// Check device count and region size.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for zero or more than two devices,
    /// a region too small to hold an empty environment, or a region larger
    /// than [`MAX_REGION_SIZE`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let section = self.namespace.clone().unwrap_or_else(|| "env".to_string());
        if self.devices.is_empty() || self.devices.len() > 2 {
            return Err(ConfigError::InvalidValue {
                section,
                key: "devices".to_string(),
                message: format!("expected 1 or 2 devices, got {}", self.devices.len()),
            });
        }
        if self.size < MIN_REGION_SIZE {
            return Err(ConfigError::InvalidValue {
                section,
                key: "size".to_string(),
                message: format!("region of {} bytes is too small", self.size),
            });
        }
        if self.size > MAX_REGION_SIZE {
            return Err(ConfigError::InvalidValue {
                section,
                key: "size".to_string(),
                message: format!(
                    "region of {:#x} bytes exceeds the {MAX_REGION_SIZE:#x} byte limit",
                    self.size
                ),
            });
        }
        Ok(())
    }
}

/// Parse a decimal or `0x` prefixed hexadecimal number.
#[must_use]
pub fn parse_number(text: &str) -> Option<u64> {
    let text = text.trim();
    match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}
