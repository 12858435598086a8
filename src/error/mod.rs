// baptismdata: Baptism Data Store Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!                 StoreError
//!                     |
//!   +------+------+---+---+------+------+------+
//!   |      |      |       |      |      |      |
//!   v      v      v       v      v      v      v
//! Source Config  Lock  Device  Write NoSpace Invalid/NoData
//! (ENOENT) Box  (EBUSY) (EIO)  (EIO) (ENOMEM) (EINVAL/ENODATA)
//!
//! Sub-errors:
//!   Config  Read, Parse, InvalidValue, NoNamespace
//!
//! errno()  -> positive errno value
//! status() -> negative status code (0 is success)
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias for `anyhow::Result`, used at the application edge.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`StoreError`].
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by the store-access core and the environment adapter.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Configuration source or import script missing or unreadable.
    #[error("cannot read '{}': {source}", path.display())]
    SourceUnreachable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be parsed by any supported format.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Exclusive access to the environment could not be obtained.
    #[error("cannot lock '{}': {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading the environment region from the device failed.
    #[error("cannot read environment from '{}': {source}", path.display())]
    DeviceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The storage medium rejected or failed the write-back.
    #[error("cannot write environment to '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The variable table no longer fits into the environment region.
    #[error("environment too large: {needed} bytes needed, {available} available")]
    NoSpace { needed: usize, available: usize },

    /// Bad variable name or value.
    #[error("invalid argument: {0}")]
    InvalidArgument(Box<str>),

    /// No valid environment copy found on the medium.
    #[error("no valid environment data found")]
    NoData,
}

impl StoreError {
    /// Create a [`StoreError::InvalidArgument`] from a message.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into().into_boxed_str())
    }

    /// Positive errno value describing this error.
    #[must_use]
    pub fn errno(&self) -> i32 {
        match self {
            Self::SourceUnreachable { source, .. } => source.raw_os_error().unwrap_or(libc::ENOENT),
            Self::Config(_) | Self::InvalidArgument(_) => libc::EINVAL,
            Self::Lock { source, .. } => source.raw_os_error().unwrap_or(libc::EBUSY),
            Self::DeviceRead { source, .. } | Self::Write { source, .. } => {
                source.raw_os_error().unwrap_or(libc::EIO)
            }
            Self::NoSpace { .. } => libc::ENOMEM,
            Self::NoData => libc::ENODATA,
        }
    }

    /// Negative status code, mirroring the `-errno` convention.
    #[must_use]
    pub fn status(&self) -> i32 {
        -self.errno()
    }
}

impl From<ConfigError> for StoreError {
    fn from(err: ConfigError) -> Self {
        Self::Config(Box::new(err))
    }
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },

    /// Requested namespace is not defined in the configuration.
    #[error("namespace '{0}' not found")]
    NoNamespace(String),
}
