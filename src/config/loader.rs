// baptismdata: Baptism Data Store Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration loading with format fallback.
//!
//! # Loader Pipeline
//!
//! ```text
//! ConfigLoader::new(path)
//!   .with_namespace()
//!        |
//!        v
//!    load() --> check_readable() --> Structured? --> Legacy? --> EnvLayout
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{ConfigFormat, DEFAULT_CONFIG_PATH, EnvLayout};
use crate::error::{ConfigError, StoreError, StoreResult};

/// Loads an [`EnvLayout`] from a configuration source.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
    namespace: Option<String>,
}

impl ConfigLoader {
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            namespace: None,
        }
    }

    /// Selects a namespace of the structured format. The first one is used
    /// when none is selected; the legacy format ignores it.
    #[must_use]
    pub fn with_namespace(mut self, namespace: Option<String>) -> Self {
        self.namespace = namespace;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checks that the configuration source can be opened for reading.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SourceUnreachable`] if it cannot.
    pub fn check_readable(&self) -> StoreResult<()> {
        std::fs::File::open(&self.path)
            .map(drop)
            .map_err(|source| StoreError::SourceUnreachable {
                path: self.path.clone(),
                source,
            })
    }

    /// Parses the configuration, structured format first.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The source is missing or unreadable.
    /// - No format accepts the file; the message lists every attempt.
    pub fn load(&self) -> StoreResult<EnvLayout> {
        self.check_readable()?;

        let mut failures = Vec::with_capacity(ConfigFormat::ORDER.len());
        for format in ConfigFormat::ORDER {
            match format.parse(&self.path, self.namespace.as_deref()) {
                Ok(layout) => {
                    debug!(
                        path = %self.path.display(),
                        %format,
                        size = layout.size,
                        devices = layout.devices.len(),
                        "parsed environment config"
                    );
                    return Ok(layout);
                }
                Err(e) => {
                    debug!(path = %self.path.display(), %format, "config parse failed: {e}");
                    failures.push(format!("{format}: {e}"));
                }
            }
        }

        Err(ConfigError::ParseError {
            path: self.path.display().to_string(),
            message: failures.join("; "),
        }
        .into())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}
