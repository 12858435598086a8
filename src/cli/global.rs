// baptismdata: Baptism Data Store Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Global CLI options available for all commands.
//!
//! ```text
//! --no-header       ← print values only
//! --script FILE     ← import script, '-' = stdin (set/unset only)
//! --config FILE     ← environment config (BAPTISMDATA_CONFIG)
//! --namespace NAME  ← namespace of a structured config
//! --log-level N     ← stderr verbosity (0-6)
//! --log-file FILE   ← additional log file
//! ```

use clap::Args;
use std::path::{Path, PathBuf};

use crate::config::DEFAULT_CONFIG_PATH;
use crate::store::OpenOptions;

/// Script path that selects standard input.
pub const STDIN_SCRIPT: &str = "-";

/// Global options available for all commands.
#[derive(Debug, Clone, Args)]
pub struct GlobalOptions {
    /// Do not print variable name(s).
    #[arg(short = 'n', long = "no-header")]
    pub no_header: bool,

    /// Read variables to be set/unset from a script file ('-' for stdin).
    #[arg(short = 's', long = "script", value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Environment configuration file.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        env = "BAPTISMDATA_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    pub config: PathBuf,

    /// Namespace to use from a structured configuration (default: first).
    #[arg(long = "namespace", value_name = "NAME")]
    pub namespace: Option<String>,

    /// Console log level (0=silent, 1=errors, 2=warnings, 3=info, 4=debug, 5=trace, 6=dump).
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = clap::value_parser!(u8).range(0..=6)
    )]
    pub log_level: Option<u8>,

    /// Path to log file.
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl GlobalOptions {
    /// Script file to read, `None` for stdin or no script.
    #[must_use]
    pub fn script_file(&self) -> Option<&Path> {
        self.script
            .as_deref()
            .filter(|path| path.as_os_str() != STDIN_SCRIPT)
    }

    /// Whether the script is read from standard input.
    #[must_use]
    pub fn script_is_stdin(&self) -> bool {
        self.script
            .as_deref()
            .is_some_and(|path| path.as_os_str() == STDIN_SCRIPT)
    }

    /// Options for opening the store.
    #[must_use]
    pub fn open_options(&self) -> OpenOptions {
        OpenOptions::builder()
            .with_config_path(self.config.clone())
            .maybe_with_namespace(self.namespace.clone())
            .build()
    }
}
