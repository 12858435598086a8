// baptismdata: Baptism Data Store Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI module for bd using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! bd [global options] [command] [parameters]
//! show                          (default)
//! get NAME [NAME...]
//! set NAME VALUE [NAME VALUE...]
//! unset NAME [NAME...]
//! ```
//!
//! Commands are matched case-insensitively.

pub mod global;

#[cfg(test)]
mod tests;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::cli::global::GlobalOptions;

/// Tool to get/set baptism data variables
#[derive(Debug, Parser)]
#[command(
    name = "bd",
    author,
    version,
    about = "Tool to get/set baptism data variables",
    after_help = "SCRIPT FILE SYNTAX:\n\n\
                  key=value\n\
                  lines starting with '#' are treated as comment\n\
                  lines without '=' are ignored\n\
                  an empty value deletes the variable\n\n\
                  SCRIPT FILE EXAMPLE:\n\n\
                  serial#=4711\n\
                  hw_revision=A0\n\
                  manufacturer=Example Company\n\
                  line ignored\n\
                  delete_this_var="
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[arg(value_enum, ignore_case = true, default_value_t = CommandKind::Show)]
    pub command: CommandKind,

    /// Variable names, or name/value pairs for `set`
    #[arg(value_name = "PARAMETERS", trailing_var_arg = true)]
    pub params: Vec<String>,
}

/// Available commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CommandKind {
    /// Print all baptism variables.
    #[default]
    Show,
    /// Print the value(s) of the given variable(s).
    Get,
    /// Set the value(s) of variable(s).
    Set,
    /// Unset the given variable(s).
    Unset,
}

impl CommandKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Get => "get",
            Self::Set => "set",
            Self::Unset => "unset",
        }
    }
}

/// A command with validated parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Get(Vec<String>),
    Set(Vec<(String, String)>),
    Unset(Vec<String>),
}

/// Parameter combinations clap cannot reject on its own.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("parameter count must be even for 'set'")]
    OddSetParameters,

    #[error("'show' takes no parameters")]
    ShowParameters,

    #[error("cannot use script file for '{0}' command")]
    ScriptNotAllowed(&'static str),
}

impl Cli {
    /// Validate the parameters against the command.
    ///
    /// # Errors
    ///
    /// Returns a [`UsageError`] for an odd number of `set` parameters,
    /// parameters to `show`, or a script given to `show`/`get`.
    pub fn command(&self) -> Result<Command, UsageError> {
        if self.global.script.is_some()
            && matches!(self.command, CommandKind::Show | CommandKind::Get)
        {
            return Err(UsageError::ScriptNotAllowed(self.command.as_str()));
        }

        match self.command {
            CommandKind::Show if self.params.is_empty() => Ok(Command::Show),
            CommandKind::Show => Err(UsageError::ShowParameters),
            CommandKind::Get => Ok(Command::Get(self.params.clone())),
            CommandKind::Set if self.params.len() % 2 != 0 => Err(UsageError::OddSetParameters),
            CommandKind::Set => Ok(Command::Set(
                self.params
                    .chunks_exact(2)
                    .map(|pair| (pair[0].clone(), pair[1].clone()))
                    .collect(),
            )),
            CommandKind::Unset => Ok(Command::Unset(self.params.clone())),
        }
    }
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Parses command-line arguments from an iterator.
pub fn parse_from<I, T>(iter: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::parse_from(iter)
}
