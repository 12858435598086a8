// baptismdata: Baptism Data Store Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mutating commands: `set`, `unset` and script import.
//!
//! Each stops at the first failure; earlier changes stay unflushed.

use std::io::BufRead;
use std::path::Path;

use anyhow::Context as _;

use crate::cli::global::{GlobalOptions, STDIN_SCRIPT};
use crate::error::Result;
use crate::store::Context;

/// Apply the `--script` file (or stdin for `-`), if one was given.
///
/// # Errors
///
/// Returns an error if the script cannot be read or a line fails to apply.
pub fn apply_script<R: BufRead>(ctx: &mut Context, global: &GlobalOptions, stdin: R) -> Result<()> {
    let loaded = if global.script_is_stdin() {
        ctx.load_reader(stdin, Path::new(STDIN_SCRIPT))
    } else if let Some(script) = global.script_file() {
        ctx.load_file(script)
    } else {
        return Ok(());
    };
    loaded.context("could not process script file")
}

/// Set each `(name, value)` pair in order.
///
/// # Errors
///
/// Returns an error naming the first variable that could not be set.
pub fn run_set(ctx: &mut Context, pairs: &[(String, String)]) -> Result<()> {
    for (name, value) in pairs {
        ctx.set(name, Some(value))
            .with_context(|| format!("setting '{name}' failed"))?;
    }
    Ok(())
}

/// Delete each variable in order.
///
/// # Errors
///
/// Returns an error naming the first variable that could not be deleted.
pub fn run_unset(ctx: &mut Context, names: &[String]) -> Result<()> {
    for name in names {
        ctx.set(name, None)
            .with_context(|| format!("deleting '{name}' failed"))?;
    }
    Ok(())
}
