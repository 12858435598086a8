// baptismdata: Baptism Data Store Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! Cli --> command() --> script readable? --> Context::open_with
//!                                                 |
//!            show / get (read)  |  set / unset (script, then params)
//!                                                 |
//!                                    flush --> close
//! ```

pub mod modify;
pub mod show;


use std::io::{BufRead, Write};

use anyhow::Context as _;
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::{Result, StoreError};
use crate::store::Context;

/// Open the store, run the command, flush and close.
///
/// `stdin` is only read for a `-` script. The store is closed even when the
/// command fails; changes are only written when it succeeds.
///
/// # Errors
///
/// Returns an error if the parameters are invalid, the script is unreadable,
/// the store cannot be opened, the command fails, or the flush fails.
pub fn run_command<W: Write, R: BufRead>(cli: &Cli, out: &mut W, stdin: R) -> Result<()> {
    let command = cli.command()?;

    if let Some(script) = cli.global.script_file() {
        std::fs::File::open(script)
            .map(drop)
            .map_err(|source| StoreError::SourceUnreachable {
                path: script.to_path_buf(),
                source,
            })
            .with_context(|| format!("cannot use script file '{}'", script.display()))?;
    }

    let mut ctx = Context::open_with(&cli.global.open_options())
        .context("cannot open baptism data")?;
    debug!(command = ?command, "store opened");

    let result = dispatch(&mut ctx, &command, cli, out, stdin)
        .and_then(|()| ctx.flush().context("could not store the baptism data"));
    ctx.close();
    result
}

fn dispatch<W: Write, R: BufRead>(
    ctx: &mut Context,
    command: &Command,
    cli: &Cli,
    out: &mut W,
    stdin: R,
) -> Result<()> {
    let no_header = cli.global.no_header;
    match command {
        Command::Show => show::run_show(ctx, no_header, out),
        Command::Get(names) => show::run_get(ctx, names, no_header, out),
        Command::Set(pairs) => {
            modify::apply_script(ctx, &cli.global, stdin)?;
            modify::run_set(ctx, pairs)
        }
        Command::Unset(names) => {
            modify::apply_script(ctx, &cli.global, stdin)?;
            modify::run_unset(ctx, names)
        }
    }
}
