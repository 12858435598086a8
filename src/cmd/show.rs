// baptismdata: Baptism Data Store Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Read-only commands: `show` and `get`.

use std::io::Write;

use crate::error::Result;
use crate::store::Context;

fn print_var<W: Write>(out: &mut W, name: &str, value: &str, no_header: bool) -> Result<()> {
    if no_header {
        writeln!(out, "{value}")?;
    } else {
        writeln!(out, "{name}={value}")?;
    }
    Ok(())
}

/// Print every variable in table order.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn run_show<W: Write>(ctx: &Context, no_header: bool, out: &mut W) -> Result<()> {
    for entry in ctx.entries() {
        print_var(out, entry.name(), entry.value(), no_header)?;
    }
    Ok(())
}

/// Print the requested variables; missing ones print an empty value.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn run_get<W: Write>(
    ctx: &Context,
    names: &[String],
    no_header: bool,
    out: &mut W,
) -> Result<()> {
    for name in names {
        let value = ctx.get(name);
        print_var(out, name, value.as_deref().unwrap_or_default(), no_header)?;
    }
    Ok(())
}
