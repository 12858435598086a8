// baptismdata: Baptism Data Store Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;

use crate::cli::{Cli, Command, CommandKind, UsageError};
use clap::Parser;

#[test]
fn test_parse_defaults_to_show() {
    let cli = Cli::try_parse_from(["bd"]).unwrap();
    assert_eq!(cli.command, CommandKind::Show);
    assert_eq!(cli.command(), Ok(Command::Show));
    assert!(!cli.global.no_header);
}

#[test]
fn test_parse_command_ignores_case() {
    let cli = Cli::try_parse_from(["bd", "GET", "serial#"]).unwrap();
    assert_eq!(cli.command(), Ok(Command::Get(vec!["serial#".to_string()])));
}

#[test]
fn test_parse_set_pairs() {
    let cli = Cli::try_parse_from(["bd", "-n", "set", "serial#", "4711", "hw_revision", "A0"])
        .unwrap();
    assert!(cli.global.no_header);
    assert_eq!(
        cli.command(),
        Ok(Command::Set(vec![
            ("serial#".to_string(), "4711".to_string()),
            ("hw_revision".to_string(), "A0".to_string()),
        ]))
    );
}

#[test]
fn test_parse_set_value_with_leading_dash() {
    let cli = Cli::try_parse_from(["bd", "set", "offset", "-12"]).unwrap();
    assert_eq!(
        cli.command(),
        Ok(Command::Set(vec![("offset".to_string(), "-12".to_string())]))
    );
}

#[test]
fn test_odd_set_parameters_rejected() {
    let cli = Cli::try_parse_from(["bd", "set", "serial#"]).unwrap();
    assert_eq!(cli.command(), Err(UsageError::OddSetParameters));
}

#[test]
fn test_script_rejected_for_get() {
    let cli = Cli::try_parse_from(["bd", "-s", "vars.txt", "get", "serial#"]).unwrap();
    let err = cli.command().unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"cannot use script file for 'get' command");
}

#[test]
fn test_script_accepted_for_unset() {
    let cli = Cli::try_parse_from(["bd", "--script", "-", "unset"]).unwrap();
    assert_eq!(cli.command(), Ok(Command::Unset(Vec::new())));
    assert!(cli.global.script_is_stdin());
    assert!(cli.global.script_file().is_none());
}

#[test]
fn test_script_file_path() {
    let cli = Cli::try_parse_from(["bd", "-s", "/tmp/vars.txt", "set"]).unwrap();
    assert_eq!(cli.global.script_file(), Some(Path::new("/tmp/vars.txt")));
    assert!(!cli.global.script_is_stdin());
}

#[test]
fn test_unknown_command_rejected() {
    assert!(Cli::try_parse_from(["bd", "list"]).is_err());
}

#[test]
fn test_open_options_from_globals() {
    let cli = Cli::try_parse_from([
        "bd",
        "--config",
        "/etc/fw_env.config",
        "--namespace",
        "baptism",
    ])
    .unwrap();
    let options = cli.global.open_options();
    assert_eq!(options.config_path(), Path::new("/etc/fw_env.config"));
    assert_eq!(options.namespace(), Some("baptism"));
}

#[test]
fn test_log_level_range() {
    assert!(Cli::try_parse_from(["bd", "-l", "7"]).is_err());
    let cli = Cli::try_parse_from(["bd", "-l", "4"]).unwrap();
    assert_eq!(cli.global.log_level, Some(4));
}
