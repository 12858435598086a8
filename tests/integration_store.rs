// baptismdata: Baptism Data Store Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the store context.
//!
//! Every test works on image files in a temporary directory described by a
//! structured configuration with its own lock file.

use std::path::{Path, PathBuf};

use baptismdata::env::{EnvTable, image};
use baptismdata::error::StoreError;
use baptismdata::store::{Context, Cursor, OpenOptions};
use tempfile::TempDir;

const SIZE: usize = 0x200;

struct Store {
    dir: TempDir,
    options: OpenOptions,
}

impl Store {
    fn single() -> Self {
        Self::with_copies(1)
    }

    fn redundant() -> Self {
        Self::with_copies(2)
    }

    fn with_copies(copies: usize) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = format!(
            "baptism:\n  size: {SIZE}\n  lockfile: \"{}\"\n  devices:\n",
            dir.path().join("env.lock").display()
        );
        for i in 0..copies {
            let device = dir.path().join(format!("copy{i}.img"));
            std::fs::File::create(&device).unwrap();
            config.push_str(&format!(
                "    - path: \"{}\"\n      offset: 0x10\n",
                device.display()
            ));
        }
        let config_path = dir.path().join("baptism-data.config");
        std::fs::write(&config_path, config).unwrap();

        let options = OpenOptions::builder()
            .with_config_path(config_path)
            .with_namespace("baptism")
            .build();
        Self { dir, options }
    }

    fn open(&self) -> Result<Context, StoreError> {
        Context::open_with(&self.options)
    }

    fn device(&self, copy: usize) -> PathBuf {
        self.dir.path().join(format!("copy{copy}.img"))
    }
}

fn read_copy(path: &Path, redundant: bool) -> Option<image::Decoded> {
    let raw = std::fs::read(path).unwrap();
    let region = raw.get(0x10..0x10 + SIZE)?;
    image::decode(region, redundant)
}

fn variables(ctx: &Context) -> Vec<(String, String)> {
    ctx.entries()
        .map(|e| (e.name().to_string(), e.value().to_string()))
        .collect()
}

// =============================================================================
// Open / close
// =============================================================================

#[test]
fn open_blank_medium_is_empty() {
    let store = Store::single();
    let ctx = store.open().unwrap();
    assert_eq!(ctx.entries().count(), 0);
    assert!(!ctx.is_dirty());
    assert_eq!(ctx.serial_number(), None);
}

#[test]
fn open_missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let options = OpenOptions::builder()
        .with_config_path(dir.path().join("nope.config"))
        .build();
    let err = Context::open_with(&options).unwrap_err();
    assert!(matches!(err, StoreError::SourceUnreachable { .. }));
    assert_eq!(err.status(), -libc::ENOENT);
}

#[test]
fn second_open_is_refused_while_locked() {
    let store = Store::single();
    let first = store.open().unwrap();

    let err = store.open().unwrap_err();
    assert!(matches!(err, StoreError::Lock { .. }));
    assert_eq!(err.errno(), libc::EBUSY);

    first.close();
    store.open().unwrap().close();
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn flushed_changes_survive_reopen() {
    let store = Store::single();
    let mut ctx = store.open().unwrap();
    ctx.set("serial#", Some("4711")).unwrap();
    ctx.set("hw_revision", Some("A0")).unwrap();
    ctx.set("empty", Some("")).unwrap();
    ctx.flush().unwrap();
    assert!(!ctx.is_dirty());
    ctx.close();

    let ctx = store.open().unwrap();
    assert_eq!(
        variables(&ctx),
        vec![
            ("serial#".to_string(), "4711".to_string()),
            ("hw_revision".to_string(), "A0".to_string()),
            ("empty".to_string(), String::new()),
        ]
    );
    assert_eq!(ctx.serial_number().as_deref(), Some("4711"));

    let decoded = read_copy(&store.device(0), false).unwrap();
    assert_eq!(decoded.flags, 0);
    assert_eq!(decoded.table.get("hw_revision"), Some("A0"));
}

#[test]
fn unflushed_changes_are_discarded_on_close() {
    let store = Store::single();
    let mut ctx = store.open().unwrap();
    ctx.set("serial#", Some("4711")).unwrap();
    ctx.close();

    let ctx = store.open().unwrap();
    assert_eq!(ctx.get("serial#"), None);
    assert!(read_copy(&store.device(0), false).is_none());
}

#[test]
fn clean_flush_does_not_touch_medium() {
    let store = Store::single();
    let mut ctx = store.open().unwrap();
    ctx.set("serial#", Some("4711")).unwrap();
    ctx.flush().unwrap();
    ctx.close();

    let mut ctx = store.open().unwrap();
    std::fs::remove_file(store.device(0)).unwrap();

    ctx.set("serial#", Some("4711")).unwrap();
    assert!(!ctx.is_dirty());
    ctx.flush().unwrap();

    ctx.set("serial#", Some("4712")).unwrap();
    let err = ctx.flush().unwrap_err();
    assert!(matches!(err, StoreError::Write { .. }));
    assert!(ctx.is_dirty());
}

#[test]
fn redundant_copies_alternate() {
    let store = Store::redundant();

    let mut ctx = store.open().unwrap();
    ctx.set("serial#", Some("1")).unwrap();
    ctx.flush().unwrap();
    ctx.close();

    let mut ctx = store.open().unwrap();
    assert_eq!(ctx.get("serial#").as_deref(), Some("1"));
    ctx.set("serial#", Some("2")).unwrap();
    ctx.flush().unwrap();
    ctx.close();

    let first = read_copy(&store.device(1), true).unwrap();
    let second = read_copy(&store.device(0), true).unwrap();
    assert_eq!((first.flags, first.table.get("serial#")), (1, Some("1")));
    assert_eq!((second.flags, second.table.get("serial#")), (2, Some("2")));

    let ctx = store.open().unwrap();
    assert_eq!(ctx.get("serial#").as_deref(), Some("2"));
}

#[test]
fn flush_keeps_untouched_raw_bytes() {
    let store = Store::single();
    let mut table = EnvTable::new();
    table.insert_raw(b"mac", b"\xde\xad\xbe\xef");
    table.insert_raw(b"board", b"duckbill");
    let mut raw = vec![0u8; 0x10];
    raw.extend(image::encode(&table, SIZE, None).unwrap());
    std::fs::write(store.device(0), &raw).unwrap();

    let mut ctx = store.open().unwrap();
    ctx.set("serial#", Some("4711")).unwrap();
    ctx.flush().unwrap();
    ctx.close();

    let decoded = read_copy(&store.device(0), false).unwrap();
    assert_eq!(decoded.table.get_bytes("mac"), Some(b"\xde\xad\xbe\xef".as_slice()));
    assert_eq!(decoded.table.get("serial#"), Some("4711"));

    let ctx = store.open().unwrap();
    let mac = ctx.entries().find(|e| e.name() == "mac").unwrap();
    assert_eq!(mac.value_bytes(), b"\xde\xad\xbe\xef");
}

#[test]
fn oversized_value_is_rejected() {
    let store = Store::single();
    let mut ctx = store.open().unwrap();
    let huge = "x".repeat(SIZE);

    let err = ctx.set("blob", Some(&huge)).unwrap_err();
    assert!(matches!(err, StoreError::NoSpace { .. }));
    assert_eq!(err.errno(), libc::ENOMEM);
    assert!(!ctx.is_dirty());
    assert_eq!(ctx.get("blob"), None);
}

// =============================================================================
// Import and iteration
// =============================================================================

#[test]
fn import_script_then_iterate() {
    let store = Store::single();
    let script = store.dir.path().join("vars.txt");
    std::fs::write(
        &script,
        "# factory defaults\nserial#=4711\nboard = duckbill\nno separator\nhw_revision=A0\nhw_revision=\n",
    )
    .unwrap();

    let mut ctx = store.open().unwrap();
    ctx.load_file(&script).unwrap();
    assert!(ctx.is_dirty());

    let mut cursor = ctx.iterate(Cursor::Start);
    let mut seen = Vec::new();
    while let Some(entry) = ctx.entry(cursor) {
        seen.push(format!("{}={}", entry.name(), entry.value()));
        cursor = ctx.iterate(cursor);
    }
    assert_eq!(cursor, Cursor::End);
    assert_eq!(seen, vec!["serial#=4711", "board= duckbill"]);
}

#[test]
fn import_missing_script_fails() {
    let store = Store::single();
    let mut ctx = store.open().unwrap();
    let err = ctx
        .load_file(store.dir.path().join("missing.txt"))
        .unwrap_err();
    assert!(matches!(err, StoreError::SourceUnreachable { .. }));
    assert!(!ctx.is_dirty());
}
