// baptismdata: Baptism Data Store Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::Write;
use std::path::PathBuf;

use super::legacy::parse_legacy_str;
use super::loader::ConfigLoader;
use super::{ConfigFormat, DEFAULT_LOCKFILE, Device, EnvLayout, MAX_REGION_SIZE, parse_number};
use crate::error::{ConfigError, StoreError};

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const STRUCTURED: &str = r"
uboot:
  size: 0x4000
  lockfile: /run/lock/uboot.lock
  devices:
    - path: /dev/mtd0
      offset: 0xA0000
      sectorsize: 0x10000
      unlock: yes
    - path: /dev/mtd0
      offset: 0xB0000
baptism:
  size: 4096
  devices:
    - path: /dev/mmcblk0boot1
      offset: 0x100000
";

const LEGACY: &str = "\
# Device name\tDevice offset\tEnv. size\tFlash sector size\tNumber of sectors
/dev/mtd1\t\t0x0000\t\t0x4000\t\t0x4000
/dev/mtd2\t\t0x0000\t\t0x4000\t\t0x4000\t\t1
";

#[test]
fn test_parse_number() {
    assert_eq!(parse_number("0x4000"), Some(0x4000));
    assert_eq!(parse_number("0XA0000"), Some(0xA_0000));
    assert_eq!(parse_number("16384"), Some(16384));
    assert_eq!(parse_number(" 12 "), Some(12));
    assert_eq!(parse_number("0xZZ"), None);
    assert_eq!(parse_number("-1"), None);
}

#[test]
fn test_legacy_redundant() {
    let layout = parse_legacy_str(LEGACY, "fw_env.config").unwrap();
    assert_eq!(layout.format, ConfigFormat::Legacy);
    assert_eq!(layout.size, 0x4000);
    assert!(layout.is_redundant());
    assert_eq!(layout.lockfile, PathBuf::from(DEFAULT_LOCKFILE));
    assert_eq!(layout.devices[0].path, PathBuf::from("/dev/mtd1"));
    assert_eq!(layout.devices[0].sector_size, Some(0x4000));
    assert_eq!(layout.devices[0].sectors, None);
    assert_eq!(layout.devices[1].sectors, Some(1));
}

#[test]
fn test_legacy_single() {
    let layout = parse_legacy_str("/dev/mmcblk0 0x3c0000 0x20000\n", "cfg").unwrap();
    assert!(!layout.is_redundant());
    assert_eq!(layout.devices, vec![Device::new("/dev/mmcblk0", 0x3c_0000)]);
}

#[test]
fn test_legacy_size_mismatch() {
    let err = parse_legacy_str("/dev/a 0 0x4000\n/dev/b 0 0x2000\n", "cfg").unwrap_err();
    insta::assert_snapshot!(
        err.to_string(),
        @"failed to parse config file 'cfg': line 2: size 0x2000 differs from first device (0x4000)"
    );
}

#[test]
fn test_legacy_rejects_garbage() {
    assert!(matches!(
        parse_legacy_str("uboot:\n  size: 0x4000\n", "cfg"),
        Err(ConfigError::ParseError { .. })
    ));
    assert!(matches!(
        parse_legacy_str("# only a comment\n\n", "cfg"),
        Err(ConfigError::ParseError { .. })
    ));
    assert!(matches!(
        parse_legacy_str("/dev/a 0 0x400\n/dev/b 0 0x400\n/dev/c 0 0x400\n", "cfg"),
        Err(ConfigError::ParseError { .. })
    ));
}

#[test]
fn test_structured_named_namespace() {
    let file = write_config(STRUCTURED);
    let layout = ConfigLoader::new(file.path())
        .with_namespace(Some("baptism".to_string()))
        .load()
        .unwrap();

    assert_eq!(layout.format, ConfigFormat::Structured);
    assert_eq!(layout.namespace.as_deref(), Some("baptism"));
    assert_eq!(layout.size, 4096);
    assert_eq!(layout.lockfile, PathBuf::from(DEFAULT_LOCKFILE));
    assert_eq!(
        layout.devices,
        vec![Device::new("/dev/mmcblk0boot1", 0x10_0000)]
    );
}

#[test]
fn test_structured_device_attributes() {
    let file = write_config(STRUCTURED);
    let layout = ConfigLoader::new(file.path())
        .with_namespace(Some("uboot".to_string()))
        .load()
        .unwrap();

    assert_eq!(layout.size, 0x4000);
    assert_eq!(layout.lockfile, PathBuf::from("/run/lock/uboot.lock"));
    assert!(layout.is_redundant());
    assert_eq!(layout.devices[0].offset, 0xA_0000);
    assert_eq!(layout.devices[0].sector_size, Some(0x1_0000));
    assert!(layout.devices[0].unlock);
    assert!(!layout.devices[1].unlock);
}

#[test]
fn test_structured_single_namespace_is_default() {
    let file = write_config("env:\n  size: 0x2000\n  devices:\n    - path: /tmp/env.img\n      offset: 0\n");
    let layout = ConfigLoader::new(file.path()).load().unwrap();
    assert_eq!(layout.namespace.as_deref(), Some("env"));
    assert_eq!(layout.size, 0x2000);
}

#[test]
fn test_unknown_namespace_fails_both_formats() {
    let file = write_config(STRUCTURED);
    let err = ConfigLoader::new(file.path())
        .with_namespace(Some("missing".to_string()))
        .load()
        .unwrap_err();
    assert!(matches!(err, StoreError::Config(_)));
    assert!(err.to_string().contains("namespace 'missing' not found"));
}

#[test]
fn test_falls_back_to_legacy() {
    let file = write_config(LEGACY);
    let layout = ConfigLoader::new(file.path()).load().unwrap();
    assert_eq!(layout.format, ConfigFormat::Legacy);
    assert_eq!(layout.devices.len(), 2);
}

#[test]
fn test_missing_source_is_unreachable() {
    let dir = tempfile::tempdir().unwrap();
    let err = ConfigLoader::new(dir.path().join("absent.config"))
        .load()
        .unwrap_err();
    assert!(matches!(err, StoreError::SourceUnreachable { .. }));
    assert_eq!(err.status(), -libc::ENOENT);
}

#[test]
fn test_validate_device_count() {
    let layout = EnvLayout {
        format: ConfigFormat::Structured,
        namespace: Some("uboot".to_string()),
        size: 0x100,
        lockfile: PathBuf::from(DEFAULT_LOCKFILE),
        devices: Vec::new(),
    };
    insta::assert_snapshot!(
        layout.validate().unwrap_err().to_string(),
        @"invalid value for 'devices' in section '[uboot]': expected 1 or 2 devices, got 0"
    );
}

#[test]
fn test_validate_region_size() {
    let layout = EnvLayout {
        format: ConfigFormat::Legacy,
        namespace: None,
        size: 4,
        lockfile: PathBuf::from(DEFAULT_LOCKFILE),
        devices: vec![Device::new("/dev/null", 0)],
    };
    assert!(matches!(
        layout.validate(),
        Err(ConfigError::InvalidValue { .. })
    ));
}

#[test]
fn test_validate_rejects_oversized_region() {
    let file = write_config("/dev/mmcblk0 0x0 0xffffffffffff\n");
    let err = ConfigLoader::new(file.path()).load().unwrap_err();
    assert!(matches!(err, StoreError::Config(_)));
    assert_eq!(err.errno(), libc::EINVAL);
    assert!(err.to_string().contains("exceeds the 0x1000000 byte limit"));

    let layout = EnvLayout {
        format: ConfigFormat::Legacy,
        namespace: None,
        size: MAX_REGION_SIZE,
        lockfile: PathBuf::from(DEFAULT_LOCKFILE),
        devices: vec![Device::new("/dev/mmcblk0", 0)],
    };
    assert!(layout.validate().is_ok());
}
