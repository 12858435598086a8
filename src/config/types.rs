// baptismdata: Baptism Data Store Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Serde types for the structured (YAML) configuration.
//!
//! ```text
//! Namespaces: [(name, NamespaceSpec)]   file order preserved
//! NamespaceSpec: size, lockfile?, devices[DeviceSpec]
//! DeviceSpec: path, offset, sectorsize?, sectors?, unlock?
//! Number: 16384 | "0x4000"     Flag: true | "yes" | "no"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use super::{ConfigFormat, DEFAULT_LOCKFILE, Device, EnvLayout, parse_number};
use crate::error::ConfigError;

/// Integer that may be written as a number or a hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Number(pub u64);

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NumberVisitor;

        impl Visitor<'_> for NumberVisitor {
            type Value = Number;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or a 0x prefixed hex string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Number, E> {
                Ok(Number(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Number, E> {
                u64::try_from(v)
                    .map(Number)
                    .map_err(|_| E::custom(format!("negative value {v}")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Number, E> {
                parse_number(v)
                    .map(Number)
                    .ok_or_else(|| E::custom(format!("invalid number '{v}'")))
            }
        }

        deserializer.deserialize_any(NumberVisitor)
    }
}

/// Boolean that also accepts `yes`/`no`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flag(pub bool);

impl<'de> Deserialize<'de> for Flag {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FlagVisitor;

        impl Visitor<'_> for FlagVisitor {
            type Value = Flag;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a boolean or yes/no")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Flag, E> {
                Ok(Flag(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Flag, E> {
                match v.to_ascii_lowercase().as_str() {
                    "yes" | "true" | "on" => Ok(Flag(true)),
                    "no" | "false" | "off" => Ok(Flag(false)),
                    _ => Err(E::custom(format!("invalid flag '{v}'"))),
                }
            }
        }

        deserializer.deserialize_any(FlagVisitor)
    }
}

/// One `devices` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceSpec {
    pub path: PathBuf,
    pub offset: Number,
    #[serde(default)]
    pub sectorsize: Option<Number>,
    #[serde(default)]
    pub sectors: Option<Number>,
    #[serde(default)]
    pub unlock: Flag,
}

/// One namespace of the structured configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NamespaceSpec {
    pub size: Number,
    #[serde(default)]
    pub lockfile: Option<PathBuf>,
    pub devices: Vec<DeviceSpec>,
}

/// All namespaces in file order.
#[derive(Debug, Clone, Default)]
pub struct Namespaces(pub Vec<(String, NamespaceSpec)>);

impl<'de> Deserialize<'de> for Namespaces {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NamespacesVisitor;

        impl<'de> Visitor<'de> for NamespacesVisitor {
            type Value = Namespaces;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of namespaces")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Namespaces, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut namespaces = Vec::with_capacity(map.size_hint().unwrap_or(1));
                while let Some((name, spec)) = map.next_entry::<String, NamespaceSpec>()? {
                    namespaces.push((name, spec));
                }
                Ok(Namespaces(namespaces))
            }
        }

        deserializer.deserialize_map(NamespacesVisitor)
    }
}

impl Namespaces {
    /// Turn the requested (or first) namespace into an [`EnvLayout`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoNamespace`] if the namespace is missing or the
    /// file defines none, and [`ConfigError::InvalidValue`] if the size does
    /// not fit into memory.
    pub fn into_layout(self, namespace: Option<&str>) -> Result<EnvLayout, ConfigError> {
        let (name, spec) = match namespace {
            Some(wanted) => self
                .0
                .into_iter()
                .find(|(name, _)| name == wanted)
                .ok_or_else(|| ConfigError::NoNamespace(wanted.to_string()))?,
            None => self
                .0
                .into_iter()
                .next()
                .ok_or_else(|| ConfigError::NoNamespace("<any>".to_string()))?,
        };

        let size = usize::try_from(spec.size.0).map_err(|_| ConfigError::InvalidValue {
            section: name.clone(),
            key: "size".to_string(),
            message: format!("{} does not fit into memory", spec.size.0),
        })?;

        let devices = spec
            .devices
            .into_iter()
            .map(|dev| Device {
                path: dev.path,
                offset: dev.offset.0,
                sector_size: dev.sectorsize.map(|n| n.0),
                sectors: dev.sectors.map(|n| n.0),
                unlock: dev.unlock.0,
            })
            .collect();

        Ok(EnvLayout {
            format: ConfigFormat::Structured,
            namespace: Some(name),
            size,
            lockfile: spec
                .lockfile
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCKFILE)),
            devices,
        })
    }
}

/// Read `path` as YAML through the `config` crate.
///
/// # Errors
///
/// Returns [`ConfigError::ParseError`] if the file is not a YAML map of
/// namespaces, or the errors of [`Namespaces::into_layout`].
pub fn parse_structured(path: &Path, namespace: Option<&str>) -> Result<EnvLayout, ConfigError> {
    use config::{File, FileFormat};

    let parse_error = |e: config::ConfigError| ConfigError::ParseError {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let namespaces: Namespaces = config::Config::builder()
        .add_source(File::from(path).format(FileFormat::Yaml).required(true))
        .build()
        .map_err(parse_error)?
        .try_deserialize()
        .map_err(parse_error)?;

    namespaces.into_layout(namespace)
}
