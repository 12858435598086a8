// baptismdata: Baptism Data Store Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Ordered in-memory variable table.

use crate::error::{StoreError, StoreResult};

/// A variable and its value.
///
/// Names and values read from the medium that are not valid UTF-8 keep their
/// original bytes; [`Entry::name`] and [`Entry::value`] are lossy views and
/// the image is always written from [`Entry::name_bytes`] and
/// [`Entry::value_bytes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    name: String,
    value: String,
    raw_name: Option<Box<[u8]>>,
    raw_value: Option<Box<[u8]>>,
}

impl Entry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            raw_name: None,
            raw_value: None,
        }
    }

    /// Entry from bytes as found on the medium.
    #[must_use]
    pub fn from_bytes(name: &[u8], value: &[u8]) -> Self {
        Self {
            name: String::from_utf8_lossy(name).into_owned(),
            value: String::from_utf8_lossy(value).into_owned(),
            raw_name: non_utf8(name),
            raw_value: non_utf8(value),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn name_bytes(&self) -> &[u8] {
        self.raw_name.as_deref().unwrap_or(self.name.as_bytes())
    }

    #[must_use]
    pub fn value_bytes(&self) -> &[u8] {
        self.raw_value.as_deref().unwrap_or(self.value.as_bytes())
    }

    fn replace_value(&mut self, value: &str) {
        value.clone_into(&mut self.value);
        self.raw_value = None;
    }

    /// Bytes this entry takes in an image: `name=value\0`.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        record_len(self.name_bytes(), self.value_bytes())
    }
}

/// Copy of `bytes` if they are not valid UTF-8.
fn non_utf8(bytes: &[u8]) -> Option<Box<[u8]>> {
    std::str::from_utf8(bytes).is_err().then(|| bytes.into())
}

const fn record_len(name: &[u8], value: &[u8]) -> usize {
    name.len() + value.len() + 2
}

/// Variables in insertion order, names unique.
///
/// New variables are appended, updates keep their position and deletions
/// close the gap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvTable {
    entries: Vec<Entry>,
}

impl EnvTable {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn position(&self, name: &[u8]) -> Option<usize> {
        self.entries.iter().position(|e| e.name_bytes() == name)
    }

    /// Lossy view of the value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name.as_bytes()).map(|i| self.entries[i].value())
    }

    /// Value of `name` as stored.
    #[must_use]
    pub fn get_bytes(&self, name: &str) -> Option<&[u8]> {
        self.position(name.as_bytes())
            .map(|i| self.entries[i].value_bytes())
    }

    /// Apply a set (`Some`) or delete (`None`) without validation.
    pub fn set(&mut self, name: &str, value: Option<&str>) {
        match (self.position(name.as_bytes()), value) {
            (Some(i), Some(value)) => self.entries[i].replace_value(value),
            (Some(i), None) => {
                self.entries.remove(i);
            }
            (None, Some(value)) => self.entries.push(Entry::new(name, value)),
            (None, None) => {}
        }
    }

    /// Create or replace a variable with bytes read from the medium.
    pub fn insert_raw(&mut self, name: &[u8], value: &[u8]) {
        let entry = Entry::from_bytes(name, value);
        match self.position(name) {
            Some(i) => self.entries[i] = entry,
            None => self.entries.push(entry),
        }
    }

    #[must_use]
    pub fn entry(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Size of the data area this table needs, terminator included.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        self.entries.iter().map(Entry::encoded_len).sum::<usize>() + 1
    }

    /// Size of the data area after `set(name, value)` would be applied.
    #[must_use]
    pub fn encoded_len_after(&self, name: &str, value: Option<&str>) -> usize {
        let current = self.encoded_len();
        let old = self
            .position(name.as_bytes())
            .map_or(0, |i| self.entries[i].encoded_len());
        let new = value.map_or(0, |v| record_len(name.as_bytes(), v.as_bytes()));
        current - old + new
    }
}

impl<'a> IntoIterator for &'a EnvTable {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Reject names and values that cannot be represented in an image.
///
/// # Errors
///
/// Returns [`StoreError::InvalidArgument`] for an empty name, a name
/// containing `=`, or a NUL byte in name or value.
pub fn validate(name: &str, value: Option<&str>) -> StoreResult<()> {
    if name.is_empty() {
        return Err(StoreError::invalid("variable name is empty"));
    }
    if name.contains('=') {
        return Err(StoreError::invalid(format!(
            "variable name '{name}' contains '='"
        )));
    }
    if name.contains('\0') || value.is_some_and(|v| v.contains('\0')) {
        return Err(StoreError::invalid(format!(
            "variable '{}' contains a NUL byte",
            name.escape_default()
        )));
    }
    Ok(())
}
