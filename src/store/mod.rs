// baptismdata: Baptism Data Store Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Store context: exclusive access, change detection and deferred writes.
//!
//! # Lifecycle
//!
//! ```text
//! Context::open_with(&OpenOptions)
//!   config readable? --> parse (structured | legacy) --> lock --> load
//!                                                      NoData => empty table
//!        |
//!        v
//!   get / set / load_file / iterate      (in memory, dirty on real change)
//!        |
//!        v
//!   flush()   dirty? --no--> no-op
//!               |yes
//!               v
//!          backend.store() --ok--> dirty = false
//!        |
//!        v
//!   close()   unlock, no implicit flush
//! ```
//!
//! # Change Detection
//!
//! ```text
//!  old      new      changed
//!  Some(a)  Some(b)  a != b
//!  None     Some(_)  yes (create)
//!  Some(_)  None     yes (delete)
//!  None     None     no
//! ```

pub mod import;


use std::io::BufRead;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use bon::Builder;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_CONFIG_PATH;
use crate::config::loader::ConfigLoader;
use crate::env::{EnvBackend, Entry, UbootEnv};
use crate::error::{StoreError, StoreResult};

/// Variable holding the device serial number.
pub const SERIAL_NUMBER_VAR: &str = "serial#";

/// Where to find the environment configuration.
#[derive(Debug, Clone, Builder)]
pub struct OpenOptions {
    #[builder(setters(name = with_config_path), into, default = PathBuf::from(DEFAULT_CONFIG_PATH))]
    config_path: PathBuf,
    #[builder(setters(name = with_namespace), into)]
    namespace: Option<String>,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl OpenOptions {
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

/// Position in the stateless iteration protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    /// Before the first entry.
    #[default]
    Start,
    /// At the entry with this index.
    At(usize),
    /// Past the last entry.
    End,
}

/// An open, locked baptism data store.
///
/// Dropping the context has the same effect as [`Context::close`].
pub struct Context {
    backend: Box<dyn EnvBackend>,
    dirty: bool,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("variables", &self.backend.len())
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Open the store described by the default configuration source.
    ///
    /// # Errors
    ///
    /// See [`Context::open_with`].
    pub fn open() -> StoreResult<Self> {
        Self::open_with(&OpenOptions::default())
    }

    /// Lock and load the store described by `options`.
    ///
    /// The lock is held until the context is closed or dropped. A medium
    /// without a valid environment yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration source is missing or unreadable.
    /// - No supported format can parse it.
    /// - The lock cannot be acquired.
    /// - A device cannot be read.
    pub fn open_with(options: &OpenOptions) -> StoreResult<Self> {
        let layout = ConfigLoader::new(&options.config_path)
            .with_namespace(options.namespace.clone())
            .load()?;

        let mut env = UbootEnv::lock(layout)?;
        match env.load() {
            Ok(()) => {}
            Err(StoreError::NoData) => {
                warn!("no valid environment found, starting with an empty store");
            }
            Err(e) => return Err(e),
        }

        Ok(Self::with_backend(Box::new(env)))
    }

    /// Wrap an already opened backend.
    #[must_use]
    pub fn with_backend(backend: Box<dyn EnvBackend>) -> Self {
        Self {
            backend,
            dirty: false,
        }
    }

    /// Release the lock and all resources. Unflushed changes are discarded.
    pub fn close(self) {
        if self.dirty {
            debug!("closing store with unflushed changes");
        }
        drop(self);
    }

    /// Whether changes are pending since open or the last flush.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Copy of the value of `name`, `None` if the variable does not exist.
    ///
    /// Bytes that are not valid UTF-8 are replaced with U+FFFD.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.backend
            .get(name)
            .map(|value| String::from_utf8_lossy(value).into_owned())
    }

    /// Set (`Some`) or delete (`None`) a variable.
    ///
    /// Nothing happens, and the store stays clean, when the value would not
    /// change.
    ///
    /// # Errors
    ///
    /// Returns the backend error if the change cannot be applied; the dirty
    /// state is left as it was.
    pub fn set(&mut self, name: &str, value: Option<&str>) -> StoreResult<()> {
        let changed = match (self.backend.get(name), value) {
            (Some(old), Some(new)) => old != new.as_bytes(),
            (None, None) => false,
            _ => true,
        };

        if !changed {
            debug!(name, "value unchanged, skipping");
            return Ok(());
        }

        self.backend.set(name, value)?;
        self.dirty = true;
        debug!(name, deleted = value.is_none(), "variable updated");
        Ok(())
    }

    /// Apply an import script file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SourceUnreachable`] if the file cannot be opened
    /// or read, or the first failing [`Context::set`].
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> StoreResult<()> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| StoreError::SourceUnreachable {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_reader(std::io::BufReader::new(file), path)
    }

    /// Apply an import script read from `reader`; `origin` names it in errors.
    ///
    /// Lines are applied in order and the first failure stops the import.
    /// Changes applied before the failure stay pending.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SourceUnreachable`] on read errors,
    /// [`StoreError::InvalidArgument`] for a line that is not valid UTF-8, or
    /// the first failing [`Context::set`].
    pub fn load_reader<R: BufRead>(&mut self, reader: R, origin: &Path) -> StoreResult<()> {
        let mut applied = 0usize;
        for line in import::parse_script(reader) {
            let line = line.map_err(|source| match source.kind() {
                std::io::ErrorKind::InvalidData => {
                    StoreError::invalid(format!("{}: {source}", origin.display()))
                }
                _ => StoreError::SourceUnreachable {
                    path: origin.to_path_buf(),
                    source,
                },
            })?;
            self.set(&line.name, line.value.as_deref())?;
            applied += 1;
        }
        debug!(origin = %origin.display(), applied, "import script applied");
        Ok(())
    }

    /// Write pending changes to the storage medium.
    ///
    /// Does nothing when the store is clean.
    ///
    /// # Errors
    ///
    /// Returns the backend error; the store stays dirty so the flush can be
    /// retried.
    pub fn flush(&mut self) -> StoreResult<()> {
        if !self.dirty {
            debug!("store clean, nothing to flush");
            return Ok(());
        }

        self.backend.store()?;
        self.dirty = false;
        info!(variables = self.backend.len(), "baptism data stored");
        Ok(())
    }

    /// Advance `cursor` by one entry.
    ///
    /// `Start` yields the first entry, `End` stays `End`.
    #[must_use]
    pub fn iterate(&self, cursor: Cursor) -> Cursor {
        let next = match cursor {
            Cursor::Start => 0,
            Cursor::At(index) => match index.checked_add(1) {
                Some(next) => next,
                None => return Cursor::End,
            },
            Cursor::End => return Cursor::End,
        };
        if next < self.backend.len() {
            Cursor::At(next)
        } else {
            Cursor::End
        }
    }

    /// Entry at `cursor`, `None` for `Start` and `End`.
    #[must_use]
    pub fn entry(&self, cursor: Cursor) -> Option<&Entry> {
        match cursor {
            Cursor::At(index) => self.backend.entry(index),
            Cursor::Start | Cursor::End => None,
        }
    }

    /// All entries in table order.
    #[must_use]
    pub const fn entries(&self) -> Entries<'_> {
        Entries {
            ctx: self,
            cursor: Cursor::Start,
        }
    }

    /// The device serial number, if provisioned.
    #[must_use]
    pub fn serial_number(&self) -> Option<String> {
        self.get(SERIAL_NUMBER_VAR)
    }
}

/// Iterator over the entries of a [`Context`].
#[derive(Debug)]
pub struct Entries<'a> {
    ctx: &'a Context,
    cursor: Cursor,
}

impl<'a> Iterator for Entries<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor = self.ctx.iterate(self.cursor);
        self.ctx.entry(self.cursor)
    }
}

impl FusedIterator for Entries<'_> {}
