// baptismdata: Baptism Data Store Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Environment store adapter.
//!
//! ```text
//!  EnvBackend (trait)        get / set / entry / store
//!       ^
//!       |
//!   UbootEnv ----- lock file (exclusive, held until drop)
//!       |
//!       +-- EnvTable   ordered name=value entries
//!       +-- image      [crc32][flags?][name=value\0 ... \0][pad]
//!       +-- devices    1 copy, or 2 copies (redundant)
//! ```

pub mod image;
pub mod table;
pub mod uboot;


pub use table::{Entry, EnvTable};
pub use uboot::UbootEnv;

use crate::error::StoreResult;

/// Capability a store context needs from the persistent environment.
///
/// Implementations keep the variable table in memory; only [`store`]
/// touches the storage medium.
///
/// [`store`]: EnvBackend::store
pub trait EnvBackend {
    /// Stored bytes of `name`, if the variable exists.
    fn get(&self, name: &str) -> Option<&[u8]>;

    /// Create, replace (`Some`) or delete (`None`) a variable in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or value is not acceptable or the table
    /// would no longer fit the medium. The table is left untouched then.
    fn set(&mut self, name: &str, value: Option<&str>) -> StoreResult<()>;

    /// Number of variables.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Variable at `index` in table order.
    fn entry(&self, index: usize) -> Option<&Entry>;

    /// Write the in-memory table back to the storage medium.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium rejects or fails the write.
    fn store(&mut self) -> StoreResult<()>;
}
