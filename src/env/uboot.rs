// baptismdata: Baptism Data Store Tool
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! U-Boot environment on one or two device copies.
//!
//! ```text
//! lock()   open lock file --> try_lock (exclusive, non-blocking)
//! load()   read copies --> decode --> pick valid/newer --> table
//!          no valid copy --> NoData (table stays empty)
//! store()  encode --> write inactive copy (redundant) or copy 0 --> sync
//! ```

use std::fs::{File, OpenOptions, TryLockError};
use std::io::{Read, Seek, SeekFrom, Write};

use tracing::{debug, info};

use super::image::{self, Decoded};
use super::table::{self, Entry, EnvTable};
use super::EnvBackend;
use crate::config::{Device, EnvLayout};
use crate::error::{StoreError, StoreResult};

/// Locked U-Boot environment described by an [`EnvLayout`].
///
/// The lock is held for the whole lifetime of the value and released when
/// it is dropped.
#[derive(Debug)]
pub struct UbootEnv {
    layout: EnvLayout,
    table: EnvTable,
    active: usize,
    flags: u8,
    _lock: File,
}

impl UbootEnv {
    /// Take the exclusive lock for `layout`; the table starts empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Lock`] if the lock file cannot be opened or is
    /// held by someone else.
    pub fn lock(layout: EnvLayout) -> StoreResult<Self> {
        let lock_error = |source| StoreError::Lock {
            path: layout.lockfile.clone(),
            source,
        };

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&layout.lockfile)
            .map_err(lock_error)?;

        match file.try_lock() {
            Ok(()) => {}
            Err(TryLockError::WouldBlock) => {
                return Err(lock_error(std::io::Error::new(
                    std::io::ErrorKind::WouldBlock,
                    "environment is locked by another user",
                )));
            }
            Err(TryLockError::Error(e)) => return Err(lock_error(e)),
        }
        debug!(lockfile = %layout.lockfile.display(), "environment locked");

        Ok(Self {
            layout,
            table: EnvTable::new(),
            active: 0,
            flags: 0,
            _lock: file,
        })
    }

    /// Read the environment from the medium.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DeviceRead`] if a device cannot be read and
    /// [`StoreError::NoData`] if no copy holds a valid environment.
    pub fn load(&mut self) -> StoreResult<()> {
        let redundant = self.layout.is_redundant();
        let mut copies = Vec::with_capacity(self.layout.devices.len());
        for device in &self.layout.devices {
            let copy = read_copy(device, self.layout.size)?
                .and_then(|buf| image::decode(&buf, redundant));
            debug!(
                device = %device.path.display(),
                offset = device.offset,
                valid = copy.is_some(),
                "read environment copy"
            );
            copies.push(copy);
        }

        let active = match copies.as_slice() {
            [Some(_)] | [Some(_), None] => 0,
            [None, Some(_)] => 1,
            [Some(a), Some(b)] => image::newer_copy(a.flags, b.flags),
            _ => return Err(StoreError::NoData),
        };

        let Decoded { flags, table } = copies
            .swap_remove(active)
            .ok_or(StoreError::NoData)?;
        self.active = active;
        self.flags = flags;
        self.table = table;
        debug!(
            copy = active,
            flags,
            variables = self.table.len(),
            "environment loaded"
        );
        Ok(())
    }

    /// Index of the copy the table was read from or last written to.
    #[must_use]
    pub const fn active_copy(&self) -> usize {
        self.active
    }
}

impl EnvBackend for UbootEnv {
    fn get(&self, name: &str) -> Option<&[u8]> {
        self.table.get_bytes(name)
    }

    fn set(&mut self, name: &str, value: Option<&str>) -> StoreResult<()> {
        table::validate(name, value)?;

        let needed = image::header_len(self.layout.is_redundant())
            + self.table.encoded_len_after(name, value);
        if needed > self.layout.size {
            return Err(StoreError::NoSpace {
                needed,
                available: self.layout.size,
            });
        }

        self.table.set(name, value);
        Ok(())
    }

    fn len(&self) -> usize {
        self.table.len()
    }

    fn entry(&self, index: usize) -> Option<&Entry> {
        self.table.entry(index)
    }

    fn store(&mut self) -> StoreResult<()> {
        let (target, flags) = if self.layout.is_redundant() {
            (1 - self.active, Some(self.flags.wrapping_add(1)))
        } else {
            (0, None)
        };

        let buf = image::encode(&self.table, self.layout.size, flags)?;
        let device = &self.layout.devices[target];
        write_copy(device, &buf)?;

        self.active = target;
        self.flags = flags.unwrap_or(0);
        info!(
            device = %device.path.display(),
            offset = device.offset,
            variables = self.table.len(),
            "environment written"
        );
        Ok(())
    }
}

/// Read one copy; `None` if the device ends before the region does.
fn read_copy(device: &Device, size: usize) -> StoreResult<Option<Vec<u8>>> {
    let read_error = |source| StoreError::DeviceRead {
        path: device.path.clone(),
        source,
    };

    let mut file = File::open(&device.path).map_err(read_error)?;

    // st_size is 0 for block devices, the end offset is not
    let end = file.seek(SeekFrom::End(0)).map_err(read_error)?;
    let region_end = u64::try_from(size)
        .ok()
        .and_then(|size| device.offset.checked_add(size));
    if region_end.is_none_or(|region_end| region_end > end) {
        debug!(
            device = %device.path.display(),
            device_len = end,
            "device shorter than environment region"
        );
        return Ok(None);
    }

    file.seek(SeekFrom::Start(device.offset))
        .map_err(read_error)?;

    let mut buf = vec![0u8; size];
    match file.read_exact(&mut buf) {
        Ok(()) => Ok(Some(buf)),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(read_error(e)),
    }
}

fn write_copy(device: &Device, buf: &[u8]) -> StoreResult<()> {
    let write_error = |source| StoreError::Write {
        path: device.path.clone(),
        source,
    };

    let mut file = OpenOptions::new()
        .write(true)
        .open(&device.path)
        .map_err(write_error)?;
    file.seek(SeekFrom::Start(device.offset))
        .map_err(write_error)?;
    file.write_all(buf).map_err(write_error)?;
    file.sync_all().map_err(write_error)
}
