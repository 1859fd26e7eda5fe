//! Test doubles.

use std::collections::{BTreeMap, BTreeSet};
use std::vec::Vec;

use glimmer_hal::{FlashError, FlashStorage, StorageKey};

/// In-memory key/value flash with injectable failures
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: BTreeMap<u8, Vec<u8>>,
    /// Keys whose reads report a damaged map until rewritten
    damaged: BTreeSet<u8>,
    /// Every read fails with `FlashError::Flash`
    pub fail_reads: bool,
    /// Every write fails with `FlashError::Flash`
    pub fail_writes: bool,
    /// Writes succeed but store a damaged copy
    pub mangle_writes: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: StorageKey) -> bool {
        self.items.contains_key(&key.as_u8())
    }

    /// Store raw bytes, bypassing the failure switches
    pub fn put(&mut self, key: StorageKey, bytes: &[u8]) {
        self.items.insert(key.as_u8(), bytes.to_vec());
    }

    /// Make reads of `key` fail with `FlashError::Corrupted` until it is written
    pub fn damage(&mut self, key: StorageKey) {
        self.damaged.insert(key.as_u8());
    }

    /// Overwrite one stored byte
    pub fn corrupt(&mut self, key: StorageKey, index: usize, value: u8) {
        if let Some(byte) = self
            .items
            .get_mut(&key.as_u8())
            .and_then(|item| item.get_mut(index))
        {
            *byte = value;
        }
    }
}

impl FlashStorage for MemoryStorage {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        if self.fail_reads {
            return Err(FlashError::Flash);
        }
        if self.damaged.contains(&key.as_u8()) {
            return Err(FlashError::Corrupted);
        }
        let item = self.items.get(&key.as_u8()).ok_or(FlashError::NotFound)?;
        let dest = buffer
            .get_mut(..item.len())
            .ok_or(FlashError::BufferTooSmall)?;
        dest.copy_from_slice(item);
        Ok(item.len())
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        if self.fail_writes {
            return Err(FlashError::Flash);
        }
        let mut stored = data.to_vec();
        if self.mangle_writes {
            if let Some(last) = stored.last_mut() {
                *last ^= 0xFF;
            }
        }
        self.items.insert(key.as_u8(), stored);
        self.damaged.remove(&key.as_u8());
        Ok(())
    }

    async fn exists(&mut self, key: StorageKey) -> bool {
        self.items.contains_key(&key.as_u8())
    }

    async fn erase_all(&mut self) -> Result<(), FlashError> {
        if self.fail_writes {
            return Err(FlashError::Flash);
        }
        self.items.clear();
        self.damaged.clear();
        Ok(())
    }
}
