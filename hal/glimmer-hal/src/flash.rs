//! Flash storage abstractions
//!
//! Provides traits for persistent key-value storage that can be implemented
//! by chip-specific HALs using their flash memory.

/// Largest value a backend must be able to store under one key
pub const MAX_ITEM_LEN: usize = 256;

/// Storage keys for persisted settings
///
/// Only the user-editable profile slots and the global settings record live
/// in flash. Factory profiles are compiled in and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Global settings shared across profiles (indicator backend, last profile)
    Global = 0,
    /// User profile slot 3
    Profile3 = 3,
    /// User profile slot 4
    Profile4 = 4,
    /// User profile slot 5
    Profile5 = 5,
}

impl StorageKey {
    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::Global),
            3 => Some(StorageKey::Profile3),
            4 => Some(StorageKey::Profile4),
            5 => Some(StorageKey::Profile5),
            _ => None,
        }
    }

    /// Key holding the given profile slot, if that slot is persisted
    pub fn for_profile_slot(slot: u8) -> Option<Self> {
        match slot {
            3 => Some(StorageKey::Profile3),
            4 => Some(StorageKey::Profile4),
            5 => Some(StorageKey::Profile5),
            _ => None,
        }
    }
}

/// Errors from flash storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Flash operation failed
    Flash,
    /// The storage layout is damaged; the stored value cannot be trusted
    Corrupted,
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Storage is full
    Full,
}

impl core::fmt::Display for FlashError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = match self {
            FlashError::Flash => "flash operation failed",
            FlashError::Corrupted => "stored data corrupted",
            FlashError::NotFound => "key not found",
            FlashError::BufferTooSmall => "buffer too small",
            FlashError::Full => "storage full",
        };
        f.write_str(text)
    }
}

/// Flash storage trait
///
/// Provides wear-leveled key-value storage for settings records.
/// Implementations should handle:
/// - Wear leveling across flash sectors
/// - Atomic writes where possible
///
/// Record integrity (magic, CRC, range checks, read-back verification) is
/// the caller's responsibility.
pub trait FlashStorage {
    /// Read a value by key into the provided buffer
    ///
    /// # Returns
    /// The number of bytes read, or an error.
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, FlashError>>;

    /// Write a value by key
    fn write(
        &mut self,
        key: StorageKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), FlashError>>;

    /// Check if a key exists in storage
    fn exists(&mut self, key: StorageKey) -> impl core::future::Future<Output = bool>;

    /// Erase all stored data
    ///
    /// This erases the entire settings partition. Use with caution!
    fn erase_all(&mut self) -> impl core::future::Future<Output = Result<(), FlashError>>;
}

// Implement the sequential-storage Key trait when the feature is enabled
#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_byte_roundtrip() {
        for key in [
            StorageKey::Global,
            StorageKey::Profile3,
            StorageKey::Profile4,
            StorageKey::Profile5,
        ] {
            assert_eq!(StorageKey::from_u8(key.as_u8()), Some(key));
        }
        assert_eq!(StorageKey::from_u8(1), None);
        assert_eq!(StorageKey::from_u8(6), None);
    }

    #[test]
    fn test_factory_slots_have_no_key() {
        assert_eq!(StorageKey::for_profile_slot(1), None);
        assert_eq!(StorageKey::for_profile_slot(2), None);
        assert_eq!(StorageKey::for_profile_slot(3), Some(StorageKey::Profile3));
        assert_eq!(StorageKey::for_profile_slot(5), Some(StorageKey::Profile5));
        assert_eq!(StorageKey::for_profile_slot(6), None);
    }
}
