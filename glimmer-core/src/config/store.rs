//! Profile and global settings persistence.
//!
//! The store owns the active profile and the global settings, and is the
//! only code that writes them to flash. Every write is read back, decoded
//! and revalidated before it counts as saved. A damaged record never
//! reaches the active profile: it is replaced by the slot's defaults,
//! which are then written back.

use glimmer_hal::{FlashError, FlashStorage, StorageKey};

use super::profile::{IntegrityError, Profile};
use super::record::{self, EncodeError, GLOBAL_MAGIC, MAX_RECORD_LEN, PROFILE_MAGIC};
use super::types::{GlobalConfig, OutputMode, ProfileSlot};

/// Storage failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Flash read/write failed
    Flash(FlashError),
    /// Record did not fit the encode buffer
    Encode,
    /// Read-back after a write did not match what was written
    Verify,
    /// Factory slots cannot be written
    ReadOnly(ProfileSlot),
}

impl From<FlashError> for StoreError {
    fn from(e: FlashError) -> Self {
        StoreError::Flash(e)
    }
}

impl From<EncodeError> for StoreError {
    fn from(_: EncodeError) -> Self {
        StoreError::Encode
    }
}

impl core::fmt::Display for StoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StoreError::Flash(e) => write!(f, "flash error: {}", e),
            StoreError::Encode => f.write_str("record too large"),
            StoreError::Verify => f.write_str("read-back verification failed"),
            StoreError::ReadOnly(slot) => write!(f, "profile {} is read-only", slot.number()),
        }
    }
}

/// How a load was satisfied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadOutcome {
    /// Read from flash and valid
    Loaded,
    /// Factory slot, compiled in
    Factory,
    /// Stored record was missing or damaged; defaults were written back
    Recovered(IntegrityError),
}

/// Owner of the active profile and global settings
pub struct ConfigStore<S: FlashStorage> {
    storage: S,
    active_slot: ProfileSlot,
    profile: Profile,
    global: GlobalConfig,
}

impl<S: FlashStorage> ConfigStore<S> {
    /// Start on factory defaults without touching storage
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            active_slot: ProfileSlot::FACTORY,
            profile: Profile::defaults(ProfileSlot::FACTORY),
            global: GlobalConfig::default(),
        }
    }

    /// Read global settings and load the last active profile.
    ///
    /// Damaged global settings are replaced by defaults. A flash error
    /// reading them is returned without loading a profile.
    pub async fn open(&mut self) -> Result<LoadOutcome, StoreError> {
        let mut buffer = [0u8; MAX_RECORD_LEN];
        let global = match self.storage.read(StorageKey::Global, &mut buffer).await {
            Ok(len) => record::decode::<GlobalConfig>(GLOBAL_MAGIC, &buffer[..len])
                .and_then(|g| {
                    if g.last_profile.is_valid() {
                        Ok(g)
                    } else {
                        Err(IntegrityError::InvalidSlot)
                    }
                })
                .ok(),
            Err(FlashError::NotFound | FlashError::BufferTooSmall | FlashError::Corrupted) => None,
            Err(e) => return Err(e.into()),
        };

        match global {
            Some(g) => self.global = g,
            None => {
                self.global = GlobalConfig::default();
                self.write_global().await?;
            }
        }

        self.load(self.global.last_profile).await
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut Profile {
        &mut self.profile
    }

    pub fn active_slot(&self) -> ProfileSlot {
        self.active_slot
    }

    pub fn global(&self) -> &GlobalConfig {
        &self.global
    }

    /// Whether a user slot has a record in flash
    pub async fn slot_in_use(&mut self, slot: ProfileSlot) -> bool {
        match slot.storage_key() {
            Some(key) => self.storage.exists(key).await,
            None => false,
        }
    }

    /// Make `slot` the active profile.
    ///
    /// On a flash error the active profile is left as it was.
    pub async fn load(&mut self, slot: ProfileSlot) -> Result<LoadOutcome, StoreError> {
        let Some(key) = slot.storage_key() else {
            self.activate(slot, Profile::defaults(slot)).await;
            return Ok(LoadOutcome::Factory);
        };

        let mut buffer = [0u8; MAX_RECORD_LEN];
        let decoded = match self.storage.read(key, &mut buffer).await {
            Ok(len) => record::decode::<Profile>(PROFILE_MAGIC, &buffer[..len])
                .and_then(|p| p.validate().map(|_| p)),
            Err(FlashError::NotFound) => Err(IntegrityError::Empty),
            Err(FlashError::BufferTooSmall | FlashError::Corrupted) => {
                Err(IntegrityError::Malformed)
            }
            Err(e) => return Err(e.into()),
        };

        match decoded {
            Ok(profile) => {
                self.activate(slot, profile).await;
                Ok(LoadOutcome::Loaded)
            }
            Err(reason) => {
                let defaults = Profile::defaults(slot);
                self.write_profile(key, &defaults).await?;
                self.activate(slot, defaults).await;
                Ok(LoadOutcome::Recovered(reason))
            }
        }
    }

    /// Persist the active profile to its slot
    pub async fn save(&mut self) -> Result<(), StoreError> {
        let key = self
            .active_slot
            .storage_key()
            .ok_or(StoreError::ReadOnly(self.active_slot))?;
        let profile = self.profile.clone();
        self.write_profile(key, &profile).await
    }

    /// Overwrite a user slot with its defaults, reloading it if active
    pub async fn reset(&mut self, slot: ProfileSlot) -> Result<(), StoreError> {
        let key = slot.storage_key().ok_or(StoreError::ReadOnly(slot))?;
        self.write_profile(key, &Profile::defaults(slot)).await?;
        if slot == self.active_slot {
            self.load(slot).await?;
        }
        Ok(())
    }

    /// Persist the indicator output hardware selection
    pub async fn set_output_mode(&mut self, mode: OutputMode) -> Result<(), StoreError> {
        let previous = self.global.output_mode;
        self.global.output_mode = mode;
        if let Err(e) = self.write_global().await {
            self.global.output_mode = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Erase all settings and return to factory slot 1
    pub async fn factory_reset(&mut self) -> Result<LoadOutcome, StoreError> {
        self.storage.erase_all().await?;
        self.global = GlobalConfig::default();
        self.write_global().await?;
        self.load(ProfileSlot::FACTORY).await
    }

    async fn activate(&mut self, slot: ProfileSlot, profile: Profile) {
        self.active_slot = slot;
        self.profile = profile;
        if self.global.last_profile != slot {
            let previous = self.global.last_profile;
            self.global.last_profile = slot;
            // Remembering the slot is best effort; the load itself succeeded
            if self.write_global().await.is_err() {
                self.global.last_profile = previous;
            }
        }
    }

    async fn write_profile(&mut self, key: StorageKey, profile: &Profile) -> Result<(), StoreError> {
        let mut buffer = [0u8; MAX_RECORD_LEN];
        let len = record::encode(PROFILE_MAGIC, profile, &mut buffer)?;
        self.storage.write(key, &buffer[..len]).await?;

        let mut readback = [0u8; MAX_RECORD_LEN];
        let read = self.storage.read(key, &mut readback).await?;
        match record::decode::<Profile>(PROFILE_MAGIC, &readback[..read]) {
            Ok(stored) if stored.validate().is_ok() && &stored == profile => Ok(()),
            _ => Err(StoreError::Verify),
        }
    }

    async fn write_global(&mut self) -> Result<(), StoreError> {
        let mut buffer = [0u8; MAX_RECORD_LEN];
        let len = record::encode(GLOBAL_MAGIC, &self.global, &mut buffer)?;
        self.storage.write(StorageKey::Global, &buffer[..len]).await?;

        let mut readback = [0u8; MAX_RECORD_LEN];
        let read = self.storage.read(StorageKey::Global, &mut readback).await?;
        match record::decode::<GlobalConfig>(GLOBAL_MAGIC, &readback[..read]) {
            Ok(stored) if stored == self.global => Ok(()),
            _ => Err(StoreError::Verify),
        }
    }

    #[cfg(test)]
    pub(crate) fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Parameter;
    use crate::testing::MemoryStorage;
    use embassy_futures::block_on;

    fn slot(n: u8) -> ProfileSlot {
        ProfileSlot::new(n).unwrap()
    }

    #[test]
    fn test_new_store_is_factory() {
        let store = ConfigStore::new(MemoryStorage::new());
        assert_eq!(store.active_slot(), slot(1));
        assert_eq!(store.profile(), &Profile::defaults(slot(1)));
    }

    #[test]
    fn test_factory_slots_never_touch_storage() {
        block_on(async {
            let mut store = ConfigStore::new(MemoryStorage::new());
            store.storage_mut().fail_reads = true;
            assert_eq!(store.load(slot(2)).await, Ok(LoadOutcome::Factory));
            assert_eq!(store.active_slot(), slot(2));
            assert_eq!(store.profile(), &Profile::defaults(slot(2)));
        });
    }

    #[test]
    fn test_save_factory_slot_rejected() {
        block_on(async {
            let mut store = ConfigStore::new(MemoryStorage::new());
            store.load(slot(2)).await.unwrap();
            store.profile_mut().random_style = 0;
            assert_eq!(store.save().await, Err(StoreError::ReadOnly(slot(2))));
            assert!(!store.storage_mut().contains(StorageKey::Profile3));
        });
    }

    #[test]
    fn test_empty_user_slot_recovers_and_persists() {
        block_on(async {
            let mut store = ConfigStore::new(MemoryStorage::new());
            assert_eq!(
                store.load(slot(4)).await,
                Ok(LoadOutcome::Recovered(IntegrityError::Empty))
            );
            assert!(store.slot_in_use(slot(4)).await);
            assert_eq!(store.load(slot(4)).await, Ok(LoadOutcome::Loaded));
        });
    }

    #[test]
    fn test_save_load_roundtrip_across_slots() {
        block_on(async {
            let mut store = ConfigStore::new(MemoryStorage::new());
            store.load(slot(3)).await.unwrap();
            store.profile_mut().set(Parameter::ScrollDelay, 200).unwrap();
            store.profile_mut().set(Parameter::RearColor2, 11).unwrap();
            store.save().await.unwrap();

            store.load(slot(1)).await.unwrap();
            assert_eq!(store.profile().scroll_delay_ms, 75);

            assert_eq!(store.load(slot(3)).await, Ok(LoadOutcome::Loaded));
            assert_eq!(store.profile().scroll_delay_ms, 200);
            assert_eq!(store.profile().psi_colors[1][1], 11);
        });
    }

    #[test]
    fn test_bad_magic_matches_reset_and_is_rewritten() {
        block_on(async {
            let mut store = ConfigStore::new(MemoryStorage::new());
            store.load(slot(5)).await.unwrap();
            store.profile_mut().random_style = 6;
            store.save().await.unwrap();

            store.storage_mut().corrupt(StorageKey::Profile5, 0, 0xFF);
            assert_eq!(
                store.load(slot(5)).await,
                Ok(LoadOutcome::Recovered(IntegrityError::BadMagic))
            );
            let recovered = store.profile().clone();

            // Second load sees the rewritten defaults, not the corruption
            assert_eq!(store.load(slot(5)).await, Ok(LoadOutcome::Loaded));
            assert_eq!(store.profile(), &recovered);

            // Same settings as an explicit reset
            store.profile_mut().random_style = 0;
            store.save().await.unwrap();
            store.reset(slot(5)).await.unwrap();
            assert_eq!(store.profile(), &recovered);
        });
    }

    #[test]
    fn test_out_of_range_record_rejected() {
        block_on(async {
            let mut storage = MemoryStorage::new();
            let mut bad = Profile::defaults(slot(3));
            bad.brightness.front_logic = 40;
            let mut buf = [0u8; MAX_RECORD_LEN];
            let len = record::encode(PROFILE_MAGIC, &bad, &mut buf).unwrap();
            storage.put(StorageKey::Profile3, &buf[..len]);

            let mut store = ConfigStore::new(storage);
            assert_eq!(
                store.load(slot(3)).await,
                Ok(LoadOutcome::Recovered(IntegrityError::OutOfRange(
                    Parameter::FrontLogicBrightness
                )))
            );
            assert_eq!(store.profile().brightness.front_logic, 8);
        });
    }

    #[test]
    fn test_flash_error_leaves_state() {
        block_on(async {
            let mut store = ConfigStore::new(MemoryStorage::new());
            store.load(slot(2)).await.unwrap();
            store.storage_mut().fail_reads = true;
            assert_eq!(
                store.load(slot(3)).await,
                Err(StoreError::Flash(FlashError::Flash))
            );
            assert_eq!(store.active_slot(), slot(2));
            assert_eq!(store.profile(), &Profile::defaults(slot(2)));
        });
    }

    #[test]
    fn test_write_verification_failure() {
        block_on(async {
            let mut store = ConfigStore::new(MemoryStorage::new());
            store.load(slot(3)).await.unwrap();
            store.storage_mut().mangle_writes = true;
            assert_eq!(store.save().await, Err(StoreError::Verify));
        });
    }

    #[test]
    fn test_open_restores_last_profile_and_mode() {
        block_on(async {
            let mut store = ConfigStore::new(MemoryStorage::new());
            store.load(slot(4)).await.unwrap();
            store.set_output_mode(OutputMode::Strip).await.unwrap();
            let storage = core::mem::take(store.storage_mut());

            let mut reopened = ConfigStore::new(storage);
            assert_eq!(reopened.open().await, Ok(LoadOutcome::Loaded));
            assert_eq!(reopened.active_slot(), slot(4));
            assert_eq!(reopened.global().output_mode, OutputMode::Strip);
        });
    }

    #[test]
    fn test_open_with_corrupt_global() {
        block_on(async {
            let mut storage = MemoryStorage::new();
            storage.put(StorageKey::Global, &[1, 2, 3, 4, 5, 6, 7, 8, 9]);
            let mut store = ConfigStore::new(storage);
            assert_eq!(store.open().await, Ok(LoadOutcome::Factory));
            assert_eq!(store.global(), &GlobalConfig::default());
        });
    }

    #[test]
    fn test_damaged_profile_map_falls_back_to_defaults() {
        block_on(async {
            let mut store = ConfigStore::new(MemoryStorage::new());
            store.load(slot(3)).await.unwrap();
            store.profile_mut().random_style = 0;
            store.save().await.unwrap();

            store.storage_mut().damage(StorageKey::Profile3);
            assert_eq!(
                store.load(slot(3)).await,
                Ok(LoadOutcome::Recovered(IntegrityError::Malformed))
            );
            assert_eq!(store.profile(), &Profile::defaults(slot(3)));
            assert_eq!(store.load(slot(3)).await, Ok(LoadOutcome::Loaded));
        });
    }

    #[test]
    fn test_open_with_damaged_global_map() {
        block_on(async {
            let mut store = ConfigStore::new(MemoryStorage::new());
            store.load(slot(4)).await.unwrap();
            let mut storage = core::mem::take(store.storage_mut());
            storage.damage(StorageKey::Global);

            let mut reopened = ConfigStore::new(storage);
            assert_eq!(reopened.open().await, Ok(LoadOutcome::Factory));
            assert_eq!(reopened.global(), &GlobalConfig::default());
        });
    }

    #[test]
    fn test_reset_factory_slot_rejected() {
        block_on(async {
            let mut store = ConfigStore::new(MemoryStorage::new());
            assert_eq!(store.reset(slot(1)).await, Err(StoreError::ReadOnly(slot(1))));
        });
    }

    #[test]
    fn test_set_output_mode_failure_rolls_back() {
        block_on(async {
            let mut store = ConfigStore::new(MemoryStorage::new());
            store.storage_mut().fail_writes = true;
            assert!(store.set_output_mode(OutputMode::Strip).await.is_err());
            assert_eq!(store.global().output_mode, OutputMode::Matrix);
        });
    }

    #[test]
    fn test_factory_reset_erases_user_slots() {
        block_on(async {
            let mut store = ConfigStore::new(MemoryStorage::new());
            store.load(slot(3)).await.unwrap();
            store.save().await.unwrap();
            assert_eq!(store.factory_reset().await, Ok(LoadOutcome::Factory));
            assert_eq!(store.active_slot(), slot(1));
            assert!(!store.slot_in_use(slot(3)).await);
        });
    }
}
