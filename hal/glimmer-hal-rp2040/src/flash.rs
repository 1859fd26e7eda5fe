//! Settings partition on the RP2040's QSPI flash.
//!
//! The top 64 KiB of the 2 MiB part hold a sequential-storage map keyed by
//! [`StorageKey`]. Each record (global settings or one user profile) is a
//! single map item of at most [`MAX_ITEM_LEN`] bytes.

use core::ops::Range;

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use embedded_storage_async::nor_flash::NorFlash;
use glimmer_hal::flash::MAX_ITEM_LEN;
use sequential_storage::cache::NoCache;
use sequential_storage::map;

pub use glimmer_hal::flash::{FlashError, StorageKey};

/// Total flash on the Pico
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Bytes reserved for settings, kept out of `memory.x`
pub const PARTITION_SIZE: usize = 64 * 1024;

pub const PARTITION: Range<u32> = ((FLASH_SIZE - PARTITION_SIZE) as u32)..(FLASH_SIZE as u32);

const _: () = assert!(PARTITION_SIZE % ERASE_SIZE == 0);

/// Item scratch: the value plus the serialized key and alignment slack
const SCRATCH_LEN: usize = MAX_ITEM_LEN + 32;

type Scratch = [u8; SCRATCH_LEN];

/// Wear-levelled settings storage
pub struct Rp2040FlashStorage<'d> {
    flash: Flash<'d, FLASH, Async, FLASH_SIZE>,
}

impl<'d> Rp2040FlashStorage<'d> {
    pub fn new(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> Self {
        Self {
            flash: Flash::new(flash, dma),
        }
    }

    /// Look up `key`, leaving the value in `scratch`
    async fn fetch<'s>(
        &mut self,
        key: StorageKey,
        scratch: &'s mut Scratch,
    ) -> Result<Option<&'s [u8]>, FlashError> {
        map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            PARTITION,
            &mut NoCache::new(),
            scratch,
            &key,
        )
        .await
        .map_err(map_error)
    }
}

/// Collapse sequential-storage errors onto the board-agnostic set.
///
/// A corrupted map is reported separately so the settings layer can
/// rewrite defaults instead of giving up.
fn map_error<E>(error: sequential_storage::Error<E>) -> FlashError {
    match error {
        sequential_storage::Error::Corrupted { .. } => FlashError::Corrupted,
        sequential_storage::Error::FullStorage => FlashError::Full,
        sequential_storage::Error::BufferTooSmall { .. } => FlashError::BufferTooSmall,
        _ => FlashError::Flash,
    }
}

impl glimmer_hal::FlashStorage for Rp2040FlashStorage<'_> {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        let mut scratch: Scratch = [0; SCRATCH_LEN];
        let value = self.fetch(key, &mut scratch).await?.ok_or(FlashError::NotFound)?;
        buffer
            .get_mut(..value.len())
            .ok_or(FlashError::BufferTooSmall)?
            .copy_from_slice(value);
        Ok(value.len())
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        if data.len() > MAX_ITEM_LEN {
            return Err(FlashError::BufferTooSmall);
        }
        let mut scratch: Scratch = [0; SCRATCH_LEN];
        map::store_item(
            &mut self.flash,
            PARTITION,
            &mut NoCache::new(),
            &mut scratch,
            &key,
            &data,
        )
        .await
        .map_err(map_error)
    }

    async fn exists(&mut self, key: StorageKey) -> bool {
        let mut scratch: Scratch = [0; SCRATCH_LEN];
        matches!(self.fetch(key, &mut scratch).await, Ok(Some(_)))
    }

    async fn erase_all(&mut self) -> Result<(), FlashError> {
        self.flash
            .erase(PARTITION.start, PARTITION.end)
            .await
            .map_err(|_| FlashError::Flash)
    }
}
