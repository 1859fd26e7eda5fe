//! Configuration type definitions
//!
//! Small value types shared by the profile, the global settings record and
//! the store. Everything persisted derives serde and uses fixed-width
//! integers so the serialized layout never depends on the value.

use serde::{Deserialize, Serialize};

use glimmer_hal::StorageKey;

/// Number of profile slots
pub const PROFILE_SLOTS: u8 = 5;

/// Highest brightness level accepted by the MAX7219 intensity register
pub const MAX_BRIGHTNESS: u8 = 15;

/// One of the five profile slots
///
/// Slots 1 and 2 are compiled-in factory looks and cannot be saved over.
/// Slots 3 to 5 are user slots, each persisted under its own key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProfileSlot(u8);

impl ProfileSlot {
    pub const FACTORY: ProfileSlot = ProfileSlot(1);

    pub const fn new(number: u8) -> Option<Self> {
        if number >= 1 && number <= PROFILE_SLOTS {
            Some(ProfileSlot(number))
        } else {
            None
        }
    }

    pub const fn number(self) -> u8 {
        self.0
    }

    pub const fn is_valid(self) -> bool {
        self.0 >= 1 && self.0 <= PROFILE_SLOTS
    }

    /// Factory slots are never written
    pub const fn is_read_only(self) -> bool {
        self.0 <= 2
    }

    /// Flash key for a user slot
    pub fn storage_key(self) -> Option<StorageKey> {
        StorageKey::for_profile_slot(self.0)
    }
}

/// The four brightness levels (0-15 each)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Brightness {
    /// Top and bottom front logic displays
    pub front_logic: u8,
    /// Rear logic display
    pub rear_logic: u8,
    /// Front PSI indicator
    pub front_psi: u8,
    /// Rear PSI indicator
    pub rear_psi: u8,
}

impl Brightness {
    pub const fn uniform(level: u8) -> Self {
        Self {
            front_logic: level,
            rear_logic: level,
            front_psi: level,
            rear_psi: level,
        }
    }
}

/// Duration and phase speed for one effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EffectTiming {
    /// Total run time in ms; 0 runs until stopped
    #[serde(with = "postcard::fixint::le")]
    pub duration_ms: u32,
    /// Phase length in ms
    #[serde(with = "postcard::fixint::le")]
    pub speed_ms: u16,
}

impl EffectTiming {
    pub const fn new(duration_ms: u32, speed_ms: u16) -> Self {
        Self {
            duration_ms,
            speed_ms,
        }
    }
}

/// Indicator output hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputMode {
    /// Two-color PSI boards on the MAX7219 chains
    #[default]
    Matrix,
    /// 26-pixel WS2812 strips
    Strip,
}

/// Settings shared by every profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GlobalConfig {
    pub output_mode: OutputMode,
    pub last_profile: ProfileSlot,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_mode: OutputMode::Matrix,
            last_profile: ProfileSlot::FACTORY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_bounds() {
        assert!(ProfileSlot::new(0).is_none());
        assert!(ProfileSlot::new(6).is_none());
        assert_eq!(ProfileSlot::new(3).map(ProfileSlot::number), Some(3));
    }

    #[test]
    fn test_read_only_slots() {
        for n in 1..=5 {
            let slot = ProfileSlot::new(n).unwrap();
            assert_eq!(slot.is_read_only(), n <= 2);
            assert_eq!(slot.storage_key().is_some(), n >= 3);
        }
    }
}
