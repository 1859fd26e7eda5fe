//! Profile: every per-installation tunable in one value.

use serde::{Deserialize, Serialize};

use super::param::Parameter;
use super::types::{Brightness, EffectTiming, ProfileSlot};

/// Bytes per boot text, NUL padded
pub const BOOT_TEXT_LEN: usize = 32;

/// Index into `Profile::effects`
pub const EFFECT_ALARM: usize = 0;
pub const EFFECT_MARCH: usize = 1;
pub const EFFECT_LEIA: usize = 2;
pub const EFFECT_FAILURE: usize = 3;

/// Why a stored record was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IntegrityError {
    /// Nothing stored under the key
    Empty,
    /// Record shorter than its header
    Truncated,
    /// Magic tag does not match
    BadMagic,
    /// Record written by an incompatible format version
    UnsupportedVersion,
    /// CRC over the record bytes does not match
    BadChecksum,
    /// Body does not deserialize
    Malformed,
    /// A field is outside its range
    OutOfRange(Parameter),
    /// A boot text is not UTF-8
    InvalidText,
    /// Stored slot number is not 1-5
    InvalidSlot,
}

impl core::fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            IntegrityError::Empty => f.write_str("no record stored"),
            IntegrityError::Truncated => f.write_str("record truncated"),
            IntegrityError::BadMagic => f.write_str("bad magic tag"),
            IntegrityError::UnsupportedVersion => f.write_str("unsupported record version"),
            IntegrityError::BadChecksum => f.write_str("checksum mismatch"),
            IntegrityError::Malformed => f.write_str("malformed record"),
            IntegrityError::OutOfRange(p) => write!(f, "{} out of range", p.name()),
            IntegrityError::InvalidText => f.write_str("boot text is not UTF-8"),
            IntegrityError::InvalidSlot => f.write_str("invalid profile slot"),
        }
    }
}

/// Per-installation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub brightness: Brightness,
    /// Default random density style for every display (0-6)
    pub random_style: u8,
    /// Random mode refresh interval
    #[serde(with = "postcard::fixint::le")]
    pub update_delay_ms: u16,
    /// Text scroll step interval
    #[serde(with = "postcard::fixint::le")]
    pub scroll_delay_ms: u16,
    /// Indicator swipe row step interval
    #[serde(with = "postcard::fixint::le")]
    pub wipe_delay_ms: u16,
    /// Indicator sticks once in this many closing sweeps; 0 never
    pub stuck_frequency: u8,
    /// How long a stuck indicator stays closed
    #[serde(with = "postcard::fixint::le")]
    pub stuck_duration_ms: u16,
    /// Alarm, March, Leia, Failure
    pub effects: [EffectTiming; 4],
    /// Top, bottom, rear boot texts
    pub boot_text: [[u8; BOOT_TEXT_LEN]; 3],
    /// Drive the front indicator from the rear output and vice versa
    pub swap_indicators: bool,
    /// Palette indices: `[front, rear][slot 1, slot 2]`
    pub psi_colors: [[u8; 2]; 2],
}

/// NUL-padded fixed text, truncated on a character boundary
pub const fn fixed_text(text: &str) -> [u8; BOOT_TEXT_LEN] {
    let bytes = text.as_bytes();
    let mut len = if bytes.len() < BOOT_TEXT_LEN {
        bytes.len()
    } else {
        BOOT_TEXT_LEN
    };
    // Back off continuation bytes so a character is never split
    while len < bytes.len() && len > 0 && (bytes[len] & 0xC0) == 0x80 {
        len -= 1;
    }
    let mut out = [0u8; BOOT_TEXT_LEN];
    let mut i = 0;
    while i < len {
        out[i] = bytes[i];
        i += 1;
    }
    out
}

const STANDARD: Profile = Profile {
    brightness: Brightness {
        front_logic: 8,
        rear_logic: 8,
        front_psi: 12,
        rear_psi: 12,
    },
    random_style: 3,
    update_delay_ms: 60,
    scroll_delay_ms: 75,
    wipe_delay_ms: 70,
    stuck_frequency: 5,
    stuck_duration_ms: 3000,
    effects: [
        EffectTiming::new(4_000, 100),
        EffectTiming::new(47_000, 555),
        EffectTiming::new(34_000, 150),
        EffectTiming::new(10_000, 100),
    ],
    boot_text: [
        fixed_text("GLIMMER"),
        fixed_text("LOGICS"),
        fixed_text("ALL SYSTEMS NOMINAL"),
    ],
    swap_indicators: false,
    // Front red/blue, rear yellow/green
    psi_colors: [[0, 5], [2, 3]],
};

impl Profile {
    /// Compiled-in defaults for a slot
    pub fn defaults(slot: ProfileSlot) -> Self {
        let mut profile = STANDARD;
        match slot.number() {
            1 => {}
            2 => {
                profile.random_style = 4;
                profile.psi_colors = [[4, 7], [1, 6]];
                profile.boot_text = [
                    fixed_text("GLIMMER"),
                    fixed_text("ALT"),
                    fixed_text("ALTERNATE SCHEME"),
                ];
            }
            n => {
                let name = match n {
                    3 => "PROFILE 3",
                    4 => "PROFILE 4",
                    _ => "PROFILE 5",
                };
                profile.boot_text = [fixed_text(name); 3];
            }
        }
        profile
    }

    /// Boot text for a display (0 top, 1 bottom, 2 rear), up to the first NUL
    pub fn boot_text(&self, display: usize) -> &str {
        let Some(raw) = self.boot_text.get(display) else {
            return "";
        };
        let end = raw.iter().position(|&b| b == 0).unwrap_or(BOOT_TEXT_LEN);
        core::str::from_utf8(&raw[..end]).unwrap_or("")
    }

    pub fn set_boot_text(&mut self, display: usize, text: &str) {
        if let Some(slot) = self.boot_text.get_mut(display) {
            *slot = fixed_text(text);
        }
    }

    /// Check every field against its declared range
    pub fn validate(&self) -> Result<(), IntegrityError> {
        for param in Parameter::ALL {
            let (min, max) = param.range();
            let value = self.get(param);
            if value < min || value > max {
                return Err(IntegrityError::OutOfRange(param));
            }
        }
        for raw in &self.boot_text {
            let end = raw.iter().position(|&b| b == 0).unwrap_or(BOOT_TEXT_LEN);
            if core::str::from_utf8(&raw[..end]).is_err() {
                return Err(IntegrityError::InvalidText);
            }
        }
        Ok(())
    }
}
