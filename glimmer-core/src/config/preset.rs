//! Fixed parameter bundles.
//!
//! A preset is plain data. Applying one is the same sequence of
//! [`Profile::set`] calls a menu would make by hand, plus an output mode the
//! caller persists in the global settings.

use super::param::{ParamError, Parameter};
use super::profile::Profile;
use super::types::{Brightness, OutputMode};

/// Named looks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Preset {
    /// Film-accurate red/blue and yellow/green on the matrix boards
    Classic,
    /// Bright saturated strip colors
    Neon,
    /// Dim, sparse, slow
    Stealth,
    /// Everything up for conventions
    Showtime,
}

struct Bundle {
    brightness: Brightness,
    output_mode: OutputMode,
    /// `[front, rear][slot 1, slot 2]`
    colors: [[u8; 2]; 2],
    random_style: u8,
    scroll_delay_ms: u16,
}

impl Preset {
    pub const ALL: [Preset; 4] = [Preset::Classic, Preset::Neon, Preset::Stealth, Preset::Showtime];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    pub const fn name(self) -> &'static str {
        match self {
            Preset::Classic => "classic",
            Preset::Neon => "neon",
            Preset::Stealth => "stealth",
            Preset::Showtime => "showtime",
        }
    }

    const fn bundle(self) -> Bundle {
        match self {
            Preset::Classic => Bundle {
                brightness: Brightness {
                    front_logic: 8,
                    rear_logic: 8,
                    front_psi: 12,
                    rear_psi: 12,
                },
                output_mode: OutputMode::Matrix,
                colors: [[0, 5], [2, 3]],
                random_style: 3,
                scroll_delay_ms: 75,
            },
            Preset::Neon => Bundle {
                brightness: Brightness::uniform(12),
                output_mode: OutputMode::Strip,
                colors: [[7, 4], [8, 11]],
                random_style: 5,
                scroll_delay_ms: 60,
            },
            Preset::Stealth => Bundle {
                brightness: Brightness::uniform(2),
                output_mode: OutputMode::Matrix,
                colors: [[5, 6], [5, 6]],
                random_style: 1,
                scroll_delay_ms: 120,
            },
            Preset::Showtime => Bundle {
                brightness: Brightness::uniform(15),
                output_mode: OutputMode::Strip,
                colors: [[0, 9], [1, 4]],
                random_style: 6,
                scroll_delay_ms: 50,
            },
        }
    }
}

impl Profile {
    /// Apply a preset and return the output mode it asks for
    pub fn apply_preset(&mut self, preset: Preset) -> Result<OutputMode, ParamError> {
        let b = preset.bundle();
        let assignments: [(Parameter, u32); 10] = [
            (Parameter::FrontLogicBrightness, b.brightness.front_logic.into()),
            (Parameter::RearLogicBrightness, b.brightness.rear_logic.into()),
            (Parameter::FrontPsiBrightness, b.brightness.front_psi.into()),
            (Parameter::RearPsiBrightness, b.brightness.rear_psi.into()),
            (Parameter::FrontColor1, b.colors[0][0].into()),
            (Parameter::FrontColor2, b.colors[0][1].into()),
            (Parameter::RearColor1, b.colors[1][0].into()),
            (Parameter::RearColor2, b.colors[1][1].into()),
            (Parameter::RandomStyle, b.random_style.into()),
            (Parameter::ScrollDelay, b.scroll_delay_ms.into()),
        ];

        // Check everything first so a bad bundle leaves the profile untouched
        let mut staged = self.clone();
        for (param, value) in assignments {
            staged.set(param, value)?;
        }
        *self = staged;
        Ok(b.output_mode)
    }
}
