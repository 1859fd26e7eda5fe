//! Named access to individual profile fields.
//!
//! Menus and diagnostics address settings by name through this table rather
//! than touching `Profile` fields directly. The same ranges are used to
//! validate records read from flash.

use super::profile::{Profile, EFFECT_ALARM, EFFECT_FAILURE, EFFECT_LEIA, EFFECT_MARCH};
use super::types::MAX_BRIGHTNESS;
use crate::indicator::palette::PALETTE_LEN;
use crate::render::random::MAX_STYLE;

/// A settable profile field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parameter {
    FrontLogicBrightness,
    RearLogicBrightness,
    FrontPsiBrightness,
    RearPsiBrightness,
    RandomStyle,
    UpdateDelay,
    ScrollDelay,
    WipeDelay,
    StuckFrequency,
    StuckDuration,
    AlarmDuration,
    AlarmSpeed,
    MarchDuration,
    MarchSpeed,
    LeiaDuration,
    LeiaSpeed,
    FailureDuration,
    FailureSpeed,
    SwapIndicators,
    FrontColor1,
    FrontColor2,
    RearColor1,
    RearColor2,
}

/// Value outside the parameter's range; nothing was changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamError {
    OutOfRange { min: u32, max: u32 },
}

impl core::fmt::Display for ParamError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParamError::OutOfRange { min, max } => {
                write!(f, "value must be {}-{}", min, max)
            }
        }
    }
}

const MAX_EFFECT_DURATION_MS: u32 = 600_000;

impl Parameter {
    pub const ALL: [Parameter; 23] = [
        Parameter::FrontLogicBrightness,
        Parameter::RearLogicBrightness,
        Parameter::FrontPsiBrightness,
        Parameter::RearPsiBrightness,
        Parameter::RandomStyle,
        Parameter::UpdateDelay,
        Parameter::ScrollDelay,
        Parameter::WipeDelay,
        Parameter::StuckFrequency,
        Parameter::StuckDuration,
        Parameter::AlarmDuration,
        Parameter::AlarmSpeed,
        Parameter::MarchDuration,
        Parameter::MarchSpeed,
        Parameter::LeiaDuration,
        Parameter::LeiaSpeed,
        Parameter::FailureDuration,
        Parameter::FailureSpeed,
        Parameter::SwapIndicators,
        Parameter::FrontColor1,
        Parameter::FrontColor2,
        Parameter::RearColor1,
        Parameter::RearColor2,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Parameter::FrontLogicBrightness => "front_brightness",
            Parameter::RearLogicBrightness => "rear_brightness",
            Parameter::FrontPsiBrightness => "front_psi_brightness",
            Parameter::RearPsiBrightness => "rear_psi_brightness",
            Parameter::RandomStyle => "random_style",
            Parameter::UpdateDelay => "update_delay",
            Parameter::ScrollDelay => "scroll_delay",
            Parameter::WipeDelay => "wipe_delay",
            Parameter::StuckFrequency => "stuck_frequency",
            Parameter::StuckDuration => "stuck_duration",
            Parameter::AlarmDuration => "alarm_duration",
            Parameter::AlarmSpeed => "alarm_speed",
            Parameter::MarchDuration => "march_duration",
            Parameter::MarchSpeed => "march_speed",
            Parameter::LeiaDuration => "leia_duration",
            Parameter::LeiaSpeed => "leia_speed",
            Parameter::FailureDuration => "failure_duration",
            Parameter::FailureSpeed => "failure_speed",
            Parameter::SwapIndicators => "swap_indicators",
            Parameter::FrontColor1 => "front_color1",
            Parameter::FrontColor2 => "front_color2",
            Parameter::RearColor1 => "rear_color1",
            Parameter::RearColor2 => "rear_color2",
        }
    }

    /// Look up a parameter by name (ASCII case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// Inclusive valid range
    pub const fn range(self) -> (u32, u32) {
        match self {
            Parameter::FrontLogicBrightness
            | Parameter::RearLogicBrightness
            | Parameter::FrontPsiBrightness
            | Parameter::RearPsiBrightness => (0, MAX_BRIGHTNESS as u32),
            Parameter::RandomStyle => (0, MAX_STYLE as u32),
            Parameter::UpdateDelay | Parameter::ScrollDelay | Parameter::WipeDelay => (10, 1000),
            Parameter::StuckFrequency => (0, 100),
            Parameter::StuckDuration => (0, 60_000),
            Parameter::AlarmDuration
            | Parameter::MarchDuration
            | Parameter::LeiaDuration
            | Parameter::FailureDuration => (0, MAX_EFFECT_DURATION_MS),
            Parameter::AlarmSpeed
            | Parameter::MarchSpeed
            | Parameter::LeiaSpeed
            | Parameter::FailureSpeed => (10, 5000),
            Parameter::SwapIndicators => (0, 1),
            Parameter::FrontColor1
            | Parameter::FrontColor2
            | Parameter::RearColor1
            | Parameter::RearColor2 => (0, PALETTE_LEN as u32 - 1),
        }
    }

    /// True for the four brightness levels
    pub const fn is_brightness(self) -> bool {
        matches!(
            self,
            Parameter::FrontLogicBrightness
                | Parameter::RearLogicBrightness
                | Parameter::FrontPsiBrightness
                | Parameter::RearPsiBrightness
        )
    }

    fn effect_index(self) -> Option<(usize, bool)> {
        match self {
            Parameter::AlarmDuration => Some((EFFECT_ALARM, true)),
            Parameter::AlarmSpeed => Some((EFFECT_ALARM, false)),
            Parameter::MarchDuration => Some((EFFECT_MARCH, true)),
            Parameter::MarchSpeed => Some((EFFECT_MARCH, false)),
            Parameter::LeiaDuration => Some((EFFECT_LEIA, true)),
            Parameter::LeiaSpeed => Some((EFFECT_LEIA, false)),
            Parameter::FailureDuration => Some((EFFECT_FAILURE, true)),
            Parameter::FailureSpeed => Some((EFFECT_FAILURE, false)),
            _ => None,
        }
    }
}

impl Profile {
    /// Current value of a parameter
    pub fn get(&self, param: Parameter) -> u32 {
        if let Some((idx, is_duration)) = param.effect_index() {
            let timing = &self.effects[idx];
            return if is_duration {
                timing.duration_ms
            } else {
                u32::from(timing.speed_ms)
            };
        }

        match param {
            Parameter::FrontLogicBrightness => self.brightness.front_logic.into(),
            Parameter::RearLogicBrightness => self.brightness.rear_logic.into(),
            Parameter::FrontPsiBrightness => self.brightness.front_psi.into(),
            Parameter::RearPsiBrightness => self.brightness.rear_psi.into(),
            Parameter::RandomStyle => self.random_style.into(),
            Parameter::UpdateDelay => self.update_delay_ms.into(),
            Parameter::ScrollDelay => self.scroll_delay_ms.into(),
            Parameter::WipeDelay => self.wipe_delay_ms.into(),
            Parameter::StuckFrequency => self.stuck_frequency.into(),
            Parameter::StuckDuration => self.stuck_duration_ms.into(),
            Parameter::SwapIndicators => self.swap_indicators.into(),
            Parameter::FrontColor1 => self.psi_colors[0][0].into(),
            Parameter::FrontColor2 => self.psi_colors[0][1].into(),
            Parameter::RearColor1 => self.psi_colors[1][0].into(),
            Parameter::RearColor2 => self.psi_colors[1][1].into(),
            // Effect timings handled above
            _ => 0,
        }
    }

    /// Set a parameter after checking its range
    pub fn set(&mut self, param: Parameter, value: u32) -> Result<(), ParamError> {
        let (min, max) = param.range();
        if value < min || value > max {
            return Err(ParamError::OutOfRange { min, max });
        }

        if let Some((idx, is_duration)) = param.effect_index() {
            let timing = &mut self.effects[idx];
            if is_duration {
                timing.duration_ms = value;
            } else {
                timing.speed_ms = value as u16;
            }
            return Ok(());
        }

        // Every remaining range fits in u16
        let narrow = value as u16;
        let byte = value as u8;
        match param {
            Parameter::FrontLogicBrightness => self.brightness.front_logic = byte,
            Parameter::RearLogicBrightness => self.brightness.rear_logic = byte,
            Parameter::FrontPsiBrightness => self.brightness.front_psi = byte,
            Parameter::RearPsiBrightness => self.brightness.rear_psi = byte,
            Parameter::RandomStyle => self.random_style = byte,
            Parameter::UpdateDelay => self.update_delay_ms = narrow,
            Parameter::ScrollDelay => self.scroll_delay_ms = narrow,
            Parameter::WipeDelay => self.wipe_delay_ms = narrow,
            Parameter::StuckFrequency => self.stuck_frequency = byte,
            Parameter::StuckDuration => self.stuck_duration_ms = narrow,
            Parameter::SwapIndicators => self.swap_indicators = value == 1,
            Parameter::FrontColor1 => self.psi_colors[0][0] = byte,
            Parameter::FrontColor2 => self.psi_colors[0][1] = byte,
            Parameter::RearColor1 => self.psi_colors[1][0] = byte,
            Parameter::RearColor2 => self.psi_colors[1][1] = byte,
            _ => {}
        }
        Ok(())
    }
}
