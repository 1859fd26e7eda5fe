//! Indicator animation engine.
//!
//! Each indicator produces a [`PsiImage`]: five rows, each painted with one
//! of the two color slots (or full, noise, off). A backend then turns the
//! image into MAX7219 rows or strip pixels for one physical position.

pub mod backend;
pub mod palette;
pub mod swipe;

use embassy_time::Instant;
use rand::RngCore;

use crate::config::Profile;
use crate::frame::Position;
use crate::render::ROWS;

pub use backend::{BackendSlot, IndicatorBackend, RowBackend, StripBackend};
pub use palette::PALETTE_LEN;
pub use swipe::{Direction, SwipeState, SwipeTiming};

/// Indicator mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PsiState {
    #[default]
    Random,
    Color1,
    Color2,
    Test,
    Off,
}

impl PsiState {
    /// Indicator state verb argument: 0 Test, 1 Random, 2 Color1, 3 Color2, 4 Off
    pub fn from_number(n: u32) -> Option<Self> {
        match n {
            0 => Some(PsiState::Test),
            1 => Some(PsiState::Random),
            2 => Some(PsiState::Color1),
            3 => Some(PsiState::Color2),
            4 => Some(PsiState::Off),
            _ => None,
        }
    }
}

/// Logical indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IndicatorId {
    Front,
    Rear,
}

impl IndicatorId {
    pub const ALL: [IndicatorId; 2] = [IndicatorId::Front, IndicatorId::Rear];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Physical output this indicator drives
    pub const fn position(self, swapped: bool) -> Position {
        match (self, swapped) {
            (IndicatorId::Front, false) | (IndicatorId::Rear, true) => Position::Front,
            (IndicatorId::Rear, false) | (IndicatorId::Front, true) => Position::Rear,
        }
    }
}

/// What one indicator row shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RowFill {
    Off,
    Color1,
    Color2,
    /// Both color groups lit
    Full,
    /// Random pixels
    Noise,
}

/// Backend-independent indicator picture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PsiImage {
    pub rows: [RowFill; ROWS],
}

impl PsiImage {
    pub const fn filled(fill: RowFill) -> Self {
        Self { rows: [fill; ROWS] }
    }
}

/// One indicator's mode and animation progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indicator {
    id: IndicatorId,
    state: PsiState,
    swipe: SwipeState,
}

impl Indicator {
    pub const fn new(id: IndicatorId) -> Self {
        Self {
            id,
            state: PsiState::Random,
            swipe: SwipeState::new(),
        }
    }

    pub fn id(&self) -> IndicatorId {
        self.id
    }

    pub fn state(&self) -> PsiState {
        self.state
    }

    /// Entering Random starts a fresh swipe
    pub fn set_state(&mut self, state: PsiState) {
        if state == PsiState::Random && self.state != PsiState::Random {
            self.swipe = SwipeState::new();
        }
        self.state = state;
    }

    pub fn swipe(&self) -> &SwipeState {
        &self.swipe
    }

    /// Advance the swipe animation (Random mode only)
    pub fn advance<R: RngCore + ?Sized>(&mut self, now: Instant, profile: &Profile, rng: &mut R) {
        if self.state == PsiState::Random {
            self.advance_swipe(now, profile, rng);
        }
    }

    /// Advance the swipe regardless of mode
    pub fn advance_swipe<R: RngCore + ?Sized>(
        &mut self,
        now: Instant,
        profile: &Profile,
        rng: &mut R,
    ) {
        let timing = SwipeTiming {
            wipe_delay_ms: profile.wipe_delay_ms,
            stuck_frequency: profile.stuck_frequency,
            stuck_duration_ms: profile.stuck_duration_ms,
        };
        self.swipe.step(now, &timing, rng);
    }

    /// Picture for the current mode
    pub fn image(&self) -> PsiImage {
        match self.state {
            PsiState::Random => *self.swipe.image(),
            PsiState::Color1 => PsiImage::filled(RowFill::Color1),
            PsiState::Color2 => PsiImage::filled(RowFill::Color2),
            PsiState::Test => PsiImage::filled(RowFill::Full),
            PsiState::Off => PsiImage::filled(RowFill::Off),
        }
    }

    /// Palette indices of this indicator's two color slots
    pub fn color_slots(&self, profile: &Profile) -> [u8; 2] {
        profile.psi_colors[self.id.index()]
    }
}
