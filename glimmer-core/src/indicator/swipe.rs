//! Random swipe animation.
//!
//! One cycle has two halves. The closing half paints rows 0 to 4 with color
//! 2, the opening half paints rows 4 back to 0 with color 1. Rows advance
//! once per wipe delay. Between halves the indicator holds until its
//! color-change deadline, re-rolled to 1-10 × 500 ms at every flip.
//!
//! While closing, the step that paints row 2 may roll "stuck": the
//! remaining rows close at once and the indicator freezes for the stuck
//! duration. The color-change deadline is pushed back by the frozen time.

use embassy_time::{Duration, Instant};
use rand::RngCore;

use super::{PsiImage, RowFill};
use crate::render::ROWS;
use crate::timing::millis;

/// Unit of the color-change hold
const HOLD_UNIT: Duration = Duration::from_millis(500);

/// Hold is 1 to this many units
const MAX_HOLD_UNITS: u32 = 10;

/// Row whose closing step triggers the stuck roll
const STUCK_ROW: u8 = 2;

/// Which half of the cycle is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Rows 0→4 become color 2
    Closing,
    /// Rows 4→0 become color 1
    Opening,
}

/// Timing inputs taken from the active profile each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeTiming {
    pub wipe_delay_ms: u16,
    pub stuck_frequency: u8,
    pub stuck_duration_ms: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwipeState {
    direction: Direction,
    row: u8,
    sweeping: bool,
    frozen: bool,
    frozen_until: Instant,
    next_color_change: Option<Instant>,
    next_step: Instant,
    image: PsiImage,
}

impl Default for SwipeState {
    fn default() -> Self {
        Self::new()
    }
}

impl SwipeState {
    /// Fully open, waiting for the first color change
    pub const fn new() -> Self {
        Self {
            direction: Direction::Closing,
            row: 0,
            sweeping: false,
            frozen: false,
            frozen_until: Instant::from_ticks(0),
            next_color_change: None,
            next_step: Instant::from_ticks(0),
            image: PsiImage::filled(RowFill::Color1),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn is_sweeping(&self) -> bool {
        self.sweeping
    }

    pub fn image(&self) -> &PsiImage {
        &self.image
    }

    /// Advance the animation to `now`
    pub fn step<R: RngCore + ?Sized>(&mut self, now: Instant, timing: &SwipeTiming, rng: &mut R) {
        let deadline = match self.next_color_change {
            Some(deadline) => deadline,
            None => {
                let deadline = now + hold(rng);
                self.next_color_change = Some(deadline);
                deadline
            }
        };

        if self.frozen {
            if now < self.frozen_until {
                return;
            }
            self.frozen = false;
            self.next_color_change = Some(deadline + millis(timing.stuck_duration_ms));
            return;
        }

        if !self.sweeping {
            if now < deadline {
                return;
            }
            self.sweeping = true;
            self.next_step = now;
        }

        if now < self.next_step {
            return;
        }
        self.next_step = now + millis(timing.wipe_delay_ms);

        let row = usize::from(self.row);
        match self.direction {
            Direction::Closing => {
                self.image.rows[row] = RowFill::Color2;
                if self.row == STUCK_ROW && stuck_roll(timing.stuck_frequency, rng) {
                    self.image = PsiImage::filled(RowFill::Color2);
                    self.frozen = true;
                    self.frozen_until = now + millis(timing.stuck_duration_ms);
                    self.finish_half(now, rng);
                    return;
                }
                self.row += 1;
                if usize::from(self.row) == ROWS {
                    self.finish_half(now, rng);
                }
            }
            Direction::Opening => {
                self.image.rows[row] = RowFill::Color1;
                if self.row == 0 {
                    self.finish_half(now, rng);
                } else {
                    self.row -= 1;
                }
            }
        }
    }

    fn finish_half<R: RngCore + ?Sized>(&mut self, now: Instant, rng: &mut R) {
        self.sweeping = false;
        (self.direction, self.row) = match self.direction {
            Direction::Closing => (Direction::Opening, ROWS as u8 - 1),
            Direction::Opening => (Direction::Closing, 0),
        };
        self.next_color_change = Some(now + hold(rng));
    }
}

fn hold<R: RngCore + ?Sized>(rng: &mut R) -> Duration {
    HOLD_UNIT * (rng.next_u32() % MAX_HOLD_UNITS + 1)
}

/// One-in-`frequency` chance; 0 never sticks
fn stuck_roll<R: RngCore + ?Sized>(frequency: u8, rng: &mut R) -> bool {
    frequency != 0 && rng.next_u32() % u32::from(frequency) == 0
}
