//! Failure: random noise that slows and thins out before going dark.
//!
//! Five stages of six refreshes. Stage `k` refreshes every `speed << k`
//! with random style `4 - k`; indicators show palette noise throughout.

use embassy_time::{Duration, Instant};
use rand::RngCore;

use super::{ActiveEffect, Scene};
use crate::display::fill_random;
use crate::indicator::{IndicatorId, PsiImage, RowFill};
use crate::render::DisplayId;

const STAGES: u16 = 5;
const REFRESHES_PER_STAGE: u16 = 6;

/// Refreshes before the effect ends
pub const FAILURE_PHASES: u16 = STAGES * REFRESHES_PER_STAGE;

/// Style for the first stage; each later stage is one sparser
const FIRST_STYLE: u8 = 4;

fn stage(phase: u16) -> u16 {
    (phase / REFRESHES_PER_STAGE).min(STAGES - 1)
}

/// Returns false once every stage has run
pub(super) fn tick<R: RngCore + ?Sized>(
    effect: &mut ActiveEffect,
    now: Instant,
    speed: Duration,
    scene: &mut Scene<'_, R>,
) -> bool {
    let interval = speed * (1u32 << stage(effect.phase));
    if !effect.advance(now, interval) {
        return true;
    }
    if effect.phase >= FAILURE_PHASES {
        return false;
    }

    let style = FIRST_STYLE - stage(effect.phase) as u8;
    for id in DisplayId::ALL {
        fill_random(id, style, &mut *scene.rng, &mut *scene.frame);
    }
    for id in IndicatorId::ALL {
        scene.indicator(id, &PsiImage::filled(RowFill::Noise), [0, 0]);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages() {
        assert_eq!(stage(0), 0);
        assert_eq!(stage(5), 0);
        assert_eq!(stage(6), 1);
        assert_eq!(stage(29), 4);
        assert_eq!(FIRST_STYLE - stage(29) as u8, 0);
    }
}
