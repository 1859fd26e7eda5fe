//! Leia: a single lit row scans down every display.

use embassy_time::Instant;
use rand::RngCore;

use super::Scene;
use crate::indicator::Indicator;
use crate::render::{DisplayId, Grid, ROWS};

fn scan_row(id: DisplayId, phase: u16) -> Grid {
    let mut grid = [0u32; ROWS];
    grid[usize::from(phase) % ROWS] = id.mask();
    grid
}

/// Indicators keep their swipe animation underneath the scan
pub(super) fn render<R: RngCore + ?Sized>(
    phase: u16,
    now: Instant,
    indicators: &mut [Indicator; 2],
    scene: &mut Scene<'_, R>,
) {
    scene.all_displays(|id| scan_row(id, phase));

    for indicator in indicators.iter_mut() {
        indicator.advance_swipe(now, scene.profile, &mut *scene.rng);
        let colors = indicator.color_slots(scene.profile);
        scene.indicator(indicator.id(), indicator.swipe().image(), colors);
    }
}
