//! Bargraph mode: one bouncing bar per column.

use embassy_time::Duration;
use rand::RngCore;

use super::{Grid, ROWS};

/// Bar update interval
pub const BARGRAPH_INTERVAL: Duration = Duration::from_millis(50);

/// Tallest bar (all rows lit)
pub const MAX_HEIGHT: u8 = ROWS as u8;

const MAX_COLUMNS: usize = 27;

/// Per-column bar heights
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bargraph {
    heights: [u8; MAX_COLUMNS],
}

impl Default for Bargraph {
    fn default() -> Self {
        Self::new()
    }
}

impl Bargraph {
    pub const fn new() -> Self {
        Self {
            heights: [0; MAX_COLUMNS],
        }
    }

    pub fn reset(&mut self) {
        self.heights = [0; MAX_COLUMNS];
    }

    /// Random walk every column by one step.
    ///
    /// A full bar collapses to a random lower height; otherwise the bar
    /// moves up or down by one within `0..=MAX_HEIGHT`.
    pub fn step<R: RngCore + ?Sized>(&mut self, width: u8, rng: &mut R) {
        let width = usize::from(width).min(MAX_COLUMNS);
        for h in self.heights.iter_mut().take(width) {
            *h = if *h >= MAX_HEIGHT {
                (rng.next_u32() % u32::from(MAX_HEIGHT)) as u8
            } else if rng.next_u32() & 1 == 0 {
                *h + 1
            } else {
                h.saturating_sub(1)
            };
        }
    }

    /// Draw the bars bottom-up (row 4 is the bottom)
    pub fn grid(&self, width: u8) -> Grid {
        let mut grid = [0u32; ROWS];
        let width = usize::from(width).min(MAX_COLUMNS);
        for (col, &h) in self.heights.iter().take(width).enumerate() {
            for level in 0..usize::from(h.min(MAX_HEIGHT)) {
                grid[ROWS - 1 - level] |= 1 << col;
            }
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_grid_draws_from_bottom() {
        let mut bars = Bargraph::new();
        bars.heights[0] = 1;
        bars.heights[2] = 5;
        let grid = bars.grid(9);
        assert_eq!(grid[4], 0b101);
        assert_eq!(grid[3], 0b100);
        assert_eq!(grid[0], 0b100);
    }

    #[test]
    fn test_full_bar_collapses() {
        let mut bars = Bargraph::new();
        bars.heights = [MAX_HEIGHT; MAX_COLUMNS];
        let mut rng = SmallRng::seed_from_u64(1);
        bars.step(27, &mut rng);
        assert!(bars.heights.iter().all(|&h| h < MAX_HEIGHT));
    }

    #[test]
    fn test_walk_stays_in_range() {
        let mut bars = Bargraph::new();
        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..1000 {
            let before = bars.heights;
            bars.step(9, &mut rng);
            for (b, a) in before.iter().zip(bars.heights.iter()).take(9) {
                assert!(*a <= MAX_HEIGHT);
                if *b < MAX_HEIGHT {
                    assert!(a.abs_diff(*b) <= 1);
                }
            }
        }
        // Columns beyond the width never move
        assert!(bars.heights[9..].iter().all(|&h| h == 0));
    }
}
