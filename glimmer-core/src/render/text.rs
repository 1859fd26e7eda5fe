//! Scrolling text.

use super::{Grid, ROWS};
use crate::font::{glyph, Alphabet, CHAR_PITCH, GLYPH_WIDTH};

/// Scroll cursor and loop counter for one display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScrollState {
    /// Column offset of the first character; starts at the display width
    pub cursor: i16,
    /// Completed passes of the whole text
    pub loops: u16,
}

impl ScrollState {
    pub const fn new(width: u8) -> Self {
        Self {
            cursor: width as i16,
            loops: 0,
        }
    }

    /// Move the text one column left.
    ///
    /// Once the text has fully left the display (`cursor < -5 * len`) the
    /// cursor wraps back to `width` and the loop counter increments.
    pub fn step(&mut self, text_len: usize, width: u8) {
        self.cursor -= 1;
        let end = -(CHAR_PITCH * text_len as i16);
        if self.cursor < end {
            self.cursor = width as i16;
            self.loops = self.loops.saturating_add(1);
        }
    }
}

/// Draw `text` at the given cursor into a grid of `width` columns
pub fn render_text(text: &str, alphabet: Alphabet, cursor: i16, width: u8) -> Grid {
    let mut grid = [0u32; ROWS];
    let mask = (1u32 << width) - 1;

    for (i, c) in text.chars().enumerate() {
        let shift = i as i32 * CHAR_PITCH as i32 + cursor as i32;
        if shift >= i32::from(width) {
            break;
        }
        if shift <= -i32::from(GLYPH_WIDTH) {
            continue;
        }

        let bitmap = glyph(alphabet, c);
        for (row, bits) in grid.iter_mut().zip(bitmap.iter()) {
            let bits = u32::from(*bits);
            *row |= if shift >= 0 {
                bits << shift
            } else {
                bits >> -shift
            };
        }
    }

    for row in grid.iter_mut() {
        *row &= mask;
    }
    grid
}
