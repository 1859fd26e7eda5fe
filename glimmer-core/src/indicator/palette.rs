//! Fixed indicator color palette.

use smart_leds::RGB8;

/// Number of palette entries
pub const PALETTE_LEN: usize = 12;

const PALETTE: [RGB8; PALETTE_LEN] = [
    RGB8 { r: 255, g: 0, b: 0 },     // 0 red
    RGB8 { r: 255, g: 96, b: 0 },    // 1 orange
    RGB8 { r: 255, g: 200, b: 0 },   // 2 yellow
    RGB8 { r: 0, g: 255, b: 0 },     // 3 green
    RGB8 { r: 0, g: 255, b: 255 },   // 4 cyan
    RGB8 { r: 0, g: 0, b: 255 },     // 5 blue
    RGB8 { r: 128, g: 0, b: 255 },   // 6 purple
    RGB8 { r: 255, g: 0, b: 255 },   // 7 magenta
    RGB8 { r: 255, g: 64, b: 128 },  // 8 pink
    RGB8 { r: 255, g: 255, b: 255 }, // 9 white
    RGB8 { r: 255, g: 180, b: 100 }, // 10 warm white
    RGB8 { r: 0, g: 128, b: 128 },   // 11 teal
];

pub const RED: u8 = 0;
pub const BLUE: u8 = 5;

/// Palette color; out-of-range indices are black
pub fn color(index: u8) -> RGB8 {
    PALETTE
        .get(usize::from(index))
        .copied()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(color(RED), RGB8 { r: 255, g: 0, b: 0 });
        assert_eq!(color(BLUE), RGB8 { r: 0, g: 0, b: 255 });
        assert_eq!(color(PALETTE_LEN as u8), RGB8::default());
    }
}
