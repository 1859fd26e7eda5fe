//! Random row generation for the "twinkle" mode.
//!
//! Density is controlled by combining independent random bytes: AND-ing
//! several draws thins the pattern out, OR-ing them fills it in.

use rand::RngCore;

/// Highest random style; larger values are clamped
pub const MAX_STYLE: u8 = 6;

/// One random device row for the given density style (0 sparse .. 6 dense)
pub fn random_row<R: RngCore + ?Sized>(style: u8, rng: &mut R) -> u8 {
    let mut draw = || (rng.next_u32() & 0xFF) as u8;
    match style.min(MAX_STYLE) {
        0 => draw() & draw() & draw() & draw(),
        1 => draw() & draw() & draw(),
        2 => draw() & draw(),
        3 => draw(),
        4 => draw() | draw(),
        5 => draw() | draw() | draw(),
        _ => draw() | draw() | draw() | draw(),
    }
}
