//! Grid to MAX7219 row mapping.
//!
//! Each device shows a 9-column slice of its display. The panel wiring
//! puts column 0 on the most significant bit of a digit register, so the
//! first eight columns of every row are written bit-reversed. Column 8 of
//! all five rows is packed into device row 5, one bit per grid row
//! (`0x80 >> row`).

use super::{DisplayId, Grid, ROWS, SLICE_WIDTH};
use crate::frame::{Frame, DEVICE_ROWS};

/// Device row holding the ninth column of every grid row
pub const OVERFLOW_ROW: usize = 5;

const SLICE_MASK: u32 = (1 << SLICE_WIDTH) - 1;

/// Reverse the bit order of a byte. Applying it twice is the identity.
pub const fn reverse_bits(b: u8) -> u8 {
    b.reverse_bits()
}

/// Write a display grid to its devices in the frame
pub fn map_grid(display: DisplayId, grid: &Grid, frame: &mut Frame) {
    for (slice, device) in display.devices().iter().enumerate() {
        let shift = slice as u32 * SLICE_WIDTH as u32;
        let rows = frame.rows_mut(*device);
        let mut overflow = 0u8;

        for (r, &grid_row) in grid.iter().enumerate() {
            let bits = (grid_row >> shift) & SLICE_MASK;
            rows[r] = reverse_bits((bits & 0xFF) as u8);
            if bits & 0x100 != 0 {
                overflow |= 0x80 >> r;
            }
        }

        rows[OVERFLOW_ROW] = overflow;
        for row in rows.iter_mut().skip(OVERFLOW_ROW + 1) {
            *row = 0;
        }
    }
}

/// Rebuild a display grid from its device rows
pub fn unmap_grid(display: DisplayId, frame: &Frame) -> Grid {
    let mut grid = [0u32; ROWS];
    for (slice, device) in display.devices().iter().enumerate() {
        let shift = slice as u32 * SLICE_WIDTH as u32;
        let rows = frame.rows(*device);
        for (r, grid_row) in grid.iter_mut().enumerate() {
            let mut bits = u32::from(reverse_bits(rows[r]));
            if rows[OVERFLOW_ROW] & (0x80 >> r) != 0 {
                bits |= 0x100;
            }
            *grid_row |= bits << shift;
        }
    }
    grid
}

/// Blank every row of a display's devices
pub fn clear_display(display: DisplayId, frame: &mut Frame) {
    for device in display.devices() {
        *frame.rows_mut(*device) = [0; DEVICE_ROWS];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::DeviceId;
    use proptest::prelude::*;

    #[test]
    fn test_reverse_bits_known_values() {
        assert_eq!(reverse_bits(0b0000_0001), 0b1000_0000);
        assert_eq!(reverse_bits(0b1100_0000), 0b0000_0011);
        assert_eq!(reverse_bits(0xA5), 0xA5);
    }

    #[test]
    fn test_column_zero_is_msb() {
        let mut frame = Frame::new();
        let grid = [1, 0, 0, 0, 0];
        map_grid(DisplayId::Top, &grid, &mut frame);
        assert_eq!(frame.rows(DeviceId::Top)[0], 0x80);
        assert_eq!(frame.rows(DeviceId::Top)[OVERFLOW_ROW], 0);
    }

    #[test]
    fn test_ninth_column_goes_to_overflow_row() {
        let mut frame = Frame::new();
        // Column 8 lit on rows 0 and 4
        let grid = [1 << 8, 0, 0, 0, 1 << 8];
        map_grid(DisplayId::Bottom, &grid, &mut frame);
        let rows = frame.rows(DeviceId::Bottom);
        assert_eq!(rows[..5], [0, 0, 0, 0, 0]);
        assert_eq!(rows[OVERFLOW_ROW], 0x80 | 0x08);
    }

    #[test]
    fn test_rear_slices_land_on_separate_devices() {
        let mut frame = Frame::new();
        // Columns 0, 9 and 26 on row 1
        let grid = [0, 1 | (1 << 9) | (1 << 26), 0, 0, 0];
        map_grid(DisplayId::Rear, &grid, &mut frame);
        assert_eq!(frame.rows(DeviceId::Rear0)[1], 0x80);
        assert_eq!(frame.rows(DeviceId::Rear1)[1], 0x80);
        assert_eq!(frame.rows(DeviceId::Rear2)[1], 0);
        assert_eq!(frame.rows(DeviceId::Rear2)[OVERFLOW_ROW], 0x80 >> 1);
        // Other displays untouched
        assert_eq!(frame.rows(DeviceId::Top), &[0; DEVICE_ROWS]);
    }

    #[test]
    fn test_clear_display() {
        let mut frame = Frame::new();
        map_grid(DisplayId::Rear, &crate::render::full_grid(DisplayId::Rear), &mut frame);
        clear_display(DisplayId::Rear, &mut frame);
        assert_eq!(unmap_grid(DisplayId::Rear, &frame), [0; ROWS]);
    }

    proptest! {
        #[test]
        fn test_reverse_is_self_inverse(b in any::<u8>()) {
            prop_assert_eq!(reverse_bits(reverse_bits(b)), b);
        }

        #[test]
        fn test_rear_roundtrip(rows in proptest::array::uniform5(0u32..(1 << 27))) {
            let mut frame = Frame::new();
            map_grid(DisplayId::Rear, &rows, &mut frame);
            prop_assert_eq!(unmap_grid(DisplayId::Rear, &frame), rows);
        }

        #[test]
        fn test_front_roundtrip(rows in proptest::array::uniform5(0u32..(1 << 9))) {
            let mut frame = Frame::new();
            map_grid(DisplayId::Top, &rows, &mut frame);
            prop_assert_eq!(unmap_grid(DisplayId::Top, &frame), rows);
        }
    }
}
