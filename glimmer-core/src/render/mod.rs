//! Rendering engine for the three logic displays.
//!
//! A display is drawn into a [`Grid`] (five rows, one bit per column, bit 0
//! leftmost) and then mapped onto its MAX7219 device rows by
//! [`mapping::map_grid`]. Random mode is the exception: it writes device
//! rows directly.

pub mod bargraph;
pub mod mapping;
pub mod random;
pub mod text;

use crate::frame::DeviceId;

pub use bargraph::Bargraph;
pub use mapping::{map_grid, reverse_bits, unmap_grid};
pub use random::random_row;
pub use text::{render_text, ScrollState};

/// Rows per display
pub const ROWS: usize = 5;

/// Columns carried by one MAX7219 device (8 columns plus the overflow row)
pub const SLICE_WIDTH: u8 = 9;

/// Logical pixel grid of one display
pub type Grid = [u32; ROWS];

/// The three logic displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayId {
    /// Top front logic
    Top,
    /// Bottom front logic
    Bottom,
    /// Rear logic (three chained devices)
    Rear,
}

impl DisplayId {
    pub const ALL: [DisplayId; 3] = [DisplayId::Top, DisplayId::Bottom, DisplayId::Rear];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Width in columns
    pub const fn width(self) -> u8 {
        match self {
            DisplayId::Top | DisplayId::Bottom => 9,
            DisplayId::Rear => 27,
        }
    }

    /// Column mask for this display's width
    pub const fn mask(self) -> u32 {
        (1u32 << self.width()) - 1
    }

    /// Devices carrying this display, left to right
    pub const fn devices(self) -> &'static [DeviceId] {
        match self {
            DisplayId::Top => &[DeviceId::Top],
            DisplayId::Bottom => &[DeviceId::Bottom],
            DisplayId::Rear => &[DeviceId::Rear0, DeviceId::Rear1, DeviceId::Rear2],
        }
    }
}

/// Every column lit
pub fn full_grid(display: DisplayId) -> Grid {
    [display.mask(); ROWS]
}
