//! Output frame shared by the renderers and the hardware tasks.
//!
//! The frame is the only thing the firmware reads from the core each tick.
//! Matrix devices are addressed by their place on one of the two MAX7219
//! chains; strips are addressed by physical position.

use smart_leds::RGB8;

use crate::config::Brightness;

/// Rows per MAX7219 device (digit registers)
pub const DEVICE_ROWS: usize = 8;

/// Number of MAX7219 devices across both chains
pub const DEVICE_COUNT: usize = 7;

/// Pixels per indicator strip
pub const STRIP_LEN: usize = 26;

/// A MAX7219 device on one of the chains
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceId {
    Top,
    Bottom,
    FrontPsi,
    Rear0,
    Rear1,
    Rear2,
    RearPsi,
}

impl DeviceId {
    /// Devices on the front chain, in shift order
    pub const FRONT_CHAIN: [DeviceId; 3] = [DeviceId::Top, DeviceId::Bottom, DeviceId::FrontPsi];

    /// Devices on the rear chain, in shift order
    pub const REAR_CHAIN: [DeviceId; 4] = [
        DeviceId::Rear0,
        DeviceId::Rear1,
        DeviceId::Rear2,
        DeviceId::RearPsi,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Physical indicator position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Position {
    Front,
    Rear,
}

impl Position {
    pub const fn index(self) -> usize {
        match self {
            Position::Front => 0,
            Position::Rear => 1,
        }
    }

    /// MAX7219 device driving this position in matrix mode
    pub const fn device(self) -> DeviceId {
        match self {
            Position::Front => DeviceId::FrontPsi,
            Position::Rear => DeviceId::RearPsi,
        }
    }
}

/// Everything the hardware needs for one refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Digit registers per device
    pub matrix: [[u8; DEVICE_ROWS]; DEVICE_COUNT],
    /// MAX7219 intensity register (0-15) per device
    pub intensity: [u8; DEVICE_COUNT],
    /// Strip pixels per position
    pub strips: [[RGB8; STRIP_LEN]; 2],
    /// Strip brightness (0-255) per position
    pub strip_brightness: [u8; 2],
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    /// Dark frame at full intensity
    pub const fn new() -> Self {
        Self {
            matrix: [[0; DEVICE_ROWS]; DEVICE_COUNT],
            intensity: [15; DEVICE_COUNT],
            strips: [[RGB8 { r: 0, g: 0, b: 0 }; STRIP_LEN]; 2],
            strip_brightness: [255; 2],
        }
    }

    pub fn rows(&self, device: DeviceId) -> &[u8; DEVICE_ROWS] {
        &self.matrix[device.index()]
    }

    pub fn rows_mut(&mut self, device: DeviceId) -> &mut [u8; DEVICE_ROWS] {
        &mut self.matrix[device.index()]
    }

    /// Rows for every device of a chain, in chain order
    pub fn chain_rows<const N: usize>(&self, chain: &[DeviceId; N]) -> [[u8; DEVICE_ROWS]; N] {
        let mut out = [[0; DEVICE_ROWS]; N];
        for (slot, device) in out.iter_mut().zip(chain.iter()) {
            *slot = *self.rows(*device);
        }
        out
    }

    pub fn strip(&self, position: Position) -> &[RGB8; STRIP_LEN] {
        &self.strips[position.index()]
    }

    pub fn strip_mut(&mut self, position: Position) -> &mut [RGB8; STRIP_LEN] {
        &mut self.strips[position.index()]
    }

    /// Copy brightness levels into the intensity registers.
    ///
    /// Indicator levels follow the physical position, so swapping logical
    /// indicators does not swap their brightness.
    pub fn apply_brightness(&mut self, brightness: &Brightness) {
        let front = brightness.front_logic.min(15);
        let rear = brightness.rear_logic.min(15);
        self.intensity[DeviceId::Top.index()] = front;
        self.intensity[DeviceId::Bottom.index()] = front;
        for device in [DeviceId::Rear0, DeviceId::Rear1, DeviceId::Rear2] {
            self.intensity[device.index()] = rear;
        }

        for (position, level) in [
            (Position::Front, brightness.front_psi),
            (Position::Rear, brightness.rear_psi),
        ] {
            let level = level.min(15);
            self.intensity[position.device().index()] = level;
            self.strip_brightness[position.index()] = level * 17;
        }
    }

    /// Blank all indicator outputs (both devices and both strips)
    pub fn clear_indicators(&mut self) {
        for position in [Position::Front, Position::Rear] {
            *self.rows_mut(position.device()) = [0; DEVICE_ROWS];
            *self.strip_mut(position) = [RGB8::default(); STRIP_LEN];
        }
    }
}
