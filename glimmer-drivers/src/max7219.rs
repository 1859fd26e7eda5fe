//! MAX7219 LED matrix chain
//!
//! Each MAX7219 takes a 16-bit word (register address, data) and shifts
//! the previous word out of DOUT into the next device. Writing a register
//! on every device of a chain therefore means clocking out one word per
//! device while chip-select is low; the words are latched on the rising
//! edge of CS.
//!
//! Device 0 is the one wired to the MCU. Its word is clocked out last so
//! that it ends up in the first shift register.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

/// MAX7219 register addresses
pub mod reg {
    pub const NOOP: u8 = 0x00;
    /// Digit 0; digits 1-7 follow at consecutive addresses
    pub const DIGIT0: u8 = 0x01;
    pub const DECODE_MODE: u8 = 0x09;
    pub const INTENSITY: u8 = 0x0A;
    pub const SCAN_LIMIT: u8 = 0x0B;
    pub const SHUTDOWN: u8 = 0x0C;
    pub const DISPLAY_TEST: u8 = 0x0F;
}

/// Digit registers per device
pub const DIGITS: usize = 8;

/// Highest intensity level
pub const MAX_INTENSITY: u8 = 15;

/// Bus failure while talking to the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// SPI transfer failed
    Spi,
    /// Chip-select pin could not be driven
    Pin,
}

/// A chain of `N` MAX7219 devices sharing one chip-select
pub struct Max7219Chain<SPI, CS, const N: usize> {
    spi: SPI,
    cs: CS,
}

impl<SPI, CS, const N: usize> Max7219Chain<SPI, CS, N>
where
    SPI: SpiBus,
    CS: OutputPin,
{
    pub fn new(spi: SPI, cs: CS) -> Self {
        Self { spi, cs }
    }

    /// Bring every device out of shutdown with raw (undecoded) digits.
    ///
    /// All digits are cleared afterwards so no power-on garbage shows.
    pub fn init(&mut self) -> Result<(), DriverError> {
        const SETUP: [(u8, u8); 4] = [
            (reg::SCAN_LIMIT, 7),
            (reg::DECODE_MODE, 0),
            (reg::SHUTDOWN, 1),
            (reg::DISPLAY_TEST, 0),
        ];

        for (register, value) in SETUP {
            self.write_all(register, value)?;
        }
        self.write_rows(&[[0; DIGITS]; N])
    }

    /// Set the intensity register (0-15) of one device.
    ///
    /// Devices beyond the chain length are ignored.
    pub fn set_intensity(&mut self, device: usize, level: u8) -> Result<(), DriverError> {
        if device >= N {
            return Ok(());
        }
        let level = level.min(MAX_INTENSITY);
        self.latch(|d| {
            if d == device {
                (reg::INTENSITY, level)
            } else {
                (reg::NOOP, 0)
            }
        })
    }

    /// Write the digit registers of every device.
    ///
    /// One latch per digit row, carrying that row for the whole chain.
    pub fn write_rows(&mut self, rows: &[[u8; DIGITS]; N]) -> Result<(), DriverError> {
        for digit in 0..DIGITS {
            // DIGITS is 8, so the address always fits
            let register = reg::DIGIT0 + digit as u8;
            self.latch(|d| (register, rows[d][digit]))?;
        }
        Ok(())
    }

    /// Same register and value on every device
    fn write_all(&mut self, register: u8, value: u8) -> Result<(), DriverError> {
        self.latch(|_| (register, value))
    }

    /// Clock one word per device, furthest device first, then latch
    fn latch(&mut self, word: impl Fn(usize) -> (u8, u8)) -> Result<(), DriverError> {
        self.cs.set_low().map_err(|_| DriverError::Pin)?;
        let sent = self.shift(word);
        // Release CS even after a failed transfer
        let released = self.cs.set_high().map_err(|_| DriverError::Pin);
        sent.and(released)
    }

    fn shift(&mut self, word: impl Fn(usize) -> (u8, u8)) -> Result<(), DriverError> {
        for device in (0..N).rev() {
            let (register, value) = word(device);
            self.spi
                .write(&[register, value])
                .map_err(|_| DriverError::Spi)?;
        }
        self.spi.flush().map_err(|_| DriverError::Spi)
    }

    /// Give the bus and pin back
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }
}
