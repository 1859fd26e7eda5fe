//! WS2812 strip over SPI
//!
//! The SPI bus must run at 3.2 MHz so that one SPI bit lasts 312.5 ns.
//! Every WS2812 data bit becomes a 4-bit symbol on MOSI:
//!
//! - `0` → `1000` (312 ns high, 938 ns low)
//! - `1` → `1110` (938 ns high, 312 ns low)
//!
//! Colors are sent in the strip's native GRB order, then MOSI is held low
//! long enough for the pixels to latch.

use embedded_hal::spi::SpiBus;
use smart_leds::{SmartLedsWrite, RGB8};

/// SPI clock the symbol timing assumes
pub const SPI_FREQUENCY_HZ: u32 = 3_200_000;

const SYMBOL_ZERO: u8 = 0b1000;
const SYMBOL_ONE: u8 = 0b1110;

/// Low bytes after a frame; 140 bytes at 3.2 MHz is 350 us
const RESET_BYTES: usize = 140;

/// WS2812 chain driven from an SPI MOSI pin
pub struct Ws2812Spi<SPI> {
    spi: SPI,
}

impl<SPI: SpiBus> Ws2812Spi<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self { spi }
    }

    /// Clock out one color byte as four SPI bytes, MSB first
    fn write_byte(&mut self, byte: u8) -> Result<(), SPI::Error> {
        self.spi.write(&encode_byte(byte))
    }

    fn write_reset(&mut self) -> Result<(), SPI::Error> {
        self.spi.write(&[0; RESET_BYTES])
    }

    pub fn release(self) -> SPI {
        self.spi
    }
}

/// Encode one byte into four SPI bytes of two symbols each
pub fn encode_byte(byte: u8) -> [u8; 4] {
    let mut out = [0u8; 4];
    for (i, slot) in out.iter_mut().enumerate() {
        let shift = 6 - 2 * i;
        let pair = (byte >> shift) & 0b11;
        let symbol = |bit: u8| if bit != 0 { SYMBOL_ONE } else { SYMBOL_ZERO };
        *slot = (symbol(pair & 0b10) << 4) | symbol(pair & 0b01);
    }
    out
}

impl<SPI: SpiBus> SmartLedsWrite for Ws2812Spi<SPI> {
    type Error = SPI::Error;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: IntoIterator<Item = I>,
        I: Into<Self::Color>,
    {
        // Leading reset guards against a half-latched previous frame
        self.write_reset()?;
        for item in iterator {
            let color: RGB8 = item.into();
            self.write_byte(color.g)?;
            self.write_byte(color.r)?;
            self.write_byte(color.b)?;
        }
        self.write_reset()?;
        self.spi.flush()
    }
}
