//! Output drivers
//!
//! Concrete drivers for the two kinds of output hardware the logic
//! displays use:
//!
//! - MAX7219 LED matrix controllers, daisy-chained on one SPI bus
//! - WS2812 pixel strips, clocked out of an SPI MOSI line

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod max7219;
pub mod ws2812;

pub use max7219::{DriverError, Max7219Chain};
pub use ws2812::Ws2812Spi;
