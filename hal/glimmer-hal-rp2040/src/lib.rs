//! RP2040 backends for the `glimmer-hal` traits
//!
//! - [`flash::Rp2040FlashStorage`] implements `glimmer_hal::FlashStorage`
//!   on the settings partition

#![no_std]

pub mod flash;
