//! Board-agnostic core logic for the Glimmer logic display firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Font tables and the display rendering engine
//! - Indicator swipe animation and its matrix/strip backends
//! - Timed effects (alarm, march, leia, failure)
//! - Display supervisor applying protocol commands
//! - Profile and global settings persistence
//!
//! Nothing here reads a clock or touches hardware. The firmware passes the
//! current [`embassy_time::Instant`] and a random source into every tick
//! and copies the resulting [`Frame`] to the LED drivers.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod display;
pub mod effect;
pub mod font;
pub mod frame;
pub mod indicator;
pub mod render;
pub mod supervisor;
pub mod system;
pub mod timing;

#[cfg(test)]
pub(crate) mod testing;

pub use frame::{DeviceId, Frame, Position};
pub use supervisor::{Applied, CommandError, Supervisor, SystemState};
pub use system::{LineError, SettingError, System};
