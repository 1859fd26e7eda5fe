//! Logic Display Command Protocol
//!
//! This crate defines the single-line text protocol accepted on the serial
//! port. Each command is one line, terminated by `\r` or `\n`:
//!
//! ```text
//! ┌──────────┬──────┬──────────────────────────┐
//! │ TARGET   │ VERB │ ARGUMENT                 │
//! │ 1-2 dig. │ 1 ch │ digits / text / sub+idx  │
//! └──────────┴──────┴──────────────────────────┘
//! ```
//!
//! Examples: `0T1` (everything random), `1MHELLO` (top text), `4C111`
//! (front indicator color slot 1 = palette 11).
//!
//! Bytes are accumulated into lines by [`LineAccumulator`] and each line is
//! turned into a [`Command`] by [`decode`]. Neither step has side effects;
//! range checks that depend on the verb happen in the display supervisor.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod line;

pub use command::{decode, Command, DecodeError, Target, Verb, MAX_TEXT_LEN};
pub use line::{LineAccumulator, LineEvent, MAX_LINE_LEN};

/// Audible alert appended to diagnostics for legacy terminals
pub const ALERT_BYTE: u8 = 0x07;
