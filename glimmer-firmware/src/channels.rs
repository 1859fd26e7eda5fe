//! Inter-task communication channels
//!
//! Serial lines flow from the receive task to the render task, which is the
//! only owner of the system state. Diagnostics flow back to the transmit
//! task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use glimmer_protocol::MAX_LINE_LEN;
use heapless::{String, Vec};

/// Channel capacity for received lines
const LINE_CHANNEL_SIZE: usize = 8;

/// Channel capacity for outgoing diagnostics
const REPLY_CHANNEL_SIZE: usize = 4;

/// Longest diagnostic, alert byte included
pub const REPLY_LEN: usize = 64;

/// One complete protocol line, terminator stripped
pub type Line = Vec<u8, MAX_LINE_LEN>;

/// Text sent back to the operator
pub type Reply = String<REPLY_LEN>;

/// Lines from the UART, applied in arrival order by the render task
pub static LINE_CHANNEL: Channel<CriticalSectionRawMutex, Line, LINE_CHANNEL_SIZE> = Channel::new();

/// Diagnostics for the UART transmitter
pub static REPLY_CHANNEL: Channel<CriticalSectionRawMutex, Reply, REPLY_CHANNEL_SIZE> =
    Channel::new();
