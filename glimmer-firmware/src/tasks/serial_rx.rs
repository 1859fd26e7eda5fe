//! Serial receive task
//!
//! Splits the UART byte stream into protocol lines and queues them for the
//! render task. Nothing is decoded here.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;
use glimmer_protocol::{LineAccumulator, LineEvent, MAX_LINE_LEN};

use super::serial_tx::send_diagnostic;
use crate::channels::{Line, LINE_CHANNEL};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Serial RX task - accumulates bytes into lines
#[embassy_executor::task]
pub async fn serial_rx_task(mut rx: BufferedUartRx) {
    info!("Serial RX task started");

    let mut lines: LineAccumulator<MAX_LINE_LEN> = LineAccumulator::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);
                for &byte in &buf[..n] {
                    match lines.push(byte) {
                        Some(LineEvent::Line(line)) => queue_line(line),
                        Some(LineEvent::Overflow) => {
                            debug!("Line longer than {} bytes discarded", MAX_LINE_LEN);
                            send_diagnostic("line too long");
                        }
                        None => {}
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {:?}", e);
                lines.reset();
            }
        }
    }
}

fn queue_line(bytes: &[u8]) {
    let mut line = Line::new();
    // The accumulator never yields more than MAX_LINE_LEN bytes
    if line.extend_from_slice(bytes).is_err() {
        return;
    }
    if LINE_CHANNEL.try_send(line).is_err() {
        warn!("Line channel full, dropping command");
    }
}
