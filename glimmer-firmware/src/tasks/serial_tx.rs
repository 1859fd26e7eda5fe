//! Serial transmit task
//!
//! Sends operator diagnostics queued by the other tasks.

use core::fmt::{Display, Write as _};

use defmt::{info, warn};
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;
use glimmer_protocol::ALERT_BYTE;
use heapless::String;

use crate::channels::{Reply, REPLY_CHANNEL, REPLY_LEN};

/// Serial TX task - drains the reply channel onto the UART
#[embassy_executor::task]
pub async fn serial_tx_task(mut tx: BufferedUartTx) {
    info!("Serial TX task started");

    loop {
        let reply = REPLY_CHANNEL.receive().await;
        if let Err(e) = tx.write_all(reply.as_bytes()).await {
            warn!("Failed to send diagnostic: {:?}", e);
        }
    }
}

/// Queue a diagnostic line followed by the alert byte.
///
/// Dropped with a warning when the transmitter is backed up.
pub fn send_diagnostic(message: impl Display) {
    // Overlong messages are cut short; the terminator still fits
    let mut text: String<{ REPLY_LEN - 3 }> = String::new();
    let _ = write!(text, "{}", message);

    let mut reply = Reply::new();
    let _ = reply.push_str(&text);
    let _ = reply.push_str("\r\n");
    let _ = reply.push(char::from(ALERT_BYTE));

    if REPLY_CHANNEL.try_send(reply).is_err() {
        warn!("Reply channel full, dropping diagnostic");
    }
}
