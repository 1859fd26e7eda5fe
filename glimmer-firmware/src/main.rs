//! Glimmer - Logic Display Firmware
//!
//! Main firmware binary for RP2040-based dome controllers. Drives the
//! front and rear logic displays and both PSI indicators, and takes
//! commands from a single-line serial protocol.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::clocks::RoscRng;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::spi::{Config as SpiConfig, Spi};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_rp::watchdog::Watchdog;
use glimmer_core::config::{ConfigStore, LoadOutcome};
use glimmer_core::System;
use glimmer_drivers::ws2812::SPI_FREQUENCY_HZ;
use glimmer_hal_rp2040::flash::Rp2040FlashStorage;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

mod channels;
mod tasks;

use tasks::render::Storage;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// Serial line speed of the command port
const BAUD_RATE: u32 = 9600;

/// MAX7219 clock, well under the 10 MHz limit
const MATRIX_SPI_HZ: u32 = 1_000_000;

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Glimmer firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Settings first, so the boot text comes from the stored profile
    let system = open_system(Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0)).await;

    // Command port
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = BAUD_RATE;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized at {} baud", BAUD_RATE);

    // MAX7219 chains: SCK=GPIO2, DIN=GPIO3, front LOAD=GPIO5, rear LOAD=GPIO6
    let mut matrix_config = SpiConfig::default();
    matrix_config.frequency = MATRIX_SPI_HZ;
    let matrix_spi = Spi::new_blocking_txonly(p.SPI0, p.PIN_2, p.PIN_3, matrix_config);
    let front_load = Output::new(p.PIN_5, Level::High);
    let rear_load = Output::new(p.PIN_6, Level::High);

    // PSI strips: data on GPIO11 (SCK on GPIO10 is unused)
    let mut strip_config = SpiConfig::default();
    strip_config.frequency = SPI_FREQUENCY_HZ;
    let strip_spi = Spi::new_blocking_txonly(p.SPI1, p.PIN_10, p.PIN_11, strip_config);

    let outputs = tasks::Outputs::new(matrix_spi, front_load, rear_load, strip_spi);
    info!("Outputs initialized");

    let rng = SmallRng::seed_from_u64(RoscRng.next_u64());
    let watchdog = Watchdog::new(p.WATCHDOG);

    // Spawn tasks
    spawner.spawn(tasks::serial_rx_task(rx)).unwrap();
    spawner.spawn(tasks::serial_tx_task(tx)).unwrap();
    spawner
        .spawn(tasks::render_task(system, outputs, watchdog, rng))
        .unwrap();

    info!("All tasks spawned, firmware running");
}

/// Load the global settings and the last active profile.
///
/// Storage problems never stop the boot: the store falls back to factory
/// settings and the outcome is only logged.
async fn open_system(storage: Storage) -> System<Storage> {
    let mut system = System::new(ConfigStore::new(storage));

    match system.open().await {
        Ok(LoadOutcome::Loaded) => {
            info!("Loaded profile {}", system.active_slot().number());
        }
        Ok(LoadOutcome::Factory) => {
            info!("Using factory profile {}", system.active_slot().number());
        }
        Ok(LoadOutcome::Recovered(e)) => {
            warn!(
                "Profile {} was damaged ({:?}), restored defaults",
                system.active_slot().number(),
                e
            );
        }
        Err(e) => {
            error!("Settings unavailable, running on defaults: {:?}", e);
        }
    }
    info!("Output mode: {:?}", system.output_mode());

    system
}
