//! Render task
//!
//! Owns the [`System`]. Every tick it applies queued lines, renders one
//! frame, pushes it to the hardware and feeds the watchdog. Nothing else
//! touches the profile, so commands never land mid-render.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::{SPI0, SPI1};
use embassy_rp::spi::{Blocking, Spi};
use embassy_rp::watchdog::Watchdog;
use embassy_time::{Duration, Instant, Ticker};
use glimmer_core::frame::{DeviceId, Position, DEVICE_COUNT};
use glimmer_core::{Applied, Frame, System};
use glimmer_drivers::{DriverError, Max7219Chain, Ws2812Spi};
use glimmer_hal_rp2040::flash::Rp2040FlashStorage;
use rand::rngs::SmallRng;
use smart_leds::{brightness, SmartLedsWrite};

use super::serial_tx::send_diagnostic;
use crate::channels::LINE_CHANNEL;

/// Render cadence
pub const TICK_INTERVAL: Duration = Duration::from_millis(10);

/// Reset if the render loop stalls this long
pub const WATCHDOG_TIMEOUT: Duration = Duration::from_secs(2);

pub type Storage = Rp2040FlashStorage<'static>;
pub type MatrixSpi = Spi<'static, SPI0, Blocking>;
pub type StripSpi = Spi<'static, SPI1, Blocking>;

/// Output hardware.
///
/// Both MAX7219 chains share clock and data on SPI0, each with its own LOAD
/// line. The two strips are wired in series on SPI1, front first.
pub struct Outputs {
    matrix_spi: MatrixSpi,
    front_load: Output<'static>,
    rear_load: Output<'static>,
    strips: Ws2812Spi<StripSpi>,
    /// Intensity last written per device
    intensity: [Option<u8>; DEVICE_COUNT],
}

impl Outputs {
    pub fn new(
        matrix_spi: MatrixSpi,
        front_load: Output<'static>,
        rear_load: Output<'static>,
        strip_spi: StripSpi,
    ) -> Self {
        Self {
            matrix_spi,
            front_load,
            rear_load,
            strips: Ws2812Spi::new(strip_spi),
            intensity: [None; DEVICE_COUNT],
        }
    }

    /// Configure both chains and blank everything
    pub fn init(&mut self) -> Result<(), DriverError> {
        Max7219Chain::<_, _, 3>::new(&mut self.matrix_spi, &mut self.front_load).init()?;
        Max7219Chain::<_, _, 4>::new(&mut self.matrix_spi, &mut self.rear_load).init()?;
        self.intensity = [None; DEVICE_COUNT];
        self.write(&Frame::new())
    }

    /// Push a frame to every output
    pub fn write(&mut self, frame: &Frame) -> Result<(), DriverError> {
        write_chain(
            &mut self.matrix_spi,
            &mut self.front_load,
            &DeviceId::FRONT_CHAIN,
            frame,
            &mut self.intensity,
        )?;
        write_chain(
            &mut self.matrix_spi,
            &mut self.rear_load,
            &DeviceId::REAR_CHAIN,
            frame,
            &mut self.intensity,
        )?;

        let front = brightness(
            frame.strip(Position::Front).iter().copied(),
            frame.strip_brightness[Position::Front.index()],
        );
        let rear = brightness(
            frame.strip(Position::Rear).iter().copied(),
            frame.strip_brightness[Position::Rear.index()],
        );
        self.strips
            .write(front.chain(rear))
            .map_err(|_| DriverError::Spi)
    }
}

fn write_chain<const N: usize>(
    spi: &mut MatrixSpi,
    load: &mut Output<'static>,
    chain: &[DeviceId; N],
    frame: &Frame,
    sent: &mut [Option<u8>; DEVICE_COUNT],
) -> Result<(), DriverError> {
    let mut max = Max7219Chain::<_, _, N>::new(spi, load);
    for (position, device) in chain.iter().enumerate() {
        let level = frame.intensity[device.index()];
        if sent[device.index()] != Some(level) {
            max.set_intensity(position, level)?;
            sent[device.index()] = Some(level);
        }
    }
    max.write_rows(&frame.chain_rows(chain))
}

/// Render task - applies commands and refreshes the outputs
#[embassy_executor::task]
pub async fn render_task(
    mut system: System<Storage>,
    mut outputs: Outputs,
    mut watchdog: Watchdog,
    mut rng: SmallRng,
) {
    info!("Render task started");

    if let Err(e) = outputs.init() {
        error!("Output init failed: {:?}", e);
    }

    watchdog.start(WATCHDOG_TIMEOUT);
    let mut ticker = Ticker::every(TICK_INTERVAL);

    loop {
        let now = Instant::now();

        while let Ok(line) = LINE_CHANNEL.try_receive() {
            apply_line(&mut system, &line, now);
        }

        let frame = system.tick(now, &mut rng);
        if let Err(e) = outputs.write(frame) {
            warn!("Frame write failed: {:?}", e);
        }

        watchdog.feed();
        ticker.next().await;
    }
}

fn apply_line(system: &mut System<Storage>, line: &[u8], now: Instant) {
    match system.handle_line(line, now) {
        Ok(Applied::Updated) => debug!("Applied {=[u8]:a}", line),
        Ok(Applied::Ignored) => debug!("Ignored {=[u8]:a}", line),
        Err(e) => {
            debug!("Rejected {=[u8]:a}: {:?}", line, e);
            send_diagnostic(&e);
        }
    }
}
