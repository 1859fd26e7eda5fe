//! Indicator output backends.
//!
//! The matrix backend drives a two-color PSI board on a MAX7219 device,
//! where alternate LEDs in each row are the two colors. The strip backend
//! drives a 26-pixel WS2812 strip laid out in five rows.

use rand::RngCore;
use smart_leds::RGB8;

use super::{PsiImage, RowFill};
use crate::config::OutputMode;
use crate::frame::{Frame, Position, DEVICE_ROWS, STRIP_LEN};

/// Renders a [`PsiImage`] onto one physical indicator position
pub trait IndicatorBackend {
    fn render<R: RngCore + ?Sized>(
        &self,
        image: &PsiImage,
        colors: [RGB8; 2],
        rng: &mut R,
        frame: &mut Frame,
        position: Position,
    );
}

/// Color 1 LEDs on even rows; odd rows are offset by one column
const COLOR1_EVEN: u8 = 0x55;
const COLOR1_ODD: u8 = 0xAA;

/// MAX7219 two-color board
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowBackend;

impl RowBackend {
    fn color1_pattern(row: usize) -> u8 {
        if row % 2 == 0 {
            COLOR1_EVEN
        } else {
            COLOR1_ODD
        }
    }
}

impl IndicatorBackend for RowBackend {
    fn render<R: RngCore + ?Sized>(
        &self,
        image: &PsiImage,
        _colors: [RGB8; 2],
        rng: &mut R,
        frame: &mut Frame,
        position: Position,
    ) {
        let mut rows = [0u8; DEVICE_ROWS];
        for (row, fill) in image.rows.iter().enumerate() {
            rows[row] = match fill {
                RowFill::Off => 0,
                RowFill::Color1 => Self::color1_pattern(row),
                RowFill::Color2 => !Self::color1_pattern(row),
                RowFill::Full => 0xFF,
                RowFill::Noise => rng.next_u32() as u8,
            };
        }
        *frame.rows_mut(position.device()) = rows;
    }
}

/// Pixels per strip row, top to bottom
const STRIP_ROWS: [usize; 5] = [4, 6, 6, 6, 4];

/// WS2812 strip, 13 pixels per color group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StripBackend;

impl IndicatorBackend for StripBackend {
    fn render<R: RngCore + ?Sized>(
        &self,
        image: &PsiImage,
        colors: [RGB8; 2],
        rng: &mut R,
        frame: &mut Frame,
        position: Position,
    ) {
        let mut pixels = [RGB8::default(); STRIP_LEN];
        let mut start = 0;
        for (row, &len) in STRIP_ROWS.iter().enumerate() {
            let fill = image.rows[row];
            for (j, pixel) in pixels[start..start + len].iter_mut().enumerate() {
                let group = j % 2;
                *pixel = match (fill, group) {
                    (RowFill::Color1, 0) => colors[0],
                    (RowFill::Color2, 1) => colors[1],
                    (RowFill::Full, g) => colors[g],
                    (RowFill::Noise, _) => random_color(rng),
                    _ => RGB8::default(),
                };
            }
            start += len;
        }
        *frame.strip_mut(position) = pixels;
    }
}

/// Any 24-bit color, not limited to the palette
fn random_color<R: RngCore + ?Sized>(rng: &mut R) -> RGB8 {
    let [r, g, b, _] = rng.next_u32().to_le_bytes();
    RGB8::new(r, g, b)
}

/// The backend selected by the global output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendSlot {
    Row(RowBackend),
    Strip(StripBackend),
}

impl BackendSlot {
    pub const fn from_mode(mode: OutputMode) -> Self {
        match mode {
            OutputMode::Matrix => BackendSlot::Row(RowBackend),
            OutputMode::Strip => BackendSlot::Strip(StripBackend),
        }
    }

    pub const fn mode(&self) -> OutputMode {
        match self {
            BackendSlot::Row(_) => OutputMode::Matrix,
            BackendSlot::Strip(_) => OutputMode::Strip,
        }
    }
}

impl IndicatorBackend for BackendSlot {
    fn render<R: RngCore + ?Sized>(
        &self,
        image: &PsiImage,
        colors: [RGB8; 2],
        rng: &mut R,
        frame: &mut Frame,
        position: Position,
    ) {
        match self {
            BackendSlot::Row(b) => b.render(image, colors, rng, frame, position),
            BackendSlot::Strip(b) => b.render(image, colors, rng, frame, position),
        }
    }
}
