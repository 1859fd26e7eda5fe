//! Per-display mode and rendering.

use embassy_time::Instant;
use glimmer_protocol::MAX_TEXT_LEN;
use heapless::String;
use rand::RngCore;

use crate::config::Profile;
use crate::font::Alphabet;
use crate::frame::{Frame, DEVICE_ROWS};
use crate::render::bargraph::BARGRAPH_INTERVAL;
use crate::render::mapping::{clear_display, OVERFLOW_ROW};
use crate::render::random::MAX_STYLE;
use crate::render::{full_grid, map_grid, random_row, render_text, Bargraph, DisplayId, ScrollState};
use crate::timing::{millis, Cadence};

/// Display mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayState {
    #[default]
    Random,
    Text,
    Bargraph,
    Test,
    Off,
}

/// One logic display: mode, text buffer, scroll and animation timers
#[derive(Debug, Clone)]
pub struct Display {
    id: DisplayId,
    state: DisplayState,
    alphabet: Alphabet,
    text: String<MAX_TEXT_LEN>,
    scroll: ScrollState,
    style: u8,
    random_cadence: Cadence,
    scroll_cadence: Cadence,
    bargraph_cadence: Cadence,
    bargraph: Bargraph,
}

impl Display {
    pub fn new(id: DisplayId, style: u8) -> Self {
        Self {
            id,
            state: DisplayState::Random,
            alphabet: Alphabet::Primary,
            text: String::new(),
            scroll: ScrollState::new(id.width()),
            style: style.min(MAX_STYLE),
            random_cadence: Cadence::new(),
            scroll_cadence: Cadence::new(),
            bargraph_cadence: Cadence::new(),
            bargraph: Bargraph::new(),
        }
    }

    pub fn id(&self) -> DisplayId {
        self.id
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    pub fn alphabet(&self) -> Alphabet {
        self.alphabet
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn scroll(&self) -> &ScrollState {
        &self.scroll
    }

    pub fn style(&self) -> u8 {
        self.style
    }

    /// Change mode, abandoning any scroll or bargraph progress
    pub fn set_state(&mut self, state: DisplayState) {
        self.state = state;
        self.restart_scroll();
        self.bargraph.reset();
        self.bargraph_cadence.reset();
        self.random_cadence.reset();
    }

    /// Replace the text buffer, truncated on a character boundary
    pub fn set_text(&mut self, text: &str) {
        self.text.clear();
        for c in text.chars() {
            if self.text.push(c).is_err() {
                break;
            }
        }
        self.restart_scroll();
    }

    pub fn set_alphabet(&mut self, alphabet: Alphabet) {
        self.alphabet = alphabet;
    }

    /// Random density, clamped to the highest style
    pub fn set_style(&mut self, style: u8) {
        self.style = style.min(MAX_STYLE);
    }

    /// Make the next tick redraw random rows at once
    pub fn reset_timers(&mut self) {
        self.random_cadence.reset();
        self.scroll_cadence.reset();
        self.bargraph_cadence.reset();
    }

    fn restart_scroll(&mut self) {
        self.scroll = ScrollState::new(self.id.width());
        self.scroll_cadence.reset();
    }

    /// Draw this display into the frame for the current mode
    pub fn render<R: RngCore + ?Sized>(
        &mut self,
        now: Instant,
        profile: &Profile,
        rng: &mut R,
        frame: &mut Frame,
    ) {
        match self.state {
            DisplayState::Random => {
                if self.random_cadence.due(now, millis(profile.update_delay_ms)) {
                    fill_random(self.id, self.style, rng, frame);
                }
            }
            DisplayState::Text => {
                if self.scroll_cadence.due(now, millis(profile.scroll_delay_ms)) {
                    self.scroll.step(self.text.chars().count(), self.id.width());
                }
                let grid = render_text(&self.text, self.alphabet, self.scroll.cursor, self.id.width());
                map_grid(self.id, &grid, frame);
            }
            DisplayState::Bargraph => {
                if self.bargraph_cadence.due(now, BARGRAPH_INTERVAL) {
                    self.bargraph.step(self.id.width(), rng);
                }
                map_grid(self.id, &self.bargraph.grid(self.id.width()), frame);
            }
            DisplayState::Test => map_grid(self.id, &full_grid(self.id), frame),
            DisplayState::Off => clear_display(self.id, frame),
        }
    }
}

/// Write random rows straight to a display's devices, bypassing the grid
pub fn fill_random<R: RngCore + ?Sized>(id: DisplayId, style: u8, rng: &mut R, frame: &mut Frame) {
    for device in id.devices() {
        let rows = frame.rows_mut(*device);
        for row in rows.iter_mut().take(OVERFLOW_ROW + 1) {
            *row = random_row(style, rng);
        }
        for row in rows.iter_mut().take(DEVICE_ROWS).skip(OVERFLOW_ROW + 1) {
            *row = 0;
        }
    }
}
