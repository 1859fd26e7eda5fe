//! Display supervisor.
//!
//! Applies decoded commands to the display, indicator and effect state,
//! and renders one frame per tick. The active profile is passed in by the
//! caller on every call; the supervisor never keeps a copy of it.
//!
//! ```text
//!  Command ──► apply ──► SystemState ──► tick ──► Frame
//!                 │            ▲
//!                 ▼            │
//!              Profile ────────┘
//! ```

use embassy_time::Instant;
use glimmer_protocol::{Command, Target, Verb};
use rand::RngCore;

use crate::config::{OutputMode, Parameter, Profile};
use crate::display::{Display, DisplayState};
use crate::effect::{draw_indicator, EffectKind, EffectRunner, EffectTick, Scene};
use crate::font::Alphabet;
use crate::frame::Frame;
use crate::indicator::{BackendSlot, Indicator, IndicatorId, PsiState, PALETTE_LEN};
use crate::render::random::MAX_STYLE;
use crate::render::DisplayId;

/// Text shown by the marquee mode
pub const MARQUEE_TEXT: &str = "GLIMMER LOGIC DISPLAYS ONLINE";

/// Mode verb arguments
mod mode {
    pub const TEST: u32 = 0;
    pub const RANDOM: u32 = 1;
    pub const ALARM: u32 = 2;
    pub const ALARM_ALT: u32 = 3;
    pub const FAILURE: u32 = 4;
    pub const ALARM_SHORT: u32 = 5;
    pub const LEIA: u32 = 6;
    pub const MARQUEE: u32 = 10;
    pub const MARCH: u32 = 11;
    pub const OFF: u32 = 20;
    pub const BARGRAPH: u32 = 92;
    pub const STOP_EFFECT: u32 = 99;
    pub const TEXT: u32 = 100;
}

const MAX_BRIGHTNESS: u32 = 15;

/// Command rejected before any state changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    OutOfRange { min: u32, max: u32 },
}

impl core::fmt::Display for CommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CommandError::OutOfRange { min, max } => write!(f, "value must be {}-{}", min, max),
        }
    }
}

/// Result of applying a valid command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Applied {
    Updated,
    /// Verb does not apply to the target
    Ignored,
}

/// Shows each display's boot text until every display has scrolled it once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootSequence {
    active: bool,
}

impl BootSequence {
    pub fn start(displays: &mut [Display; 3], profile: &Profile) -> Self {
        for display in displays.iter_mut() {
            display.set_text(profile.boot_text(display.id().index()));
            display.set_state(DisplayState::Text);
        }
        Self { active: true }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    /// Switch to Random once every boot text has completed a loop
    fn poll(&mut self, displays: &mut [Display; 3]) {
        if self.active && displays.iter().all(|d| d.scroll().loops >= 1) {
            for display in displays.iter_mut() {
                display.set_state(DisplayState::Random);
            }
            self.active = false;
        }
    }
}

/// All mutable display state in one place
#[derive(Debug, Clone)]
pub struct SystemState {
    pub effect: EffectRunner,
    pub displays: [Display; 3],
    pub indicators: [Indicator; 2],
    pub boot: BootSequence,
}

impl SystemState {
    pub fn new(profile: &Profile) -> Self {
        let mut displays = DisplayId::ALL.map(|id| Display::new(id, profile.random_style));
        let boot = BootSequence::start(&mut displays, profile);
        Self {
            effect: EffectRunner::new(),
            displays,
            indicators: IndicatorId::ALL.map(Indicator::new),
            boot,
        }
    }

    pub fn display(&self, id: DisplayId) -> &Display {
        &self.displays[id.index()]
    }

    pub fn indicator(&self, id: IndicatorId) -> &Indicator {
        &self.indicators[id.index()]
    }
}

fn displays_for(target: Target) -> &'static [DisplayId] {
    match target {
        Target::Broadcast => &DisplayId::ALL,
        Target::Top => &[DisplayId::Top],
        Target::Bottom => &[DisplayId::Bottom],
        Target::Rear => &[DisplayId::Rear],
        Target::FrontIndicator | Target::RearIndicator => &[],
    }
}

fn indicators_for(target: Target) -> &'static [IndicatorId] {
    match target {
        Target::Broadcast => &IndicatorId::ALL,
        Target::FrontIndicator => &[IndicatorId::Front],
        Target::RearIndicator => &[IndicatorId::Rear],
        Target::Top | Target::Bottom | Target::Rear => &[],
    }
}

fn check_range(value: u32, min: u32, max: u32) -> Result<u32, CommandError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(CommandError::OutOfRange { min, max })
    }
}

/// Owns the system state, the indicator backend and the output frame
pub struct Supervisor {
    state: SystemState,
    backend: BackendSlot,
    frame: Frame,
}

impl Supervisor {
    pub fn new(profile: &Profile, mode: OutputMode) -> Self {
        let mut frame = Frame::new();
        frame.apply_brightness(&profile.brightness);
        Self {
            state: SystemState::new(profile),
            backend: BackendSlot::from_mode(mode),
            frame,
        }
    }

    pub fn state(&self) -> &SystemState {
        &self.state
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn output_mode(&self) -> OutputMode {
        self.backend.mode()
    }

    /// Switch indicator hardware, blanking whatever the old backend drew
    pub fn set_backend(&mut self, mode: OutputMode) {
        if self.backend.mode() != mode {
            self.backend = BackendSlot::from_mode(mode);
            self.frame.clear_indicators();
        }
    }

    /// Re-apply everything derived from a newly loaded profile
    pub fn on_profile_loaded(&mut self, profile: &Profile) {
        self.on_settings_changed(profile);
        for display in self.state.displays.iter_mut() {
            display.set_text(profile.boot_text(display.id().index()));
        }
    }

    /// Re-apply brightness and random style after a bulk edit.
    ///
    /// Displayed text is left alone; boot texts only take effect on load.
    pub fn on_settings_changed(&mut self, profile: &Profile) {
        self.frame.apply_brightness(&profile.brightness);
        for display in self.state.displays.iter_mut() {
            display.set_style(profile.random_style);
        }
    }

    /// Propagate a single field change made through the mutation façade
    pub fn on_parameter_changed(&mut self, param: Parameter, profile: &Profile) {
        if param.is_brightness() {
            self.frame.apply_brightness(&profile.brightness);
        } else if param == Parameter::RandomStyle {
            for display in self.state.displays.iter_mut() {
                display.set_style(profile.random_style);
            }
        }
    }

    /// Apply one decoded command
    pub fn apply(
        &mut self,
        command: &Command,
        profile: &mut Profile,
        now: Instant,
    ) -> Result<Applied, CommandError> {
        let target = command.target;
        match &command.verb {
            Verb::Mode(n) => Ok(self.apply_mode(target, *n, now)),
            Verb::Text(text) => {
                let ids = displays_for(target);
                if ids.is_empty() {
                    return Ok(Applied::Ignored);
                }
                self.state.boot.cancel();
                for id in ids {
                    let display = &mut self.state.displays[id.index()];
                    display.set_text(text);
                    if display.state() != DisplayState::Text {
                        display.set_state(DisplayState::Text);
                    }
                }
                Ok(Applied::Updated)
            }
            Verb::Alphabet(code) => {
                let alphabet = Alphabet::from_code(*code)
                    .ok_or(CommandError::OutOfRange { min: 60, max: 61 })?;
                let ids = displays_for(target);
                if ids.is_empty() {
                    return Ok(Applied::Ignored);
                }
                for id in ids {
                    self.state.displays[id.index()].set_alphabet(alphabet);
                }
                Ok(Applied::Updated)
            }
            Verb::Style(n) => {
                let ids = displays_for(target);
                if ids.is_empty() {
                    return Ok(Applied::Ignored);
                }
                let style = (*n).min(u32::from(MAX_STYLE)) as u8;
                for id in ids {
                    self.state.displays[id.index()].set_style(style);
                }
                if target == Target::Broadcast {
                    profile.random_style = style;
                }
                Ok(Applied::Updated)
            }
            Verb::IndicatorState(n) => {
                let state =
                    PsiState::from_number(*n).ok_or(CommandError::OutOfRange { min: 0, max: 4 })?;
                let ids = indicators_for(target);
                if ids.is_empty() {
                    return Ok(Applied::Ignored);
                }
                for id in ids {
                    self.state.indicators[id.index()].set_state(state);
                }
                Ok(Applied::Updated)
            }
            Verb::Brightness(n) => {
                let level = check_range(*n, 0, MAX_BRIGHTNESS)? as u8;
                let b = &mut profile.brightness;
                match target {
                    Target::Broadcast => {
                        b.front_logic = level;
                        b.rear_logic = level;
                        b.front_psi = level;
                        b.rear_psi = level;
                    }
                    Target::Top | Target::Bottom => b.front_logic = level,
                    Target::Rear => b.rear_logic = level,
                    Target::FrontIndicator => b.front_psi = level,
                    Target::RearIndicator => b.rear_psi = level,
                }
                self.frame.apply_brightness(&profile.brightness);
                Ok(Applied::Updated)
            }
            Verb::Color { slot, index } => {
                let indicator = match target {
                    Target::FrontIndicator => IndicatorId::Front,
                    Target::RearIndicator => IndicatorId::Rear,
                    _ => return Err(CommandError::OutOfRange { min: 4, max: 5 }),
                };
                let slot = check_range(u32::from(*slot), 1, 2)? as usize;
                let index = check_range(*index, 0, PALETTE_LEN as u32 - 1)? as u8;
                profile.psi_colors[indicator.index()][slot - 1] = index;
                Ok(Applied::Updated)
            }
        }
    }

    fn apply_mode(&mut self, target: Target, n: u32, now: Instant) -> Applied {
        let effect = match n {
            mode::ALARM | mode::ALARM_ALT | mode::ALARM_SHORT => Some(EffectKind::Alarm),
            mode::FAILURE => Some(EffectKind::Failure),
            mode::LEIA => Some(EffectKind::Leia),
            mode::MARCH => Some(EffectKind::March),
            _ => None,
        };
        if let Some(kind) = effect {
            self.state.boot.cancel();
            self.state.effect.start(kind, now);
            return Applied::Updated;
        }
        if n == mode::STOP_EFFECT {
            self.stop_effect();
            return Applied::Updated;
        }

        let (display_state, psi_state) = match n {
            mode::TEST => (Some(DisplayState::Test), Some(PsiState::Test)),
            mode::RANDOM => (Some(DisplayState::Random), Some(PsiState::Random)),
            mode::OFF => (Some(DisplayState::Off), Some(PsiState::Off)),
            mode::BARGRAPH => (Some(DisplayState::Bargraph), None),
            mode::TEXT | mode::MARQUEE => (Some(DisplayState::Text), None),
            // Unknown modes only stop the running effect
            _ => (None, None),
        };

        let displays = displays_for(target);
        let indicators = indicators_for(target);
        let touches_displays = display_state.is_some() && !displays.is_empty();
        let touches_indicators = psi_state.is_some() && !indicators.is_empty();
        if (display_state.is_some() || psi_state.is_some()) && !touches_displays && !touches_indicators
        {
            return Applied::Ignored;
        }

        self.stop_effect();
        if display_state.is_some() || psi_state.is_some() {
            self.state.boot.cancel();
        }

        if let Some(state) = display_state {
            for id in displays {
                let display = &mut self.state.displays[id.index()];
                if n == mode::MARQUEE {
                    display.set_alphabet(Alphabet::Primary);
                    display.set_text(MARQUEE_TEXT);
                }
                display.set_state(state);
            }
        }
        if let Some(state) = psi_state {
            for id in indicators {
                self.state.indicators[id.index()].set_state(state);
            }
        }
        Applied::Updated
    }

    fn stop_effect(&mut self) {
        if self.state.effect.is_active() {
            self.state.effect.stop();
            for display in self.state.displays.iter_mut() {
                display.reset_timers();
            }
        }
    }

    /// Render one frame
    pub fn tick<R: RngCore + ?Sized>(&mut self, now: Instant, profile: &Profile, rng: &mut R) -> &Frame {
        self.state.boot.poll(&mut self.state.displays);

        let outcome = {
            let mut scene = Scene {
                profile,
                backend: &self.backend,
                rng: &mut *rng,
                frame: &mut self.frame,
            };
            self.state
                .effect
                .tick(now, &mut self.state.indicators, &mut scene)
        };

        match outcome {
            EffectTick::Rendered => return &self.frame,
            EffectTick::Expired(_) => {
                for display in self.state.displays.iter_mut() {
                    display.reset_timers();
                }
            }
            EffectTick::Idle => {}
        }

        for display in self.state.displays.iter_mut() {
            display.render(now, profile, rng, &mut self.frame);
        }
        for indicator in self.state.indicators.iter_mut() {
            indicator.advance(now, profile, rng);
            draw_indicator(
                &self.backend,
                indicator.id(),
                &indicator.image(),
                indicator.color_slots(profile),
                profile.swap_indicators,
                rng,
                &mut self.frame,
            );
        }
        &self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfileSlot;
    use crate::frame::{DeviceId, Position};
    use crate::render::{full_grid, unmap_grid};
    use glimmer_protocol::decode;
    use rand::rngs::mock::StepRng;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn setup() -> (Supervisor, Profile) {
        let profile = Profile::defaults(ProfileSlot::FACTORY);
        (Supervisor::new(&profile, OutputMode::Matrix), profile)
    }

    fn send(sup: &mut Supervisor, profile: &mut Profile, line: &str) -> Result<Applied, CommandError> {
        let command = decode(line.as_bytes()).unwrap();
        sup.apply(&command, profile, at(0))
    }

    #[test]
    fn test_boots_into_boot_text() {
        let (sup, profile) = setup();
        assert!(sup.state().boot.is_active());
        for id in DisplayId::ALL {
            let display = sup.state().display(id);
            assert_eq!(display.state(), DisplayState::Text);
            assert_eq!(display.text(), profile.boot_text(id.index()));
        }
    }

    #[test]
    fn test_boot_sequence_ends_after_every_display_loops() {
        let (mut sup, mut profile) = setup();
        profile.scroll_delay_ms = 10;
        let mut rng = StepRng::new(0, 0);
        let mut ms = 0;
        while sup.state().boot.is_active() {
            sup.tick(at(ms), &profile, &mut rng);
            ms += 10;
            assert!(ms < 100_000, "boot sequence never finished");
        }
        for id in DisplayId::ALL {
            assert_eq!(sup.state().display(id).state(), DisplayState::Random);
        }
    }

    #[test]
    fn test_broadcast_random_clears_effect() {
        let (mut sup, mut profile) = setup();
        send(&mut sup, &mut profile, "0T2").unwrap();
        send(&mut sup, &mut profile, "4S0").unwrap();
        assert!(sup.state().effect.is_active());

        assert_eq!(send(&mut sup, &mut profile, "0T1"), Ok(Applied::Updated));
        assert!(!sup.state().effect.is_active());
        assert!(!sup.state().boot.is_active());
        for id in DisplayId::ALL {
            assert_eq!(sup.state().display(id).state(), DisplayState::Random);
        }
        for id in IndicatorId::ALL {
            assert_eq!(sup.state().indicator(id).state(), PsiState::Random);
        }
    }

    #[test]
    fn test_single_target_text() {
        let (mut sup, mut profile) = setup();
        let before_bottom = sup.state().display(DisplayId::Bottom).clone();
        let mut rng = StepRng::new(0, 0);
        sup.tick(at(0), &profile, &mut rng);
        let bottom_scroll = *sup.state().display(DisplayId::Bottom).scroll();

        send(&mut sup, &mut profile, "1MHELLO").unwrap();
        let top = sup.state().display(DisplayId::Top);
        assert_eq!(top.text(), "HELLO");
        assert_eq!(top.scroll().cursor, 9);
        assert_eq!(top.scroll().loops, 0);

        let bottom = sup.state().display(DisplayId::Bottom);
        assert_eq!(bottom.text(), before_bottom.text());
        assert_eq!(bottom.scroll(), &bottom_scroll);
        assert_ne!(bottom_scroll.cursor, 9);
    }

    #[test]
    fn test_broadcast_text_resets_all() {
        let (mut sup, mut profile) = setup();
        send(&mut sup, &mut profile, "0MHI").unwrap();
        for id in DisplayId::ALL {
            assert_eq!(sup.state().display(id).text(), "HI");
            assert_eq!(sup.state().display(id).scroll().cursor, id.width() as i16);
        }
    }

    #[test]
    fn test_color_verb() {
        let (mut sup, mut profile) = setup();
        assert_eq!(send(&mut sup, &mut profile, "4C111"), Ok(Applied::Updated));
        assert_eq!(profile.psi_colors, [[11, 5], [2, 3]]);

        assert_eq!(
            send(&mut sup, &mut profile, "1C105"),
            Err(CommandError::OutOfRange { min: 4, max: 5 })
        );
        assert_eq!(
            send(&mut sup, &mut profile, "5C305"),
            Err(CommandError::OutOfRange { min: 1, max: 2 })
        );
        assert_eq!(
            send(&mut sup, &mut profile, "5C212"),
            Err(CommandError::OutOfRange { min: 0, max: 11 })
        );
        assert_eq!(profile.psi_colors, [[11, 5], [2, 3]]);
    }

    #[test]
    fn test_brightness_out_of_range_changes_nothing() {
        let (mut sup, mut profile) = setup();
        let before = profile.brightness;
        let frame_before = sup.frame().clone();
        assert_eq!(
            send(&mut sup, &mut profile, "0L20"),
            Err(CommandError::OutOfRange { min: 0, max: 15 })
        );
        assert_eq!(profile.brightness, before);
        assert_eq!(sup.frame(), &frame_before);
    }

    #[test]
    fn test_brightness_targets() {
        let (mut sup, mut profile) = setup();
        send(&mut sup, &mut profile, "2L3").unwrap();
        assert_eq!(profile.brightness.front_logic, 3);
        assert_eq!(sup.frame().intensity[DeviceId::Top.index()], 3);

        send(&mut sup, &mut profile, "5L1").unwrap();
        assert_eq!(profile.brightness.rear_psi, 1);
        assert_eq!(sup.frame().intensity[DeviceId::RearPsi.index()], 1);

        send(&mut sup, &mut profile, "0L9").unwrap();
        assert_eq!(profile.brightness, crate::config::Brightness::uniform(9));
    }

    #[test]
    fn test_display_mode_on_indicator_is_ignored() {
        let (mut sup, mut profile) = setup();
        send(&mut sup, &mut profile, "0T6").unwrap();
        assert_eq!(send(&mut sup, &mut profile, "4T92"), Ok(Applied::Ignored));
        assert_eq!(send(&mut sup, &mut profile, "5MHI"), Ok(Applied::Ignored));
        assert_eq!(send(&mut sup, &mut profile, "1S2"), Ok(Applied::Ignored));
        // Ignored commands do not stop the effect
        assert_eq!(sup.state().effect.kind(), Some(EffectKind::Leia));
    }

    #[test]
    fn test_range_checked_before_target() {
        let (mut sup, mut profile) = setup();
        assert_eq!(
            send(&mut sup, &mut profile, "4P62"),
            Err(CommandError::OutOfRange { min: 60, max: 61 })
        );
        assert_eq!(
            send(&mut sup, &mut profile, "1S7"),
            Err(CommandError::OutOfRange { min: 0, max: 4 })
        );
    }

    #[test]
    fn test_style_clamps_and_broadcast_persists() {
        let (mut sup, mut profile) = setup();
        send(&mut sup, &mut profile, "3R40").unwrap();
        assert_eq!(sup.state().display(DisplayId::Rear).style(), 6);
        assert_eq!(profile.random_style, 3);

        send(&mut sup, &mut profile, "0R1").unwrap();
        assert_eq!(profile.random_style, 1);
        for id in DisplayId::ALL {
            assert_eq!(sup.state().display(id).style(), 1);
        }
    }

    #[test]
    fn test_marquee() {
        let (mut sup, mut profile) = setup();
        send(&mut sup, &mut profile, "2P61").unwrap();
        send(&mut sup, &mut profile, "2T10").unwrap();
        let bottom = sup.state().display(DisplayId::Bottom);
        assert_eq!(bottom.text(), MARQUEE_TEXT);
        assert_eq!(bottom.alphabet(), Alphabet::Primary);
        assert_eq!(bottom.state(), DisplayState::Text);
    }

    #[test]
    fn test_stop_keeps_unit_state() {
        let (mut sup, mut profile) = setup();
        send(&mut sup, &mut profile, "1T92").unwrap();
        send(&mut sup, &mut profile, "0T11").unwrap();
        assert_eq!(sup.state().effect.kind(), Some(EffectKind::March));
        send(&mut sup, &mut profile, "0T99").unwrap();
        assert!(!sup.state().effect.is_active());
        assert_eq!(
            sup.state().display(DisplayId::Top).state(),
            DisplayState::Bargraph
        );
    }

    #[test]
    fn test_unknown_mode_stops_effect() {
        let (mut sup, mut profile) = setup();
        send(&mut sup, &mut profile, "0T4").unwrap();
        send(&mut sup, &mut profile, "3T55").unwrap();
        assert!(!sup.state().effect.is_active());
    }

    #[test]
    fn test_effect_supersedes_rendering() {
        let (mut sup, mut profile) = setup();
        send(&mut sup, &mut profile, "0T20").unwrap();
        send(&mut sup, &mut profile, "0T2").unwrap();
        let mut rng = StepRng::new(0, 0);
        let frame = sup.tick(at(0), &profile, &mut rng);
        assert_eq!(unmap_grid(DisplayId::Rear, frame), full_grid(DisplayId::Rear));

        // Alarm expires at 4 s; Off displays render in the same tick
        let frame = sup.tick(at(4_000), &profile, &mut rng);
        assert_eq!(unmap_grid(DisplayId::Rear, frame), [0; 5]);
        assert!(!sup.state().effect.is_active());
    }

    #[test]
    fn test_swapped_indicators_follow_position() {
        let (mut sup, mut profile) = setup();
        sup.set_backend(OutputMode::Strip);
        send(&mut sup, &mut profile, "4S0").unwrap();
        send(&mut sup, &mut profile, "5S4").unwrap();
        profile.swap_indicators = true;

        let mut rng = StepRng::new(0, 0);
        let frame = sup.tick(at(0), &profile, &mut rng);
        // Front indicator (Test) now lights the rear strip
        assert!(frame.strip(Position::Rear).iter().all(|p| *p != Default::default()));
        assert!(frame.strip(Position::Front).iter().all(|p| *p == Default::default()));
    }

    #[test]
    fn test_set_backend_blanks_indicators() {
        let (mut sup, profile) = setup();
        let mut rng = StepRng::new(0, 0);
        sup.tick(at(0), &profile, &mut rng);
        assert_ne!(sup.frame().rows(DeviceId::FrontPsi), &[0; 8]);
        sup.set_backend(OutputMode::Strip);
        assert_eq!(sup.frame().rows(DeviceId::FrontPsi), &[0; 8]);
        assert_eq!(sup.output_mode(), OutputMode::Strip);
    }

    #[test]
    fn test_profile_reload_applies_brightness() {
        let (mut sup, _) = setup();
        let other = Profile::defaults(ProfileSlot::new(2).unwrap());
        sup.on_profile_loaded(&other);
        assert_eq!(sup.frame().intensity[DeviceId::FrontPsi.index()], 12);
        assert_eq!(sup.state().display(DisplayId::Top).style(), 4);
        assert_eq!(sup.state().display(DisplayId::Bottom).text(), "ALT");
    }
}
