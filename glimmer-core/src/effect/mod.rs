//! Timed whole-system effects.
//!
//! While an effect runs it owns every display and indicator. Per-unit modes
//! are kept untouched underneath and resume when the effect ends.

mod alarm;
mod failure;
mod leia;
mod march;

use embassy_time::{Duration, Instant};
use rand::RngCore;

use crate::config::profile::{EFFECT_ALARM, EFFECT_FAILURE, EFFECT_LEIA, EFFECT_MARCH};
use crate::config::Profile;
use crate::frame::Frame;
use crate::indicator::palette::color;
use crate::indicator::{BackendSlot, Indicator, IndicatorBackend, IndicatorId, PsiImage};
use crate::render::{map_grid, DisplayId, Grid};
use crate::timing::millis;

pub use failure::FAILURE_PHASES;

/// Effect selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EffectKind {
    Alarm,
    March,
    Leia,
    Failure,
}

impl EffectKind {
    /// Index into `Profile::effects`
    pub const fn timing_index(self) -> usize {
        match self {
            EffectKind::Alarm => EFFECT_ALARM,
            EffectKind::March => EFFECT_MARCH,
            EffectKind::Leia => EFFECT_LEIA,
            EffectKind::Failure => EFFECT_FAILURE,
        }
    }
}

/// A running effect and its phase clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActiveEffect {
    pub kind: EffectKind,
    pub entered_at: Instant,
    pub last_toggle: Option<Instant>,
    pub phase: u16,
}

impl ActiveEffect {
    pub const fn new(kind: EffectKind, now: Instant) -> Self {
        Self {
            kind,
            entered_at: now,
            last_toggle: None,
            phase: 0,
        }
    }

    /// Move to the next phase once `interval` has passed.
    ///
    /// The first call starts phase 0 and returns true.
    fn advance(&mut self, now: Instant, interval: Duration) -> bool {
        match self.last_toggle {
            None => {
                self.last_toggle = Some(now);
                true
            }
            Some(last) if now.saturating_duration_since(last) >= interval => {
                self.last_toggle = Some(now);
                self.phase = self.phase.saturating_add(1);
                true
            }
            Some(_) => false,
        }
    }

    fn expired(&self, now: Instant, duration_ms: u32) -> bool {
        duration_ms != 0
            && now.saturating_duration_since(self.entered_at)
                >= Duration::from_millis(u64::from(duration_ms))
    }
}

/// What the runner did this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EffectTick {
    /// No effect; per-unit rendering should run
    Idle,
    /// The effect rendered the frame
    Rendered,
    /// The effect ended this tick without rendering
    Expired(EffectKind),
}

/// Everything an effect draws with
pub struct Scene<'a, R: RngCore + ?Sized> {
    pub profile: &'a Profile,
    pub backend: &'a BackendSlot,
    pub rng: &'a mut R,
    pub frame: &'a mut Frame,
}

impl<R: RngCore + ?Sized> Scene<'_, R> {
    /// Same grid on every display, each masked to its width
    fn all_displays(&mut self, grid: impl Fn(DisplayId) -> Grid) {
        for id in DisplayId::ALL {
            map_grid(id, &grid(id), &mut *self.frame);
        }
    }

    /// Draw an indicator image with two palette colors
    fn indicator(&mut self, id: IndicatorId, image: &PsiImage, colors: [u8; 2]) {
        draw_indicator(
            self.backend,
            id,
            image,
            colors,
            self.profile.swap_indicators,
            &mut *self.rng,
            &mut *self.frame,
        );
    }
}

/// Render one indicator to its physical position
pub fn draw_indicator<R: RngCore + ?Sized>(
    backend: &BackendSlot,
    id: IndicatorId,
    image: &PsiImage,
    colors: [u8; 2],
    swapped: bool,
    rng: &mut R,
    frame: &mut Frame,
) {
    backend.render(
        image,
        [color(colors[0]), color(colors[1])],
        rng,
        frame,
        id.position(swapped),
    );
}

/// Holds at most one active effect
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectRunner {
    active: Option<ActiveEffect>,
}

impl EffectRunner {
    pub const fn new() -> Self {
        Self { active: None }
    }

    pub fn start(&mut self, kind: EffectKind, now: Instant) {
        self.active = Some(ActiveEffect::new(kind, now));
    }

    pub fn stop(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&ActiveEffect> {
        self.active.as_ref()
    }

    pub fn kind(&self) -> Option<EffectKind> {
        self.active.map(|e| e.kind)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Run the active effect for one tick.
    ///
    /// Expiry is checked before anything is drawn, so an effect whose
    /// duration has already passed ends without rendering.
    pub fn tick<R: RngCore + ?Sized>(
        &mut self,
        now: Instant,
        indicators: &mut [Indicator; 2],
        scene: &mut Scene<'_, R>,
    ) -> EffectTick {
        let Some(effect) = self.active.as_mut() else {
            return EffectTick::Idle;
        };

        let timing = scene.profile.effects[effect.kind.timing_index()];
        if effect.expired(now, timing.duration_ms) {
            let kind = effect.kind;
            self.active = None;
            return EffectTick::Expired(kind);
        }

        let speed = millis(timing.speed_ms);
        let running = match effect.kind {
            EffectKind::Alarm => {
                effect.advance(now, speed);
                alarm::render(effect.phase, scene);
                true
            }
            EffectKind::March => {
                effect.advance(now, speed);
                march::render(effect.phase, scene);
                true
            }
            EffectKind::Leia => {
                effect.advance(now, speed);
                leia::render(effect.phase, now, indicators, scene);
                true
            }
            EffectKind::Failure => failure::tick(effect, now, speed, scene),
        };

        if running {
            EffectTick::Rendered
        } else {
            let kind = effect.kind;
            self.active = None;
            EffectTick::Expired(kind)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Parameter, ProfileSlot};
    use crate::frame::{DeviceId, Position};
    use crate::indicator::RowFill;
    use crate::render::{full_grid, unmap_grid};
    use rand::rngs::mock::StepRng;

    fn indicators() -> [Indicator; 2] {
        [
            Indicator::new(IndicatorId::Front),
            Indicator::new(IndicatorId::Rear),
        ]
    }

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn run(
        runner: &mut EffectRunner,
        now: Instant,
        profile: &Profile,
        frame: &mut Frame,
    ) -> EffectTick {
        let backend = BackendSlot::from_mode(crate::config::OutputMode::Matrix);
        let mut rng = StepRng::new(0, 0);
        let mut inds = indicators();
        let mut scene = Scene {
            profile,
            backend: &backend,
            rng: &mut rng,
            frame,
        };
        runner.tick(now, &mut inds, &mut scene)
    }

    #[test]
    fn test_idle_without_effect() {
        let profile = Profile::defaults(ProfileSlot::FACTORY);
        let mut frame = Frame::new();
        let mut runner = EffectRunner::new();
        assert_eq!(run(&mut runner, at(0), &profile, &mut frame), EffectTick::Idle);
    }

    #[test]
    fn test_elapsed_duration_ends_without_rendering() {
        let profile = Profile::defaults(ProfileSlot::FACTORY);
        let mut frame = Frame::new();
        let mut runner = EffectRunner::new();
        runner.start(EffectKind::Alarm, at(0));

        // Alarm runs 4 s by default
        assert_eq!(
            run(&mut runner, at(4_000), &profile, &mut frame),
            EffectTick::Expired(EffectKind::Alarm)
        );
        assert!(!runner.is_active());
        assert_eq!(frame, Frame::new());
    }

    #[test]
    fn test_zero_duration_is_unbounded() {
        let mut profile = Profile::defaults(ProfileSlot::FACTORY);
        profile.set(Parameter::MarchDuration, 0).unwrap();
        let mut frame = Frame::new();
        let mut runner = EffectRunner::new();
        runner.start(EffectKind::March, at(0));
        assert_eq!(
            run(&mut runner, at(10_000_000), &profile, &mut frame),
            EffectTick::Rendered
        );
    }

    #[test]
    fn test_alarm_toggles_on_speed() {
        let profile = Profile::defaults(ProfileSlot::FACTORY);
        let mut frame = Frame::new();
        let mut runner = EffectRunner::new();
        runner.start(EffectKind::Alarm, at(0));

        run(&mut runner, at(0), &profile, &mut frame);
        for id in DisplayId::ALL {
            assert_eq!(unmap_grid(id, &frame), full_grid(id));
        }
        // Front indicator full color 1 on the two-color board
        assert_eq!(frame.rows(DeviceId::FrontPsi)[0], 0x55);

        run(&mut runner, at(99), &profile, &mut frame);
        assert_eq!(runner.active().map(|e| e.phase), Some(0));

        run(&mut runner, at(100), &profile, &mut frame);
        assert_eq!(runner.active().map(|e| e.phase), Some(1));
        for id in DisplayId::ALL {
            assert_eq!(unmap_grid(id, &frame), [0; 5]);
        }
        assert_eq!(frame.rows(DeviceId::RearPsi)[0], 0xAA);
    }

    #[test]
    fn test_failure_runs_five_stages() {
        let mut profile = Profile::defaults(ProfileSlot::FACTORY);
        profile.set(Parameter::FailureDuration, 0).unwrap();
        profile.set(Parameter::FailureSpeed, 10).unwrap();
        let mut frame = Frame::new();
        let mut runner = EffectRunner::new();
        runner.start(EffectKind::Failure, at(0));

        // 6 refreshes per stage at 10, 20, 40, 80 and 160 ms
        for ms in (0..1860).step_by(10) {
            assert_eq!(
                run(&mut runner, at(ms), &profile, &mut frame),
                EffectTick::Rendered
            );
        }
        assert_eq!(runner.active().map(|e| e.phase), Some(FAILURE_PHASES - 1));
        assert_eq!(
            run(&mut runner, at(1860), &profile, &mut frame),
            EffectTick::Expired(EffectKind::Failure)
        );
    }

    #[test]
    fn test_draw_indicator_honours_swap() {
        let backend = BackendSlot::from_mode(crate::config::OutputMode::Strip);
        let mut frame = Frame::new();
        let mut rng = StepRng::new(0, 0);
        draw_indicator(
            &backend,
            IndicatorId::Front,
            &PsiImage::filled(RowFill::Full),
            [9, 9],
            true,
            &mut rng,
            &mut frame,
        );
        assert_eq!(frame.strip(Position::Rear)[0], color(9));
        assert_eq!(frame.strip(Position::Front)[0], Default::default());
    }
}
