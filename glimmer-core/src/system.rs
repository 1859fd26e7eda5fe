//! System aggregate.
//!
//! [`System`] owns the supervisor and the configuration store. Every
//! mutation goes through `&mut self`, so commands, menu actions and the
//! render tick can never interleave within one tick.

use embassy_time::Instant;
use glimmer_hal::FlashStorage;
use glimmer_protocol::{decode, Command, DecodeError};
use rand::RngCore;

use crate::config::{
    ConfigStore, LoadOutcome, OutputMode, ParamError, Parameter, Preset, Profile, ProfileSlot,
    StoreError,
};
use crate::frame::Frame;
use crate::supervisor::{Applied, CommandError, Supervisor};

/// Failure handling one serial line
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    Decode(DecodeError),
    Command(CommandError),
}

impl From<DecodeError> for LineError {
    fn from(e: DecodeError) -> Self {
        LineError::Decode(e)
    }
}

impl From<CommandError> for LineError {
    fn from(e: CommandError) -> Self {
        LineError::Command(e)
    }
}

impl core::fmt::Display for LineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LineError::Decode(e) => write!(f, "{}", e),
            LineError::Command(e) => write!(f, "{}", e),
        }
    }
}

/// Failure applying a setting through the mutation façade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingError {
    Param(ParamError),
    Store(StoreError),
}

impl From<ParamError> for SettingError {
    fn from(e: ParamError) -> Self {
        SettingError::Param(e)
    }
}

impl From<StoreError> for SettingError {
    fn from(e: StoreError) -> Self {
        SettingError::Store(e)
    }
}

impl core::fmt::Display for SettingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SettingError::Param(e) => write!(f, "{}", e),
            SettingError::Store(e) => write!(f, "{}", e),
        }
    }
}

pub struct System<S: FlashStorage> {
    supervisor: Supervisor,
    store: ConfigStore<S>,
}

impl<S: FlashStorage> System<S> {
    /// Build around a store, using whatever profile it currently holds
    pub fn new(store: ConfigStore<S>) -> Self {
        let supervisor = Supervisor::new(store.profile(), store.global().output_mode);
        Self { supervisor, store }
    }

    /// Read persisted settings and apply the last active profile
    pub async fn open(&mut self) -> Result<LoadOutcome, StoreError> {
        let outcome = self.store.open().await?;
        self.supervisor.set_backend(self.store.global().output_mode);
        self.supervisor.on_profile_loaded(self.store.profile());
        Ok(outcome)
    }

    pub fn supervisor(&self) -> &Supervisor {
        &self.supervisor
    }

    pub fn profile(&self) -> &Profile {
        self.store.profile()
    }

    pub fn active_slot(&self) -> ProfileSlot {
        self.store.active_slot()
    }

    pub fn output_mode(&self) -> OutputMode {
        self.store.global().output_mode
    }

    /// Decode and apply one protocol line
    pub fn handle_line(&mut self, line: &[u8], now: Instant) -> Result<Applied, LineError> {
        let command = decode(line)?;
        Ok(self.apply_command(&command, now)?)
    }

    pub fn apply_command(&mut self, command: &Command, now: Instant) -> Result<Applied, CommandError> {
        self.supervisor.apply(command, self.store.profile_mut(), now)
    }

    pub async fn load_profile(&mut self, slot: ProfileSlot) -> Result<LoadOutcome, StoreError> {
        let outcome = self.store.load(slot).await?;
        self.supervisor.on_profile_loaded(self.store.profile());
        Ok(outcome)
    }

    pub async fn save_profile(&mut self) -> Result<(), StoreError> {
        self.store.save().await
    }

    pub async fn reset_profile(&mut self, slot: ProfileSlot) -> Result<(), StoreError> {
        self.store.reset(slot).await?;
        if slot == self.store.active_slot() {
            self.supervisor.on_profile_loaded(self.store.profile());
        }
        Ok(())
    }

    pub async fn set_output_mode(&mut self, mode: OutputMode) -> Result<(), StoreError> {
        self.store.set_output_mode(mode).await?;
        self.supervisor.set_backend(mode);
        Ok(())
    }

    /// Apply a preset to the active profile and persist its output mode.
    ///
    /// Nothing changes unless the output mode is stored first. The profile
    /// change is in memory only until `save_profile`, and displayed text is
    /// kept.
    pub async fn apply_preset(&mut self, preset: Preset) -> Result<(), SettingError> {
        let mut staged = self.store.profile().clone();
        let mode = staged.apply_preset(preset)?;
        self.set_output_mode(mode).await?;
        *self.store.profile_mut() = staged;
        self.supervisor.on_settings_changed(self.store.profile());
        Ok(())
    }

    /// Set one profile field by name (in memory)
    pub fn set_parameter(&mut self, param: Parameter, value: u32) -> Result<(), ParamError> {
        self.store.profile_mut().set(param, value)?;
        self.supervisor.on_parameter_changed(param, self.store.profile());
        Ok(())
    }

    pub async fn factory_reset(&mut self) -> Result<LoadOutcome, StoreError> {
        let outcome = self.store.factory_reset().await?;
        self.supervisor.set_backend(self.store.global().output_mode);
        self.supervisor.on_profile_loaded(self.store.profile());
        Ok(outcome)
    }

    /// Render one frame
    pub fn tick<R: RngCore + ?Sized>(&mut self, now: Instant, rng: &mut R) -> &Frame {
        self.supervisor.tick(now, self.store.profile(), rng)
    }
}
