//! Configuration
//!
//! Profiles, global settings and their persisted record format. The
//! [`ConfigStore`] is the single owner of both and the only writer to flash.

pub mod param;
pub mod preset;
pub mod profile;
pub mod record;
pub mod store;
pub mod types;

pub use param::{ParamError, Parameter};
pub use preset::Preset;
pub use profile::{IntegrityError, Profile, BOOT_TEXT_LEN};
pub use record::EncodeError;
pub use store::{ConfigStore, LoadOutcome, StoreError};
pub use types::*;
