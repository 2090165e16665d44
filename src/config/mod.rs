// src/config/mod.rs

//! Service configuration loaded from TOML.
//!
//! - [`model`] holds the raw (deserialised) and validated config types.
//! - [`loader`] reads files and applies defaults.
//! - [`validate`] turns a `RawConfigFile` into a `ConfigFile`.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_or_default};
pub use model::{ConfigFile, ExtractSection, PollSection, RawConfigFile, ServiceSection};
