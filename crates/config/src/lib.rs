//! Settings for appenv
//!
//! The settings file names the configuration store endpoint, the label and
//! the keys to resolve. Environment variables override file values, and
//! access tokens come from the environment only.

pub mod loader;
pub mod settings;

pub use loader::{split_keys, SettingsLoader};
pub use settings::{RetrySettings, Settings};
