//! Core domain types, errors and key transforms for `appenv`.
//!
//! ## Key Components
//!
//! - **`errors`**: the `Error` enum and `Result` alias, with a stable kind code,
//!   backoff hint and retry verdict for every failure.
//! - **`types`**: `StoreEntry`, `ConfigEntry`, `SecretReference`,
//!   `ResolutionBatch` and `ResolutionOutcome`.
//! - **`transform`**: pure functions mapping keys to environment variable names
//!   and parsing secret indirections.
//! - **`constants`**: shared static values such as wire versions and
//!   environment variable names.

pub mod constants;
pub mod errors;
pub mod transform;
pub mod types;

pub use self::{
    constants::*,
    errors::{
        BackingService, Error, ErrorKind, IoResultExt, MalformedReason, Result, ResultExt,
    },
    transform::{decompose_secret_uri, derive_env_name, is_secret_reference, parse_secret_reference},
    types::*,
};
