//! Configuration and secret store clients for appenv
//!
//! The engine talks to its backing services through the [`ConfigStore`] and
//! [`SecretStore`] traits. This crate provides HTTP implementations of both,
//! plus in-memory versions for tests.

pub mod app_config;
pub mod auth;
mod http;
pub mod key_vault;
pub mod memory;
pub mod traits;

pub use app_config::AppConfigClient;
pub use auth::{StaticTokenProvider, TokenProvider};
pub use key_vault::{KeyVaultClient, VaultConnection};
pub use memory::{FailureKind, MemoryConfigStore, MemorySecretStore};
pub use traits::{ConfigStore, SecretStore};
