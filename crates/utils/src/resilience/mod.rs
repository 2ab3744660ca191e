//! Retry with exponential backoff for calls to the backing stores.
//!
//! ```rust,no_run
//! use appenv_utils::resilience::{retry, RetryConfig};
//!
//! # async fn example() -> Result<String, appenv_core::Error> {
//! let config = RetryConfig::default();
//! retry(&config, || async {
//!     // Your operation here
//!     Ok("success".to_string())
//! })
//! .await
//! # }
//! ```

pub mod config;
pub mod retry;

pub use config::RetryConfig;
pub use retry::{retry, suggest_recovery};
