//! Shared utilities for appenv
//!
//! Concurrency control, retry policy and logging setup used across the
//! workspace.

pub mod atomic_file;
pub mod resilience;
pub mod single_flight;
pub mod tracing;

pub use atomic_file::{write_atomic, write_atomic_string};
pub use resilience::{retry, suggest_recovery, RetryConfig};
pub use single_flight::{FlightPermit, GuardOutcome, SingleFlight};
