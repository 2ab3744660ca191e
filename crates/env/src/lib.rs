//! Resolution engine and environment sinks for appenv
//!
//! [`ResolutionEngine`] turns a [`ResolutionBatch`](appenv_core::ResolutionBatch)
//! into environment variables: it fetches each key from the configuration
//! store, follows secret references into the secret store, and writes the
//! results to an [`EnvironmentSink`].

pub mod engine;
pub mod sink;

pub use engine::ResolutionEngine;
pub use sink::{EnvironmentSink, MemorySink};
