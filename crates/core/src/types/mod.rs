//! Core domain types for the `appenv` application.
//!
//! - **`entry`**: entries as fetched from the configuration store and as resolved
//! - **`reference`**: parsed pointers into the secret store
//! - **`batch`**: the unit of work for one refresh and its outcome

pub mod batch;
pub mod entry;
pub mod reference;

pub use batch::*;
pub use entry::*;
pub use reference::*;
