//! Error types and result extensions for appenv operations

mod builders;
mod classification;
mod conversions;
mod extensions;
mod types;

pub use classification::{is_transient_status, ErrorKind};
pub use extensions::*;
pub use types::{BackingService, Error, MalformedReason, Result};
