//! Conversion implementations for error types
//!
//! I/O and URL failures are never converted implicitly: callers attach a
//! path through [`IoResultExt`](super::IoResultExt) or name the offending
//! setting themselves.

use super::types::Error;

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json {
            message: error.to_string(),
            source: error,
        }
    }
}
