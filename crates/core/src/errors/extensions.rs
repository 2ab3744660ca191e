//! Extension traits for error handling

use super::types::{Error, Result};
use std::path::PathBuf;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Re-wrap the error as a configuration error prefixed with `message`
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Same as [`ResultExt::context`] with a lazily built message
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.with_context(|| message.into())
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| match e.into() {
            // Keep fs errors intact so the path survives
            fs @ Error::FileSystem { .. } => fs,
            other => Error::Configuration {
                message: format!("{}: {}", f(), other),
            },
        })
    }
}

/// Attach a path and operation to raw I/O failures
pub trait IoResultExt<T> {
    fn fs_context(self, path: impl Into<PathBuf>, operation: &str) -> Result<T>;
}

impl<T> IoResultExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, path: impl Into<PathBuf>, operation: &str) -> Result<T> {
        self.map_err(|source| Error::file_system(path, operation, source))
    }
}
