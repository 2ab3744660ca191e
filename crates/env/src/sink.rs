//! Destinations for resolved name/value pairs

use appenv_core::{Error, Result};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A key-value surface the engine writes into.
///
/// `clear` runs once at the start of every pass; `replace` runs once per
/// successfully resolved key.
pub trait EnvironmentSink: Send + Sync {
    /// Remove everything this sink currently holds
    fn clear(&self);

    /// Set `name` to `value`, overwriting any previous value
    fn replace(&self, name: &str, value: &str) -> Result<()>;
}

/// In-memory sink. Callers hand the snapshot to a child process or print it.
///
/// The current process environment is never touched: resolution runs on a
/// multi-threaded runtime where other threads may read it concurrently.
#[derive(Default)]
pub struct MemorySink {
    values: Mutex<HashMap<String, String>>,
    clears: AtomicUsize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.values.lock().clone()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.values.lock().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }

    /// How many times `clear` was called
    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for MemorySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: BTreeSet<String> = self.values.lock().keys().cloned().collect();
        f.debug_struct("MemorySink")
            .field("names", &names)
            .field("clears", &self.clear_count())
            .finish()
    }
}

/// Names and values must be representable in a process environment
fn validate(name: &str, value: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::environment(name, "variable name is empty"));
    }
    if name.contains('=') || name.contains('\0') {
        return Err(Error::environment(
            name,
            "variable name contains '=' or a NUL byte",
        ));
    }
    if value.contains('\0') {
        return Err(Error::environment(name, "value contains a NUL byte"));
    }
    Ok(())
}

impl EnvironmentSink for MemorySink {
    fn clear(&self) {
        self.values.lock().clear();
        self.clears.fetch_add(1, Ordering::SeqCst);
    }

    fn replace(&self, name: &str, value: &str) -> Result<()> {
        validate(name, value)?;
        self.values
            .lock()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }
}
