//! Single-flight execution guard
//!
//! At most one guarded operation runs at a time. A second caller arriving
//! while one is in flight is turned away immediately with
//! [`GuardOutcome::Skipped`]; it is never queued.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

/// Result of [`SingleFlight::run_guarded`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum GuardOutcome<T> {
    /// The operation ran and produced a value
    Executed(T),
    /// Another operation was in flight; nothing ran
    Skipped,
}

impl<T> GuardOutcome<T> {
    pub fn is_executed(&self) -> bool {
        matches!(self, GuardOutcome::Executed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, GuardOutcome::Skipped)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            GuardOutcome::Executed(value) => Some(value),
            GuardOutcome::Skipped => None,
        }
    }
}

/// Two-state guard: `Idle` or `InFlight`
#[derive(Debug, Default)]
pub struct SingleFlight {
    in_flight: AtomicBool,
}

impl SingleFlight {
    pub const fn new() -> Self {
        Self {
            in_flight: AtomicBool::new(false),
        }
    }

    /// Move from `Idle` to `InFlight`. Returns false if already in flight.
    pub fn try_enter(&self) -> bool {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Return to `Idle`. A no-op when already idle.
    pub fn leave(&self) {
        self.in_flight.store(false, Ordering::Release);
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Enter the guard and get a permit that leaves on drop
    pub fn try_acquire(&self) -> Option<FlightPermit<'_>> {
        self.try_enter().then_some(FlightPermit { guard: self })
    }

    /// Run `operation` unless another guarded run is in flight.
    ///
    /// The guard is released exactly once after the operation settles,
    /// including when it panics or the returned future is dropped early.
    /// Errors carried in `T` reach the caller untouched.
    pub async fn run_guarded<F, Fut, T>(&self, operation: F) -> GuardOutcome<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let Some(_permit) = self.try_acquire() else {
            tracing::debug!("guarded operation already in flight, skipping");
            return GuardOutcome::Skipped;
        };
        GuardOutcome::Executed(operation().await)
    }
}

/// Held while a guarded operation runs
#[derive(Debug)]
pub struct FlightPermit<'a> {
    guard: &'a SingleFlight,
}

impl Drop for FlightPermit<'_> {
    fn drop(&mut self) {
        self.guard.leave();
    }
}
