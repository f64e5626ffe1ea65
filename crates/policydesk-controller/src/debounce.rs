//! Trailing-edge debounce driven by an external clock.
//!
//! The debouncer never sleeps. The owner feeds it trigger times and
//! polls it; a burst of triggers collapses into one value, released
//! once the quiet period has passed since the last trigger.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::clock::to_delta;

#[derive(Debug)]
pub struct Debouncer<T> {
    quiet: TimeDelta,
    pending: Option<Pending<T>>,
}

#[derive(Debug)]
struct Pending<T> {
    value: T,
    deadline: DateTime<Utc>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet: to_delta(quiet),
            pending: None,
        }
    }

    /// Start or restart the quiet period with `value`. Any earlier
    /// pending value is dropped.
    pub fn trigger(&mut self, value: T, now: DateTime<Utc>) {
        self.pending = Some(Pending {
            value,
            deadline: now + self.quiet,
        });
    }

    /// Drop the pending value, if any.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    /// Release the pending value once its deadline has been reached.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<T> {
        if self.pending.as_ref().is_some_and(|p| p.deadline <= now) {
            self.pending.take().map(|p| p.value)
        } else {
            None
        }
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
