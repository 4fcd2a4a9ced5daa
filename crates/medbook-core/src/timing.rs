//! Debounce and throttle helpers.
//!
//! Time is passed in explicitly so callers drive these from their own event
//! loop and tests need no clock.

use std::time::{Duration, Instant};

/// Delays a value until no newer value arrived for `delay`.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Schedule `value`, replacing whatever was pending.
    pub fn call(&mut self, now: Instant, value: T) {
        self.pending = Some((now + self.delay, value));
    }

    /// Take the pending value once its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.pending.take().map(|(_, value)| value),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending value, e.g. on teardown.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Lets at most one call through per `limit` window.
#[derive(Debug)]
pub struct Throttle {
    limit: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(limit: Duration) -> Self {
        Self { limit, last: None }
    }

    /// Whether a call at `now` may run. Accepted calls open a new window.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        let open = self
            .last
            .is_none_or(|last| now.saturating_duration_since(last) >= self.limit);
        if open {
            self.last = Some(now);
        }
        open
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
