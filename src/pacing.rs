//! Self-throttling against the remote rate limit.
//!
//! Pacing is a fixed pause after each call of a given kind and is independent
//! of the client's retry backoff. Both go through a [`Sleeper`] so tests can
//! record the waits instead of serving them.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Blocks the current thread for a duration.
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            thread::sleep(duration);
        }
    }
}

/// Fixed-interval pause inserted after every call of one endpoint family.
#[derive(Clone)]
pub struct Pacer {
    interval: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl Pacer {
    pub fn new(interval: Duration, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { interval, sleeper }
    }

    /// A pacer that never waits.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO, Arc::new(ThreadSleeper))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait out one interval.
    pub fn pause(&self) {
        if !self.interval.is_zero() {
            self.sleeper.sleep(self.interval);
        }
    }
}

impl std::fmt::Debug for Pacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacer")
            .field("interval", &self.interval)
            .finish()
    }
}
