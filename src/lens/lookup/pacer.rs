//! Randomized delay issued before every remote request

use std::time::Duration;

use rand::Rng;
use tracing::trace;

/// Lower bound of the default pacing window in milliseconds
pub const DEFAULT_PACING_MIN_MS: u64 = 1000;
/// Upper bound of the default pacing window in milliseconds
pub const DEFAULT_PACING_MAX_MS: u64 = 3000;

/// Sleeps for a uniformly random interval before each request.
///
/// The public services queried by the lenses enforce per-client rate limits; pacing
/// keeps a sequence lookup well below them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    min_ms: u64,
    max_ms: u64,
}

impl Pacer {
    /// Create a pacer drawing delays from `[min_ms, max_ms]`
    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        if min_ms > max_ms {
            Self {
                min_ms: max_ms,
                max_ms: min_ms,
            }
        } else {
            Self { min_ms, max_ms }
        }
    }

    /// A pacer that never sleeps
    pub fn disabled() -> Self {
        Self {
            min_ms: 0,
            max_ms: 0,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.max_ms == 0
    }

    /// Draw the next delay
    pub fn next_delay(&self) -> Duration {
        if self.is_disabled() {
            return Duration::ZERO;
        }
        let ms = rand::rng().random_range(self.min_ms..=self.max_ms);
        Duration::from_millis(ms)
    }

    /// Block the current thread for the next delay
    pub fn pause(&self) {
        let delay = self.next_delay();
        if !delay.is_zero() {
            trace!("pacing for {} ms", delay.as_millis());
            std::thread::sleep(delay);
        }
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::from_millis(DEFAULT_PACING_MIN_MS, DEFAULT_PACING_MAX_MS)
    }
}
