//! Timing policy, clock abstraction and cancellation.
//!
//! Erase and page-read delays are empirically chosen per board, so they are
//! kept as named, overridable values rather than literals.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Default delay before the single erase retry.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 200;

/// Default interval between status polls during erase confirmation.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Default upper bound on erase confirmation.
pub const DEFAULT_ERASE_TIMEOUT_MS: u64 = 9000;

/// Shortest poll interval ever slept between status reads.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Default board-side buffering delay for large page reads.
pub const DEFAULT_PAGE_BUFFER_DELAY_MS: u64 = 20;

/// Page reads longer than this many bytes wait for the buffering delay.
pub const DEFAULT_PAGE_BUFFER_THRESHOLD: usize = 64;

/// Delays and bounds used by the flash programmer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Timing {
    /// Wait before retrying a failed erase command, in milliseconds.
    pub retry_delay_ms: u64,
    /// Interval between status polls, in milliseconds.
    pub poll_interval_ms: u64,
    /// Maximum erase confirmation time, in milliseconds.
    pub erase_timeout_ms: u64,
    /// Wait between "prepare" and "fetch" of a large page read, in milliseconds.
    pub page_buffer_delay_ms: u64,
    /// Page reads longer than this wait for the buffering delay.
    pub page_buffer_threshold: usize,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            erase_timeout_ms: DEFAULT_ERASE_TIMEOUT_MS,
            page_buffer_delay_ms: DEFAULT_PAGE_BUFFER_DELAY_MS,
            page_buffer_threshold: DEFAULT_PAGE_BUFFER_THRESHOLD,
        }
    }
}

impl Timing {
    /// Set the erase retry delay.
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay_ms = as_millis(delay);
        self
    }

    /// Set the status poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = as_millis(interval);
        self
    }

    /// Set the erase confirmation timeout.
    #[must_use]
    pub fn with_erase_timeout(mut self, timeout: Duration) -> Self {
        self.erase_timeout_ms = as_millis(timeout);
        self
    }

    /// Set the page buffering delay.
    #[must_use]
    pub fn with_page_buffer_delay(mut self, delay: Duration) -> Self {
        self.page_buffer_delay_ms = as_millis(delay);
        self
    }

    /// Erase retry delay.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Status poll interval, never shorter than [`MIN_POLL_INTERVAL`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms).max(MIN_POLL_INTERVAL)
    }

    /// Erase confirmation timeout.
    pub fn erase_timeout(&self) -> Duration {
        Duration::from_millis(self.erase_timeout_ms)
    }

    /// Page buffering delay.
    pub fn page_buffer_delay(&self) -> Duration {
        Duration::from_millis(self.page_buffer_delay_ms)
    }

    /// Check that the policy cannot stall the confirmation loop.
    pub fn validate(&self) -> crate::Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(crate::Error::Config(
                "poll_interval_ms must be greater than zero".into(),
            ));
        }
        if self.erase_timeout_ms < self.poll_interval_ms {
            return Err(crate::Error::Config(format!(
                "erase_timeout_ms ({}) is shorter than poll_interval_ms ({})",
                self.erase_timeout_ms, self.poll_interval_ms
            )));
        }
        Ok(())
    }
}

fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Source of monotonic time and blocking waits.
pub trait Clock: Send {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;

    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation backed by `Instant` and `thread::sleep`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Shared flag that aborts long-running waits.
///
/// Clones observe the same flag, so a token handed to another thread (or a
/// Ctrl-C handler) can stop an erase confirmation in progress.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the non-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Clear a previous cancellation request.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_defaults() {
        let timing = Timing::default();
        assert_eq!(timing.retry_delay(), Duration::from_millis(200));
        assert_eq!(timing.poll_interval(), Duration::from_millis(10));
        assert_eq!(timing.erase_timeout(), Duration::from_millis(9000));
        assert_eq!(timing.page_buffer_threshold, 64);
        assert!(timing.validate().is_ok());
    }

    #[test]
    fn test_timing_builder() {
        let timing = Timing::default()
            .with_retry_delay(Duration::from_millis(50))
            .with_poll_interval(Duration::from_millis(5))
            .with_erase_timeout(Duration::from_secs(2))
            .with_page_buffer_delay(Duration::from_millis(7));

        assert_eq!(timing.retry_delay_ms, 50);
        assert_eq!(timing.poll_interval_ms, 5);
        assert_eq!(timing.erase_timeout_ms, 2000);
        assert_eq!(timing.page_buffer_delay_ms, 7);
    }

    #[test]
    fn test_timing_validate_rejects_zero_poll() {
        let timing = Timing::default().with_poll_interval(Duration::ZERO);
        assert!(timing.validate().is_err());
    }

    #[test]
    fn test_zero_poll_interval_is_raised() {
        let timing = Timing::default().with_poll_interval(Duration::ZERO);
        assert_eq!(timing.poll_interval(), MIN_POLL_INTERVAL);
    }

    #[test]
    fn test_timing_validate_rejects_short_timeout() {
        let timing = Timing::default()
            .with_poll_interval(Duration::from_millis(100))
            .with_erase_timeout(Duration::from_millis(10));
        assert!(timing.validate().is_err());
    }

    #[test]
    fn test_cancel_token_shared_between_clones() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!other.is_cancelled());

        token.cancel();
        assert!(other.is_cancelled());

        other.reset();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock::new();
        let before = clock.now();
        clock.sleep(Duration::from_millis(2));
        assert!(clock.now() >= before + Duration::from_millis(2));
    }
}
