use rand::Rng;
use std::time::Duration;

/// Tuning knobs for the lock acquisition retry loop.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Fixed part of the pause after a failed lock attempt.
    pub backoff_base: Duration,
    /// Upper bound of the random part added on top of `backoff_base`.
    pub backoff_jitter: Duration,
    /// Give up with `LockTimeout` after this many failed attempts.
    /// `None` retries until both locks are held.
    pub max_lock_attempts: Option<u32>,
    /// Upper bound on a single notification delivery.
    pub notify_timeout: Duration,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            backoff_base: Duration::from_millis(1000),
            backoff_jitter: Duration::from_millis(1000),
            max_lock_attempts: None,
            notify_timeout: Duration::from_secs(5),
        }
    }
}

impl TransferConfig {
    pub fn with_backoff(mut self, base: Duration, jitter: Duration) -> Self {
        self.backoff_base = base;
        self.backoff_jitter = jitter;
        self
    }

    pub fn with_max_lock_attempts(mut self, attempts: u32) -> Self {
        self.max_lock_attempts = Some(attempts);
        self
    }

    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    /// Picks the next pause: `backoff_base` plus a uniform jitter in
    /// `[0, backoff_jitter]`.
    pub fn backoff_delay(&self) -> Duration {
        let jitter_ms = self.backoff_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..=jitter_ms)
        };
        self.backoff_base + Duration::from_millis(jitter)
    }
}
