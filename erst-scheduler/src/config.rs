//! Scheduler configuration
//!
//! Defines the wait defaults and admission limit of a scheduler instance.

use std::time::Duration;

/// Shortest interval `wait` sleeps between job table reads
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Options for a single blocking wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Time between job table reads, never shorter than [`MIN_POLL_INTERVAL`]
    pub poll_interval: Duration,

    /// Give up after this long; `None` or zero waits indefinitely
    pub timeout: Option<Duration>,

    /// When set, the poll interval doubles after each idle tick up to this cap
    pub max_poll_interval: Option<Duration>,
}

impl WaitOptions {
    /// Fixed-interval polling without a deadline
    ///
    /// Intervals below [`MIN_POLL_INTERVAL`] are raised to it.
    pub fn new(poll_interval: Duration) -> Self {
        Self {
            poll_interval: poll_interval.max(MIN_POLL_INTERVAL),
            timeout: None,
            max_poll_interval: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Enables exponential back-off capped at `max_poll_interval`
    pub fn with_backoff(mut self, max_poll_interval: Duration) -> Self {
        self.max_poll_interval = Some(max_poll_interval);
        self
    }

    /// Deadline length, treating zero as "no deadline"
    pub(crate) fn effective_timeout(&self) -> Option<Duration> {
        self.timeout.filter(|timeout| !timeout.is_zero())
    }

    /// Interval before the first re-read; the fields are public, so the
    /// lower bound is applied here as well
    pub(crate) fn first_interval(&self) -> Duration {
        self.poll_interval.max(MIN_POLL_INTERVAL)
    }

    /// Interval to use after an idle tick of length `current`
    pub(crate) fn next_interval(&self, current: Duration) -> Duration {
        let next = match self.max_poll_interval {
            Some(cap) => current.saturating_mul(2).min(cap.max(self.poll_interval)),
            None => current,
        };
        next.max(MIN_POLL_INTERVAL)
    }
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::new(Duration::from_millis(500))
    }
}

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Default poll interval for waits
    pub poll_interval: Duration,

    /// Default wait deadline
    pub wait_timeout: Option<Duration>,

    /// Default back-off cap for waits
    pub max_poll_interval: Option<Duration>,

    /// Maximum number of jobs in flight; `None` means unbounded
    pub max_concurrent_jobs: Option<usize>,
}

impl SchedulerConfig {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - ERST_POLL_INTERVAL_MS (default: 500)
    /// - ERST_WAIT_TIMEOUT_SECS (default: none, 0 also means none)
    /// - ERST_MAX_POLL_INTERVAL_MS (default: none, fixed interval)
    /// - ERST_MAX_CONCURRENT_JOBS (default: unbounded)
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let poll_interval = env_u64("ERST_POLL_INTERVAL_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.poll_interval);

        let wait_timeout = env_u64("ERST_WAIT_TIMEOUT_SECS")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        let max_poll_interval = env_u64("ERST_MAX_POLL_INTERVAL_MS")?.map(Duration::from_millis);

        let max_concurrent_jobs = env_u64("ERST_MAX_CONCURRENT_JOBS")?
            .map(usize::try_from)
            .transpose()?;

        let config = Self {
            poll_interval,
            wait_timeout,
            max_poll_interval,
            max_concurrent_jobs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if let Some(cap) = self.max_poll_interval {
            if cap < self.poll_interval {
                anyhow::bail!("max_poll_interval must not be shorter than poll_interval");
            }
        }

        if self.max_concurrent_jobs == Some(0) {
            anyhow::bail!("max_concurrent_jobs must be greater than 0");
        }

        Ok(())
    }

    /// Wait options derived from these defaults
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            poll_interval: self.poll_interval,
            timeout: self.wait_timeout,
            max_poll_interval: self.max_poll_interval,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            wait_timeout: None,
            max_poll_interval: None,
            max_concurrent_jobs: None,
        }
    }
}

fn env_u64(key: &str) -> anyhow::Result<Option<u64>> {
    match std::env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{} must be a non-negative integer: {}", key, e)),
        Err(_) => Ok(None),
    }
}
