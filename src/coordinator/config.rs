//! Coordinator configuration

use std::time::Duration;

/// Default window during which a new play request is dropped
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Default pause between a settled attempt and the next commit
pub const DEFAULT_SETTLE_GRACE: Duration = Duration::from_millis(100);

/// Default bound on a single `play()` call
pub const DEFAULT_PLAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Coordinator configuration options
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Requests arriving sooner than this after the previous one are dropped
    pub debounce: Duration,

    /// Wait after a previous in-flight attempt settles, before committing
    pub settle_grace: Duration,

    /// Upper bound on the media engine's start call (None = wait forever)
    pub play_timeout: Option<Duration>,

    /// Retry muted when unmuted playback is refused by the autoplay policy
    pub muted_retry: bool,

    /// Capacity of the playback event channel
    pub event_capacity: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            settle_grace: DEFAULT_SETTLE_GRACE,
            play_timeout: Some(DEFAULT_PLAY_TIMEOUT),
            muted_retry: true,
            event_capacity: 64,
        }
    }
}

impl CoordinatorConfig {
    /// Set the debounce window
    pub fn debounce(mut self, window: Duration) -> Self {
        self.debounce = window;
        self
    }

    /// Set the grace period after a previous attempt settles
    pub fn settle_grace(mut self, grace: Duration) -> Self {
        self.settle_grace = grace;
        self
    }

    /// Set the start timeout
    pub fn play_timeout(mut self, timeout: Duration) -> Self {
        self.play_timeout = Some(timeout);
        self
    }

    /// Wait for the media engine without a bound
    pub fn without_play_timeout(mut self) -> Self {
        self.play_timeout = None;
        self
    }

    /// Disable the muted retry on autoplay refusal
    pub fn disable_muted_retry(mut self) -> Self {
        self.muted_retry = false;
        self
    }

    /// Set the event channel capacity
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }
}
