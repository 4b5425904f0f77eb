//! Statistics for the playback coordinator

use std::time::Duration;

/// Coordinator-wide request statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    /// Play requests received
    pub requests: u64,
    /// Play requests dropped by the debounce window
    pub debounced: u64,
    /// Play requests for the element already current
    pub already_current: u64,
    /// Elements stopped because another one took over
    pub preemptions: u64,
    /// Muted retries after an autoplay refusal
    pub muted_retries: u64,
    /// Attempts that ended with nothing current
    pub failures: u64,
    /// Requests abandoned or overtaken by newer ones
    pub superseded: u64,
    /// Elements stopped by an explicit pause
    pub pauses: u64,
    /// Committed requests dropped before their start settled
    pub cancelled: u64,
    /// Successful starts
    pub started: u64,
    /// Total time spent inside successful `play()` calls
    pub start_latency_total: Duration,
}

impl CoordinatorStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful start and how long the engine took
    pub fn record_start(&mut self, latency: Duration) {
        self.started += 1;
        self.start_latency_total += latency;
    }

    /// Average engine start latency
    pub fn average_start_latency(&self) -> Duration {
        match u32::try_from(self.started) {
            Ok(0) => Duration::ZERO,
            Ok(started) => self.start_latency_total / started,
            Err(_) => Duration::ZERO,
        }
    }

    /// Share of requests dropped by the debounce window
    pub fn debounce_ratio(&self) -> f64 {
        if self.requests > 0 {
            self.debounced as f64 / self.requests as f64
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CoordinatorStats::new();
        assert_eq!(stats.requests, 0);
        assert_eq!(stats.debounced, 0);
        assert_eq!(stats.started, 0);
        assert_eq!(stats.cancelled, 0);
        assert_eq!(stats.average_start_latency(), Duration::ZERO);
        assert_eq!(stats.debounce_ratio(), 0.0);
    }

    #[test]
    fn test_average_start_latency() {
        let mut stats = CoordinatorStats::new();
        stats.record_start(Duration::from_millis(100));
        stats.record_start(Duration::from_millis(300));

        assert_eq!(stats.started, 2);
        assert_eq!(stats.average_start_latency(), Duration::from_millis(200));
    }

    #[test]
    fn test_debounce_ratio() {
        let stats = CoordinatorStats {
            requests: 8,
            debounced: 6,
            ..Default::default()
        };

        assert_eq!(stats.debounce_ratio(), 0.75);
    }
}
