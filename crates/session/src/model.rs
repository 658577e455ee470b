use std::time::Duration;

/// Shortest refresh period the session accepts.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Period used when no configuration is available.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(2);

/// Session configuration, passed in at construction and updated through an
/// explicit apply call — never shared process-wide.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    refresh_interval: Duration,
}

impl SessionConfig {
    /// Build a configuration, flooring the interval at one second.
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            refresh_interval: refresh_interval.max(MIN_REFRESH_INTERVAL),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn set_refresh_interval(&mut self, refresh_interval: Duration) {
        self.refresh_interval = refresh_interval.max(MIN_REFRESH_INTERVAL);
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}
