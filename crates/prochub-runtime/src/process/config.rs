//! Supervisor timing configuration.

use std::time::Duration;

use prochub_core::AppConfig;
use prochub_core::settings::{
    DEFAULT_STABILITY_WINDOW_SECS, DEFAULT_STOP_ALL_TIMEOUT_MS, DEFAULT_STOP_GRACE_PERIOD_MS,
};

/// How long pumps may keep draining after their process exited.
const DEFAULT_PUMP_DRAIN: Duration = Duration::from_secs(2);

/// Timing knobs for the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Time between SIGTERM and SIGKILL.
    pub stop_grace_period: Duration,
    /// Upper bound for `stop_all` as a whole.
    pub stop_all_timeout: Duration,
    /// Continuous uptime after which the restart counter resets.
    pub stability_window: Duration,
    /// Time pumps may keep reading after the child exited.
    pub pump_drain: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            stop_grace_period: Duration::from_millis(DEFAULT_STOP_GRACE_PERIOD_MS),
            stop_all_timeout: Duration::from_millis(DEFAULT_STOP_ALL_TIMEOUT_MS),
            stability_window: Duration::from_secs(DEFAULT_STABILITY_WINDOW_SECS),
            pump_drain: DEFAULT_PUMP_DRAIN,
        }
    }
}

impl SupervisorConfig {
    /// Take the timing values from the application settings.
    #[must_use]
    pub const fn from_app_config(config: &AppConfig) -> Self {
        Self {
            stop_grace_period: config.stop_grace_period(),
            stop_all_timeout: config.stop_all_timeout(),
            stability_window: config.stability_window(),
            pump_drain: DEFAULT_PUMP_DRAIN,
        }
    }

    #[must_use]
    pub const fn with_stop_grace_period(mut self, grace: Duration) -> Self {
        self.stop_grace_period = grace;
        self
    }

    #[must_use]
    pub const fn with_stop_all_timeout(mut self, timeout: Duration) -> Self {
        self.stop_all_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_stability_window(mut self, window: Duration) -> Self {
        self.stability_window = window;
        self
    }

    #[must_use]
    pub const fn with_pump_drain(mut self, drain: Duration) -> Self {
        self.pump_drain = drain;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_app_config() {
        let app = AppConfig {
            stop_grace_period_ms: 250,
            stability_window_secs: 5,
            ..AppConfig::default()
        };
        let config = SupervisorConfig::from_app_config(&app);
        assert_eq!(config.stop_grace_period, Duration::from_millis(250));
        assert_eq!(config.stop_all_timeout, Duration::from_secs(10));
        assert_eq!(config.stability_window, Duration::from_secs(5));
        assert_eq!(config.pump_drain, Duration::from_secs(2));
    }

    #[test]
    fn test_defaults_match_settings() {
        assert_eq!(
            SupervisorConfig::default(),
            SupervisorConfig::from_app_config(&AppConfig::default())
        );
    }
}
