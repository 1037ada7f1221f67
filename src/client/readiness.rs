// ABOUTME: Start-up readiness polling for a freshly opened modem
// ABOUTME: Sends bare AT commands at a fixed interval until OK or the attempt budget runs out

use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the readiness poll
///
/// Modems often swallow the first commands after the port opens (power-up,
/// autobaud, buffered garbage). The session therefore sends a bare `AT`
/// until it sees `OK`, sleeping `interval` between attempts.
///
/// # Example
///
/// ```rust
/// use sms_modem::client::ReadinessConfig;
/// use std::time::Duration;
///
/// // Default configuration (5 attempts, 1s apart)
/// let config = ReadinessConfig::default();
/// assert_eq!(config.max_attempts, 5);
///
/// // Custom configuration
/// let config = ReadinessConfig::new(Duration::from_millis(200))
///     .with_max_attempts(10);
///
/// // Skip polling entirely
/// let config = ReadinessConfig::disabled();
/// assert!(!config.enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessConfig {
    /// Pause between two attempts (default: 1 second)
    pub interval: Duration,

    /// Attempts before giving up (default: 5)
    pub max_attempts: u32,

    /// Whether to poll at all (default: true)
    ///
    /// When false the modem is assumed ready as soon as the port opens.
    pub enabled: bool,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 5,
            enabled: true,
        }
    }
}

impl ReadinessConfig {
    /// Create a readiness configuration with a custom interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Set the number of attempts
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Create a configuration that skips polling
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }
}

/// Tracks one readiness poll
///
/// 1. Caller checks `should_attempt()`
/// 2. Sends `AT`, then reports `on_ready()` or `on_failure()`
/// 3. Sleeps `interval()` and repeats while `should_attempt()` holds
#[derive(Debug)]
pub struct ReadinessPoll {
    config: ReadinessConfig,
    attempts: u32,
    ready: bool,
}

impl ReadinessPoll {
    pub fn new(config: ReadinessConfig) -> Self {
        Self {
            config,
            attempts: 0,
            ready: false,
        }
    }

    /// True while the modem is not ready and attempts remain
    pub fn should_attempt(&self) -> bool {
        self.config.enabled && !self.ready && self.attempts < self.config.max_attempts
    }

    pub fn on_ready(&mut self) {
        self.attempts += 1;
        self.ready = true;
        debug!("Modem ready after {} attempt(s)", self.attempts);
    }

    pub fn on_failure(&mut self) {
        self.attempts += 1;
        warn!(
            "Modem not ready (attempt {}/{})",
            self.attempts, self.config.max_attempts
        );
    }

    /// A disabled poll counts as ready
    pub fn is_ready(&self) -> bool {
        self.ready || !self.config.enabled
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }
}
