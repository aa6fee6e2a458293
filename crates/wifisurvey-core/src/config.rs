// ── Runtime survey configuration ──
//
// These types describe *how* to run one measurement. They carry the sudo
// credential and timing knobs, but never touch disk. The CLI builds a
// `SurveySettings` from its profile and hands it in.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::CoreError;

/// Server address meaning "skip the throughput phases".
pub const NO_THROUGHPUT_SERVER: &str = "localhost";

/// Default TCP port of an `iperf3 -s` server.
pub const DEFAULT_IPERF_PORT: u16 = 5201;

/// Intervals and bounds for the fixed-interval waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTimings {
    /// Delay between probe attempts.
    pub interval: Duration,
    /// How long to wait for the interface to lose its address.
    pub radio_off_timeout: Duration,
    /// How long to wait for the interface to get an address back.
    pub radio_on_timeout: Duration,
    /// How long to wait for a non-zero Tx rate after association.
    pub tx_rate_timeout: Duration,
}

impl Default for PollTimings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(200),
            radio_off_timeout: Duration::from_secs(5),
            radio_on_timeout: Duration::from_secs(20),
            tx_rate_timeout: Duration::from_secs(10),
        }
    }
}

/// Settings for a single survey.
///
/// Built by the CLI, passed to `Surveyor` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct SurveySettings {
    /// Throughput server as `host` or `host:port`; `localhost` skips throughput.
    pub server: String,
    /// Seconds per throughput phase.
    pub duration_secs: u32,
    /// Password fed to `sudo -S` (macOS only).
    pub sudo_password: Option<SecretString>,
    /// Wi-Fi interface override; discovered when `None`.
    pub interface: Option<String>,
    pub timings: PollTimings,
    /// Throughput client binary.
    pub iperf_command: String,
}

impl Default for SurveySettings {
    fn default() -> Self {
        Self {
            server: String::new(),
            duration_secs: 10,
            sudo_password: None,
            interface: None,
            timings: PollTimings::default(),
            iperf_command: "iperf3".into(),
        }
    }
}

impl SurveySettings {
    /// Platform-independent preflight checks.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.duration_secs == 0 {
            return Err(CoreError::configuration(
                "Test duration must be greater than zero.",
            ));
        }
        if self.server.trim().is_empty() {
            return Err(CoreError::configuration("Please set iperf3 server address"));
        }
        Ok(())
    }

    pub fn performs_throughput(&self) -> bool {
        self.server.trim() != NO_THROUGHPUT_SERVER
    }

    /// The sudo password, if set and non-empty.
    pub fn sudo_password(&self) -> Option<&str> {
        self.sudo_password
            .as_ref()
            .map(|p| p.expose_secret())
            .filter(|p| !p.is_empty())
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.duration_secs))
    }
}
