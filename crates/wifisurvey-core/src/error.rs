// ── Core error types ──
//
// User-facing errors from wifisurvey-core. Subprocess failures, JSON
// decoding failures and label-lookup misses are translated into
// domain variants here; consumers never match on raw `io::Error`s.
// Cancellation is deliberately absent: it is `SurveyOutcome::Cancelled`.

use std::time::Duration;

use thiserror::Error;

use crate::model::WifiRecord;

/// Where users report output that no locale dictionary recognises.
pub const LOCALIZATION_ISSUE_URL: &str = "https://github.com/hnykda/wifi-heatmapper/issues/26";

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Configuration errors ─────────────────────────────────────────
    /// Invalid survey settings. The message is shown to the user verbatim.
    #[error("{message}")]
    Configuration { message: String },

    // ── Localization errors ──────────────────────────────────────────
    #[error(
        "Could not read Wi-Fi info. Perhaps wifi-heatmapper is not localized for your system. See https://github.com/hnykda/wifi-heatmapper/issues/26 for details."
    )]
    NotLocalized,

    #[error("invalid locale dictionary {source_name}: {reason}")]
    LocaleDictionary { source_name: String, reason: String },

    // ── Parse errors ─────────────────────────────────────────────────
    #[error("failed to parse {what}: {reason}")]
    Parse { what: String, reason: String },

    #[error("Invalid BSSID when parsing netsh output: {bssid}")]
    InvalidBssid { bssid: String },

    #[error("No profile name found")]
    MissingProfileName,

    #[error("Can't find an SSID name in the profile output")]
    MissingSsidName,

    #[error("No bits per second found in iperf results. This is fatal.")]
    NoThroughput,

    #[error("invalid JSON from {what}: {source}")]
    Json {
        what: String,
        #[source]
        source: serde_json::Error,
    },

    // ── Consistency errors ───────────────────────────────────────────
    #[error(
        "Wifi configuration changed between scans! Cancelling instead of giving wrong results."
    )]
    Consistency {
        before: Box<WifiRecord>,
        after: Box<WifiRecord>,
    },

    // ── Process / timing errors ──────────────────────────────────────
    #[error("command `{command}` failed (exit code {status:?}): {stderr}")]
    Command {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("Cannot connect to iperf3 server at {address}: {reason}")]
    Unreachable { address: String, reason: String },

    #[error("timed out after {}ms waiting for {what}", .after.as_millis())]
    Timeout { what: String, after: Duration },

    #[error("Unsupported platform: {os}")]
    UnsupportedPlatform { os: String },
}

impl CoreError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn parse(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            what: what.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn json(what: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            what: what.into(),
            source,
        }
    }

    /// Whether this is a bounded-wait expiry rather than a hard failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_localized_message_is_verbatim() {
        assert_eq!(
            CoreError::NotLocalized.to_string(),
            "Could not read Wi-Fi info. Perhaps wifi-heatmapper is not localized for your system. \
             See https://github.com/hnykda/wifi-heatmapper/issues/26 for details."
        );
    }

    #[test]
    fn profile_errors_are_distinguishable() {
        let no_name = CoreError::MissingProfileName.to_string();
        let no_ssid = CoreError::MissingSsidName.to_string();
        assert_eq!(no_name, "No profile name found");
        assert!(no_ssid.starts_with("Can't find an SSID"));
    }

    #[test]
    fn timeout_reports_milliseconds() {
        let err = CoreError::Timeout {
            what: "interface address".into(),
            after: Duration::from_secs(5),
        };
        assert!(err.is_timeout());
        assert_eq!(
            err.to_string(),
            "timed out after 5000ms waiting for interface address"
        );
    }
}
