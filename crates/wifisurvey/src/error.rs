//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and a distinct exit code per failure class.

use miette::Diagnostic;
use thiserror::Error;

use wifisurvey_config::ConfigError;
use wifisurvey_core::{CoreError, LOCALIZATION_ISSUE_URL, WifiRecord};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const PARSE: i32 = 4;
    pub const CONSISTENCY: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const CANCELLED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(
        code(wifisurvey::settings),
        help(
            "Set the server with --server or in your profile (wifisurvey config init).\n\
             On macOS the sudo password comes from --ask-password, WIFISURVEY_SUDO_PASSWORD\n\
             or the profile's sudo_password_env."
        )
    )]
    Settings { message: String },

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(wifisurvey::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: wifisurvey config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(
        code(wifisurvey::config),
        help("Check the config file, or recreate it with: wifisurvey config init")
    )]
    Config(ConfigError),

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wifisurvey::validation))]
    Validation { field: String, reason: String },

    #[error("'{feature}' is not available on {platform}")]
    #[diagnostic(code(wifisurvey::unsupported))]
    Unsupported { feature: String, platform: String },

    // ── Parsing ──────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(
        code(wifisurvey::not_localized),
        help(
            "Add a dictionary for your display language to the profile's locales_dir,\n\
             or report the netsh output at {url}"
        )
    )]
    NotLocalized { message: String, url: String },

    #[error("{message}")]
    #[diagnostic(code(wifisurvey::parse))]
    Parse { message: String },

    #[error("No saved profile connects to SSID '{ssid}'")]
    #[diagnostic(code(wifisurvey::no_saved_profile))]
    NoSavedProfile { ssid: String },

    // ── Measurement ──────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(
        code(wifisurvey::consistency),
        help(
            "The association moved during the measurement.\n\
             Before: {before}\n\
             After:  {after}\n\
             Stay in place and run the survey again."
        )
    )]
    Consistency {
        message: String,
        before: String,
        after: String,
    },

    #[error("Survey cancelled")]
    #[diagnostic(code(wifisurvey::cancelled))]
    Cancelled,

    #[error("{message}")]
    #[diagnostic(
        code(wifisurvey::timeout),
        help("The Wi-Fi interface did not settle in time. Try again closer to the access point.")
    )]
    Timeout { message: String },

    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to iperf3 server at {address}")]
    #[diagnostic(
        code(wifisurvey::connection_failed),
        help(
            "Check that `iperf3 -s` is running on the server and reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { address: String, reason: String },

    // ── Subprocess / platform ────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(wifisurvey::command_failed))]
    CommandFailed { message: String },

    #[error("Unsupported platform: {os}")]
    #[diagnostic(
        code(wifisurvey::unsupported_platform),
        help("Surveys run on macOS and Windows. `wifisurvey parse` works everywhere.")
    )]
    UnsupportedPlatform { os: String },

    // ── Interactive ──────────────────────────────────────────────────

    #[error("prompt failed: {reason}")]
    #[diagnostic(code(wifisurvey::prompt))]
    Prompt { reason: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render output: {0}")]
    #[diagnostic(code(wifisurvey::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation { .. } | Self::Unsupported { .. } => exit_code::USAGE,
            Self::Settings { .. } | Self::ProfileNotFound { .. } | Self::Config(_) => {
                exit_code::CONFIG
            }
            Self::NotLocalized { .. } | Self::Parse { .. } => exit_code::PARSE,
            Self::Consistency { .. } => exit_code::CONSISTENCY,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Cancelled => exit_code::CANCELLED,
            _ => exit_code::GENERAL,
        }
    }
}

/// One-line summary of an association for error help.
fn describe(record: &WifiRecord) -> String {
    format!(
        "{} ({}) channel {} / {} GHz",
        record.ssid, record.bssid, record.channel, record.band
    )
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::Configuration { message } => Self::Settings { message },

            CoreError::NotLocalized => Self::NotLocalized {
                message,
                url: LOCALIZATION_ISSUE_URL.into(),
            },

            CoreError::LocaleDictionary { .. } => Self::Settings { message },

            CoreError::Parse { .. }
            | CoreError::InvalidBssid { .. }
            | CoreError::MissingProfileName
            | CoreError::MissingSsidName
            | CoreError::NoThroughput
            | CoreError::Json { .. } => Self::Parse { message },

            CoreError::Consistency { before, after } => Self::Consistency {
                message,
                before: describe(&before),
                after: describe(&after),
            },

            CoreError::Unreachable { address, reason } => {
                Self::ConnectionFailed { address, reason }
            }

            CoreError::Timeout { .. } => Self::Timeout { message },

            CoreError::Command { .. } => Self::CommandFailed { message },

            CoreError::UnsupportedPlatform { os } => Self::UnsupportedPlatform { os },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownProfile { name } => Self::ProfileNotFound {
                name,
                available: String::new(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Render(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_failure_class() {
        let cases = [
            (CoreError::NotLocalized, exit_code::PARSE),
            (CoreError::MissingSsidName, exit_code::PARSE),
            (
                CoreError::Configuration {
                    message: "Please set iperf3 server address".into(),
                },
                exit_code::CONFIG,
            ),
            (
                CoreError::Consistency {
                    before: Box::default(),
                    after: Box::default(),
                },
                exit_code::CONSISTENCY,
            ),
            (
                CoreError::Unreachable {
                    address: "10.0.0.2:5201".into(),
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (
                CoreError::Timeout {
                    what: "Wi-Fi reconnect".into(),
                    after: std::time::Duration::from_secs(20),
                },
                exit_code::TIMEOUT,
            ),
        ];
        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
        assert_eq!(CliError::Cancelled.exit_code(), exit_code::CANCELLED);
    }

    #[test]
    fn not_localized_keeps_verbatim_message() {
        let err = CliError::from(CoreError::NotLocalized);
        assert!(err.to_string().starts_with("Could not read Wi-Fi info."));
        assert!(err.to_string().contains(LOCALIZATION_ISSUE_URL));
    }

    #[test]
    fn unknown_profile_is_config_error() {
        let err = CliError::from(ConfigError::UnknownProfile {
            name: "lab".into(),
        });
        assert_eq!(err.exit_code(), exit_code::CONFIG);
        assert_eq!(err.to_string(), "Profile 'lab' not found in configuration");
    }
}
