//! Measurement core for Wi-Fi site surveys.
//!
//! This crate turns heterogeneous operating-system command output into one
//! canonical data model and sequences a single end-to-end measurement:
//!
//! - **Domain model** ([`model`]): [`WifiRecord`], [`ThroughputPhaseResult`],
//!   [`SurveyOutcome`] and the progress messages emitted while a survey runs.
//!   Band is always derived from channel; signal percent and dBm are related
//!   through one fixed mapping ([`rssi_to_percentage`] / [`percentage_to_rssi`]).
//!
//! - **[`LocalizationMap`]**: reverse lookup from a localized label (as printed
//!   by `netsh` in the OS display language) to a canonical [`WifiField`].
//!
//! - **Parsers** ([`parse`]): `wdutil info` and `system_profiler` on macOS,
//!   `netsh wlan` on Windows, and the two `iperf3 -J` schema generations.
//!
//! - **Platform adapters** ([`platform`]): [`WifiPlatform`] implementations
//!   that drive the OS tools through a [`CommandRunner`].
//!
//! - **[`Surveyor`]**: preflight, radio restart, interleaved
//!   scans and throughput phases, before/after consistency check, cooperative
//!   cancellation through a [`SurveyContext`].

pub mod config;
pub mod error;
pub mod localization;
pub mod model;
pub mod parse;
pub mod platform;
pub mod poll;
pub mod runner;
pub mod survey;
pub mod throughput;

#[cfg(test)]
mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{PollTimings, SurveySettings};
pub use error::{CoreError, LOCALIZATION_ISSUE_URL};
pub use localization::{LocalizationMap, WifiField};
pub use platform::{MacosWifi, PlatformKind, SystemWifi, WifiPlatform, WindowsWifi};
pub use runner::{CommandOutput, CommandRunner, ShellRunner};
pub use survey::{SurveyContext, Surveyor};

pub use model::{
    Band, Direction, MacAddress, ProgressKind, ProgressUpdate, Protocol, SurveyOutcome,
    SurveyResults, SurveyState, ThroughputPhase, ThroughputPhaseResult, ThroughputResults,
    WifiRecord, percentage_to_rssi, rssi_to_percentage,
};
