// ── Survey outcome and progress ─────────────────────────────────────

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use super::throughput::ThroughputResults;
use super::wifi::WifiRecord;

/// Result of one completed measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResults {
    pub run_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub wifi: WifiRecord,
    /// `None` when the throughput test was not requested.
    pub throughput: Option<ThroughputResults>,
}

/// How a survey run ended, short of an error.
#[derive(Debug, Clone, PartialEq)]
pub enum SurveyOutcome {
    Completed(Box<SurveyResults>),
    /// The user stopped the run. Not a failure.
    Cancelled,
}

impl SurveyOutcome {
    pub fn results(&self) -> Option<&SurveyResults> {
        match self {
            Self::Completed(results) => Some(results),
            Self::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Orchestrator phases, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SurveyState {
    Idle,
    Preflight,
    SeekingSignal,
    Measuring,
    Done,
    Cancelled,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProgressKind {
    Update,
    Done,
}

pub(crate) const NO_VALUE: &str = "-";
pub(crate) const NO_THROUGHPUT: &str = "-/- Mbps";
pub(crate) const NOT_PERFORMED: &str = "Not performed";

/// Status message published after every orchestration sub-step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    #[serde(rename = "type")]
    pub kind: ProgressKind,
    pub header: String,
    /// Running average signal percent, or `-` before the first scan.
    pub strength: String,
    pub tcp: String,
    pub udp: String,
}

impl ProgressUpdate {
    pub fn initial() -> Self {
        Self::with_header("Measurement beginning")
    }

    pub(crate) fn with_header(header: &str) -> Self {
        Self {
            kind: ProgressKind::Update,
            header: header.to_owned(),
            strength: NO_VALUE.to_owned(),
            tcp: NO_THROUGHPUT.to_owned(),
            udp: NO_THROUGHPUT.to_owned(),
        }
    }

    /// Final message for a failed run.
    pub fn error() -> Self {
        Self {
            kind: ProgressKind::Done,
            header: "Error".to_owned(),
            strength: NO_VALUE.to_owned(),
            tcp: NO_THROUGHPUT.to_owned(),
            udp: NO_THROUGHPUT.to_owned(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == ProgressKind::Done && self.header == "Error"
    }

    /// Multi-line status body shown under the header.
    pub fn status_text(&self) -> String {
        if self.is_error() {
            return "Error taking measurements".to_owned();
        }
        let strength = if self.strength == NO_VALUE {
            self.strength.clone()
        } else {
            format!("{}%", self.strength)
        };
        format!(
            "Signal strength: {strength}\nTCP: {}\nUDP: {}",
            self.tcp, self.udp
        )
    }
}

/// `"<down> / <up> Mbps"` with two decimals.
pub(crate) fn format_throughput(down_bps: f64, up_bps: f64) -> String {
    format!(
        "{:.2} / {:.2} Mbps",
        down_bps / 1_000_000.0,
        up_bps / 1_000_000.0
    )
}

/// Download measured, upload still pending: `"<down> / - Mbps"`.
pub(crate) fn format_partial_throughput(down_bps: f64) -> String {
    format!("{:.2} / {NO_VALUE} Mbps", down_bps / 1_000_000.0)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn initial_status_has_placeholders() {
        let update = ProgressUpdate::initial();
        assert_eq!(update.header, "Measurement beginning");
        assert_eq!(
            update.status_text(),
            "Signal strength: -\nTCP: -/- Mbps\nUDP: -/- Mbps"
        );
    }

    #[test]
    fn strength_gets_percent_suffix() {
        let mut update = ProgressUpdate::with_header("Measuring Wi-Fi");
        update.strength = "67".into();
        update.tcp = format_throughput(123_456_789.0, 45_000_000.0);
        update.udp = NOT_PERFORMED.into();
        assert_eq!(
            update.status_text(),
            "Signal strength: 67%\nTCP: 123.46 / 45.00 Mbps\nUDP: Not performed"
        );
    }

    #[test]
    fn pending_upload_shows_placeholder() {
        assert_eq!(format_partial_throughput(98_765_432.0), "98.77 / - Mbps");
    }

    #[test]
    fn error_update_is_terminal() {
        let update = ProgressUpdate::error();
        assert!(update.is_error());
        assert_eq!(update.kind, ProgressKind::Done);
        assert_eq!(update.status_text(), "Error taking measurements");
    }

    #[test]
    fn progress_serializes_kind_as_type() {
        let json = serde_json::to_value(ProgressUpdate::initial()).unwrap_or_default();
        assert_eq!(json["type"], "update");
    }
}
