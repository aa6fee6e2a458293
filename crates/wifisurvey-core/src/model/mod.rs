// ── Domain model ──
//
// Canonical types shared by the parsers, the platform adapters and the
// orchestrator. Every parser produces these; nothing downstream sees raw
// OS text.

mod mac;
mod signal;
mod survey;
mod throughput;
mod wifi;

pub use mac::{MacAddress, is_valid_mac, normalize_mac};
pub use signal::{RSSI_CEILING, RSSI_FLOOR, percentage_to_rssi, rssi_to_percentage};
pub use survey::{ProgressKind, ProgressUpdate, SurveyOutcome, SurveyResults, SurveyState};
pub(crate) use survey::{NOT_PERFORMED, format_partial_throughput, format_throughput};
pub use throughput::{
    Direction, Protocol, ThroughputPhase, ThroughputPhaseResult, ThroughputResults,
};
pub use wifi::{Band, FieldValues, WifiRecord};
pub(crate) use wifi::{leading_int, leading_number};
