// ── Throughput results ──────────────────────────────────────────────

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Protocol {
    Tcp,
    Udp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Download,
    Upload,
}

/// One protocol/direction combination of a throughput run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThroughputPhase {
    pub protocol: Protocol,
    pub direction: Direction,
}

impl ThroughputPhase {
    /// The four phases in the order a survey runs them.
    pub const ALL: [Self; 4] = [
        Self::new(Protocol::Tcp, Direction::Download),
        Self::new(Protocol::Tcp, Direction::Upload),
        Self::new(Protocol::Udp, Direction::Download),
        Self::new(Protocol::Udp, Direction::Upload),
    ];

    pub const fn new(protocol: Protocol, direction: Direction) -> Self {
        Self {
            protocol,
            direction,
        }
    }

    pub fn is_udp(self) -> bool {
        self.protocol == Protocol::Udp
    }
}

impl std::fmt::Display for ThroughputPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.protocol, self.direction)
    }
}

/// Metrics extracted from one `iperf3 -J` run.
///
/// UDP-only fields are `None` for TCP. A UDP value the report states as
/// zero stays `Some(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThroughputPhaseResult {
    pub bits_per_second: f64,
    pub retransmits: u64,
    pub jitter_ms: Option<f64>,
    pub lost_packets: Option<u64>,
    pub packets_received: Option<u64>,
}

impl ThroughputPhaseResult {
    pub fn mbps(&self) -> f64 {
        self.bits_per_second / 1_000_000.0
    }
}

/// All four phases of one survey.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThroughputResults {
    pub tcp_download: ThroughputPhaseResult,
    pub tcp_upload: ThroughputPhaseResult,
    pub udp_download: ThroughputPhaseResult,
    pub udp_upload: ThroughputPhaseResult,
}

impl ThroughputResults {
    pub fn get(&self, phase: ThroughputPhase) -> &ThroughputPhaseResult {
        match (phase.protocol, phase.direction) {
            (Protocol::Tcp, Direction::Download) => &self.tcp_download,
            (Protocol::Tcp, Direction::Upload) => &self.tcp_upload,
            (Protocol::Udp, Direction::Download) => &self.udp_download,
            (Protocol::Udp, Direction::Upload) => &self.udp_upload,
        }
    }

    pub fn set(&mut self, phase: ThroughputPhase, result: ThroughputPhaseResult) {
        let slot = match (phase.protocol, phase.direction) {
            (Protocol::Tcp, Direction::Download) => &mut self.tcp_download,
            (Protocol::Tcp, Direction::Upload) => &mut self.tcp_upload,
            (Protocol::Udp, Direction::Download) => &mut self.udp_download,
            (Protocol::Udp, Direction::Upload) => &mut self.udp_upload,
        };
        *slot = result;
    }
}
