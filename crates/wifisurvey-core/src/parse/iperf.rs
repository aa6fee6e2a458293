// ── iperf3 -J result extraction ─────────────────────────────────────
//
// Two report generations exist. iperf3 >= 3.17 writes `end.sum_received`
// and `end.sum_sent`; older builds write a single `end.sum`. Each report is
// read through exactly one of the two paths.

use serde::Deserialize;
use tracing::trace;

use crate::error::CoreError;
use crate::model::{Protocol, ThroughputPhaseResult};

#[derive(Debug, Default, Deserialize)]
pub struct IperfReport {
    #[serde(default)]
    pub end: IperfEnd,
}

#[derive(Debug, Default, Deserialize)]
pub struct IperfEnd {
    pub sum_received: Option<IperfSum>,
    pub sum_sent: Option<IperfSum>,
    pub sum: Option<IperfSum>,
    #[serde(default)]
    pub streams: Vec<IperfStream>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IperfStream {
    pub udp: Option<IperfSum>,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct IperfSum {
    pub bits_per_second: Option<f64>,
    pub retransmits: Option<u64>,
    pub jitter_ms: Option<f64>,
    pub lost_packets: Option<u64>,
    pub packets: Option<u64>,
}

impl IperfReport {
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json).map_err(|e| CoreError::json("iperf3", e))
    }

    fn is_modern(&self) -> bool {
        self.end.sum_received.is_some()
    }
}

/// Extract one phase result from a parsed report.
///
/// Bits per second come from `sum_received` for modern TCP reports and from
/// `sum` otherwise (a modern UDP `sum_received` counts only what arrived,
/// which is not the measured rate). A missing or zero rate is fatal.
pub fn extract_throughput(
    report: &IperfReport,
    protocol: Protocol,
) -> Result<ThroughputPhaseResult, CoreError> {
    let end = &report.end;
    let udp = protocol == Protocol::Udp;
    let sum = end.sum.unwrap_or_default();

    let (bits_per_second, retransmits) = if report.is_modern() {
        let received = end.sum_received.unwrap_or_default();
        let bps = if udp {
            sum.bits_per_second
        } else {
            received.bits_per_second
        };
        (bps, end.sum_sent.and_then(|s| s.retransmits))
    } else {
        (sum.bits_per_second, sum.retransmits)
    };

    let bits_per_second = bits_per_second
        .filter(|bps| *bps > 0.0)
        .ok_or(CoreError::NoThroughput)?;
    trace!(modern = report.is_modern(), %protocol, bits_per_second, "extracted iperf3 rate");

    if !udp {
        return Ok(ThroughputPhaseResult {
            bits_per_second,
            retransmits: retransmits.unwrap_or(0),
            ..ThroughputPhaseResult::default()
        });
    }

    // Single-stream runs sometimes only carry UDP detail per stream.
    let stream = end.streams.first().and_then(|s| s.udp).unwrap_or_default();
    Ok(ThroughputPhaseResult {
        bits_per_second,
        retransmits: 0,
        jitter_ms: sum.jitter_ms.or(stream.jitter_ms),
        lost_packets: sum.lost_packets.or(stream.lost_packets),
        packets_received: sum.packets.or(stream.packets),
    })
}
