// ── OS output parsers ──
//
// Pure functions from captured command output to canonical records.
// Nothing here spawns processes; the platform adapters feed these.

pub mod iperf;
pub mod macos;
pub mod windows;

pub use iperf::{IperfReport, extract_throughput};
pub use macos::{
    AirPortReport, candidate_networks, current_network, parse_channel, parse_hardware_ports,
    parse_ioreg_bssid, parse_system_profiler, parse_wdutil,
};
pub use windows::{find_profile_from_ssid, parse_interfaces, parse_networks, parse_profiles};

/// Split a `Label : value` line at its first colon.
///
/// Values keep any further colons (BSSIDs, URLs). Lines without a colon
/// yield `None`.
pub(crate) fn split_label(line: &str) -> Option<(&str, &str)> {
    let (label, value) = line.split_once(':')?;
    Some((label.trim(), value.trim()))
}
