#![allow(clippy::unwrap_used)]
// Integration tests for throughput extraction across iperf3 report generations.

use std::path::Path;

use wifisurvey_core::parse::{IperfReport, extract_throughput};
use wifisurvey_core::{CoreError, Protocol};

fn report(name: &str) -> IperfReport {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    IperfReport::from_json(&std::fs::read_to_string(&path).unwrap()).unwrap()
}

#[test]
fn test_modern_tcp() {
    let result = extract_throughput(&report("iperf-3.17-tcp.json"), Protocol::Tcp).unwrap();
    assert!((result.bits_per_second - 415_880_211.2).abs() < 1e-3);
    assert_eq!(result.retransmits, 17);
    assert_eq!(result.jitter_ms, None);
    assert!((result.mbps() - 415.88).abs() < 0.01);
}

#[test]
fn test_modern_udp_uses_sum() {
    let result = extract_throughput(&report("iperf-3.17-udp.json"), Protocol::Udp).unwrap();
    assert!((result.bits_per_second - 948_249_600.0).abs() < 1e-3);
    assert_eq!(result.retransmits, 0);
    assert_eq!(result.jitter_ms, Some(0.031));
    assert_eq!(result.lost_packets, Some(0));
    assert_eq!(result.packets_received, Some(818_586));
}

#[test]
fn test_legacy_tcp() {
    let result = extract_throughput(&report("iperf-3.9-tcp.json"), Protocol::Tcp).unwrap();
    assert!((result.bits_per_second - 93_520_112.0).abs() < 1e-3);
    assert_eq!(result.retransmits, 3);
}

#[test]
fn test_legacy_udp() {
    let result = extract_throughput(&report("iperf-3.9-udp.json"), Protocol::Udp).unwrap();
    assert!((result.bits_per_second - 61_803_398.0).abs() < 1e-3);
    assert_eq!(result.lost_packets, Some(12));
    assert_eq!(result.packets_received, Some(53_350));
}

#[test]
fn test_error_report_has_no_throughput() {
    let err = extract_throughput(&report("iperf-error.json"), Protocol::Tcp).unwrap_err();
    assert!(matches!(err, CoreError::NoThroughput));
}
