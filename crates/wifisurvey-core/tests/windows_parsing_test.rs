#![allow(clippy::unwrap_used)]
// Integration tests for the `netsh wlan` parsers against captured output.

use std::path::Path;

use pretty_assertions::assert_eq;

use wifisurvey_core::parse::{
    find_profile_from_ssid, parse_interfaces, parse_networks, parse_profiles,
};
use wifisurvey_core::{Band, CoreError, LocalizationMap, WifiRecord};

// ── Helpers ─────────────────────────────────────────────────────────

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap()
}

fn loc() -> LocalizationMap {
    LocalizationMap::builtin().unwrap()
}

fn without_lines(text: &str, needle: &str) -> String {
    text.lines()
        .filter(|line| !line.contains(needle))
        .collect::<Vec<_>>()
        .join("\n")
}

// ── show interfaces ─────────────────────────────────────────────────

#[test]
fn test_interfaces_english() {
    let record = parse_interfaces(&loc(), &fixture("netsh-interfaces-en.txt")).unwrap();
    assert_eq!(
        record,
        WifiRecord {
            ssid: "SomeSSID".into(),
            bssid: "12:34:56:78:90:ac".into(),
            rssi: -75,
            signal_strength: 42,
            channel: 44,
            band: Band::Five,
            channel_width: 0,
            tx_rate: 103.0,
            phy_mode: "802.11ax".into(),
            security: "WPA2-Personal".into(),
        }
    );
}

#[test]
fn test_interfaces_italian() {
    let record = parse_interfaces(&loc(), &fixture("netsh-interfaces-it.txt")).unwrap();
    assert_eq!(record.bssid, "12:34:56:10:f7:a8");
    assert_eq!(record.signal_strength, 85);
    assert_eq!(record.rssi, -49);
    assert_eq!(record.channel, 4);
    assert_eq!(record.band, Band::TwoPointFour);
    assert!((record.tx_rate - 130.0).abs() < f64::EPSILON);
    assert_eq!(record.phy_mode, "802.11n");
    assert_eq!(record.security, "WPA2-Personal");
}

#[test]
fn test_interfaces_german() {
    let record = parse_interfaces(&loc(), &fixture("netsh-interfaces-de.txt")).unwrap();
    assert_eq!(record.signal_strength, 43);
    assert_eq!(record.rssi, -74);
    assert_eq!(record.channel, 116);
    assert_eq!(record.band, Band::Five);
    assert!((record.tx_rate - 300.0).abs() < f64::EPSILON);
    assert_eq!(record.phy_mode, "802.11ac");
    assert_eq!(record.security, "WPA2-Enterprise");
}

#[test]
fn test_interfaces_french() {
    let record = parse_interfaces(&loc(), &fixture("netsh-interfaces-fr.txt")).unwrap();
    assert_eq!(record.ssid, "SomeSSID");
    assert_eq!(record.bssid, "12:34:56:78:90:ab");
    assert_eq!(record.signal_strength, 65);
    assert_eq!(record.rssi, -61);
    assert_eq!(record.channel, 144);
    assert!((record.tx_rate - 310.0).abs() < f64::EPSILON);
    assert_eq!(record.phy_mode, "802.11ax");
    assert_eq!(record.security, "WPA2 - Personnel");
}

#[test]
fn test_interfaces_unknown_locale() {
    let err = parse_interfaces(&loc(), &fixture("netsh-interfaces-no-match.txt")).unwrap_err();
    assert!(matches!(err, CoreError::NotLocalized));
    assert!(err.to_string().contains("issues/26"));
}

#[test]
fn test_interfaces_invalid_bssid() {
    let output = fixture("netsh-interfaces-en.txt").replace("12:34:56:78:90:ac", "12:34:56");
    let err = parse_interfaces(&loc(), &output).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid BSSID when parsing netsh output: 12:34:56"
    );
}

// ── show networks ───────────────────────────────────────────────────

#[test]
fn test_networks_one_record_per_bssid() {
    let records = parse_networks(&loc(), &fixture("netsh-networks-en.txt"));
    assert_eq!(records.len(), 8);

    let mut first = WifiRecord {
        ssid: "SSID-1".into(),
        bssid: "fe:dc:ba:09:87:01".into(),
        phy_mode: "802.11ax".into(),
        security: "Open".into(),
        ..WifiRecord::default()
    };
    first.set_channel(1);
    first.set_signal_strength(31);
    assert_eq!(records[0], first);
    assert_eq!(records[0].rssi, -81);

    for record in &records {
        assert!(record.ssid.starts_with("SSID-"), "{record:?}");
        assert!(record.tx_rate.abs() < f64::EPSILON);
    }

    // Both BSSIDs of SSID-2 inherit its authentication.
    assert_eq!(records[2].ssid, "SSID-2");
    assert_eq!(records[2].security, "WPA2-Personal");
    assert_eq!(records[2].channel, 6);
    assert_eq!(records[2].band, Band::TwoPointFour);
}

// ── profiles ────────────────────────────────────────────────────────

#[test]
fn test_profiles_list() {
    let profiles = parse_profiles(&loc(), &fixture("netsh-profiles-en.txt"));
    assert_eq!(
        profiles,
        [
            "HBTL5 2",
            "Fourteen Pro",
            "HBTL",
            "CAMERA_5G-1",
            "PACHNET",
            "RK Production"
        ]
    );
}

#[test]
fn test_profile_for_ssid_english() {
    let output = fixture("netsh-profile-name-en.txt");
    let loc = loc();
    assert_eq!(
        find_profile_from_ssid(&loc, &output, "HBTL5").unwrap().as_deref(),
        Some("HBTL5 2")
    );
    assert_eq!(
        find_profile_from_ssid(&loc, &output, "HBTL6").unwrap().as_deref(),
        Some("HBTL5 2")
    );
    assert_eq!(find_profile_from_ssid(&loc, &output, "HBTL10").unwrap(), None);

    let no_name = without_lines(&output, "Name");
    assert!(matches!(
        find_profile_from_ssid(&loc, &no_name, "HBTL5"),
        Err(CoreError::MissingProfileName)
    ));

    let no_ssid = without_lines(&output, "SSID name");
    let err = find_profile_from_ssid(&loc, &no_ssid, "HBTL5").unwrap_err();
    assert!(err.to_string().starts_with("Can't find an SSID"));
}

#[test]
fn test_profile_for_ssid_french() {
    let output = fixture("netsh-profile-name-fr.txt");
    let loc = loc();
    assert_eq!(
        find_profile_from_ssid(&loc, &output, "HBTL5").unwrap().as_deref(),
        Some("HBTL5 2")
    );
    assert_eq!(
        find_profile_from_ssid(&loc, &output, "HBTL6").unwrap().as_deref(),
        Some("HBTL5 2")
    );
    assert_eq!(
        find_profile_from_ssid(&loc, &output, "PACHNET").unwrap().as_deref(),
        Some("PACHNET")
    );
    assert_eq!(find_profile_from_ssid(&loc, &output, "HBTL10").unwrap(), None);

    let no_ssid = without_lines(&output, "Nom du SSID");
    assert!(matches!(
        find_profile_from_ssid(&loc, &no_ssid, "HBTL5"),
        Err(CoreError::MissingSsidName)
    ));
}
