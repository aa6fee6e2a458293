//! Parsers for macOS Wi-Fi tooling.
//!
//! - `wdutil info`: free text with a `WIFI` section of `Label : value` lines
//! - `system_profiler -json SPAirPortDataType`: interface inventory with the
//!   current association and other visible networks
//! - `ioreg -l`: fallback source for the BSSID when `wdutil` redacts it
//! - `networksetup -listallhardwareports`: Wi-Fi interface discovery
//!
//! All of these print English regardless of the system locale.

use std::cmp::Ordering;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::split_label;
use crate::error::CoreError;
use crate::localization::WifiField;
use crate::model::{
    Band, FieldValues, WifiRecord, is_valid_mac, leading_int, normalize_mac, rssi_to_percentage,
};

// ── wdutil info ─────────────────────────────────────────────────────

const WDUTIL_LABELS: &[(&str, WifiField)] = &[
    ("SSID", WifiField::Ssid),
    ("BSSID", WifiField::Bssid),
    ("RSSI", WifiField::Rssi),
    ("Channel", WifiField::Channel),
    ("Tx Rate", WifiField::TxRate),
    ("PHY Mode", WifiField::PhyMode),
    ("Security", WifiField::Security),
];

/// Parse the `WIFI` section of `wdutil info`.
///
/// A zero `tx_rate` means link metadata is not populated yet; the caller
/// decides whether to retry. A redacted or malformed BSSID is returned as
/// is for the caller to replace.
pub fn parse_wdutil(output: &str) -> Result<WifiRecord, CoreError> {
    let Some((_, after)) = output.split_once("WIFI") else {
        return Err(CoreError::parse("wdutil output", "no WIFI section"));
    };
    let section = after.split("BLUETOOTH").next().unwrap_or(after);

    let mut record = WifiRecord::default();
    for line in section.lines() {
        let Some((label, value)) = split_label(line) else {
            continue;
        };
        let Some(&(_, field)) = WDUTIL_LABELS.iter().find(|(l, _)| *l == label) else {
            continue;
        };
        trace!(label, value, "wdutil line");
        if field == WifiField::Channel {
            let (channel, width) = parse_channel(value);
            record.set_channel(channel);
            record.channel_width = width;
        } else {
            record.assign(field, value);
        }
    }
    Ok(record)
}

/// Parse a macOS channel description into `(channel, width_mhz)`.
///
/// Shapes seen in the wild:
/// - `5g144/40`, `2g1/20` (macOS 13+): band digit and `g`, channel, `/` width
/// - `11 (20 MHz, Active)`, `144 (40Mhz, DFS)` (macOS 12)
/// - `6 (2GHz, 20MHz)` (system_profiler)
/// - `44` (older system_profiler): width unknown, reported as 0
///
/// The band digit is ignored; band always comes from the channel number.
pub fn parse_channel(raw: &str) -> (u32, u32) {
    let raw = raw.trim();

    if let Some((head, width)) = raw.split_once('/') {
        let channel = head
            .split_once(['g', 'G'])
            .map_or(head, |(_, channel)| channel);
        return (
            leading_int(channel).unwrap_or(0),
            leading_int(width).unwrap_or(0),
        );
    }

    let channel = leading_int(raw).unwrap_or(0);
    (channel, width_before_mhz(raw).unwrap_or(0))
}

/// The number immediately preceding the first `MHz` (any case).
fn width_before_mhz(raw: &str) -> Option<u32> {
    let lower = raw.to_ascii_lowercase();
    let at = lower.find("mhz")?;
    let before = raw.get(..at)?.trim_end();
    let start = before
        .rfind(|c: char| !c.is_ascii_digit())
        .map_or(0, |i| i + 1);
    before.get(start..)?.parse().ok()
}

// ── ioreg / networksetup ────────────────────────────────────────────

/// Extract the BSSID from `ioreg -l` output (`"IO80211BSSID" = <a0b1c2d3e4f5>`).
pub fn parse_ioreg_bssid(output: &str) -> Option<String> {
    let line = output.lines().find(|l| l.contains("IO80211BSSID"))?;
    let (_, value) = line.split_once('=')?;
    let hex = value.trim().trim_start_matches('<').trim_end_matches('>');
    is_valid_mac(hex).then(|| normalize_mac(hex))
}

/// Device name of the first Wi-Fi port in `networksetup -listallhardwareports`.
pub fn parse_hardware_ports(output: &str) -> Option<String> {
    let mut lines = output.lines();
    while let Some(line) = lines.next() {
        let Some(("Hardware Port", port)) = split_label(line) else {
            continue;
        };
        if port.contains("Wi-Fi") || port.contains("AirPort") {
            return lines
                .find_map(|l| match split_label(l) {
                    Some(("Device", device)) if !device.is_empty() => Some(device.to_owned()),
                    _ => None,
                });
        }
    }
    None
}

// ── system_profiler -json SPAirPortDataType ─────────────────────────

/// Top-level `system_profiler -json SPAirPortDataType` document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AirPortReport {
    #[serde(rename = "SPAirPortDataType", default)]
    entries: Vec<AirPortEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AirPortEntry {
    #[serde(default)]
    spairport_airport_interfaces: Vec<AirPortInterface>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AirPortInterface {
    #[serde(rename = "_name", default)]
    name: String,
    #[serde(default)]
    spairport_current_network_information: Option<Map<String, Value>>,
    #[serde(default)]
    spairport_airport_other_local_wireless_networks: Vec<Map<String, Value>>,
}

impl AirPortReport {
    fn interface(&self, name: &str) -> Option<&AirPortInterface> {
        self.entries
            .iter()
            .flat_map(|entry| &entry.spairport_airport_interfaces)
            .find(|iface| iface.name == name)
    }

    /// Names of every Wi-Fi interface in the report.
    pub fn interface_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .flat_map(|entry| &entry.spairport_airport_interfaces)
            .map(|iface| iface.name.as_str())
            .collect()
    }
}

pub fn parse_system_profiler(json: &str) -> Result<AirPortReport, CoreError> {
    serde_json::from_str(json).map_err(|e| CoreError::json("system_profiler", e))
}

type Transform = fn(&Value) -> Vec<(WifiField, String)>;

/// How one `system_profiler` key maps onto canonical fields.
#[derive(Clone, Copy)]
enum FieldMapping {
    /// Value passes through as text.
    Copy(WifiField),
    /// Value is converted; `key` receives `""` when the source is missing.
    Transform { key: WifiField, apply: Transform },
}

const SP_FIELD_MAP: &[(&str, FieldMapping)] = &[
    ("_name", FieldMapping::Copy(WifiField::Ssid)),
    ("spairport_network_phymode", FieldMapping::Copy(WifiField::PhyMode)),
    ("spairport_network_rate", FieldMapping::Copy(WifiField::TxRate)),
    (
        "spairport_network_channel",
        FieldMapping::Transform {
            key: WifiField::Channel,
            apply: channel_fields,
        },
    ),
    ("spairport_network_bssid", FieldMapping::Copy(WifiField::Bssid)),
    (
        "spairport_security_mode",
        FieldMapping::Transform {
            key: WifiField::Security,
            apply: security_fields,
        },
    ),
    (
        "spairport_signal_noise",
        FieldMapping::Transform {
            key: WifiField::Rssi,
            apply: signal_fields,
        },
    ),
];

/// `spairport_security_mode` values and their display labels.
pub const SECURITY_LABELS: &[(&str, &str)] = &[
    ("spairport_security_mode_none", "None"),
    ("spairport_security_mode_wep", "WEP"),
    ("spairport_security_mode_wpa_personal", "WPA Personal"),
    ("spairport_security_mode_wpa2_personal", "WPA2 Personal"),
    ("spairport_security_mode_wpa3_personal", "WPA3 Personal"),
    ("spairport_security_mode_wpa_enterprise", "WPA Enterprise"),
    ("spairport_security_mode_wpa2_enterprise", "WPA2 Enterprise"),
    ("spairport_security_mode_wpa3_enterprise", "WPA3 Enterprise"),
    ("spairport_security_mode_unknown", "Unknown"),
];

pub fn security_label(mode: &str) -> &'static str {
    SECURITY_LABELS
        .iter()
        .find(|(key, _)| *key == mode)
        .map_or("Unrecognized", |(_, label)| label)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn channel_fields(value: &Value) -> Vec<(WifiField, String)> {
    let (channel, width) = match value {
        Value::Number(n) => (
            n.as_u64().and_then(|c| u32::try_from(c).ok()).unwrap_or(0),
            None,
        ),
        other => {
            let (channel, width) = parse_channel(&value_text(other));
            (channel, Some(width).filter(|w| *w != 0))
        }
    };
    vec![
        (WifiField::Channel, channel.to_string()),
        (
            WifiField::ChannelWidth,
            width.map(|w| w.to_string()).unwrap_or_default(),
        ),
        (WifiField::Band, Band::from_channel(channel).to_string()),
    ]
}

fn security_fields(value: &Value) -> Vec<(WifiField, String)> {
    vec![(
        WifiField::Security,
        security_label(&value_text(value)).to_owned(),
    )]
}

fn signal_fields(value: &Value) -> Vec<(WifiField, String)> {
    let Some(rssi) = leading_int::<i32>(&value_text(value)) else {
        return vec![(WifiField::Rssi, String::new())];
    };
    vec![
        (WifiField::Rssi, rssi.to_string()),
        (
            WifiField::SignalStrength,
            rssi_to_percentage(rssi).to_string(),
        ),
    ]
}

/// Apply [`SP_FIELD_MAP`] to one network object.
pub fn map_network_fields(network: &Map<String, Value>) -> FieldValues {
    let mut values = FieldValues::new();
    for (source, mapping) in SP_FIELD_MAP {
        let raw = network.get(*source);
        match (*mapping, raw) {
            (FieldMapping::Copy(key) | FieldMapping::Transform { key, .. }, None) => {
                values.insert(key, String::new());
            }
            (FieldMapping::Copy(key), Some(value)) => {
                values.insert(key, value_text(value));
            }
            (FieldMapping::Transform { apply, .. }, Some(value)) => {
                values.extend(apply(value));
            }
        }
    }
    values
}

/// Leading dBm of a `"-51 dBm / -92 dBm"` signal/noise string.
fn signal_dbm(network: &Map<String, Value>) -> Option<i32> {
    let text = network.get("spairport_signal_noise")?.as_str()?;
    let mut parts = text.split_whitespace();
    let dbm = parts.next()?.parse().ok()?;
    parts.next()?.starts_with("dBm").then_some(dbm)
}

/// Other visible networks on `interface`, strongest first.
///
/// Networks whose signal cannot be read sort after all others.
pub fn candidate_networks(report: &AirPortReport, interface: &str) -> Vec<WifiRecord> {
    let Some(iface) = report.interface(interface) else {
        debug!(interface, "interface not in system_profiler report");
        return Vec::new();
    };

    let mut networks: Vec<&Map<String, Value>> = iface
        .spairport_airport_other_local_wireless_networks
        .iter()
        .collect();
    networks.sort_by(|a, b| match (signal_dbm(a), signal_dbm(b)) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    networks
        .into_iter()
        .map(|network| WifiRecord::from_field_values(&map_network_fields(network)))
        .collect()
}

/// The current association on `interface`, if any.
pub fn current_network(report: &AirPortReport, interface: &str) -> Option<WifiRecord> {
    let current = report
        .interface(interface)?
        .spairport_current_network_information
        .as_ref()?;
    Some(WifiRecord::from_field_values(&map_network_fields(current)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    const WDUTIL: &str = "
————————————————————————————————————————————————————————————————————
NETWORK
————————————————————————————————————————————————————————————————————
    Primary IPv4         : en0 (Wi-Fi / 2F0E4C2B)
————————————————————————————————————————————————————————————————————
WIFI
————————————————————————————————————————————————————————————————————
    MAC Address          : a0:b1:c2:d3:e4:f5 (hw=a0:b1:c2:d3:e4:f5)
    Interface Name       : en0
    Power                : On [On]
    Op Mode              : STA
    SSID                 : SSID-42
    BSSID                : 1A:2B:3C:4D:5E:6F
    RSSI                 : -56 dBm
    CCA                  : 8 %
    Noise                : -93 dBm
    Tx Rate              : 864.0 Mbps
    Security             : WPA2 Personal
    PHY Mode             : 11ac
    MCS Index            : 9
    Channel              : 5g144/40
    Country Code         : US
————————————————————————————————————————————————————————————————————
BLUETOOTH
————————————————————————————————————————————————————————————————————
    Power                : On
    SSID                 : not-this-one
";

    #[test]
    fn wdutil_section_is_parsed() {
        let record = parse_wdutil(WDUTIL).unwrap();
        assert_eq!(record.ssid, "SSID-42");
        assert_eq!(record.bssid, "1a:2b:3c:4d:5e:6f");
        assert_eq!(record.rssi, -56);
        assert_eq!(record.signal_strength, 73);
        assert_eq!(record.channel, 144);
        assert_eq!(record.channel_width, 40);
        assert_eq!(record.band, Band::Five);
        assert!((record.tx_rate - 864.0).abs() < f64::EPSILON);
        assert_eq!(record.phy_mode, "11ac");
        assert_eq!(record.security, "WPA2 Personal");
    }

    #[test]
    fn wdutil_without_wifi_section_is_a_parse_error() {
        let err = parse_wdutil("NETWORK\n  Primary : en0\n").unwrap_err();
        assert!(matches!(err, CoreError::Parse { .. }));
    }

    #[test]
    fn wdutil_keeps_redacted_bssid_for_caller() {
        let input = WDUTIL.replace("1A:2B:3C:4D:5E:6F", "<redacted>");
        let record = parse_wdutil(&input).unwrap();
        assert!(!is_valid_mac(&record.bssid));
    }

    #[test]
    fn channel_shapes() {
        assert_eq!(parse_channel("5g144/40"), (144, 40));
        assert_eq!(parse_channel("2g1/20"), (1, 20));
        assert_eq!(parse_channel("11 (20 MHz, Active)"), (11, 20));
        assert_eq!(parse_channel("144 (40Mhz, DFS)"), (144, 40));
        assert_eq!(parse_channel("6 (2GHz, 20MHz)"), (6, 20));
        assert_eq!(parse_channel("44"), (44, 0));
        assert_eq!(parse_channel(""), (0, 0));
    }

    #[test]
    fn band_digit_is_never_trusted() {
        let input = WDUTIL.replace("5g144/40", "5g11/20");
        let record = parse_wdutil(&input).unwrap();
        assert_eq!(record.channel, 11);
        assert_eq!(record.band, Band::TwoPointFour);
    }

    #[test]
    fn ioreg_bssid_is_normalized() {
        let output = r#"    |   |   "IO80211BSSID" = <a0b1c2d3e4f5>
    |   |   "IO80211SSID" = "Home""#;
        assert_eq!(parse_ioreg_bssid(output).as_deref(), Some("a0:b1:c2:d3:e4:f5"));
        assert_eq!(parse_ioreg_bssid("\"IO80211BSSID\" = <00>"), None);
        assert_eq!(parse_ioreg_bssid(""), None);
    }

    #[test]
    fn hardware_ports_finds_wifi_device() {
        let output = "
Hardware Port: Ethernet
Device: en1
Ethernet Address: 00:00:00:00:00:01

Hardware Port: Wi-Fi
Device: en0
Ethernet Address: a0:b1:c2:d3:e4:f5
";
        assert_eq!(parse_hardware_ports(output).as_deref(), Some("en0"));
        assert_eq!(parse_hardware_ports("Hardware Port: Ethernet\nDevice: en1\n"), None);
    }

    #[test]
    fn security_labels_default_to_unrecognized() {
        assert_eq!(security_label("spairport_security_mode_wpa2_personal"), "WPA2 Personal");
        assert_eq!(security_label("spairport_security_mode_owe"), "Unrecognized");
    }

    #[test]
    fn missing_source_fields_map_to_empty_strings() {
        let network = json!({ "_name": "Lonely" });
        let values = map_network_fields(network.as_object().unwrap());
        assert_eq!(values[&WifiField::Ssid], "Lonely");
        assert_eq!(values[&WifiField::Bssid], "");
        assert_eq!(values[&WifiField::Channel], "");
        assert_eq!(values[&WifiField::Security], "");
        assert_eq!(values[&WifiField::Rssi], "");
        assert_eq!(values[&WifiField::TxRate], "");
    }

    #[test]
    fn candidates_sort_strongest_first_and_unreadable_last() {
        let report: AirPortReport = serde_json::from_value(json!({
            "SPAirPortDataType": [{
                "spairport_airport_interfaces": [{
                    "_name": "en0",
                    "spairport_airport_other_local_wireless_networks": [
                        { "_name": "weak", "spairport_signal_noise": "-80 dBm / -90 dBm" },
                        { "_name": "unknown" },
                        { "_name": "strong", "spairport_signal_noise": "-40 dBm / -90 dBm",
                          "spairport_network_channel": "36 (5GHz, 80MHz)" },
                        { "_name": "tie-a", "spairport_signal_noise": "-60 dBm / -90 dBm" },
                        { "_name": "tie-b", "spairport_signal_noise": "-60 dBm / -90 dBm" }
                    ]
                }]
            }]
        }))
        .unwrap();

        let names: Vec<String> = candidate_networks(&report, "en0")
            .into_iter()
            .map(|r| r.ssid)
            .collect();
        assert_eq!(names, ["strong", "tie-a", "tie-b", "weak", "unknown"]);

        let strong = &candidate_networks(&report, "en0")[0];
        assert_eq!(strong.channel_width, 80);
        assert_eq!(strong.band, Band::Five);
        assert!(candidate_networks(&report, "en9").is_empty());
    }

    #[test]
    fn current_network_uses_field_map() {
        let report: AirPortReport = serde_json::from_value(json!({
            "SPAirPortDataType": [{
                "spairport_airport_interfaces": [{
                    "_name": "en0",
                    "spairport_current_network_information": {
                        "_name": "Home",
                        "spairport_network_phymode": "802.11ac",
                        "spairport_network_rate": 866,
                        "spairport_network_channel": 149,
                        "spairport_security_mode": "spairport_security_mode_wpa3_personal",
                        "spairport_signal_noise": "-67 dBm / -95 dBm"
                    }
                }]
            }]
        }))
        .unwrap();

        let current = current_network(&report, "en0").unwrap();
        assert_eq!(current.ssid, "Home");
        assert_eq!(current.channel, 149);
        assert_eq!(current.channel_width, 0);
        assert_eq!(current.band, Band::Five);
        assert!((current.tx_rate - 866.0).abs() < f64::EPSILON);
        assert_eq!(current.security, "WPA3 Personal");
        assert_eq!(current.rssi, -67);
        assert_eq!(current.signal_strength, 55);
        assert_eq!(report.interface_names(), ["en0"]);
    }
}
