// ── Canonical Wi-Fi record ──────────────────────────────────────────

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::mac::normalize_mac;
use super::signal::{percentage_to_rssi, rssi_to_percentage};
use crate::localization::WifiField;

/// Raw string values keyed by canonical field, as produced by the
/// declarative inventory mapping. Missing source fields hold `""`.
pub type FieldValues = BTreeMap<WifiField, String>;

/// Frequency band, derived from the channel number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Band {
    #[default]
    TwoPointFour,
    Five,
}

impl Band {
    /// Channels above 14 are 5 GHz; everything else is 2.4 GHz.
    pub fn from_channel(channel: u32) -> Self {
        if channel > 14 { Self::Five } else { Self::TwoPointFour }
    }

    pub fn ghz(self) -> f64 {
        match self {
            Self::TwoPointFour => 2.4,
            Self::Five => 5.0,
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TwoPointFour => f.write_str("2.4"),
            Self::Five => f.write_str("5"),
        }
    }
}

impl Serialize for Band {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::TwoPointFour => serializer.serialize_f64(2.4),
            Self::Five => serializer.serialize_u8(5),
        }
    }
}

impl<'de> Deserialize<'de> for Band {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ghz = f64::deserialize(deserializer)?;
        Ok(if ghz >= 5.0 { Self::Five } else { Self::TwoPointFour })
    }
}

/// Canonical snapshot of one association or candidate network.
///
/// `band` is never taken from OS text: every channel change goes through
/// [`WifiRecord::set_channel`], which recomputes it. Likewise `rssi` and
/// `signal_strength` are kept consistent through the signal mapping.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiRecord {
    pub ssid: String,
    pub bssid: String,
    pub rssi: i32,
    pub signal_strength: u8,
    pub channel: u32,
    pub band: Band,
    pub channel_width: u32,
    pub tx_rate: f64,
    pub phy_mode: String,
    pub security: String,
}

impl WifiRecord {
    pub fn set_channel(&mut self, channel: u32) {
        self.channel = channel;
        self.band = Band::from_channel(channel);
    }

    /// Set signal from a dBm reading; percent is derived.
    pub fn set_rssi(&mut self, rssi: i32) {
        self.rssi = rssi;
        self.signal_strength = rssi_to_percentage(rssi);
    }

    /// Set signal from a percentage; dBm is derived.
    pub fn set_signal_strength(&mut self, percent: u8) {
        self.signal_strength = percent.min(100);
        self.rssi = percentage_to_rssi(self.signal_strength);
    }

    /// Assign a raw OS value to a canonical field.
    ///
    /// Numeric fields that fail to parse become zero. Fields that are not
    /// part of the record (`name`, `band`, `ssidName`, `profile`) are ignored;
    /// band in particular is always derived from the channel.
    pub fn assign(&mut self, field: WifiField, raw: &str) {
        let value = raw.trim();
        match field {
            WifiField::Ssid => value.clone_into(&mut self.ssid),
            WifiField::Bssid => self.bssid = normalize_mac(value),
            WifiField::SignalStrength => {
                let pct = value.trim_end_matches('%').trim().parse().unwrap_or(0);
                self.set_signal_strength(pct);
            }
            WifiField::Rssi => match leading_int(value) {
                Some(rssi) => self.set_rssi(rssi),
                None => {
                    self.rssi = 0;
                    self.signal_strength = 0;
                }
            },
            WifiField::Channel => self.set_channel(leading_int(value).unwrap_or(0)),
            WifiField::ChannelWidth => self.channel_width = leading_int(value).unwrap_or(0),
            WifiField::TxRate => self.tx_rate = leading_number(value).unwrap_or(0.0),
            WifiField::PhyMode => value.clone_into(&mut self.phy_mode),
            WifiField::Security => value.clone_into(&mut self.security),
            WifiField::Name | WifiField::Band | WifiField::SsidName | WifiField::Profile => {}
        }
    }

    /// Build a record from mapped field values.
    pub fn from_field_values(values: &FieldValues) -> Self {
        let mut record = Self::default();
        for (field, value) in values {
            record.assign(*field, value);
        }
        record
    }

    /// Whether the interface reported enough to count as associated.
    pub fn has_link_data(&self) -> bool {
        self.signal_strength != 0 || self.channel != 0 || self.tx_rate != 0.0
    }
}

/// Parse the leading (optionally signed) integer of `s`, e.g. `"-56 dBm"`.
pub(crate) fn leading_int<T: std::str::FromStr>(s: &str) -> Option<T> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(s.len(), |(i, _)| i);
    s.get(..end)?.parse().ok()
}

/// Parse the leading decimal number of `s`, accepting `,` as decimal mark.
pub(crate) fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let end = s
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || c == ',' || (i == 0 && c == '-')))
        .map_or(s.len(), |(i, _)| i);
    s.get(..end)?.replace(',', ".").parse().ok()
}
