// ── MacAddress ──────────────────────────────────────────────────────

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// BSSID / MAC address, normalized to lowercase colon-separated format
/// (`aa:bb:cc:dd:ee:ff`).
///
/// Construction validates shape: exactly 12 hex digits, grouped in pairs by
/// `:` or `-`, or bare. OS tools print all three forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress(String);

impl MacAddress {
    /// Parse and normalize a MAC address from any common format.
    pub fn parse(raw: impl AsRef<str>) -> Option<Self> {
        normalize(raw.as_ref()).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn normalize(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let digits: String = if raw.len() == 12 {
        raw.to_owned()
    } else {
        let sep = if raw.contains(':') { ':' } else { '-' };
        let groups: Vec<&str> = raw.split(sep).collect();
        if groups.len() != 6 || groups.iter().any(|g| g.len() != 2) {
            return None;
        }
        groups.concat()
    };
    if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }

    let lower = digits.to_ascii_lowercase();
    let pairs: Vec<&str> = (0..6).filter_map(|i| lower.get(i * 2..i * 2 + 2)).collect();
    Some(pairs.join(":"))
}

/// Normalize `raw` if it is MAC-shaped, otherwise lowercase it with `-`
/// replaced by `:` so invalid values stay recognisable in error messages.
pub fn normalize_mac(raw: &str) -> String {
    normalize(raw).unwrap_or_else(|| raw.trim().to_lowercase().replace('-', ":"))
}

/// Whether `raw` has the shape of a MAC address in any accepted format.
pub fn is_valid_mac(raw: &str) -> bool {
    normalize(raw).is_some()
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| CoreError::InvalidBssid {
            bssid: s.to_owned(),
        })
    }
}

impl TryFrom<String> for MacAddress {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn mac_address_normalizes_dashes() {
        let mac = MacAddress::parse("AA-BB-CC-DD-EE-FF").unwrap();
        assert_eq!(mac.as_str(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn mac_address_normalizes_case() {
        let mac = MacAddress::parse("FE:DC:BA:09:87:01").unwrap();
        assert_eq!(mac.as_str(), "fe:dc:ba:09:87:01");
    }

    #[test]
    fn mac_address_accepts_bare_hex() {
        let mac: MacAddress = "a0b1c2d3e4f5".parse().unwrap();
        assert_eq!(mac.to_string(), "a0:b1:c2:d3:e4:f5");
    }

    #[test]
    fn rejects_redacted_and_short_values() {
        assert!(!is_valid_mac(""));
        assert!(!is_valid_mac("<redacted>"));
        assert!(!is_valid_mac("aa:bb:cc:dd:ee"));
        assert!(!is_valid_mac("aa:bb:cc:dd:ee:fg"));
        assert!(!is_valid_mac("a:bb:cc:dd:ee:fff"));
    }

    #[test]
    fn normalize_mac_keeps_invalid_input_readable() {
        assert_eq!(normalize_mac("None"), "none");
        assert_eq!(normalize_mac("AA-BB-CC"), "aa:bb:cc");
    }

    #[test]
    fn from_str_reports_invalid_bssid() {
        let err = "nope".parse::<MacAddress>().unwrap_err();
        assert!(matches!(err, CoreError::InvalidBssid { bssid } if bssid == "nope"));
    }
}
