//! Parsers for `netsh wlan` output.
//!
//! Every label is translated through the [`LocalizationMap`] before use, so
//! the logic below only deals in [`WifiField`]s and works for any locale
//! whose dictionary is loaded.

use tracing::{debug, trace};

use super::split_label;
use crate::error::CoreError;
use crate::localization::{LocalizationMap, WifiField};
use crate::model::{WifiRecord, is_valid_mac};

// ── show interfaces ─────────────────────────────────────────────────

/// Parse `netsh wlan show interfaces` for the connected interface.
///
/// Fails with [`CoreError::NotLocalized`] when signal, channel and transmit
/// rate are all missing (a connected interface always reports at least one),
/// then with [`CoreError::InvalidBssid`] when the BSSID is not MAC-shaped.
pub fn parse_interfaces(loc: &LocalizationMap, output: &str) -> Result<WifiRecord, CoreError> {
    let mut record = WifiRecord::default();

    for line in output.lines() {
        let Some((label, value)) = split_label(line) else {
            continue;
        };
        if let Some(field) = loc.lookup(label) {
            trace!(label, %field, value, "netsh interface line");
            record.assign(field, value);
        }
    }

    if !record.has_link_data() {
        return Err(CoreError::NotLocalized);
    }
    if !is_valid_mac(&record.bssid) {
        return Err(CoreError::InvalidBssid {
            bssid: record.bssid,
        });
    }

    record.set_channel(record.channel);
    record.set_signal_strength(record.signal_strength);
    debug!(ssid = %record.ssid, bssid = %record.bssid, signal = record.signal_strength, "parsed netsh interface");
    Ok(record)
}

// ── show networks mode=bssid ────────────────────────────────────────

/// Strip the block index from labels like `SSID 2` or `BSSID 14`.
fn strip_index(label: &str) -> &str {
    match label.rsplit_once(' ') {
        Some((head, tail)) if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) => {
            head.trim_end()
        }
        _ => label,
    }
}

/// Parse `netsh wlan show networks mode=bssid` into one record per BSSID.
///
/// The output nests BSSID blocks under SSID blocks. SSID and authentication
/// lines set context; each BSSID line starts a record that inherits it.
/// The last record is emitted even when nothing was parsed, so empty input
/// yields one default record.
pub fn parse_networks(loc: &LocalizationMap, output: &str) -> Vec<WifiRecord> {
    let mut results = Vec::new();
    let mut ssid = String::new();
    let mut security = String::new();
    let mut pending: Option<WifiRecord> = None;

    for line in output.lines() {
        let Some((label, value)) = split_label(line) else {
            continue;
        };
        let Some(field) = loc.lookup(strip_index(label)) else {
            continue;
        };

        match field {
            WifiField::Ssid => {
                value.clone_into(&mut ssid);
                security.clear();
            }
            WifiField::Security => value.clone_into(&mut security),
            WifiField::Bssid => {
                if let Some(done) = pending.take() {
                    results.push(done);
                }
                let mut record = WifiRecord {
                    ssid: ssid.clone(),
                    security: security.clone(),
                    ..WifiRecord::default()
                };
                record.assign(WifiField::Bssid, value);
                pending = Some(record);
            }
            WifiField::SignalStrength | WifiField::Channel | WifiField::PhyMode => {
                pending
                    .get_or_insert_with(WifiRecord::default)
                    .assign(field, value);
            }
            _ => {}
        }
    }

    results.push(pending.unwrap_or_default());
    debug!(count = results.len(), "parsed netsh network list");
    results
}

// ── show profiles ───────────────────────────────────────────────────

fn unquote(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Parse `netsh wlan show profiles` into the saved profile names.
///
/// Accepts both `All User Profile : name` lines (in any loaded locale) and
/// bare quoted names, one per line.
pub fn parse_profiles(loc: &LocalizationMap, output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            if let Some((label, value)) = split_label(line) {
                return (loc.lookup(label) == Some(WifiField::Profile) && !value.is_empty())
                    .then(|| unquote(value).to_owned());
            }
            let trimmed = line.trim();
            (trimmed.len() > 2 && trimmed.starts_with('"') && trimmed.ends_with('"'))
                .then(|| unquote(trimmed).to_owned())
        })
        .collect()
}

/// Find the saved profile that connects to `ssid`.
///
/// `output` is `netsh wlan show profiles name=*` (or `name="X"`): one
/// section per profile with a `Name` line followed by its `SSID name`
/// lines. Returns the first profile listing `ssid`, or `None`.
pub fn find_profile_from_ssid(
    loc: &LocalizationMap,
    output: &str,
    ssid: &str,
) -> Result<Option<String>, CoreError> {
    let mut current: Option<&str> = None;
    let mut seen_name = false;
    let mut seen_ssid_name = false;
    let mut found: Option<String> = None;

    for line in output.lines() {
        let Some((label, value)) = split_label(line) else {
            continue;
        };
        match loc.lookup(label) {
            Some(WifiField::Name) => {
                seen_name = true;
                current = Some(value);
            }
            Some(WifiField::SsidName) => {
                seen_ssid_name = true;
                if found.is_none() && unquote(value) == ssid {
                    found = current.map(str::to_owned);
                }
            }
            _ => {}
        }
    }

    if !seen_name {
        return Err(CoreError::MissingProfileName);
    }
    if !seen_ssid_name {
        return Err(CoreError::MissingSsidName);
    }
    Ok(found)
}
