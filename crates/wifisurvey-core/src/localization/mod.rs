//! Reverse lookup from localized `netsh` labels to canonical fields.
//!
//! `netsh wlan` prints its labels in the OS display language. Each locale
//! ships a dictionary (`locales/<lang>.json`) mapping the label text to a
//! [`WifiField`]; all dictionaries are merged into one [`LocalizationMap`]
//! keyed by raw label text. The locale is not tracked at lookup time, so a
//! label that two dictionaries map to different fields is a load error.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::debug;

use crate::error::CoreError;

/// Canonical field identifiers. Parsing downstream of the lookup only ever
/// sees these, never raw label text.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum WifiField {
    Name,
    Ssid,
    Bssid,
    SignalStrength,
    Channel,
    TxRate,
    PhyMode,
    Security,
    Band,
    SsidName,
    Profile,
    Rssi,
    ChannelWidth,
}

const BUILTIN: &[(&str, &str)] = &[
    ("en.json", include_str!("locales/en.json")),
    ("de.json", include_str!("locales/de.json")),
    ("fr.json", include_str!("locales/fr.json")),
    ("it.json", include_str!("locales/it.json")),
    ("es.json", include_str!("locales/es.json")),
];

#[derive(Debug, Deserialize)]
struct LocaleDictionary {
    locale: String,
    labels: BTreeMap<String, WifiField>,
}

/// Merged, read-only label → field table. Share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct LocalizationMap {
    labels: HashMap<String, WifiField>,
    locales: Vec<String>,
}

impl LocalizationMap {
    /// Dictionaries compiled into the binary (`en`, `de`, `fr`, `it`, `es`).
    pub fn builtin() -> Result<Self, CoreError> {
        let mut map = Self::default();
        for (name, json) in BUILTIN {
            map.merge(name, json)?;
        }
        Ok(map)
    }

    /// Built-in dictionaries plus every `*.json` file in `dir`.
    ///
    /// Call again to pick up edited files; the result replaces the old map.
    pub fn load_dir(dir: &Path) -> Result<Self, CoreError> {
        let mut map = Self::builtin()?;

        let entries = std::fs::read_dir(dir).map_err(|e| CoreError::LocaleDictionary {
            source_name: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        let mut paths: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        for path in paths {
            let name = path.display().to_string();
            let json =
                std::fs::read_to_string(&path).map_err(|e| CoreError::LocaleDictionary {
                    source_name: name.clone(),
                    reason: e.to_string(),
                })?;
            map.merge(&name, &json)?;
        }
        Ok(map)
    }

    /// Merge one dictionary document into the table.
    pub fn merge(&mut self, source_name: &str, json: &str) -> Result<(), CoreError> {
        let dictionary: LocaleDictionary =
            serde_json::from_str(json).map_err(|e| CoreError::LocaleDictionary {
                source_name: source_name.to_owned(),
                reason: e.to_string(),
            })?;

        for (label, field) in dictionary.labels {
            let label = label.trim().to_owned();
            if let Some(existing) = self.labels.get(&label) {
                if *existing != field {
                    return Err(CoreError::LocaleDictionary {
                        source_name: source_name.to_owned(),
                        reason: format!("label \"{label}\" maps to both {existing} and {field}"),
                    });
                }
                continue;
            }
            self.labels.insert(label, field);
        }

        debug!(
            locale = %dictionary.locale,
            source = source_name,
            total_labels = self.labels.len(),
            "merged locale dictionary"
        );
        if !self.locales.contains(&dictionary.locale) {
            self.locales.push(dictionary.locale);
        }
        Ok(())
    }

    /// Canonical field for a label as printed by the OS, if known.
    pub fn lookup(&self, label: &str) -> Option<WifiField> {
        self.labels.get(label.trim()).copied()
    }

    /// Locale codes merged so far, in load order.
    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
