//! Configuration for the wifisurvey CLI.
//!
//! TOML profiles, sudo-password resolution (env + plaintext), and
//! translation to `wifisurvey_core::SurveySettings`. The CLI layers its
//! flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wifisurvey_core::SurveySettings;

/// Environment variable consulted for the sudo password when a profile
/// names none of its own.
pub const SUDO_PASSWORD_ENV: &str = "WIFISURVEY_SUDO_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profile named '{name}'")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named survey profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// The profile `name`, or the default profile when `name` is `None`.
    ///
    /// A missing default profile yields an empty one so a bare
    /// `--server` invocation works without a config file.
    pub fn profile(&self, name: Option<&str>) -> Result<(String, Profile), ConfigError> {
        if let Some(name) = name {
            return self
                .profiles
                .get(name)
                .map(|p| (name.to_owned(), p.clone()))
                .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() });
        }
        let name = self.default_profile.as_deref().unwrap_or("default");
        Ok((
            name.to_owned(),
            self.profiles.get(name).cloned().unwrap_or_default(),
        ))
    }

    /// Make `name` the default profile. It must exist.
    pub fn set_default_profile(&mut self, name: &str) -> Result<(), ConfigError> {
        if !self.profiles.contains_key(name) {
            return Err(ConfigError::UnknownProfile { name: name.into() });
        }
        self.default_profile = Some(name.to_owned());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Seconds to wait for the throughput server in `check-server`.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

impl Defaults {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    5
}

/// A named survey profile.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// iperf3 server as `host` or `host:port`; `localhost` skips throughput.
    #[serde(default)]
    pub server: String,

    /// Seconds per throughput phase.
    #[serde(default = "default_duration")]
    pub duration: u32,

    /// Wi-Fi interface override (macOS), e.g. `en0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,

    /// Sudo password (plaintext, prefer `sudo_password_env`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sudo_password: Option<String>,

    /// Environment variable name holding the sudo password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sudo_password_env: Option<String>,

    /// Directory of extra `netsh` label dictionaries (`*.json`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locales_dir: Option<PathBuf>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            server: String::new(),
            duration: default_duration(),
            interface: None,
            sudo_password: None,
            sudo_password_env: None,
            locales_dir: None,
        }
    }
}

fn default_duration() -> u32 {
    10
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "wifisurvey", "wifisurvey").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("wifisurvey");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path` (missing file is fine) + `WIFISURVEY_*` environment.
///
/// Nested keys use a double underscore: `WIFISURVEY_DEFAULTS__OUTPUT=json`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("WIFISURVEY_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve the sudo password from the process environment and profile.
pub fn resolve_sudo_password(profile: &Profile) -> Option<SecretString> {
    resolve_sudo_password_with(profile, |name| std::env::var(name).ok())
}

/// Resolve the sudo password with an explicit environment lookup.
///
/// Order: the profile's `sudo_password_env` variable, then
/// [`SUDO_PASSWORD_ENV`], then the plaintext profile value. Empty values
/// are skipped.
pub fn resolve_sudo_password_with(
    profile: &Profile,
    env: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    let non_empty = |v: String| (!v.is_empty()).then_some(v);

    profile
        .sudo_password_env
        .as_deref()
        .and_then(&env)
        .and_then(non_empty)
        .or_else(|| env(SUDO_PASSWORD_ENV).and_then(non_empty))
        .or_else(|| profile.sudo_password.clone().and_then(non_empty))
        .map(SecretString::from)
}

/// Build `SurveySettings` from a profile, no CLI flag overrides.
pub fn profile_to_settings(profile: &Profile) -> Result<SurveySettings, ConfigError> {
    if profile.server.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation {
            field: "server".into(),
            reason: format!("'{}' contains whitespace", profile.server),
        });
    }
    Ok(SurveySettings {
        server: profile.server.clone(),
        duration_secs: profile.duration,
        sudo_password: resolve_sudo_password(profile),
        interface: profile.interface.clone(),
        ..SurveySettings::default()
    })
}
