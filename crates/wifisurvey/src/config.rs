//! CLI configuration: thin wrapper around `wifisurvey_config` shared types.
//!
//! Adds the resolution that layers `GlobalOpts` flag overrides (--server,
//! --duration, --interface, --ask-password) over the active profile.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::parser::ValueSource;
use clap::{ArgMatches, ValueEnum};
use secrecy::SecretString;
use tracing::warn;

use wifisurvey_core::{LocalizationMap, SurveySettings};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use wifisurvey_config::{
    Config, Defaults, Profile, config_path, load_config, load_config_or_default, save_config,
};

/// Everything a command needs to talk to the OS tools.
#[derive(Debug)]
pub struct Resolved {
    pub profile_name: String,
    pub settings: SurveySettings,
    pub locales_dir: Option<PathBuf>,
    /// Network timeout from `[defaults]`.
    pub timeout: Duration,
}

/// Apply CLI flag overrides to a profile. Flags win over profile values.
pub fn apply_overrides(mut profile: Profile, global: &GlobalOpts) -> Profile {
    if let Some(server) = &global.server {
        profile.server.clone_from(server);
    }
    if let Some(duration) = global.duration {
        profile.duration = duration;
    }
    if let Some(interface) = &global.interface {
        profile.interface = Some(interface.clone());
    }
    profile
}

/// Fill `--output` and `--color` from `[defaults]` when neither the flag nor
/// its env var was given.
pub fn apply_display_defaults(
    global: &mut GlobalOpts,
    matches: &ArgMatches,
    defaults: &Defaults,
) {
    if from_builtin_default(matches, "output") {
        if let Some(output) = parse_default("output", &defaults.output) {
            global.output = output;
        }
    }
    if from_builtin_default(matches, "color") {
        if let Some(color) = parse_default("color", &defaults.color) {
            global.color = color;
        }
    }
}

fn from_builtin_default(matches: &ArgMatches, id: &str) -> bool {
    matches!(
        matches.value_source(id),
        None | Some(ValueSource::DefaultValue)
    )
}

fn parse_default<T: ValueEnum>(key: &str, value: &str) -> Option<T> {
    T::from_str(value, true)
        .inspect_err(|e| warn!(key, value, error = %e, "ignoring invalid config default"))
        .ok()
}

/// Resolve the active profile plus flags into runtime settings.
///
/// A malformed config file is an error here, unlike `config show`.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = load_config()?;
    let (profile_name, profile) = cfg.profile(global.profile.as_deref()).map_err(|e| {
        match CliError::from(e) {
            CliError::ProfileNotFound { name, .. } => CliError::ProfileNotFound {
                name,
                available: available_profiles(&cfg),
            },
            other => other,
        }
    })?;
    let profile = apply_overrides(profile, global);
    tracing::debug!(profile = %profile_name, server = %profile.server, "resolved profile");

    let mut settings = wifisurvey_config::profile_to_settings(&profile)?;
    if global.ask_password {
        settings.sudo_password = Some(prompt_sudo_password()?);
    }

    Ok(Resolved {
        profile_name,
        settings,
        locales_dir: profile.locales_dir,
        timeout: cfg.defaults.timeout(),
    })
}

fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        return "(none)".into();
    }
    cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
}

fn prompt_sudo_password() -> Result<SecretString, CliError> {
    let password = rpassword::prompt_password("sudo password: ").map_err(|e| CliError::Prompt {
        reason: e.to_string(),
    })?;
    Ok(SecretString::from(password))
}

/// Built-in locale dictionaries, plus the profile's extra ones.
pub fn localization(locales_dir: Option<&Path>) -> Result<Arc<LocalizationMap>, CliError> {
    let map = match locales_dir {
        Some(dir) => LocalizationMap::load_dir(dir)?,
        None => LocalizationMap::builtin()?,
    };
    tracing::debug!(labels = map.len(), locales = ?map.locales(), "loaded localization");
    Ok(Arc::new(map))
}
