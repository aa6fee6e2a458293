//! Config subcommand handlers.

use dialoguer::{Input, Select};
use serde::Serialize;
use tabled::Tabled;

use wifisurvey_config::SUDO_PASSWORD_ENV;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "********";

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Prompt {
        reason: e.to_string(),
    }
}

/// Copy of the config that is safe to print.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.sudo_password.is_some() {
            profile.sudo_password = Some(REDACTED.into());
        }
    }
    cfg
}

#[derive(Debug, Serialize)]
struct ProfileSummary {
    name: String,
    default: bool,
    server: String,
    duration: u32,
    interface: Option<String>,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "")]
    marker: &'static str,
    #[tabled(rename = "Profile")]
    name: String,
    #[tabled(rename = "Server")]
    server: String,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Interface")]
    interface: String,
}

fn summaries(cfg: &Config) -> Vec<ProfileSummary> {
    cfg.profiles
        .iter()
        .map(|(name, p)| ProfileSummary {
            name: name.clone(),
            default: cfg.default_profile.as_deref() == Some(name.as_str()),
            server: p.server.clone(),
            duration: p.duration,
            interface: p.interface.clone(),
        })
        .collect()
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(
                global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_else(|e| format!("# {e}")),
                |_| config::config_path().display().to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let out = output::render_list(
                global.output,
                &summaries(&cfg),
                |s| ProfileRow {
                    marker: if s.default { "*" } else { "" },
                    name: s.name.clone(),
                    server: s.server.clone(),
                    duration: format!("{}s", s.duration),
                    interface: s.interface.clone().unwrap_or_else(|| "auto".into()),
                },
                |s| s.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;
            cfg.set_default_profile(&name)
                .map_err(|_| CliError::ProfileNotFound {
                    name: name.clone(),
                    available: cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", "),
                })?;
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("Default profile: {name}");
            }
            Ok(())
        }
    }
}

// ── Init: interactive wizard ────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("wifisurvey configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let server: String = Input::new()
        .with_prompt("iperf3 server (host or host:port, 'localhost' skips throughput)")
        .default("localhost".into())
        .interact_text()
        .map_err(prompt_err)?;

    let duration: u32 = Input::new()
        .with_prompt("Seconds per throughput phase")
        .default(10)
        .validate_with(|d: &u32| if *d > 0 { Ok(()) } else { Err("must be greater than zero") })
        .interact_text()
        .map_err(prompt_err)?;

    let interface: String = Input::new()
        .with_prompt("Wi-Fi interface (empty to discover)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;

    // The sudo password only matters on macOS.
    let store_choices = &[
        "Read from an environment variable (recommended)",
        "Prompt each run (--ask-password)",
        "Save to config file (plaintext)",
    ];
    let store_selection = Select::new()
        .with_prompt("Where should the sudo password come from?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let (sudo_password_env, sudo_password) = match store_selection {
        0 => {
            let var: String = Input::new()
                .with_prompt("Environment variable")
                .default(SUDO_PASSWORD_ENV.into())
                .interact_text()
                .map_err(prompt_err)?;
            (Some(var), None)
        }
        1 => (None, None),
        _ => {
            let pass = rpassword::prompt_password("sudo password: ").map_err(prompt_err)?;
            if pass.is_empty() {
                return Err(CliError::Validation {
                    field: "sudo_password".into(),
                    reason: "password cannot be empty".into(),
                });
            }
            (None, Some(pass))
        }
    };

    let profile = Profile {
        server: server.trim().to_owned(),
        duration,
        interface: Some(interface.trim().to_owned()).filter(|i| !i.is_empty()),
        sudo_password,
        sudo_password_env,
        locales_dir: None,
    };

    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    config::save_config(&cfg)?;

    eprintln!("\nConfiguration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: wifisurvey check-server");
    Ok(())
}
