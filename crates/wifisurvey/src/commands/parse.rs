//! `wifisurvey parse`: run a parser over captured command output.
//!
//! Works on any OS; nothing is executed.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use wifisurvey_core::parse::{
    IperfReport, candidate_networks, current_network, extract_throughput, find_profile_from_ssid,
    parse_interfaces, parse_networks, parse_profiles, parse_system_profiler, parse_wdutil,
};
use wifisurvey_core::{LocalizationMap, Protocol, WifiRecord};

use crate::cli::{GlobalOpts, ParseArgs, ParseKind, ProtocolArg};
use crate::config;
use crate::error::CliError;
use crate::output::{self, NetworkRow};

#[derive(Debug, Serialize)]
struct ProfileName {
    profile: String,
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "Profile")]
    profile: String,
}

pub fn handle(args: &ParseArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let text = read_input(&args.file)?;
    let color = output::should_color(global.color);

    let single = |record: &WifiRecord| {
        output::render_single(
            global.output,
            record,
            |r| output::detail_table(output::wifi_fields(r, color)),
            output::wifi_line,
        )
    };
    let list = |records: &[WifiRecord]| {
        output::render_list(
            global.output,
            records,
            |r| NetworkRow::new(r, color),
            output::wifi_line,
        )
    };

    let out = match args.kind {
        ParseKind::Wdutil => single(&parse_wdutil(&text)?)?,

        ParseKind::SystemProfiler => {
            let report = parse_system_profiler(&text)?;
            let interface = match &global.interface {
                Some(name) => name.clone(),
                None => report
                    .interface_names()
                    .first()
                    .map(|name| (*name).to_owned())
                    .ok_or_else(|| CliError::Parse {
                        message: "system_profiler report lists no Wi-Fi interface".into(),
                    })?,
            };
            if args.candidates {
                list(&candidate_networks(&report, &interface))?
            } else {
                let record =
                    current_network(&report, &interface).ok_or_else(|| CliError::Parse {
                        message: format!("no current network on {interface}"),
                    })?;
                single(&record)?
            }
        }

        ParseKind::NetshInterfaces => single(&parse_interfaces(&*localization(global)?, &text)?)?,

        ParseKind::NetshNetworks => list(&parse_networks(&*localization(global)?, &text))?,

        ParseKind::NetshProfiles => {
            let names: Vec<ProfileName> = parse_profiles(&*localization(global)?, &text)
                .into_iter()
                .map(|profile| ProfileName { profile })
                .collect();
            output::render_list(
                global.output,
                &names,
                |p| ProfileRow {
                    profile: p.profile.clone(),
                },
                |p| p.profile.clone(),
            )?
        }

        ParseKind::NetshProfile => {
            let ssid = args.ssid.as_deref().ok_or_else(|| CliError::Validation {
                field: "ssid".into(),
                reason: "required for netsh-profile".into(),
            })?;
            let profile = find_profile_from_ssid(&*localization(global)?, &text, ssid)?
                .ok_or_else(|| CliError::NoSavedProfile { ssid: ssid.into() })?;
            output::render_single(
                global.output,
                &ProfileName { profile },
                |p| p.profile.clone(),
                |p| p.profile.clone(),
            )?
        }

        ParseKind::Iperf => {
            let protocol = match args.protocol {
                ProtocolArg::Tcp => Protocol::Tcp,
                ProtocolArg::Udp => Protocol::Udp,
            };
            let report = IperfReport::from_json(&text)?;
            let result = extract_throughput(&report, protocol)?;
            output::render_single(
                global.output,
                &result,
                |r| output::detail_table(output::phase_fields(r)),
                |r| format!("{:.2}", r.mbps()),
            )?
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}

fn read_input(path: &Path) -> Result<String, CliError> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Locale dictionaries of the active profile, if any config exists.
fn localization(global: &GlobalOpts) -> Result<Arc<LocalizationMap>, CliError> {
    let cfg = config::load_config_or_default();
    let locales_dir = cfg
        .profile(global.profile.as_deref())
        .ok()
        .and_then(|(_, profile)| profile.locales_dir);
    config::localization(locales_dir.as_deref())
}
