//! `wifisurvey scan`: current association, visible networks, saved profiles.

use serde::Serialize;
use tabled::Tabled;

use wifisurvey_core::{SystemWifi, WifiPlatform};

use crate::cli::{GlobalOpts, ScanArgs};
use crate::commands::system_wifi;
use crate::config;
use crate::error::CliError;
use crate::output::{self, NetworkRow};

#[derive(Debug, Serialize)]
struct SavedProfile {
    name: String,
}

#[derive(Tabled)]
struct SavedProfileRow {
    #[tabled(rename = "Profile")]
    name: String,
}

pub async fn handle(args: &ScanArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let resolved = config::resolve(global)?;
    let wifi = system_wifi(&resolved)?;
    let settings = &resolved.settings;
    let color = output::should_color(global.color);

    let out = if args.saved_profiles {
        let SystemWifi::Windows(windows) = &wifi else {
            return Err(CliError::Unsupported {
                feature: "scan --saved-profiles".into(),
                platform: wifi.kind().to_string(),
            });
        };
        let profiles: Vec<SavedProfile> = windows
            .profiles()
            .await?
            .into_iter()
            .map(|name| SavedProfile { name })
            .collect();
        output::render_list(
            global.output,
            &profiles,
            |p| SavedProfileRow { name: p.name.clone() },
            |p| p.name.clone(),
        )?
    } else if args.candidates {
        let networks = wifi.candidates(settings).await?;
        output::render_list(
            global.output,
            &networks,
            |r| NetworkRow::new(r, color),
            output::wifi_line,
        )?
    } else {
        wifi.preflight(settings).await?;
        let record = wifi.scan(settings).await?;
        output::render_single(
            global.output,
            &record,
            |r| output::detail_table(output::wifi_fields(r, color)),
            output::wifi_line,
        )?
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
