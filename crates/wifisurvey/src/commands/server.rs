//! `wifisurvey check-server`: is the iperf3 server accepting connections?

use std::time::Duration;

use serde::Serialize;

use wifisurvey_core::throughput::{check_server, split_server};

use crate::cli::{CheckServerArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output::{self, FieldRow};

#[derive(Debug, Serialize)]
struct ServerStatus {
    server: String,
    reachable: bool,
    throughput_enabled: bool,
}

pub async fn handle(args: &CheckServerArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let resolved = config::resolve(global)?;
    let settings = &resolved.settings;
    let server = settings.server.trim();
    if server.is_empty() {
        return Err(CliError::Settings {
            message: "Please set iperf3 server address".into(),
        });
    }

    let timeout = args.timeout.map_or(resolved.timeout, Duration::from_secs);
    tracing::debug!(server, host = split_server(server).0, ?timeout, "checking server");
    check_server(server, timeout).await?;

    let status = ServerStatus {
        server: server.to_owned(),
        reachable: true,
        throughput_enabled: settings.performs_throughput(),
    };
    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        &status,
        |s| {
            let mut rows = vec![
                FieldRow {
                    field: "Server",
                    value: s.server.clone(),
                },
                FieldRow {
                    field: "Reachable",
                    value: output::paint_ok("yes", color),
                },
            ];
            if !s.throughput_enabled {
                rows.push(FieldRow {
                    field: "Note",
                    value: "'localhost' disables the throughput test during surveys".into(),
                });
            }
            output::detail_table(rows)
        },
        |s| s.server.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
