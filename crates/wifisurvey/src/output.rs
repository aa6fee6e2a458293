//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one line per item.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use wifisurvey_core::{ThroughputPhaseResult, WifiRecord};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Signal percent, green/yellow/red by quality.
pub fn paint_signal(percent: u8, color: bool) -> String {
    let text = format!("{percent}%");
    if !color {
        return text;
    }
    match percent {
        70.. => text.green().to_string(),
        40..70 => text.yellow().to_string(),
        _ => text.red().to_string(),
    }
}

pub fn paint_ok(text: &str, color: bool) -> String {
    if color {
        text.green().to_string()
    } else {
        text.to_owned()
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable items in the chosen format.
///
/// - `table`: maps each item to a `Tabled` row
/// - `json` / `json-compact` / `yaml`: serializes the original data
/// - `plain`: calls `line_fn` on each item
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    line_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    Ok(match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Plain => data.iter().map(line_fn).collect::<Vec<_>>().join("\n"),
    })
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views are
/// field/value tables rather than derived rows.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    line_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize + ?Sized,
{
    Ok(match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => serde_json::to_string_pretty(data)?,
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?,
        OutputFormat::Plain => line_fn(data),
    })
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

// ── Shared row types ─────────────────────────────────────────────────

#[derive(Tabled)]
pub struct FieldRow {
    #[tabled(rename = "Field")]
    pub field: &'static str,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Two-column field/value table.
pub fn detail_table(rows: Vec<FieldRow>) -> String {
    render_table(&rows)
}

#[derive(Tabled)]
pub struct NetworkRow {
    #[tabled(rename = "SSID")]
    pub ssid: String,
    #[tabled(rename = "BSSID")]
    pub bssid: String,
    #[tabled(rename = "Signal")]
    pub signal: String,
    #[tabled(rename = "RSSI")]
    pub rssi: String,
    #[tabled(rename = "Channel")]
    pub channel: u32,
    #[tabled(rename = "Band")]
    pub band: String,
    #[tabled(rename = "Width")]
    pub width: String,
    #[tabled(rename = "PHY")]
    pub phy_mode: String,
    #[tabled(rename = "Security")]
    pub security: String,
}

impl NetworkRow {
    pub fn new(record: &WifiRecord, color: bool) -> Self {
        Self {
            ssid: record.ssid.clone(),
            bssid: record.bssid.clone(),
            signal: paint_signal(record.signal_strength, color),
            rssi: format!("{} dBm", record.rssi),
            channel: record.channel,
            band: format!("{} GHz", record.band),
            width: width(record.channel_width),
            phy_mode: record.phy_mode.clone(),
            security: record.security.clone(),
        }
    }
}

fn width(mhz: u32) -> String {
    if mhz == 0 {
        "-".into()
    } else {
        format!("{mhz} MHz")
    }
}

/// Field/value rows for one association.
pub fn wifi_fields(record: &WifiRecord, color: bool) -> Vec<FieldRow> {
    vec![
        FieldRow { field: "SSID", value: record.ssid.clone() },
        FieldRow { field: "BSSID", value: record.bssid.clone() },
        FieldRow {
            field: "Signal",
            value: paint_signal(record.signal_strength, color),
        },
        FieldRow { field: "RSSI", value: format!("{} dBm", record.rssi) },
        FieldRow { field: "Channel", value: record.channel.to_string() },
        FieldRow { field: "Band", value: format!("{} GHz", record.band) },
        FieldRow { field: "Width", value: width(record.channel_width) },
        FieldRow { field: "Tx rate", value: format!("{} Mbps", record.tx_rate) },
        FieldRow { field: "PHY mode", value: record.phy_mode.clone() },
        FieldRow { field: "Security", value: record.security.clone() },
    ]
}

/// Tab-separated one-liner for `--output plain`.
pub fn wifi_line(record: &WifiRecord) -> String {
    format!(
        "{}\t{}\t{}\t{}",
        record.ssid, record.bssid, record.signal_strength, record.channel
    )
}

/// Field/value rows for one throughput phase.
pub fn phase_fields(result: &ThroughputPhaseResult) -> Vec<FieldRow> {
    let optional = |value: Option<String>| value.unwrap_or_else(|| "-".into());
    vec![
        FieldRow { field: "Throughput", value: format!("{:.2} Mbps", result.mbps()) },
        FieldRow { field: "Retransmits", value: result.retransmits.to_string() },
        FieldRow {
            field: "Jitter",
            value: optional(result.jitter_ms.map(|ms| format!("{ms:.3} ms"))),
        },
        FieldRow {
            field: "Lost packets",
            value: optional(result.lost_packets.map(|n| n.to_string())),
        },
        FieldRow {
            field: "Packets received",
            value: optional(result.packets_received.map(|n| n.to_string())),
        },
    ]
}
