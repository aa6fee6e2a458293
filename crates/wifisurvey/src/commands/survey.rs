//! `wifisurvey survey`: one end-to-end measurement with a live spinner.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use wifisurvey_core::{
    ProgressUpdate, ShellRunner, SurveyContext, SurveyOutcome, SurveyResults, Surveyor,
    ThroughputResults,
};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::commands::system_wifi;
use crate::config;
use crate::error::CliError;
use crate::output::{self, FieldRow};

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let resolved = config::resolve(global)?;
    let platform = system_wifi(&resolved)?;
    debug!(platform = %platform.kind(), profile = %resolved.profile_name, "starting survey");
    let surveyor = Surveyor::new(platform, ShellRunner, resolved.settings);

    let cancel = CancellationToken::new();
    let (tx, rx) = mpsc::unbounded_channel();
    let ctx = SurveyContext::new()
        .with_cancel(cancel.clone())
        .with_progress(tx);

    let spinner = spinner(global);
    let progress = tokio::spawn(follow_progress(rx, spinner.clone()));
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after the current step");
            cancel.cancel();
        }
    });

    let outcome = surveyor.run(&ctx).await;
    interrupt.abort();
    // Closes the progress channel so the follower finishes.
    drop(ctx);
    let _ = progress.await;
    spinner.finish_and_clear();

    match outcome? {
        SurveyOutcome::Completed(results) => {
            let color = output::should_color(global.color);
            let out = output::render_single(
                global.output,
                &*results,
                |r| detail(r, color),
                line,
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        SurveyOutcome::Cancelled => Err(CliError::Cancelled),
    }
}

// ── Progress ─────────────────────────────────────────────────────────

/// Spinner on stderr for interactive table output, hidden otherwise.
fn spinner(global: &GlobalOpts) -> ProgressBar {
    if global.quiet || global.output != OutputFormat::Table {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

async fn follow_progress(mut rx: mpsc::UnboundedReceiver<ProgressUpdate>, bar: ProgressBar) {
    while let Some(update) = rx.recv().await {
        debug!(header = %update.header, kind = %update.kind, "progress");
        bar.set_message(progress_message(&update));
    }
}

/// One-line spinner message: header, then the status body.
fn progress_message(update: &ProgressUpdate) -> String {
    format!(
        "{}  {}",
        update.header,
        update.status_text().replace('\n', "  ")
    )
}

// ── Rendering ────────────────────────────────────────────────────────

fn detail(results: &SurveyResults, color: bool) -> String {
    let mut rows = output::wifi_fields(&results.wifi, color);
    match &results.throughput {
        Some(t) => rows.extend(throughput_rows(t)),
        None => rows.push(FieldRow {
            field: "Throughput",
            value: "Not performed".into(),
        }),
    }
    rows.push(FieldRow {
        field: "Measured at",
        value: results.timestamp.to_rfc3339(),
    });
    output::detail_table(rows)
}

fn throughput_rows(t: &ThroughputResults) -> Vec<FieldRow> {
    let pair = |down: f64, up: f64| format!("{down:.2} / {up:.2} Mbps");
    vec![
        FieldRow {
            field: "TCP down / up",
            value: pair(t.tcp_download.mbps(), t.tcp_upload.mbps()),
        },
        FieldRow {
            field: "UDP down / up",
            value: pair(t.udp_download.mbps(), t.udp_upload.mbps()),
        },
    ]
}

fn line(results: &SurveyResults) -> String {
    let wifi = output::wifi_line(&results.wifi);
    match &results.throughput {
        Some(t) => format!(
            "{wifi}\t{:.2}\t{:.2}\t{:.2}\t{:.2}",
            t.tcp_download.mbps(),
            t.tcp_upload.mbps(),
            t.udp_download.mbps(),
            t.udp_upload.mbps()
        ),
        None => wifi,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_message_is_single_line() {
        let msg = progress_message(&ProgressUpdate::initial());
        assert_eq!(
            msg,
            "Measurement beginning  Signal strength: -  TCP: -/- Mbps  UDP: -/- Mbps"
        );
    }

    #[test]
    fn error_update_reads_as_error() {
        let msg = progress_message(&ProgressUpdate::error());
        assert_eq!(msg, "Error  Error taking measurements");
    }
}
