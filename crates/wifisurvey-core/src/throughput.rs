// ── Throughput runner ──
//
// One `iperf3 -J` invocation per phase. The client blocks for the full test
// duration, so a phase cannot be interrupted once started.

use std::time::Duration;

use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::config::{DEFAULT_IPERF_PORT, SurveySettings};
use crate::error::CoreError;
use crate::model::{Direction, ThroughputPhase, ThroughputPhaseResult};
use crate::parse::iperf::{IperfReport, extract_throughput};
use crate::runner::CommandRunner;

/// Split `host` or `host:port`. A bare IPv6 address keeps its colons.
pub fn split_server(address: &str) -> (&str, Option<u16>) {
    let address = address.trim();
    match address.rsplit_once(':') {
        Some((host, port)) if !host.contains(':') => match port.parse() {
            Ok(port) => (host, Some(port)),
            Err(_) => (address, None),
        },
        _ => (address, None),
    }
}

/// The client command line for one phase.
pub fn build_command(settings: &SurveySettings, phase: ThroughputPhase) -> String {
    let (host, port) = split_server(&settings.server);
    let mut command = format!("{} -c {host}", settings.iperf_command);
    if let Some(port) = port {
        command.push_str(&format!(" -p {port}"));
    }
    command.push_str(&format!(" -t {}", settings.duration_secs));
    if phase.direction == Direction::Download {
        command.push_str(" -R");
    }
    if phase.is_udp() {
        command.push_str(" -u -b 0");
    }
    command.push_str(" -J");
    command
}

/// Run one phase and extract its result.
pub async fn run_phase<R: CommandRunner>(
    runner: &R,
    settings: &SurveySettings,
    phase: ThroughputPhase,
) -> Result<ThroughputPhaseResult, CoreError> {
    let command = build_command(settings, phase);
    info!(%phase, "starting throughput phase");
    let out = runner.run(&command).await?;
    let report = IperfReport::from_json(&out.stdout)?;
    let result = extract_throughput(&report, phase.protocol)?;
    debug!(%phase, mbps = result.mbps(), "throughput phase finished");
    Ok(result)
}

/// Check that something accepts TCP connections at the server address.
pub async fn check_server(address: &str, timeout: Duration) -> Result<(), CoreError> {
    let (host, port) = split_server(address);
    let port = port.unwrap_or(DEFAULT_IPERF_PORT);
    let unreachable = |reason: String| CoreError::Unreachable {
        address: format!("{host}:{port}"),
        reason,
    };

    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_)) => {
            debug!(host, port, "throughput server reachable");
            Ok(())
        }
        Ok(Err(e)) => Err(unreachable(e.to_string())),
        Err(_) => Err(unreachable(format!(
            "no answer within {}ms",
            timeout.as_millis()
        ))),
    }
}
