//! The survey orchestrator.
//!
//! One [`Surveyor::run`] sequences a full measurement:
//!
//! ```text
//! Idle → Preflight → SeekingSignal → Measuring{scan₀ → tcpDown → tcpUp →
//!        scan₁ → udpDown → udpUp → scan₂} → Done | Cancelled | Error
//! ```
//!
//! External operations never overlap. Cancellation is checked between
//! sub-steps only, so a running throughput phase always completes first.
//! Progress goes to an optional channel the caller drains; a closed receiver
//! does not affect the run.

use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, info_span, trace, warn};
use uuid::Uuid;

use crate::config::SurveySettings;
use crate::error::CoreError;
use crate::model::{
    Direction, NOT_PERFORMED, ProgressKind, ProgressUpdate, SurveyOutcome, SurveyResults,
    SurveyState, ThroughputPhase, ThroughputResults, WifiRecord, format_partial_throughput,
    format_throughput,
};
use crate::platform::WifiPlatform;
use crate::runner::CommandRunner;
use crate::throughput::run_phase;

/// The Measuring phase runs at most this many times.
const MAX_ATTEMPTS: u32 = 2;

// ── Context ─────────────────────────────────────────────────────────

/// Per-run cancellation and progress plumbing.
#[derive(Debug, Clone, Default)]
pub struct SurveyContext {
    cancel: CancellationToken,
    progress: Option<UnboundedSender<ProgressUpdate>>,
}

impl SurveyContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: UnboundedSender<ProgressUpdate>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn emit(&self, update: &ProgressUpdate) {
        trace!(header = %update.header, strength = %update.strength, "progress");
        if let Some(tx) = &self.progress {
            if tx.send(update.clone()).is_err() {
                trace!("progress receiver dropped");
            }
        }
    }
}

// ── Orchestrator ────────────────────────────────────────────────────

/// Runs surveys against one platform with one set of settings.
#[derive(Debug)]
pub struct Surveyor<P, R> {
    platform: P,
    runner: R,
    settings: SurveySettings,
}

/// What one successful Measuring pass produced.
struct Measurement {
    wifi: WifiRecord,
    throughput: Option<ThroughputResults>,
}

/// Running state of the status message within one attempt.
struct Tracker<'a> {
    ctx: &'a SurveyContext,
    update: ProgressUpdate,
    strengths: Vec<u8>,
}

impl<'a> Tracker<'a> {
    fn new(ctx: &'a SurveyContext, header: &str) -> Self {
        Self {
            ctx,
            update: ProgressUpdate::with_header(header),
            strengths: Vec::with_capacity(3),
        }
    }

    fn record_scan(&mut self, scan: &WifiRecord) {
        self.strengths.push(scan.signal_strength);
        self.update.strength = self.average().to_string();
    }

    /// Rounded mean of the signal percentages seen so far (halves round up).
    fn average(&self) -> u8 {
        let count = u32::try_from(self.strengths.len()).unwrap_or(u32::MAX);
        if count == 0 {
            return 0;
        }
        let sum: u32 = self.strengths.iter().copied().map(u32::from).sum();
        u8::try_from((sum * 2 + count) / (count * 2)).unwrap_or(100)
    }

    fn emit(&self) {
        self.ctx.emit(&self.update);
    }

    /// Sub-step boundary: report cancellation, otherwise publish progress.
    fn cancelled_or_emit(&self) -> bool {
        if self.ctx.is_cancelled() {
            info!("survey cancelled");
            return true;
        }
        self.emit();
        false
    }
}

impl<P: WifiPlatform, R: CommandRunner> Surveyor<P, R> {
    pub fn new(platform: P, runner: R, settings: SurveySettings) -> Self {
        Self {
            platform,
            runner,
            settings,
        }
    }

    pub fn settings(&self) -> &SurveySettings {
        &self.settings
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Run one measurement.
    ///
    /// Returns [`SurveyOutcome::Cancelled`] when the context is cancelled
    /// between sub-steps. On any error a final `Done`/`Error` progress
    /// message is emitted before the error is returned.
    pub async fn run(&self, ctx: &SurveyContext) -> Result<SurveyOutcome, CoreError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("survey", %run_id);
        let result = self.run_inner(ctx, run_id).instrument(span).await;
        if let Err(e) = &result {
            error!(%run_id, error = %e, "survey failed");
            enter(SurveyState::Error);
            ctx.emit(&ProgressUpdate::error());
        }
        result
    }

    async fn run_inner(
        &self,
        ctx: &SurveyContext,
        run_id: Uuid,
    ) -> Result<SurveyOutcome, CoreError> {
        enter(SurveyState::Idle);
        ctx.emit(&ProgressUpdate::initial());

        enter(SurveyState::Preflight);
        self.settings.validate()?;
        self.platform.preflight(&self.settings).await?;

        enter(SurveyState::SeekingSignal);
        ctx.emit(&ProgressUpdate::with_header("Seeking best Wi-Fi"));
        self.platform.restart_radio(&self.settings).await?;
        if ctx.is_cancelled() {
            return Ok(cancelled());
        }

        enter(SurveyState::Measuring);
        ctx.emit(&ProgressUpdate::with_header("Measuring Wi-Fi"));
        let mut attempt = 1;
        let measurement = loop {
            match self.measure(ctx).await {
                Ok(Some(measurement)) => break measurement,
                Ok(None) => return Ok(cancelled()),
                Err(e) if ctx.is_cancelled() => {
                    info!(error = %e, "measurement failed after cancellation, not retrying");
                    return Ok(cancelled());
                }
                Err(e) if attempt < MAX_ATTEMPTS => {
                    warn!(attempt, error = %e, "measurement attempt failed, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        };

        enter(SurveyState::Done);
        Ok(SurveyOutcome::Completed(Box::new(SurveyResults {
            run_id,
            timestamp: Utc::now(),
            wifi: measurement.wifi,
            throughput: measurement.throughput,
        })))
    }

    /// One Measuring pass. `Ok(None)` means cancelled.
    async fn measure(&self, ctx: &SurveyContext) -> Result<Option<Measurement>, CoreError> {
        let settings = &self.settings;
        let with_throughput = settings.performs_throughput();
        let mut tracker = Tracker::new(ctx, "Measuring Wi-Fi");
        let mut throughput = ThroughputResults::default();
        let [tcp_down, tcp_up, udp_down, udp_up] = ThroughputPhase::ALL;

        let first = self.platform.scan(settings).await?;
        debug!(ssid = %first.ssid, bssid = %first.bssid, signal = first.signal_strength, "first scan");
        tracker.record_scan(&first);
        if tracker.cancelled_or_emit() {
            return Ok(None);
        }

        if with_throughput {
            for phase in [tcp_down, tcp_up] {
                self.throughput_step(&mut tracker, &mut throughput, phase)
                    .await?;
                if tracker.cancelled_or_emit() {
                    return Ok(None);
                }
            }
        } else {
            NOT_PERFORMED.clone_into(&mut tracker.update.tcp);
            if tracker.cancelled_or_emit() {
                return Ok(None);
            }
        }

        let middle = self.platform.scan(settings).await?;
        tracker.record_scan(&middle);
        if tracker.cancelled_or_emit() {
            return Ok(None);
        }

        if with_throughput {
            for phase in [udp_down, udp_up] {
                self.throughput_step(&mut tracker, &mut throughput, phase)
                    .await?;
                if tracker.cancelled_or_emit() {
                    return Ok(None);
                }
            }
        } else {
            NOT_PERFORMED.clone_into(&mut tracker.update.udp);
            if tracker.cancelled_or_emit() {
                return Ok(None);
            }
        }

        let last = self.platform.scan(settings).await?;
        tracker.record_scan(&last);
        if ctx.is_cancelled() {
            info!("survey cancelled");
            return Ok(None);
        }

        if !same_association(&first, &last) {
            return Err(CoreError::Consistency {
                before: Box::new(first),
                after: Box::new(last),
            });
        }

        tracker.update.kind = ProgressKind::Done;
        "Measurement complete".clone_into(&mut tracker.update.header);
        tracker.emit();

        let mut wifi = first;
        wifi.set_signal_strength(tracker.average());
        Ok(Some(Measurement {
            wifi,
            throughput: with_throughput.then_some(throughput),
        }))
    }

    /// Run one throughput phase and fold it into the status line.
    async fn throughput_step(
        &self,
        tracker: &mut Tracker<'_>,
        results: &mut ThroughputResults,
        phase: ThroughputPhase,
    ) -> Result<(), CoreError> {
        let result = run_phase(&self.runner, &self.settings, phase).await?;
        results.set(phase, result);
        let line = match phase.direction {
            Direction::Download => format_partial_throughput(result.bits_per_second),
            Direction::Upload => {
                let down = ThroughputPhase::new(phase.protocol, Direction::Download);
                format_throughput(results.get(down).bits_per_second, result.bits_per_second)
            }
        };
        if phase.is_udp() {
            tracker.update.udp = line;
        } else {
            tracker.update.tcp = line;
        }
        Ok(())
    }
}

fn enter(state: SurveyState) {
    debug!(%state, "survey state");
}

fn cancelled() -> SurveyOutcome {
    enter(SurveyState::Cancelled);
    SurveyOutcome::Cancelled
}

/// Same access point, network, band and channel.
fn same_association(before: &WifiRecord, after: &WifiRecord) -> bool {
    before.bssid == after.bssid
        && before.ssid == after.ssid
        && before.band == after.band
        && before.channel == after.channel
}
