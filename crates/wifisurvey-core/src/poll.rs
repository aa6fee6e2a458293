// ── Bounded polling ──
//
// Fixed-interval waits for OS state changes (interface address, link rate).
// Every wait has a mandatory timeout and ends in `CoreError::Timeout`
// instead of looping forever.

use std::future::Future;
use std::time::Duration;

use tracing::trace;

use crate::error::CoreError;
use crate::runner::CommandRunner;

/// What a command probe waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeTarget {
    /// Until the command exits successfully.
    Succeeds,
    /// Until the command fails.
    Fails,
}

/// Run `probe` every `interval` until it yields a value or `timeout` elapses.
///
/// The probe returns `Ok(None)` to keep waiting. Errors from the probe end
/// the wait immediately.
pub async fn poll_until<T, F, Fut>(
    what: &str,
    interval: Duration,
    timeout: Duration,
    mut probe: F,
) -> Result<T, CoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, CoreError>>,
{
    let attempt = async {
        let mut attempts = 0_u32;
        loop {
            attempts += 1;
            if let Some(value) = probe().await? {
                trace!(what, attempts, "poll satisfied");
                return Ok(value);
            }
            tokio::time::sleep(interval).await;
        }
    };

    tokio::time::timeout(timeout, attempt)
        .await
        .map_err(|_| CoreError::Timeout {
            what: what.to_owned(),
            after: timeout,
        })?
}

/// Poll `command` until its exit status matches `target`.
pub async fn poll_command<R: CommandRunner>(
    runner: &R,
    command: &str,
    target: ProbeTarget,
    interval: Duration,
    timeout: Duration,
) -> Result<(), CoreError> {
    poll_until(command, interval, timeout, move || async move {
        let succeeded = runner.run(command).await.is_ok();
        let done = match target {
            ProbeTarget::Succeeds => succeeded,
            ProbeTarget::Fails => !succeeded,
        };
        Ok(done.then_some(()))
    })
    .await
}
