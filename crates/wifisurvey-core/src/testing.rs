// Scripted collaborators for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::config::SurveySettings;
use crate::error::CoreError;
use crate::model::WifiRecord;
use crate::platform::WifiPlatform;
use crate::runner::{CommandOutput, CommandRunner};

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Ok(String),
    Fail,
}

/// Replies to commands by prefix. Each prefix has a queue; its last reply
/// repeats once the queue is drained. Unscripted commands fail with 127.
#[derive(Debug, Default)]
pub(crate) struct ScriptedRunner {
    script: Mutex<Vec<(String, VecDeque<Reply>)>>,
    calls: Mutex<Vec<(String, Option<String>)>>,
    cancel_on: Option<(String, CancellationToken)>,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on(self, prefix: &str, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((prefix.to_owned(), replies.into_iter().collect()));
        self
    }

    pub(crate) fn ok(self, prefix: &str, stdout: &str) -> Self {
        self.on(prefix, [Reply::Ok(stdout.to_owned())])
    }

    /// Cancel `token` while running the first command matching `prefix`.
    pub(crate) fn cancel_on(mut self, prefix: &str, token: CancellationToken) -> Self {
        self.cancel_on = Some((prefix.to_owned(), token));
        self
    }

    pub(crate) fn calls(&self) -> Vec<(String, Option<String>)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|(command, _)| command).collect()
    }

    fn next_reply(&self, command: &str) -> Option<Reply> {
        let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
        let (_, queue) = script
            .iter_mut()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl CommandRunner for ScriptedRunner {
    async fn run_with_input(
        &self,
        command: &str,
        stdin: Option<&str>,
    ) -> Result<CommandOutput, CoreError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((command.to_owned(), stdin.map(str::to_owned)));

        if let Some((prefix, token)) = &self.cancel_on {
            if command.starts_with(prefix.as_str()) {
                token.cancel();
            }
        }

        match self.next_reply(command) {
            Some(Reply::Ok(stdout)) => Ok(CommandOutput {
                stdout,
                stderr: String::new(),
            }),
            Some(Reply::Fail) => Err(CoreError::Command {
                command: command.to_owned(),
                status: Some(1),
                stderr: "scripted failure".into(),
            }),
            None => Err(CoreError::Command {
                command: command.to_owned(),
                status: Some(127),
                stderr: "not scripted".into(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum ScanReply {
    Ok(WifiRecord),
    /// Fails as an unlocalized `netsh` output would.
    Fail,
}

/// Platform whose scans replay a queue (last reply repeats).
#[derive(Debug)]
pub(crate) struct ScriptedPlatform {
    scans: Mutex<VecDeque<ScanReply>>,
    scan_count: AtomicUsize,
    restart_count: AtomicUsize,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl ScriptedPlatform {
    pub(crate) fn new(scans: impl IntoIterator<Item = ScanReply>) -> Self {
        Self {
            scans: Mutex::new(scans.into_iter().collect()),
            scan_count: AtomicUsize::new(0),
            restart_count: AtomicUsize::new(0),
            cancel_after: None,
        }
    }

    /// Cancel `token` once `count` scans have completed.
    pub(crate) fn cancel_after_scans(mut self, count: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((count, token));
        self
    }

    pub(crate) fn scans(&self) -> usize {
        self.scan_count.load(Ordering::SeqCst)
    }

    pub(crate) fn restarts(&self) -> usize {
        self.restart_count.load(Ordering::SeqCst)
    }
}

impl WifiPlatform for ScriptedPlatform {
    async fn preflight(&self, _settings: &SurveySettings) -> Result<(), CoreError> {
        Ok(())
    }

    async fn restart_radio(&self, _settings: &SurveySettings) -> Result<(), CoreError> {
        self.restart_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn scan(&self, _settings: &SurveySettings) -> Result<WifiRecord, CoreError> {
        let reply = {
            let mut scans = self.scans.lock().unwrap_or_else(PoisonError::into_inner);
            if scans.len() > 1 {
                scans.pop_front()
            } else {
                scans.front().cloned()
            }
        };
        let done = self.scan_count.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((count, token)) = &self.cancel_after {
            if done >= *count {
                token.cancel();
            }
        }
        match reply {
            Some(ScanReply::Ok(record)) => Ok(record),
            Some(ScanReply::Fail) | None => Err(CoreError::NotLocalized),
        }
    }

    async fn candidates(&self, _settings: &SurveySettings) -> Result<Vec<WifiRecord>, CoreError> {
        Ok(Vec::new())
    }
}
