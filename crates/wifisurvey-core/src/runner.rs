// ── Subprocess runner ──
//
// Every OS tool and the throughput client go through `CommandRunner`.
// Production code uses `ShellRunner`; tests script the outputs.

use std::future::Future;
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::error::CoreError;

/// Captured output of a successful command, trailing whitespace trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Executes shell commands.
///
/// A non-zero exit status is an error ([`CoreError::Command`]), so probes
/// can use success/failure directly as their condition.
pub trait CommandRunner: Send + Sync {
    /// Run `command`, writing `stdin` (plus a newline) to its standard input.
    ///
    /// Secrets such as the sudo password travel through `stdin` so they never
    /// appear in the command line or in logs.
    fn run_with_input(
        &self,
        command: &str,
        stdin: Option<&str>,
    ) -> impl Future<Output = Result<CommandOutput, CoreError>> + Send;

    fn run(&self, command: &str) -> impl Future<Output = Result<CommandOutput, CoreError>> + Send {
        self.run_with_input(command, None)
    }
}

impl<R: CommandRunner> CommandRunner for Arc<R> {
    fn run_with_input(
        &self,
        command: &str,
        stdin: Option<&str>,
    ) -> impl Future<Output = Result<CommandOutput, CoreError>> + Send {
        (**self).run_with_input(command, stdin)
    }
}

#[cfg(windows)]
const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;

/// Runs commands through the platform shell (`sh -c` or `cmd /C`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl ShellRunner {
    fn command(command: &str) -> Command {
        let mut cmd = if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", command]);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", command]);
            cmd
        };
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group: a terminal Ctrl-C reaches only this process,
        // never the step in flight.
        #[cfg(unix)]
        cmd.process_group(0);
        #[cfg(windows)]
        cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
        cmd
    }
}

impl CommandRunner for ShellRunner {
    async fn run_with_input(
        &self,
        command: &str,
        stdin: Option<&str>,
    ) -> Result<CommandOutput, CoreError> {
        debug!(command, "running");
        let failed = |status: Option<i32>, stderr: String| CoreError::Command {
            command: command.to_owned(),
            status,
            stderr,
        };

        let mut cmd = Self::command(command);
        cmd.stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        let mut child = cmd.spawn().map_err(|e| failed(None, e.to_string()))?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            // A command that never reads stdin closes the pipe early; that is
            // not a failure of the command itself.
            if let Err(e) = pipe.write_all(format!("{input}\n").as_bytes()).await {
                debug!(command, error = %e, "stdin not consumed");
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| failed(None, e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_owned();
        trace!(command, %stdout, %stderr, "command output");

        if !output.status.success() {
            return Err(failed(output.status.code(), stderr));
        }
        Ok(CommandOutput { stdout, stderr })
    }
}
