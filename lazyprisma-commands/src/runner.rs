//! Command execution modes
//!
//! Four modes, mirroring how the coordinator consumes commands:
//! - [`Command::run`]: block, discard output, error on nonzero exit
//! - [`Command::run_with_output`]: block, capture both streams in full
//! - [`Command::run_and_stream`]: block, deliver output line-by-line
//! - [`Command::run_async`]: return immediately, run in a background task

use crate::command::{Command, CommandResult, KillSwitch, LineCallback};
use crate::error::CommandError;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

impl Command {
    fn build(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        // New process group so kill_group() reaps forked descendants too
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }

    fn spawn_error(&self, source: std::io::Error) -> CommandError {
        let err = CommandError::Spawn {
            program: self.program.clone(),
            source,
        };
        tracing::warn!(program = %self.program, error = %err, "failed to spawn command");
        self.fire_error(&err);
        err
    }

    /// Run to completion, discarding output.
    ///
    /// Fires `on_complete(0)` on success; fires `on_error` and returns the
    /// error on startup failure or nonzero exit.
    pub async fn run(&self) -> Result<(), CommandError> {
        let mut child = self
            .build()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(pid) = child.id() {
            self.kill.arm(pid);
        }

        let status = child.wait().await.map_err(CommandError::Wait)?;
        let code = status.code().unwrap_or(-1);
        if !status.success() {
            let err = CommandError::ExitStatus(code);
            self.fire_error(&err);
            return Err(err);
        }

        self.fire_complete(0);
        Ok(())
    }

    /// Run to completion, capturing stdout and stderr in full.
    ///
    /// Always produces a result record when the process could be started;
    /// a nonzero exit lands in `exit_code`, not in the error channel.
    pub async fn run_with_output(&self) -> Result<CommandResult, CommandError> {
        let start = Instant::now();
        let mut child = self
            .build()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(pid) = child.id() {
            self.kill.arm(pid);
        }

        let output = child.wait_with_output().await.map_err(CommandError::Wait)?;
        let exit_code = output.status.code().unwrap_or(-1);
        let result = CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code,
            duration: start.elapsed(),
        };

        if result.success() {
            self.fire_complete(0);
        } else {
            self.fire_error(&CommandError::ExitStatus(exit_code));
        }

        Ok(result)
    }

    /// Run to completion, delivering stdout and stderr line-by-line.
    ///
    /// Lines of a single stream arrive in order; there is no ordering across
    /// streams. `on_complete(exit_code)` fires exactly once, after both
    /// stream readers have drained and the process has been reaped.
    /// `on_error` fires additionally for nonzero exits.
    pub async fn run_and_stream(&self) -> Result<(), CommandError> {
        let mut child = self
            .build()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(pid) = child.id() {
            self.kill.arm(pid);
        }

        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(read_lines(stdout, self.on_stdout.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(read_lines(stderr, self.on_stderr.clone())));
        }
        for reader in readers {
            let _ = reader.await;
        }

        let status = child.wait().await.map_err(CommandError::Wait)?;
        let code = status.code().unwrap_or(-1);

        if !status.success() {
            self.fire_error(&CommandError::ExitStatus(code));
        }
        self.fire_complete(code);

        if status.success() {
            Ok(())
        } else {
            Err(CommandError::ExitStatus(code))
        }
    }

    /// Run in a background task and return immediately.
    ///
    /// Streams when [`Command::stream_output`] was set, captures otherwise.
    /// Completion and failure surface exclusively through the callbacks. The
    /// returned [`KillSwitch`] can stop the command (and its process group)
    /// at any later point.
    pub fn run_async(self) -> KillSwitch {
        let kill = self.kill_switch();
        tokio::spawn(async move {
            if self.stream_output {
                let _ = self.run_and_stream().await;
            } else {
                let _ = self.run_with_output().await;
            }
        });
        kill
    }
}

async fn read_lines<R: AsyncRead + Unpin>(stream: R, callback: Option<LineCallback>) {
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if let Some(cb) = &callback {
            cb(&line);
        }
    }
}
