//! Command definition, callbacks, and process-group termination

use crate::error::CommandError;
use std::path::PathBuf;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Callback invoked for each line of stdout or stderr
pub type LineCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Callback invoked once with the exit code after the process is reaped
pub type CompleteCallback = Arc<dyn Fn(i32) + Send + Sync>;

/// Callback invoked when the command fails to start or exits nonzero
pub type ErrorCallback = Arc<dyn Fn(&CommandError) + Send + Sync>;

/// Result of a captured command execution
#[derive(Debug, Clone, Default)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub duration: Duration,
}

impl CommandResult {
    /// True when the process exited with status zero
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Both streams concatenated, stdout first
    pub fn combined_output(&self) -> String {
        format!("{}{}", self.stdout, self.stderr)
    }
}

/// Handle that can terminate a running command's whole process group.
///
/// Cloneable and usable after the [`Command`] itself has been consumed by
/// [`Command::run_async`], which is how long-lived children (the Studio
/// process) are stopped later.
#[derive(Clone, Default)]
pub struct KillSwitch {
    pid: Arc<AtomicI32>,
}

impl KillSwitch {
    pub(crate) fn arm(&self, pid: u32) {
        self.pid.store(pid as i32, Ordering::SeqCst);
    }

    /// Returns the process id once the command has started
    pub fn pid(&self) -> Option<i32> {
        match self.pid.load(Ordering::SeqCst) {
            0 => None,
            pid => Some(pid),
        }
    }

    /// Terminate the process and all of its descendants.
    ///
    /// On Unix the child is spawned into its own process group, so a single
    /// SIGKILL to the negative pid reaps the whole subtree. Elsewhere this
    /// falls back to a tree kill of the direct child.
    pub fn kill_group(&self) -> Result<(), CommandError> {
        let pid = self.pid().ok_or(CommandError::NotStarted)?;

        #[cfg(unix)]
        {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            killpg(Pid::from_raw(pid), Signal::SIGKILL).map_err(|errno| CommandError::Kill {
                pid,
                message: errno.to_string(),
            })
        }

        #[cfg(not(unix))]
        {
            // Best-effort tree walk via taskkill
            std::process::Command::new("taskkill")
                .args(["/T", "/F", "/PID", &pid.to_string()])
                .output()
                .map(|_| ())
                .map_err(|e| CommandError::Kill {
                    pid,
                    message: e.to_string(),
                })
        }
    }
}

impl std::fmt::Debug for KillSwitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KillSwitch").field("pid", &self.pid()).finish()
    }
}

/// An external command with fluent configuration.
///
/// Built through [`crate::CommandBuilder`]; executed through the run methods
/// in this crate's runner module.
pub struct Command {
    pub(crate) program: String,
    pub(crate) args: Vec<String>,
    pub(crate) working_dir: Option<PathBuf>,
    pub(crate) env: Vec<(String, String)>,
    pub(crate) stream_output: bool,
    pub(crate) on_stdout: Option<LineCallback>,
    pub(crate) on_stderr: Option<LineCallback>,
    pub(crate) on_complete: Option<CompleteCallback>,
    pub(crate) on_error: Option<ErrorCallback>,
    pub(crate) kill: KillSwitch,
}

impl Command {
    pub(crate) fn new(program: String, args: Vec<String>) -> Self {
        Self {
            program,
            args,
            working_dir: None,
            env: Vec::new(),
            stream_output: false,
            on_stdout: None,
            on_stderr: None,
            on_complete: None,
            on_error: None,
            kill: KillSwitch::default(),
        }
    }

    /// Set the working directory
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Add an environment variable for the child
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Enable real-time line streaming in async mode
    pub fn stream_output(mut self) -> Self {
        self.stream_output = true;
        self
    }

    /// Set the per-stdout-line callback
    pub fn on_stdout(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_stdout = Some(Arc::new(f));
        self
    }

    /// Set the per-stderr-line callback
    pub fn on_stderr(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_stderr = Some(Arc::new(f));
        self
    }

    /// Set the completion callback, invoked once with the exit code
    pub fn on_complete(mut self, f: impl Fn(i32) + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Arc::new(f));
        self
    }

    /// Set the error callback, invoked on startup failure or nonzero exit
    pub fn on_error(mut self, f: impl Fn(&CommandError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(f));
        self
    }

    /// Handle for terminating this command's process group later
    pub fn kill_switch(&self) -> KillSwitch {
        self.kill.clone()
    }

    /// The full argv for display
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    pub(crate) fn fire_error(&self, err: &CommandError) {
        if let Some(cb) = &self.on_error {
            cb(err);
        }
    }

    pub(crate) fn fire_complete(&self, code: i32) {
        if let Some(cb) = &self.on_complete {
            cb(code);
        }
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("working_dir", &self.working_dir)
            .field("stream_output", &self.stream_output)
            .finish()
    }
}
