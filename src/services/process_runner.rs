// External process runner
// Invokes the lecture toolchain (install, build, dev server) through the
// host shell. Process failures never surface as Err: spawn errors,
// non-zero exits, and timeouts all land in ProcessOutput with
// success=false so callers classify from one place.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

/// Default limit for one-shot commands (install, build)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Terminal result of a completed (or failed) command
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

impl ProcessOutput {
    fn spawn_failure(err: &io::Error) -> Self {
        let stderr = if err.kind() == io::ErrorKind::NotFound {
            format!("command not found (ENOENT): {err}")
        } else {
            format!("failed to spawn command: {err}")
        };
        Self {
            success: false,
            stdout: String::new(),
            stderr,
            exit_code: None,
        }
    }

    fn timed_out(limit: Duration) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: format!("command timed out after {}s", limit.as_secs()),
            exit_code: None,
        }
    }
}

/// Which stream a streamed chunk came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

/// Execution options for one command
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub cwd: PathBuf,
    pub env: Vec<(String, String)>,
    /// None disables the limit (interactive dev server)
    pub timeout: Option<Duration>,
}

impl RunOptions {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            env: Vec::new(),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    pub fn without_timeout(mut self) -> Self {
        self.timeout = None;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Strategy for turning a command line into a host-shell invocation.
/// Callers never branch on platform; they hold one of these.
pub trait ShellCommand: Send + Sync {
    fn build(&self, command_line: &str) -> (String, Vec<String>);
}

/// `sh -c <command>`
pub struct PosixShell;

impl ShellCommand for PosixShell {
    fn build(&self, command_line: &str) -> (String, Vec<String>) {
        ("sh".to_string(), vec!["-c".to_string(), command_line.to_string()])
    }
}

/// `cmd /C <command>`
pub struct WindowsShell;

impl ShellCommand for WindowsShell {
    fn build(&self, command_line: &str) -> (String, Vec<String>) {
        ("cmd".to_string(), vec!["/C".to_string(), command_line.to_string()])
    }
}

/// Shell for the current host platform
pub fn host_shell() -> Box<dyn ShellCommand> {
    if cfg!(target_os = "windows") {
        Box::new(WindowsShell)
    } else {
        Box::new(PosixShell)
    }
}

/// Handle to a started interactive session (dev server). The session
/// outlives the call that started it; `wait` attaches until it exits.
#[derive(Debug)]
pub struct SessionHandle {
    child: Option<Child>,
}

impl SessionHandle {
    /// Handle with no underlying process (used by test doubles)
    pub fn detached() -> Self {
        Self { child: None }
    }

    pub async fn wait(mut self) -> Option<i32> {
        match self.child.take() {
            Some(mut child) => child.wait().await.ok().and_then(|status| status.code()),
            None => None,
        }
    }
}

/// Abstraction over the external toolchain invocation, injected into the
/// build orchestrator so tests can substitute a scripted double.
pub trait ToolRunner: Send + Sync {
    /// Run a command to completion and collect its output
    async fn run(&self, command_line: &str, opts: &RunOptions) -> ProcessOutput;

    /// Run a command, delivering incremental output lines through
    /// `on_chunk` while still returning the same terminal result
    async fn run_streaming(
        &self,
        command_line: &str,
        opts: &RunOptions,
        on_chunk: &mut (dyn FnMut(StreamKind, &str) + Send),
    ) -> ProcessOutput;

    /// Start a long-lived foreground session (dev server); returns once
    /// the session is started, not once it ends
    fn start_session(&self, command_line: &str, cwd: &Path) -> io::Result<SessionHandle>;
}

/// ToolRunner backed by real child processes
pub struct ProcessRunner {
    shell: Box<dyn ShellCommand>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self {
            shell: host_shell(),
        }
    }

    pub fn with_shell(shell: Box<dyn ShellCommand>) -> Self {
        Self { shell }
    }

    fn command(&self, command_line: &str, cwd: &Path, env: &[(String, String)]) -> Command {
        let (program, args) = self.shell.build(command_line);
        let mut cmd = Command::new(program);
        cmd.args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // A timed-out future drops the child; make that kill it.
            .kill_on_drop(true);
        for (key, value) in env {
            cmd.env(key, value);
        }
        cmd
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRunner for ProcessRunner {
    async fn run(&self, command_line: &str, opts: &RunOptions) -> ProcessOutput {
        let mut cmd = self.command(command_line, &opts.cwd, &opts.env);
        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return ProcessOutput::spawn_failure(&e),
        };

        let waiting = child.wait_with_output();
        let output = match opts.timeout {
            Some(limit) => match tokio::time::timeout(limit, waiting).await {
                Ok(result) => result,
                Err(_) => return ProcessOutput::timed_out(limit),
            },
            None => waiting.await,
        };

        match output {
            Ok(output) => ProcessOutput {
                success: output.status.success(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit_code: output.status.code(),
            },
            Err(e) => ProcessOutput::spawn_failure(&e),
        }
    }

    async fn run_streaming(
        &self,
        command_line: &str,
        opts: &RunOptions,
        on_chunk: &mut (dyn FnMut(StreamKind, &str) + Send),
    ) -> ProcessOutput {
        let mut cmd = self.command(command_line, &opts.cwd, &opts.env);
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return ProcessOutput::spawn_failure(&e),
        };

        let (tx, mut rx) = mpsc::channel::<(StreamKind, String)>(64);

        if let Some(stdout) = child.stdout.take() {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if tx.send((StreamKind::Stdout, line)).await.is_err() {
                        break;
                    }
                }
            });
        }
        if let Some(stderr) = child.stderr.take() {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if tx.send((StreamKind::Stderr, line)).await.is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        let mut stdout = String::new();
        let mut stderr = String::new();
        let collect = async {
            while let Some((kind, line)) = rx.recv().await {
                on_chunk(kind, &line);
                match kind {
                    StreamKind::Stdout => {
                        stdout.push_str(&line);
                        stdout.push('\n');
                    }
                    StreamKind::Stderr => {
                        stderr.push_str(&line);
                        stderr.push('\n');
                    }
                }
            }
            child.wait().await
        };

        let status = match opts.timeout {
            Some(limit) => match tokio::time::timeout(limit, collect).await {
                Ok(result) => result,
                Err(_) => return ProcessOutput::timed_out(limit),
            },
            None => collect.await,
        };

        match status {
            Ok(status) => ProcessOutput {
                success: status.success(),
                stdout,
                stderr,
                exit_code: status.code(),
            },
            Err(e) => ProcessOutput::spawn_failure(&e),
        }
    }

    fn start_session(&self, command_line: &str, cwd: &Path) -> io::Result<SessionHandle> {
        let (program, args) = self.shell.build(command_line);
        let mut cmd = Command::new(program);
        // Inherited stdio: the session is a user-visible foreground process
        let child = cmd
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()?;
        Ok(SessionHandle { child: Some(child) })
    }
}
