//! # Command Executor
//!
//! Runs one command string through the system shell and hands back what it
//! printed. The call blocks until the shell process exits (or the optional
//! timeout fires); background jobs it leaves behind are not waited for.
//! Nothing here returns an error: a shell that cannot be launched is reported
//! through the `stderr` field of the result, same as any other failure the
//! user should see.
//!
//! ```text
//! "ls -la | head"  →  bash -c "ls -la | head"  →  CommandResult { stdout, stderr, exit_code }
//! ```

use std::fmt;
use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Shell program used for every command.
#[cfg(not(windows))]
pub const SHELL_PROGRAM: &str = "bash";
/// Flag that makes the shell run its next argument as a command string.
#[cfg(not(windows))]
pub const SHELL_COMMAND_FLAG: &str = "-c";

#[cfg(windows)]
pub const SHELL_PROGRAM: &str = "cmd";
#[cfg(windows)]
pub const SHELL_COMMAND_FLAG: &str = "/C";

/// Exit code reported when the command ran past its timeout (matches coreutils `timeout`).
pub const EXIT_TIMED_OUT: i32 = 124;
/// Exit code reported when the shell binary exists but cannot be executed.
pub const EXIT_NOT_EXECUTABLE: i32 = 126;
/// Exit code reported when the shell binary cannot be found.
pub const EXIT_NOT_FOUND: i32 = 127;

/// How long output is still collected after the shell exits while a
/// background job keeps its pipes open.
const OUTPUT_DRAIN: Duration = Duration::from_millis(100);

/// Captured output of one shell invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandResult {
    /// Standard output, trailing whitespace trimmed
    pub stdout: String,
    /// Standard error, trailing whitespace trimmed
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    /// Render an execution failure as a result with empty stdout.
    pub fn from_failure(error: &ExecError) -> Self {
        Self {
            stdout: String::new(),
            stderr: error.to_string(),
            exit_code: error.exit_code(),
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Anything that can turn a command string into a `CommandResult`.
///
/// `Controller` is generic over this so tests can script results without
/// spawning processes.
pub trait Executor {
    fn execute(&mut self, command: &str) -> CommandResult;
}

// ============================================================================
// Error Type
// ============================================================================

/// Ways a shell invocation can fail before producing a normal exit status.
#[derive(Debug)]
pub enum ExecError {
    /// The async runtime backing the executor could not be built.
    Runtime(io::Error),
    /// The shell process could not be started or waited on.
    Spawn { program: String, source: io::Error },
    /// The command ran longer than the configured limit and was killed.
    TimedOut(Duration),
}

impl ExecError {
    /// Shell-style exit code used when this error is rendered into a result.
    pub fn exit_code(&self) -> i32 {
        match self {
            ExecError::Spawn { source, .. } => match source.kind() {
                io::ErrorKind::NotFound => EXIT_NOT_FOUND,
                io::ErrorKind::PermissionDenied => EXIT_NOT_EXECUTABLE,
                _ => 1,
            },
            ExecError::TimedOut(_) => EXIT_TIMED_OUT,
            ExecError::Runtime(_) => 1,
        }
    }
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::Runtime(e) => write!(f, "failed to start executor runtime: {e}"),
            ExecError::Spawn { program, source } => {
                write!(f, "failed to launch {program}: {source}")
            }
            ExecError::TimedOut(limit) => {
                write!(f, "command timed out after {} seconds", limit.as_secs())
            }
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecError::Runtime(e) => Some(e),
            ExecError::Spawn { source, .. } => Some(source),
            ExecError::TimedOut(_) => None,
        }
    }
}

// ============================================================================
// Shell Executor
// ============================================================================

/// Runs commands through `SHELL_PROGRAM SHELL_COMMAND_FLAG <command>`.
///
/// Owns a current-thread tokio runtime that is only ever entered through
/// `block_on`, so callers stay fully synchronous. One child process is
/// created and reaped per call.
pub struct ShellExecutor {
    program: String,
    timeout: Option<Duration>,
    runtime: Option<Runtime>,
}

impl ShellExecutor {
    /// Executor for the build-time shell. `timeout = None` waits forever.
    pub fn new(timeout: Option<Duration>) -> Self {
        Self::with_program(SHELL_PROGRAM, timeout)
    }

    /// Executor for an explicit shell binary (tests use this to simulate launch failures).
    pub(crate) fn with_program(program: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
            runtime: None,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Lazily build the runtime so a construction failure surfaces per command
    /// instead of at startup.
    fn runtime(&mut self) -> Result<&Runtime, ExecError> {
        if self.runtime.is_none() {
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(ExecError::Runtime)?;
            self.runtime = Some(runtime);
        }
        self.runtime.as_ref().ok_or_else(|| {
            ExecError::Runtime(io::Error::other("runtime unavailable after initialization"))
        })
    }

    fn run(&mut self, command: &str) -> Result<CommandResult, ExecError> {
        let program = self.program.clone();
        let timeout = self.timeout;
        let runtime = self.runtime()?;

        let mut shell = Command::new(&program);
        shell
            .arg(SHELL_COMMAND_FLAG)
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        runtime.block_on(async move {
            let spawn_error = |source: io::Error| ExecError::Spawn {
                program: program.clone(),
                source,
            };
            let mut child = shell.spawn().map_err(spawn_error)?;
            let stdout = StreamCollector::spawn(child.stdout.take());
            let stderr = StreamCollector::spawn(child.stderr.take());

            // Completion is the shell's exit, not pipe EOF: background jobs may keep the pipes open
            let status = match timeout {
                Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                    Ok(status) => status.map_err(spawn_error)?,
                    Err(_) => {
                        let _ = child.start_kill();
                        return Err(ExecError::TimedOut(limit));
                    }
                },
                None => child.wait().await.map_err(spawn_error)?,
            };

            let deadline = Instant::now() + OUTPUT_DRAIN;
            let (stdout, stderr) = tokio::join!(stdout.drain(deadline), stderr.drain(deadline));
            Ok::<_, ExecError>(CommandResult {
                stdout: decode_stream(&stdout),
                stderr: decode_stream(&stderr),
                exit_code: exit_code(status),
            })
        })
    }
}

/// Reads one child pipe on a runtime task so the pipe never fills up while
/// the shell is being awaited.
struct StreamCollector {
    chunks: mpsc::UnboundedReceiver<Vec<u8>>,
    reader: Option<JoinHandle<()>>,
}

impl StreamCollector {
    fn spawn<R>(stream: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (tx, chunks) = mpsc::unbounded_channel();
        let reader = stream.map(|mut stream| {
            tokio::spawn(async move {
                let mut buf = [0u8; 8192];
                loop {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            if tx.send(buf[..n].to_vec()).is_err() {
                                break;
                            }
                        }
                    }
                }
            })
        });
        Self { chunks, reader }
    }

    /// Everything read until EOF, or until `deadline` if a leftover process
    /// still holds the pipe open.
    async fn drain(mut self, deadline: Instant) -> Vec<u8> {
        let mut bytes = Vec::new();
        while let Ok(Some(chunk)) = tokio::time::timeout_at(deadline, self.chunks.recv()).await {
            bytes.extend_from_slice(&chunk);
        }
        bytes
    }
}

impl Drop for StreamCollector {
    fn drop(&mut self) {
        if let Some(reader) = &self.reader {
            reader.abort();
        }
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Executor for ShellExecutor {
    fn execute(&mut self, command: &str) -> CommandResult {
        debug!("Spawning {} {} {:?}", self.program, SHELL_COMMAND_FLAG, command);
        match self.run(command) {
            Ok(result) => result,
            Err(e) => {
                warn!("Command ({} bytes) failed: {}", command.len(), e);
                CommandResult::from_failure(&e)
            }
        }
    }
}

/// Lossy decode (invalid sequences become U+FFFD), then drop trailing whitespace.
fn decode_stream(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end().to_string()
}

fn exit_code(status: ExitStatus) -> i32 {
    match status.code() {
        Some(code) => code,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status.signal().map(|signal| 128 + signal).unwrap_or(-1)
}

#[cfg(not(unix))]
fn terminated_by_signal(_status: ExitStatus) -> i32 {
    -1
}
