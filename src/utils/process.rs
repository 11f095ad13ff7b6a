//! Subprocess execution with live output passthrough

use crate::errors::{EspFatfsError, Result};
use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;

/// Exit code reported when the process ended without one (killed by a signal)
pub const FAILURE_CODE: i32 = -1;

const PIPE_CHUNK: usize = 1024;

/// True if `path` is a script that has to be run through an interpreter
pub fn is_script(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "py")
}

/// Program plus argument vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: OsString,
    pub args: Vec<OsString>,
}

impl CommandLine {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Command line for running `tool`; `.py` tools are run through
    /// `interpreter` with the script path as first argument.
    pub fn for_tool(tool: &Path, interpreter: &str) -> Self {
        if is_script(tool) {
            Self::new(interpreter).arg(tool)
        } else {
            Self::new(tool)
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program followed by its arguments, lossily converted
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|s| s.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv().join(" "))
    }
}

/// Exit status and everything the process wrote
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Where a child's output is forwarded while it runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Child stdout to our stdout, child stderr to our stderr
    Passthrough,
    /// Both child streams to our stderr, leaving stdout to the caller
    Stderr,
    /// Captured only
    Quiet,
}

/// Runs one subprocess at a time, forwarding its output as it arrives
#[derive(Debug, Clone, Copy)]
pub struct ProcessRunner {
    mode: OutputMode,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner {
    /// Forward child stdout/stderr to our own stdout/stderr
    pub fn new() -> Self {
        Self::with_mode(OutputMode::Passthrough)
    }

    /// Forward all child output to stderr; used when stdout carries JSON
    pub fn to_stderr() -> Self {
        Self::with_mode(OutputMode::Stderr)
    }

    /// Capture output without forwarding it
    pub fn quiet() -> Self {
        Self::with_mode(OutputMode::Quiet)
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Spawn `command`, drain both output streams on one task while the child
    /// runs, and wait for it to exit.
    ///
    /// A non-zero exit is returned as `Ok`; only spawn and pipe failures are
    /// errors.
    pub async fn run(&self, command: &CommandLine) -> Result<ProcessOutput> {
        log::debug!("Executing: {}", command);

        let spawn_failed = |source: std::io::Error| EspFatfsError::ProcessSpawnFailed {
            program: command.program.to_string_lossy().into_owned(),
            source,
        };

        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_failed)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| spawn_failed(std::io::Error::other("stdout was not captured")))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| spawn_failed(std::io::Error::other("stderr was not captured")))?;

        let (out_sink, err_sink): (BoxedWriter, BoxedWriter) = match self.mode {
            OutputMode::Passthrough => {
                (Box::new(tokio::io::stdout()), Box::new(tokio::io::stderr()))
            }
            OutputMode::Stderr => (Box::new(tokio::io::stderr()), Box::new(tokio::io::stderr())),
            OutputMode::Quiet => (Box::new(tokio::io::sink()), Box::new(tokio::io::sink())),
        };

        let drain = tokio::spawn(async move {
            tokio::join!(pump(stdout, out_sink), pump(stderr, err_sink))
        });

        let status = child.wait().await.map_err(spawn_failed)?;
        let (stdout, stderr) = drain
            .await
            .map_err(|e| spawn_failed(std::io::Error::other(e)))?;

        let output = ProcessOutput {
            code: status.code().unwrap_or(FAILURE_CODE),
            stdout: stdout.map_err(spawn_failed)?,
            stderr: stderr.map_err(spawn_failed)?,
        };
        log::debug!("{} exited with code {}", command, output.code);
        Ok(output)
    }
}

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Copy `reader` to `writer` chunk by chunk, flushing each chunk, and return
/// everything that was read.
///
/// Only read errors fail the pump. Once `writer` fails (a closed stdout, say)
/// forwarding stops but the child's pipe is still drained and captured.
async fn pump<R, W>(mut reader: R, mut writer: W) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut captured = Vec::new();
    let mut buf = [0u8; PIPE_CHUNK];
    let mut forwarding = true;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        if forwarding {
            let written = match writer.write_all(&buf[..n]).await {
                Ok(()) => writer.flush().await,
                Err(e) => Err(e),
            };
            if let Err(e) = written {
                log::debug!("Stopped forwarding child output: {}", e);
                forwarding = false;
            }
        }
        captured.extend_from_slice(&buf[..n]);
    }
    Ok(captured)
}
