#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    ffi::{OsStr, OsString},
    path::Path,
    process::Stdio,
    time::Duration,
};

use tokio::{
    io::{AsyncReadExt, BufReader},
    process::{Child, Command},
    time::timeout,
};

/// Failures while running a subprocess.
#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    /// The program could not be started (not installed, bad cwd, ...).
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        /// Program that was requested.
        program: String,
        /// Underlying I/O error.
        #[source]
        source:  std::io::Error,
    },
    /// Reading output or waiting on the child failed.
    #[error("I/O error while talking to the subprocess: {0}")]
    Io(#[from] std::io::Error),
    /// A pipe that was requested is not available.
    #[error("missing {0} pipe")]
    MissingPipe(&'static str),
    /// The subprocess did not exit within the deadline.
    #[error("subprocess timed out after {0:?}")]
    TimedOut(Duration),
}

/// Drop guard that terminates a spawned child process if callers forget to
/// await it.
struct ChildDropGuard(Option<Child>);

impl ChildDropGuard {
    /// Wraps the provided child process with the drop guard.
    fn new(child: Child) -> Self {
        Self(Some(child))
    }

    /// Returns a mutable reference to the underlying child process.
    fn child_mut(&mut self) -> Option<&mut Child> {
        self.0.as_mut()
    }

    /// Prevents the guard from killing the process on drop.
    fn disarm(mut self) {
        self.0 = None;
    }
}

impl Drop for ChildDropGuard {
    fn drop(&mut self) {
        if let Some(child) = self.0.as_mut() {
            let _ = child.start_kill();
        }
    }
}

/// Captured result of a finished subprocess.
#[derive(Debug)]
pub struct Collected {
    /// Exit status returned by the process.
    pub status: std::process::ExitStatus,
    /// Contents written to stdout.
    pub stdout: Vec<u8>,
    /// Contents written to stderr.
    pub stderr: Vec<u8>,
}

/// Spawns a command with stdin closed and collects stdout/stderr.
///
/// When `deadline` elapses the child is killed and
/// [`ProcessError::TimedOut`] is returned.
pub async fn run_collect(
    program: impl AsRef<OsStr>,
    args: &[OsString],
    cwd: Option<&Path>,
    deadline: Option<Duration>,
) -> Result<Collected, ProcessError> {
    let program = program.as_ref();
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let child = cmd.spawn().map_err(|source| ProcessError::Spawn {
        program: program.to_string_lossy().into_owned(),
        source,
    })?;
    let mut guard = ChildDropGuard::new(child);

    let child = guard.child_mut().ok_or(ProcessError::MissingPipe("child"))?;
    let stdout = child.stdout.take().ok_or(ProcessError::MissingPipe("stdout"))?;
    let stderr = child.stderr.take().ok_or(ProcessError::MissingPipe("stderr"))?;

    let out_task = tokio::spawn(async move {
        let mut reader = BufReader::new(stdout);
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok::<Vec<u8>, std::io::Error>(buf)
    });

    let err_task = tokio::spawn(async move {
        let mut reader = BufReader::new(stderr);
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).await?;
        Ok::<Vec<u8>, std::io::Error>(buf)
    });

    let wait_future = async move {
        let mut guard = guard;
        let status = guard
            .child_mut()
            .ok_or(ProcessError::MissingPipe("child"))?
            .wait()
            .await?;
        let stdout = out_task.await.map_err(std::io::Error::other)??;
        let stderr = err_task.await.map_err(std::io::Error::other)??;
        guard.disarm();
        Ok::<Collected, ProcessError>(Collected {
            status,
            stdout,
            stderr,
        })
    };

    match deadline {
        Some(limit) => timeout(limit, wait_future)
            .await
            .map_err(|_| ProcessError::TimedOut(limit))?,
        None => wait_future.await,
    }
}
