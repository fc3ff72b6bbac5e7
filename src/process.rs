//! Blocking external-process invocation
//!
//! CMake, the build tool and ctest are all driven as blocking child
//! processes. Output streams are drained on helper threads so a chatty child
//! never stalls on a full pipe, and an in-flight invocation is recorded in a
//! pidfile so a later `--kill` can terminate it from another process.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to spawn {command}: {source}")]
    Spawn { command: String, source: io::Error },

    #[error("{command} failed:\n{stderr}")]
    Failed { command: String, stderr: String },
}

/// One external command: argv, extra environment, working directory.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub argv: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn new(argv: Vec<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            argv,
            env: BTreeMap::new(),
            cwd: cwd.into(),
        }
    }

    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn display(&self) -> String {
        self.argv.join(" ")
    }
}

/// Cooperative cancellation handle for an in-flight invocation.
///
/// Cancelling terminates the child's whole process group, so build tools
/// that spawn compilers go down with it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Captured result of a completed invocation.
#[derive(Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Pidfile recording the in-flight invocation for a build folder.
#[derive(Debug, Clone)]
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    pub fn for_build_dir(build_dir: &Path) -> Self {
        Self {
            path: build_dir.join(".cmake-builder.pid"),
        }
    }

    fn write(&self, pid: u32) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, pid.to_string())
    }

    fn clear(&self) {
        let _ = fs::remove_file(&self.path);
    }

    /// Terminate the recorded invocation's process group, if any.
    ///
    /// Returns false when no invocation is recorded. A stale pid (process
    /// already gone) is treated as killed; the pidfile is removed either way.
    pub fn kill_recorded(&self) -> Result<bool, ProcessError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(ProcessError::Io(e)),
        };
        if let Ok(pid) = content.trim().parse::<u32>() {
            terminate_group(pid);
        }
        self.clear();
        Ok(true)
    }
}

/// Run an invocation to completion and capture its output.
///
/// Blocks until the child exits, polling the cancellation token; the given
/// pidfile tracks the child for the lifetime of the call.
pub fn run(
    invocation: &Invocation,
    cancel: &CancelToken,
    pidfile: Option<&PidFile>,
) -> Result<ProcessOutput, ProcessError> {
    info!(command = %invocation.display(), cwd = %invocation.cwd.display(), "running");
    let mut child = spawn(invocation)?;
    if let Some(pidfile) = pidfile {
        pidfile.write(child.id())?;
    }

    let stdout_reader = drain(child.stdout.take());
    let stderr_reader = drain(child.stderr.take());

    let status = wait(&mut child, cancel);
    if let Some(pidfile) = pidfile {
        pidfile.clear();
    }
    let status = status?;

    let stdout = join_reader(stdout_reader)?;
    let stderr = join_reader(stderr_reader)?;
    debug!(status = %status, "process finished");
    Ok(ProcessOutput {
        status,
        stdout,
        stderr,
    })
}

/// Strict variant of [`run`]: any output on the error stream, or a non-zero
/// exit, fails the invocation with the stream text verbatim.
pub fn check_output(
    invocation: &Invocation,
    cancel: &CancelToken,
    pidfile: Option<&PidFile>,
) -> Result<String, ProcessError> {
    let output = run(invocation, cancel, pidfile)?;
    if !output.stderr.trim().is_empty() {
        return Err(ProcessError::Failed {
            command: invocation.display(),
            stderr: output.stderr,
        });
    }
    if !output.success() {
        return Err(ProcessError::Failed {
            command: invocation.display(),
            stderr: format!("exited with {}", output.status),
        });
    }
    Ok(output.stdout)
}

/// Run with the child inheriting this process's stdio.
///
/// For interactive programs: run targets and debugger front-ends need the
/// terminal, so nothing is captured here.
pub fn run_interactive(invocation: &Invocation) -> Result<ExitStatus, ProcessError> {
    info!(command = %invocation.display(), cwd = %invocation.cwd.display(), "running interactively");
    let (program, args) = invocation
        .argv
        .split_first()
        .ok_or_else(|| ProcessError::Spawn {
            command: "<empty>".to_string(),
            source: io::Error::other("empty argv"),
        })?;
    let status = Command::new(program)
        .args(args)
        .envs(&invocation.env)
        .current_dir(&invocation.cwd)
        .status()
        .map_err(|source| ProcessError::Spawn {
            command: program.clone(),
            source,
        })?;
    Ok(status)
}

fn spawn(invocation: &Invocation) -> Result<Child, ProcessError> {
    let (program, args) = invocation
        .argv
        .split_first()
        .ok_or_else(|| ProcessError::Spawn {
            command: "<empty>".to_string(),
            source: io::Error::other("empty argv"),
        })?;
    let mut command = Command::new(program);
    command
        .args(args)
        .envs(&invocation.env)
        .current_dir(&invocation.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // Own process group, so cancellation takes the whole tree down.
        command.process_group(0);
    }
    command.spawn().map_err(|source| ProcessError::Spawn {
        command: program.clone(),
        source,
    })
}

fn wait(child: &mut Child, cancel: &CancelToken) -> Result<ExitStatus, ProcessError> {
    let mut terminated = false;
    loop {
        if cancel.is_cancelled() && !terminated {
            warn!("cancellation requested, terminating process group");
            terminate_group(child.id());
            terminated = true;
        }
        match child.try_wait()? {
            Some(status) => return Ok(status),
            None => std::thread::sleep(Duration::from_millis(50)),
        }
    }
}

fn drain<R: Read + Send + 'static>(stream: Option<R>) -> Option<JoinHandle<io::Result<String>>> {
    stream.map(|mut stream| {
        std::thread::spawn(move || {
            let mut buffer = String::new();
            stream.read_to_string(&mut buffer)?;
            Ok(buffer)
        })
    })
}

fn join_reader(handle: Option<JoinHandle<io::Result<String>>>) -> Result<String, ProcessError> {
    match handle {
        None => Ok(String::new()),
        Some(handle) => match handle.join() {
            Ok(result) => Ok(result?),
            Err(_) => Err(ProcessError::Io(io::Error::other("output reader panicked"))),
        },
    }
}

#[cfg(unix)]
fn terminate_group(pid: u32) {
    unsafe {
        libc::killpg(pid as libc::pid_t, libc::SIGTERM);
    }
    info!("sent SIGTERM to process group {pid}");
}

#[cfg(not(unix))]
fn terminate_group(_pid: u32) {
    warn!("process-group termination is not implemented on this platform");
}
