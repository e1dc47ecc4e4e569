//! External process execution.
//!
//! [`StepRunner`] is the seam between the orchestrator and the processes it
//! launches. [`ProcessRunner`] is the real implementation: it spawns the
//! step's executable in the step's working directory, forwards output line by
//! line while the process runs, and turns a non-zero exit into
//! [`Error::StepFailed`].
//!
//! The orchestrator's own working directory is never changed; each child gets
//! its directory through `current_dir`.

use super::{CommandStep, tool_detection::resolve_executable};
use crate::bundler::{Error, Result};
use std::collections::VecDeque;
use std::future::Future;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Number of trailing stderr lines kept for failure messages.
pub const STDERR_TAIL_LINES: usize = 20;

/// How long output forwarding may lag behind process exit.
///
/// Tools that leave background children holding the pipes open would
/// otherwise block the build.
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Grace period between SIGTERM to the process group and a hard kill.
#[cfg(unix)]
const TERMINATE_GRACE: Duration = Duration::from_secs(5);

/// Successful completion of a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StepOutcome {
    /// Exit code (always zero for a successful step)
    pub code: i32,
    /// Wall-clock time the process ran
    pub duration: Duration,
}

/// Executes planned steps.
///
/// Implementations block (from the caller's point of view) until the step's
/// process has exited and must surface a non-zero exit as
/// [`Error::StepFailed`].
pub trait StepRunner {
    /// Runs `step` to completion.
    fn run(&self, step: &CommandStep) -> impl Future<Output = Result<StepOutcome>>;
}

/// Receives process output as it is produced.
pub trait StepOutput: Send + Sync {
    /// A line written to stdout.
    fn stdout_line(&self, line: &str);
    /// A line written to stderr.
    fn stderr_line(&self, line: &str);
}

/// Sends process output to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogOutput;

impl StepOutput for LogOutput {
    fn stdout_line(&self, line: &str) {
        log::info!("{}", line);
    }

    fn stderr_line(&self, line: &str) {
        log::warn!("{}", line);
    }
}

/// Runs steps as real child processes.
pub struct ProcessRunner {
    output: Arc<dyn StepOutput>,
    cancel: CancellationToken,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for ProcessRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessRunner")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("timeout", &self.timeout)
            .finish()
    }
}

enum Waited {
    Exited(std::io::Result<std::process::ExitStatus>),
    Cancelled,
    TimedOut,
}

impl ProcessRunner {
    /// Creates a runner forwarding output to `output`.
    ///
    /// Cancelling `cancel` terminates the running process.
    pub fn new(output: Arc<dyn StepOutput>, cancel: CancellationToken) -> Self {
        Self {
            output,
            cancel,
            timeout: None,
        }
    }

    /// Kills steps that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

impl StepRunner for ProcessRunner {
    async fn run(&self, step: &CommandStep) -> Result<StepOutcome> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let program = resolve_executable(&step.executable, &step.working_directory)?;
        log::debug!(
            "Spawning {} in {}",
            program.display(),
            step.working_directory.display()
        );

        let mut command = Command::new(&program);
        command
            .args(&step.arguments)
            .current_dir(&step.working_directory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        // Own process group so cancellation reaches tools spawned by the launcher.
        #[cfg(unix)]
        command.process_group(0);

        let started = Instant::now();
        let mut child = command.spawn().map_err(|error| Error::CommandFailed {
            command: step.display_command(),
            error,
        })?;

        let stdout_task = child.stdout.take().map(|stdout| {
            let output = Arc::clone(&self.output);
            tokio::spawn(forward_lines(stdout, move |line| output.stdout_line(line), 0))
        });
        let stderr_task = child.stderr.take().map(|stderr| {
            let output = Arc::clone(&self.output);
            tokio::spawn(forward_lines(
                stderr,
                move |line| output.stderr_line(line),
                STDERR_TAIL_LINES,
            ))
        });

        let waited = tokio::select! {
            status = child.wait() => Waited::Exited(status),
            _ = self.cancel.cancelled() => Waited::Cancelled,
            _ = sleep_for(self.timeout) => Waited::TimedOut,
        };

        match waited {
            Waited::Exited(status) => {
                let status = status.map_err(|error| Error::CommandFailed {
                    command: step.display_command(),
                    error,
                })?;
                drain(stdout_task).await;
                let stderr_tail = drain(stderr_task).await;
                let duration = started.elapsed();

                if status.success() {
                    log::debug!("{} finished in {:.1?}", step.description, duration);
                    Ok(StepOutcome {
                        code: status.code().unwrap_or(0),
                        duration,
                    })
                } else {
                    Err(Error::StepFailed {
                        step: Box::new(step.clone()),
                        code: status.code(),
                        stderr_tail,
                    })
                }
            }
            Waited::Cancelled => {
                log::warn!("Cancelling: {}", step.description);
                terminate(&mut child).await;
                abort(stdout_task);
                abort(stderr_task);
                Err(Error::Cancelled)
            }
            Waited::TimedOut => {
                let seconds = self.timeout.map(|t| t.as_secs()).unwrap_or_default();
                log::warn!("{} timed out after {}s, terminating...", step.description, seconds);
                terminate(&mut child).await;
                abort(stdout_task);
                abort(stderr_task);
                Err(Error::StepTimedOut {
                    description: step.description.clone(),
                    seconds,
                })
            }
        }
    }
}

/// Forwards each line of `reader` to `sink`, returning the last `keep` lines.
///
/// Lines are decoded lossily so invalid UTF-8 never stops the pipe from draining.
async fn forward_lines<R, F>(reader: R, sink: F, keep: usize) -> Vec<String>
where
    R: AsyncRead + Unpin,
    F: Fn(&str),
{
    let mut reader = BufReader::new(reader);
    let mut buffer = Vec::new();
    let mut tail = VecDeque::with_capacity(keep);

    loop {
        buffer.clear();
        match reader.read_until(b'\n', &mut buffer).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buffer);
                let line = line.trim_end_matches(['\r', '\n']);
                sink(line);
                if keep > 0 {
                    if tail.len() == keep {
                        tail.pop_front();
                    }
                    tail.push_back(line.to_string());
                }
            }
            Err(e) => {
                log::debug!("Stopped reading process output: {}", e);
                break;
            }
        }
    }

    tail.into()
}

async fn drain<T: Default>(task: Option<JoinHandle<T>>) -> T {
    let Some(mut task) = task else {
        return T::default();
    };

    match tokio::time::timeout(OUTPUT_DRAIN_TIMEOUT, &mut task).await {
        Ok(Ok(value)) => value,
        Ok(Err(e)) => {
            log::debug!("Output forwarding task failed: {}", e);
            T::default()
        }
        Err(_) => {
            log::debug!("Output still open after process exit, detaching");
            task.abort();
            T::default()
        }
    }
}

fn abort<T>(task: Option<JoinHandle<T>>) {
    if let Some(task) = task {
        task.abort();
    }
}

async fn sleep_for(timeout: Option<Duration>) {
    match timeout {
        Some(duration) => tokio::time::sleep(duration).await,
        None => std::future::pending::<()>().await,
    }
}

/// Stops a running child and everything in its process group.
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{Signal, killpg};
        use nix::unistd::Pid;

        if let Some(pid) = child.id().and_then(|pid| i32::try_from(pid).ok()) {
            if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGTERM) {
                log::debug!("Failed to signal process group {}: {}", pid, e);
            }
            if tokio::time::timeout(TERMINATE_GRACE, child.wait()).await.is_ok() {
                return;
            }
        }
    }

    if let Err(e) = child.kill().await {
        log::warn!("Failed to kill process: {}", e);
    }
}
