//! Process Runner
//!
//! Owns the lifecycle of one external process at a time.
//! stdout and stderr share a single pipe; a worker thread forwards each line
//! over a channel and reports the exit status once the output closes.
//! The caller drains the channel and every state transition happens on the
//! caller's thread.
//!
//! On unix the child leads its own process group, so stopping a run also
//! reaches anything a wrapper script forked.

use std::io::{BufRead, BufReader, PipeReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use thiserror::Error;

/// How often the worker checks for exit after the output has closed
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Lifecycle state of the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    /// Process exited on its own
    Completed { exit_code: Option<i32> },
    /// Process was stopped through [`ProcessRunner::terminate`]
    Terminated,
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed { .. } | RunState::Terminated)
    }
}

/// Notification delivered to the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// One line of combined stdout/stderr, without its line ending
    Line(String),
    /// The process exited; `exit_code` is `None` when killed by a signal
    Completed { exit_code: Option<i32> },
    /// The process was stopped on request
    Terminated,
}

/// Runner errors
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("No command to run")]
    EmptyCommand,

    #[error("Binary '{0}' not found. Install it or add it to PATH.")]
    BinaryNotFound(String),

    #[error("Failed to launch process: {0}")]
    LaunchFailed(String),

    #[error("A process is already running")]
    AlreadyRunning,

    #[error("Failed to stop process: {0}")]
    TerminateFailed(String),
}

struct ActiveRun {
    child: Arc<Mutex<Child>>,
    worker: Option<JoinHandle<()>>,
    events: Receiver<RunEvent>,
    /// Used by `terminate` to queue its note behind pending output
    notes: Sender<RunEvent>,
}

/// Runs one external command at a time
pub struct ProcessRunner {
    state: RunState,
    /// Replaces the `PATH` lookup of the first token
    program_override: Option<PathBuf>,
    active: Option<ActiveRun>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self {
            state: RunState::Idle,
            program_override: None,
            active: None,
        }
    }

    /// Use a fixed program path instead of resolving the first token
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program_override = Some(program.into());
        self
    }

    /// Find a binary in PATH
    pub fn which(binary: &str) -> Option<PathBuf> {
        which::which(binary).ok()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Spawn `tokens[0]` with the remaining tokens as arguments
    ///
    /// Rejected while a run is active. Starting from a terminal state begins
    /// a fresh run and drops whatever the previous run left undrained.
    pub fn start(&mut self, tokens: &[String]) -> Result<(), RunnerError> {
        if self.state.is_running() {
            return Err(RunnerError::AlreadyRunning);
        }
        let (first, args) = tokens.split_first().ok_or(RunnerError::EmptyCommand)?;

        if self.state.is_terminal() {
            tracing::debug!(previous = ?self.state, "Starting a new run");
        }
        self.finish_worker();
        self.active = None;
        self.state = RunState::Idle;

        let program = self.resolve_program(first)?;
        let (reader, writer) = std::io::pipe().map_err(|e| RunnerError::LaunchFailed(e.to_string()))?;
        let writer_err = writer
            .try_clone()
            .map_err(|e| RunnerError::LaunchFailed(e.to_string()))?;

        let mut cmd = Command::new(&program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(writer)
            .stderr(writer_err);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd
            .spawn()
            .map_err(|e| RunnerError::LaunchFailed(e.to_string()))?;
        // The command still holds the write ends; the reader sees EOF only
        // once every copy is gone.
        drop(cmd);

        tracing::info!(pid = child.id(), program = %program.display(), "Started process");

        let child = Arc::new(Mutex::new(child));
        let (tx, rx) = crossbeam_channel::unbounded();
        let worker = {
            let child = Arc::clone(&child);
            let tx = tx.clone();
            std::thread::Builder::new()
                .name("process-output".to_string())
                .spawn(move || forward_output(reader, child, tx))
                .map_err(|e| RunnerError::LaunchFailed(e.to_string()))?
        };

        self.active = Some(ActiveRun {
            child,
            worker: Some(worker),
            events: rx,
            notes: tx,
        });
        self.state = RunState::Running;
        Ok(())
    }

    /// Drain every event available right now without blocking
    pub fn poll(&mut self) -> Vec<RunEvent> {
        let mut out = Vec::new();
        loop {
            let next = match &self.active {
                Some(active) => active.events.try_recv().ok(),
                None => None,
            };
            match next {
                Some(event) => {
                    if let Some(event) = self.route(event) {
                        out.push(event);
                    }
                }
                None => break,
            }
        }
        out
    }

    /// Wait up to `timeout` for the next event
    ///
    /// Returns `None` on timeout or when the run has nothing more to say.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Option<RunEvent> {
        loop {
            let received = match &self.active {
                Some(active) => active.events.recv_timeout(timeout),
                None => return None,
            };
            match received {
                Ok(event) => {
                    if let Some(event) = self.route(event) {
                        return Some(event);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
    }

    /// Apply the state transition for an event; swallowed events yield `None`
    fn route(&mut self, event: RunEvent) -> Option<RunEvent> {
        match event {
            RunEvent::Completed { exit_code } => {
                if !self.state.is_running() {
                    // Exit of a process we already stopped
                    return None;
                }
                self.state = RunState::Completed { exit_code };
                self.finish_worker();
                tracing::info!(?exit_code, "Process completed");
                Some(RunEvent::Completed { exit_code })
            }
            // Output still in flight from a stopped run
            RunEvent::Line(_) if self.state == RunState::Terminated => None,
            other => Some(other),
        }
    }

    /// Stop the running process and wait for it to exit
    ///
    /// No-op unless running. If the process already exited on its own the
    /// pending completion is left for the next drain.
    pub fn terminate(&mut self) -> Result<(), RunnerError> {
        if !self.state.is_running() {
            return Ok(());
        }
        let Some(active) = &self.active else {
            return Ok(());
        };

        {
            let mut child = lock_child(&active.child);
            match child.try_wait() {
                Ok(Some(_)) => {
                    tracing::debug!("Process already exited, nothing to terminate");
                    return Ok(());
                }
                Ok(None) => {}
                Err(e) => return Err(RunnerError::TerminateFailed(e.to_string())),
            }

            tracing::info!(pid = child.id(), "Terminating process");
            request_stop(&mut child)?;
            child
                .wait()
                .map_err(|e| RunnerError::TerminateFailed(e.to_string()))?;
        }

        let _ = active.notes.send(RunEvent::Terminated);
        self.state = RunState::Terminated;
        Ok(())
    }

    /// Join the worker once it has nothing left to do
    fn finish_worker(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if let Some(worker) = active.worker.take() {
            if worker.is_finished() {
                let _ = worker.join();
            }
            // Otherwise the thread ends by itself once the pipe closes.
        }
    }

    fn resolve_program(&self, first: &str) -> Result<PathBuf, RunnerError> {
        if let Some(program) = &self.program_override {
            return Ok(program.clone());
        }
        if first.is_empty() {
            return Err(RunnerError::EmptyCommand);
        }
        if Path::new(first).components().count() > 1 && Path::new(first).exists() {
            return Ok(PathBuf::from(first));
        }
        Self::which(first).ok_or_else(|| RunnerError::BinaryNotFound(first.to_string()))
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProcessRunner {
    fn drop(&mut self) {
        if self.state.is_running() {
            if let Err(e) = self.terminate() {
                tracing::warn!("Failed to stop process on shutdown: {}", e);
            }
        }
    }
}

fn lock_child(child: &Mutex<Child>) -> MutexGuard<'_, Child> {
    child.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Ask the child and everything in its process group to exit
#[cfg(unix)]
fn request_stop(child: &mut Child) -> Result<(), RunnerError> {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    // The child was spawned with `process_group(0)`, so its pid is the pgid
    let pgid = Pid::from_raw(child.id() as i32);
    killpg(pgid, Signal::SIGTERM).map_err(|e| RunnerError::TerminateFailed(e.to_string()))
}

#[cfg(not(unix))]
fn request_stop(child: &mut Child) -> Result<(), RunnerError> {
    child
        .kill()
        .map_err(|e| RunnerError::TerminateFailed(e.to_string()))
}

/// Worker body: forward lines until EOF, then report the exit status
fn forward_output(reader: PipeReader, child: Arc<Mutex<Child>>, tx: Sender<RunEvent>) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::with_capacity(256);

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                // Keep reading even if the receiver is gone so the child never
                // blocks on a full pipe.
                let _ = tx.send(RunEvent::Line(decode_line(&buf)));
            }
            Err(e) => {
                tracing::warn!("Failed to read process output: {}", e);
                break;
            }
        }
    }

    let exit_code = loop {
        {
            let mut child = lock_child(&child);
            match child.try_wait() {
                Ok(Some(status)) => break status.code(),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("Failed to collect exit status: {}", e);
                    break None;
                }
            }
        }
        std::thread::sleep(EXIT_POLL_INTERVAL);
    };

    let _ = tx.send(RunEvent::Completed { exit_code });
}

/// Lossy UTF-8 with the line ending stripped
fn decode_line(raw: &[u8]) -> String {
    let mut end = raw.len();
    while end > 0 && matches!(raw[end - 1], b'\n' | b'\r') {
        end -= 1;
    }
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    const WAIT: Duration = Duration::from_secs(10);

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    /// Collect events until a terminal one arrives
    fn drain_until_done(runner: &mut ProcessRunner) -> Vec<RunEvent> {
        let deadline = Instant::now() + WAIT;
        let mut events = Vec::new();
        while Instant::now() < deadline {
            if let Some(event) = runner.recv_timeout(Duration::from_millis(200)) {
                let done = !matches!(event, RunEvent::Line(_));
                events.push(event);
                if done {
                    break;
                }
            }
        }
        events
    }

    #[test]
    fn test_decode_line() {
        assert_eq!(decode_line(b"hello\n"), "hello");
        assert_eq!(decode_line(b"hello\r\n"), "hello");
        assert_eq!(decode_line(b"  padded  \n"), "  padded  ");
        assert_eq!(decode_line(b"no newline"), "no newline");
        assert_eq!(decode_line(b"bad \xff byte\n"), "bad \u{fffd} byte");
    }

    #[test]
    fn test_terminate_while_idle_is_noop() {
        let mut runner = ProcessRunner::new();
        runner.terminate().unwrap();
        assert_eq!(runner.state(), RunState::Idle);
        assert!(runner.poll().is_empty());
    }

    #[test]
    fn test_empty_command_rejected() {
        let mut runner = ProcessRunner::new();
        assert!(matches!(runner.start(&[]), Err(RunnerError::EmptyCommand)));
        assert_eq!(runner.state(), RunState::Idle);
    }

    #[test]
    fn test_missing_binary() {
        let mut runner = ProcessRunner::new();
        let err = runner
            .start(&["definitely-not-a-real-binary-7f3a".to_string()])
            .unwrap_err();
        assert!(matches!(err, RunnerError::BinaryNotFound(_)));
        assert!(err.to_string().contains("definitely-not-a-real-binary-7f3a"));
        assert_eq!(runner.state(), RunState::Idle);
    }

    #[test]
    fn test_error_display() {
        let err = RunnerError::BinaryNotFound("maigret".to_string());
        assert!(err.to_string().contains("maigret"));
        assert!(RunnerError::AlreadyRunning.to_string().contains("already running"));
    }

    #[cfg(unix)]
    #[test]
    fn test_lines_forwarded_in_order_then_completed() {
        let mut runner = ProcessRunner::new();
        runner
            .start(&sh("echo one; echo two 1>&2; sleep 0.1; echo three; exit 3"))
            .unwrap();
        assert!(runner.is_running());

        let events = drain_until_done(&mut runner);
        assert_eq!(
            events,
            vec![
                RunEvent::Line("one".to_string()),
                RunEvent::Line("two".to_string()),
                RunEvent::Line("three".to_string()),
                RunEvent::Completed { exit_code: Some(3) },
            ]
        );
        assert_eq!(runner.state(), RunState::Completed { exit_code: Some(3) });
    }

    #[cfg(unix)]
    #[test]
    fn test_completion_delivered_once() {
        let mut runner = ProcessRunner::new();
        runner.start(&sh("exit 0")).unwrap();

        let events = drain_until_done(&mut runner);
        assert_eq!(events, vec![RunEvent::Completed { exit_code: Some(0) }]);
        assert!(runner.recv_timeout(Duration::from_millis(100)).is_none());
        assert!(runner.poll().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_start_while_running_rejected() {
        let mut runner = ProcessRunner::new();
        runner.start(&sh("sleep 5")).unwrap();
        assert!(matches!(
            runner.start(&sh("echo again")),
            Err(RunnerError::AlreadyRunning)
        ));
        runner.terminate().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_terminate_stops_long_running_process() {
        let mut runner = ProcessRunner::new();
        runner.start(&sh("echo started; exec sleep 30")).unwrap();

        // Wait for the first line so the process is definitely up
        let first = runner.recv_timeout(WAIT);
        assert_eq!(first, Some(RunEvent::Line("started".to_string())));

        let begun = Instant::now();
        runner.terminate().unwrap();
        assert!(begun.elapsed() < Duration::from_secs(10));
        assert_eq!(runner.state(), RunState::Terminated);

        let events = drain_until_done(&mut runner);
        assert_eq!(events, vec![RunEvent::Terminated]);

        // Terminal state: second terminate is a no-op
        runner.terminate().unwrap();
        assert_eq!(runner.state(), RunState::Terminated);
        assert!(runner.recv_timeout(Duration::from_millis(200)).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_terminate_reaches_forked_children() {
        let mut runner = ProcessRunner::new();
        runner
            .start(&sh("echo started; (sleep 0.5; echo late-output; sleep 1) & wait"))
            .unwrap();
        assert_eq!(
            runner.recv_timeout(WAIT),
            Some(RunEvent::Line("started".to_string()))
        );

        runner.terminate().unwrap();
        assert_eq!(runner.state(), RunState::Terminated);

        // Give a surviving background job time to print
        let deadline = Instant::now() + Duration::from_secs(3);
        let mut events = Vec::new();
        while Instant::now() < deadline {
            if let Some(event) = runner.recv_timeout(Duration::from_millis(200)) {
                events.push(event);
            }
        }
        assert_eq!(events, vec![RunEvent::Terminated]);
    }

    #[test]
    fn test_lines_after_terminate_are_dropped() {
        let mut runner = ProcessRunner::new();
        runner.state = RunState::Terminated;
        assert_eq!(runner.route(RunEvent::Line("late".to_string())), None);
        assert_eq!(
            runner.route(RunEvent::Completed { exit_code: Some(0) }),
            None
        );
        assert_eq!(runner.route(RunEvent::Terminated), Some(RunEvent::Terminated));
    }

    #[cfg(unix)]
    #[test]
    fn test_restart_after_completion() {
        let mut runner = ProcessRunner::new();
        runner.start(&sh("echo first")).unwrap();
        drain_until_done(&mut runner);
        assert!(runner.state().is_terminal());

        runner.start(&sh("echo second")).unwrap();
        let events = drain_until_done(&mut runner);
        assert_eq!(events.first(), Some(&RunEvent::Line("second".to_string())));
    }

    #[cfg(unix)]
    #[test]
    fn test_program_override() {
        let mut runner = ProcessRunner::new().with_program("/bin/sh");
        runner
            .start(&[
                "maigret".to_string(),
                "-c".to_string(),
                "echo overridden".to_string(),
            ])
            .unwrap();
        let events = drain_until_done(&mut runner);
        assert_eq!(events[0], RunEvent::Line("overridden".to_string()));
    }
}
