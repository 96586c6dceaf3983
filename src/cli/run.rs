//! Headless run: stream maigret's output to stdout

use std::io::Write;
use std::time::Duration;

use anyhow::{bail, Context};

use super::{exit_codes, AppContext, ScanArgs};
use crate::core::{build_command, display_command};
use crate::host::{ProcessRunner, RunEvent, RunState};

const RECV_INTERVAL: Duration = Duration::from_millis(500);

/// Run maigret and return the exit code to leave with
pub fn run(ctx: &AppContext, args: ScanArgs) -> anyhow::Result<i32> {
    let opts = args.resolve(&ctx.store)?;
    if !opts.has_username() {
        bail!("No username given and none saved in {}", ctx.store.path().display());
    }

    let tokens = build_command(&opts);
    tracing::info!("Running command: {}", display_command(&tokens));

    let mut runner = ctx.runner();
    runner.start(&tokens)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    stream_events(&mut runner, &mut out)
}

/// Write every line until the run ends; returns the exit code to report
pub fn stream_events(runner: &mut ProcessRunner, out: &mut impl Write) -> anyhow::Result<i32> {
    loop {
        match runner.recv_timeout(RECV_INTERVAL) {
            Some(RunEvent::Line(line)) => {
                writeln!(out, "{}", line).context("Failed to write output")?;
            }
            Some(RunEvent::Completed { exit_code }) => {
                out.flush().context("Failed to write output")?;
                tracing::debug!(?exit_code, "maigret finished");
                return Ok(exit_code.unwrap_or(exit_codes::INTERRUPTED));
            }
            Some(RunEvent::Terminated) => return Ok(exit_codes::INTERRUPTED),
            None => match runner.state() {
                RunState::Running => {}
                RunState::Completed { exit_code } => {
                    return Ok(exit_code.unwrap_or(exit_codes::INTERRUPTED))
                }
                RunState::Terminated => return Ok(exit_codes::INTERRUPTED),
                RunState::Idle => return Ok(exit_codes::UNEXPECTED_FAILURE),
            },
        }
    }
}
