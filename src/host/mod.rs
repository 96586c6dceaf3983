//! Host module for process management and command execution

pub mod process_runner;

pub use process_runner::{ProcessRunner, RunEvent, RunState, RunnerError};
