//! Core data models and the command builder

mod command;
mod options;

pub use command::*;
pub use options::*;
