//! Native egui-based UI for Maigret Night
//!
//! Option tabs, run controls and a live log in a single window

mod app;
mod log_view;
mod theme;
mod widgets;

pub use app::run;
