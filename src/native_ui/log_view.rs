//! Read-only log of the current run

use std::collections::VecDeque;
use std::sync::OnceLock;

use eframe::egui::{self, RichText};
use regex_lite::Regex;

use super::theme::{FontSize, Radius, Theme};

/// Oldest lines are dropped past this size
pub const MAX_LOG_LINES: usize = 10_000;

/// CSI / OSC escape sequences emitted by colour-aware tools
fn ansi_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07]*\x07|\x1b[@-Z\\-_]")
            .expect("Invalid ANSI regex")
    })
}

/// Remove terminal escape sequences from a line
pub fn strip_ansi(line: &str) -> String {
    if !line.contains('\x1b') {
        return line.to_string();
    }
    ansi_regex().replace_all(line, "").into_owned()
}

/// Bounded line buffer behind the log view
#[derive(Debug)]
pub struct LogBuffer {
    lines: VecDeque<String>,
    capacity: usize,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::with_capacity(MAX_LOG_LINES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append one line, stripping escape sequences
    pub fn push(&mut self, line: &str) {
        if self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(strip_ansi(line));
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Whole log as newline-separated text
    pub fn text(&self) -> String {
        let mut out = String::new();
        for line in self.lines() {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Scrolling monospace view that follows new output
    pub fn show(&self, ui: &mut egui::Ui) {
        let row_height = ui.text_style_height(&egui::TextStyle::Monospace);

        egui::Frame::none()
            .fill(Theme::BG_LOG)
            .rounding(egui::Rounding::same(Radius::MD))
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::ScrollArea::both()
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show_rows(ui, row_height, self.lines.len(), |ui, rows| {
                        for line in self.lines.range(rows) {
                            ui.label(
                                RichText::new(line)
                                    .monospace()
                                    .size(FontSize::SM)
                                    .color(Theme::TEXT_SECONDARY),
                            );
                        }
                    });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_ansi() {
        assert_eq!(strip_ansi("\x1b[32m[+] GitHub\x1b[0m: found"), "[+] GitHub: found");
        assert_eq!(strip_ansi("\x1b[1;31mError\x1b[0m"), "Error");
        assert_eq!(strip_ansi("plain text"), "plain text");
        assert_eq!(strip_ansi("\x1b]0;title\x07after"), "after");
    }

    #[test]
    fn test_log_buffer_caps_lines() {
        let mut log = LogBuffer::with_capacity(3);
        for i in 0..5 {
            log.push(&format!("line {}", i));
        }
        assert_eq!(log.len(), 3);
        assert_eq!(log.lines().collect::<Vec<_>>(), ["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn test_log_buffer_text_and_clear() {
        let mut log = LogBuffer::new();
        log.push("\x1b[33mfirst\x1b[0m");
        log.push("second");
        assert_eq!(log.text(), "first\nsecond\n");

        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.text(), "");
    }
}
