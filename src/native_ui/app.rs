//! Main window: option tabs on the left, live log on the right

use std::time::Duration;

use chrono::{DateTime, Local};
use eframe::egui::{self, Color32, RichText, Rounding, Stroke, Vec2, Rect};

use super::log_view::LogBuffer;
use super::theme::{FontSize, Spacing, Theme};
use super::widgets::{
    primary_button, secondary_button, section_header, setting_choice, setting_divider,
    setting_number, setting_text, setting_toggle, settings_card, status_message, text_button,
};
use crate::core::{
    build_command, display_command, IdType, ReportSort, ScanOptions, MAX_CONNECTIONS_RANGE,
    RETRIES_RANGE, TIMEOUT_RANGE, TOP_SITES_RANGE,
};
use crate::host::{ProcessRunner, RunEvent};
use crate::settings::SettingsStore;

/// Repaint cadence while output may arrive
const REPAINT_INTERVAL: Duration = Duration::from_millis(100);

/// Which option tab is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Input,
    Options,
    Proxy,
    Output,
}

impl Tab {
    fn all() -> [Tab; 4] {
        [Tab::Input, Tab::Options, Tab::Proxy, Tab::Output]
    }

    fn label(&self) -> &'static str {
        match self {
            Tab::Input => "Input",
            Tab::Options => "Options",
            Tab::Proxy => "Proxy",
            Tab::Output => "Output",
        }
    }
}

/// Open the window and block until it is closed
pub fn run(store: SettingsStore, runner: ProcessRunner) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Maigret Night")
            .with_inner_size([1000.0, 600.0])
            .with_min_inner_size([720.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Maigret Night",
        options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(Theme::visuals());
            Ok(Box::new(MaigretApp::new(store, runner)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("Window error: {}", e))
}

/// Window state
pub struct MaigretApp {
    options: ScanOptions,
    tab: Tab,
    runner: ProcessRunner,
    log: LogBuffer,
    /// Banner text and whether it reports an error
    status: Option<(String, bool)>,
    store: SettingsStore,
    started_at: Option<DateTime<Local>>,
}

impl MaigretApp {
    /// Start from saved settings; a broken settings file is reported, not fatal
    pub fn new(store: SettingsStore, runner: ProcessRunner) -> Self {
        let (options, status) = match store.load() {
            Ok(Some(options)) => (options, None),
            Ok(None) => (ScanOptions::default(), None),
            Err(e) => {
                tracing::error!("Failed to load settings: {}", e);
                (ScanOptions::default(), Some((e.to_string(), true)))
            }
        };

        Self {
            options,
            tab: Tab::default(),
            runner,
            log: LogBuffer::new(),
            status,
            store,
            started_at: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.runner.is_running()
    }

    /// Run is allowed when idle and an identifier is set
    pub fn can_run(&self) -> bool {
        !self.is_running() && self.options.has_username()
    }

    /// Build the command from the current options and start it
    pub fn start_run(&mut self) {
        if !self.can_run() {
            return;
        }
        let tokens = build_command(&self.options);
        self.start_tokens(&tokens);
    }

    fn start_tokens(&mut self, tokens: &[String]) {
        self.log.push(&format!("Running command: {}", display_command(tokens)));

        match self.runner.start(tokens) {
            Ok(()) => {
                let now = Local::now();
                self.started_at = Some(now);
                self.status = Some((format!("Running since {}", now.format("%H:%M:%S")), false));
            }
            Err(e) => {
                tracing::error!("Failed to start maigret: {}", e);
                self.log.push(&e.to_string());
                self.status = Some((e.to_string(), true));
            }
        }
    }

    /// Stop the running process; no-op when idle
    pub fn stop_run(&mut self) {
        if !self.is_running() {
            return;
        }
        if let Err(e) = self.runner.terminate() {
            tracing::error!("Failed to stop maigret: {}", e);
            self.status = Some((e.to_string(), true));
            return;
        }
        self.pump_events();
    }

    /// Move pending runner events into the log
    pub fn pump_events(&mut self) {
        for event in self.runner.poll() {
            match event {
                RunEvent::Line(line) => self.log.push(&line),
                RunEvent::Completed { exit_code } => {
                    let code = exit_code.map_or_else(|| "none".to_string(), |c| c.to_string());
                    self.log.push(&format!("Maigret finished (exit code {}).", code));
                    self.status = Some((format!("Finished{}", self.elapsed_suffix()), false));
                    self.started_at = None;
                }
                RunEvent::Terminated => {
                    self.log.push("Maigret process terminated.");
                    self.status = Some((format!("Stopped{}", self.elapsed_suffix()), false));
                    self.started_at = None;
                }
            }
        }
    }

    fn elapsed_suffix(&self) -> String {
        match self.started_at {
            Some(started) => format!(" after {}s", (Local::now() - started).num_seconds()),
            None => String::new(),
        }
    }

    pub fn save_settings(&mut self) {
        self.status = Some(match self.store.save(&self.options) {
            Ok(()) => (format!("Settings saved to {}", self.store.path().display()), false),
            Err(e) => {
                tracing::error!("Failed to save settings: {}", e);
                (e.to_string(), true)
            }
        });
    }

    /// Replace the options from disk; on error the current ones stay
    pub fn load_settings(&mut self) {
        self.status = Some(match self.store.reload_into(&mut self.options) {
            Ok(true) => ("Settings loaded".to_string(), false),
            Ok(false) => ("No saved settings yet".to_string(), false),
            Err(e) => {
                tracing::error!("Failed to load settings: {}", e);
                (e.to_string(), true)
            }
        });
    }

    // ════════════════════════════════════════════════════════════════════════════
    // DRAWING
    // ════════════════════════════════════════════════════════════════════════════

    fn show_header(&mut self, ui: &mut egui::Ui) {
        ui.add_space(Spacing::SM);
        ui.horizontal(|ui| {
            ui.label(
                RichText::new("Maigret Night")
                    .size(FontSize::XL)
                    .color(Theme::TEXT_PRIMARY)
                    .strong()
            );
            ui.add_space(Spacing::LG);

            for tab in Tab::all() {
                let is_selected = self.tab == tab;
                let text_color = if is_selected {
                    Theme::TEXT_PRIMARY
                } else {
                    Theme::TEXT_MUTED
                };

                let response = ui.add(
                    egui::Button::new(
                        RichText::new(tab.label())
                            .size(FontSize::SM)
                            .color(text_color)
                    )
                    .fill(Color32::TRANSPARENT)
                    .stroke(Stroke::NONE)
                    .min_size(Vec2::new(0.0, 32.0))
                );

                // Underline indicator for selected tab
                if is_selected {
                    let rect = response.rect;
                    let indicator_rect = Rect::from_min_size(
                        egui::pos2(rect.min.x, rect.max.y - 2.0),
                        Vec2::new(rect.width(), 2.0),
                    );
                    ui.painter().rect_filled(
                        indicator_rect,
                        Rounding::same(1.0),
                        Theme::ACCENT_PRIMARY,
                    );
                }

                if response.clicked() {
                    self.tab = tab;
                }
            }
        });
        ui.add_space(Spacing::XS);
    }

    fn show_form(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add_space(Spacing::MD);
                ui.add_enabled_ui(!self.is_running(), |ui| match self.tab {
                    Tab::Input => self.show_input_tab(ui),
                    Tab::Options => self.show_options_tab(ui),
                    Tab::Proxy => self.show_proxy_tab(ui),
                    Tab::Output => self.show_output_tab(ui),
                });
                ui.add_space(Spacing::LG);
            });
    }

    fn show_input_tab(&mut self, ui: &mut egui::Ui) {
        section_header(ui, "Target");
        settings_card(ui, |ui| {
            ui.label(RichText::new("Username").size(FontSize::MD).color(Theme::TEXT_PRIMARY));
            ui.add_space(Spacing::XS);
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.options.username)
                    .hint_text("e.g. alice")
                    .desired_width(f32::INFINITY)
            );
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                self.start_run();
            }

            setting_divider(ui);

            setting_choice(
                ui,
                "ID type",
                "id_type",
                &mut self.options.id_type,
                IdType::all(),
                IdType::as_str,
                true,
            );
        });
    }

    fn show_options_tab(&mut self, ui: &mut egui::Ui) {
        let opts = &mut self.options;

        section_header(ui, "Limits");
        settings_card(ui, |ui| {
            setting_number(ui, "Timeout", "Seconds per site", &mut opts.timeout, TIMEOUT_RANGE, true);
            setting_divider(ui);
            setting_number(ui, "Retries", "For failed requests", &mut opts.retries, RETRIES_RANGE, true);
            setting_divider(ui);
            setting_number(
                ui,
                "Max connections",
                "Concurrent requests",
                &mut opts.max_connections,
                MAX_CONNECTIONS_RANGE,
                true,
            );
        });

        ui.add_space(Spacing::LG);

        section_header(ui, "Search");
        settings_card(ui, |ui| {
            setting_toggle(ui, "No recursion", "Skip searching usernames found on profiles", &mut opts.no_recursion);
            setting_divider(ui);
            setting_toggle(ui, "No extracting", "Skip parsing profile pages", &mut opts.no_extracting);
            setting_divider(ui);
            setting_toggle(ui, "Permute", "Try permutations of the username", &mut opts.permute);
            setting_divider(ui);
            setting_toggle(ui, "All sites", "Check every known site", &mut opts.all_sites);
            setting_divider(ui);
            setting_toggle(ui, "Enable top sites", "Limit to the most popular sites", &mut opts.top_sites_enabled);
            setting_number(
                ui,
                "Top sites count",
                "",
                &mut opts.top_sites,
                TOP_SITES_RANGE,
                opts.top_sites_enabled,
            );
            setting_divider(ui);
            setting_toggle(ui, "Use disabled sites", "Include sites marked as disabled", &mut opts.use_disabled_sites);
            setting_divider(ui);
            setting_text(ui, "Tags", "comma-separated, e.g. photo,us", &mut opts.tags);
            ui.add_space(Spacing::SM);
            setting_text(ui, "Site", "limit to one site", &mut opts.site);
        });

        ui.add_space(Spacing::LG);

        section_header(ui, "Advanced");
        settings_card(ui, |ui| {
            setting_text(ui, "Parse URL", "page to extract identifiers from", &mut opts.parse_url);
            ui.add_space(Spacing::SM);
            setting_text(ui, "Submit URL", "new site to add", &mut opts.submit_url);
            setting_divider(ui);
            setting_toggle(ui, "Self check", "Verify the site database", &mut opts.self_check);
            setting_divider(ui);
            setting_toggle(ui, "Stats", "Print database statistics", &mut opts.stats);
            setting_divider(ui);
            setting_toggle(ui, "Enable report sorting", "", &mut opts.report_sorting_enabled);
            setting_choice(
                ui,
                "Report sort",
                "report_sort",
                &mut opts.report_sort,
                ReportSort::all(),
                ReportSort::as_str,
                opts.report_sorting_enabled,
            );
        });
    }

    fn show_proxy_tab(&mut self, ui: &mut egui::Ui) {
        let opts = &mut self.options;

        section_header(ui, "Proxies");
        settings_card(ui, |ui| {
            setting_text(ui, "Proxy URL", "socks5://127.0.0.1:1080", &mut opts.proxy);
            setting_divider(ui);
            setting_text(ui, "Tor proxy URL", "socks5://127.0.0.1:9050", &mut opts.tor_proxy);
            setting_divider(ui);
            setting_text(ui, "I2P proxy URL", "http://127.0.0.1:4444", &mut opts.i2p_proxy);
        });
    }

    fn show_output_tab(&mut self, ui: &mut egui::Ui) {
        let opts = &mut self.options;

        section_header(ui, "Report formats");
        settings_card(ui, |ui| {
            setting_toggle(ui, "CSV", "", &mut opts.csv);
            setting_divider(ui);
            setting_toggle(ui, "PDF", "", &mut opts.pdf);
            setting_divider(ui);
            setting_toggle(ui, "TXT", "", &mut opts.txt);
            setting_divider(ui);
            setting_toggle(ui, "HTML", "", &mut opts.html);
        });
    }

    fn show_actions(&mut self, ui: &mut egui::Ui) {
        ui.add_space(Spacing::SM);
        ui.horizontal(|ui| {
            let running = self.is_running();

            if primary_button(ui, "Run Maigret", self.can_run()) {
                self.start_run();
            }
            if secondary_button(ui, "Stop Maigret", running) {
                self.stop_run();
            }

            ui.add_space(Spacing::LG);

            if secondary_button(ui, "Save settings", true) {
                self.save_settings();
            }
            if secondary_button(ui, "Load settings", !running) {
                self.load_settings();
            }
        });

        if let Some((msg, is_error)) = &self.status {
            ui.add_space(Spacing::SM);
            status_message(ui, msg, *is_error);
        }
        ui.add_space(Spacing::SM);
    }

    fn show_log(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            section_header(ui, "Output");
            ui.label(
                RichText::new(format!("{} lines", self.log.len()))
                    .size(FontSize::XS)
                    .color(Theme::TEXT_MUTED)
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if text_button(ui, "Clear", Theme::TEXT_SECONDARY) {
                    self.log.clear();
                }
                if text_button(ui, "Copy", Theme::TEXT_SECONDARY) {
                    ui.ctx().copy_text(self.log.text());
                }
            });
        });

        self.log.show(ui);
    }
}

impl eframe::App for MaigretApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump_events();

        egui::TopBottomPanel::top("header").show(ctx, |ui| self.show_header(ui));
        egui::TopBottomPanel::bottom("actions").show(ctx, |ui| self.show_actions(ui));
        egui::SidePanel::left("form")
            .resizable(true)
            .default_width(420.0)
            .min_width(320.0)
            .show(ctx, |ui| self.show_form(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.show_log(ui));

        if self.is_running() {
            ctx.request_repaint_after(REPAINT_INTERVAL);
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Instant;

    fn app_in(dir: &tempfile::TempDir, runner: ProcessRunner) -> MaigretApp {
        MaigretApp::new(SettingsStore::at(dir.path().join("settings.json")), runner)
    }

    fn pump_until_idle(app: &mut MaigretApp) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while app.is_running() && Instant::now() < deadline {
            app.pump_events();
            std::thread::sleep(Duration::from_millis(20));
        }
        app.pump_events();
    }

    fn log_lines(app: &MaigretApp) -> Vec<String> {
        app.log.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_new_without_settings_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_in(&dir, ProcessRunner::new());
        assert_eq!(app.options, ScanOptions::default());
        assert!(app.status.is_none());
        assert!(!app.can_run());
    }

    #[test]
    fn test_new_with_broken_settings_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("settings.json"), "not json").unwrap();
        let app = app_in(&dir, ProcessRunner::new());
        assert_eq!(app.options, ScanOptions::default());
        assert!(matches!(app.status, Some((_, true))));
    }

    #[test]
    fn test_run_streams_output_then_finishes() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, ProcessRunner::new().with_program("/bin/echo"));
        app.options.username = "alice".to_string();

        app.start_run();
        assert!(app.is_running());
        pump_until_idle(&mut app);

        let lines = log_lines(&app);
        assert_eq!(
            lines[0],
            "Running command: maigret alice --timeout 30 --retries 0 --max-connections 10 --id-type username"
        );
        assert_eq!(lines[1], "alice --timeout 30 --retries 0 --max-connections 10 --id-type username");
        assert_eq!(lines[2], "Maigret finished (exit code 0).");
        assert!(app.can_run());
    }

    #[test]
    fn test_stop_terminates_and_notes_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, ProcessRunner::new());
        app.start_tokens(&[
            "sh".to_string(),
            "-c".to_string(),
            "exec sleep 30".to_string(),
        ]);
        assert!(app.is_running());

        app.stop_run();
        assert!(!app.is_running());
        assert_eq!(log_lines(&app).last().map(String::as_str), Some("Maigret process terminated."));
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, ProcessRunner::new());
        app.stop_run();
        assert!(app.log.is_empty());
        assert!(app.status.is_none());
    }

    #[test]
    fn test_missing_binary_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, ProcessRunner::new().with_program("/nonexistent/maigret"));
        app.options.username = "bob".to_string();

        app.start_run();
        assert!(!app.is_running());
        assert!(matches!(app.status, Some((_, true))));
    }

    #[test]
    fn test_save_and_load_settings() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, ProcessRunner::new());
        app.options.username = "carol".to_string();
        app.options.csv = true;
        app.save_settings();
        assert!(matches!(app.status, Some((_, false))));

        app.options = ScanOptions::default();
        app.load_settings();
        assert_eq!(app.options.username, "carol");
        assert!(app.options.csv);
    }

    #[test]
    fn test_load_broken_settings_keeps_options() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir, ProcessRunner::new());
        app.options.username = "dave".to_string();
        std::fs::write(dir.path().join("settings.json"), "{ broken").unwrap();

        app.load_settings();
        assert_eq!(app.options.username, "dave");
        assert!(matches!(app.status, Some((_, true))));
    }
}
