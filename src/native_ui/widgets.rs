// ════════════════════════════════════════════════════════════════════════════════
// HELPER COMPONENTS - Reusable form rows for the option tabs
// ════════════════════════════════════════════════════════════════════════════════

use std::ops::RangeInclusive;

use eframe::egui::{self, Color32, RichText, Rounding, Stroke, Vec2, Rect};

use super::theme::{FontSize, Radius, Spacing, Theme};

/// Section header - subtle, uppercase
pub fn section_header(ui: &mut egui::Ui, text: &str) {
    ui.label(
        RichText::new(text.to_uppercase())
            .size(FontSize::XS)
            .color(Theme::TEXT_SECTION)
    );
    ui.add_space(Spacing::SM);
}

/// Card container - grouped options with rounded corners
pub fn settings_card(ui: &mut egui::Ui, content: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::none()
        .fill(Theme::BG_SECONDARY)
        .rounding(Rounding::same(Radius::LG))
        .inner_margin(Spacing::MD)
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            content(ui);
        });
}

/// Divider line between rows in a card
pub fn setting_divider(ui: &mut egui::Ui) {
    ui.add_space(Spacing::SM);
    let rect = Rect::from_min_size(
        ui.cursor().min,
        Vec2::new(ui.available_width(), 1.0),
    );
    ui.painter().rect_filled(rect, 0.0, Theme::SEPARATOR);
    ui.add_space(Spacing::SM + 1.0);
}

/// Title and subtitle on the left, control on the right
fn setting_row(ui: &mut egui::Ui, title: &str, subtitle: &str, control: impl FnOnce(&mut egui::Ui)) {
    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.label(RichText::new(title).size(FontSize::MD).color(Theme::TEXT_PRIMARY));
            if !subtitle.is_empty() {
                ui.label(RichText::new(subtitle).size(FontSize::SM).color(Theme::TEXT_MUTED));
            }
        });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), control);
    });
}

/// Toggle row; returns true when the value changed
pub fn setting_toggle(ui: &mut egui::Ui, title: &str, subtitle: &str, value: &mut bool) -> bool {
    let mut changed = false;
    setting_row(ui, title, subtitle, |ui| {
        changed = ui.checkbox(value, "").changed();
    });
    changed
}

/// Bounded integer row
pub fn setting_number(
    ui: &mut egui::Ui,
    title: &str,
    subtitle: &str,
    value: &mut u32,
    range: RangeInclusive<u32>,
    enabled: bool,
) {
    setting_row(ui, title, subtitle, |ui| {
        ui.add_enabled(enabled, egui::DragValue::new(value).range(range).speed(0.2));
    });
}

/// Free-text row with a hint
pub fn setting_text(ui: &mut egui::Ui, title: &str, hint: &str, value: &mut String) {
    ui.label(RichText::new(title).size(FontSize::MD).color(Theme::TEXT_PRIMARY));
    ui.add_space(Spacing::XS);
    ui.add(
        egui::TextEdit::singleline(value)
            .hint_text(hint)
            .desired_width(f32::INFINITY)
    );
}

/// Drop-down row over a fixed set of values
pub fn setting_choice<T: Copy + PartialEq>(
    ui: &mut egui::Ui,
    title: &str,
    id: &str,
    value: &mut T,
    choices: &[T],
    label: fn(&T) -> &'static str,
    enabled: bool,
) {
    setting_row(ui, title, "", |ui| {
        ui.add_enabled_ui(enabled, |ui| {
            egui::ComboBox::from_id_salt(id)
                .selected_text(label(value))
                .show_ui(ui, |ui| {
                    for choice in choices {
                        ui.selectable_value(value, *choice, label(choice));
                    }
                });
        });
    });
}

/// Status message banner
pub fn status_message(ui: &mut egui::Ui, msg: &str, is_error: bool) {
    let (bg_color, text_color, icon) = if is_error {
        (Color32::from_rgba_unmultiplied(239, 68, 68, 15), Theme::RED, "✕")
    } else {
        (Color32::from_rgba_unmultiplied(34, 197, 94, 15), Theme::GREEN, "✓")
    };

    egui::Frame::none()
        .fill(bg_color)
        .rounding(Rounding::same(Radius::SM))
        .inner_margin(Spacing::SM)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new(icon).size(FontSize::SM).color(text_color));
                ui.add_space(Spacing::XS);
                ui.label(RichText::new(msg).size(FontSize::SM).color(text_color));
            });
        });
}

/// Primary action button
pub fn primary_button(ui: &mut egui::Ui, text: &str, enabled: bool) -> bool {
    ui.add_enabled(
        enabled,
        egui::Button::new(
            RichText::new(text)
                .size(FontSize::MD)
                .color(Color32::WHITE)
        )
        .fill(Theme::ACCENT_PRIMARY)
        .rounding(Rounding::same(Radius::SM))
        .min_size(Vec2::new(110.0, 30.0))
    ).clicked()
}

/// Secondary action button
pub fn secondary_button(ui: &mut egui::Ui, text: &str, enabled: bool) -> bool {
    ui.add_enabled(
        enabled,
        egui::Button::new(
            RichText::new(text)
                .size(FontSize::SM)
                .color(Theme::TEXT_PRIMARY)
        )
        .fill(Theme::BG_SECONDARY)
        .stroke(Stroke::new(1.0, Theme::BORDER_SUBTLE))
        .rounding(Rounding::same(Radius::SM))
        .min_size(Vec2::new(0.0, 30.0))
    ).clicked()
}

/// Small text button (no background)
pub fn text_button(ui: &mut egui::Ui, text: &str, color: Color32) -> bool {
    ui.add(
        egui::Button::new(
            RichText::new(text)
                .size(FontSize::SM)
                .color(color)
        )
        .fill(Color32::TRANSPARENT)
        .stroke(Stroke::NONE)
    ).clicked()
}
