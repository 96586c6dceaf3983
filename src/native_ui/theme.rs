//! Colors and sizing for the main window

use eframe::egui::{self, Color32, Rounding, Stroke};

pub struct Theme;

impl Theme {
    pub const BG_PRIMARY: Color32 = Color32::from_rgb(18, 19, 24);
    pub const BG_SECONDARY: Color32 = Color32::from_rgb(28, 30, 37);
    pub const BG_LOG: Color32 = Color32::from_rgb(12, 13, 16);

    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(232, 234, 240);
    pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(178, 182, 194);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(128, 133, 148);
    pub const TEXT_SECTION: Color32 = Color32::from_rgb(110, 115, 132);

    pub const ACCENT_PRIMARY: Color32 = Color32::from_rgb(124, 92, 255);
    pub const SEPARATOR: Color32 = Color32::from_rgb(44, 47, 56);
    pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(54, 58, 70);

    pub const GREEN: Color32 = Color32::from_rgb(34, 197, 94);
    pub const RED: Color32 = Color32::from_rgb(239, 68, 68);

    /// Dark visuals tuned to the palette above
    pub fn visuals() -> egui::Visuals {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = Self::BG_PRIMARY;
        visuals.window_fill = Self::BG_PRIMARY;
        visuals.extreme_bg_color = Self::BG_LOG;
        visuals.selection.bg_fill = Self::ACCENT_PRIMARY;
        visuals.widgets.noninteractive.bg_stroke = Stroke::new(1.0, Self::SEPARATOR);
        visuals.widgets.inactive.rounding = Rounding::same(Radius::SM);
        visuals.widgets.hovered.rounding = Rounding::same(Radius::SM);
        visuals.widgets.active.rounding = Rounding::same(Radius::SM);
        visuals
    }
}

pub struct FontSize;

impl FontSize {
    pub const XS: f32 = 11.0;
    pub const SM: f32 = 12.5;
    pub const MD: f32 = 14.0;
    pub const XL: f32 = 20.0;
}

pub struct Spacing;

impl Spacing {
    pub const XS: f32 = 4.0;
    pub const SM: f32 = 8.0;
    pub const MD: f32 = 12.0;
    pub const LG: f32 = 16.0;
}

pub struct Radius;

impl Radius {
    pub const SM: f32 = 6.0;
    pub const MD: f32 = 8.0;
    pub const LG: f32 = 10.0;
}
