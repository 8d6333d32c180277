//! Dark theme palette for the splitter and its waveform view.

use egui::{Color32, Rounding, Stroke, Vec2};

/// Central theme: typography, spacing and every color the app paints with.
pub struct Theme;

impl Theme {
    // ── Typography ─────────────────────────────────────────────
    pub const FONT_XS: f32 = 11.0; // axis labels, handle badges

    // ── Spacing (4px base) ─────────────────────────────────────
    pub const SPACE_XS: f32 = 4.0;
    pub const SPACE_SM: f32 = 8.0;

    // ── Border radius ──────────────────────────────────────────
    pub const RADIUS: f32 = 6.0;
    pub const RADIUS_LG: f32 = 12.0;

    // ── Stroke widths ──────────────────────────────────────────
    pub const STROKE_SUBTLE: f32 = 0.5;
    pub const STROKE_EMPHASIS: f32 = 1.0;
    pub const DIVIDER_WIDTH: f32 = 1.0;

    // ── Backgrounds ────────────────────────────────────────────
    pub const fn bg() -> Color32 {
        Color32::from_rgb(18, 18, 22)
    }
    pub const fn bg1() -> Color32 {
        Color32::from_rgb(28, 28, 34)
    }
    pub const fn bg2() -> Color32 {
        Color32::from_rgb(35, 35, 42)
    }
    pub const fn bg3() -> Color32 {
        Color32::from_rgb(45, 45, 55)
    }
    pub const fn bg4() -> Color32 {
        Color32::from_rgb(55, 55, 68)
    }

    // ── Text (opacity-based white) ─────────────────────────────
    pub const fn t1() -> Color32 {
        Color32::from_rgba_premultiplied(235, 235, 235, 235)
    }
    pub const fn t2() -> Color32 {
        Color32::from_rgba_premultiplied(153, 153, 153, 153)
    }
    pub const fn t3() -> Color32 {
        Color32::from_rgba_premultiplied(89, 89, 89, 89)
    }

    // ── Accent ─────────────────────────────────────────────────
    pub const fn accent() -> Color32 {
        Color32::from_rgb(86, 130, 255)
    }
    /// Accent @ 8%.
    pub const fn accent_subtle() -> Color32 {
        Color32::from_rgba_premultiplied(7, 10, 20, 20)
    }
    /// Accent @ 15%.
    pub const fn accent_hover() -> Color32 {
        Color32::from_rgba_premultiplied(13, 20, 38, 38)
    }

    // ── White-alpha overlay helpers ────────────────────────────
    pub const fn white_04() -> Color32 {
        Color32::from_rgba_premultiplied(10, 10, 10, 10)
    }
    pub const fn white_06() -> Color32 {
        Color32::from_rgba_premultiplied(15, 15, 15, 15)
    }
    pub const fn white_10() -> Color32 {
        Color32::from_rgba_premultiplied(26, 26, 26, 26)
    }

    /// Section separators, white @ 6%.
    pub const fn divider() -> Color32 {
        Color32::from_rgba_premultiplied(15, 15, 15, 15)
    }

    // ── Semantic colors ────────────────────────────────────────
    pub const fn red() -> Color32 {
        Color32::from_rgb(255, 88, 85)
    }
    pub const fn green() -> Color32 {
        Color32::from_rgb(48, 213, 160)
    }
    pub const fn amber() -> Color32 {
        Color32::from_rgb(255, 184, 48)
    }

    // ── Waveform palette ───────────────────────────────────────
    /// Alternating segment bands.
    pub const fn band_even() -> Color32 {
        Self::bg1()
    }
    pub const fn band_odd() -> Color32 {
        Color32::from_rgb(32, 32, 44)
    }
    /// Positive half, at the center line and at full scale.
    pub const fn wave_pos_inner() -> Color32 {
        Color32::from_rgb(52, 82, 170)
    }
    pub const fn wave_pos_outer() -> Color32 {
        Color32::from_rgb(120, 160, 255)
    }
    /// Negative half, at the center line and at full scale.
    pub const fn wave_neg_inner() -> Color32 {
        Color32::from_rgb(40, 110, 130)
    }
    pub const fn wave_neg_outer() -> Color32 {
        Color32::from_rgb(34, 211, 238)
    }
    /// Overlay outside the trim range.
    pub const fn trim_dim() -> Color32 {
        Color32::from_rgba_premultiplied(0, 0, 0, 150)
    }

    // ── Color helpers ──────────────────────────────────────────

    /// Blend a color toward another by `t` (0..1).
    pub fn lerp(a: Color32, b: Color32, t: f32) -> Color32 {
        let t = t.clamp(0.0, 1.0);
        let inv = 1.0 - t;
        Color32::from_rgba_premultiplied(
            (a.r() as f32 * inv + b.r() as f32 * t) as u8,
            (a.g() as f32 * inv + b.g() as f32 * t) as u8,
            (a.b() as f32 * inv + b.b() as f32 * t) as u8,
            (a.a() as f32 * inv + b.a() as f32 * t) as u8,
        )
    }

    // ── Frame builders ─────────────────────────────────────────

    /// Standard side panel frame.
    pub fn panel_frame() -> egui::Frame {
        egui::Frame::none()
            .fill(Self::bg1())
            .inner_margin(egui::Margin::same(Self::SPACE_SM))
    }

    /// Frame for the menu and status bars.
    pub fn bar_frame() -> egui::Frame {
        egui::Frame::none()
            .fill(Self::bg1())
            .stroke(Stroke::new(Self::STROKE_SUBTLE, Self::white_06()))
            .inner_margin(egui::Margin::symmetric(12.0, 4.0))
    }

    /// Draw a 1px horizontal divider.
    pub fn draw_separator(ui: &mut egui::Ui) {
        let width = ui.available_width();
        let (resp, painter) =
            ui.allocate_painter(Vec2::new(width, Self::DIVIDER_WIDTH), egui::Sense::hover());
        painter.rect_filled(resp.rect, 0.0, Self::divider());
    }

    // ── Theme application ──────────────────────────────────────

    /// Apply the theme to an egui context.
    pub fn apply(ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();
        let visuals = &mut style.visuals;
        *visuals = egui::Visuals::dark();

        visuals.panel_fill = Self::bg1();
        visuals.window_fill = Self::bg2();
        visuals.extreme_bg_color = Self::bg();
        visuals.faint_bg_color = Self::bg2();

        visuals.widgets.noninteractive.bg_fill = Self::bg2();
        visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, Self::t2());
        visuals.widgets.noninteractive.bg_stroke =
            Stroke::new(Self::STROKE_SUBTLE, Self::white_04());
        visuals.widgets.noninteractive.rounding = Rounding::same(Self::RADIUS);

        visuals.widgets.inactive.bg_fill = Self::bg3();
        visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, Self::t2());
        visuals.widgets.inactive.bg_stroke = Stroke::new(Self::STROKE_SUBTLE, Self::white_04());
        visuals.widgets.inactive.rounding = Rounding::same(Self::RADIUS);

        visuals.widgets.hovered.bg_fill = Self::bg4();
        visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, Self::t1());
        visuals.widgets.hovered.bg_stroke = Stroke::new(Self::STROKE_SUBTLE, Self::accent_hover());
        visuals.widgets.hovered.rounding = Rounding::same(Self::RADIUS);

        visuals.widgets.active.bg_fill = Self::accent_subtle();
        visuals.widgets.active.fg_stroke = Stroke::new(Self::STROKE_EMPHASIS, Self::accent());
        visuals.widgets.active.bg_stroke = Stroke::new(Self::STROKE_EMPHASIS, Self::accent());
        visuals.widgets.active.rounding = Rounding::same(Self::RADIUS);

        visuals.selection.bg_fill = Self::accent_subtle();
        visuals.selection.stroke = Stroke::new(1.0, Self::accent());

        visuals.window_rounding = Rounding::same(Self::RADIUS_LG);
        visuals.window_stroke = Stroke::new(Self::STROKE_SUBTLE, Self::white_04());

        style.interaction.tooltip_delay = 0.4;

        ctx.set_style(style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints() {
        let a = Theme::wave_pos_inner();
        let b = Theme::wave_pos_outer();
        assert_eq!(Theme::lerp(a, b, 0.0), a);
        assert_eq!(Theme::lerp(a, b, 1.0), b);
        assert_eq!(Theme::lerp(a, b, 7.0), b);
    }
}
