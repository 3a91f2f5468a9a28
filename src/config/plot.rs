//! Plot visualization configuration

use eframe::egui::Color32;

pub struct PlotConfig {
    // --- BIAS CATEGORY COLORS ---
    pub bullish_color: Color32,
    pub neutral_color: Color32,
    pub bearish_color: Color32,

    // --- ZONE FILL (two-stop gradient) ---
    /// Alpha factor at the boundary line (strongest stop)
    pub zone_gradient_near_pct: f32,
    /// Alpha factor at the plot edge (weakest stop)
    pub zone_gradient_far_pct: f32,
    /// Width of zone boundary lines
    pub zone_boundary_line_width: f32,
    /// Curve subdivisions per segment for the smoothed interpolation mode
    pub smooth_subdivisions: usize,

    // --- SHADE FILL ---
    pub shade_fill_opacity_pct: f32,
    /// Narrowest shaded bar, in physical pixels
    pub min_shade_width_px: f32,

    // --- LABELS ---
    pub overlay_label_font_size: f32,
    /// Distance of top/bottom labels from the plot edge
    pub overlay_label_margin_px: f32,

    // --- PRICE LINE & MARKERS ---
    pub price_line_color: Color32,
    pub price_line_width: f32,
    pub marker_correct_color: Color32,
    pub marker_wrong_color: Color32,
    pub marker_radius: f32,
    pub hover_crosshair_color: Color32,

    pub plot_y_padding_pct: f64, // Y-Axis Padding factor (e.g. 0.05 = 5% padding top and bottom)

    // --- SEMANTIC COLORS ---
    pub color_profit: Color32,
    pub color_loss: Color32,
    pub color_info: Color32,
    pub color_warning: Color32,
    pub color_text_neutral: Color32,
    pub color_text_subdued: Color32,

    // UI WIDGET STYLES
    pub color_widget_border: Color32, // Subtle border
}

pub const PLOT_CONFIG: PlotConfig = PlotConfig {
    bullish_color: Color32::from_rgb(38, 166, 154), // TradingView Green
    neutral_color: Color32::from_rgb(173, 216, 230), // Light Blue
    bearish_color: Color32::from_rgb(239, 83, 80),  // TradingView Red

    zone_gradient_near_pct: 0.45,
    zone_gradient_far_pct: 0.05,
    zone_boundary_line_width: 2.0,
    smooth_subdivisions: 8,

    shade_fill_opacity_pct: 0.20,
    min_shade_width_px: 2.0,

    overlay_label_font_size: 14.0,
    overlay_label_margin_px: 18.0,

    price_line_color: Color32::from_rgb(255, 215, 0), // Gold
    price_line_width: 1.5,
    marker_correct_color: Color32::from_rgb(100, 255, 100),
    marker_wrong_color: Color32::from_rgb(255, 80, 80),
    marker_radius: 3.0,
    hover_crosshair_color: Color32::from_gray(160),

    plot_y_padding_pct: 0.05,

    color_profit: Color32::from_rgb(100, 255, 100),
    color_loss: Color32::from_rgb(255, 80, 80),
    color_info: Color32::from_rgb(173, 216, 230),
    color_warning: Color32::from_rgb(255, 215, 0),
    color_text_neutral: Color32::LIGHT_GRAY,
    color_text_subdued: Color32::GRAY,

    color_widget_border: Color32::from_gray(60),
};
