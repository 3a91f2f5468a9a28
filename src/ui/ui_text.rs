use std::sync::LazyLock;

pub const ICON_CHECK: &str = "✔";
pub const ICON_PENCIL: &str = "✏";
pub const ICON_CLOSE: &str = "✖";
pub const ICON_WARNING: &str = "⚠";
pub const ICON_PLAY: &str = "▶";
pub const ICON_EYE: &str = "👁";

pub struct UiText {
    pub app_title: String,

    // --- Builder panel ---
    pub fb_heading: String,
    pub fb_category: String,
    pub fb_include_neutral: String,
    pub fb_timeframe: String,
    pub fb_indicator_1: String,
    pub fb_indicator_2: String,
    pub fb_operator: String,
    pub fb_param: String,
    pub fb_value: String,
    pub fb_select: String,
    pub fb_clear: String,
    pub fb_preview_heading: String,
    pub fb_display_heading: String,

    // --- Templates ---
    pub tp_heading: String,
    pub tp_name_hint: String,
    pub tp_save: String,
    pub tp_load: String,
    pub tp_delete: String,
    pub tp_none: String,

    // --- Scan ---
    pub sc_run: String,
    pub sc_running: String,
    pub sc_no_provider: String,
    pub sc_total: String,
    pub sc_correct: String,
    pub sc_accuracy: String,

    // --- Chart ---
    pub plot_x_axis: String,
    pub plot_y_axis: String,
    pub plot_price_line: String,
    pub plot_no_result: String,
    pub mode_explore: String,
    pub mode_actual: String,
    pub interp_linear: String,
    pub interp_step: String,
    pub interp_smooth: String,

    // --- Hover readout ---
    pub hv_no_zone: String,
    pub hv_predicted: String,
    pub hv_actual: String,
    pub hv_correct: String,
    pub hv_wrong: String,

    pub label_warning: String,
}

pub static UI_TEXT: LazyLock<UiText> = LazyLock::new(|| UiText {
    app_title: "Bias Scope".to_string(),

    fb_heading: "Formula Builder".to_string(),
    fb_category: "Bias".to_string(),
    fb_include_neutral: "Include Neutral".to_string(),
    fb_timeframe: "Timeframe".to_string(),
    fb_indicator_1: "Indicator".to_string(),
    fb_indicator_2: "Compare To".to_string(),
    fb_operator: "Operator".to_string(),
    fb_param: "Param".to_string(),
    fb_value: "Value".to_string(),
    fb_select: "Select...".to_string(),
    fb_clear: format!("{} Clear", ICON_CLOSE),
    fb_preview_heading: "Preview".to_string(),
    fb_display_heading: format!("{} Show", ICON_EYE),

    tp_heading: "Templates".to_string(),
    tp_name_hint: "Template name".to_string(),
    tp_save: "Save as Template".to_string(),
    tp_load: "Load".to_string(),
    tp_delete: ICON_CLOSE.to_string(),
    tp_none: "No saved templates".to_string(),

    sc_run: format!("{} Run Test", ICON_PLAY),
    sc_running: "Running test...".to_string(),
    sc_no_provider: "No scanner configured (use --scanner or --results)".to_string(),
    sc_total: "Predictions".to_string(),
    sc_correct: "Correct".to_string(),
    sc_accuracy: "Accuracy".to_string(),

    plot_x_axis: "Time (UTC)".to_string(),
    plot_y_axis: "Price".to_string(),
    plot_price_line: "Price".to_string(),
    plot_no_result: "Run a test to see formula overlays".to_string(),
    mode_explore: "Explore".to_string(),
    mode_actual: "Actual".to_string(),
    interp_linear: "Linear".to_string(),
    interp_step: "Step".to_string(),
    interp_smooth: "Smooth".to_string(),

    hv_no_zone: "No zone".to_string(),
    hv_predicted: "Predicted".to_string(),
    hv_actual: "Actual".to_string(),
    hv_correct: format!("{} correct", ICON_CHECK),
    hv_wrong: format!("{} wrong", ICON_CLOSE),

    label_warning: ICON_WARNING.to_string(),
});
