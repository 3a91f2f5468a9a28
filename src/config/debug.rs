//! Debugging feature flags.

#[allow(dead_code)]
pub struct LogFlags {
    /// Every `FormulaEdit` and category switch in the builder.
    pub log_formula_edits: bool,

    /// Hover classification results (fires on every pointer move, so noisy).
    pub log_hover: bool,

    /// Animator ticks that changed an opacity.
    pub log_animation: bool,

    /// Scan requests, responses and validation failures.
    pub log_scan: bool,

    /// Template save/load.
    pub log_templates: bool,

    /// Per-category evaluation summaries (range counts, missing series).
    pub log_evaluation: bool,

    /// Activate trace_time macro (for cool scope-level timing)
    pub log_performance: bool,
}

pub const DF: LogFlags = LogFlags {
    log_formula_edits: false,
    log_hover: false,
    log_animation: false,
    log_scan: true,
    log_templates: true,
    log_evaluation: true,
    log_performance: false,
};
