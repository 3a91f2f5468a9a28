mod condition;
mod formula_state;
mod hover;
mod preview;
mod scan_result;
mod template;
mod validation;

pub use condition::{
    Condition, ConditionEvaluation, Operand, OverlayIssue, compare, compress_ranges,
    evaluate_price_based, evaluate_time_based,
};
pub use formula_state::{FormulaState, set_field};
pub use hover::{HoverContext, classify};
pub use preview::{DisplayState, PreviewRow, StatusMessage, format_formula, preview_rows, status_message};
pub use scan_result::{
    Prediction, PredictionRow, ScanError, ScanMetrics, ScanResponse, ScanResult,
    parse_scan_response,
};
pub use template::{FormulaTemplate, TemplateLibrary};
pub use validation::{
    FinishLabel, ParamError, finish_label, has_changed_from_completed, is_complete,
    missing_fields, normalize_param, param_errors, should_show_finish_control, validate_param,
};
