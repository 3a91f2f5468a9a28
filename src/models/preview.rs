use std::fmt;

use crate::domain::{BiasType, Formula, Indicator};
use crate::models::formula_state::FormulaState;

const PLACEHOLDER: &str = "?";

/// Per-category preview/overlay visibility, independent of completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayState {
    display_formulas: [bool; BiasType::COUNT],
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            display_formulas: [true; BiasType::COUNT],
        }
    }
}

impl DisplayState {
    pub fn is_shown(&self, bias: BiasType) -> bool {
        self.display_formulas[bias.index()]
    }

    pub fn set_shown(&mut self, bias: BiasType, shown: bool) {
        self.display_formulas[bias.index()] = shown;
    }

    pub fn toggle(&mut self, bias: BiasType) {
        let slot = &mut self.display_formulas[bias.index()];
        *slot = !*slot;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRow {
    pub bias: BiasType,
    pub text: String,
    pub emoji: &'static str,
    /// Saved formula (true) or the one being built (false).
    pub completed: bool,
}

fn operand_text(indicator: Option<Indicator>, param: &str) -> String {
    let param = param.trim();
    let param = if param.is_empty() { PLACEHOLDER } else { param };
    match indicator {
        Some(Indicator::Value) => param.to_string(),
        Some(ind) => format!("{ind}({param})"),
        None => PLACEHOLDER.to_string(),
    }
}

/// `<timeframe> <indicator1>(<param>) <operator> <indicator2>(<param>) → <Label>`
pub fn format_formula(formula: &Formula) -> String {
    let timeframe = formula
        .timeframe
        .map_or_else(|| PLACEHOLDER.to_string(), |t| t.to_string());
    let operator = formula.operator.map_or(PLACEHOLDER, |o| o.symbol());
    let label = formula
        .bias_type
        .map_or_else(|| PLACEHOLDER.to_string(), |b| b.to_string());
    format!(
        "{timeframe} {} {operator} {} → {label}",
        operand_text(formula.indicator1, &formula.indicator1_param),
        operand_text(formula.indicator2, &formula.indicator2_param),
    )
}

/// Rows in display order. Saved formulas appear when toggled on and not open in
/// the builder; the formula being built always appears.
pub fn preview_rows(state: &FormulaState, display: &DisplayState) -> Vec<PreviewRow> {
    let editing = state.editing();
    let mut rows = Vec::new();

    for bias in BiasType::DISPLAY_ORDER {
        if editing == Some(bias) {
            rows.push(PreviewRow {
                bias,
                text: format_formula(&state.current),
                emoji: bias.emoji(),
                completed: false,
            });
            continue;
        }
        if let Some(saved) = state.completed(bias)
            && display.is_shown(bias)
        {
            rows.push(PreviewRow {
                bias,
                text: format_formula(saved),
                emoji: bias.emoji(),
                completed: true,
            });
        }
    }
    rows
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatusMessage {
    /// Nothing started yet.
    Empty,
    /// A category without a saved formula is open in the builder.
    Building(BiasType),
    /// Required categories without a saved formula.
    Missing(Vec<BiasType>),
    Ready,
}

impl StatusMessage {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Building(bias) => write!(f, "Building {bias} formula"),
            Self::Missing(missing) => {
                let names: Vec<String> = missing.iter().map(ToString::to_string).collect();
                let joined = match names.split_last() {
                    Some((last, rest)) if !rest.is_empty() => {
                        format!("{} & {last}", rest.join(", "))
                    }
                    _ => names.concat(),
                };
                let plural = if missing.len() > 1 { "s" } else { "" };
                write!(f, "Missing {joined} formula{plural}")
            }
            Self::Ready => f.write_str("Ready to test"),
        }
    }
}

pub fn status_message(state: &FormulaState, include_neutral: bool) -> StatusMessage {
    if let Some(bias) = state.editing()
        && state.completed(bias).is_none()
    {
        return StatusMessage::Building(bias);
    }
    if !state.has_any_completed() {
        return StatusMessage::Empty;
    }
    let missing = state.missing_categories(include_neutral);
    if missing.is_empty() {
        StatusMessage::Ready
    } else {
        StatusMessage::Missing(missing)
    }
}
