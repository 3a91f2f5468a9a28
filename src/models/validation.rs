use strum::IntoEnumIterator;
use thiserror::Error;

use crate::config::{EVALUATION, ParamBounds};
use crate::domain::{Formula, FormulaField, Indicator, ParamKind};

/// True iff none of the seven fields is empty.
pub fn is_complete(formula: &Formula) -> bool {
    FormulaField::iter().all(|f| !formula.is_field_empty(f))
}

/// Fields still missing, in declaration order.
pub fn missing_fields(formula: &Formula) -> Vec<FormulaField> {
    FormulaField::iter()
        .filter(|f| formula.is_field_empty(*f))
        .collect()
}

/// Shape comparison used for the "Update" label: timeframe, both indicators and
/// the operator. Parameters are deliberately not compared, so editing only a
/// period does not count as a change.
pub fn has_changed_from_completed(current: &Formula, completed: Option<&Formula>) -> bool {
    let Some(completed) = completed else {
        return false;
    };
    current.timeframe != completed.timeframe
        || current.indicator1 != completed.indicator1
        || current.operator != completed.operator
        || current.indicator2 != completed.indicator2
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishLabel {
    Finish,
    Update,
}

impl FinishLabel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Finish => "Finish",
            Self::Update => "Update",
        }
    }
}

/// Whether the builder offers its finish control, given the saved formula for
/// the same category (if any).
pub fn should_show_finish_control(current: &Formula, completed: Option<&Formula>) -> bool {
    is_complete(current)
        && (completed.is_none() || has_changed_from_completed(current, completed))
}

pub fn finish_label(current: &Formula, completed: Option<&Formula>) -> FinishLabel {
    if has_changed_from_completed(current, completed) {
        FinishLabel::Update
    } else {
        FinishLabel::Finish
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("parameter is required")]
    Empty,
    #[error("'{0}' is not a number")]
    NotNumeric(String),
    #[error("'{0}' must be a whole number")]
    NotInteger(String),
    #[error("must be between {min} and {max}")]
    OutOfRange { min: f64, max: f64 },
}

fn check_bounds(value: f64, bounds: ParamBounds) -> Result<(), ParamError> {
    if (bounds.min..=bounds.max).contains(&value) {
        Ok(())
    } else {
        Err(ParamError::OutOfRange {
            min: bounds.min,
            max: bounds.max,
        })
    }
}

/// Validates an indicator parameter as typed in the builder.
///
/// Literals accept any finite number. Every other kind must be a whole number
/// inside its configured bounds.
pub fn validate_param(indicator: Indicator, raw: &str) -> Result<f64, ParamError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ParamError::Empty);
    }
    let value: f64 = text
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| ParamError::NotNumeric(text.to_string()))?;

    let bounds = match indicator.param_kind() {
        ParamKind::Literal => return Ok(value),
        ParamKind::Period => EVALUATION.period_bounds,
        ParamKind::BarOffset => EVALUATION.bar_offset_bounds,
        ParamKind::PriorPeriods => EVALUATION.prior_period_bounds,
    };

    if value.fract() != 0.0 {
        return Err(ParamError::NotInteger(text.to_string()));
    }
    check_bounds(value, bounds)?;
    Ok(value)
}

/// Canonical spelling of a parameter: whole-number kinds print as plain
/// integers (`"020"` and `"20.0"` become `"20"`), literals are trimmed.
/// Text that fails validation is returned unchanged so the error stays visible.
pub fn normalize_param(indicator: Indicator, raw: &str) -> String {
    match validate_param(indicator, raw) {
        Ok(_) if indicator.is_literal() => raw.trim().to_string(),
        Ok(value) => (value as i64).to_string(),
        Err(_) => raw.to_string(),
    }
}

/// Both operand parameters of a formula, each checked against its indicator.
/// Operands with no indicator chosen yet are skipped.
pub fn param_errors(formula: &Formula) -> Vec<(FormulaField, ParamError)> {
    [
        (
            FormulaField::Indicator1Param,
            formula.indicator1,
            &formula.indicator1_param,
        ),
        (
            FormulaField::Indicator2Param,
            formula.indicator2,
            &formula.indicator2_param,
        ),
    ]
    .into_iter()
    .filter_map(|(field, ind, raw)| {
        let ind = ind?;
        validate_param(ind, raw).err().map(|e| (field, e))
    })
    .collect()
}
