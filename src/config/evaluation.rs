//! Formula evaluation and parameter validation settings

/// Inclusive bounds for a numeric parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamBounds {
    pub min: f64,
    pub max: f64,
}

pub struct EvaluationConfig {
    /// `==` holds when `|lhs - rhs| / rhs` is below this (0.1%).
    pub equality_tolerance: f64,
    /// Lookback length for moving averages and oscillators.
    pub period_bounds: ParamBounds,
    /// Bars back for open/high/low/close references.
    pub bar_offset_bounds: ParamBounds,
    /// Periods back for prior high/low.
    pub prior_period_bounds: ParamBounds,
}

pub const EVALUATION: EvaluationConfig = EvaluationConfig {
    equality_tolerance: 0.001,
    period_bounds: ParamBounds {
        min: 1.0,
        max: 500.0,
    },
    bar_offset_bounds: ParamBounds {
        min: 0.0,
        max: 500.0,
    },
    prior_period_bounds: ParamBounds {
        min: 1.0,
        max: 100.0,
    },
};
