use thiserror::Error;

use crate::config::{DF, EVALUATION};
use crate::domain::{ActiveRange, Formula, Indicator, IndicatorSeries, IndicatorSet, Operator};
use crate::models::validation::{ParamError, is_complete, validate_param};
use crate::trace_time;

/// Per-category reason an overlay cannot be drawn. Never fatal: other
/// categories keep evaluating.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OverlayIssue {
    #[error("formula is incomplete")]
    Incomplete,
    #[error("{indicator} parameter: {error}")]
    InvalidParam {
        indicator: Indicator,
        error: ParamError,
    },
    #[error("no series '{key}' in the scan result")]
    MissingSeries { key: String },
    #[error("both operands are constant values")]
    ConstantOperands,
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Series(IndicatorSeries),
    Constant(f64),
}

impl Operand {
    /// Value at exactly `timestamp`. Constants hold everywhere.
    pub fn value_at(&self, timestamp: i64) -> Option<f64> {
        match self {
            Self::Series(s) => s.value_at(timestamp),
            Self::Constant(v) => Some(*v),
        }
    }

    /// Value of the sample nearest to `timestamp`.
    pub fn value_near(&self, timestamp: i64) -> Option<f64> {
        match self {
            Self::Series(s) => s.nearest(timestamp).map(|p| p.value),
            Self::Constant(v) => Some(*v),
        }
    }

    pub fn series(&self) -> Option<&IndicatorSeries> {
        match self {
            Self::Series(s) => Some(s),
            Self::Constant(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Series(s) if s.is_empty())
    }
}

fn approx_equal(lhs: f64, rhs: f64) -> bool {
    if rhs == 0.0 {
        return false;
    }
    ((lhs - rhs) / rhs).abs() < EVALUATION.equality_tolerance
}

/// Applies `op` to one pair of values.
///
/// `==` uses a relative tolerance against `rhs` and is false whenever `rhs`
/// is zero. `!=` is its complement except at zero, where it is exact.
/// Any non-finite input compares false.
pub fn compare(op: Operator, lhs: f64, rhs: f64) -> bool {
    if !lhs.is_finite() || !rhs.is_finite() {
        return false;
    }
    match op {
        Operator::Gt => lhs > rhs,
        Operator::Lt => lhs < rhs,
        Operator::Ge => lhs >= rhs,
        Operator::Le => lhs <= rhs,
        Operator::Equal => approx_equal(lhs, rhs),
        Operator::NotEqual if rhs == 0.0 => lhs != rhs,
        Operator::NotEqual => !approx_equal(lhs, rhs),
    }
}

/// Collapses a time-ordered truth series into maximal inclusive runs of `true`.
pub fn compress_ranges(truth: &[(i64, bool)]) -> Vec<ActiveRange> {
    let mut ranges = Vec::new();
    let mut open: Option<(i64, i64)> = None;

    for &(timestamp, holds) in truth {
        open = match (open, holds) {
            (None, true) => Some((timestamp, timestamp)),
            (Some((first, _)), true) => Some((first, timestamp)),
            (Some((first, last)), false) => {
                ranges.push(ActiveRange::new(first, last));
                None
            }
            (None, false) => None,
        };
    }
    if let Some((first, last)) = open {
        ranges.push(ActiveRange::new(first, last));
    }
    ranges
}

/// Bar-by-bar truth of a time-based condition plus its compressed ranges.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionEvaluation {
    pub truth: Vec<(i64, bool)>,
    pub ranges: Vec<ActiveRange>,
}

impl ConditionEvaluation {
    pub fn is_empty(&self) -> bool {
        self.truth.is_empty()
    }

    /// Exclusive end of the time a range covers on the chart: its last bar
    /// extends to the next bar, or by the previous gap at the series end.
    fn covered_until(&self, range: &ActiveRange) -> i64 {
        let Ok(i) = self
            .truth
            .binary_search_by_key(&range.last_time, |(t, _)| *t)
        else {
            return range.last_time + 1;
        };
        match (self.truth.get(i + 1), i.checked_sub(1).map(|p| self.truth[p])) {
            (Some((next, _)), _) => *next,
            (None, Some((prev, _))) => range.last_time + (range.last_time - prev),
            (None, None) => range.last_time + 1,
        }
    }

    /// The range whose drawn span contains `timestamp`, with its index.
    pub fn range_at(&self, timestamp: i64) -> Option<(usize, ActiveRange)> {
        let idx = self
            .ranges
            .partition_point(|r| self.covered_until(r) <= timestamp);
        self.ranges
            .get(idx)
            .filter(|r| r.first_time <= timestamp)
            .map(|r| (idx, *r))
    }

    pub fn last_range(&self) -> Option<ActiveRange> {
        self.ranges.last().copied()
    }
}

/// Evaluates `lhs op rhs` at every timestamp of the series side(s). Timestamps
/// missing on the other side are skipped. With a series on the left its
/// timestamps drive the walk, otherwise the right series does.
pub fn evaluate_time_based(op: Operator, lhs: &Operand, rhs: &Operand) -> ConditionEvaluation {
    let driver = match (lhs, rhs) {
        (Operand::Series(s), _) | (Operand::Constant(_), Operand::Series(s)) => s,
        (Operand::Constant(_), Operand::Constant(_)) => return ConditionEvaluation::default(),
    };

    let truth: Vec<(i64, bool)> = driver
        .points()
        .iter()
        .filter_map(|p| {
            let l = lhs.value_at(p.timestamp)?;
            let r = rhs.value_at(p.timestamp)?;
            Some((p.timestamp, compare(op, l, r)))
        })
        .collect();
    let ranges = compress_ranges(&truth);
    ConditionEvaluation { truth, ranges }
}

/// Whether `price op boundary` holds at the boundary bar nearest `timestamp`.
/// `None` when the boundary has no data.
pub fn evaluate_price_based(
    op: Operator,
    price: f64,
    boundary: &Operand,
    timestamp: i64,
) -> Option<bool> {
    boundary
        .value_near(timestamp)
        .map(|rhs| compare(op, price, rhs))
}

/// A formula resolved against one scan result's indicator set.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Left operand is a live price supplied at evaluation time.
    PriceBased { operator: Operator, boundary: Operand },
    /// Both operands come from the scan result.
    TimeBased {
        operator: Operator,
        lhs: Operand,
        rhs: Operand,
    },
}

fn resolve_operand(
    indicator: Indicator,
    param: &str,
    set: &IndicatorSet,
) -> Result<Operand, OverlayIssue> {
    let value =
        validate_param(indicator, param).map_err(|error| OverlayIssue::InvalidParam {
            indicator,
            error,
        })?;
    let Some(key) = indicator.series_key(value) else {
        return Ok(Operand::Constant(value));
    };
    set.get(&key)
        .map(|s| Operand::Series(s.clone()))
        .ok_or(OverlayIssue::MissingSeries { key })
}

impl Condition {
    /// Resolves a complete formula into a condition over the series in `set`.
    pub fn resolve(formula: &Formula, set: &IndicatorSet) -> Result<Self, OverlayIssue> {
        let (Some(ind1), Some(operator), Some(ind2)) =
            (formula.indicator1, formula.operator, formula.indicator2)
        else {
            return Err(OverlayIssue::Incomplete);
        };
        if !is_complete(formula) {
            return Err(OverlayIssue::Incomplete);
        }

        let rhs = resolve_operand(ind2, &formula.indicator2_param, set)?;
        if formula.is_price_based() {
            // The left side is replaced by the hovered price, but its parameter
            // is still checked so bad input is reported.
            validate_param(ind1, &formula.indicator1_param).map_err(|error| {
                OverlayIssue::InvalidParam {
                    indicator: ind1,
                    error,
                }
            })?;
            return Ok(Self::PriceBased {
                operator,
                boundary: rhs,
            });
        }

        let lhs = resolve_operand(ind1, &formula.indicator1_param, set)?;
        if matches!((&lhs, &rhs), (Operand::Constant(_), Operand::Constant(_))) {
            return Err(OverlayIssue::ConstantOperands);
        }
        Ok(Self::TimeBased { operator, lhs, rhs })
    }

    pub fn operator(&self) -> Operator {
        match self {
            Self::PriceBased { operator, .. } | Self::TimeBased { operator, .. } => *operator,
        }
    }

    pub fn boundary(&self) -> Option<&Operand> {
        match self {
            Self::PriceBased { boundary, .. } => Some(boundary),
            Self::TimeBased { .. } => None,
        }
    }

    /// Price-based truth for a hovered point. Time-based conditions do not
    /// take part in price classification.
    pub fn holds_at(&self, price: f64, timestamp: i64) -> Option<bool> {
        match self {
            Self::PriceBased { operator, boundary } => {
                evaluate_price_based(*operator, price, boundary, timestamp)
            }
            Self::TimeBased { .. } => None,
        }
    }

    pub fn evaluate(&self) -> Option<ConditionEvaluation> {
        match self {
            Self::TimeBased { operator, lhs, rhs } => {
                let eval = trace_time!("evaluate_time_based", 2000, {
                    evaluate_time_based(*operator, lhs, rhs)
                });
                if DF.log_evaluation {
                    log::info!(
                        "Evaluated {} bars into {} active ranges",
                        eval.truth.len(),
                        eval.ranges.len()
                    );
                }
                Some(eval)
            }
            Self::PriceBased { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BiasType, Timeframe};

    fn series(ts: &[i64], vals: &[f64]) -> Operand {
        Operand::Series(IndicatorSeries::from_pairs(ts, vals))
    }

    fn expand(ranges: &[ActiveRange], timestamps: &[i64]) -> Vec<bool> {
        timestamps
            .iter()
            .map(|t| ranges.iter().any(|r| r.contains(*t)))
            .collect()
    }

    #[test]
    fn reference_example_yields_single_range() {
        let lhs = series(&[1, 2, 3, 4], &[10.0, 11.0, 13.0, 14.0]);
        let rhs = series(&[1, 2, 3, 4], &[12.0, 11.0, 9.0, 8.0]);
        let eval = evaluate_time_based(Operator::Gt, &lhs, &rhs);
        assert_eq!(eval.ranges, vec![ActiveRange::new(3, 4)]);
        assert_eq!(
            eval.truth,
            vec![(1, false), (2, false), (3, true), (4, true)]
        );
    }

    #[test]
    fn ranges_round_trip_to_truth_series() {
        let patterns: [&[bool]; 7] = [
            &[],
            &[false, false],
            &[true],
            &[true, true, true],
            &[true, false, true, false, true],
            &[false, true, true, false, false, true, true],
            &[true, true, false, false, false, true],
        ];
        for pattern in patterns {
            let timestamps: Vec<i64> = (0..pattern.len() as i64).map(|i| i * 60).collect();
            let truth: Vec<(i64, bool)> =
                timestamps.iter().copied().zip(pattern.iter().copied()).collect();
            let ranges = compress_ranges(&truth);
            assert_eq!(expand(&ranges, &timestamps), pattern.to_vec(), "{pattern:?}");
            assert!(ranges.windows(2).all(|w| w[0].last_time < w[1].first_time));
        }
    }

    #[test]
    fn misaligned_timestamps_are_skipped() {
        let lhs = series(&[1, 2, 3, 4], &[5.0, 5.0, 5.0, 5.0]);
        let rhs = series(&[1, 3, 4], &[1.0, 1.0, 9.0]);
        let eval = evaluate_time_based(Operator::Gt, &lhs, &rhs);
        assert_eq!(eval.truth, vec![(1, true), (3, true), (4, false)]);
        assert_eq!(eval.ranges, vec![ActiveRange::new(1, 3)]);
    }

    #[test]
    fn equality_uses_relative_tolerance() {
        assert!(compare(Operator::Equal, 100.05, 100.0));
        assert!(!compare(Operator::Equal, 100.2, 100.0));
        assert!(compare(Operator::Equal, -50.01, -50.0));
        assert!(!compare(Operator::NotEqual, 100.05, 100.0));
    }

    #[test]
    fn equality_against_zero_is_false() {
        assert!(!compare(Operator::Equal, 0.0, 0.0));
        assert!(!compare(Operator::Equal, 1e-12, 0.0));
        assert!(compare(Operator::NotEqual, 1.0, 0.0));
        assert!(!compare(Operator::NotEqual, 0.0, 0.0));
    }

    #[test]
    fn non_finite_values_compare_false() {
        for op in [Operator::Gt, Operator::Lt, Operator::Equal, Operator::NotEqual] {
            assert!(!compare(op, f64::NAN, 1.0));
            assert!(!compare(op, 1.0, f64::INFINITY));
        }
    }

    #[test]
    fn constant_rhs_compares_every_bar() {
        let lhs = series(&[1, 2, 3], &[20.0, 35.0, 28.0]);
        let eval = evaluate_time_based(Operator::Lt, &lhs, &Operand::Constant(30.0));
        assert_eq!(
            eval.ranges,
            vec![ActiveRange::new(1, 1), ActiveRange::new(3, 3)]
        );
    }

    #[test]
    fn price_based_uses_nearest_boundary_bar() {
        let boundary = series(&[100, 200, 300], &[10.0, 20.0, 30.0]);
        assert_eq!(evaluate_price_based(Operator::Gt, 25.0, &boundary, 190), Some(true));
        assert_eq!(evaluate_price_based(Operator::Gt, 25.0, &boundary, 260), Some(false));
        let empty = Operand::Series(IndicatorSeries::default());
        assert_eq!(evaluate_price_based(Operator::Gt, 25.0, &empty, 100), None);
    }

    #[test]
    fn range_at_finds_containing_range() {
        let eval = ConditionEvaluation {
            truth: vec![],
            ranges: vec![ActiveRange::new(1, 3), ActiveRange::new(7, 9)],
        };
        assert_eq!(eval.range_at(2), Some((0, ActiveRange::new(1, 3))));
        assert_eq!(eval.range_at(9), Some((1, ActiveRange::new(7, 9))));
        assert_eq!(eval.range_at(5), None);
        assert_eq!(eval.range_at(10), None);
    }

    #[test]
    fn range_at_covers_the_width_of_the_last_bar() {
        let eval = ConditionEvaluation {
            truth: vec![(1, false), (2, true), (3, true), (5, false), (6, true), (8, true)],
            ranges: vec![ActiveRange::new(2, 3), ActiveRange::new(6, 8)],
        };
        // Bar 3 is drawn up to bar 5.
        assert_eq!(eval.range_at(4), Some((0, ActiveRange::new(2, 3))));
        assert_eq!(eval.range_at(5), None);
        // Bar 8 has no successor and borrows the 6..8 gap.
        assert_eq!(eval.range_at(9), Some((1, ActiveRange::new(6, 8))));
        assert_eq!(eval.range_at(10), None);
        assert_eq!(eval.range_at(1), None);
    }

    fn formula(ind1: Indicator, p1: &str, op: Operator, ind2: Indicator, p2: &str) -> Formula {
        Formula {
            bias_type: Some(BiasType::Bullish),
            timeframe: Some(Timeframe::H1),
            indicator1: Some(ind1),
            indicator1_param: p1.into(),
            operator: Some(op),
            indicator2: Some(ind2),
            indicator2_param: p2.into(),
        }
    }

    #[test]
    fn resolve_picks_mode_from_left_operand() {
        let mut set = IndicatorSet::new();
        set.insert("sma_20", IndicatorSeries::from_pairs(&[1, 2], &[1.0, 2.0]));
        set.insert("rsi_14", IndicatorSeries::from_pairs(&[1, 2], &[40.0, 60.0]));

        let price = Condition::resolve(
            &formula(Indicator::Close, "0", Operator::Gt, Indicator::Sma, "20"),
            &set,
        )
        .unwrap();
        assert!(matches!(price, Condition::PriceBased { .. }));
        assert!(price.evaluate().is_none());

        let time = Condition::resolve(
            &formula(Indicator::Rsi, "14", Operator::Gt, Indicator::Value, "50"),
            &set,
        )
        .unwrap();
        let eval = time.evaluate().unwrap();
        assert_eq!(eval.ranges, vec![ActiveRange::new(2, 2)]);
        assert_eq!(time.holds_at(1.0, 1), None);
    }

    #[test]
    fn equivalent_param_spellings_find_the_same_series() {
        let mut set = IndicatorSet::new();
        set.insert("sma_20", IndicatorSeries::from_pairs(&[1, 2], &[1.0, 2.0]));
        for param in ["20", "20.0", "020", "+20"] {
            let cond = Condition::resolve(
                &formula(Indicator::Close, "0", Operator::Gt, Indicator::Sma, param),
                &set,
            );
            assert!(
                matches!(cond, Ok(Condition::PriceBased { .. })),
                "{param}: {cond:?}"
            );
        }
    }

    #[test]
    fn resolve_reports_issues_per_formula() {
        let set = IndicatorSet::new();
        assert_eq!(
            Condition::resolve(
                &formula(Indicator::Close, "0", Operator::Gt, Indicator::Ema, "50"),
                &set
            ),
            Err(OverlayIssue::MissingSeries {
                key: "ema_50".into()
            })
        );
        assert!(matches!(
            Condition::resolve(
                &formula(Indicator::Close, "0", Operator::Gt, Indicator::Value, "abc"),
                &set
            ),
            Err(OverlayIssue::InvalidParam {
                indicator: Indicator::Value,
                ..
            })
        ));
        assert_eq!(
            Condition::resolve(&Formula::empty_for(BiasType::Neutral), &set),
            Err(OverlayIssue::Incomplete)
        );
        assert_eq!(
            Condition::resolve(
                &formula(Indicator::Value, "1", Operator::Gt, Indicator::Value, "2"),
                &set
            ),
            Err(OverlayIssue::ConstantOperands)
        );
    }
}
