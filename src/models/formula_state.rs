use std::collections::BTreeMap;

use crate::domain::{BiasType, Formula, FormulaEdit};
use crate::models::validation::normalize_param;

/// Copy of `formula` with one field replaced.
#[must_use]
pub fn set_field(formula: &Formula, edit: FormulaEdit) -> Formula {
    let mut next = formula.clone();
    match edit {
        FormulaEdit::BiasType(v) => next.bias_type = v,
        FormulaEdit::Timeframe(v) => next.timeframe = v,
        FormulaEdit::Indicator1(v) => next.indicator1 = v,
        FormulaEdit::Indicator1Param(v) => next.indicator1_param = v,
        FormulaEdit::Operator(v) => next.operator = v,
        FormulaEdit::Indicator2(v) => next.indicator2 = v,
        FormulaEdit::Indicator2Param(v) => next.indicator2_param = v,
    }
    next
}

/// The formula being edited plus the saved formula (if any) of each category.
///
/// All transitions are pure: they return a new state and leave `self` untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormulaState {
    pub current: Formula,
    completed: BTreeMap<BiasType, Formula>,
}

impl FormulaState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State rebuilt from a set of saved formulas, nothing in progress.
    pub fn from_completed(completed: BTreeMap<BiasType, Formula>) -> Self {
        Self {
            current: Formula::default(),
            completed,
        }
    }

    pub fn completed(&self, bias: BiasType) -> Option<&Formula> {
        self.completed.get(&bias)
    }

    pub fn completed_map(&self) -> &BTreeMap<BiasType, Formula> {
        &self.completed
    }

    pub fn has_any_completed(&self) -> bool {
        !self.completed.is_empty()
    }

    /// Category currently selected in the builder, if any.
    pub fn editing(&self) -> Option<BiasType> {
        self.current.bias_type
    }

    #[must_use]
    pub fn with_edit(&self, edit: FormulaEdit) -> Self {
        Self {
            current: set_field(&self.current, edit),
            completed: self.completed.clone(),
        }
    }

    /// Switches the builder to `new_type`.
    ///
    /// 1. A saved formula for `new_type` is resumed.
    /// 2. Otherwise, with neutral excluded, a saved formula for the opposite
    ///    category is mirrored in (see [`crate::domain::Operator::mirrored`]).
    /// 3. Otherwise the builder starts from a blank formula.
    #[must_use]
    pub fn change_bias_type(&self, new_type: BiasType, include_neutral: bool) -> Self {
        let current = if let Some(saved) = self.completed.get(&new_type) {
            saved.clone()
        } else if let Some(source) = new_type
            .opposite()
            .filter(|_| !include_neutral)
            .and_then(|opp| self.completed.get(&opp))
        {
            source.mirrored_into(new_type)
        } else {
            Formula::empty_for(new_type)
        };

        Self {
            current,
            completed: self.completed.clone(),
        }
    }

    /// Saves the current formula under its category and clears the builder.
    /// Valid parameters are stored in canonical form; nothing is rejected here.
    /// A formula without a category is left as is.
    #[must_use]
    pub fn complete_formula(&self) -> Self {
        let Some(bias) = self.current.bias_type else {
            return self.clone();
        };
        let mut saved = self.current.clone();
        if let Some(ind) = saved.indicator1 {
            saved.indicator1_param = normalize_param(ind, &saved.indicator1_param);
        }
        if let Some(ind) = saved.indicator2 {
            saved.indicator2_param = normalize_param(ind, &saved.indicator2_param);
        }
        let mut completed = self.completed.clone();
        completed.insert(bias, saved);
        Self {
            current: Formula::default(),
            completed,
        }
    }

    /// Drops the saved formula for `bias`. If that category is open in the
    /// builder, the builder is reset to a blank formula for it.
    #[must_use]
    pub fn clear_category(&self, bias: BiasType) -> Self {
        let mut completed = self.completed.clone();
        completed.remove(&bias);
        let current = if self.current.bias_type == Some(bias) {
            Formula::empty_for(bias)
        } else {
            self.current.clone()
        };
        Self { current, completed }
    }

    /// Formulas to hand to the scan collaborator: saved formulas of the
    /// required categories, in display order.
    pub fn formulas_for_scan(&self, include_neutral: bool) -> Vec<Formula> {
        BiasType::required(include_neutral)
            .into_iter()
            .filter_map(|b| self.completed.get(&b).cloned())
            .collect()
    }

    /// Required categories without a saved formula, in display order.
    pub fn missing_categories(&self, include_neutral: bool) -> Vec<BiasType> {
        BiasType::required(include_neutral)
            .into_iter()
            .filter(|b| !self.completed.contains_key(b))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FormulaField, Indicator, Operator, Timeframe};
    use strum::IntoEnumIterator;

    fn bullish_close_above_sma() -> Formula {
        Formula {
            bias_type: Some(BiasType::Bullish),
            timeframe: Some(Timeframe::H1),
            indicator1: Some(Indicator::Close),
            indicator1_param: "0".into(),
            operator: Some(Operator::Gt),
            indicator2: Some(Indicator::Sma),
            indicator2_param: "20".into(),
        }
    }

    fn state_with(formula: Formula) -> FormulaState {
        FormulaState {
            current: formula,
            completed: BTreeMap::new(),
        }
        .complete_formula()
    }

    #[test]
    fn set_field_only_touches_named_field() {
        let f = bullish_close_above_sma();
        let g = set_field(&f, FormulaEdit::Indicator2Param("50".into()));
        assert_eq!(g.indicator2_param, "50");
        assert_eq!(f.indicator2_param, "20");
        for field in FormulaField::iter().filter(|x| *x != FormulaField::Indicator2Param) {
            assert_eq!(f.is_field_empty(field), g.is_field_empty(field));
        }
        assert_eq!(g.indicator1, f.indicator1);
    }

    #[test]
    fn complete_formula_saves_and_resets() {
        let s = state_with(bullish_close_above_sma());
        assert_eq!(s.completed(BiasType::Bullish), Some(&bullish_close_above_sma()));
        assert_eq!(s.current, Formula::default());
    }

    #[test]
    fn complete_formula_stores_canonical_params() {
        let mut f = bullish_close_above_sma();
        f.indicator1_param = " 0 ".into();
        f.indicator2_param = "020".into();
        let s = state_with(f);
        assert_eq!(s.completed(BiasType::Bullish), Some(&bullish_close_above_sma()));

        let mut bad = bullish_close_above_sma();
        bad.indicator2_param = "2.5".into();
        let s = state_with(bad);
        assert_eq!(
            s.completed(BiasType::Bullish).map(|f| f.indicator2_param.as_str()),
            Some("2.5")
        );
    }

    #[test]
    fn complete_without_category_is_noop() {
        let s = FormulaState::new().with_edit(FormulaEdit::Timeframe(Some(Timeframe::D1)));
        let t = s.complete_formula();
        assert_eq!(s, t);
        assert!(!t.has_any_completed());
    }

    #[test]
    fn reselecting_saved_category_resumes_it() {
        let s = state_with(bullish_close_above_sma()).change_bias_type(BiasType::Bullish, false);
        assert_eq!(s.current, bullish_close_above_sma());
    }

    #[test]
    fn opposite_category_is_mirrored_when_neutral_excluded() {
        let s = state_with(bullish_close_above_sma()).change_bias_type(BiasType::Bearish, false);
        assert_eq!(s.current.bias_type, Some(BiasType::Bearish));
        assert_eq!(s.current.operator, Some(Operator::Lt));
        assert_eq!(s.current.indicator2, Some(Indicator::Sma));
        // Mirroring fills the builder only; nothing is saved for bearish yet.
        assert!(s.completed(BiasType::Bearish).is_none());
    }

    #[test]
    fn non_strict_operator_passes_through_when_mirrored() {
        let mut f = bullish_close_above_sma();
        f.operator = Some(Operator::Ge);
        let s = state_with(f).change_bias_type(BiasType::Bearish, false);
        assert_eq!(s.current.operator, Some(Operator::Ge));
    }

    #[test]
    fn no_mirroring_when_neutral_included() {
        let s = state_with(bullish_close_above_sma()).change_bias_type(BiasType::Bearish, true);
        assert_eq!(s.current, Formula::empty_for(BiasType::Bearish));
    }

    #[test]
    fn switching_to_fresh_category_leaves_no_stale_fields() {
        let in_progress = FormulaState::new()
            .change_bias_type(BiasType::Bullish, true)
            .with_edit(FormulaEdit::Timeframe(Some(Timeframe::H4)))
            .with_edit(FormulaEdit::Indicator1(Some(Indicator::Rsi)))
            .with_edit(FormulaEdit::Indicator1Param("14".into()));

        let s = in_progress.change_bias_type(BiasType::Neutral, true);
        assert_eq!(s.current, Formula::empty_for(BiasType::Neutral));
        for field in FormulaField::iter().filter(|f| *f != FormulaField::BiasType) {
            assert!(s.current.is_field_empty(field), "{field} should be empty");
        }
    }

    #[test]
    fn neutral_never_auto_populates() {
        let s = state_with(bullish_close_above_sma()).change_bias_type(BiasType::Neutral, false);
        assert_eq!(s.current, Formula::empty_for(BiasType::Neutral));
    }

    #[test]
    fn clear_category_removes_saved_formula() {
        let s = state_with(bullish_close_above_sma())
            .change_bias_type(BiasType::Bullish, false)
            .clear_category(BiasType::Bullish);
        assert!(s.completed(BiasType::Bullish).is_none());
        assert_eq!(s.current, Formula::empty_for(BiasType::Bullish));
    }

    #[test]
    fn scan_formulas_and_missing_follow_required_set() {
        let s = state_with(bullish_close_above_sma());
        assert_eq!(s.formulas_for_scan(false).len(), 1);
        assert_eq!(s.missing_categories(false), vec![BiasType::Bearish]);
        assert_eq!(
            s.missing_categories(true),
            vec![BiasType::Neutral, BiasType::Bearish]
        );
    }
}
