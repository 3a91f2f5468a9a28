// src/app/state.rs

use crate::config::DF;
use crate::domain::{BiasType, FormulaEdit};
use crate::models::{
    DisplayState, FormulaState, FormulaTemplate, ScanMetrics, StatusMessage, TemplateLibrary,
    status_message,
};
use crate::ui::FormulaAction;

/// The formulas being edited plus the switches that shape them.
#[derive(Debug, Clone, Default)]
pub(crate) struct Workspace {
    pub(crate) formulas: FormulaState,
    pub(crate) display: DisplayState,
    pub(crate) include_neutral: bool,
}

/// What a workspace action touched, so the app knows which caches to refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct WorkspaceChange {
    pub(crate) formulas: bool,
    pub(crate) display: bool,
}

impl WorkspaceChange {
    const FORMULAS: Self = Self {
        formulas: true,
        display: false,
    };
    const DISPLAY: Self = Self {
        formulas: false,
        display: true,
    };

    pub(crate) fn any(self) -> bool {
        self.formulas || self.display
    }
}

impl Workspace {
    pub(crate) fn new(include_neutral: bool) -> Self {
        Self {
            include_neutral,
            ..Self::default()
        }
    }

    pub(crate) fn status(&self) -> StatusMessage {
        status_message(&self.formulas, self.include_neutral)
    }

    /// Applies a builder action that only concerns the formulas and toggles.
    /// Template, scan and other app-level actions are ignored here.
    pub(crate) fn apply(&mut self, action: &FormulaAction) -> WorkspaceChange {
        #[cfg(debug_assertions)]
        if DF.log_formula_edits {
            log::info!("Workspace action: {:?}", action);
        }
        match action {
            FormulaAction::SelectCategory(bias) => {
                self.formulas = self
                    .formulas
                    .change_bias_type(*bias, self.include_neutral);
                WorkspaceChange::FORMULAS
            }
            FormulaAction::Edit(edit) => {
                self.formulas = self.formulas.with_edit(edit.clone());
                self.seed_default_param(edit);
                WorkspaceChange::FORMULAS
            }
            FormulaAction::Finish => {
                self.formulas = self.formulas.complete_formula();
                WorkspaceChange::FORMULAS
            }
            FormulaAction::ClearCategory(bias) => {
                self.formulas = self.formulas.clear_category(*bias);
                WorkspaceChange::FORMULAS
            }
            FormulaAction::SetIncludeNeutral(include) => {
                self.include_neutral = *include;
                if !include && self.formulas.editing() == Some(BiasType::Neutral) {
                    self.formulas = self
                        .formulas
                        .change_bias_type(BiasType::Bullish, false);
                }
                WorkspaceChange::FORMULAS
            }
            FormulaAction::ToggleDisplay(bias) => {
                self.display.toggle(*bias);
                WorkspaceChange::DISPLAY
            }
            FormulaAction::SaveTemplate(_)
            | FormulaAction::LoadTemplate(_)
            | FormulaAction::DeleteTemplate(_)
            | FormulaAction::RunScan => WorkspaceChange::default(),
        }
    }

    /// Picking an indicator for an operand with no parameter fills in the
    /// indicator's usual one.
    fn seed_default_param(&mut self, edit: &FormulaEdit) {
        let current = &self.formulas.current;
        let seed = match edit {
            FormulaEdit::Indicator1(Some(ind)) if current.indicator1_param.trim().is_empty() => {
                Some(FormulaEdit::Indicator1Param(ind.default_param().to_string()))
            }
            FormulaEdit::Indicator2(Some(ind)) if current.indicator2_param.trim().is_empty() => {
                Some(FormulaEdit::Indicator2Param(ind.default_param().to_string()))
            }
            _ => None,
        };
        if let Some(seed) = seed {
            self.formulas = self.formulas.with_edit(seed);
        }
    }

    pub(crate) fn snapshot(&self, name: &str, saved_at: i64) -> FormulaTemplate {
        FormulaTemplate::capture(name, &self.formulas, self.include_neutral, saved_at)
    }

    /// Replaces the formulas wholesale with the template's.
    pub(crate) fn load(&mut self, template: &FormulaTemplate) {
        self.formulas = template.to_state();
        self.include_neutral = template.include_neutral;
    }
}

/// Progress of the scan collaborator.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) enum ScanState {
    #[default]
    Idle,
    Running,
    Done(ScanMetrics),
    Failed(String),
}

impl ScanState {
    pub(crate) fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Saved templates plus where they live.
#[derive(Debug, Clone, Default)]
pub(crate) struct TemplateStore {
    pub(crate) library: TemplateLibrary,
    pub(crate) path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Indicator, Operator, Timeframe};

    fn build_bullish(ws: &mut Workspace) {
        ws.apply(&FormulaAction::SelectCategory(BiasType::Bullish));
        for edit in [
            FormulaEdit::Timeframe(Some(Timeframe::H1)),
            FormulaEdit::Indicator1(Some(Indicator::Close)),
            FormulaEdit::Operator(Some(Operator::Gt)),
            FormulaEdit::Indicator2(Some(Indicator::Sma)),
        ] {
            ws.apply(&FormulaAction::Edit(edit));
        }
    }

    #[test]
    fn picking_indicator_seeds_its_default_param() {
        let mut ws = Workspace::new(false);
        build_bullish(&mut ws);
        assert_eq!(ws.formulas.current.indicator1_param, "0");
        assert_eq!(ws.formulas.current.indicator2_param, "20");
    }

    #[test]
    fn seeding_keeps_a_typed_param() {
        let mut ws = Workspace::new(false);
        ws.apply(&FormulaAction::SelectCategory(BiasType::Bullish));
        ws.apply(&FormulaAction::Edit(FormulaEdit::Indicator2Param("50".into())));
        ws.apply(&FormulaAction::Edit(FormulaEdit::Indicator2(Some(Indicator::Ema))));
        assert_eq!(ws.formulas.current.indicator2_param, "50");
    }

    #[test]
    fn finish_then_select_opposite_mirrors() {
        let mut ws = Workspace::new(false);
        build_bullish(&mut ws);
        assert_eq!(ws.apply(&FormulaAction::Finish), WorkspaceChange::FORMULAS);
        assert!(ws.formulas.completed(BiasType::Bullish).is_some());

        ws.apply(&FormulaAction::SelectCategory(BiasType::Bearish));
        assert_eq!(ws.formulas.current.operator, Some(Operator::Lt));
        ws.apply(&FormulaAction::Finish);
        assert!(ws.status().is_ready());
    }

    #[test]
    fn disabling_neutral_leaves_neutral_editing() {
        let mut ws = Workspace::new(true);
        ws.apply(&FormulaAction::SelectCategory(BiasType::Neutral));
        ws.apply(&FormulaAction::SetIncludeNeutral(false));
        assert!(!ws.include_neutral);
        assert_eq!(ws.formulas.editing(), Some(BiasType::Bullish));
    }

    #[test]
    fn display_toggle_only_touches_display() {
        let mut ws = Workspace::new(false);
        let change = ws.apply(&FormulaAction::ToggleDisplay(BiasType::Bearish));
        assert_eq!(change, WorkspaceChange::DISPLAY);
        assert!(!ws.display.is_shown(BiasType::Bearish));
        assert!(!ws.apply(&FormulaAction::RunScan).any());
    }

    #[test]
    fn template_round_trip_restores_formulas_and_toggle() {
        let mut ws = Workspace::new(true);
        build_bullish(&mut ws);
        ws.apply(&FormulaAction::Finish);
        let template = ws.snapshot("  trend  ", 42);
        assert_eq!(template.name, "trend");

        let mut other = Workspace::new(false);
        other.load(&template);
        assert!(other.include_neutral);
        assert_eq!(
            other.formulas.completed(BiasType::Bullish),
            ws.formulas.completed(BiasType::Bullish)
        );
    }
}
