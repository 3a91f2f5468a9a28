use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::PERSISTENCE;
use crate::domain::{BiasType, Formula};
use crate::models::formula_state::FormulaState;

/// A named snapshot of saved formulas, written only on an explicit
/// "save as template".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormulaTemplate {
    pub id: Uuid,
    pub name: String,
    pub include_neutral: bool,
    pub formulas: Vec<Formula>,
    /// Epoch milliseconds.
    pub saved_at: i64,
}

impl FormulaTemplate {
    /// Stable id derived from the trimmed name, so saving under an existing
    /// name overwrites that template.
    pub fn id_for(name: &str) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, name.trim().as_bytes())
    }

    pub fn capture(name: &str, state: &FormulaState, include_neutral: bool, saved_at: i64) -> Self {
        Self {
            id: Self::id_for(name),
            name: name.trim().to_string(),
            include_neutral,
            formulas: state.completed_map().values().cloned().collect(),
            saved_at,
        }
    }

    /// Fresh state holding this template's formulas. Entries without a
    /// category are dropped.
    pub fn to_state(&self) -> FormulaState {
        let completed: BTreeMap<BiasType, Formula> = self
            .formulas
            .iter()
            .filter_map(|f| f.bias_type.map(|b| (b, f.clone())))
            .collect();
        FormulaState::from_completed(completed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateLibrary {
    pub version: u32,
    pub templates: Vec<FormulaTemplate>,
}

impl Default for TemplateLibrary {
    fn default() -> Self {
        Self {
            version: PERSISTENCE.templates.version,
            templates: Vec::new(),
        }
    }
}

impl TemplateLibrary {
    /// Inserts or replaces (matched by id). Returns true when replaced.
    pub fn upsert(&mut self, template: FormulaTemplate) -> bool {
        match self.templates.iter_mut().find(|t| t.id == template.id) {
            Some(existing) => {
                *existing = template;
                true
            }
            None => {
                self.templates.push(template);
                self.templates.sort_by(|a, b| a.name.cmp(&b.name));
                false
            }
        }
    }

    pub fn remove(&mut self, id: Uuid) -> Option<FormulaTemplate> {
        let idx = self.templates.iter().position(|t| t.id == id)?;
        Some(self.templates.remove(idx))
    }

    pub fn get(&self, id: Uuid) -> Option<&FormulaTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Indicator, Operator, Timeframe};

    fn state() -> FormulaState {
        let mut s = FormulaState::new().change_bias_type(BiasType::Bullish, false);
        s.current = Formula {
            timeframe: Some(Timeframe::D1),
            indicator1: Some(Indicator::Close),
            indicator1_param: "0".into(),
            operator: Some(Operator::Gt),
            indicator2: Some(Indicator::Ema),
            indicator2_param: "200".into(),
            ..s.current
        };
        s.complete_formula()
    }

    #[test]
    fn id_is_stable_per_name() {
        assert_eq!(FormulaTemplate::id_for("Trend"), FormulaTemplate::id_for(" Trend "));
        assert_ne!(FormulaTemplate::id_for("Trend"), FormulaTemplate::id_for("Range"));
    }

    #[test]
    fn capture_and_restore_round_trip() {
        let t = FormulaTemplate::capture("Trend", &state(), false, 0);
        let json = serde_json::to_string(&t).unwrap();
        let back: FormulaTemplate = serde_json::from_str(&json).unwrap();
        let restored = back.to_state();
        assert_eq!(restored.completed_map(), state().completed_map());
        assert_eq!(restored.current, Formula::default());
    }

    #[test]
    fn upsert_replaces_same_name() {
        let mut lib = TemplateLibrary::default();
        assert!(!lib.upsert(FormulaTemplate::capture("Trend", &state(), false, 1)));
        assert!(lib.upsert(FormulaTemplate::capture("Trend", &FormulaState::new(), true, 2)));
        assert_eq!(lib.templates.len(), 1);
        assert!(lib.templates[0].include_neutral);
        assert!(lib.remove(FormulaTemplate::id_for("Trend")).is_some());
        assert!(lib.is_empty());
    }
}
