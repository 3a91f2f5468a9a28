use crate::config::DF;
use crate::domain::{ActiveRange, BiasType, FillDirection, IndicatorSet, OverlayKind};
use crate::engine::animator::OverlayVisualState;
use crate::engine::scheduler::{AnimationLoop, CancelToken, FrameHost};
use crate::models::{
    Condition, ConditionEvaluation, DisplayState, FormulaState, HoverContext, Operand,
    OverlayIssue, classify,
};
use crate::utils::AppInstant;

/// What one category contributes to the chart for the current result.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryOverlay {
    /// Price-based formula: a boundary line with the satisfied side filled.
    Zone {
        condition: Condition,
        fill: Option<FillDirection>,
    },
    /// Time-based formula: bars where the condition held.
    Shade { evaluation: ConditionEvaluation },
    /// Formula could not be evaluated against this result.
    Unavailable(OverlayIssue),
}

impl CategoryOverlay {
    fn build(condition: Condition) -> Self {
        match condition.evaluate() {
            Some(evaluation) => Self::Shade { evaluation },
            None => Self::Zone {
                fill: condition.operator().fill_direction(),
                condition,
            },
        }
    }

    pub fn kind(&self) -> Option<OverlayKind> {
        match self {
            Self::Zone { .. } => Some(OverlayKind::Zone),
            Self::Shade { .. } => Some(OverlayKind::Shade),
            Self::Unavailable(_) => None,
        }
    }
}

/// Range under the pointer for one category's shade overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadeMatch {
    pub range: ActiveRange,
    /// The chronologically last range across every category. Its final bar is
    /// still unconfirmed and is not drawn.
    pub is_final: bool,
}

/// Owns the per-category overlays, their fade state and the animation loop.
///
/// Every writer goes through a named method that reports whether the host
/// should redraw.
#[derive(Debug, Default)]
pub struct OverlayController {
    visual: OverlayVisualState,
    overlays: [Option<CategoryOverlay>; BiasType::COUNT],
    shade_matches: [Option<ShadeMatch>; BiasType::COUNT],
    indicators: Option<IndicatorSet>,
    display: DisplayState,
    animation: AnimationLoop,
}

impl OverlayController {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Lifecycle ---

    pub fn mount(&mut self, host: &dyn FrameHost, now: AppInstant) -> CancelToken {
        self.visual = OverlayVisualState::new();
        self.animation.start(host, now)
    }

    /// Stops the loop and forgets all fade and hover state.
    pub fn unmount(&mut self) {
        self.animation.stop();
        self.visual = OverlayVisualState::new();
        self.shade_matches = Default::default();
    }

    pub fn is_mounted(&self) -> bool {
        self.animation.is_running()
    }

    /// Drives the animation loop. Call whenever the host wakes up.
    pub fn pump(&mut self, host: &dyn FrameHost, now: AppInstant) -> bool {
        self.animation.pump(&mut self.visual, host, now)
    }

    /// Single animation step, ignoring timing.
    pub fn tick(&mut self, host: &dyn FrameHost) -> bool {
        self.animation.step(&mut self.visual, host)
    }

    // --- Data ---

    /// Swaps in a new scan result's indicator set. Everything derived from the
    /// previous result (overlays, ranges, targets) is dropped first.
    pub fn replace_result(
        &mut self,
        indicators: IndicatorSet,
        formulas: &FormulaState,
        include_neutral: bool,
    ) {
        self.reset_derived();
        self.indicators = Some(indicators);
        self.rebuild(formulas, include_neutral);
    }

    pub fn clear_result(&mut self) {
        self.reset_derived();
        self.indicators = None;
    }

    fn reset_derived(&mut self) {
        self.overlays = Default::default();
        self.shade_matches = Default::default();
        self.visual.hide_all();
    }

    /// Re-resolves every required category's saved formula against the current
    /// result. Called when formulas are saved, cleared or loaded.
    pub fn rebuild(&mut self, formulas: &FormulaState, include_neutral: bool) {
        let Some(indicators) = &self.indicators else {
            return;
        };
        let required = BiasType::required(include_neutral);
        let mut next: [Option<CategoryOverlay>; BiasType::COUNT] = Default::default();

        for bias in required {
            let Some(formula) = formulas.completed(bias) else {
                continue;
            };
            let overlay = match Condition::resolve(formula, indicators) {
                Ok(condition) => CategoryOverlay::build(condition),
                Err(issue) => {
                    log::warn!("{bias} overlay unavailable: {issue}");
                    CategoryOverlay::Unavailable(issue)
                }
            };
            if DF.log_evaluation {
                log::info!("{bias} overlay: {:?}", overlay.kind());
            }
            next[bias.index()] = Some(overlay);
        }

        // Overlays whose shape changed lose their hover state.
        for bias in BiasType::DISPLAY_ORDER {
            if self.overlays[bias.index()] != next[bias.index()] {
                self.shade_matches[bias.index()] = None;
                self.visual.set_target(bias, OverlayKind::Zone, false);
                self.visual.set_target(bias, OverlayKind::Shade, false);
            }
        }
        self.overlays = next;
    }

    pub fn set_display(&mut self, display: DisplayState) {
        self.display = display;
        for bias in BiasType::DISPLAY_ORDER {
            if !display.is_shown(bias) {
                self.visual.set_target(bias, OverlayKind::Zone, false);
                self.visual.set_target(bias, OverlayKind::Shade, false);
                self.shade_matches[bias.index()] = None;
            }
        }
    }

    // --- Interaction ---

    /// Classifies the hovered point, re-targets zone and shade cells and asks
    /// for a redraw if any target changed.
    pub fn on_pointer_move(
        &mut self,
        price: f64,
        timestamp: i64,
        host: &dyn FrameHost,
    ) -> Option<HoverContext> {
        self.indicators.as_ref()?;

        let zone = classify(price, timestamp, self.zone_conditions());
        let mut changed = self.visual.set_zone_targets(zone);
        changed |= self.match_shades(timestamp);

        if changed {
            host.request_redraw();
        }
        if DF.log_hover {
            log::info!("Hover {price:.4} @ {timestamp} -> {zone:?}");
        }
        Some(HoverContext {
            price,
            timestamp,
            zone,
        })
    }

    pub fn on_pointer_leave(&mut self, host: &dyn FrameHost) -> Option<HoverContext> {
        self.shade_matches = Default::default();
        if self.visual.hide_all() {
            host.request_redraw();
        }
        None
    }

    fn zone_conditions(&self) -> impl Iterator<Item = (BiasType, &Condition)> {
        BiasType::DISPLAY_ORDER.into_iter().filter_map(|bias| {
            match &self.overlays[bias.index()] {
                Some(CategoryOverlay::Zone { condition, .. }) if self.display.is_shown(bias) => {
                    Some((bias, condition))
                }
                _ => None,
            }
        })
    }

    /// Latest range end over every category's shade evaluation.
    fn final_range_end(&self) -> Option<i64> {
        self.overlays
            .iter()
            .filter_map(|o| match o {
                Some(CategoryOverlay::Shade { evaluation }) => evaluation.last_range(),
                _ => None,
            })
            .map(|r| r.last_time)
            .max()
    }

    fn match_shades(&mut self, timestamp: i64) -> bool {
        let final_end = self.final_range_end();
        let mut changed = false;

        for bias in BiasType::DISPLAY_ORDER {
            let matched = match &self.overlays[bias.index()] {
                Some(CategoryOverlay::Shade { evaluation }) if self.display.is_shown(bias) => {
                    evaluation.range_at(timestamp).map(|(_, range)| ShadeMatch {
                        range,
                        is_final: Some(range.last_time) == final_end,
                    })
                }
                _ => None,
            };
            let slot = &mut self.shade_matches[bias.index()];
            if *slot != matched {
                *slot = matched;
                changed = true;
            }
            changed |= self
                .visual
                .set_target(bias, OverlayKind::Shade, matched.is_some());
        }
        changed
    }

    // --- Read side (renderers) ---

    pub fn visual(&self) -> &OverlayVisualState {
        &self.visual
    }

    pub fn overlay(&self, bias: BiasType) -> Option<&CategoryOverlay> {
        self.overlays[bias.index()].as_ref()
    }

    pub fn shade_match(&self, bias: BiasType) -> Option<ShadeMatch> {
        self.shade_matches[bias.index()]
    }

    /// Zone boundary of `bias`, if it has a price-based overlay.
    pub fn zone_boundary(&self, bias: BiasType) -> Option<(&Operand, Option<FillDirection>)> {
        match self.overlay(bias)? {
            CategoryOverlay::Zone { condition, fill } => Some((condition.boundary()?, *fill)),
            _ => None,
        }
    }

    pub fn issues(&self) -> Vec<(BiasType, &OverlayIssue)> {
        BiasType::DISPLAY_ORDER
            .into_iter()
            .filter_map(|bias| match self.overlay(bias)? {
                CategoryOverlay::Unavailable(issue) => Some((bias, issue)),
                _ => None,
            })
            .collect()
    }
}
