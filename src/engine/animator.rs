use crate::config::{ANIMATION, DF};
use crate::domain::{BiasType, OverlayKind};

/// Fade state of one (category, overlay kind) pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OverlayCell {
    pub target_visible: bool,
    pub current_opacity: f32,
}

impl OverlayCell {
    fn target(&self) -> f32 {
        if self.target_visible { 1.0 } else { 0.0 }
    }

    /// Moves one step toward the target. Returns true if the opacity changed.
    pub fn step(&mut self) -> bool {
        let delta = self.target() - self.current_opacity;
        if delta.abs() <= ANIMATION.settle_epsilon {
            return false;
        }
        let next = (self.current_opacity + ANIMATION.opacity_step.copysign(delta)).clamp(0.0, 1.0);
        let changed = next != self.current_opacity;
        self.current_opacity = next;
        changed
    }

    pub fn is_settled(&self) -> bool {
        (self.target() - self.current_opacity).abs() <= ANIMATION.settle_epsilon
    }

    /// Renderers skip cells below the visibility threshold.
    pub fn is_drawable(&self) -> bool {
        self.current_opacity >= ANIMATION.visibility_threshold
    }
}

/// Opacity of every overlay cell (three categories by two kinds).
///
/// Written only by the animator tick (opacity) and by hover handling
/// (targets). Renderers read it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayVisualState {
    cells: [[OverlayCell; OverlayKind::COUNT]; BiasType::COUNT],
}

impl OverlayVisualState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self, bias: BiasType, kind: OverlayKind) -> OverlayCell {
        self.cells[bias.index()][kind.index()]
    }

    pub fn opacity(&self, bias: BiasType, kind: OverlayKind) -> f32 {
        self.cell(bias, kind).current_opacity
    }

    /// Returns true if the target actually changed.
    pub fn set_target(&mut self, bias: BiasType, kind: OverlayKind, visible: bool) -> bool {
        let cell = &mut self.cells[bias.index()][kind.index()];
        if cell.target_visible == visible {
            return false;
        }
        cell.target_visible = visible;
        true
    }

    /// Shows the zone of `zone` and hides the other two. `None` hides all.
    pub fn set_zone_targets(&mut self, zone: Option<BiasType>) -> bool {
        let mut changed = false;
        for bias in BiasType::DISPLAY_ORDER {
            changed |= self.set_target(bias, OverlayKind::Zone, zone == Some(bias));
        }
        changed
    }

    /// Drops every target to hidden. Opacities fade out on later ticks.
    pub fn hide_all(&mut self) -> bool {
        let mut changed = false;
        for bias in BiasType::DISPLAY_ORDER {
            changed |= self.set_target(bias, OverlayKind::Zone, false);
            changed |= self.set_target(bias, OverlayKind::Shade, false);
        }
        changed
    }

    /// Advances every cell by one step. Returns true if any opacity moved,
    /// which means the host should redraw.
    pub fn tick(&mut self) -> bool {
        let mut changed = false;
        for cell in self.cells.iter_mut().flatten() {
            changed |= cell.step();
        }
        if changed && DF.log_animation {
            log::info!("Overlay tick: {:?}", self.opacities());
        }
        changed
    }

    pub fn is_settled(&self) -> bool {
        self.cells.iter().flatten().all(OverlayCell::is_settled)
    }

    fn opacities(&self) -> [[f32; OverlayKind::COUNT]; BiasType::COUNT] {
        self.cells.map(|row| row.map(|c| c.current_opacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_in_reaches_full_within_seven_ticks() {
        let mut s = OverlayVisualState::new();
        s.set_target(BiasType::Bullish, OverlayKind::Zone, true);
        for _ in 0..7 {
            s.tick();
            let o = s.opacity(BiasType::Bullish, OverlayKind::Zone);
            assert!((0.0..=1.0).contains(&o));
        }
        assert!(s.opacity(BiasType::Bullish, OverlayKind::Zone) >= 0.99);
        assert!(s.is_settled());
    }

    #[test]
    fn fade_out_reaches_zero_within_seven_ticks() {
        let mut s = OverlayVisualState::new();
        s.set_target(BiasType::Bearish, OverlayKind::Shade, true);
        for _ in 0..7 {
            s.tick();
        }
        s.set_target(BiasType::Bearish, OverlayKind::Shade, false);
        for _ in 0..7 {
            s.tick();
            let o = s.opacity(BiasType::Bearish, OverlayKind::Shade);
            assert!((0.0..=1.0).contains(&o));
        }
        assert!(s.opacity(BiasType::Bearish, OverlayKind::Shade) <= 0.01);
        assert!(!s.cell(BiasType::Bearish, OverlayKind::Shade).is_drawable());
    }

    #[test]
    fn settled_tick_reports_no_change() {
        let mut s = OverlayVisualState::new();
        assert!(!s.tick());
        s.set_target(BiasType::Neutral, OverlayKind::Zone, true);
        assert!(s.tick());
        while s.tick() {}
        assert!(!s.tick());
    }

    #[test]
    fn zone_targets_are_exclusive() {
        let mut s = OverlayVisualState::new();
        assert!(s.set_zone_targets(Some(BiasType::Bearish)));
        assert!(!s.set_zone_targets(Some(BiasType::Bearish)));
        assert!(s.cell(BiasType::Bearish, OverlayKind::Zone).target_visible);
        assert!(!s.cell(BiasType::Bullish, OverlayKind::Zone).target_visible);

        assert!(s.set_zone_targets(Some(BiasType::Bullish)));
        assert!(!s.cell(BiasType::Bearish, OverlayKind::Zone).target_visible);
        assert!(s.set_zone_targets(None));
        assert!(!s.cell(BiasType::Bullish, OverlayKind::Zone).target_visible);
    }

    #[test]
    fn retarget_mid_fade_reverses_direction() {
        let mut s = OverlayVisualState::new();
        s.set_target(BiasType::Bullish, OverlayKind::Zone, true);
        s.tick();
        s.tick();
        let mid = s.opacity(BiasType::Bullish, OverlayKind::Zone);
        s.set_target(BiasType::Bullish, OverlayKind::Zone, false);
        s.tick();
        assert!(s.opacity(BiasType::Bullish, OverlayKind::Zone) < mid);
    }
}
