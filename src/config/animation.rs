//! Overlay fade animation constants

use std::time::Duration;

pub struct AnimationConfig {
    /// Opacity change applied per tick while a cell is still moving.
    pub opacity_step: f32,
    /// A cell within this distance of its target counts as settled.
    pub settle_epsilon: f32,
    /// Renderers draw nothing below this opacity.
    pub visibility_threshold: f32,
    /// Period of the animation loop (about one frame at 60Hz).
    pub tick_interval: Duration,
}

pub const ANIMATION: AnimationConfig = AnimationConfig {
    opacity_step: 0.15,
    settle_epsilon: 0.01,
    visibility_threshold: 0.01,
    tick_interval: Duration::from_millis(16),
};
