//! Configuration module for the bias workbench.

// Can all be private now because we have a public re-export.
mod animation;
mod debug;
mod evaluation;
mod persistence;

// Can't be private because we don't re-export it
pub mod plot;

// Re-export commonly used items
pub use animation::{ANIMATION, AnimationConfig};
pub use debug::DF;
pub use evaluation::{EVALUATION, EvaluationConfig, ParamBounds};
pub use persistence::PERSISTENCE;
pub use plot::PLOT_CONFIG;

/// Gate for the `trace_time!` macro.
pub const LOG_PERFORMANCE: bool = DF.log_performance;
