mod animator;
mod overlay;
mod scheduler;

pub use animator::{OverlayCell, OverlayVisualState};
pub use overlay::{CategoryOverlay, OverlayController, ShadeMatch};
pub use scheduler::{AnimationLoop, CancelToken, FrameHost};
