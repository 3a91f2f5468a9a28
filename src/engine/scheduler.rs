use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::ANIMATION;
use crate::engine::animator::OverlayVisualState;
use crate::utils::AppInstant;

/// What the animation loop needs from whoever owns the display.
pub trait FrameHost {
    /// Wake the loop again after `after`.
    fn schedule_tick(&self, after: Duration);
    /// Repaint the chart on the next frame.
    fn request_redraw(&self);
}

/// Shared cancellation flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Periodic driver of [`OverlayVisualState::tick`].
///
/// The host calls [`AnimationLoop::pump`] whenever it is woken. A tick runs once
/// the interval has elapsed, asks for a redraw if anything moved and always
/// books the next wake-up, until the token is cancelled.
#[derive(Debug, Default)]
pub struct AnimationLoop {
    token: Option<CancelToken>,
    next_tick: Option<AppInstant>,
}

impl AnimationLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the loop (restarting it if already running) and returns its token.
    pub fn start(&mut self, host: &dyn FrameHost, now: AppInstant) -> CancelToken {
        self.stop();
        let token = CancelToken::new();
        self.token = Some(token.clone());
        self.next_tick = Some(now + ANIMATION.tick_interval);
        host.schedule_tick(ANIMATION.tick_interval);
        token
    }

    pub fn stop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
        self.next_tick = None;
    }

    pub fn is_running(&self) -> bool {
        self.token.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    /// Runs a tick if one is due. Returns true when opacities changed.
    pub fn pump(
        &mut self,
        state: &mut OverlayVisualState,
        host: &dyn FrameHost,
        now: AppInstant,
    ) -> bool {
        if !self.is_running() {
            self.next_tick = None;
            return false;
        }
        match self.next_tick {
            Some(due) if now < due => false,
            _ => {
                self.next_tick = Some(now + ANIMATION.tick_interval);
                self.step(state, host)
            }
        }
    }

    /// One tick regardless of timing.
    pub fn step(&mut self, state: &mut OverlayVisualState, host: &dyn FrameHost) -> bool {
        if !self.is_running() {
            return false;
        }
        let changed = state.tick();
        if changed {
            host.request_redraw();
        }
        host.schedule_tick(ANIMATION.tick_interval);
        changed
    }
}

impl Drop for AnimationLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{BiasType, OverlayKind};
    use std::cell::Cell;

    #[derive(Default)]
    pub(crate) struct FakeHost {
        pub ticks: Cell<usize>,
        pub redraws: Cell<usize>,
    }

    impl FrameHost for FakeHost {
        fn schedule_tick(&self, _after: Duration) {
            self.ticks.set(self.ticks.get() + 1);
        }
        fn request_redraw(&self) {
            self.redraws.set(self.redraws.get() + 1);
        }
    }

    #[test]
    fn changed_tick_requests_exactly_one_redraw() {
        let host = FakeHost::default();
        let mut state = OverlayVisualState::new();
        let mut anim = AnimationLoop::new();
        anim.start(&host, AppInstant::now());
        assert_eq!(host.ticks.get(), 1);

        state.set_target(BiasType::Bullish, OverlayKind::Zone, true);
        state.set_target(BiasType::Bearish, OverlayKind::Shade, true);
        assert!(anim.step(&mut state, &host));
        assert_eq!(host.redraws.get(), 1);
        assert_eq!(host.ticks.get(), 2);
    }

    #[test]
    fn idle_tick_only_reschedules() {
        let host = FakeHost::default();
        let mut state = OverlayVisualState::new();
        let mut anim = AnimationLoop::new();
        anim.start(&host, AppInstant::now());
        assert!(!anim.step(&mut state, &host));
        assert_eq!(host.redraws.get(), 0);
        assert_eq!(host.ticks.get(), 2);
    }

    #[test]
    fn cancelled_loop_stops_ticking() {
        let host = FakeHost::default();
        let mut state = OverlayVisualState::new();
        let mut anim = AnimationLoop::new();
        let token = anim.start(&host, AppInstant::now());
        token.cancel();
        state.set_target(BiasType::Bullish, OverlayKind::Zone, true);
        assert!(!anim.is_running());
        assert!(!anim.step(&mut state, &host));
        assert!(!anim.pump(&mut state, &host, AppInstant::now()));
        assert_eq!(host.ticks.get(), 1);
        assert_eq!(state.opacity(BiasType::Bullish, OverlayKind::Zone), 0.0);
    }

    #[test]
    fn pump_waits_for_interval() {
        let host = FakeHost::default();
        let mut state = OverlayVisualState::new();
        let mut anim = AnimationLoop::new();
        let t0 = AppInstant::now();
        anim.start(&host, t0);
        state.set_target(BiasType::Neutral, OverlayKind::Zone, true);

        assert!(!anim.pump(&mut state, &host, t0));
        assert!(anim.pump(&mut state, &host, t0 + ANIMATION.tick_interval));
        assert!(!anim.pump(&mut state, &host, t0 + ANIMATION.tick_interval));
    }

    #[test]
    fn restart_cancels_previous_token() {
        let host = FakeHost::default();
        let mut anim = AnimationLoop::new();
        let first = anim.start(&host, AppInstant::now());
        let second = anim.start(&host, AppInstant::now());
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        anim.stop();
        assert!(second.is_cancelled());
    }
}
