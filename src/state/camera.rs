//! The viewport engine's owned state and its imperative control surface.
//!
//! `Camera` holds Target (where input wants the view), Current (what is on
//! screen), the momentum velocity, the active gesture and the committed
//! transform the surrounding UI reads. Input handlers live in
//! [`crate::state::gesture`], the per-frame update in [`crate::state::physics`].

use crate::error::{Result, ViewportError};
use crate::model::{
    ControlEasing, Point, PresentationMode, Size, Transform, TransitionMode, Velocity,
    ViewportConfig,
};
use crate::state::gesture::{Gesture, InputResponse};

/// Scale and offsets that fit `content` inside `container` with `padding`
/// total margin per axis, centred.
pub fn fit_to_view(container: Size, content: Size, config: &ViewportConfig) -> Result<Transform> {
    if container.is_degenerate() || content.is_degenerate() {
        return Err(ViewportError::DegenerateGeometry { container, content });
    }
    let available = |side: f64| {
        let inner = side - config.fit_padding;
        if inner > 0.0 { inner } else { side }
    };
    let scale_x = available(container.width) / content.width;
    let scale_y = available(container.height) / content.height;
    let scale = config.clamp_scale(scale_x.min(scale_y));
    Ok(Transform::new(
        scale,
        (container.width - content.width * scale) / 2.0,
        (container.height - content.height * scale) / 2.0,
    ))
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub(crate) config: ViewportConfig,
    pub(crate) target: Transform,
    pub(crate) current: Transform,
    pub(crate) velocity: Velocity,
    pub(crate) gesture: Gesture,
    /// Last settled transform; what zoom readouts display.
    pub(crate) committed: Transform,
    /// Where `reset_zoom` returns to.
    pub(crate) home: Transform,
    pub(crate) container: Size,
    pub(crate) content: Option<Size>,
    pub(crate) initial_centered: bool,
    pub(crate) transition: TransitionMode,
    pub(crate) last_frame_ms: Option<f64>,
    pub(crate) running: bool,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(ViewportConfig::default())
    }
}

impl Camera {
    pub fn new(config: ViewportConfig) -> Self {
        let config = config.validated();
        let initial = config.initial_transform();
        Self {
            config,
            target: initial,
            current: initial,
            velocity: Velocity::ZERO,
            gesture: Gesture::Idle,
            committed: initial,
            home: initial,
            container: Size::default(),
            content: None,
            initial_centered: false,
            transition: TransitionMode::Immediate,
            last_frame_ms: None,
            running: false,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn target(&self) -> Transform {
        self.target
    }

    pub fn current(&self) -> Transform {
        self.current
    }

    pub fn committed(&self) -> Transform {
        self.committed
    }

    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn transition(&self) -> TransitionMode {
        self.transition
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn content(&self) -> Option<Size> {
        self.content
    }

    pub fn container(&self) -> Size {
        self.container
    }

    pub fn is_initial_centered(&self) -> bool {
        self.initial_centered
    }

    /// Committed zoom as a whole percentage, for readouts.
    pub fn scale_percent(&self) -> u32 {
        (self.committed.scale * 100.0).round().max(0.0) as u32
    }

    /// Every Target write goes through here: scale is clamped, non-finite transforms are dropped.
    pub(crate) fn write_target(&mut self, next: Transform) {
        if !next.is_finite() {
            tracing::debug!(?next, "non-finite target dropped");
            return;
        }
        self.target = Transform::new(
            self.config.clamp_scale(next.scale),
            next.offset_x,
            next.offset_y,
        );
    }

    pub(crate) fn commit(&mut self) {
        self.committed = self.current;
    }

    /// Mark the frame loop as running. Returns true when the caller must
    /// schedule a frame, false when one is already pending.
    pub fn wake(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.last_frame_ms = None;
        true
    }

    /// Stop without snapping (unmount).
    pub fn halt(&mut self) {
        self.running = false;
        self.last_frame_ms = None;
    }

    pub fn set_container(&mut self, size: Size) {
        if size != self.container {
            tracing::debug!(width = size.width, height = size.height, "container measured");
            self.container = size;
        }
    }

    /// `None` when the content is gone or not loaded yet.
    pub fn set_content(&mut self, size: Option<Size>) {
        if size != self.content {
            tracing::debug!(?size, "content measured");
            self.content = size;
        }
    }

    /// Fit the content once, the first time both sizes are usable. Later
    /// resizes never re-center. Returns true when centering happened now.
    pub fn try_initial_center(&mut self) -> bool {
        if self.initial_centered {
            return false;
        }
        let Some(content) = self.content else {
            return false;
        };
        match fit_to_view(self.container, content, &self.config) {
            Ok(fit) => {
                self.home = fit;
                self.target = fit;
                self.current = fit;
                self.committed = fit;
                self.velocity = Velocity::ZERO;
                self.transition = TransitionMode::Immediate;
                self.initial_centered = true;
                tracing::debug!(?fit, "initial centering");
                true
            }
            Err(err) => {
                tracing::trace!(%err, "initial centering deferred");
                false
            }
        }
    }

    fn viewport_center(&self) -> Point {
        if self.container.is_degenerate() {
            Point::default()
        } else {
            self.container.center()
        }
    }

    fn zoom_by_step(&mut self, direction: f64) -> InputResponse {
        let new_scale = self
            .config
            .clamp_scale(self.target.scale + direction * self.config.zoom_step);
        let next = self.target.zoomed_about(self.viewport_center(), new_scale);
        self.apply_control(next)
    }

    pub fn zoom_in(&mut self) -> InputResponse {
        self.zoom_by_step(1.0)
    }

    pub fn zoom_out(&mut self) -> InputResponse {
        self.zoom_by_step(-1.0)
    }

    pub fn reset_zoom(&mut self) -> InputResponse {
        self.apply_control(self.home)
    }

    /// Fit-to-view. A no-op error when either size is unknown or degenerate.
    pub fn center_view(&mut self) -> Result<InputResponse> {
        let content = self.content.ok_or(ViewportError::ContentNotReady)?;
        let fit = fit_to_view(self.container, content, &self.config)?;
        Ok(self.apply_control(fit))
    }

    /// Discrete controls override momentum and are eased either by the loop
    /// or, for the transform presentation, by a declarative transition. The
    /// transition is only used while nothing drives the presenter per frame.
    fn apply_control(&mut self, next: Transform) -> InputResponse {
        let declarative = self.config.control_easing == ControlEasing::Transition
            && self.config.presentation == PresentationMode::Transform
            && !self.gesture.is_active()
            && !self.running;
        self.velocity = Velocity::ZERO;
        self.write_target(next);
        if declarative {
            self.current = self.target;
            self.commit();
            self.transition = TransitionMode::Smooth;
            InputResponse {
                consume: false,
                wake: false,
                present: true,
            }
        } else {
            self.transition = TransitionMode::Immediate;
            InputResponse::woke(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn camera() -> Camera {
        let mut cam = Camera::default();
        cam.set_container(Size::new(800.0, 600.0));
        cam
    }

    #[test]
    fn fit_to_view_centers_wide_content() {
        let fit = fit_to_view(
            Size::new(800.0, 600.0),
            Size::new(1000.0, 500.0),
            &ViewportConfig::default(),
        )
        .unwrap();
        assert!((fit.scale - 0.76).abs() < 1e-12);
        // (800 - 1000 * 0.76) / 2
        assert!((fit.offset_x - 20.0).abs() < 1e-9);
        assert!((fit.offset_y - 110.0).abs() < 1e-9);
    }

    #[test]
    fn fit_to_view_degenerate_is_error() {
        let cfg = ViewportConfig::default();
        let err = fit_to_view(Size::new(0.0, 600.0), Size::new(10.0, 10.0), &cfg).unwrap_err();
        assert!(matches!(err, ViewportError::DegenerateGeometry { .. }));
        assert!(fit_to_view(Size::new(10.0, 10.0), Size::new(10.0, 0.0), &cfg).is_err());
    }

    #[test]
    fn fit_to_view_clamps_tiny_content() {
        let fit = fit_to_view(
            Size::new(800.0, 600.0),
            Size::new(10.0, 10.0),
            &ViewportConfig::default(),
        )
        .unwrap();
        assert_eq!(fit.scale, 5.0);
        assert_eq!(fit.offset_x, 375.0);
    }

    #[test]
    fn zoom_in_is_anchored_at_center() {
        let mut cam = camera();
        let center = Point::new(400.0, 300.0);
        let before = cam.target().to_content(center);
        let r = cam.zoom_in();
        assert!(r.wake && !r.present);
        let after = cam.target().to_content(center);
        assert!((cam.target().scale - 1.1).abs() < 1e-12);
        assert!((after.x - before.x).abs() < 1e-9);
        assert!((after.y - before.y).abs() < 1e-9);
    }

    #[test]
    fn zoom_out_stops_at_min() {
        let mut cam = camera();
        for _ in 0..50 {
            cam.zoom_out();
        }
        assert_eq!(cam.target().scale, 0.1);
    }

    #[test]
    fn controls_cancel_momentum() {
        let mut cam = camera();
        cam.velocity = Velocity { vx: 20.0, vy: 3.0 };
        cam.zoom_in();
        assert_eq!(cam.velocity(), Velocity::ZERO);
    }

    #[test]
    fn center_view_without_content_is_noop() {
        let mut cam = camera();
        let before = cam.target();
        assert_eq!(cam.center_view(), Err(ViewportError::ContentNotReady));
        assert_eq!(cam.target(), before);
    }

    #[test]
    fn center_view_fits_content() {
        let mut cam = camera();
        cam.set_content(Some(Size::new(1000.0, 500.0)));
        cam.center_view().unwrap();
        assert!((cam.target().scale - 0.76).abs() < 1e-12);
        assert!((cam.target().offset_y - 110.0).abs() < 1e-9);
    }

    #[test]
    fn initial_center_runs_once() {
        let mut cam = Camera::default();
        cam.set_content(Some(Size::new(1000.0, 500.0)));
        assert!(!cam.try_initial_center());
        cam.set_container(Size::new(800.0, 600.0));
        assert!(cam.try_initial_center());
        assert!(cam.is_initial_centered());
        assert_eq!(cam.current(), cam.target());
        assert_eq!(cam.scale_percent(), 76);

        cam.zoom_in();
        cam.set_container(Size::new(400.0, 300.0));
        assert!(!cam.try_initial_center());
        // reset returns to the fitted home, not the configured initial scale
        cam.reset_zoom();
        assert!((cam.target().scale - 0.76).abs() < 1e-12);
    }

    #[test]
    fn transition_easing_writes_current_directly() {
        let mut cam = Camera::new(ViewportConfig {
            control_easing: ControlEasing::Transition,
            ..Default::default()
        });
        cam.set_container(Size::new(800.0, 600.0));
        let r = cam.zoom_in();
        assert!(r.present && !r.wake);
        assert_eq!(cam.transition(), TransitionMode::Smooth);
        assert_eq!(cam.current(), cam.target());
        assert_eq!(cam.scale_percent(), 110);
    }

    #[test]
    fn transition_easing_ignored_for_canvas() {
        let mut cam = Camera::new(ViewportConfig {
            control_easing: ControlEasing::Transition,
            presentation: PresentationMode::Canvas,
            ..Default::default()
        });
        cam.set_container(Size::new(800.0, 600.0));
        let r = cam.zoom_in();
        assert!(r.wake && !r.present);
        assert_eq!(cam.transition(), TransitionMode::Immediate);
    }

    #[test]
    fn transition_easing_defers_to_running_loop() {
        use crate::state::{InputEvent, StepOutcome, step};

        let mut cam = Camera::new(ViewportConfig {
            control_easing: ControlEasing::Transition,
            ..Default::default()
        });
        cam.set_container(Size::new(800.0, 600.0));
        cam.handle(InputEvent::PointerDown {
            button: 0,
            pos: Point::new(100.0, 100.0),
            time_ms: 0.0,
        });
        cam.handle(InputEvent::PointerMove {
            pos: Point::new(130.0, 100.0),
            time_ms: 16.0,
        });
        cam.handle(InputEvent::PointerUp { time_ms: 20.0 });
        assert!(cam.wake());
        assert_eq!(step(&mut cam, 32.0), StepOutcome::Running);

        // coasting: the loop owns the presenter, so the click eases through it
        let r = cam.zoom_in();
        assert!(r.wake && !r.present);
        assert_eq!(cam.transition(), TransitionMode::Immediate);
        assert_ne!(cam.current(), cam.target());

        let mut now = 32.0;
        let mut outcome = StepOutcome::Running;
        for _ in 0..400 {
            now += 16.0;
            outcome = step(&mut cam, now);
            if outcome == StepOutcome::Settled {
                break;
            }
        }
        assert_eq!(outcome, StepOutcome::Settled);
        assert_eq!(cam.scale_percent(), 110);

        // idle again: the declarative transition applies
        let r = cam.zoom_in();
        assert!(r.present && !r.wake);
        assert_eq!(cam.transition(), TransitionMode::Smooth);
    }

    #[test]
    fn initial_center_waits_for_nonzero_container() {
        let mut cam = Camera::default();
        cam.set_container(Size::new(0.0, 0.0));
        cam.set_content(Some(Size::new(1000.0, 500.0)));
        assert!(!cam.try_initial_center());
        // container laid out later without any window resize
        cam.set_container(Size::new(800.0, 600.0));
        assert!(cam.try_initial_center());
        assert_eq!(cam.scale_percent(), 76);
    }

    #[test]
    fn wake_only_schedules_once() {
        let mut cam = camera();
        assert!(cam.wake());
        assert!(!cam.wake());
        cam.halt();
        assert!(cam.wake());
    }

    #[derive(Clone, Copy, Debug)]
    enum Op {
        In,
        Out,
    }

    proptest! {
        #[test]
        fn zoom_sequences_stay_in_bounds(
            ops in proptest::collection::vec(prop_oneof![Just(Op::In), Just(Op::Out)], 0..200)
        ) {
            let mut cam = camera();
            for op in ops {
                match op {
                    Op::In => cam.zoom_in(),
                    Op::Out => cam.zoom_out(),
                };
                let s = cam.target().scale;
                prop_assert!((0.1..=5.0).contains(&s));
            }
        }

        #[test]
        fn reset_is_idempotent(scale in 0.1f64..5.0, ox in -1e4f64..1e4, oy in -1e4f64..1e4) {
            let mut cam = camera();
            cam.write_target(Transform::new(scale, ox, oy));
            cam.reset_zoom();
            let once = cam.target();
            cam.reset_zoom();
            prop_assert_eq!(once, cam.target());
        }

        #[test]
        fn anchored_zoom_keeps_point(
            scale in 0.1f64..5.0,
            ox in -2000.0f64..2000.0,
            oy in -2000.0f64..2000.0,
            px in 0.0f64..800.0,
            py in 0.0f64..600.0,
            new_scale in 0.1f64..5.0,
        ) {
            let t = Transform::new(scale, ox, oy);
            let p = Point::new(px, py);
            let before = t.to_content(p);
            let after = t.zoomed_about(p, new_scale).to_content(p);
            let tol = |v: f64| 1e-6 * v.abs().max(1.0);
            prop_assert!((before.x - after.x).abs() <= tol(before.x));
            prop_assert!((before.y - after.y).abs() <= tol(before.y));
        }
    }
}
