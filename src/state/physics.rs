//! Per-frame update: momentum integration and time-independent easing of
//! Current towards Target.
//!
//! All constants are expressed per reference frame (60Hz) and rescaled by
//! `dt / reference_frame_ms`, so a 120Hz display and a 30Hz one settle in the
//! same wall-clock time.

use crate::model::{TransitionMode, Velocity};
use crate::state::Camera;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// dt exceeded the stall threshold; nothing applied, reschedule.
    Skipped,
    /// Current moved (or a gesture holds the loop open); reschedule and present.
    Running,
    /// Current snapped to Target and was committed; present once more and stop.
    Settled,
}

/// Fraction of the remaining distance covered in `time_scale` reference frames.
pub fn smoothing_factor(lerp_rate: f64, time_scale: f64) -> f64 {
    1.0 - (1.0 - lerp_rate).powf(time_scale)
}

/// Advance `camera` to `now_ms`. The first tick after a wake uses one reference frame as dt.
pub fn step(camera: &mut Camera, now_ms: f64) -> StepOutcome {
    let physics = camera.config.physics;
    let dt = match camera.last_frame_ms {
        Some(last) => (now_ms - last).max(0.0),
        None => physics.reference_frame_ms,
    };
    camera.last_frame_ms = Some(now_ms);
    if !dt.is_finite() || dt > physics.stall_threshold_ms {
        tracing::trace!(dt, "stalled frame skipped");
        return StepOutcome::Skipped;
    }
    let time_scale = dt / physics.reference_frame_ms;
    let gesture_active = camera.gesture.is_active();

    if !gesture_active {
        if camera.velocity.magnitude() > physics.momentum_epsilon {
            let coasted = camera
                .target
                .translated(camera.velocity.vx * time_scale, camera.velocity.vy * time_scale);
            camera.write_target(coasted);
            let decay = physics.friction.powf(time_scale);
            camera.velocity = Velocity {
                vx: camera.velocity.vx * decay,
                vy: camera.velocity.vy * decay,
            };
        } else {
            camera.velocity = Velocity::ZERO;
        }
    }

    let (position_rate, scale_rate) = if gesture_active {
        (physics.gesture_lerp, physics.gesture_lerp)
    } else {
        (physics.position_lerp, physics.scale_lerp)
    };
    camera.current = camera.current.lerp_towards(
        &camera.target,
        smoothing_factor(position_rate, time_scale),
        smoothing_factor(scale_rate, time_scale),
    );
    camera.transition = TransitionMode::Immediate;

    let converged = camera.current.approx_eq(
        &camera.target,
        physics.position_tolerance,
        physics.scale_tolerance,
    ) && camera.velocity.magnitude() < physics.velocity_tolerance;

    if converged && !gesture_active {
        camera.current = camera.target;
        camera.commit();
        camera.halt();
        tracing::debug!(scale = camera.committed.scale, "settled");
        StepOutcome::Settled
    } else {
        StepOutcome::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Point, Size, Transform, ViewportConfig};
    use crate::state::gesture::InputEvent;

    const FRAME: f64 = 1000.0 / 60.0;

    fn camera() -> Camera {
        let mut cam = Camera::default();
        cam.set_container(Size::new(800.0, 600.0));
        cam
    }

    /// Run at 16ms per tick until settled; returns the number of ticks.
    fn run_until_settled(cam: &mut Camera, limit: usize) -> Option<usize> {
        cam.wake();
        let mut now = 0.0;
        for tick in 1..=limit {
            now += 16.0;
            if step(cam, now) == StepOutcome::Settled {
                return Some(tick);
            }
        }
        None
    }

    #[test]
    fn smoothing_is_time_independent() {
        // two half-length frames cover the same ground as one full frame
        let full = smoothing_factor(0.12, 1.0);
        let half = smoothing_factor(0.12, 0.5);
        let combined = 1.0 - (1.0 - half) * (1.0 - half);
        assert!((full - combined).abs() < 1e-12);
        assert_eq!(smoothing_factor(1.0, 1.0), 1.0);
    }

    #[test]
    fn zoom_button_converges_exactly() {
        let mut cam = camera();
        cam.zoom_in();
        let target = cam.target();
        let ticks = run_until_settled(&mut cam, 200).expect("did not settle");
        assert!(ticks < 200);
        assert_eq!(cam.current(), target);
        assert_eq!(cam.committed(), target);
        assert_eq!(cam.scale_percent(), 110);
        assert!(!cam.is_running());
    }

    #[test]
    fn fit_converges_within_bound() {
        let mut cam = camera();
        cam.set_content(Some(Size::new(1000.0, 500.0)));
        cam.center_view().unwrap();
        assert!(run_until_settled(&mut cam, 200).is_some());
        assert_eq!(cam.current(), cam.target());
    }

    #[test]
    fn momentum_decays_monotonically() {
        let mut cam = camera();
        cam.velocity = Velocity { vx: 10.0, vy: 0.0 };
        cam.wake();
        let mut now = 0.0;
        let mut last_x = cam.target().offset_x;
        let mut last_speed = cam.velocity().magnitude();
        let mut ticks = 0;
        while cam.velocity().magnitude() > 0.0 {
            now += FRAME;
            step(&mut cam, now);
            ticks += 1;
            let speed = cam.velocity().magnitude();
            if speed > 0.0 {
                assert!(cam.target().offset_x > last_x);
                assert!(speed < last_speed);
                assert!((speed - last_speed * 0.95).abs() < 1e-9);
            }
            last_x = cam.target().offset_x;
            last_speed = speed;
            assert!(ticks < 500, "momentum never stopped");
        }
        // 10 * 0.95^n < 0.05
        assert!(ticks <= 110);
        assert!(run_until_settled(&mut cam, 200).is_some());
        assert_eq!(cam.velocity(), Velocity::ZERO);
    }

    #[test]
    fn stalled_frame_applies_nothing() {
        let mut cam = camera();
        cam.zoom_in();
        cam.wake();
        assert_eq!(step(&mut cam, 0.0), StepOutcome::Running);
        let before = cam.current();
        assert_eq!(step(&mut cam, 500.0), StepOutcome::Skipped);
        assert_eq!(cam.current(), before);
        // the next normal frame measures from the stalled one
        assert_eq!(step(&mut cam, 516.0), StepOutcome::Running);
        assert_ne!(cam.current(), before);
    }

    #[test]
    fn gesture_keeps_loop_alive() {
        let mut cam = camera();
        cam.handle(InputEvent::PointerDown {
            button: 0,
            pos: Point::new(0.0, 0.0),
            time_ms: 0.0,
        });
        cam.wake();
        for i in 1..20 {
            assert_eq!(step(&mut cam, i as f64 * 16.0), StepOutcome::Running);
        }
        cam.handle(InputEvent::PointerUp { time_ms: 400.0 });
        assert_eq!(step(&mut cam, 20.0 * 16.0), StepOutcome::Settled);
    }

    #[test]
    fn drag_tracks_pointer_immediately() {
        let mut cam = camera();
        cam.handle(InputEvent::PointerDown {
            button: 0,
            pos: Point::new(0.0, 0.0),
            time_ms: 0.0,
        });
        cam.handle(InputEvent::PointerMove {
            pos: Point::new(37.0, -12.0),
            time_ms: 10.0,
        });
        cam.wake();
        step(&mut cam, 16.0);
        assert_eq!(cam.current(), Transform::new(1.0, 37.0, -12.0));
    }

    #[test]
    fn slower_lerp_takes_longer() {
        let mut fast = camera();
        let mut slow = Camera::new(ViewportConfig {
            physics: crate::model::PhysicsConfig {
                position_lerp: 0.06,
                scale_lerp: 0.06,
                ..Default::default()
            },
            ..Default::default()
        });
        slow.set_container(Size::new(800.0, 600.0));
        fast.zoom_in();
        slow.zoom_in();
        let f = run_until_settled(&mut fast, 500).unwrap();
        let s = run_until_settled(&mut slow, 500).unwrap();
        assert!(s > f);
    }
}
