// Gesture state machine: Idle / Dragging / Pinching, driven by normalised input events.
use crate::error::{Result, ViewportError};
use crate::model::{Point, Transform, Velocity};
use crate::state::Camera;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragSession {
    pub start_pointer: Point,
    pub start_target: Transform,
    pub last_pointer: Point,
    pub last_move_ms: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PinchSession {
    pub start_target: Transform,
    pub start_touches: [Point; 2],
    pub start_distance: f64,
    pub start_midpoint: Point,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging(DragSession),
    Pinching(PinchSession),
}

impl Gesture {
    pub fn is_active(&self) -> bool {
        !matches!(self, Gesture::Idle)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    ZoomIn,
    ZoomOut,
    Reset,
    Fit,
}

impl KeyCommand {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "+" | "=" => Some(KeyCommand::ZoomIn),
            "-" | "_" => Some(KeyCommand::ZoomOut),
            "0" => Some(KeyCommand::Reset),
            "f" | "F" => Some(KeyCommand::Fit),
            _ => None,
        }
    }
}

/// Browser input reduced to what the engine needs. Positions are relative to
/// the container's top-left corner in CSS px.
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    PointerDown { button: i16, pos: Point, time_ms: f64 },
    PointerMove { pos: Point, time_ms: f64 },
    PointerUp { time_ms: f64 },
    /// `delta_mode` as reported by the browser: 0 pixels, 1 lines, 2 pages.
    Wheel { delta_y: f64, delta_mode: u32, pos: Point },
    TouchStart { touches: Vec<Point>, time_ms: f64 },
    TouchMove { touches: Vec<Point>, time_ms: f64 },
    /// Carries the touches still down after the release.
    TouchEnd { touches: Vec<Point>, time_ms: f64 },
    Key(KeyCommand),
}

/// What the glue should do after an event was handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputResponse {
    /// Suppress the browser default (scroll, selection, emulated mouse events).
    pub consume: bool,
    /// Target changed; the frame loop must run.
    pub wake: bool,
    /// Current was written directly; present it once and refresh the UI.
    pub present: bool,
}

impl InputResponse {
    pub const IGNORED: InputResponse = InputResponse {
        consume: false,
        wake: false,
        present: false,
    };

    pub const fn woke(consume: bool) -> Self {
        InputResponse {
            consume,
            wake: true,
            present: false,
        }
    }
}

const LINE_HEIGHT_PX: f64 = 40.0;
const PAGE_HEIGHT_PX: f64 = 800.0;

/// Bring line- and page-mode wheel deltas to roughly pixel magnitude.
pub fn normalize_wheel_delta(delta_y: f64, delta_mode: u32) -> f64 {
    match delta_mode {
        1 => delta_y * LINE_HEIGHT_PX,
        2 => delta_y * PAGE_HEIGHT_PX,
        _ => delta_y,
    }
}

/// Exponential response: equal wheel travel gives equal perceived zoom at any scale.
pub fn wheel_scale_factor(delta: f64, sensitivity: f64) -> f64 {
    (-delta * sensitivity).exp()
}

impl Camera {
    /// Single dispatch point for all input, keyed by event and gesture state.
    pub fn handle(&mut self, event: InputEvent) -> InputResponse {
        match (event, self.gesture) {
            (
                InputEvent::PointerDown {
                    button,
                    pos,
                    time_ms,
                },
                Gesture::Idle | Gesture::Dragging(_),
            ) => {
                // primary or middle button
                if button != 0 && button != 1 {
                    return InputResponse::IGNORED;
                }
                self.begin_drag(pos, time_ms);
                InputResponse::woke(true)
            }
            (InputEvent::PointerDown { .. }, Gesture::Pinching(_)) => InputResponse::IGNORED,
            (InputEvent::PointerMove { pos, time_ms }, Gesture::Dragging(session)) => {
                self.drag_to(session, pos, time_ms);
                InputResponse::woke(true)
            }
            (InputEvent::PointerMove { .. }, _) => InputResponse::IGNORED,
            (InputEvent::PointerUp { time_ms }, Gesture::Dragging(session)) => {
                self.release_drag(session, time_ms);
                InputResponse::woke(false)
            }
            (InputEvent::PointerUp { .. }, _) => InputResponse::IGNORED,
            (
                InputEvent::Wheel {
                    delta_y,
                    delta_mode,
                    pos,
                },
                _,
            ) => {
                if let Err(err) = self.wheel_zoom(delta_y, delta_mode, pos) {
                    tracing::debug!(delta_y, delta_mode, %err, "wheel zoom rejected");
                    return InputResponse {
                        consume: true,
                        ..InputResponse::IGNORED
                    };
                }
                self.rebase_drag();
                InputResponse::woke(true)
            }
            (InputEvent::TouchStart { touches, time_ms }, _) => {
                self.touches_changed(&touches, time_ms)
            }
            (InputEvent::TouchMove { touches, time_ms }, Gesture::Dragging(session)) => {
                match touches.as_slice() {
                    [only] => {
                        self.drag_to(session, *only, time_ms);
                        InputResponse::woke(true)
                    }
                    _ => self.touches_changed(&touches, time_ms),
                }
            }
            (InputEvent::TouchMove { touches, time_ms }, Gesture::Pinching(session)) => {
                match touches.as_slice() {
                    [a, b, ..] => {
                        self.pinch_to(session, *a, *b);
                        InputResponse::woke(true)
                    }
                    _ => self.touches_changed(&touches, time_ms),
                }
            }
            // move without a session (raced with touchend)
            (InputEvent::TouchMove { .. }, Gesture::Idle) => InputResponse::IGNORED,
            (InputEvent::TouchEnd { touches, time_ms }, gesture) => {
                if !gesture.is_active() {
                    return InputResponse::IGNORED;
                }
                if touches.is_empty() {
                    match gesture {
                        Gesture::Dragging(session) => self.release_drag(session, time_ms),
                        _ => {
                            self.velocity = Velocity::ZERO;
                            self.gesture = Gesture::Idle;
                            tracing::debug!("pinch ended");
                        }
                    }
                    InputResponse::woke(true)
                } else {
                    self.touches_changed(&touches, time_ms)
                }
            }
            (InputEvent::Key(command), _) => {
                let mut response = match command {
                    KeyCommand::ZoomIn => self.zoom_in(),
                    KeyCommand::ZoomOut => self.zoom_out(),
                    KeyCommand::Reset => self.reset_zoom(),
                    KeyCommand::Fit => self.center_view().unwrap_or_else(|err| {
                        tracing::debug!(%err, "fit shortcut ignored");
                        InputResponse::IGNORED
                    }),
                };
                self.rebase_drag();
                response.consume = true;
                response
            }
        }
    }

    /// Re-snapshot whatever gesture the current set of touches implies.
    fn touches_changed(&mut self, touches: &[Point], time_ms: f64) -> InputResponse {
        match touches {
            [] => InputResponse::IGNORED,
            [only] => {
                self.begin_drag(*only, time_ms);
                InputResponse::woke(true)
            }
            [a, b, ..] => {
                self.begin_pinch(*a, *b);
                InputResponse::woke(true)
            }
        }
    }

    fn begin_drag(&mut self, pos: Point, time_ms: f64) {
        self.velocity = Velocity::ZERO;
        self.gesture = Gesture::Dragging(DragSession {
            start_pointer: pos,
            start_target: self.target,
            last_pointer: pos,
            last_move_ms: time_ms,
        });
        tracing::debug!(x = pos.x, y = pos.y, "drag started");
    }

    fn drag_to(&mut self, mut session: DragSession, pos: Point, time_ms: f64) {
        let dx = pos.x - session.start_pointer.x;
        let dy = pos.y - session.start_pointer.y;
        let moved = session.start_target.translated(dx, dy);
        self.write_target(Transform::new(self.target.scale, moved.offset_x, moved.offset_y));
        // instantaneous, not cumulative: this is what seeds momentum on release
        self.velocity = Velocity {
            vx: pos.x - session.last_pointer.x,
            vy: pos.y - session.last_pointer.y,
        };
        session.last_pointer = pos;
        session.last_move_ms = time_ms;
        self.gesture = Gesture::Dragging(session);
        tracing::trace!(dx, dy, "drag");
    }

    /// Target moved under a live drag (wheel, keys): continue the drag from
    /// the new Target at the last pointer position.
    fn rebase_drag(&mut self) {
        if let Gesture::Dragging(mut session) = self.gesture {
            session.start_target = self.target;
            session.start_pointer = session.last_pointer;
            self.gesture = Gesture::Dragging(session);
        }
    }

    fn release_drag(&mut self, session: DragSession, time_ms: f64) {
        if time_ms - session.last_move_ms > self.config.physics.release_stale_ms {
            self.velocity = Velocity::ZERO;
        }
        self.gesture = Gesture::Idle;
        tracing::debug!(vx = self.velocity.vx, vy = self.velocity.vy, "drag released");
    }

    fn begin_pinch(&mut self, a: Point, b: Point) {
        self.velocity = Velocity::ZERO;
        self.gesture = Gesture::Pinching(PinchSession {
            start_target: self.target,
            start_touches: [a, b],
            start_distance: a.distance(b),
            start_midpoint: a.midpoint(b),
        });
        tracing::debug!(distance = a.distance(b), "pinch started");
    }

    fn pinch_to(&mut self, session: PinchSession, a: Point, b: Point) {
        let ratio = if session.start_distance > f64::EPSILON {
            a.distance(b) / session.start_distance
        } else {
            1.0
        };
        let new_scale = self.config.clamp_scale(session.start_target.scale * ratio);
        let next = session
            .start_target
            .anchored(session.start_midpoint, a.midpoint(b), new_scale);
        self.write_target(next);
        tracing::trace!(ratio, new_scale, "pinch");
    }

    fn wheel_zoom(&mut self, delta_y: f64, delta_mode: u32, pos: Point) -> Result<()> {
        let delta = normalize_wheel_delta(delta_y, delta_mode);
        let factor = wheel_scale_factor(delta, self.config.physics.wheel_sensitivity);
        let proposed = self.target.scale * factor;
        if !(proposed.is_finite() && proposed > 0.0) {
            return Err(ViewportError::InvalidScale(proposed));
        }
        let new_scale = self.config.clamp_scale(proposed);
        let next = self.target.zoomed_about(pos, new_scale);
        self.write_target(next);
        tracing::trace!(delta, factor, new_scale, "wheel");
        Ok(())
    }
}
