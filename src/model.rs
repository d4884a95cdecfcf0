//! Core data models for the zoom/pan viewport.
//! Plain value types shared by the engine in `state` and the browser glue in
//! `components`. Nothing here touches the DOM.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either side is zero, negative or not finite (not laid out yet, hidden).
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite()
            && self.height.is_finite()
            && self.width > 0.0
            && self.height > 0.0)
    }

    pub fn center(&self) -> Point {
        Point::new(self.width * 0.5, self.height * 0.5)
    }
}

/// Pointer speed in px per reference frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f64,
    pub vy: f64,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity { vx: 0.0, vy: 0.0 };

    pub fn magnitude(&self) -> f64 {
        self.vx.hypot(self.vy)
    }
}

/// Placement of the hosted content inside the container: content point `c`
/// lands on screen at `c * scale + offset`. Origin is the container's top-left.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::at_scale(1.0)
    }
}

impl Transform {
    pub const fn new(scale: f64, offset_x: f64, offset_y: f64) -> Self {
        Self {
            scale,
            offset_x,
            offset_y,
        }
    }

    pub const fn at_scale(scale: f64) -> Self {
        Self::new(scale, 0.0, 0.0)
    }

    pub fn to_content(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.offset_x) / self.scale,
            (screen.y - self.offset_y) / self.scale,
        )
    }

    pub fn to_screen(&self, content: Point) -> Point {
        Point::new(
            content.x * self.scale + self.offset_x,
            content.y * self.scale + self.offset_y,
        )
    }

    /// The content point under `start_anchor` (in this transform) ends up under
    /// `new_anchor` at `new_scale`. Every anchored zoom goes through here.
    pub fn anchored(&self, start_anchor: Point, new_anchor: Point, new_scale: f64) -> Transform {
        let content = self.to_content(start_anchor);
        Transform::new(
            new_scale,
            new_anchor.x - content.x * new_scale,
            new_anchor.y - content.y * new_scale,
        )
    }

    /// Zoom to `new_scale` keeping the content under `anchor` fixed.
    pub fn zoomed_about(&self, anchor: Point, new_scale: f64) -> Transform {
        self.anchored(anchor, anchor, new_scale)
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Transform {
        Transform::new(self.scale, self.offset_x + dx, self.offset_y + dy)
    }

    /// Move a fraction of the remaining distance towards `target`.
    pub fn lerp_towards(
        &self,
        target: &Transform,
        position_factor: f64,
        scale_factor: f64,
    ) -> Transform {
        Transform::new(
            self.scale + (target.scale - self.scale) * scale_factor,
            self.offset_x + (target.offset_x - self.offset_x) * position_factor,
            self.offset_y + (target.offset_y - self.offset_y) * position_factor,
        )
    }

    pub fn approx_eq(&self, other: &Transform, position_tol: f64, scale_tol: f64) -> bool {
        (self.offset_x - other.offset_x).abs() < position_tol
            && (self.offset_y - other.offset_y).abs() < position_tol
            && (self.scale - other.scale).abs() < scale_tol
    }

    pub fn is_finite(&self) -> bool {
        self.scale.is_finite() && self.offset_x.is_finite() && self.offset_y.is_finite()
    }
}

/// How the presentation layer should apply the next transform.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionMode {
    /// Apply exactly, no declarative transition. Used for every loop tick and gesture.
    #[default]
    Immediate,
    /// Let the presentation layer ease into the new value on its own.
    Smooth,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresentationMode {
    /// CSS transform on a wrapper element around markup content.
    #[default]
    Transform,
    /// Redraw a bitmap onto a device-pixel-ratio sized canvas.
    Canvas,
}

/// How discrete control calls (buttons, shortcuts) reach the screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlEasing {
    /// Eased by the physics loop like every other input.
    #[default]
    Physics,
    /// Written straight to Current and eased by a CSS transition. Only honoured
    /// by the transform presentation; the canvas falls back to `Physics`.
    Transition,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Frame interval the per-frame constants are tuned for (60Hz).
    pub reference_frame_ms: f64,
    /// Ticks with a larger dt are dropped (backgrounded tab).
    pub stall_threshold_ms: f64,
    /// Velocity multiplier per reference frame, in (0, 1).
    pub friction: f64,
    /// Below this speed momentum is zeroed.
    pub momentum_epsilon: f64,
    pub position_lerp: f64,
    pub scale_lerp: f64,
    /// Lerp rate while a drag or pinch is in progress. 1.0 tracks the pointer 1:1.
    pub gesture_lerp: f64,
    pub position_tolerance: f64,
    pub scale_tolerance: f64,
    pub velocity_tolerance: f64,
    pub wheel_sensitivity: f64,
    /// A drag released after resting this long does not coast.
    pub release_stale_ms: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            reference_frame_ms: 1000.0 / 60.0,
            stall_threshold_ms: 100.0,
            friction: 0.95,
            momentum_epsilon: 0.05,
            position_lerp: 0.12,
            scale_lerp: 0.12,
            gesture_lerp: 1.0,
            position_tolerance: 0.1,
            scale_tolerance: 1e-4,
            velocity_tolerance: 0.1,
            wheel_sensitivity: 0.002,
            release_stale_ms: 100.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    pub initial_scale: f64,
    /// Scale added or removed by one zoom button press.
    pub zoom_step: f64,
    /// Margin kept around the content by fit-to-view, in CSS px.
    pub fit_padding: f64,
    pub presentation: PresentationMode,
    pub control_easing: ControlEasing,
    pub keyboard_shortcuts: bool,
    pub physics: PhysicsConfig,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 5.0,
            initial_scale: 1.0,
            zoom_step: 0.1,
            fit_padding: 40.0,
            presentation: PresentationMode::Transform,
            control_easing: ControlEasing::Physics,
            keyboard_shortcuts: true,
            physics: PhysicsConfig::default(),
        }
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn unit_open(value: f64) -> bool {
    value.is_finite() && value > 0.0 && value < 1.0
}

fn unit_half_open(value: f64) -> bool {
    value.is_finite() && value > 0.0 && value <= 1.0
}

impl ViewportConfig {
    /// Repair values that would break the engine. Each repair is logged; this never fails.
    pub fn validated(mut self) -> Self {
        let defaults = ViewportConfig::default();
        if !positive(self.min_scale) {
            tracing::warn!(min_scale = self.min_scale, "invalid min_scale, using default");
            self.min_scale = defaults.min_scale;
        }
        if !positive(self.max_scale) {
            tracing::warn!(max_scale = self.max_scale, "invalid max_scale, using default");
            self.max_scale = defaults.max_scale.max(self.min_scale);
        }
        if self.max_scale < self.min_scale {
            tracing::warn!(
                min_scale = self.min_scale,
                max_scale = self.max_scale,
                "scale bounds swapped"
            );
            std::mem::swap(&mut self.min_scale, &mut self.max_scale);
        }
        if !self.initial_scale.is_finite() {
            tracing::warn!(
                initial_scale = self.initial_scale,
                "invalid initial_scale, using default"
            );
            self.initial_scale = defaults.initial_scale;
        }
        let clamped = self.initial_scale.clamp(self.min_scale, self.max_scale);
        if clamped != self.initial_scale {
            tracing::warn!(
                initial_scale = self.initial_scale,
                clamped,
                "initial_scale out of bounds"
            );
            self.initial_scale = clamped;
        }
        if !positive(self.zoom_step) {
            tracing::warn!(zoom_step = self.zoom_step, "invalid zoom_step, using default");
            self.zoom_step = defaults.zoom_step;
        }
        if !(self.fit_padding.is_finite() && self.fit_padding >= 0.0) {
            tracing::warn!(fit_padding = self.fit_padding, "invalid fit_padding, using default");
            self.fit_padding = defaults.fit_padding;
        }
        self.physics = self.physics.validated();
        self
    }

    /// Clamp into `[min_scale, max_scale]`. NaN collapses to the lower bound.
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        if scale.is_nan() {
            self.min_scale
        } else {
            scale.clamp(self.min_scale, self.max_scale)
        }
    }

    pub fn initial_transform(&self) -> Transform {
        Transform::at_scale(self.initial_scale)
    }
}

fn repair(name: &str, value: &mut f64, ok: fn(f64) -> bool, fallback: f64) {
    if !ok(*value) {
        tracing::warn!(field = name, value = *value, "invalid physics constant, using default");
        *value = fallback;
    }
}

impl PhysicsConfig {
    pub fn validated(mut self) -> Self {
        let d = PhysicsConfig::default();
        repair("reference_frame_ms", &mut self.reference_frame_ms, positive, d.reference_frame_ms);
        repair("stall_threshold_ms", &mut self.stall_threshold_ms, positive, d.stall_threshold_ms);
        repair("friction", &mut self.friction, unit_open, d.friction);
        repair("momentum_epsilon", &mut self.momentum_epsilon, positive, d.momentum_epsilon);
        repair("position_lerp", &mut self.position_lerp, unit_half_open, d.position_lerp);
        repair("scale_lerp", &mut self.scale_lerp, unit_half_open, d.scale_lerp);
        repair("gesture_lerp", &mut self.gesture_lerp, unit_half_open, d.gesture_lerp);
        repair("position_tolerance", &mut self.position_tolerance, positive, d.position_tolerance);
        repair("scale_tolerance", &mut self.scale_tolerance, positive, d.scale_tolerance);
        repair("velocity_tolerance", &mut self.velocity_tolerance, positive, d.velocity_tolerance);
        repair("wheel_sensitivity", &mut self.wheel_sensitivity, positive, d.wheel_sensitivity);
        repair("release_stale_ms", &mut self.release_stale_ms, positive, d.release_stale_ms);
        self
    }
}
