pub mod camera;
pub mod gesture;
pub mod physics;

pub use camera::{Camera, fit_to_view};
pub use gesture::{Gesture, InputEvent, InputResponse, KeyCommand};
pub use physics::{StepOutcome, step};
