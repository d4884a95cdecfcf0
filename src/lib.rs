//! Pan and zoom for arbitrary content in a fixed-size container, as a Yew
//! component: mouse drag, wheel and pinch input, inertial coasting after a
//! drag, and imperative zoom/reset/fit controls for host buttons.
//!
//! The engine in [`state`] is plain Rust and owns all transform state. The
//! [`components`] module wires it to the DOM.

pub mod components;
pub mod error;
pub mod model;
pub mod state;
pub mod util;

pub use components::{
    CameraControls, ViewportContent, ViewportControls, ZoomPanViewport, ZoomPanViewportProps,
};
pub use error::{Result, ViewportError};
pub use model::{PresentationMode, Transform, ViewportConfig};
