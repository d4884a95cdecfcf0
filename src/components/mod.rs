pub mod app;
pub mod camera_controls;
pub mod dom;
pub mod frame_loop;
pub mod presenter;
pub mod viewport;

pub use app::{App, AppProps};
pub use camera_controls::CameraControls;
pub use viewport::{ViewportContent, ViewportControls, ZoomPanViewport, ZoomPanViewportProps};
