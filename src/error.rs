use thiserror::Error;
use wasm_bindgen::JsValue;

use crate::model::Size;

/// Everything here is recovered where it happens (logged and treated as a
/// no-op); none of it is fatal to the host.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ViewportError {
    #[error("degenerate geometry: container {container:?}, content {content:?}")]
    DegenerateGeometry { container: Size, content: Size },
    #[error("content dimensions are not known yet")]
    ContentNotReady,
    #[error("rejected non-finite or non-positive scale {0}")]
    InvalidScale(f64),
    #[error("dom: {0}")]
    Dom(String),
    #[error("image failed to load: {0}")]
    ImageLoad(String),
}

impl From<JsValue> for ViewportError {
    fn from(value: JsValue) -> Self {
        ViewportError::Dom(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

pub type Result<T> = std::result::Result<T, ViewportError>;
