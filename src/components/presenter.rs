//! Presentation adapters: how the current transform reaches the screen.
//!
//! [`DomPresenter`] writes a CSS transform on the element wrapping markup
//! content. [`CanvasPresenter`] redraws a bitmap onto a canvas whose backing
//! store is sized in device pixels.

use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement, HtmlImageElement};

use crate::components::dom::device_pixel_ratio;
use crate::error::{Result, ViewportError};
use crate::model::{Size, Transform, TransitionMode};

/// Declarative transition used for `TransitionMode::Smooth`.
pub const SMOOTH_TRANSITION: &str = "transform 200ms ease-out";

pub trait Presenter {
    fn present(&self, transform: &Transform, mode: TransitionMode) -> Result<()>;

    /// Container changed size. Only the canvas cares.
    fn resize(&self, _container: Size) -> Result<()> {
        Ok(())
    }
}

/// Translate then scale, origin top-left.
pub fn css_transform(transform: &Transform) -> String {
    format!(
        "translate({}px, {}px) scale({})",
        transform.offset_x, transform.offset_y, transform.scale
    )
}

pub fn css_transition(mode: TransitionMode) -> &'static str {
    match mode {
        TransitionMode::Immediate => "none",
        TransitionMode::Smooth => SMOOTH_TRANSITION,
    }
}

pub struct DomPresenter {
    element: HtmlElement,
}

impl DomPresenter {
    pub fn new(element: HtmlElement) -> Result<Self> {
        let style = element.style();
        style.set_property("transform-origin", "0 0")?;
        style.set_property("will-change", "transform")?;
        Ok(Self { element })
    }
}

impl Presenter for DomPresenter {
    fn present(&self, transform: &Transform, mode: TransitionMode) -> Result<()> {
        let style = self.element.style();
        // transition first so an immediate write never animates
        style.set_property("transition", css_transition(mode))?;
        style.set_property("transform", &css_transform(transform))?;
        Ok(())
    }
}

pub struct CanvasPresenter {
    canvas: HtmlCanvasElement,
    image: HtmlImageElement,
}

impl CanvasPresenter {
    pub fn new(canvas: HtmlCanvasElement, image: HtmlImageElement) -> Self {
        Self { canvas, image }
    }

    fn context(&self) -> Result<CanvasRenderingContext2d> {
        self.canvas
            .get_context("2d")?
            .ok_or_else(|| ViewportError::Dom("2d context unavailable".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| ViewportError::Dom("context is not 2d".into()))
    }

    fn image_ready(&self) -> bool {
        self.image.complete() && self.image.natural_width() > 0
    }
}

impl Presenter for CanvasPresenter {
    fn present(&self, transform: &Transform, _mode: TransitionMode) -> Result<()> {
        if !self.canvas.is_connected() {
            return Ok(());
        }
        let ctx = self.context()?;
        let dpr = device_pixel_ratio();
        ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
        ctx.clear_rect(0.0, 0.0, self.canvas.width() as f64, self.canvas.height() as f64);
        if !self.image_ready() {
            return Ok(());
        }
        let s = transform.scale * dpr;
        ctx.set_transform(
            s,
            0.0,
            0.0,
            s,
            transform.offset_x * dpr,
            transform.offset_y * dpr,
        )?;
        ctx.draw_image_with_html_image_element(&self.image, 0.0, 0.0)?;
        Ok(())
    }

    fn resize(&self, container: Size) -> Result<()> {
        if container.is_degenerate() {
            return Ok(());
        }
        let dpr = device_pixel_ratio();
        self.canvas.set_width((container.width * dpr).round() as u32);
        self.canvas.set_height((container.height * dpr).round() as u32);
        let style = self.canvas.style();
        style.set_property("width", &format!("{}px", container.width))?;
        style.set_property("height", &format!("{}px", container.height))?;
        tracing::debug!(dpr, width = container.width, height = container.height, "canvas resized");
        Ok(())
    }
}
