// Small DOM helpers shared by the viewport glue.
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsValue;
use web_sys::{
    AddEventListenerOptions, Element, Event, EventTarget, HtmlElement, ResizeObserver, TouchList,
};

use crate::error::Result;
use crate::model::{Point, Size};

/// An installed event listener. Removed explicitly by the owner on unmount.
pub struct Listener {
    target: EventTarget,
    kind: &'static str,
    function: js_sys::Function,
}

impl Listener {
    /// `passive: false` is required for wheel/touch handlers that call `prevent_default`.
    pub fn install(
        target: &EventTarget,
        kind: &'static str,
        passive: bool,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        // ownership moves to the JS GC; the function value keeps it alive
        let function: js_sys::Function = closure.into_js_value().unchecked_into();
        let options = AddEventListenerOptions::new();
        options.set_passive(passive);
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind, &function, &options,
        )?;
        Ok(Self {
            target: target.clone(),
            kind,
            function,
        })
    }

    pub fn remove(&self) {
        if let Err(err) = self
            .target
            .remove_event_listener_with_callback(self.kind, &self.function)
        {
            tracing::warn!(kind = self.kind, ?err, "failed to remove listener");
        }
    }
}

/// Calls back whenever the observed element's box changes size, including
/// layout changes that never fire a window `resize`. Disconnects on drop.
pub struct ResizeWatch {
    observer: ResizeObserver,
    _callback: Closure<dyn FnMut(JsValue)>,
}

impl ResizeWatch {
    pub fn observe(element: &Element, mut on_resize: impl FnMut() + 'static) -> Result<Self> {
        let callback = Closure::<dyn FnMut(JsValue)>::new(move |_entries: JsValue| on_resize());
        let observer = ResizeObserver::new(callback.as_ref().unchecked_ref())?;
        observer.observe(element);
        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for ResizeWatch {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Client coordinates relative to the element's top-left corner.
pub fn local_point(element: &HtmlElement, client_x: f64, client_y: f64) -> Point {
    let rect = element.get_bounding_client_rect();
    Point::new(client_x - rect.left(), client_y - rect.top())
}

pub fn touch_points(element: &HtmlElement, touches: &TouchList) -> Vec<Point> {
    let rect = element.get_bounding_client_rect();
    (0..touches.length())
        .filter_map(|i| touches.item(i))
        .map(|t| Point::new(t.client_x() as f64 - rect.left(), t.client_y() as f64 - rect.top()))
        .collect()
}

/// Inner size of the viewport container in CSS px.
pub fn client_size(element: &HtmlElement) -> Size {
    Size::new(element.client_width() as f64, element.client_height() as f64)
}

/// Layout size ignoring CSS transforms, i.e. the content's natural size.
pub fn layout_size(element: &HtmlElement) -> Size {
    Size::new(element.offset_width() as f64, element.offset_height() as f64)
}

pub fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .filter(|r| r.is_finite() && *r > 0.0)
        .unwrap_or(1.0)
}
