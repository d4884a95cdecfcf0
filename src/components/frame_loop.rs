use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::Window;

use crate::error::{Result, ViewportError};

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// requestAnimationFrame driver. Each frame calls `tick(timestamp_ms)`; the
/// loop reschedules itself only while `tick` returns true, so an idle
/// viewport costs nothing.
pub struct FrameLoop {
    window: Window,
    callback: FrameCallback,
    pending: Rc<Cell<Option<i32>>>,
}

impl FrameLoop {
    pub fn new(window: Window, mut tick: impl FnMut(f64) -> bool + 'static) -> Self {
        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let pending = Rc::new(Cell::new(None));
        {
            let callback_inner = callback.clone();
            let pending_inner = pending.clone();
            let window_inner = window.clone();
            *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
                pending_inner.set(None);
                if !tick(timestamp) {
                    return;
                }
                if let Some(cb) = callback_inner.borrow().as_ref() {
                    match window_inner.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        Ok(id) => pending_inner.set(Some(id)),
                        Err(err) => tracing::warn!(?err, "requestAnimationFrame failed"),
                    }
                }
            }) as Box<dyn FnMut(f64)>));
        }
        Self {
            window,
            callback,
            pending,
        }
    }

    /// Request a frame unless one is already pending.
    pub fn schedule(&self) -> Result<()> {
        if self.pending.get().is_some() {
            return Ok(());
        }
        let callback = self.callback.borrow();
        let cb = callback
            .as_ref()
            .ok_or_else(|| ViewportError::Dom("frame loop stopped".into()))?;
        let id = self.window.request_animation_frame(cb.as_ref().unchecked_ref())?;
        self.pending.set(Some(id));
        Ok(())
    }

    pub fn cancel(&self) {
        if let Some(id) = self.pending.take() {
            if let Err(err) = self.window.cancel_animation_frame(id) {
                tracing::warn!(?err, "cancelAnimationFrame failed");
            }
        }
    }

    /// Cancel and release the callback, breaking its self-reference.
    pub fn stop(&self) {
        self.cancel();
        self.callback.borrow_mut().take();
    }
}
