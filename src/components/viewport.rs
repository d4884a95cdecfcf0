use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{
    Event, HtmlCanvasElement, HtmlElement, HtmlImageElement, KeyboardEvent, MouseEvent, TouchEvent,
    WheelEvent,
};
use yew::prelude::*;

use super::dom::{
    Listener, ResizeWatch, client_size, layout_size, local_point, touch_points,
};
use super::frame_loop::FrameLoop;
use super::presenter::{CanvasPresenter, DomPresenter, Presenter};
use crate::error::{Result, ViewportError};
use crate::model::{PresentationMode, Size, ViewportConfig};
use crate::state::{Camera, InputEvent, InputResponse, KeyCommand, StepOutcome, step};
use crate::util::svg_data_url;

/// What the viewport hosts.
#[derive(Clone, PartialEq, Default)]
pub enum ViewportContent {
    /// Vector markup (e.g. rendered SVG). Rasterised in canvas mode.
    Markup(AttrValue),
    /// URL or data URL of an image.
    Image(AttrValue),
    /// Whatever children the host passes.
    #[default]
    Children,
}

/// Imperative control surface for host-built buttons. Re-emitted whenever the
/// committed zoom changes.
#[derive(Clone, PartialEq)]
pub struct ViewportControls {
    pub zoom_in: Callback<()>,
    pub zoom_out: Callback<()>,
    pub reset_zoom: Callback<()>,
    pub center_view: Callback<()>,
    pub scale_percent: u32,
}

#[derive(Properties, PartialEq)]
pub struct ZoomPanViewportProps {
    /// Complete configuration. Individual overrides below win over it.
    #[prop_or_default]
    pub config: Option<ViewportConfig>,
    #[prop_or_default]
    pub min_scale: Option<f64>,
    #[prop_or_default]
    pub max_scale: Option<f64>,
    #[prop_or_default]
    pub initial_scale: Option<f64>,
    #[prop_or_default]
    pub zoom_step: Option<f64>,
    #[prop_or_default]
    pub presentation: Option<PresentationMode>,
    #[prop_or_default]
    pub content: ViewportContent,
    #[prop_or_default]
    pub loading: bool,
    #[prop_or_default]
    pub fallback: Option<Html>,
    #[prop_or_default]
    pub on_controls: Callback<ViewportControls>,
    #[prop_or(AttrValue::Static("width:100%; height:100%;"))]
    pub style: AttrValue,
    #[prop_or_default]
    pub children: Html,
}

impl ZoomPanViewportProps {
    fn resolved_config(&self) -> ViewportConfig {
        let mut config = self.config.unwrap_or_default();
        if let Some(v) = self.min_scale {
            config.min_scale = v;
        }
        if let Some(v) = self.max_scale {
            config.max_scale = v;
        }
        if let Some(v) = self.initial_scale {
            config.initial_scale = v;
        }
        if let Some(v) = self.zoom_step {
            config.zoom_step = v;
        }
        if let Some(mode) = self.presentation {
            config.presentation = mode;
        }
        config
    }
}

/// Shared mutable state reachable from every listener, the frame loop and
/// the control callbacks.
#[derive(Clone)]
struct Handles {
    camera: Rc<RefCell<Camera>>,
    presenter: Rc<RefCell<Option<Box<dyn Presenter>>>>,
    frame_loop: Rc<RefCell<Option<FrameLoop>>>,
    percent: UseStateHandle<u32>,
}

impl Handles {
    fn respond(&self, response: InputResponse) {
        if response.wake {
            self.wake();
        }
        if response.present {
            self.present_current();
            self.publish();
        }
    }

    fn wake(&self) {
        if !self.camera.borrow_mut().wake() {
            return;
        }
        let scheduled = match self.frame_loop.borrow().as_ref() {
            Some(frame_loop) => frame_loop.schedule(),
            None => Err(ViewportError::Dom("frame loop not mounted".into())),
        };
        if let Err(err) = scheduled {
            tracing::warn!(%err, "could not start frame loop");
            self.camera.borrow_mut().halt();
        }
    }

    fn present_current(&self) {
        let (transform, mode) = {
            let camera = self.camera.borrow();
            (camera.current(), camera.transition())
        };
        if let Some(presenter) = self.presenter.borrow().as_ref() {
            if let Err(err) = presenter.present(&transform, mode) {
                tracing::debug!(%err, "present failed");
            }
        }
    }

    fn publish(&self) {
        let percent = self.camera.borrow().scale_percent();
        self.percent.set(percent);
    }

    /// One frame. Returns whether the loop should continue.
    fn tick(&self, now_ms: f64) -> bool {
        let outcome = step(&mut self.camera.borrow_mut(), now_ms);
        match outcome {
            StepOutcome::Skipped => true,
            StepOutcome::Running => {
                self.present_current();
                true
            }
            StepOutcome::Settled => {
                self.present_current();
                self.publish();
                false
            }
        }
    }

    /// Re-measure the container; resize the canvas and run initial centering when due.
    fn measure_container(&self, container: &HtmlElement) {
        let size = client_size(container);
        let canvas_mode = {
            let mut camera = self.camera.borrow_mut();
            camera.set_container(size);
            camera.config().presentation == PresentationMode::Canvas
        };
        if let Some(presenter) = self.presenter.borrow().as_ref() {
            if let Err(err) = presenter.resize(size) {
                tracing::debug!(%err, "resize failed");
            }
        }
        if canvas_mode && self.camera.borrow_mut().try_initial_center() {
            self.publish();
        }
        self.present_current();
    }

    fn dispatch(&self, event: InputEvent) -> InputResponse {
        let response = self.camera.borrow_mut().handle(event);
        self.respond(response);
        response
    }

    fn control(&self, op: fn(&mut Camera) -> InputResponse) -> Callback<()> {
        let handles = self.clone();
        Callback::from(move |()| {
            let response = op(&mut handles.camera.borrow_mut());
            handles.respond(response);
        })
    }
}

fn install_listeners(handles: &Handles, container: &HtmlElement) -> Result<Vec<Listener>> {
    let window = web_sys::window().ok_or_else(|| ViewportError::Dom("no window".into()))?;
    let mut listeners = Vec::new();

    listeners.push(Listener::install(container, "mousedown", false, {
        let handles = handles.clone();
        let container = container.clone();
        move |event: Event| {
            let Some(e) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let response = handles.dispatch(InputEvent::PointerDown {
                button: e.button(),
                pos: local_point(&container, e.client_x() as f64, e.client_y() as f64),
                time_ms: e.time_stamp(),
            });
            if response.consume {
                e.prevent_default();
                // prevent_default on mousedown also blocks focusing; keyboard shortcuts need it
                let _ = container.focus();
            }
        }
    })?);

    listeners.push(Listener::install(&window, "mousemove", true, {
        let handles = handles.clone();
        let container = container.clone();
        move |event: Event| {
            let Some(e) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            handles.dispatch(InputEvent::PointerMove {
                pos: local_point(&container, e.client_x() as f64, e.client_y() as f64),
                time_ms: e.time_stamp(),
            });
        }
    })?);

    listeners.push(Listener::install(&window, "mouseup", true, {
        let handles = handles.clone();
        move |event: Event| {
            handles.dispatch(InputEvent::PointerUp {
                time_ms: event.time_stamp(),
            });
        }
    })?);

    listeners.push(Listener::install(container, "wheel", false, {
        let handles = handles.clone();
        let container = container.clone();
        move |event: Event| {
            let Some(e) = event.dyn_ref::<WheelEvent>() else {
                return;
            };
            e.prevent_default();
            handles.dispatch(InputEvent::Wheel {
                delta_y: e.delta_y(),
                delta_mode: e.delta_mode(),
                pos: local_point(&container, e.client_x() as f64, e.client_y() as f64),
            });
        }
    })?);

    let touch_handler = |kind: &'static str| {
        let handles = handles.clone();
        let container = container.clone();
        move |event: Event| {
            let Some(e) = event.dyn_ref::<TouchEvent>() else {
                return;
            };
            let touches = touch_points(&container, &e.touches());
            let time_ms = e.time_stamp();
            let input = match kind {
                "touchstart" => InputEvent::TouchStart { touches, time_ms },
                "touchmove" => InputEvent::TouchMove { touches, time_ms },
                _ => InputEvent::TouchEnd { touches, time_ms },
            };
            if handles.dispatch(input).consume {
                e.prevent_default();
            }
        }
    };
    for kind in ["touchstart", "touchmove", "touchend", "touchcancel"] {
        listeners.push(Listener::install(container, kind, false, touch_handler(kind))?);
    }

    if handles.camera.borrow().config().keyboard_shortcuts {
        listeners.push(Listener::install(container, "keydown", false, {
            let handles = handles.clone();
            move |event: Event| {
                let Some(e) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                // leave browser zoom (ctrl/cmd +/-) alone
                if e.ctrl_key() || e.meta_key() || e.alt_key() {
                    return;
                }
                let Some(command) = KeyCommand::from_key(&e.key()) else {
                    return;
                };
                if handles.dispatch(InputEvent::Key(command)).consume {
                    e.prevent_default();
                }
            }
        })?);
    }

    // device-pixel-ratio changes (browser zoom, moving between screens)
    listeners.push(Listener::install(&window, "resize", true, {
        let handles = handles.clone();
        let container = container.clone();
        move |_event: Event| handles.measure_container(&container)
    })?);

    Ok(listeners)
}

/// Keeps the image element and its load callbacks alive for the canvas path.
struct ImageSource {
    image: HtmlImageElement,
    _onload: Closure<dyn FnMut()>,
    _onerror: Closure<dyn FnMut()>,
}

impl ImageSource {
    fn detach(&self) {
        self.image.set_onload(None);
        self.image.set_onerror(None);
    }
}

fn load_canvas_image(
    handles: &Handles,
    container: &HtmlElement,
    canvas: HtmlCanvasElement,
    src: &str,
) -> Result<ImageSource> {
    let image = HtmlImageElement::new()?;
    let onload = {
        let handles = handles.clone();
        let container = container.clone();
        let image = image.clone();
        Closure::wrap(Box::new(move || {
            let size = Size::new(image.natural_width() as f64, image.natural_height() as f64);
            tracing::debug!(width = size.width, height = size.height, "image loaded");
            handles.camera.borrow_mut().set_content(Some(size));
            // container may still be unmeasured; centering then happens on the next resize
            handles.measure_container(&container);
        }) as Box<dyn FnMut()>)
    };
    let onerror = {
        let handles = handles.clone();
        let src = src.chars().take(80).collect::<String>();
        Closure::wrap(Box::new(move || {
            tracing::warn!(error = %ViewportError::ImageLoad(src.clone()), "no content to show");
            handles.camera.borrow_mut().set_content(None);
        }) as Box<dyn FnMut()>)
    };
    image.set_onload(Some(onload.as_ref().unchecked_ref()));
    image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
    *handles.presenter.borrow_mut() = Some(Box::new(CanvasPresenter::new(canvas, image.clone())));
    image.set_src(src);
    Ok(ImageSource {
        image,
        _onload: onload,
        _onerror: onerror,
    })
}

/// Pan/zoom container for arbitrary content: drag, wheel, pinch, momentum and
/// imperative controls.
#[function_component(ZoomPanViewport)]
pub fn zoom_pan_viewport(props: &ZoomPanViewportProps) -> Html {
    let container_ref = use_node_ref();
    let content_ref = use_node_ref();
    let canvas_ref = use_node_ref();
    let camera = use_mut_ref(|| Camera::new(props.resolved_config()));
    let presenter = use_mut_ref(|| None::<Box<dyn Presenter>>);
    let frame_loop = use_mut_ref(|| None::<FrameLoop>);
    let percent = use_state_eq(|| camera.borrow().scale_percent());
    let handles = Handles {
        camera: camera.clone(),
        presenter: presenter.clone(),
        frame_loop: frame_loop.clone(),
        percent: percent.clone(),
    };
    let mode = camera.borrow().config().presentation;

    // Mount: frame loop + listeners
    {
        let handles = handles.clone();
        let container_ref = container_ref.clone();
        use_effect_with((), move |_| {
            let mut listeners = Vec::new();
            let mut resize_watch = None;
            match (web_sys::window(), container_ref.cast::<HtmlElement>()) {
                (Some(window), Some(container)) => {
                    let tick_handles = handles.clone();
                    *handles.frame_loop.borrow_mut() =
                        Some(FrameLoop::new(window, move |now| tick_handles.tick(now)));
                    match install_listeners(&handles, &container) {
                        Ok(installed) => listeners = installed,
                        Err(err) => tracing::warn!(%err, "viewport listeners not installed"),
                    }
                    let watch = ResizeWatch::observe(&container, {
                        let handles = handles.clone();
                        let container = container.clone();
                        move || handles.measure_container(&container)
                    });
                    match watch {
                        Ok(watch) => resize_watch = Some(watch),
                        Err(err) => tracing::warn!(%err, "container resize observer unavailable"),
                    }
                    handles.measure_container(&container);
                }
                _ => tracing::warn!("viewport mounted without window or container"),
            }
            move || {
                drop(resize_watch);
                for listener in &listeners {
                    listener.remove();
                }
                if let Some(frame_loop) = handles.frame_loop.borrow_mut().take() {
                    frame_loop.stop();
                }
                handles.camera.borrow_mut().halt();
                tracing::debug!("viewport unmounted");
            }
        });
    }

    // Content: (re)build the presenter whenever what we host changes
    {
        let handles = handles.clone();
        let container_ref = container_ref.clone();
        let content_ref = content_ref.clone();
        let canvas_ref = canvas_ref.clone();
        let deps = (props.content.clone(), props.loading);
        use_effect_with(deps, move |(content, loading)| {
            let mut image_source = None;
            let container = container_ref.cast::<HtmlElement>();
            if *loading {
                handles.camera.borrow_mut().set_content(None);
            } else {
                match mode {
                    PresentationMode::Transform => {
                        if let Some(element) = content_ref.cast::<HtmlElement>() {
                            let size = layout_size(&element);
                            match DomPresenter::new(element) {
                                Ok(p) => *handles.presenter.borrow_mut() = Some(Box::new(p)),
                                Err(err) => tracing::warn!(%err, "transform presenter unavailable"),
                            }
                            let content = (!size.is_degenerate()).then_some(size);
                            handles.camera.borrow_mut().set_content(content);
                        }
                    }
                    PresentationMode::Canvas => {
                        let src = match content {
                            ViewportContent::Image(url) => Some(url.to_string()),
                            ViewportContent::Markup(markup) => Some(svg_data_url(markup)),
                            ViewportContent::Children => {
                                tracing::warn!("canvas presentation needs image or markup content");
                                None
                            }
                        };
                        if let (Some(src), Some(canvas), Some(container)) =
                            (src, canvas_ref.cast::<HtmlCanvasElement>(), container.as_ref())
                        {
                            match load_canvas_image(&handles, container, canvas, &src) {
                                Ok(source) => image_source = Some(source),
                                Err(err) => tracing::warn!(%err, "canvas image not loaded"),
                            }
                        }
                    }
                }
            }
            if let Some(container) = container.as_ref() {
                handles.measure_container(container);
            }
            move || {
                if let Some(source) = image_source.as_ref() {
                    source.detach();
                }
                handles.presenter.borrow_mut().take();
            }
        });
    }

    // Publish the control surface whenever the committed zoom changes
    {
        let on_controls = props.on_controls.clone();
        let handles = handles.clone();
        use_effect_with(*percent, move |percent| {
            on_controls.emit(ViewportControls {
                zoom_in: handles.control(Camera::zoom_in),
                zoom_out: handles.control(Camera::zoom_out),
                reset_zoom: handles.control(Camera::reset_zoom),
                center_view: handles.control(|camera| {
                    camera.center_view().unwrap_or_else(|err| {
                        tracing::debug!(%err, "center view ignored");
                        InputResponse::IGNORED
                    })
                }),
                scale_percent: *percent,
            });
            || ()
        });
    }

    let measure_on_load = {
        let handles = handles.clone();
        let content_ref = content_ref.clone();
        let container_ref = container_ref.clone();
        Callback::from(move |_: Event| {
            if let Some(element) = content_ref.cast::<HtmlElement>() {
                let size = layout_size(&element);
                handles
                    .camera
                    .borrow_mut()
                    .set_content((!size.is_degenerate()).then_some(size));
            }
            if let Some(container) = container_ref.cast::<HtmlElement>() {
                handles.measure_container(&container);
            }
        })
    };

    let body = if props.loading {
        props
            .fallback
            .clone()
            .unwrap_or_else(|| html! { <div style="position:absolute; inset:0; display:flex; align-items:center; justify-content:center; opacity:0.7;">{"Loading…"}</div> })
    } else {
        match mode {
            PresentationMode::Transform => {
                let inner = match &props.content {
                    ViewportContent::Markup(markup) => Html::from_html_unchecked(markup.clone()),
                    ViewportContent::Image(src) => html! {
                        <img src={src.clone()} draggable="false" onload={measure_on_load.clone()} style="display:block;" />
                    },
                    ViewportContent::Children => props.children.clone(),
                };
                html! {
                    <div ref={content_ref.clone()} style="position:absolute; left:0; top:0; transform-origin:0 0;">
                        { inner }
                    </div>
                }
            }
            PresentationMode::Canvas => html! {
                <canvas ref={canvas_ref.clone()} style="position:absolute; left:0; top:0; display:block;" />
            },
        }
    };

    html! {
        <div
            ref={container_ref}
            class="zoom-pan-viewport"
            tabindex="0"
            style={format!("position:relative; overflow:hidden; touch-action:none; user-select:none; outline:none; cursor:grab; {}", props.style)}
        >
            { body }
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win_over_config() {
        let props = ZoomPanViewportProps {
            config: Some(ViewportConfig {
                max_scale: 8.0,
                zoom_step: 0.5,
                ..Default::default()
            }),
            min_scale: None,
            max_scale: Some(3.0),
            initial_scale: Some(2.0),
            zoom_step: None,
            presentation: Some(PresentationMode::Canvas),
            content: ViewportContent::Children,
            loading: false,
            fallback: None,
            on_controls: Callback::noop(),
            style: AttrValue::Static(""),
            children: Html::default(),
        };
        let config = props.resolved_config();
        assert_eq!(config.max_scale, 3.0);
        assert_eq!(config.initial_scale, 2.0);
        assert_eq!(config.zoom_step, 0.5);
        assert_eq!(config.presentation, PresentationMode::Canvas);
    }
}
