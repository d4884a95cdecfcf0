#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlElement;
use yew_zoom_pan::Transform;
use yew_zoom_pan::components::dom::ResizeWatch;
use yew_zoom_pan::components::presenter::{DomPresenter, Presenter, SMOOTH_TRANSITION};
use yew_zoom_pan::model::TransitionMode;

wasm_bindgen_test_configure!(run_in_browser);

fn element() -> HtmlElement {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .expect("document");
    let el: HtmlElement = document
        .create_element("div")
        .expect("create div")
        .dyn_into()
        .expect("html element");
    document.body().expect("body").append_child(&el).expect("append");
    el
}

#[wasm_bindgen_test]
fn dom_presenter_writes_transform() {
    let el = element();
    let presenter = DomPresenter::new(el.clone()).expect("presenter");
    presenter
        .present(&Transform::new(2.0, 10.0, -4.0), TransitionMode::Immediate)
        .expect("present");
    let style = el.style();
    assert_eq!(style.get_property_value("transition").unwrap(), "none");
    let transform = style.get_property_value("transform").unwrap();
    assert!(transform.contains("translate(10px, -4px)"), "{transform}");
    assert!(transform.contains("scale(2)"), "{transform}");
}

#[wasm_bindgen_test]
fn dom_presenter_smooth_jump_sets_transition() {
    let el = element();
    let presenter = DomPresenter::new(el.clone()).expect("presenter");
    presenter
        .present(&Transform::new(1.0, 0.0, 0.0), TransitionMode::Smooth)
        .expect("present");
    let transition = el.style().get_property_value("transition").unwrap();
    assert!(transition.contains("200ms"), "{transition} vs {SMOOTH_TRANSITION}");
}

#[wasm_bindgen_test]
fn resize_watch_attaches_to_container_and_disconnects_on_drop() {
    let el = element();
    let watch = ResizeWatch::observe(&el, || {}).expect("observer");
    el.style().set_property("width", "320px").expect("width");
    drop(watch);
    el.remove();
}
