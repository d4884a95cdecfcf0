use yew::prelude::*;

use super::viewport::ViewportControls;
use crate::util::format_percent;

#[derive(Properties, PartialEq, Clone)]
pub struct CameraControlsProps {
    /// `None` until the viewport has published its controls.
    pub controls: Option<ViewportControls>,
}

#[function_component(CameraControls)]
pub fn camera_controls(props: &CameraControlsProps) -> Html {
    let Some(controls) = props.controls.clone() else {
        return html! {};
    };
    let zo = {
        let cb = controls.zoom_out.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let zi = {
        let cb = controls.zoom_in.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let rs = {
        let cb = controls.reset_zoom.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let cc = {
        let cb = controls.center_view.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {<div style="position:absolute; left:12px; bottom:12px; background:rgba(22,27,34,0.9); border:1px solid #30363d; border-radius:8px; padding:8px; display:flex; gap:6px; align-items:center;">
        <button onclick={zo} title="Zoom out"> {"-"} </button>
        <span style="min-width:48px; text-align:center; font-variant-numeric:tabular-nums;">{ format_percent(controls.scale_percent) }</span>
        <button onclick={zi} title="Zoom in"> {"+"} </button>
        <span style="width:8px;"></span>
        <button onclick={rs}> {"Reset"} </button>
        <button onclick={cc}> {"Fit"} </button>
    </div>}
}
