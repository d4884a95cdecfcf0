use yew::prelude::*;

use super::camera_controls::CameraControls;
use super::viewport::{ViewportContent, ViewportControls, ZoomPanViewport};
use crate::model::{PresentationMode, ViewportConfig};

const SAMPLE_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="1000" height="600" viewBox="0 0 1000 600">
<rect width="1000" height="600" fill="#0d1117"/>
<g stroke="#30363d" stroke-width="1">
<path d="M0 100H1000M0 200H1000M0 300H1000M0 400H1000M0 500H1000"/>
<path d="M100 0V600M200 0V600M300 0V600M400 0V600M500 0V600M600 0V600M700 0V600M800 0V600M900 0V600"/>
</g>
<circle cx="250" cy="300" r="120" fill="#1f6feb" opacity="0.8"/>
<rect x="560" y="160" width="280" height="280" rx="24" fill="#238636" opacity="0.8"/>
<text x="500" y="560" fill="#c9d1d9" font-family="sans-serif" font-size="28" text-anchor="middle">drag, scroll or pinch</text>
</svg>"##;

#[derive(Properties, PartialEq, Clone, Default)]
pub struct AppProps {
    #[prop_or_default]
    pub config: ViewportConfig,
}

#[function_component(App)]
pub fn app(props: &AppProps) -> Html {
    let mode = use_state(|| props.config.presentation);
    let controls = use_state(|| None::<ViewportControls>);

    let on_controls = {
        let controls = controls.clone();
        Callback::from(move |c: ViewportControls| controls.set(Some(c)))
    };
    let toggle_mode = {
        let mode = mode.clone();
        let controls = controls.clone();
        Callback::from(move |_| {
            let next = match *mode {
                PresentationMode::Transform => PresentationMode::Canvas,
                PresentationMode::Canvas => PresentationMode::Transform,
            };
            tracing::info!(?next, "presentation switched");
            controls.set(None);
            mode.set(next);
        })
    };
    let mode_label = match *mode {
        PresentationMode::Transform => "Mode: DOM transform",
        PresentationMode::Canvas => "Mode: canvas",
    };
    // keyed so a mode switch mounts a fresh viewport with its own camera
    let key = format!("{:?}", *mode);

    html! {<div style="position:fixed; inset:0; background:#010409; color:#c9d1d9; font-family:sans-serif;">
        <ZoomPanViewport
            key={key}
            config={Some(props.config)}
            presentation={Some(*mode)}
            content={ViewportContent::Markup(AttrValue::Static(SAMPLE_SVG))}
            on_controls={on_controls}
        />
        <CameraControls controls={(*controls).clone()} />
        <div style="position:absolute; right:12px; top:12px;">
            <button onclick={toggle_mode}>{ mode_label }</button>
        </div>
    </div>}
}
