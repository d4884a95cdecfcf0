use yew_zoom_pan::components::{App, AppProps};
use yew_zoom_pan::util::init_logging;
use yew_zoom_pan::ViewportConfig;

const CONFIG_ATTRIBUTE: &str = "data-viewport-config";

/// Optional JSON config on the mount element, e.g.
/// `<div id="app" data-viewport-config='{"max_scale": 8}'>`.
fn page_config() -> ViewportConfig {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return ViewportConfig::default();
    };
    let raw = document
        .get_element_by_id("app")
        .and_then(|el| el.get_attribute(CONFIG_ATTRIBUTE))
        .or_else(|| document.body().and_then(|b| b.get_attribute(CONFIG_ATTRIBUTE)));
    match raw {
        Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::warn!(%err, "ignoring malformed viewport config");
            ViewportConfig::default()
        }),
        None => ViewportConfig::default(),
    }
}

fn main() {
    init_logging();
    let config = page_config();
    tracing::info!(?config, "starting viewport demo");
    let root = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("app"));
    match root {
        Some(root) => {
            yew::Renderer::<App>::with_root_and_props(root, AppProps { config }).render();
        }
        None => {
            yew::Renderer::<App>::with_props(AppProps { config }).render();
        }
    }
}
