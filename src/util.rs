// Utility helpers

use std::sync::Once;

static LOGGING: Once = Once::new();

/// Route `tracing` output to the browser console and panics to `console.error`.
/// Safe to call more than once; only the first call installs anything.
pub fn init_logging() {
    LOGGING.call_once(|| {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    });
}

pub fn format_percent(percent: u32) -> String {
    format!("{}%", percent)
}

/// Inline SVG markup as an `image/svg+xml` data URL so it can be drawn on a canvas.
pub fn svg_data_url(markup: &str) -> String {
    let encoded: String = js_sys::encode_uri_component(markup).into();
    format!("data:image/svg+xml;charset=utf-8,{}", encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_label() {
        assert_eq!(format_percent(76), "76%");
        assert_eq!(format_percent(100), "100%");
    }
}
