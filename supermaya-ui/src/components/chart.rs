//! Chart Component
//!
//! Renders a Vega-Lite specification with vega-embed (loaded from `index.html`),
//! after merging in the dark theme.

use leptos::*;
use serde_json::Value;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
    /// `vegaEmbed(element, spec, options)`, returns a promise
    #[wasm_bindgen(js_name = vegaEmbed, catch)]
    fn vega_embed(
        element: &web_sys::HtmlElement,
        spec: &JsValue,
        options: &JsValue,
    ) -> Result<js_sys::Promise, JsValue>;
}

/// Chart view for one answer. Rendered once per mount; nothing is cached.
#[component]
pub fn VegaChart(spec: Value) -> impl IntoView {
    let container_ref = create_node_ref::<html::Div>();

    create_effect(move |_| {
        if let Some(container) = container_ref.get() {
            embed(&container, &spec);
        }
    });

    view! {
        <div node_ref=container_ref class="vega-chart w-full my-3" />
    }
}

fn embed(container: &web_sys::HtmlElement, spec: &Value) {
    let themed = supermaya::themed_spec(spec);

    let (spec, options) = match (
        js_sys::JSON::parse(&themed.to_string()),
        js_sys::JSON::parse(r#"{"actions": false}"#),
    ) {
        (Ok(spec), Ok(options)) => (spec, options),
        (Err(e), _) | (_, Err(e)) => {
            web_sys::console::error_1(&e);
            return;
        }
    };

    match vega_embed(container, &spec, &options) {
        Ok(promise) => spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                web_sys::console::error_2(&"Failed to render chart:".into(), &e);
            }
        }),
        Err(e) => web_sys::console::error_2(&"vegaEmbed is unavailable:".into(), &e),
    }
}
