#![cfg(target_arch = "wasm32")]

use leptos::SignalGetUntracked;
use scroll_chart_wasm::domain::viewport::VisibleRange;
use scroll_chart_wasm::presentation::WasmChart;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn clear_storage() {
    if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
        let _ = storage.clear();
    }
}

#[wasm_bindgen_test]
async fn commands_resolve_to_snapshots() {
    clear_storage();
    let chart = WasmChart::new(Some("SOL".into()), None, None, Some(0)).unwrap();
    assert_eq!(chart.position_label(), "85 - 120 of 120");

    JsFuture::from(chart.command("pan-left").unwrap()).await.unwrap();
    assert_eq!(chart.session().range(), VisibleRange::new(74, 109));

    assert!(chart.handle_key("q").is_none());
    JsFuture::from(chart.handle_key("Home").unwrap()).await.unwrap();
    assert_eq!(chart.session().range(), VisibleRange::new(84, 119));
    assert_eq!(chart.signals().range.get_untracked(), VisibleRange::new(84, 119));
    chart.close();
}

#[wasm_bindgen_test]
async fn js_loader_feeds_the_left_edge() {
    clear_storage();
    let loader = js_sys::Function::new_with_args(
        "req",
        "return [{ t: req.edge.t - 3600000, y: req.edge.y }];",
    );
    let config = r#"{"viewport":{"initial_width":200}}"#;
    let chart = WasmChart::new(Some("BTC".into()), Some(config.into()), Some(loader), None).unwrap();
    assert_eq!(chart.session().range(), VisibleRange::new(0, 119));

    let result = JsFuture::from(chart.command("pan-left").unwrap()).await.unwrap();
    assert_ne!(result, JsValue::NULL);
    assert_eq!(chart.session().len(), 121);
    assert_eq!(chart.session().range(), VisibleRange::new(1, 120));
    chart.close();
}

#[wasm_bindgen_test]
fn unknown_command_is_rejected() {
    let chart = WasmChart::new(None, None, None, None).unwrap();
    assert!(chart.command("spin").is_err());
}
