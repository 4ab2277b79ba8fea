//! ブラウザでのファイル保存
//!
//! Blob → ObjectURL → 一時的な <a download> をクリック

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

/// バイト列をファイルとして保存
pub fn save_bytes(bytes: &[u8], filename: &str, content_type: &str) -> Result<(), JsValue> {
    let array = js_sys::Uint8Array::from(bytes);
    let parts = js_sys::Array::new();
    parts.push(&array);

    let options = BlobPropertyBag::new();
    options.set_type(content_type);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    save_blob(&blob, filename)
}

/// テキスト（CSVなど）を保存
pub fn save_text(text: &str, filename: &str, content_type: &str) -> Result<(), JsValue> {
    save_bytes(text.as_bytes(), filename, content_type)
}

fn save_blob(blob: &Blob, filename: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window is not available"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("document is not available"))?;

    let url = Url::create_object_url_with_blob(blob)?;
    let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();
    Url::revoke_object_url(&url)?;

    tracing::debug!(filename, "file saved");
    Ok(())
}
