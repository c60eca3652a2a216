//! JavaScript-facing `saveAs` surface.

use js_sys::{ArrayBuffer, Object, Reflect, Uint8Array};
use save_host::{NativeBlob, Payload, SaveOptions, SaveOptionsArg, SaveTarget, SaverConfig};
use wasm_bindgen::{prelude::*, JsCast};

use crate::adapters;

const GLOBAL_NAME: &str = "saveAs";

fn property(target: &JsValue, key: &str) -> JsValue {
    Reflect::get(target, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

fn coerce_string(value: &JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| value.unchecked_ref::<Object>().to_string().into())
}

fn view_bytes(view: &JsValue) -> Vec<u8> {
    let buffer = property(view, "buffer").unchecked_into::<ArrayBuffer>();
    let offset = property(view, "byteOffset").as_f64().unwrap_or(0.0) as u32;
    let length = property(view, "byteLength").as_f64().unwrap_or(0.0) as u32;
    Uint8Array::new_with_byte_offset_and_length(&buffer, offset, length).to_vec()
}

/// Maps a JS content argument to a save target.
fn content_to_target(content: &JsValue) -> Result<SaveTarget, JsValue> {
    if let Some(url) = content.as_string() {
        return Ok(SaveTarget::remote(url));
    }
    if let Some(blob) = content.dyn_ref::<web_sys::Blob>() {
        let mut payload = Payload::from_native(
            NativeBlob::new(blob.clone(), blob.size() as u64),
            blob.type_(),
        );
        if let Some(file) = content.dyn_ref::<web_sys::File>() {
            payload = payload.with_name(file.name());
        }
        return Ok(payload.into());
    }
    if let Some(buffer) = content.dyn_ref::<ArrayBuffer>() {
        return Ok(Payload::from_bytes(Uint8Array::new(buffer).to_vec(), "").into());
    }
    if ArrayBuffer::is_view(content) {
        return Ok(Payload::from_bytes(view_bytes(content), "").into());
    }
    Err(js_sys::TypeError::new("saveAs expects a URL string, Blob, or binary buffer").into())
}

/// Falsy names defer to the payload name and the configured fallback.
fn name_argument(name: &JsValue) -> Option<String> {
    name.is_truthy().then(|| coerce_string(name))
}

fn options_argument(options: &JsValue) -> SaveOptionsArg {
    if options.is_undefined() || options.is_null() {
        SaveOptionsArg::Absent
    } else if options.is_object() {
        SaveOptionsArg::Record(SaveOptions {
            auto_bom: property(options, "autoBom").is_truthy(),
        })
    } else {
        SaveOptionsArg::Legacy(options.is_truthy())
    }
}

/// Saves `content` under `name`.
///
/// `content` is a URL string, a `Blob`/`File`, an `ArrayBuffer`, or a typed array. Runs
/// [`init_save_as`] with defaults on first use.
#[wasm_bindgen(js_name = saveAs)]
pub fn save_as(content: JsValue, name: JsValue, options: JsValue) -> Result<(), JsValue> {
    let target = content_to_target(&content)?;
    let name = name_argument(&name);
    adapters::file_saver().save(target, name.as_deref(), options_argument(&options));
    Ok(())
}

/// Probes the environment, installs console logging, and attaches the global `saveAs`.
///
/// `config` is an optional `{ objectUrlTtlMs, fallbackName, progressText,
/// forcedDownloadMime }` record. Only the first call's configuration takes effect.
#[wasm_bindgen(js_name = initSaveAs)]
pub fn init_save_as(config: JsValue) -> Result<(), JsValue> {
    let config = if config.is_undefined() || config.is_null() {
        SaverConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)?
    };
    adapters::init(config);
    attach_global();
    Ok(())
}

fn attach_global() {
    let global = js_sys::global();
    let existing = property(&global, GLOBAL_NAME);
    if !existing.is_undefined() && !existing.is_null() {
        log::debug!("global `{GLOBAL_NAME}` already defined; leaving it in place");
        return;
    }

    let entry = Closure::<dyn Fn(JsValue, JsValue, JsValue)>::new(
        |content: JsValue, name: JsValue, options: JsValue| {
            if let Err(err) = save_as(content, name, options) {
                wasm_bindgen::throw_val(err);
            }
        },
    )
    .into_js_value();
    let key = JsValue::from_str(GLOBAL_NAME);
    if Reflect::set(&entry, &key, &entry).is_err() || Reflect::set(&global, &key, &entry).is_err()
    {
        log::error!("failed to attach global `{GLOBAL_NAME}`");
    }
}
