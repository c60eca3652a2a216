use std::{cell::RefCell, rc::Rc};

use futures::channel::oneshot;
use js_sys::{Array, Function, Object, Reflect, Uint8Array};
use save_host::{NativeBlob, PayloadPart};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use super::*;

const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
const LEGACY_SAVE_BLOB: &str = "msSaveOrOpenBlob";

/// Browser window opened for a save.
pub struct PopupHandle(web_sys::Window);

fn window() -> Result<web_sys::Window, String> {
    web_sys::window().ok_or_else(|| "window unavailable".to_string())
}

fn document() -> Result<web_sys::Document, String> {
    window()?
        .document()
        .ok_or_else(|| "document unavailable".to_string())
}

fn global_property(name: &str) -> JsValue {
    Reflect::get(&js_sys::global(), &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED)
}

fn anchor_supports_download() -> bool {
    let constructor = global_property("HTMLAnchorElement");
    if !constructor.is_function() {
        return false;
    }
    Reflect::get(&constructor, &JsValue::from_str("prototype"))
        .ok()
        .filter(JsValue::is_object)
        .and_then(|prototype| Reflect::has(&prototype, &JsValue::from_str("download")).ok())
        .unwrap_or(false)
}

fn html_element_signature() -> String {
    let constructor = global_property("HTMLElement");
    if constructor.is_undefined() || constructor.is_null() {
        return String::new();
    }
    constructor.unchecked_into::<Object>().to_string().into()
}

pub fn environment_facts() -> EnvironmentFacts {
    let Some(window) = web_sys::window() else {
        return EnvironmentFacts::default();
    };
    let navigator = window.navigator();
    EnvironmentFacts {
        document_context: window.document().is_some(),
        anchor_download_attribute: anchor_supports_download(),
        legacy_save_blob: Reflect::has(&navigator, &JsValue::from_str(LEGACY_SAVE_BLOB))
            .unwrap_or(false),
        user_agent: navigator.user_agent().ok(),
        html_element_signature: html_element_signature(),
        safari_global: global_property("safari").is_truthy(),
        file_reader: global_property("FileReader").is_function(),
    }
}

pub fn location_href() -> Result<String, String> {
    window()?
        .location()
        .href()
        .map_err(|err| format!("failed to read document location: {err:?}"))
}

fn dispatch_click(anchor: &web_sys::HtmlAnchorElement) {
    match web_sys::MouseEvent::new("click") {
        Ok(event) => {
            if anchor.dispatch_event(&event).is_err() {
                anchor.click();
            }
        }
        Err(_) => anchor.click(),
    }
}

pub fn click_anchor(attrs: &AnchorSpec) -> Result<(), String> {
    let anchor = document()?
        .create_element_ns(Some(XHTML_NAMESPACE), "a")
        .map_err(|err| format!("failed to create anchor: {err:?}"))?
        .dyn_into::<web_sys::HtmlAnchorElement>()
        .map_err(|_| "failed to cast anchor".to_string())?;
    anchor.set_href(&attrs.href);
    if let Some(download) = &attrs.download {
        anchor.set_download(download);
    }
    if let Some(rel) = &attrs.rel {
        anchor.set_rel(rel);
    }
    if let Some(target) = &attrs.target {
        anchor.set_target(target);
    }
    dispatch_click(&anchor);
    Ok(())
}

pub fn open_popup() -> Option<PopupHandle> {
    web_sys::window()?
        .open_with_url_and_target("", "_blank")
        .ok()
        .flatten()
        .map(PopupHandle)
}

pub fn popup_show_progress(popup: &PopupHandle, text: &str) {
    let Some(document) = popup.0.document() else {
        return;
    };
    document.set_title(text);
    if let Some(body) = document.body() {
        body.set_inner_text(text);
    }
}

pub fn popup_navigate(popup: PopupHandle, url: &str) -> Result<(), String> {
    popup
        .0
        .location()
        .set_href(url)
        .map_err(|err| format!("failed to navigate popup: {err:?}"))
}

pub fn navigate(url: &str) -> Result<(), String> {
    window()?
        .location()
        .set_href(url)
        .map_err(|err| format!("failed to navigate document: {err:?}"))
}

/// Builds one browser `Blob` from the payload parts.
fn payload_blob(payload: &Payload) -> Result<web_sys::Blob, String> {
    if let [PayloadPart::Native(native)] = payload.parts() {
        if let Some(blob) = native.downcast_ref::<web_sys::Blob>() {
            if blob.type_() == payload.mime_type() {
                return Ok(blob.clone());
            }
        }
    }

    let parts = Array::new();
    for part in payload.parts() {
        match part {
            PayloadPart::Bytes(bytes) => {
                parts.push(&Uint8Array::from(bytes.as_ref()));
            }
            PayloadPart::Native(native) => {
                let blob = native
                    .downcast_ref::<web_sys::Blob>()
                    .ok_or_else(|| "payload part is not a browser Blob".to_string())?;
                parts.push(blob);
            }
        }
    }
    let options = web_sys::BlobPropertyBag::new();
    options.set_type(payload.mime_type());
    web_sys::Blob::new_with_blob_sequence_and_options(&parts, &options)
        .map_err(|err| format!("failed to build blob: {err:?}"))
}

pub fn create_object_url(payload: &Payload) -> Result<String, String> {
    let blob = payload_blob(payload)?;
    web_sys::Url::create_object_url_with_blob(&blob)
        .map_err(|err| format!("failed to create object URL: {err:?}"))
}

pub fn revoke_object_url(url: &str) {
    if let Err(err) = web_sys::Url::revoke_object_url(url) {
        log::debug!("revoke object URL `{url}` failed: {err:?}");
    }
}

pub fn head_status(url: &str) -> Result<u16, String> {
    let request = web_sys::XmlHttpRequest::new()
        .map_err(|err| format!("failed to create request: {err:?}"))?;
    request
        .open_with_async("HEAD", url, false)
        .map_err(|err| format!("failed to open HEAD request: {err:?}"))?;
    request
        .send()
        .map_err(|err| format!("HEAD request failed: {err:?}"))?;
    request
        .status()
        .map_err(|err| format!("failed to read HEAD status: {err:?}"))
}

pub async fn fetch_binary(url: &str) -> Result<Payload, String> {
    let response = JsFuture::from(window()?.fetch_with_str(url))
        .await
        .map_err(|err| format!("fetch failed: {err:?}"))?
        .dyn_into::<web_sys::Response>()
        .map_err(|_| "fetch returned a non-response value".to_string())?;
    let blob = JsFuture::from(
        response
            .blob()
            .map_err(|err| format!("failed to read response body: {err:?}"))?,
    )
    .await
    .map_err(|err| format!("failed to read response body: {err:?}"))?
    .dyn_into::<web_sys::Blob>()
    .map_err(|_| "response body is not a blob".to_string())?;

    let mime_type = blob.type_();
    let size = blob.size() as u64;
    Ok(Payload::from_native(NativeBlob::new(blob, size), mime_type))
}

pub fn legacy_save_blob(payload: &Payload, name: &str) -> Result<(), String> {
    let navigator = window()?.navigator();
    let save = Reflect::get(&navigator, &JsValue::from_str(LEGACY_SAVE_BLOB))
        .map_err(|err| format!("failed to read {LEGACY_SAVE_BLOB}: {err:?}"))?
        .dyn_into::<Function>()
        .map_err(|_| format!("{LEGACY_SAVE_BLOB} is unavailable"))?;
    let blob = payload_blob(payload)?;
    save.call2(&navigator, &blob, &JsValue::from_str(name))
        .map(|_| ())
        .map_err(|err| format!("{LEGACY_SAVE_BLOB} failed: {err:?}"))
}

pub async fn read_as_data_url(payload: &Payload) -> Result<String, String> {
    let blob = payload_blob(payload)?;
    let reader = web_sys::FileReader::new().map_err(|err| format!("{err:?}"))?;
    let (tx, rx) = oneshot::channel::<Result<String, String>>();
    let sender = Rc::new(RefCell::new(Some(tx)));

    let reader_for_load = reader.clone();
    let load_sender = sender.clone();
    let on_load = Closure::<dyn FnMut(web_sys::ProgressEvent)>::wrap(Box::new(
        move |_: web_sys::ProgressEvent| {
            let result = reader_for_load
                .result()
                .map_err(|err| format!("failed to read payload: {err:?}"))
                .and_then(|value| {
                    value
                        .as_string()
                        .ok_or_else(|| "file reader returned non-string result".to_string())
                });
            if let Some(tx) = load_sender.borrow_mut().take() {
                let _ = tx.send(result);
            }
        },
    ));
    reader.set_onload(Some(on_load.as_ref().unchecked_ref()));

    let error_sender = sender;
    let on_error = Closure::<dyn FnMut(web_sys::ProgressEvent)>::wrap(Box::new(
        move |_: web_sys::ProgressEvent| {
            if let Some(tx) = error_sender.borrow_mut().take() {
                let _ = tx.send(Err("failed to read payload".to_string()));
            }
        },
    ));
    reader.set_onerror(Some(on_error.as_ref().unchecked_ref()));

    reader
        .read_as_data_url(&blob)
        .map_err(|err| format!("failed to start payload read: {err:?}"))?;

    let result = rx
        .await
        .map_err(|_| "payload read was interrupted".to_string())?;
    reader.set_onload(None);
    reader.set_onerror(None);
    drop((on_load, on_error));
    result
}

pub fn schedule(delay: Duration, task: HostTask) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let callback = Closure::once_into_js(move || task());
    let timeout_ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
    if let Err(err) = window.set_timeout_with_callback_and_timeout_and_arguments_0(
        callback.unchecked_ref(),
        timeout_ms,
    ) {
        log::error!("failed to schedule task: {err:?}");
    }
}

pub fn spawn(future: HostFuture<'static, ()>) {
    wasm_bindgen_futures::spawn_local(future);
}
