use super::*;

fn unsupported() -> String {
    "Browser save APIs are only available when compiled for wasm32".to_string()
}

/// Popup handles cannot exist off the browser.
pub enum PopupHandle {}

pub fn environment_facts() -> EnvironmentFacts {
    EnvironmentFacts::default()
}

pub fn location_href() -> Result<String, String> {
    Err(unsupported())
}

pub fn click_anchor(_anchor: &AnchorSpec) -> Result<(), String> {
    Err(unsupported())
}

pub fn open_popup() -> Option<PopupHandle> {
    None
}

pub fn popup_show_progress(popup: &PopupHandle, _text: &str) {
    match *popup {}
}

pub fn popup_navigate(popup: PopupHandle, _url: &str) -> Result<(), String> {
    match popup {}
}

pub fn navigate(_url: &str) -> Result<(), String> {
    Err(unsupported())
}

pub fn create_object_url(_payload: &Payload) -> Result<String, String> {
    Err(unsupported())
}

pub fn revoke_object_url(_url: &str) {}

pub fn head_status(_url: &str) -> Result<u16, String> {
    Err(unsupported())
}

pub async fn fetch_binary(_url: &str) -> Result<Payload, String> {
    Err(unsupported())
}

pub fn legacy_save_blob(_payload: &Payload, _name: &str) -> Result<(), String> {
    Err(unsupported())
}

pub async fn read_as_data_url(_payload: &Payload) -> Result<String, String> {
    Err(unsupported())
}

pub fn schedule(delay: Duration, _task: HostTask) {
    log::debug!("dropping task scheduled after {delay:?}: no browser event loop");
}

pub fn spawn(_future: HostFuture<'static, ()>) {
    log::debug!("dropping spawned task: no browser event loop");
}
