//! Browser primitive bindings used by the `save_host_web` service adapters.
//!
//! Calls route to a `wasm` implementation over `web-sys`, or to a `non_wasm` implementation
//! that reports the browser as unavailable so the crate builds and tests on host targets.

use std::time::Duration;

use save_host::{AnchorSpec, EnvironmentFacts, HostFuture, HostTask, Payload};

#[cfg(not(target_arch = "wasm32"))]
mod non_wasm;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(not(target_arch = "wasm32"))]
use non_wasm as imp;
#[cfg(target_arch = "wasm32")]
use wasm as imp;

pub use imp::PopupHandle;

pub fn environment_facts() -> EnvironmentFacts {
    imp::environment_facts()
}

pub fn location_href() -> Result<String, String> {
    imp::location_href()
}

pub fn click_anchor(anchor: &AnchorSpec) -> Result<(), String> {
    imp::click_anchor(anchor)
}

pub fn open_popup() -> Option<PopupHandle> {
    imp::open_popup()
}

pub fn popup_show_progress(popup: &PopupHandle, text: &str) {
    imp::popup_show_progress(popup, text)
}

pub fn popup_navigate(popup: PopupHandle, url: &str) -> Result<(), String> {
    imp::popup_navigate(popup, url)
}

pub fn navigate(url: &str) -> Result<(), String> {
    imp::navigate(url)
}

pub fn create_object_url(payload: &Payload) -> Result<String, String> {
    imp::create_object_url(payload)
}

pub fn revoke_object_url(url: &str) {
    imp::revoke_object_url(url)
}

pub fn head_status(url: &str) -> Result<u16, String> {
    imp::head_status(url)
}

pub async fn fetch_binary(url: &str) -> Result<Payload, String> {
    imp::fetch_binary(url).await
}

pub fn legacy_save_blob(payload: &Payload, name: &str) -> Result<(), String> {
    imp::legacy_save_blob(payload, name)
}

pub async fn read_as_data_url(payload: &Payload) -> Result<String, String> {
    imp::read_as_data_url(payload).await
}

pub fn schedule(delay: Duration, task: HostTask) {
    imp::schedule(delay, task)
}

pub fn spawn(future: HostFuture<'static, ()>) {
    imp::spawn(future)
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn document_public_api_non_wasm_parity() {
        let expected = "Browser save APIs are only available when compiled for wasm32".to_string();
        let anchor = AnchorSpec {
            href: "/report.pdf".to_string(),
            ..AnchorSpec::default()
        };

        assert_eq!(environment_facts(), EnvironmentFacts::default());
        assert_eq!(location_href().expect_err("href should fail"), expected);
        assert_eq!(
            click_anchor(&anchor).expect_err("click should fail"),
            expected
        );
        assert!(open_popup().is_none());
        assert_eq!(navigate("/").expect_err("navigate should fail"), expected);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn content_public_api_non_wasm_parity() {
        let expected = "Browser save APIs are only available when compiled for wasm32".to_string();
        let payload = Payload::from_bytes(b"x".to_vec(), "text/plain");

        assert_eq!(
            create_object_url(&payload).expect_err("create should fail"),
            expected
        );
        revoke_object_url("blob:x");
        assert_eq!(
            head_status("https://a/").expect_err("head should fail"),
            expected
        );
        assert_eq!(
            block_on(fetch_binary("https://a/")).expect_err("fetch should fail"),
            expected
        );
        assert_eq!(
            legacy_save_blob(&payload, "a.txt").expect_err("legacy save should fail"),
            expected
        );
        assert_eq!(
            block_on(read_as_data_url(&payload)).expect_err("read should fail"),
            expected
        );
    }
}
