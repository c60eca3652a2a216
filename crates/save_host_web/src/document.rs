//! Document and popup host-service adapters for browser contexts.

use save_host::{AnchorSpec, DocumentHost, PopupWindow};

use crate::bridge::{self, PopupHandle};

#[derive(Debug, Clone, Copy, Default)]
/// Browser document adapter backed by `window.document` and `window.open`.
pub struct WebDocumentHost;

impl DocumentHost for WebDocumentHost {
    fn location_href(&self) -> String {
        bridge::location_href().unwrap_or_else(|err| {
            log::debug!("document location unavailable: {err}");
            String::new()
        })
    }

    fn click_anchor(&self, anchor: &AnchorSpec) -> Result<(), String> {
        bridge::click_anchor(anchor)
    }

    fn open_popup(&self) -> Option<Box<dyn PopupWindow>> {
        bridge::open_popup().map(|handle| Box::new(WebPopup(handle)) as Box<dyn PopupWindow>)
    }

    fn navigate(&self, url: &str) -> Result<(), String> {
        bridge::navigate(url)
    }
}

/// Window opened by [`WebDocumentHost::open_popup`].
pub struct WebPopup(PopupHandle);

impl PopupWindow for WebPopup {
    fn show_progress(&self, text: &str) {
        bridge::popup_show_progress(&self.0, text);
    }

    fn navigate(self: Box<Self>, url: &str) -> Result<(), String> {
        bridge::popup_navigate(self.0, url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn document_host_degrades_off_browser() {
        let host = WebDocumentHost;

        assert_eq!(host.location_href(), "");
        assert!(host.open_popup().is_none());
        assert!(host
            .click_anchor(&AnchorSpec {
                href: "/report.pdf".to_string(),
                ..AnchorSpec::default()
            })
            .is_err());
    }
}
