//! Anchor `download` attribute strategy.

use super::{FileSaver, SaveRequest, SaveStrategy, BLANK_TARGET, NOOPENER};
use crate::{is_cors_enabled, is_same_origin, AnchorSpec, SaveTarget};

pub(crate) struct DownloadAttributeStrategy;

impl SaveStrategy for DownloadAttributeStrategy {
    fn execute(&self, saver: &FileSaver, request: SaveRequest) {
        let SaveRequest {
            target,
            name,
            options,
        } = request;
        let mut anchor = AnchorSpec {
            href: String::new(),
            download: Some(name.clone()),
            rel: Some(NOOPENER.to_string()),
            target: None,
        };

        match target {
            SaveTarget::RemoteReference(url) => {
                let services = saver.services();
                if is_same_origin(&services.document.location_href(), &url) {
                    anchor.href = url;
                    saver.click(&anchor);
                } else if is_cors_enabled(services.origin_probe.as_ref(), &url) {
                    saver.fetch_and_resave(url, name, options);
                } else {
                    // Cross-origin `download` is ignored without CORS; open it instead.
                    anchor.href = url;
                    anchor.target = Some(BLANK_TARGET.to_string());
                    saver.click(&anchor);
                }
            }
            SaveTarget::Payload(payload) => {
                let Some(url) = saver.create_object_url(&payload) else {
                    return;
                };
                anchor.href = url;
                saver.click_object_url_later(anchor);
            }
        }
    }
}
