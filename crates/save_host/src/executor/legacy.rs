//! Vendor blob-save API strategy.

use super::{FileSaver, SaveRequest, SaveStrategy, BLANK_TARGET, NOOPENER};
use crate::{is_cors_enabled, prepend_bom, AnchorSpec, SaveError, SaveTarget};

pub(crate) struct LegacySaveBlobStrategy;

impl SaveStrategy for LegacySaveBlobStrategy {
    fn execute(&self, saver: &FileSaver, request: SaveRequest) {
        let SaveRequest {
            target,
            name,
            options,
        } = request;
        let services = saver.services();

        match target {
            SaveTarget::RemoteReference(url) => {
                if is_cors_enabled(services.origin_probe.as_ref(), &url) {
                    saver.fetch_and_resave(url, name, options);
                } else {
                    saver.click_later(AnchorSpec {
                        href: url,
                        download: None,
                        rel: Some(NOOPENER.to_string()),
                        target: Some(BLANK_TARGET.to_string()),
                    });
                }
            }
            SaveTarget::Payload(payload) => {
                let payload = prepend_bom(&payload, options);
                if let Err(reason) = services.legacy.save_blob(&payload, &name) {
                    saver.report(&SaveError::host("legacy blob save", reason));
                }
            }
        }
    }
}
