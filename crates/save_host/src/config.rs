//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default object-URL lifetime in milliseconds.
pub const DEFAULT_OBJECT_URL_TTL_MS: u64 = 40_000;
/// Filename used when neither the caller nor the payload supplies one.
pub const DEFAULT_FALLBACK_NAME: &str = "download";
/// Interim popup content shown while a save is in flight.
pub const DEFAULT_PROGRESS_TEXT: &str = "downloading...";
/// MIME marker that forces download when a data URL is navigated to.
pub const DEFAULT_FORCED_DOWNLOAD_MIME: &str = "attachment/file";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
/// Tunables shared by every save strategy.
pub struct SaverConfig {
    /// Delay before an object URL created for a save is revoked.
    pub object_url_ttl_ms: u64,
    /// Filename fallback.
    pub fallback_name: String,
    /// Text shown in a popup before its content arrives.
    pub progress_text: String,
    /// MIME type substituted into data URLs to force a download.
    pub forced_download_mime: String,
}

impl Default for SaverConfig {
    fn default() -> Self {
        Self {
            object_url_ttl_ms: DEFAULT_OBJECT_URL_TTL_MS,
            fallback_name: DEFAULT_FALLBACK_NAME.to_string(),
            progress_text: DEFAULT_PROGRESS_TEXT.to_string(),
            forced_download_mime: DEFAULT_FORCED_DOWNLOAD_MIME.to_string(),
        }
    }
}

impl SaverConfig {
    /// Object-URL lifetime as a [`Duration`].
    pub fn object_url_ttl(&self) -> Duration {
        Duration::from_millis(self.object_url_ttl_ms)
    }
}
