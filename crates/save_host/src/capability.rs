//! One-time environment capability probing.
//!
//! Probing is a pure function of [`EnvironmentFacts`]. The process-wide result is written once
//! through [`init_environment`] and read through [`detected_environment`]; executors receive it
//! explicitly so tests can inject any variant.

use std::{cell::OnceCell, sync::OnceLock};

use regex::Regex;

/// Save strategy usable in the current environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvironmentCapability {
    /// No document context; every save is a silent no-op.
    NoopWorker,
    /// Anchor `download` attribute with a simulated click.
    NativeDownloadAttribute,
    /// Vendor `msSaveOrOpenBlob`-style API.
    LegacySaveBlobAPI,
    /// Popup window navigated to an object URL or data URL.
    PopupAndReaderFallback,
}

impl EnvironmentCapability {
    /// Returns a stable string token for diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoopWorker => "noop-worker",
            Self::NativeDownloadAttribute => "native-download-attribute",
            Self::LegacySaveBlobAPI => "legacy-save-blob",
            Self::PopupAndReaderFallback => "popup-and-reader",
        }
    }
}

/// Raw observations about the host, gathered once by the embedding adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentFacts {
    /// A primary document (window) context exists.
    pub document_context: bool,
    /// Anchor elements support the `download` attribute.
    pub anchor_download_attribute: bool,
    /// A legacy vendor blob-save API is exposed.
    pub legacy_save_blob: bool,
    /// Navigator user agent, when a navigator exists.
    pub user_agent: Option<String>,
    /// String form of the `HTMLElement` constructor.
    pub html_element_signature: String,
    /// A `safari` global object exists.
    pub safari_global: bool,
    /// An asynchronous file reader is available.
    pub file_reader: bool,
}

/// Browser quirks consulted by the popup fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BrowserQuirks {
    /// Chrome on iOS.
    pub chrome_ios: bool,
    /// Safari-family engine.
    pub safari: bool,
    /// macOS embedded web view.
    pub macos_webview: bool,
    /// An asynchronous file reader is available.
    pub file_reader: bool,
}

/// Probe outcome: the selected strategy plus quirks used during execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedEnvironment {
    /// Selected save strategy.
    pub capability: EnvironmentCapability,
    /// Browser quirks.
    pub quirks: BrowserQuirks,
}

impl DetectedEnvironment {
    /// Builds an environment with a fixed capability and no quirks.
    pub const fn with_capability(capability: EnvironmentCapability) -> Self {
        Self {
            capability,
            quirks: BrowserQuirks {
                chrome_ios: false,
                safari: false,
                macos_webview: false,
                file_reader: false,
            },
        }
    }
}

/// Returns whether `user_agent` identifies a macOS embedded web view.
///
/// These advertise the anchor `download` attribute but ignore it.
pub fn is_macos_webview(user_agent: Option<&str>) -> bool {
    user_agent.is_some_and(|ua| {
        ua.contains("Macintosh") && ua.contains("AppleWebKit") && !ua.contains("Safari")
    })
}

fn chrome_ios_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"CriOS/\d+").expect("CriOS pattern is valid"))
}

fn constructor_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)constructor").expect("constructor pattern is valid"))
}

/// Selects the save strategy. First match wins.
pub fn probe_capability(facts: &EnvironmentFacts) -> EnvironmentCapability {
    if !facts.document_context {
        EnvironmentCapability::NoopWorker
    } else if facts.anchor_download_attribute && !is_macos_webview(facts.user_agent.as_deref()) {
        EnvironmentCapability::NativeDownloadAttribute
    } else if facts.legacy_save_blob {
        EnvironmentCapability::LegacySaveBlobAPI
    } else {
        EnvironmentCapability::PopupAndReaderFallback
    }
}

/// Derives the quirk set from `facts`.
pub fn probe_quirks(facts: &EnvironmentFacts) -> BrowserQuirks {
    let user_agent = facts.user_agent.as_deref();
    BrowserQuirks {
        chrome_ios: user_agent.is_some_and(|ua| chrome_ios_pattern().is_match(ua)),
        safari: constructor_pattern().is_match(&facts.html_element_signature)
            || facts.safari_global,
        macos_webview: is_macos_webview(user_agent),
        file_reader: facts.file_reader,
    }
}

/// Runs the full probe.
pub fn detect(facts: &EnvironmentFacts) -> DetectedEnvironment {
    let detected = DetectedEnvironment {
        capability: probe_capability(facts),
        quirks: probe_quirks(facts),
    };
    log::debug!(
        "save strategy selected: {} ({:?})",
        detected.capability.as_str(),
        detected.quirks
    );
    detected
}

thread_local! {
    static DETECTED_ENVIRONMENT: OnceCell<DetectedEnvironment> = const { OnceCell::new() };
}

/// Probes the environment on first call and returns the cached result afterwards.
///
/// `gather` only runs on the first call; the capability is never recomputed.
pub fn init_environment(gather: impl FnOnce() -> EnvironmentFacts) -> DetectedEnvironment {
    DETECTED_ENVIRONMENT.with(|cell| *cell.get_or_init(|| detect(&gather())))
}

/// Returns the process-wide probe result, if [`init_environment`] has run.
pub fn detected_environment() -> Option<DetectedEnvironment> {
    DETECTED_ENVIRONMENT.with(|cell| cell.get().copied())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_DESKTOP: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";
    const MACOS_WEBVIEW: &str =
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko)";
    const CHROME_IOS: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) CriOS/120.0.6099.119 Mobile/15E148 Safari/604.1";

    fn document_facts() -> EnvironmentFacts {
        EnvironmentFacts {
            document_context: true,
            html_element_signature: "function HTMLElement() { [native code] }".to_string(),
            file_reader: true,
            ..EnvironmentFacts::default()
        }
    }

    #[test]
    fn missing_document_selects_noop_even_with_other_capabilities() {
        let facts = EnvironmentFacts {
            document_context: false,
            anchor_download_attribute: true,
            legacy_save_blob: true,
            ..document_facts()
        };
        assert_eq!(probe_capability(&facts), EnvironmentCapability::NoopWorker);
    }

    #[test]
    fn download_attribute_outranks_legacy_api() {
        let facts = EnvironmentFacts {
            anchor_download_attribute: true,
            legacy_save_blob: true,
            user_agent: Some(CHROME_DESKTOP.to_string()),
            ..document_facts()
        };
        assert_eq!(
            probe_capability(&facts),
            EnvironmentCapability::NativeDownloadAttribute
        );
    }

    #[test]
    fn macos_webview_skips_download_attribute() {
        let facts = EnvironmentFacts {
            anchor_download_attribute: true,
            legacy_save_blob: true,
            user_agent: Some(MACOS_WEBVIEW.to_string()),
            ..document_facts()
        };
        assert_eq!(
            probe_capability(&facts),
            EnvironmentCapability::LegacySaveBlobAPI
        );

        let no_legacy = EnvironmentFacts {
            legacy_save_blob: false,
            ..facts
        };
        assert_eq!(
            probe_capability(&no_legacy),
            EnvironmentCapability::PopupAndReaderFallback
        );
    }

    #[test]
    fn bare_document_falls_back_to_popup() {
        assert_eq!(
            probe_capability(&document_facts()),
            EnvironmentCapability::PopupAndReaderFallback
        );
    }

    #[test]
    fn macos_webview_heuristic_matches_expected_cases() {
        let cases = [
            (Some(MACOS_WEBVIEW), true),
            (Some(CHROME_DESKTOP), false),
            (Some("Mozilla/5.0 (Windows NT 10.0) AppleWebKit/537.36"), false),
            (Some(""), false),
            (None, false),
        ];
        for (ua, expected) in cases {
            assert_eq!(is_macos_webview(ua), expected, "ua={ua:?}");
        }
    }

    #[test]
    fn quirks_detect_chrome_ios_and_safari_signatures() {
        let ios = probe_quirks(&EnvironmentFacts {
            user_agent: Some(CHROME_IOS.to_string()),
            ..document_facts()
        });
        assert!(ios.chrome_ios);
        assert!(!ios.safari);
        assert!(ios.file_reader);

        let old_safari = probe_quirks(&EnvironmentFacts {
            html_element_signature: "[object HTMLElementConstructor]".to_string(),
            ..document_facts()
        });
        assert!(old_safari.safari);

        let safari_global = probe_quirks(&EnvironmentFacts {
            safari_global: true,
            ..document_facts()
        });
        assert!(safari_global.safari);
    }

    #[test]
    fn init_environment_gathers_once() {
        let first = init_environment(|| EnvironmentFacts {
            anchor_download_attribute: true,
            ..document_facts()
        });
        let second = init_environment(|| panic!("facts must not be gathered twice"));

        assert_eq!(first, second);
        assert_eq!(detected_environment(), Some(first));
        assert_eq!(
            first.capability,
            EnvironmentCapability::NativeDownloadAttribute
        );
    }
}
