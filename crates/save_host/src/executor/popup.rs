//! Popup window fallback for hosts without a native download primitive.
//!
//! The popup is opened before any asynchronous work so it stays inside the user-activation
//! window. Handles are consumed by navigation and never outlive the save.

use std::sync::OnceLock;

use regex::{NoExpand, Regex};

use super::{FileSaver, SaveRequest, SaveStrategy};
use crate::{Payload, PopupWindow, SaveError, SaveTarget, OCTET_STREAM_MIME};

pub(crate) struct PopupReaderStrategy;

impl SaveStrategy for PopupReaderStrategy {
    fn execute(&self, saver: &FileSaver, request: SaveRequest) {
        let popup = saver.services().document.open_popup();
        match &popup {
            Some(popup) => popup.show_progress(&saver.config().progress_text),
            None => saver.report(&SaveError::PopupBlocked),
        }

        match request.target {
            SaveTarget::RemoteReference(url) => {
                saver.fetch_then(url, move |saver, payload| {
                    save_payload(saver, payload, popup);
                });
            }
            SaveTarget::Payload(payload) => save_payload(saver, payload, popup),
        }
    }
}

fn data_url_mime_prefix() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^data:[^;]*;").expect("data URL pattern is valid"))
}

/// Replaces the MIME type of a `data:` URL with `forced_mime`.
pub(crate) fn force_download_data_url(data_url: &str, forced_mime: &str) -> String {
    let replacement = format!("data:{forced_mime};");
    data_url_mime_prefix()
        .replace(data_url, NoExpand(&replacement))
        .into_owned()
}

fn save_payload(saver: &FileSaver, payload: Payload, popup: Option<Box<dyn PopupWindow>>) {
    let quirks = saver.environment().quirks;
    let force = payload.mime_type() == OCTET_STREAM_MIME;
    let blob_navigation_rejected =
        quirks.chrome_ios || (force && quirks.safari) || quirks.macos_webview;

    if blob_navigation_rejected && quirks.file_reader {
        let reader_saver = saver.clone();
        saver.services().scheduler.spawn(Box::pin(async move {
            let saver = reader_saver;
            match saver.services().reader.read_as_data_url(&payload).await {
                Ok(data_url) => {
                    let url = if quirks.chrome_ios {
                        data_url
                    } else {
                        force_download_data_url(&data_url, &saver.config().forced_download_mime)
                    };
                    navigate(&saver, popup, &url);
                }
                Err(reason) => {
                    saver.report(&SaveError::host("read payload as data URL", reason));
                }
            }
        }));
    } else {
        let Some(url) = saver.create_object_url(&payload) else {
            return;
        };
        navigate(saver, popup, &url);
        saver.revoke_later(url);
    }
}

/// Navigates the popup, or the current document when no popup exists. The popup handle is
/// consumed here.
fn navigate(saver: &FileSaver, popup: Option<Box<dyn PopupWindow>>, url: &str) {
    let result = match popup {
        Some(popup) => popup.navigate(url),
        None => saver.services().document.navigate(url),
    };
    if let Err(reason) = result {
        saver.report(&SaveError::host("navigate to saved content", reason));
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::force_download_data_url;
    use crate::{
        memory::{HostEvent, MemoryHost},
        BrowserQuirks, DetectedEnvironment, EnvironmentCapability, FileSaver, Payload,
        SaveOptionsArg, SaveTarget, SaverConfig,
    };

    const PAGE: &str = "https://app.example.com/";

    fn saver(host: &MemoryHost, quirks: BrowserQuirks) -> FileSaver {
        FileSaver::new(
            DetectedEnvironment {
                capability: EnvironmentCapability::PopupAndReaderFallback,
                quirks,
            },
            host.services(),
            SaverConfig::default(),
        )
    }

    fn created(url: &str, bytes: &[u8], mime: &str) -> HostEvent {
        HostEvent::ObjectUrlCreated {
            url: url.to_string(),
            bytes: Some(bytes.to_vec()),
            mime_type: mime.to_string(),
        }
    }

    #[test]
    fn data_url_prefix_rewrite_matches_expected_cases() {
        let cases = [
            (
                "data:application/octet-stream;base64,AAA=",
                "data:attachment/file;base64,AAA=",
            ),
            ("data:;base64,AAA=", "data:attachment/file;base64,AAA="),
            ("data:text/plain,hi;there", "data:attachment/file;there"),
            ("blob:x", "blob:x"),
        ];
        for (input, expected) in cases {
            assert_eq!(
                force_download_data_url(input, "attachment/file"),
                expected,
                "input={input:?}"
            );
        }
    }

    #[test]
    fn object_url_path_navigates_popup_then_revokes_once() {
        let host = MemoryHost::new(PAGE);
        saver(&host, BrowserQuirks::default()).save(
            Payload::from_bytes(b"abc".to_vec(), "text/plain").into(),
            Some("a.txt"),
            SaveOptionsArg::Absent,
        );

        assert_eq!(
            host.events(),
            vec![
                HostEvent::PopupOpened,
                HostEvent::PopupProgress("downloading...".to_string()),
                created("blob:memory/1", b"abc", "text/plain"),
                HostEvent::PopupNavigated("blob:memory/1".to_string()),
                HostEvent::PopupReleased,
            ]
        );

        host.advance(Duration::from_secs(40));
        host.advance(Duration::from_secs(40));
        let revocations = host
            .events()
            .into_iter()
            .filter(|event| matches!(event, HostEvent::ObjectUrlRevoked(_)))
            .count();
        assert_eq!(revocations, 1);
        assert_eq!(host.pending_timers(), 0);
    }

    #[test]
    fn blocked_popup_navigates_current_document() {
        let host = MemoryHost::new(PAGE);
        host.block_popups();
        saver(&host, BrowserQuirks::default()).save(
            Payload::from_bytes(b"abc".to_vec(), "text/plain").into(),
            None,
            SaveOptionsArg::Absent,
        );

        assert_eq!(
            host.events(),
            vec![
                HostEvent::PopupBlocked,
                HostEvent::Warned(
                    "popup blocked; navigating the current document instead".to_string()
                ),
                created("blob:memory/1", b"abc", "text/plain"),
                HostEvent::DocumentNavigated("blob:memory/1".to_string()),
            ]
        );
    }

    #[test]
    fn safari_octet_stream_uses_forced_data_url() {
        let host = MemoryHost::new(PAGE);
        let quirks = BrowserQuirks {
            safari: true,
            file_reader: true,
            ..BrowserQuirks::default()
        };
        saver(&host, quirks).save(
            Payload::from_bytes(b"ab".to_vec(), "application/octet-stream").into(),
            None,
            SaveOptionsArg::Absent,
        );
        assert_eq!(host.events().len(), 2, "read must wait for the queue");

        host.run_until_idle();
        assert_eq!(
            host.events()[2..].to_vec(),
            vec![
                HostEvent::DataUrlRead("data:application/octet-stream;,ab".to_string()),
                HostEvent::PopupNavigated("data:attachment/file;,ab".to_string()),
                HostEvent::PopupReleased,
            ]
        );
        assert!(!host
            .events()
            .iter()
            .any(|event| matches!(event, HostEvent::ObjectUrlCreated { .. })));
    }

    #[test]
    fn safari_non_octet_stream_keeps_object_url_path() {
        let host = MemoryHost::new(PAGE);
        let quirks = BrowserQuirks {
            safari: true,
            file_reader: true,
            ..BrowserQuirks::default()
        };
        saver(&host, quirks).save(
            Payload::from_bytes(b"ab".to_vec(), "text/plain").into(),
            None,
            SaveOptionsArg::Absent,
        );

        assert_eq!(
            host.events()[2],
            created("blob:memory/1", b"ab", "text/plain")
        );
    }

    #[test]
    fn chrome_ios_keeps_original_data_url_mime() {
        let host = MemoryHost::new(PAGE);
        host.block_popups();
        let quirks = BrowserQuirks {
            chrome_ios: true,
            file_reader: true,
            ..BrowserQuirks::default()
        };
        saver(&host, quirks).save(
            Payload::from_bytes(b"ab".to_vec(), "text/plain").into(),
            None,
            SaveOptionsArg::Absent,
        );
        host.run_until_idle();

        assert_eq!(
            host.events().last(),
            Some(&HostEvent::DocumentNavigated(
                "data:text/plain;,ab".to_string()
            ))
        );
    }

    #[test]
    fn quirk_without_file_reader_uses_object_url() {
        let host = MemoryHost::new(PAGE);
        let quirks = BrowserQuirks {
            macos_webview: true,
            ..BrowserQuirks::default()
        };
        saver(&host, quirks).save(
            Payload::from_bytes(b"ab".to_vec(), "text/plain").into(),
            None,
            SaveOptionsArg::Absent,
        );

        assert_eq!(
            host.events()[3],
            HostEvent::PopupNavigated("blob:memory/1".to_string())
        );
    }

    #[test]
    fn remote_reference_reuses_the_open_popup() {
        let host = MemoryHost::new(PAGE);
        let url = "https://cdn.example.com/a.bin";
        host.set_response(url, Ok(Payload::from_bytes(vec![5], "application/pdf")));

        saver(&host, BrowserQuirks::default()).save(
            SaveTarget::remote(url),
            None,
            SaveOptionsArg::Absent,
        );
        host.run_until_idle();

        assert_eq!(
            host.events(),
            vec![
                HostEvent::PopupOpened,
                HostEvent::PopupProgress("downloading...".to_string()),
                HostEvent::FetchStarted(url.to_string()),
                created("blob:memory/1", &[5], "application/pdf"),
                HostEvent::PopupNavigated("blob:memory/1".to_string()),
                HostEvent::PopupReleased,
            ]
        );
    }

    #[test]
    fn remote_fetch_failure_releases_popup_and_reports() {
        let host = MemoryHost::new(PAGE);
        let url = "https://cdn.example.com/a.bin";
        host.set_response(url, Err("timeout".to_string()));

        saver(&host, BrowserQuirks::default()).save(
            SaveTarget::remote(url),
            None,
            SaveOptionsArg::Absent,
        );
        host.run_until_idle();

        let events = host.events();
        assert!(events.contains(&HostEvent::Errored(format!(
            "could not download file from `{url}`: timeout"
        ))));
        assert!(events.contains(&HostEvent::PopupReleased));
        assert!(!events
            .iter()
            .any(|event| matches!(event, HostEvent::PopupNavigated(_))));
    }
}
