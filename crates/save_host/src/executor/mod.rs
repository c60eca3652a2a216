//! Strategy executor: the single `save` entry point and its per-capability strategies.

mod download_attribute;
mod legacy;
mod popup;

use std::rc::Rc;

use crate::{
    effective_name, AnchorSpec, DetectedEnvironment, EnvironmentCapability, Payload, SaveError,
    SaveOptions, SaveOptionsArg, SaveServices, SaveTarget, SaverConfig,
};

use self::{
    download_attribute::DownloadAttributeStrategy, legacy::LegacySaveBlobStrategy,
    popup::PopupReaderStrategy,
};

/// `rel` value applied to every synthesized anchor.
const NOOPENER: &str = "noopener";
/// Browsing-context target for out-of-page navigation.
const BLANK_TARGET: &str = "_blank";

/// Normalized per-call request handed to a strategy.
#[derive(Debug, Clone)]
pub(crate) struct SaveRequest {
    pub target: SaveTarget,
    pub name: String,
    pub options: SaveOptions,
}

/// Strategy implementation selected by an [`EnvironmentCapability`].
pub(crate) trait SaveStrategy {
    fn execute(&self, saver: &FileSaver, request: SaveRequest);
}

struct NoopWorkerStrategy;

impl SaveStrategy for NoopWorkerStrategy {
    fn execute(&self, _saver: &FileSaver, request: SaveRequest) {
        log::debug!(
            "{}; dropping save of `{}`",
            SaveError::EnvironmentUnsupported,
            request.name
        );
    }
}

/// Save engine bound to one detected environment.
///
/// Cloning is cheap; clones share services and configuration.
#[derive(Clone)]
pub struct FileSaver {
    environment: DetectedEnvironment,
    services: SaveServices,
    config: Rc<SaverConfig>,
}

impl FileSaver {
    /// Creates an executor for `environment` backed by `services`.
    pub fn new(
        environment: DetectedEnvironment,
        services: SaveServices,
        config: SaverConfig,
    ) -> Self {
        Self {
            environment,
            services,
            config: Rc::new(config),
        }
    }

    /// Probe result this executor dispatches on.
    pub fn environment(&self) -> DetectedEnvironment {
        self.environment
    }

    /// Selected strategy.
    pub fn capability(&self) -> EnvironmentCapability {
        self.environment.capability
    }

    /// Active configuration.
    pub fn config(&self) -> &SaverConfig {
        &self.config
    }

    /// Saves `target` as `name`.
    ///
    /// Fire-and-forget: outcomes are only observable through host side effects and the
    /// diagnostic channel. A legacy non-record options value is coerced and reported as
    /// deprecated before the save proceeds.
    pub fn save(&self, target: SaveTarget, name: Option<&str>, options: impl Into<SaveOptionsArg>) {
        let (options, deprecation) = options.into().normalize();
        if let Some(deprecation) = deprecation {
            self.report(&deprecation);
        }
        let name = effective_name(name, &target, &self.config.fallback_name);
        self.dispatch(SaveRequest {
            target,
            name,
            options,
        });
    }

    fn dispatch(&self, request: SaveRequest) {
        match self.environment.capability {
            EnvironmentCapability::NoopWorker => NoopWorkerStrategy.execute(self, request),
            EnvironmentCapability::NativeDownloadAttribute => {
                DownloadAttributeStrategy.execute(self, request)
            }
            EnvironmentCapability::LegacySaveBlobAPI => {
                LegacySaveBlobStrategy.execute(self, request)
            }
            EnvironmentCapability::PopupAndReaderFallback => {
                PopupReaderStrategy.execute(self, request)
            }
        }
    }

    pub(crate) fn services(&self) -> &SaveServices {
        &self.services
    }

    pub(crate) fn report(&self, error: &SaveError) {
        error.report(self.services.diagnostics.as_ref());
    }

    /// Fetches `url` in the background and saves the response as a payload under the same
    /// name and options.
    pub(crate) fn fetch_and_resave(&self, url: String, name: String, options: SaveOptions) {
        self.fetch_then(url, move |saver, payload| {
            saver.save(SaveTarget::Payload(payload), Some(name.as_str()), options)
        });
    }

    /// Fetches `url` in the background and hands the payload to `then`.
    ///
    /// Network failures are reported once; there is no retry.
    pub(crate) fn fetch_then(&self, url: String, then: impl FnOnce(&FileSaver, Payload) + 'static) {
        let saver = self.clone();
        self.services.scheduler.spawn(Box::pin(async move {
            let fetched = saver.services.fetcher.fetch_binary(&url).await;
            match fetched {
                Ok(payload) => then(&saver, payload),
                Err(reason) => saver.report(&SaveError::Network { url, reason }),
            }
        }));
    }

    pub(crate) fn click(&self, anchor: &AnchorSpec) {
        if let Err(reason) = self.services.document.click_anchor(anchor) {
            self.report(&SaveError::host("anchor click", reason));
        }
    }

    /// Dispatches the click on a later turn so the host registers the `href` first.
    pub(crate) fn click_later(&self, anchor: AnchorSpec) {
        let saver = self.clone();
        self.services
            .scheduler
            .defer(Box::new(move || saver.click(&anchor)));
    }

    /// Deferred click on an object URL. The revocation timer starts only once the click has
    /// been dispatched, so no lifetime can revoke the URL ahead of it.
    pub(crate) fn click_object_url_later(&self, anchor: AnchorSpec) {
        let saver = self.clone();
        self.services.scheduler.defer(Box::new(move || {
            saver.click(&anchor);
            saver.revoke_later(anchor.href);
        }));
    }

    pub(crate) fn create_object_url(&self, payload: &Payload) -> Option<String> {
        match self.services.object_urls.create_object_url(payload) {
            Ok(url) => Some(url),
            Err(reason) => {
                self.report(&SaveError::host("create object URL", reason));
                None
            }
        }
    }

    /// Schedules exactly one revocation of `url` after the configured lifetime.
    pub(crate) fn revoke_later(&self, url: String) {
        let object_urls = self.services.object_urls.clone();
        self.services.scheduler.schedule(
            self.config.object_url_ttl(),
            Box::new(move || object_urls.revoke_object_url(&url)),
        );
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::memory::{HostEvent, MemoryHost};

    const PAGE: &str = "https://app.example.com/index.html";

    fn saver(capability: EnvironmentCapability, host: &MemoryHost) -> FileSaver {
        FileSaver::new(
            DetectedEnvironment::with_capability(capability),
            host.services(),
            SaverConfig::default(),
        )
    }

    #[test]
    fn noop_worker_has_no_side_effects() {
        let host = MemoryHost::new(PAGE);
        let saver = saver(EnvironmentCapability::NoopWorker, &host);

        saver.save(
            SaveTarget::remote("https://cdn.example.com/a"),
            None,
            SaveOptionsArg::Absent,
        );
        saver.save(
            Payload::from_bytes(b"x".to_vec(), "text/plain").into(),
            Some("a.txt"),
            SaveOptionsArg::Absent,
        );
        host.advance(std::time::Duration::from_secs(60));

        assert_eq!(host.events(), Vec::<HostEvent>::new());
    }

    #[test]
    fn deprecated_boolean_options_warn_and_invert() {
        let host = MemoryHost::new(PAGE);
        let saver = saver(EnvironmentCapability::LegacySaveBlobAPI, &host);
        let payload = Payload::from_bytes(b"hi".to_vec(), "text/plain;charset=utf-8");

        saver.save(payload.into(), None, SaveOptionsArg::Legacy(true));

        assert_eq!(
            host.events(),
            vec![
                HostEvent::Warned("Deprecated: Expected third argument to be a object".to_string()),
                HostEvent::LegacySaved {
                    name: "download".to_string(),
                    bytes: Some(b"hi".to_vec()),
                    mime_type: "text/plain;charset=utf-8".to_string(),
                },
            ]
        );
    }

    #[test]
    fn same_inputs_run_exactly_the_selected_strategy() {
        let cases = [
            (EnvironmentCapability::NoopWorker, None),
            (
                EnvironmentCapability::NativeDownloadAttribute,
                Some("anchor"),
            ),
            (EnvironmentCapability::LegacySaveBlobAPI, Some("legacy")),
            (EnvironmentCapability::PopupAndReaderFallback, Some("popup")),
        ];

        for (capability, expected) in cases {
            let host = MemoryHost::new(PAGE);
            let saver = saver(capability, &host);
            saver.save(
                Payload::from_bytes(b"data".to_vec(), "text/plain").into(),
                Some("a.txt"),
                SaveOptions { auto_bom: true },
            );
            host.advance(std::time::Duration::from_secs(60));

            let events = host.events();
            let clicked = events
                .iter()
                .any(|event| matches!(event, HostEvent::AnchorClicked(_)));
            let legacy = events
                .iter()
                .any(|event| matches!(event, HostEvent::LegacySaved { .. }));
            let popup = events.iter().any(|event| {
                matches!(
                    event,
                    HostEvent::PopupOpened | HostEvent::PopupNavigated(_)
                )
            });
            let observed = match (clicked, legacy, popup) {
                (false, false, false) => None,
                (true, false, false) => Some("anchor"),
                (false, true, false) => Some("legacy"),
                (false, false, true) => Some("popup"),
                other => panic!("more than one strategy ran for {capability:?}: {other:?}"),
            };
            assert_eq!(observed, expected, "capability={capability:?}");
        }
    }
}
