//! Host collaborator contracts driven by the save strategies.

use std::{future::Future, pin::Pin, rc::Rc, time::Duration};

use crate::Payload;

/// Object-safe boxed future returned by asynchronous host services.
pub type HostFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Callback queued on the host's single execution queue.
pub type HostTask = Box<dyn FnOnce() + 'static>;

/// Anchor element attributes for a simulated click.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnchorSpec {
    /// Link target URL.
    pub href: String,
    /// `download` attribute (suggested filename).
    pub download: Option<String>,
    /// `rel` attribute.
    pub rel: Option<String>,
    /// `target` browsing context.
    pub target: Option<String>,
}

/// Handle to a window opened for a save.
pub trait PopupWindow {
    /// Replaces the window title and body text with `text`.
    fn show_progress(&self, text: &str);

    /// Navigates the window to `url`, giving up the handle.
    fn navigate(self: Box<Self>, url: &str) -> Result<(), String>;
}

/// Document-level primitives: anchors, popups, and navigation.
pub trait DocumentHost {
    /// Absolute URL of the active document.
    fn location_href(&self) -> String;

    /// Creates an anchor with `anchor` attributes and dispatches a synthetic click on it.
    fn click_anchor(&self, anchor: &AnchorSpec) -> Result<(), String>;

    /// Opens a blank window, or `None` when the host blocks it.
    fn open_popup(&self) -> Option<Box<dyn PopupWindow>>;

    /// Navigates the active document to `url`.
    fn navigate(&self, url: &str) -> Result<(), String>;
}

/// Object-URL registry.
pub trait ObjectUrlRegistry {
    /// Registers `payload` and returns a URL resolving to it.
    fn create_object_url(&self, payload: &Payload) -> Result<String, String>;

    /// Releases a URL returned by [`Self::create_object_url`].
    fn revoke_object_url(&self, url: &str);
}

/// Blocking HEAD request used before deciding between in-page and out-of-page saves.
///
/// Blocking keeps the caller inside the user-activation window that popup blockers check.
/// A host without blocking I/O may substitute a probe that resolves from a cached or
/// pre-fetched result; doing so changes timing but not outcome.
pub trait OriginProbe {
    /// Returns the response status for a HEAD request to `url`.
    fn head_status(&self, url: &str) -> Result<u16, String>;
}

/// Non-blocking binary fetch.
pub trait BinaryFetcher {
    /// Downloads `url` as a payload.
    fn fetch_binary<'a>(&'a self, url: &'a str) -> HostFuture<'a, Result<Payload, String>>;
}

/// Vendor blob-save API taking `(content, name)`.
pub trait LegacySaveApi {
    /// Hands `payload` to the vendor save dialog under `name`.
    fn save_blob(&self, payload: &Payload, name: &str) -> Result<(), String>;
}

/// Asynchronous payload to data-URL conversion.
pub trait DataUrlReader {
    /// Reads `payload` into a `data:` URL.
    fn read_as_data_url<'a>(
        &'a self,
        payload: &'a Payload,
    ) -> HostFuture<'a, Result<String, String>>;
}

/// Single-threaded task scheduling.
pub trait TaskScheduler {
    /// Runs `task` on a later turn of the execution queue.
    fn defer(&self, task: HostTask);

    /// Runs `task` after `delay`.
    fn schedule(&self, delay: Duration, task: HostTask);

    /// Drives `future` to completion on the local queue.
    fn spawn(&self, future: HostFuture<'static, ()>);
}

/// Diagnostic channel of the embedding environment.
pub trait DiagnosticSink {
    /// Emits a warning.
    fn warn(&self, message: &str);

    /// Emits an error.
    fn error(&self, message: &str);
}

#[derive(Debug, Clone, Copy, Default)]
/// Diagnostic sink forwarding to the `log` facade.
pub struct LogDiagnostics;

impl DiagnosticSink for LogDiagnostics {
    fn warn(&self, message: &str) {
        log::warn!("{message}");
    }

    fn error(&self, message: &str) {
        log::error!("{message}");
    }
}

/// Host service bundle consumed by the save engine.
///
/// All environment-specific service selection happens before this bundle reaches the
/// executor.
#[derive(Clone)]
pub struct SaveServices {
    /// Document primitives.
    pub document: Rc<dyn DocumentHost>,
    /// Object-URL registry.
    pub object_urls: Rc<dyn ObjectUrlRegistry>,
    /// Blocking HEAD probe.
    pub origin_probe: Rc<dyn OriginProbe>,
    /// Non-blocking fetch.
    pub fetcher: Rc<dyn BinaryFetcher>,
    /// Vendor save API.
    pub legacy: Rc<dyn LegacySaveApi>,
    /// Data-URL reader.
    pub reader: Rc<dyn DataUrlReader>,
    /// Task scheduler.
    pub scheduler: Rc<dyn TaskScheduler>,
    /// Diagnostic channel.
    pub diagnostics: Rc<dyn DiagnosticSink>,
}
