//! Client-side save/download dispatch engine.
//!
//! A one-time capability probe selects one of four save strategies, and [`FileSaver::save`]
//! runs that strategy for every request. The engine never touches a real environment
//! directly: every native primitive (anchors, object URLs, network, popups, timers) is a
//! service trait in [`host::service`], implemented for browsers by `save_host_web` and in
//! memory by [`memory::MemoryHost`].
//!
//! Saves are fire-and-forget. Failures are reported on the [`DiagnosticSink`] and never
//! returned to the caller.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod bom;
pub mod capability;
pub mod config;
pub mod error;
mod executor;
pub mod host;
pub mod options;
pub mod origin;
pub mod target;

pub use bom::{is_utf8_text_mime, prepend_bom, UTF8_BOM};
pub use capability::{
    detect, detected_environment, init_environment, is_macos_webview, probe_capability,
    probe_quirks, BrowserQuirks, DetectedEnvironment, EnvironmentCapability, EnvironmentFacts,
};
pub use config::SaverConfig;
pub use error::SaveError;
pub use executor::FileSaver;
pub use host::memory;
pub use host::service::{
    AnchorSpec, BinaryFetcher, DataUrlReader, DiagnosticSink, DocumentHost, HostFuture, HostTask,
    LegacySaveApi, LogDiagnostics, ObjectUrlRegistry, OriginProbe, PopupWindow, SaveServices,
    TaskScheduler,
};
pub use options::{SaveOptions, SaveOptionsArg};
pub use origin::{is_cors_enabled, is_same_origin};
pub use target::{effective_name, NativeBlob, Payload, PayloadPart, SaveTarget, OCTET_STREAM_MIME};
