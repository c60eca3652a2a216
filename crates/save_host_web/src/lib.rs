//! Browser (`wasm32`) implementations of the [`save_host`] service contracts.
//!
//! This crate wires the save engine to real browser primitives (anchors, object URLs,
//! `XMLHttpRequest`/`fetch`, popups, `FileReader`, timers) and exports the JavaScript
//! `saveAs` entry point. On non-wasm targets every primitive reports the browser as
//! unavailable and the probe selects the no-op strategy.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Service bundle construction and the process-wide saver.
pub mod adapters;
mod bridge;
pub mod content;
pub mod document;
#[cfg(target_arch = "wasm32")]
pub mod js_api;
pub mod network;
pub mod scheduler;

pub use adapters::{build_save_services, detect_environment, file_saver, init};
pub use content::{WebDataUrlReader, WebLegacySaveApi, WebObjectUrlRegistry};
pub use document::{WebDocumentHost, WebPopup};
#[cfg(target_arch = "wasm32")]
pub use js_api::{init_save_as, save_as};
pub use network::{WebBinaryFetcher, WebOriginProbe};
pub use scheduler::WebTaskScheduler;
