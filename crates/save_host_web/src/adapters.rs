use std::{cell::OnceCell, rc::Rc};

use save_host::{
    init_environment, DetectedEnvironment, FileSaver, LogDiagnostics, SaveServices, SaverConfig,
};

use crate::{
    bridge, WebBinaryFetcher, WebDataUrlReader, WebDocumentHost, WebLegacySaveApi,
    WebObjectUrlRegistry, WebOriginProbe, WebTaskScheduler,
};

thread_local! {
    static FILE_SAVER: OnceCell<FileSaver> = const { OnceCell::new() };
}

/// Builds the browser service bundle consumed by [`FileSaver`].
pub fn build_save_services() -> SaveServices {
    SaveServices {
        document: Rc::new(WebDocumentHost),
        object_urls: Rc::new(WebObjectUrlRegistry),
        origin_probe: Rc::new(WebOriginProbe),
        fetcher: Rc::new(WebBinaryFetcher),
        legacy: Rc::new(WebLegacySaveApi),
        reader: Rc::new(WebDataUrlReader),
        scheduler: Rc::new(WebTaskScheduler),
        diagnostics: Rc::new(LogDiagnostics),
    }
}

/// Probes the current global environment once and returns the memoised result.
pub fn detect_environment() -> DetectedEnvironment {
    init_environment(bridge::environment_facts)
}

fn install_console_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            log::debug!("console logger already installed");
        }
    }
}

/// Initialises the process-wide [`FileSaver`].
///
/// The first call wins: later calls return the existing saver and ignore `config`.
pub fn init(config: SaverConfig) -> FileSaver {
    FILE_SAVER.with(|cell| {
        cell.get_or_init(|| {
            install_console_logging();
            let environment = detect_environment();
            log::info!(
                "save strategy selected: {}",
                environment.capability.as_str()
            );
            FileSaver::new(environment, build_save_services(), config)
        })
        .clone()
    })
}

/// Returns the process-wide [`FileSaver`], initialising it with defaults when needed.
pub fn file_saver() -> FileSaver {
    FILE_SAVER
        .with(|cell| cell.get().cloned())
        .unwrap_or_else(|| init(SaverConfig::default()))
}
