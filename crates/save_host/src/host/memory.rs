//! In-memory recording host for tests and headless callers.
//!
//! Every service call is appended to an event log. Deferred tasks, timers, and spawned futures
//! only run when the caller drives the host with [`MemoryHost::run_until_idle`] or
//! [`MemoryHost::advance`], which makes suspension points observable.
//!
//! Deferred tasks are zero-delay timers sharing one `(due, seq)`-ordered queue with
//! scheduled timers, so tasks due at the same instant run in submission order as they do
//! on a browser `setTimeout` queue.

use std::{cell::RefCell, collections::HashMap, rc::Rc, time::Duration};

use futures::{
    executor::{LocalPool, LocalSpawner},
    task::LocalSpawnExt,
};

use super::service::{
    AnchorSpec, BinaryFetcher, DataUrlReader, DiagnosticSink, DocumentHost, HostFuture, HostTask,
    LegacySaveApi, ObjectUrlRegistry, OriginProbe, PopupWindow, SaveServices, TaskScheduler,
};
use crate::{Payload, OCTET_STREAM_MIME};

/// One observable side effect recorded by [`MemoryHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// An anchor was created and clicked.
    AnchorClicked(AnchorSpec),
    /// An object URL was registered.
    ObjectUrlCreated {
        /// Registered URL.
        url: String,
        /// Flattened content, when available.
        bytes: Option<Vec<u8>>,
        /// Payload MIME type.
        mime_type: String,
    },
    /// An object URL was released.
    ObjectUrlRevoked(String),
    /// A blocking HEAD request was issued.
    HeadRequested(String),
    /// A binary fetch was issued.
    FetchStarted(String),
    /// The vendor save API was invoked.
    LegacySaved {
        /// Filename passed to the API.
        name: String,
        /// Flattened content, when available.
        bytes: Option<Vec<u8>>,
        /// Payload MIME type.
        mime_type: String,
    },
    /// A payload was read into a data URL.
    DataUrlRead(String),
    /// A popup window was opened.
    PopupOpened,
    /// A popup request was refused.
    PopupBlocked,
    /// Interim popup content was set.
    PopupProgress(String),
    /// The popup was navigated.
    PopupNavigated(String),
    /// The popup handle was dropped.
    PopupReleased,
    /// The active document was navigated.
    DocumentNavigated(String),
    /// A warning reached the diagnostic channel.
    Warned(String),
    /// An error reached the diagnostic channel.
    Errored(String),
}

struct Timer {
    due: Duration,
    seq: u64,
    task: HostTask,
}

struct MemoryHostState {
    events: Vec<HostEvent>,
    location_href: String,
    head_statuses: HashMap<String, Result<u16, String>>,
    responses: HashMap<String, Result<Payload, String>>,
    block_popups: bool,
    next_object_url: u64,
    now: Duration,
    timers: Vec<Timer>,
    next_timer_seq: u64,
}

/// Recording host implementing every save service.
#[derive(Clone)]
pub struct MemoryHost {
    state: Rc<RefCell<MemoryHostState>>,
    pool: Rc<RefCell<LocalPool>>,
    spawner: LocalSpawner,
}

impl MemoryHost {
    /// Creates a host whose active document lives at `location_href`.
    pub fn new(location_href: impl Into<String>) -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self {
            state: Rc::new(RefCell::new(MemoryHostState {
                events: Vec::new(),
                location_href: location_href.into(),
                head_statuses: HashMap::new(),
                responses: HashMap::new(),
                block_popups: false,
                next_object_url: 0,
                now: Duration::ZERO,
                timers: Vec::new(),
                next_timer_seq: 0,
            })),
            pool: Rc::new(RefCell::new(pool)),
            spawner,
        }
    }

    /// Builds a service bundle where every service is this host.
    pub fn services(&self) -> SaveServices {
        SaveServices {
            document: Rc::new(self.clone()),
            object_urls: Rc::new(self.clone()),
            origin_probe: Rc::new(self.clone()),
            fetcher: Rc::new(self.clone()),
            legacy: Rc::new(self.clone()),
            reader: Rc::new(self.clone()),
            scheduler: Rc::new(self.clone()),
            diagnostics: Rc::new(self.clone()),
        }
    }

    /// Sets the HEAD probe outcome for `url`. Unknown URLs fail with a network error.
    pub fn set_head_status(&self, url: impl Into<String>, status: Result<u16, String>) {
        self.state
            .borrow_mut()
            .head_statuses
            .insert(url.into(), status);
    }

    /// Sets the fetch outcome for `url`. Unknown URLs fail with a network error.
    pub fn set_response(&self, url: impl Into<String>, response: Result<Payload, String>) {
        self.state.borrow_mut().responses.insert(url.into(), response);
    }

    /// Makes every subsequent popup request fail.
    pub fn block_popups(&self) {
        self.state.borrow_mut().block_popups = true;
    }

    /// Recorded events in order.
    pub fn events(&self) -> Vec<HostEvent> {
        self.state.borrow().events.clone()
    }

    /// Virtual time elapsed through [`Self::advance`].
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Number of timers and deferred tasks not yet run.
    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Runs spawned futures and every task due at the current instant until nothing can
    /// make progress.
    pub fn run_until_idle(&self) {
        self.run_until(self.now());
    }

    /// Advances virtual time by `by`, firing due timers in deadline order.
    pub fn advance(&self, by: Duration) {
        let deadline = self.now() + by;
        self.run_until(deadline);
        self.state.borrow_mut().now = deadline;
    }

    fn run_until(&self, deadline: Duration) {
        loop {
            self.pool.borrow_mut().run_until_stalled();
            match self.pop_due_timer(deadline) {
                Some(task) => task(),
                None => break,
            }
        }
    }

    fn push_timer(&self, delay: Duration, task: HostTask) {
        let mut state = self.state.borrow_mut();
        let due = state.now + delay;
        let seq = state.next_timer_seq;
        state.next_timer_seq += 1;
        state.timers.push(Timer { due, seq, task });
    }

    fn pop_due_timer(&self, deadline: Duration) -> Option<HostTask> {
        let mut state = self.state.borrow_mut();
        let index = state
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= deadline)
            .min_by_key(|(_, timer)| (timer.due, timer.seq))
            .map(|(index, _)| index)?;
        let timer = state.timers.swap_remove(index);
        state.now = timer.due;
        Some(timer.task)
    }

    fn record(&self, event: HostEvent) {
        self.state.borrow_mut().events.push(event);
    }
}

struct MemoryPopup {
    host: MemoryHost,
}

impl PopupWindow for MemoryPopup {
    fn show_progress(&self, text: &str) {
        self.host.record(HostEvent::PopupProgress(text.to_string()));
    }

    fn navigate(self: Box<Self>, url: &str) -> Result<(), String> {
        self.host.record(HostEvent::PopupNavigated(url.to_string()));
        Ok(())
    }
}

impl Drop for MemoryPopup {
    fn drop(&mut self) {
        self.host.record(HostEvent::PopupReleased);
    }
}

impl DocumentHost for MemoryHost {
    fn location_href(&self) -> String {
        self.state.borrow().location_href.clone()
    }

    fn click_anchor(&self, anchor: &AnchorSpec) -> Result<(), String> {
        self.record(HostEvent::AnchorClicked(anchor.clone()));
        Ok(())
    }

    fn open_popup(&self) -> Option<Box<dyn PopupWindow>> {
        if self.state.borrow().block_popups {
            self.record(HostEvent::PopupBlocked);
            return None;
        }
        self.record(HostEvent::PopupOpened);
        Some(Box::new(MemoryPopup { host: self.clone() }))
    }

    fn navigate(&self, url: &str) -> Result<(), String> {
        self.record(HostEvent::DocumentNavigated(url.to_string()));
        Ok(())
    }
}

impl ObjectUrlRegistry for MemoryHost {
    fn create_object_url(&self, payload: &Payload) -> Result<String, String> {
        let url = {
            let mut state = self.state.borrow_mut();
            state.next_object_url += 1;
            format!("blob:memory/{}", state.next_object_url)
        };
        self.record(HostEvent::ObjectUrlCreated {
            url: url.clone(),
            bytes: payload.to_bytes(),
            mime_type: payload.mime_type().to_string(),
        });
        Ok(url)
    }

    fn revoke_object_url(&self, url: &str) {
        self.record(HostEvent::ObjectUrlRevoked(url.to_string()));
    }
}

impl OriginProbe for MemoryHost {
    fn head_status(&self, url: &str) -> Result<u16, String> {
        self.record(HostEvent::HeadRequested(url.to_string()));
        self.state
            .borrow()
            .head_statuses
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(format!("no route to {url}")))
    }
}

impl BinaryFetcher for MemoryHost {
    fn fetch_binary<'a>(&'a self, url: &'a str) -> HostFuture<'a, Result<Payload, String>> {
        self.record(HostEvent::FetchStarted(url.to_string()));
        Box::pin(async move {
            self.state
                .borrow()
                .responses
                .get(url)
                .cloned()
                .unwrap_or_else(|| Err(format!("no route to {url}")))
        })
    }
}

impl LegacySaveApi for MemoryHost {
    fn save_blob(&self, payload: &Payload, name: &str) -> Result<(), String> {
        self.record(HostEvent::LegacySaved {
            name: name.to_string(),
            bytes: payload.to_bytes(),
            mime_type: payload.mime_type().to_string(),
        });
        Ok(())
    }
}

impl DataUrlReader for MemoryHost {
    fn read_as_data_url<'a>(
        &'a self,
        payload: &'a Payload,
    ) -> HostFuture<'a, Result<String, String>> {
        Box::pin(async move {
            let bytes = payload
                .to_bytes()
                .ok_or_else(|| "memory host cannot read native blob parts".to_string())?;
            let mime_type = match payload.mime_type() {
                "" => OCTET_STREAM_MIME,
                mime_type => mime_type,
            };
            let encoded: String = url::form_urlencoded::byte_serialize(&bytes).collect();
            let data_url = format!("data:{mime_type};,{encoded}");
            self.record(HostEvent::DataUrlRead(data_url.clone()));
            Ok(data_url)
        })
    }
}

impl TaskScheduler for MemoryHost {
    fn defer(&self, task: HostTask) {
        self.push_timer(Duration::ZERO, task);
    }

    fn schedule(&self, delay: Duration, task: HostTask) {
        self.push_timer(delay, task);
    }

    fn spawn(&self, future: HostFuture<'static, ()>) {
        if let Err(err) = self.spawner.spawn_local(future) {
            self.record(HostEvent::Errored(format!("spawn failed: {err}")));
        }
    }
}

impl DiagnosticSink for MemoryHost {
    fn warn(&self, message: &str) {
        self.record(HostEvent::Warned(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.record(HostEvent::Errored(message.to_string()));
    }
}
