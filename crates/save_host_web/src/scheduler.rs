//! Event-loop scheduling adapter.

use std::time::Duration;

use save_host::{HostFuture, HostTask, TaskScheduler};

use crate::bridge;

#[derive(Debug, Clone, Copy, Default)]
/// Scheduler backed by `setTimeout` and `wasm_bindgen_futures::spawn_local`.
pub struct WebTaskScheduler;

impl TaskScheduler for WebTaskScheduler {
    fn defer(&self, task: HostTask) {
        bridge::schedule(Duration::ZERO, task);
    }

    fn schedule(&self, delay: Duration, task: HostTask) {
        bridge::schedule(delay, task);
    }

    fn spawn(&self, future: HostFuture<'static, ()>) {
        bridge::spawn(future);
    }
}
