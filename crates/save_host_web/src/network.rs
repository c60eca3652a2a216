//! Network adapters: the blocking HEAD probe and the binary fetch.

use save_host::{BinaryFetcher, HostFuture, OriginProbe, Payload};

use crate::bridge;

#[derive(Debug, Clone, Copy, Default)]
/// Synchronous `XMLHttpRequest` HEAD probe.
///
/// Blocks the calling turn so a following click stays inside the user-activation window.
pub struct WebOriginProbe;

impl OriginProbe for WebOriginProbe {
    fn head_status(&self, url: &str) -> Result<u16, String> {
        bridge::head_status(url)
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// `fetch`-backed binary download returning the response body as a native blob.
pub struct WebBinaryFetcher;

impl BinaryFetcher for WebBinaryFetcher {
    fn fetch_binary<'a>(&'a self, url: &'a str) -> HostFuture<'a, Result<Payload, String>> {
        Box::pin(async move { bridge::fetch_binary(url).await })
    }
}
