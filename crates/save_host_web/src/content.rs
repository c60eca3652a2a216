//! Payload-handling adapters: object URLs, the vendor save API, and data-URL reads.

use save_host::{DataUrlReader, HostFuture, LegacySaveApi, ObjectUrlRegistry, Payload};

use crate::bridge;

#[derive(Debug, Clone, Copy, Default)]
/// Object-URL registry backed by `URL.createObjectURL`.
pub struct WebObjectUrlRegistry;

impl ObjectUrlRegistry for WebObjectUrlRegistry {
    fn create_object_url(&self, payload: &Payload) -> Result<String, String> {
        bridge::create_object_url(payload)
    }

    fn revoke_object_url(&self, url: &str) {
        bridge::revoke_object_url(url);
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Vendor save adapter calling `navigator.msSaveOrOpenBlob`.
pub struct WebLegacySaveApi;

impl LegacySaveApi for WebLegacySaveApi {
    fn save_blob(&self, payload: &Payload, name: &str) -> Result<(), String> {
        bridge::legacy_save_blob(payload, name)
    }
}

#[derive(Debug, Clone, Copy, Default)]
/// Data-URL reader backed by `FileReader.readAsDataURL`.
pub struct WebDataUrlReader;

impl DataUrlReader for WebDataUrlReader {
    fn read_as_data_url<'a>(
        &'a self,
        payload: &'a Payload,
    ) -> HostFuture<'a, Result<String, String>> {
        Box::pin(async move { bridge::read_as_data_url(payload).await })
    }
}
