//! Save request inputs: remote references and in-memory payloads.

use std::{any::Any, fmt, rc::Rc};

/// MIME type browsers treat as opaque binary content.
pub const OCTET_STREAM_MIME: &str = "application/octet-stream";

/// Content handed to a save call.
#[derive(Debug, Clone)]
pub enum SaveTarget {
    /// A URL string to download or open.
    RemoteReference(String),
    /// Binary content held by the caller.
    Payload(Payload),
}

impl SaveTarget {
    /// Builds a remote reference target.
    pub fn remote(url: impl Into<String>) -> Self {
        Self::RemoteReference(url.into())
    }

    /// Returns the name carried by a payload target, if any.
    pub fn payload_name(&self) -> Option<&str> {
        match self {
            Self::RemoteReference(_) => None,
            Self::Payload(payload) => payload.name(),
        }
    }
}

impl From<Payload> for SaveTarget {
    fn from(payload: Payload) -> Self {
        Self::Payload(payload)
    }
}

/// Opaque host-native blob handle (for example a browser `Blob`) embedded in a [`Payload`].
#[derive(Clone)]
pub struct NativeBlob {
    handle: Rc<dyn Any>,
    size: u64,
}

impl NativeBlob {
    /// Wraps a host handle together with its byte size.
    pub fn new<T: 'static>(handle: T, size: u64) -> Self {
        Self {
            handle: Rc::new(handle),
            size,
        }
    }

    /// Byte size reported by the host when the handle was wrapped.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the handle if it has concrete type `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.handle.downcast_ref::<T>()
    }
}

impl fmt::Debug for NativeBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeBlob")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// One contiguous piece of payload content.
#[derive(Debug, Clone)]
pub enum PayloadPart {
    /// Bytes owned by the engine.
    Bytes(Rc<[u8]>),
    /// Content that only the host can read.
    Native(NativeBlob),
}

impl PayloadPart {
    /// Byte length of this part.
    pub fn len(&self) -> u64 {
        match self {
            Self::Bytes(bytes) => bytes.len() as u64,
            Self::Native(blob) => blob.size(),
        }
    }

    /// Returns whether the part holds no content.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Immutable binary content with a declared MIME type.
///
/// A payload is an ordered list of parts, the same way a browser blob is composed from
/// buffers and other blobs. Transforms build new payloads and never touch the parts of an
/// existing one.
#[derive(Debug, Clone)]
pub struct Payload {
    parts: Vec<PayloadPart>,
    mime_type: String,
    name: Option<String>,
}

impl Payload {
    /// Builds a payload from owned bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        let bytes: Vec<u8> = bytes.into();
        Self::from_parts(vec![PayloadPart::Bytes(Rc::from(bytes))], mime_type)
    }

    /// Builds a payload around a host-native blob.
    pub fn from_native(blob: NativeBlob, mime_type: impl Into<String>) -> Self {
        Self::from_parts(vec![PayloadPart::Native(blob)], mime_type)
    }

    /// Builds a payload from an explicit part list.
    pub fn from_parts(parts: Vec<PayloadPart>, mime_type: impl Into<String>) -> Self {
        Self {
            parts,
            mime_type: mime_type.into(),
            name: None,
        }
    }

    /// Returns a copy of this payload carrying `name` (as a `File` would).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns a new payload with `prefix` placed before the existing parts.
    pub fn with_prefix(&self, prefix: &[u8]) -> Self {
        let mut parts = Vec::with_capacity(self.parts.len() + 1);
        parts.push(PayloadPart::Bytes(Rc::from(prefix)));
        parts.extend(self.parts.iter().cloned());
        Self {
            parts,
            mime_type: self.mime_type.clone(),
            name: self.name.clone(),
        }
    }

    /// Ordered payload parts.
    pub fn parts(&self) -> &[PayloadPart] {
        &self.parts
    }

    /// Declared MIME type (may be empty).
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Name attached to the payload, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Total byte length across all parts.
    pub fn byte_len(&self) -> u64 {
        self.parts.iter().map(PayloadPart::len).sum()
    }

    /// Flattens the payload into one buffer, or `None` when any part is host-native.
    pub fn to_bytes(&self) -> Option<Vec<u8>> {
        let mut out = Vec::with_capacity(self.byte_len() as usize);
        for part in &self.parts {
            match part {
                PayloadPart::Bytes(bytes) => out.extend_from_slice(bytes),
                PayloadPart::Native(_) => return None,
            }
        }
        Some(out)
    }
}

/// Resolves the filename used by every strategy.
///
/// Empty strings count as absent: `suggested`, then the payload name, then `fallback`.
pub fn effective_name(suggested: Option<&str>, target: &SaveTarget, fallback: &str) -> String {
    suggested
        .filter(|name| !name.is_empty())
        .or_else(|| target.payload_name().filter(|name| !name.is_empty()))
        .unwrap_or(fallback)
        .to_string()
}
