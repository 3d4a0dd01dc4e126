//! Decoded media buffers and the handles that reference them.
//!
//! A [`MediaHandle`] is the local equivalent of a browser object URL: the
//! store keeps the bytes alive until the handle is released. Release is
//! explicit via [`MediaHandle::release`]; dropping a handle releases it too.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

const REFERENCE_PREFIX: &str = "blob:apibench/";

#[derive(Debug)]
struct MediaBlob {
    mime_type: String,
    data: Bytes,
}

/// Shared registry of live media buffers.
#[derive(Clone, Default)]
pub struct MediaStore {
    blobs: Arc<DashMap<Uuid, MediaBlob>>,
}

impl MediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `data` and returns the handle that owns it.
    pub fn wrap_media(&self, data: impl Into<Bytes>, mime_type: impl Into<String>) -> MediaHandle {
        let data = data.into();
        let id = Uuid::new_v4();
        let mime_type = mime_type.into();
        let byte_length = data.len() as u64;
        self.blobs.insert(
            id,
            MediaBlob {
                mime_type: mime_type.clone(),
                data,
            },
        );
        debug!(event = "media.acquired", media_id = %id, mime_type = %mime_type, byte_length);
        MediaHandle {
            id,
            mime_type,
            byte_length,
            store: self.clone(),
            released: false,
        }
    }

    /// Looks up the bytes and MIME type behind a `blob:` reference.
    pub fn resolve(&self, reference: &str) -> Option<(String, Bytes)> {
        let id = reference
            .strip_prefix(REFERENCE_PREFIX)
            .and_then(|raw| Uuid::parse_str(raw).ok())?;
        self.blobs
            .get(&id)
            .map(|blob| (blob.mime_type.clone(), blob.data.clone()))
    }

    /// Number of handles not yet released.
    pub fn live(&self) -> usize {
        self.blobs.len()
    }

    fn remove(&self, id: &Uuid) -> Option<Bytes> {
        let removed = self.blobs.remove(id).map(|(_, blob)| blob.data);
        if removed.is_some() {
            debug!(event = "media.released", media_id = %id);
        }
        removed
    }
}

impl fmt::Debug for MediaStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaStore")
            .field("live", &self.blobs.len())
            .finish()
    }
}

/// Owned reference to a decoded media buffer.
pub struct MediaHandle {
    id: Uuid,
    mime_type: String,
    byte_length: u64,
    store: MediaStore,
    released: bool,
}

impl MediaHandle {
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn byte_length(&self) -> u64 {
        self.byte_length
    }

    /// Dereferenceable reference, e.g. `blob:apibench/6f1c…`.
    pub fn reference(&self) -> String {
        format!("{REFERENCE_PREFIX}{}", self.id)
    }

    /// Current bytes behind this handle.
    pub fn bytes(&self) -> Option<Bytes> {
        self.store.blobs.get(&self.id).map(|blob| blob.data.clone())
    }

    /// Releases the backing buffer and hands its bytes back to the caller.
    pub fn release(mut self) -> Option<Bytes> {
        self.released = true;
        self.store.remove(&self.id)
    }
}

impl Drop for MediaHandle {
    fn drop(&mut self) {
        if !self.released {
            self.store.remove(&self.id);
        }
    }
}

impl fmt::Debug for MediaHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaHandle")
            .field("reference", &self.reference())
            .field("mime_type", &self.mime_type)
            .field("byte_length", &self.byte_length)
            .finish()
    }
}
