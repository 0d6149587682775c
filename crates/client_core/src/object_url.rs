use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

use tracing::debug;
use uuid::Uuid;

const OBJECT_URL_SCHEME: &str = "blob:summarizer/";

/// Issues local references for in-memory payloads.
pub trait ObjectUrlStore: Send + Sync {
    fn create(&self, bytes: Vec<u8>, mime_type: &str) -> String;
    fn revoke(&self, url: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub struct BlobRegistry {
    blobs: Mutex<HashMap<String, Blob>>,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Blob>> {
        self.blobs.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn resolve(&self, url: &str) -> Option<Blob> {
        self.lock().get(url).cloned()
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.lock().contains_key(url)
    }

    pub fn live_count(&self) -> usize {
        self.lock().len()
    }
}

impl ObjectUrlStore for BlobRegistry {
    fn create(&self, bytes: Vec<u8>, mime_type: &str) -> String {
        let url = format!("{OBJECT_URL_SCHEME}{}", Uuid::new_v4());
        debug!(%url, size_bytes = bytes.len(), "created object url");
        self.lock().insert(
            url.clone(),
            Blob {
                mime_type: mime_type.to_string(),
                bytes,
            },
        );
        url
    }

    fn revoke(&self, url: &str) {
        if self.lock().remove(url).is_some() {
            debug!(%url, "revoked object url");
        }
    }
}
