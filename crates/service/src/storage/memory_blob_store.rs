use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::BlobStore;
use crate::errors::ServiceError;

/// In-process blob store for tests and local experiments.
/// Counts reads and writes so callers can assert on storage traffic.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, String>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    fail: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_blob(self, path: &str, content: &str) -> Self {
        self.put(path, content);
        self
    }

    /// Set a blob without counting it as a write.
    pub fn put(&self, path: &str, content: &str) {
        self.blobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.to_string(), content.to_string());
    }

    pub fn get(&self, path: &str) -> Option<String> {
        self.blobs.lock().unwrap_or_else(|e| e.into_inner()).get(path).cloned()
    }

    pub fn read_count(&self) -> usize { self.reads.load(Ordering::SeqCst) }

    pub fn write_count(&self) -> usize { self.writes.load(Ordering::SeqCst) }

    /// Make every subsequent read and write fail with a storage error.
    pub fn set_failing(&self, fail: bool) { self.fail.store(fail, Ordering::SeqCst) }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn read(&self, path: &str) -> Result<String, ServiceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ServiceError::Storage(format!("read failed: {path}")));
        }
        Ok(self.get(path).unwrap_or_default())
    }

    async fn write(&self, path: &str, content: &str) -> Result<(), ServiceError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ServiceError::Storage(format!("write failed: {path}")));
        }
        self.put(path, content);
        Ok(())
    }
}
