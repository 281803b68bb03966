//! Storage abstractions for the service layer
//!
//! Documents are plain text blobs addressed by a slash-separated path. The
//! service only needs to read a whole blob and replace a whole blob.

use async_trait::async_trait;

use crate::errors::ServiceError;

pub mod fs_blob_store;
pub mod memory_blob_store;

pub use fs_blob_store::FsBlobStore;
pub use memory_blob_store::MemoryBlobStore;

/// Read/write access to named text blobs.
/// Implementations can be file-backed, in-memory, or remote object storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Contents of the blob at `path`; an absent blob reads as an empty string.
    async fn read(&self, path: &str) -> Result<String, ServiceError>;
    /// Replace the blob at `path` with `content`.
    async fn write(&self, path: &str, content: &str) -> Result<(), ServiceError>;
}

/// Resolve the path of a localized document: `{container}/{locale}/{blob}`,
/// with the locale lower-cased.
pub fn localized_path(container: &str, blob: &str, locale: &str) -> String {
    format!(
        "{}/{}/{}",
        container.trim_matches('/'),
        locale.trim().to_ascii_lowercase(),
        blob.trim_matches('/')
    )
}
