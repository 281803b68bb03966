use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, error};

use super::BlobStore;
use crate::errors::ServiceError;

/// File-system blob store rooted at a data directory.
///
/// Blob paths map to files below the root. Missing files read as empty, and
/// writes go through a temporary file plus rename so readers never observe a
/// partially written document.
#[derive(Clone, Debug)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, ServiceError> {
        let rel = Path::new(path.trim_start_matches('/'));
        if rel.as_os_str().is_empty()
            || rel.components().any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(ServiceError::Storage(format!("invalid blob path: {path}")));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn read(&self, path: &str) -> Result<String, ServiceError> {
        let file = self.resolve(path)?;
        match fs::read_to_string(&file).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %file.display(), "blob missing; reading as empty");
                Ok(String::new())
            }
            Err(e) => {
                error!(path = %file.display(), err = %e, "blob read failed");
                Err(ServiceError::storage(e))
            }
        }
    }

    async fn write(&self, path: &str, content: &str) -> Result<(), ServiceError> {
        let file = self.resolve(path)?;
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).await.map_err(ServiceError::storage)?;
        }
        let tmp = file.with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));
        fs::write(&tmp, content).await.map_err(ServiceError::storage)?;
        if let Err(e) = fs::rename(&tmp, &file).await {
            let _ = fs::remove_file(&tmp).await;
            error!(path = %file.display(), err = %e, "blob write failed");
            return Err(ServiceError::storage(e));
        }
        debug!(path = %file.display(), bytes = content.len(), "blob written");
        Ok(())
    }
}
