//! Blob storage for listing images.
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const IMAGE_BUCKET: &str = "property-images";

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Invalid object path: {0}")]
    InvalidPath(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Blob I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` at `path` and returns the public URL.
    async fn upload(&self, bytes: &[u8], path: &str) -> Result<String, BlobError>;
    async fn read(&self, path: &str) -> Result<Vec<u8>, BlobError>;
    fn public_url(&self, path: &str) -> String;
}

/// Object path for an uploaded image: `{owner}/{millis}-{random}.{ext}`.
pub fn image_object_path(owner: &str, file_name: &str) -> String {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .unwrap_or("bin")
        .to_ascii_lowercase();
    format!(
        "{IMAGE_BUCKET}/{owner}/{}-{}.{ext}",
        chrono::Utc::now().timestamp_millis(),
        fastrand::u32(..)
    )
}

/// Rejects absolute paths and any `..`, so objects stay under the root.
fn sanitize(path: &str) -> Result<PathBuf, BlobError> {
    let trimmed = path.trim().trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(BlobError::InvalidPath(path.to_string()));
    }
    let mut out = PathBuf::new();
    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => return Err(BlobError::InvalidPath(path.to_string())),
        }
    }
    if out.as_os_str().is_empty() {
        return Err(BlobError::InvalidPath(path.to_string()));
    }
    Ok(out)
}

/// Filesystem store serving objects under `public_base`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    public_base: String,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload(&self, bytes: &[u8], path: &str) -> Result<String, BlobError> {
        let rel = sanitize(path)?;
        let full = self.root.join(&rel);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, bytes).await?;
        info!(path = %rel.display(), size = bytes.len(), "stored blob");
        Ok(self.public_url(&rel.to_string_lossy()))
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, BlobError> {
        let rel = sanitize(path)?;
        match tokio::fs::read(self.root.join(&rel)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.public_base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn upload_and_read_back() {
        let tmp = TempDir::new().unwrap();
        let store = FsBlobStore::new(tmp.path(), "http://localhost:8787/storage/");

        let url = store
            .upload(b"jpeg-bytes", "property-images/admin/1.jpg")
            .await
            .unwrap();
        assert_eq!(
            url,
            "http://localhost:8787/storage/property-images/admin/1.jpg"
        );
        assert_eq!(
            store.read("property-images/admin/1.jpg").await.unwrap(),
            b"jpeg-bytes"
        );
        assert!(tmp.path().join("property-images/admin/1.jpg").exists());
    }

    #[tokio::test]
    async fn escaping_paths_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = FsBlobStore::new(tmp.path(), "http://x");
        for bad in ["../etc/passwd", "a/../../b", "", "/"] {
            assert!(
                matches!(
                    store.upload(b"x", bad).await,
                    Err(BlobError::InvalidPath(_))
                ),
                "{bad}"
            );
        }
        assert!(matches!(
            store.read("missing.png").await,
            Err(BlobError::NotFound(_))
        ));
    }

    #[test]
    fn image_paths_keep_extension() {
        let p = image_object_path("agent-7", "Front View.JPG");
        assert!(p.starts_with("property-images/agent-7/"));
        assert!(p.ends_with(".jpg"));
        assert!(image_object_path("admin", "noext").ends_with(".bin"));
    }
}
