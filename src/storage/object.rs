//! Object upload and deletion.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::StorageUrls;
use crate::content::BackendError;
use crate::utils::slug::slugify;

/// Object storage surface of the hosted backend.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` at `{bucket}/{path}` and return its public URL.
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError>;

    /// Remove the named objects from `bucket`.
    async fn delete(&self, bucket: &str, names: &[String]) -> Result<(), BackendError>;
}

/// Derive a collision-resistant object name from an uploaded file name.
///
/// `"Cover Photo.JPG"` -> `"1718000000000-cover-photo.jpg"`.
pub fn unique_object_name(file_name: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();

    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
            (stem, Some(ext.to_ascii_lowercase()))
        }
        _ => (file_name, None),
    };

    let stem = match slugify(stem) {
        s if s.is_empty() => "file".to_string(),
        s => s,
    };

    match ext {
        Some(ext) => format!("{millis}-{stem}.{ext}"),
        None => format!("{millis}-{stem}"),
    }
}

/// Validate and normalize an object path.
pub(crate) fn object_path(path: &str) -> Result<&str, BackendError> {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() || trimmed.split('/').any(|seg| seg == "..") {
        return Err(BackendError::InvalidRequest(format!(
            "invalid object path '{path}'"
        )));
    }
    Ok(trimmed)
}

/// Process-local object store.
#[derive(Debug)]
pub struct MemoryObjectStore {
    urls: StorageUrls,
    objects: RwLock<FxHashMap<String, StoredObject>>,
}

#[derive(Debug, Clone)]
struct StoredObject {
    bytes: Vec<u8>,
    content_type: String,
}

impl MemoryObjectStore {
    pub fn new(urls: StorageUrls) -> Self {
        Self {
            urls,
            objects: RwLock::new(FxHashMap::default()),
        }
    }

    /// Stored bytes and content type of an object.
    pub fn get(&self, bucket: &str, path: &str) -> Option<(Vec<u8>, String)> {
        let key = format!("{bucket}/{}", path.trim_start_matches('/'));
        self.objects
            .read()
            .get(&key)
            .map(|obj| (obj.bytes.clone(), obj.content_type.clone()))
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError> {
        let path = object_path(path)?;
        self.objects.write().insert(
            format!("{bucket}/{path}"),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(self.urls.public_url(bucket, path))
    }

    async fn delete(&self, bucket: &str, names: &[String]) -> Result<(), BackendError> {
        let mut objects = self.objects.write();
        for name in names {
            objects.remove(&format!("{bucket}/{}", name.trim_start_matches('/')));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryObjectStore {
        MemoryObjectStore::new(StorageUrls::new(
            Some("https://ref.supabase.co"),
            "supabase.co",
        ))
    }

    #[test]
    fn test_unique_object_name() {
        let name = unique_object_name("Cover Photo.JPG");
        assert!(name.ends_with("-cover-photo.jpg"), "{name}");
        let (millis, _) = name.split_once('-').unwrap();
        assert!(millis.parse::<u128>().is_ok());

        assert!(unique_object_name("README").ends_with("-readme"));
        assert!(unique_object_name("!!!.png").ends_with("-file.png"));
    }

    #[test]
    fn test_object_path_rejects_traversal() {
        assert_eq!(object_path("/logos/a.png").unwrap(), "logos/a.png");
        assert!(object_path("").is_err());
        assert!(object_path("a/../b").is_err());
    }

    #[tokio::test]
    async fn test_upload_returns_public_url() {
        let store = store();
        let url = store
            .upload("media", "logos/a.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();
        assert_eq!(
            url,
            "https://ref.supabase.co/storage/v1/object/public/media/logos/a.png"
        );
        let (bytes, content_type) = store.get("media", "logos/a.png").unwrap();
        assert_eq!(bytes, vec![1, 2, 3]);
        assert_eq!(content_type, "image/png");
    }

    #[tokio::test]
    async fn test_delete_removes_objects() {
        let store = store();
        store.upload("media", "a.png", vec![], "image/png").await.unwrap();
        store.upload("media", "b.png", vec![], "image/png").await.unwrap();
        store
            .delete("media", &["a.png".to_string(), "missing.png".to_string()])
            .await
            .unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.get("media", "a.png").is_none());
    }
}
