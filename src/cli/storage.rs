//! `masthead storage` command.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use super::args::StorageAction;
use super::common::Workspace;
use crate::log;
use crate::storage::{ObjectStore, StorageUrls, unique_object_name};
use crate::utils::{mime, plural_count};

pub async fn run(action: &StorageAction, ws: &Workspace) -> Result<()> {
    let urls = StorageUrls::from_config(&ws.config);
    let default_bucket = ws.config.storage.bucket.as_str();

    match action {
        StorageAction::Normalize { urls: inputs } => {
            for input in inputs {
                let normalized = urls.normalize(Some(input.as_str())).unwrap_or_default();
                println!("{normalized}");
            }
            Ok(())
        }
        StorageAction::Url { path, bucket } => {
            let url = urls.public_url(bucket.as_deref().unwrap_or(default_bucket), path);
            if url.is_empty() {
                bail!("no backend configured, set [backend].url");
            }
            println!("{url}");
            Ok(())
        }
        StorageAction::Upload { file, bucket, name } => {
            let backend = ws.content()?;
            let bucket = bucket.as_deref().unwrap_or(default_bucket);
            let url = upload(backend.backend(), bucket, file, name.as_deref()).await?;
            println!("{url}");
            Ok(())
        }
        StorageAction::Delete { names, bucket } => {
            let backend = ws.content()?;
            let bucket = bucket.as_deref().unwrap_or(default_bucket);
            ObjectStore::delete(backend.backend(), bucket, names).await?;
            log!("storage"; "deleted {} from {bucket}", plural_count(names.len(), "object"));
            Ok(())
        }
    }
}

/// Upload `file` under `name`, or under a timestamped name derived from
/// the file name.
pub(crate) async fn upload<S: ObjectStore + ?Sized>(
    store: &S,
    bucket: &str,
    file: &Path,
    name: Option<&str>,
) -> Result<String> {
    let bytes = fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let object = match name {
        Some(name) => name.to_string(),
        None => {
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            unique_object_name(&file_name)
        }
    };
    let content_type = mime::from_path(Path::new(&object));

    let size = bytes.len();
    let url = store.upload(bucket, &object, bytes, content_type).await?;
    log!("storage"; "uploaded {bucket}/{object} ({size} bytes, {content_type})");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryObjectStore;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_upload_with_generated_name() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("Cover Photo.PNG");
        fs::write(&file, b"png").unwrap();

        let urls = StorageUrls::new(Some("https://new.supabase.co"), "supabase.co");
        let store = MemoryObjectStore::new(urls);
        let url = upload(&store, "media", &file, None).await.unwrap();

        assert!(url.starts_with("https://new.supabase.co/storage/v1/object/public/media/"));
        assert!(url.ends_with("-cover-photo.png"));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_upload_with_explicit_name() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("issue.pdf");
        fs::write(&file, b"%PDF").unwrap();

        let store = MemoryObjectStore::new(StorageUrls::new(Some("https://x.supabase.co"), "supabase.co"));
        upload(&store, "media", &file, Some("issues/12.pdf")).await.unwrap();

        let (bytes, content_type) = store.get("media", "issues/12.pdf").unwrap();
        assert_eq!(bytes, b"%PDF");
        assert_eq!(content_type, mime::types::PDF);
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let store = MemoryObjectStore::new(StorageUrls::new(None, "supabase.co"));
        assert!(upload(&store, "media", Path::new("/nonexistent/x.png"), None).await.is_err());
    }
}
