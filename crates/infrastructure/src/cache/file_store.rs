use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{CatalogueStore, DomainError, TagTypeMap};
use tracing::{debug, info};

use super::filename::cache_file_name;

/// Disk tier of the tag-list cache: one JSON file per device in a single directory.
///
/// The file's modification time is the record's freshness timestamp. Writes
/// go to `<file>.tmp` first and are renamed over the target, so readers never
/// observe a half-written record.
#[derive(Debug, Clone)]
pub struct FileCatalogueStore {
    directory: PathBuf,
}

impl FileCatalogueStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn path_for(&self, device_id: &str) -> PathBuf {
        self.directory.join(cache_file_name(device_id))
    }

    fn storage_error(action: &str, path: &Path, e: std::io::Error) -> DomainError {
        DomainError::Storage(format!("Failed to {} {}: {}", action, path.display(), e))
    }

    async fn mtime_of(path: &Path) -> Result<Option<DateTime<Utc>>, DomainError> {
        match tokio::fs::metadata(path).await {
            Ok(meta) => {
                let modified = meta
                    .modified()
                    .map_err(|e| Self::storage_error("stat", path, e))?;
                Ok(Some(DateTime::<Utc>::from(modified)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::storage_error("stat", path, e)),
        }
    }
}

#[async_trait]
impl CatalogueStore for FileCatalogueStore {
    async fn modified_at(&self, device_id: &str) -> Result<Option<DateTime<Utc>>, DomainError> {
        Self::mtime_of(&self.path_for(device_id)).await
    }

    async fn load(&self, device_id: &str) -> Result<Option<TagTypeMap>, DomainError> {
        let path = self.path_for(device_id);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::storage_error("read", &path, e)),
        };

        let entries: TagTypeMap = serde_json::from_str(&raw).map_err(|e| {
            DomainError::Storage(format!("Malformed cache file {}: {}", path.display(), e))
        })?;

        debug!(device_id = %device_id, tags = entries.len(), "Loaded tag list from disk");
        Ok(Some(entries))
    }

    async fn save(
        &self,
        device_id: &str,
        entries: &TagTypeMap,
    ) -> Result<DateTime<Utc>, DomainError> {
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| Self::storage_error("create", &self.directory, e))?;

        let path = self.path_for(device_id);
        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        let body = serde_json::to_vec_pretty(entries)
            .map_err(|e| DomainError::Storage(format!("Failed to encode tag list: {}", e)))?;

        tokio::fs::write(&tmp_path, &body)
            .await
            .map_err(|e| Self::storage_error("write", &tmp_path, e))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|e| Self::storage_error("replace", &path, e))?;

        let written_at = Self::mtime_of(&path)
            .await?
            .unwrap_or_else(Utc::now);

        debug!(device_id = %device_id, path = %path.display(), "Wrote tag list cache file");
        Ok(written_at)
    }

    async fn reset(&self) -> Result<usize, DomainError> {
        let mut dir = match tokio::fs::read_dir(&self.directory).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tokio::fs::create_dir_all(&self.directory)
                    .await
                    .map_err(|e| Self::storage_error("create", &self.directory, e))?;
                info!(directory = %self.directory.display(), "Created cache directory");
                return Ok(0);
            }
            Err(e) => return Err(Self::storage_error("list", &self.directory, e)),
        };

        let mut removed = 0;
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| Self::storage_error("list", &self.directory, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| Self::storage_error("stat", &path, e))?;
            if file_type.is_file() {
                tokio::fs::remove_file(&path)
                    .await
                    .map_err(|e| Self::storage_error("remove", &path, e))?;
                removed += 1;
            }
        }

        info!(
            directory = %self.directory.display(),
            removed,
            "Cleared tag list cache directory"
        );
        Ok(removed)
    }
}
