use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufReader;

use super::error::StorageError;
use super::traits::{BoxReader, MediaObject, MediaStore};

/// Filesystem-backed media store.
///
/// Objects live at `{root}/{id}` where the id is a hierarchical path like
/// `companies/<uuid>/logo/<name>.png`; retrieval URLs are `{base_url}/{id}`.
pub struct FilesystemMediaStore {
    root: PathBuf,
    base_url: String,
    max_size: u64,
}

impl FilesystemMediaStore {
    /// Create a new filesystem media store rooted at `root`.
    pub async fn new(
        root: PathBuf,
        base_url: String,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self {
            root,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_size,
        })
    }

    fn object_path(&self, id: &str) -> Result<PathBuf, StorageError> {
        validate_media_path(id)?;
        Ok(self.root.join(id))
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.root.join(".tmp").join(uuid::Uuid::new_v4().to_string())
    }

    fn object_url(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, id)
    }
}

#[async_trait]
impl MediaStore for FilesystemMediaStore {
    async fn upload(
        &self,
        data: &[u8],
        folder: &str,
        filename: &str,
    ) -> Result<MediaObject, StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        validate_media_path(folder)?;
        let name = match sanitized_extension(filename) {
            Some(ext) => format!("{}.{ext}", uuid::Uuid::new_v4().simple()),
            None => uuid::Uuid::new_v4().simple().to_string(),
        };
        let id = format!("{folder}/{name}");
        let object_path = self.object_path(&id)?;

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = object_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &object_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        let url = self.object_url(&id);
        Ok(MediaObject { id, url })
    }

    async fn open(&self, id: &str) -> Result<BoxReader, StorageError> {
        let object_path = self.object_path(id)?;
        match fs::File::open(&object_path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, StorageError> {
        let object_path = self.object_path(id)?;
        match fs::remove_file(&object_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<(), StorageError> {
        validate_media_path(prefix)?;
        let dir = self.root.join(prefix);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_dir() {
                fs::remove_dir_all(&path).await?;
            } else {
                fs::remove_file(&path).await?;
            }
        }

        Ok(())
    }

    async fn delete_folder(&self, path: &str) -> Result<(), StorageError> {
        validate_media_path(path)?;
        match fs::remove_dir(self.root.join(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Validate a hierarchical media path (object id, folder, or prefix).
///
/// Paths are relative, `/`-separated, and may not contain empty, `.` or
/// `..` segments, backslashes, or control characters.
pub fn validate_media_path(path: &str) -> Result<(), StorageError> {
    if path.is_empty() {
        return Err(StorageError::InvalidPath("path must not be empty".into()));
    }
    if path.contains('\\') {
        return Err(StorageError::InvalidPath(
            "backslashes are not allowed".into(),
        ));
    }
    if path.chars().any(|c| c.is_ascii_control()) {
        return Err(StorageError::InvalidPath(
            "control characters are not allowed".into(),
        ));
    }
    for segment in path.split('/') {
        if segment.is_empty() {
            return Err(StorageError::InvalidPath(
                "empty path segments are not allowed".into(),
            ));
        }
        if segment == "." || segment == ".." {
            return Err(StorageError::InvalidPath(
                "relative path segments are not allowed".into(),
            ));
        }
    }
    Ok(())
}

/// Extract a safe lowercase extension from an uploaded filename, if any.
fn sanitized_extension(filename: &str) -> Option<String> {
    let ext = Path::new(filename).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 10 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}
