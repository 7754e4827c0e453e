use async_trait::async_trait;
use serde::Serialize;
use tokio::io::AsyncRead;

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// A stored media object: a stable hierarchical identifier plus the URL
/// clients use to retrieve it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct MediaObject {
    /// Hierarchical object id, e.g. `companies/<uuid>/logo/<name>.png`.
    pub id: String,
    /// Retrieval URL for the object.
    pub url: String,
}

/// External media host for images and resumes.
///
/// Object ids are hierarchical paths; `delete_prefix` treats them as
/// folders and removes everything stored underneath.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Upload `data` under `folder`, deriving the object name from
    /// `filename`'s extension. Returns the stored id and retrieval URL.
    async fn upload(
        &self,
        data: &[u8],
        folder: &str,
        filename: &str,
    ) -> Result<MediaObject, StorageError>;

    /// Open a stored object as a streaming async reader.
    async fn open(&self, id: &str) -> Result<BoxReader, StorageError>;

    /// Delete a single object by id.
    ///
    /// Returns `true` if the object was deleted, `false` if it did not exist.
    async fn delete(&self, id: &str) -> Result<bool, StorageError>;

    /// Delete every object stored under `prefix`. Missing prefixes are a no-op.
    async fn delete_prefix(&self, prefix: &str) -> Result<(), StorageError>;

    /// Delete the (now empty) folder at `path`. Missing folders are a no-op.
    async fn delete_folder(&self, path: &str) -> Result<(), StorageError>;
}
