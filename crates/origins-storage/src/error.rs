//! Storage error types.

use thiserror::Error;

/// Errors from the artifact store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Required storage credentials are missing.
    #[error(
        "storage is not configured (set access_key_id/secret_access_key/bucket_name/endpoint)"
    )]
    NotConfigured,

    /// The underlying object store rejected the operation.
    #[error("object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    /// The object key is not a valid store path.
    #[error("invalid object key: {0}")]
    Path(#[from] object_store::path::Error),
}

impl StorageError {
    /// Whether this is a missing-object error, so callers can map it to a
    /// 404 instead of a server failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ObjectStore(object_store::Error::NotFound { .. })
        )
    }
}
