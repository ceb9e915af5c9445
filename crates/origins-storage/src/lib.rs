//! # origins-storage
//!
//! S3-compatible object storage for Origins artifacts: published weekly
//! report PDFs and task attachments.
//!
//! Report bytes are written and read directly through the store. Attachment
//! traffic never flows through the server; clients get short-lived presigned
//! upload and download URLs instead.

mod error;

pub use error::StorageError;

use std::time::Duration;

use object_store::ObjectStore;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use url::Url;

use origins_config::StorageConfig;

/// Key prefix for published weekly report PDFs.
pub const REPORT_PREFIX: &str = "reports/";

/// Key prefix for task attachment objects.
pub const ATTACHMENT_PREFIX: &str = "attachments/";

/// Handle to the configured S3-compatible bucket.
#[derive(Debug)]
pub struct ArtifactStore {
    s3: AmazonS3,
    url_ttl: Duration,
}

impl ArtifactStore {
    /// Build a store from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotConfigured`] when required credentials are
    /// missing, or [`StorageError::ObjectStore`] if the client cannot be
    /// built.
    pub fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        if !config.is_configured() {
            return Err(StorageError::NotConfigured);
        }

        let s3 = AmazonS3Builder::new()
            .with_bucket_name(&config.bucket_name)
            .with_access_key_id(&config.access_key_id)
            .with_secret_access_key(&config.secret_access_key)
            .with_endpoint(&config.endpoint)
            .with_region(config.region_or_auto())
            .with_virtual_hosted_style_request(false)
            // local S3-compatible endpoints (minio etc.) are plain http
            .with_allow_http(true)
            .build()?;

        Ok(Self {
            s3,
            url_ttl: Duration::from_secs(config.url_ttl_secs),
        })
    }

    /// Write `bytes` to `key`, overwriting any existing object.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the key is invalid or the write fails.
    pub async fn publish(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        let path = Path::parse(key)?;
        let size = bytes.len();
        self.s3.put(&path, bytes.into()).await?;
        tracing::info!(key, size, "artifact published");
        Ok(())
    }

    /// Read the object at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the key is invalid, the object does not
    /// exist, or the read fails.
    pub async fn fetch(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = Path::parse(key)?;
        let bytes = self.s3.get(&path).await?.bytes().await?;
        Ok(bytes.to_vec())
    }

    /// Delete the object at `key`. Missing objects are not an error at the
    /// call sites that clean up after entity deletion, so the store error is
    /// surfaced as-is for the caller to decide.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the key is invalid or the delete fails.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = Path::parse(key)?;
        self.s3.delete(&path).await?;
        tracing::debug!(key, "artifact deleted");
        Ok(())
    }

    /// Presigned URL a client can PUT an object to directly.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the key is invalid or signing fails.
    pub async fn signed_upload_url(&self, key: &str) -> Result<Url, StorageError> {
        let path = Path::parse(key)?;
        Ok(self
            .s3
            .signed_url(http::Method::PUT, &path, self.url_ttl)
            .await?)
    }

    /// Presigned URL a client can GET an object from directly.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the key is invalid or signing fails.
    pub async fn signed_download_url(&self, key: &str) -> Result<Url, StorageError> {
        let path = Path::parse(key)?;
        Ok(self
            .s3
            .signed_url(http::Method::GET, &path, self.url_ttl)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn configured() -> StorageConfig {
        StorageConfig {
            access_key_id: "key".into(),
            secret_access_key: "secret".into(),
            bucket_name: "origins-test".into(),
            endpoint: "http://localhost:9000".into(),
            ..Default::default()
        }
    }

    #[test]
    fn unconfigured_storage_is_rejected() {
        let err = ArtifactStore::new(&StorageConfig::default()).unwrap_err();
        assert!(matches!(err, StorageError::NotConfigured));
    }

    #[test]
    fn configured_storage_builds() {
        let store = ArtifactStore::new(&configured()).unwrap();
        assert_eq!(store.url_ttl, Duration::from_secs(300));
    }

    #[tokio::test]
    async fn invalid_key_is_rejected_before_any_network_call() {
        let store = ArtifactStore::new(&configured()).unwrap();
        let err = store.fetch("reports//double-slash.pdf").await.unwrap_err();
        assert!(matches!(err, StorageError::Path(_)));
    }

    #[tokio::test]
    async fn signed_urls_embed_bucket_and_key() {
        let store = ArtifactStore::new(&configured()).unwrap();
        let url = store
            .signed_upload_url("reports/weekly-2026-08-24-1756.pdf")
            .await
            .unwrap();
        assert!(url.path().contains("origins-test"));
        assert!(url.path().contains("weekly-2026-08-24-1756.pdf"));
        assert!(url.query().is_some_and(|q| q.contains("X-Amz-Signature")));
    }

    // Requires a reachable S3-compatible endpoint; credentials come from
    // ORIGINS_STORAGE__* in the environment.
    #[tokio::test]
    #[ignore] // requires network
    async fn live_roundtrip() {
        dotenvy::dotenv().ok();
        let config = StorageConfig {
            access_key_id: std::env::var("ORIGINS_STORAGE__ACCESS_KEY_ID").unwrap_or_default(),
            secret_access_key: std::env::var("ORIGINS_STORAGE__SECRET_ACCESS_KEY")
                .unwrap_or_default(),
            bucket_name: std::env::var("ORIGINS_STORAGE__BUCKET_NAME")
                .unwrap_or_else(|_| "origins".into()),
            endpoint: std::env::var("ORIGINS_STORAGE__ENDPOINT").unwrap_or_default(),
            ..Default::default()
        };
        if !config.is_configured() {
            println!("skipping: storage credentials not set");
            return;
        }

        let store = ArtifactStore::new(&config).unwrap();
        let key = "reports/live-roundtrip-test.pdf";
        store.publish(key, b"%PDF-1.7 test".to_vec()).await.unwrap();
        let bytes = store.fetch(key).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        store.delete(key).await.unwrap();
    }
}
