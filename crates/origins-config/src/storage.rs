//! Object-storage configuration (S3-compatible).

use serde::{Deserialize, Serialize};

/// Default bucket name.
fn default_bucket_name() -> String {
    String::from("origins")
}

/// Default signed-URL lifetime in seconds.
const fn default_url_ttl_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Access key ID.
    #[serde(default)]
    pub access_key_id: String,

    /// Secret access key.
    #[serde(default)]
    pub secret_access_key: String,

    /// Bucket name.
    #[serde(default = "default_bucket_name")]
    pub bucket_name: String,

    /// Endpoint URL of the S3-compatible provider.
    #[serde(default)]
    pub endpoint: String,

    /// Region; S3-compatible providers commonly accept `auto`.
    #[serde(default)]
    pub region: String,

    /// Lifetime of presigned upload/download URLs, in seconds.
    #[serde(default = "default_url_ttl_secs")]
    pub url_ttl_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            access_key_id: String::new(),
            secret_access_key: String::new(),
            bucket_name: default_bucket_name(),
            endpoint: String::new(),
            region: String::new(),
            url_ttl_secs: default_url_ttl_secs(),
        }
    }
}

impl StorageConfig {
    /// Check if the storage config has the minimum required fields.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.access_key_id.is_empty()
            && !self.secret_access_key.is_empty()
            && !self.bucket_name.is_empty()
            && !self.endpoint.is_empty()
    }

    /// Region to sign with, defaulting to `auto`.
    #[must_use]
    pub fn region_or_auto(&self) -> &str {
        if self.region.is_empty() {
            "auto"
        } else {
            &self.region
        }
    }
}
