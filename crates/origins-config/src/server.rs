//! HTTP server configuration.

use serde::{Deserialize, Serialize};

/// Default bind address.
fn default_bind() -> String {
    String::from("127.0.0.1:8080")
}

/// Default database path.
fn default_db_path() -> String {
    String::from("origins.db")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Path to the libSQL database file.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            db_path: default_db_path(),
        }
    }
}
