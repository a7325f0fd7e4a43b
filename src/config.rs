//! Index run configuration.

use crate::error::{IndexError, IndexResult};
use serde::{Deserialize, Serialize};

/// Configuration for one index sync run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// S3 bucket name, also displayed as the site name in page titles.
    pub bucket: String,

    /// AWS region for S3; when unset the ambient AWS configuration decides.
    pub region: Option<String>,

    /// Optional S3 endpoint override (for MinIO and test servers).
    pub endpoint_override: Option<String>,

    /// Root of the subtree to sync; empty string means the bucket root.
    /// Always carries a trailing separator when non-empty.
    pub target_prefix: String,

    /// Object names omitted from rendered listings.
    pub exclude: Vec<String>,

    /// Maximum number of folders synced concurrently.
    pub concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: None,
            endpoint_override: None,
            target_prefix: String::new(),
            exclude: Vec::new(),
            concurrency: 8,
        }
    }
}

impl Config {
    /// Creates a config for the given bucket with default settings.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    /// Checks the config for values the engine cannot run with.
    pub fn validate(&self) -> IndexResult<()> {
        if self.bucket.is_empty() {
            return Err(IndexError::Config("bucket name must not be empty".to_string()));
        }
        if self.concurrency == 0 {
            return Err(IndexError::Config("concurrency must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Normalizes a user-supplied folder path into a listing prefix.
///
/// The bucket root is the empty string; any other path is stripped of
/// leading separators and gains a trailing one so it can prefix child
/// keys directly ("deep-folder/i" becomes "deep-folder/i/").
pub fn normalize_prefix(path: &str) -> String {
    let trimmed = path.trim().trim_start_matches('/');
    if trimmed.is_empty() || trimmed == "." {
        return String::new();
    }
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}
