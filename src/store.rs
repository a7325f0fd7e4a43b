//! Object store access.
//!
//! Defines the listing/put seam the tree builder and sync engine run
//! against, plus the S3 implementation. Listings are delimiter-grouped:
//! one page reports the objects directly under a prefix and the immediate
//! child prefixes, never the whole subtree.

use crate::config::Config;
use crate::error::{IndexError, IndexResult};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// One object as reported by a listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectRecord {
    /// Full object key.
    pub key: String,

    /// Last modification time, UTC.
    pub last_modified: DateTime<Utc>,

    /// Object size in bytes.
    pub size_bytes: u64,

    /// Store-reported content fingerprint (S3 ETag with the surrounding
    /// quotes stripped). Empty when the store reported none.
    pub etag: String,
}

/// One page of a delimiter-grouped listing.
#[derive(Clone, Debug, Default)]
pub struct ListPage {
    /// Objects directly under the requested prefix, in listing order.
    pub records: Vec<ObjectRecord>,

    /// Immediate child folder prefixes (full prefix strings).
    pub common_prefixes: Vec<String>,

    /// Token to resume from when the listing has more pages.
    pub next_token: Option<String>,

    /// Whether more pages follow this one.
    pub is_truncated: bool,
}

/// Store operations the index engine needs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetches one listing page for `prefix`, resuming from
    /// `continuation_token` when one is supplied.
    async fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> IndexResult<ListPage>;

    /// Writes `body` to `key`, replacing any existing object.
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> IndexResult<()>;
}

/// S3-backed [`ObjectStore`].
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Builds a store from the ambient AWS environment (env vars, shared
    /// profile, instance metadata), falling back to `us-east-1` when no
    /// region is configured anywhere.
    pub async fn from_env(config: &Config) -> Self {
        let region = match &config.region {
            Some(region) => {
                RegionProviderChain::first_try(aws_types::region::Region::new(region.clone()))
            }
            None => RegionProviderChain::default_provider(),
        }
        .or_else("us-east-1");

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region);
        if let Some(ref endpoint) = config.endpoint_override {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        let mut config_builder = aws_sdk_s3::config::Builder::from(&shared);
        if config.endpoint_override.is_some() {
            config_builder = config_builder.force_path_style(true);
        }

        Self {
            client: S3Client::from_conf(config_builder.build()),
            bucket: config.bucket.clone(),
        }
    }

    /// Builds a store from explicit static credentials. Used against MinIO
    /// and local test servers; production runs use [`S3ObjectStore::from_env`].
    pub fn with_credentials(
        config: &Config,
        access_key_id: &str,
        secret_access_key: &str,
    ) -> Self {
        let credentials = aws_credential_types::Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "bucket-index-static",
        );

        let mut config_builder = aws_sdk_s3::Config::builder()
            .region(aws_types::region::Region::new(
                config.region.clone().unwrap_or_else(|| "us-east-1".to_string()),
            ))
            .credentials_provider(credentials)
            .behavior_version_latest();

        if let Some(ref endpoint) = config.endpoint_override {
            config_builder = config_builder
                .endpoint_url(endpoint)
                .force_path_style(true);
        }

        Self {
            client: S3Client::from_conf(config_builder.build()),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> IndexResult<ListPage> {
        let mut request = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .delimiter("/");

        if let Some(token) = continuation_token {
            request = request.continuation_token(token);
        }

        let resp = request.send().await.map_err(|e| IndexError::ListingFailed {
            prefix: prefix.to_string(),
            cause: format!("list failed for s3://{}/{prefix}: {e}", self.bucket),
        })?;

        let mut records = Vec::new();
        for object in resp.contents() {
            let Some(key) = object.key() else {
                warn!("dropping listed object without a key under \"{prefix}\"");
                continue;
            };
            records.push(ObjectRecord {
                key: key.to_string(),
                last_modified: object.last_modified().map(to_utc).unwrap_or_default(),
                size_bytes: object.size().unwrap_or(0).max(0) as u64,
                etag: object
                    .e_tag()
                    .map(|etag| etag.trim_matches('"').to_string())
                    .unwrap_or_default(),
            });
        }

        let common_prefixes = resp
            .common_prefixes()
            .iter()
            .filter_map(|p| p.prefix().map(|s| s.to_string()))
            .collect::<Vec<_>>();

        debug!(
            "listed {} objects and {} child prefixes under s3://{}/{prefix}",
            records.len(),
            common_prefixes.len(),
            self.bucket
        );

        Ok(ListPage {
            records,
            common_prefixes,
            next_token: resp.next_continuation_token().map(|t| t.to_string()),
            is_truncated: resp.is_truncated().unwrap_or(false),
        })
    }

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> IndexResult<()> {
        let size = body.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| IndexError::WriteFailed {
                key: key.to_string(),
                cause: format!("upload failed for {key}: {e}"),
            })?;

        debug!("uploaded {size} bytes to s3://{}/{key}", self.bucket);
        Ok(())
    }
}

fn to_utc(timestamp: &aws_sdk_s3::primitives::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp(timestamp.secs(), timestamp.subsec_nanos()).unwrap_or_default()
}
