//! Index sync orchestrator.
//!
//! Walks the folder tree depth-first from the configured root and, at
//! every node:
//! - builds the folder from the live listing
//! - renders its index page
//! - writes the page only when the stored fingerprint differs
//! - recurses into each subdirectory exactly once
//!
//! Sibling subtrees run concurrently under a global permit limit. A
//! listing or write failure abandons that node's subtree; a render
//! failure loses only that node's page. Failures never spread to
//! siblings; the run collects every failure and reports them together.

use crate::config::Config;
use crate::error::{IndexError, IndexResult};
use crate::folder::Folder;
use crate::index::{INDEX_CONTENT_TYPE, IndexRenderer};
use crate::store::ObjectStore;
use futures::future::{BoxFuture, join_all};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Outcome of one sync run.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Folders fully synced: listed, rendered, then written or skipped.
    pub folders_synced: usize,

    /// Index pages written.
    pub indexes_written: usize,

    /// Index pages left in place because their fingerprint matched.
    pub indexes_skipped: usize,

    /// Per-folder failures collected across the whole run.
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    /// Total folders the run attempted, successful or failed.
    pub fn folders_attempted(&self) -> usize {
        self.folders_synced + self.failures.len()
    }

    fn merge(&mut self, other: SyncReport) {
        self.folders_synced += other.folders_synced;
        self.indexes_written += other.indexes_written;
        self.indexes_skipped += other.indexes_skipped;
        self.failures.extend(other.failures);
    }
}

/// A folder the run could not sync.
#[derive(Debug)]
pub struct SyncFailure {
    /// Prefix of the failed folder.
    pub prefix: String,

    /// What went wrong at that node.
    pub error: IndexError,
}

/// Recursive index sync engine over an object store and a renderer.
pub struct SyncEngine<S, R> {
    store: S,
    renderer: R,
    config: Config,
    limiter: Semaphore,
}

impl<S: ObjectStore, R: IndexRenderer> SyncEngine<S, R> {
    pub fn new(store: S, renderer: R, config: Config) -> Self {
        let limiter = Semaphore::new(config.concurrency.max(1));
        Self {
            store,
            renderer,
            config,
            limiter,
        }
    }

    /// Syncs every folder reachable from the configured root prefix.
    ///
    /// Best effort: node failures are collected, never retried, and never
    /// abort the rest of the run. Re-running once the cause is fixed
    /// converges, since unchanged folders cost no writes.
    pub async fn run(&self) -> SyncReport {
        let root = self.config.target_prefix.clone();
        info!("starting index sync for s3://{}/{root}", self.config.bucket);

        let report = self.sync_folder(root).await;

        info!(
            "index sync finished: {} folders, {} written, {} skipped, {} failed",
            report.folders_synced,
            report.indexes_written,
            report.indexes_skipped,
            report.failures.len()
        );
        report
    }

    /// Syncs one folder, then all of its subdirectories concurrently.
    fn sync_folder(&self, prefix: String) -> BoxFuture<'_, SyncReport> {
        Box::pin(async move {
            let mut report = SyncReport::default();

            // Permit scope: this node's list/render/put only, released
            // before the recursion below.
            let (outcome, subdirectories) = {
                let _permit = self
                    .limiter
                    .acquire()
                    .await
                    .expect("semaphore is never closed");
                self.sync_node(&prefix).await
            };

            match outcome {
                Ok(wrote) => {
                    report.folders_synced += 1;
                    if wrote {
                        report.indexes_written += 1;
                    } else {
                        report.indexes_skipped += 1;
                    }
                }
                Err(error) => {
                    warn!("failed to sync folder \"{prefix}\": {error}");
                    report.failures.push(SyncFailure { prefix, error });
                }
            }

            let children = subdirectories
                .into_iter()
                .map(|child| self.sync_folder(child));
            for child_report in join_all(children).await {
                report.merge(child_report);
            }

            report
        })
    }

    /// Lists, renders and conditionally writes a single folder's index.
    ///
    /// Returns the node result (`Ok(true)` written, `Ok(false)` skipped)
    /// together with the subdirectories to visit next. A listing or write
    /// failure costs the whole subtree; a render failure costs only this
    /// node's page, since the successful listing already named the
    /// children.
    async fn sync_node(&self, prefix: &str) -> (IndexResult<bool>, Vec<String>) {
        let folder = match Folder::build(&self.store, prefix).await {
            Ok(folder) => folder,
            Err(error) => return (Err(error), Vec::new()),
        };

        let rendered = match self.renderer.render(&folder) {
            Ok(rendered) => rendered,
            Err(error) => return (Err(error), folder.subdirectories),
        };

        let unchanged = folder
            .existing_index_fingerprint()
            .is_some_and(|etag| etag == rendered.fingerprint);
        if unchanged {
            debug!("index unchanged for \"{prefix}\", skipping write");
            return (Ok(false), folder.subdirectories);
        }

        match self
            .store
            .put(&folder.index_key(), rendered.bytes, INDEX_CONTENT_TYPE)
            .await
        {
            Ok(()) => {
                debug!("wrote index for \"{prefix}\"");
                (Ok(true), folder.subdirectories)
            }
            Err(error) => (Err(error), Vec::new()),
        }
    }
}
