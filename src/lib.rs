//! Directory index generation for S3 buckets.
//!
//! Treats key prefixes as a folder tree and writes a browsable
//! `index.html` at every node:
//! - Tree building from paginated, delimiter-grouped listings
//! - Deterministic HTML rendering with a content fingerprint
//! - Fingerprint-gated writes (unchanged pages are never rewritten)
//! - Concurrent, best-effort recursion with per-folder failure reporting

pub mod config;
pub mod error;
pub mod folder;
pub mod index;
pub mod store;
pub mod sync_engine;

pub use config::{Config, normalize_prefix};
pub use error::{IndexError, IndexResult};
pub use folder::{Folder, INDEX_FILE_NAME};
pub use index::{HtmlRenderer, INDEX_CONTENT_TYPE, IndexRenderer, RenderedIndex};
pub use store::{ListPage, ObjectRecord, ObjectStore, S3ObjectStore};
pub use sync_engine::{SyncEngine, SyncFailure, SyncReport};
