//! Folder tree model built from delimiter-grouped listings.

use crate::error::{IndexError, IndexResult};
use crate::store::{ObjectRecord, ObjectStore};
use tracing::{debug, warn};

/// File name written at every folder node.
pub const INDEX_FILE_NAME: &str = "index.html";

/// One folder node of the bucket tree.
///
/// Built fresh from the live listing on every visit and immutable after
/// construction; nothing is cached across runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Folder {
    /// Full key prefix of this folder: empty string at the bucket root,
    /// trailing separator everywhere else.
    pub prefix: String,

    /// Immediate child folder prefixes (full prefix strings), in listing
    /// order. Every entry strictly extends `prefix`.
    pub subdirectories: Vec<String>,

    /// Objects directly under this folder, in listing order.
    pub files: Vec<ObjectRecord>,
}

impl Folder {
    /// Builds the folder at `prefix` by walking the store's paginated
    /// listing to completion.
    ///
    /// Pages are fetched sequentially (each continuation token depends on
    /// the page before it) and concatenated in arrival order. A failed
    /// page abandons the whole folder; already fetched pages are
    /// discarded, never surfaced as a partial listing.
    pub async fn build<S: ObjectStore>(store: &S, prefix: &str) -> IndexResult<Self> {
        let mut folder = Folder {
            prefix: prefix.to_string(),
            subdirectories: Vec::new(),
            files: Vec::new(),
        };

        let mut token: Option<String> = None;
        let mut pages = 0usize;
        loop {
            let page = store.list_page(prefix, token.as_deref()).await?;
            pages += 1;
            folder.absorb_page(page.records, page.common_prefixes);

            if !page.is_truncated {
                break;
            }
            match page.next_token {
                Some(next) => token = Some(next),
                None => {
                    return Err(IndexError::ListingFailed {
                        prefix: prefix.to_string(),
                        cause: "listing reported more pages but no continuation token"
                            .to_string(),
                    });
                }
            }
        }

        debug!(
            "built folder \"{prefix}\" from {pages} pages: {} files, {} subdirectories",
            folder.files.len(),
            folder.subdirectories.len()
        );
        Ok(folder)
    }

    /// Folds one listing page into the folder, dropping malformed entries
    /// rather than letting them shape the tree.
    fn absorb_page(&mut self, records: Vec<ObjectRecord>, common_prefixes: Vec<String>) {
        for record in records {
            if !record.key.starts_with(&self.prefix) {
                warn!(
                    "dropping record \"{}\" listed outside folder \"{}\"",
                    record.key, self.prefix
                );
                continue;
            }
            if record.key == self.prefix {
                // zero-byte marker for this folder itself, not a file in it
                continue;
            }
            self.files.push(record);
        }

        for child in common_prefixes {
            let extends_parent = child.len() > self.prefix.len()
                && child.starts_with(&self.prefix)
                && child.ends_with('/');
            if !extends_parent {
                warn!(
                    "dropping child prefix \"{child}\" that does not extend folder \"{}\"",
                    self.prefix
                );
                continue;
            }
            self.subdirectories.push(child);
        }
    }

    /// Key of this folder's index file.
    pub fn index_key(&self) -> String {
        format!("{}{INDEX_FILE_NAME}", self.prefix)
    }

    /// Fingerprint the store reported for this folder's existing index
    /// file, when the listing contained one.
    pub fn existing_index_fingerprint(&self) -> Option<&str> {
        let key = self.index_key();
        self.files
            .iter()
            .find(|record| record.key == key)
            .map(|record| record.etag.as_str())
    }
}
