//! Index page rendering.
//!
//! Turns a [`Folder`] into the `index.html` artifact written at that
//! node: an nginx-style listing with a parent link, aligned columns and
//! human-readable dates and sizes.

use crate::error::IndexResult;
use crate::folder::{Folder, INDEX_FILE_NAME};
use bytesize::ByteSize;
use md5::{Digest, Md5};

/// Content type set on uploaded index pages so browsers render them inline.
pub const INDEX_CONTENT_TYPE: &str = "text/html";

/// A rendered index artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedIndex {
    /// Page body, ready to upload.
    pub bytes: Vec<u8>,

    /// Lowercase hex MD5 of `bytes`. Coincides with the ETag S3 assigns
    /// to a single-part upload, which is what lets an unchanged page skip
    /// its write. Multipart ETags carry a part-count suffix and never
    /// match, so such indexes are rewritten every run.
    pub fingerprint: String,
}

/// Renders a folder into its index artifact.
///
/// Implementations must be deterministic: an identical folder renders to
/// identical bytes and fingerprint, or the unchanged-page comparison in
/// the sync engine is meaningless.
pub trait IndexRenderer: Send + Sync {
    fn render(&self, folder: &Folder) -> IndexResult<RenderedIndex>;
}

/// Static HTML renderer.
pub struct HtmlRenderer {
    site_name: String,
    exclude: Vec<String>,
}

struct IndexEntry {
    name: String,
    href: String,
    date: String,
    size: String,
}

impl HtmlRenderer {
    /// Creates a renderer. `site_name` heads every page title; `exclude`
    /// lists entry names omitted from listings.
    pub fn new(site_name: impl Into<String>, exclude: Vec<String>) -> Self {
        Self {
            site_name: site_name.into(),
            exclude,
        }
    }

    /// Display entries for a folder: subdirectories first, then files,
    /// each group sorted by name. The folder's own index file and any
    /// excluded names are omitted.
    fn entries(&self, folder: &Folder) -> Vec<IndexEntry> {
        let mut directories: Vec<IndexEntry> = folder
            .subdirectories
            .iter()
            .map(|child| {
                let name = child[folder.prefix.len()..].to_string();
                let stem = name.trim_end_matches('/');
                IndexEntry {
                    href: format!("{}/", urlencoding::encode(stem)),
                    name,
                    date: "-".to_string(),
                    size: "-".to_string(),
                }
            })
            .collect();
        directories.sort_by(|a, b| a.name.cmp(&b.name));

        let mut files: Vec<IndexEntry> = folder
            .files
            .iter()
            .filter_map(|record| {
                let name = &record.key[folder.prefix.len()..];
                if name == INDEX_FILE_NAME || self.exclude.iter().any(|ex| ex == name) {
                    return None;
                }
                Some(IndexEntry {
                    href: urlencoding::encode(name).into_owned(),
                    name: name.to_string(),
                    date: record.last_modified.format("%d-%b-%Y %H:%M").to_string(),
                    size: ByteSize::b(record.size_bytes).to_string(),
                })
            })
            .collect();
        files.sort_by(|a, b| a.name.cmp(&b.name));

        directories.extend(files);
        directories
    }
}

impl IndexRenderer for HtmlRenderer {
    fn render(&self, folder: &Folder) -> IndexResult<RenderedIndex> {
        let entries = self.entries(folder);
        let name_width = entries
            .iter()
            .map(|entry| entry.name.chars().count())
            .max()
            .unwrap_or(0);

        let mut listing = String::new();
        if !folder.prefix.is_empty() {
            listing.push_str("<a href=\"../\" class=\"parent_link\">../</a></br>\n");
        }
        for entry in &entries {
            let pad = " ".repeat(name_width - entry.name.chars().count());
            listing.push_str(&format!(
                "<a href=\"{}\" class=\"item_link\">{}</a>{pad}  {:>17}  {:>10}\n",
                entry.href,
                escape_html(&entry.name),
                entry.date,
                entry.size,
            ));
        }

        let title = escape_html(&format!("{}/{}", self.site_name, folder.prefix));
        let html = format!(
            "<!DOCTYPE html>\n\
             <html>\n\
             <head><title>Index of {title}</title></head>\n\
             <body>\n\
             <h1>Index of {title}</h1>\n\
             <hr><pre>\n\
             {listing}</pre><hr>\n\
             <address style=\"font-size:small;\">Generated by bucket-index.</address>\n\
             </body>\n\
             </html>\n"
        );

        let bytes = html.into_bytes();
        let fingerprint = hex::encode(Md5::digest(&bytes));
        Ok(RenderedIndex { bytes, fingerprint })
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
