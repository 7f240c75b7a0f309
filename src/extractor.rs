//! Finds local image references in markdown.
//!
//! Any `![alt](target)` is a candidate, including the image half of a linked
//! image such as `[![alt](target)](link)`. Only targets beginning with the
//! local-images prefix count; the prefix is stripped to leave the filename.

use anyhow::{Context, Result};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::fs;

static IMAGE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[.*?\]\((.*?)\)").expect("valid image link regex"));

/// A markdown file as read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownDocument {
    pub path: PathBuf,
    pub content: String,
}

impl MarkdownDocument {
    pub async fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read markdown file: {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Local image filenames referenced by this document.
    pub fn image_references(&self, prefix: &str) -> Vec<String> {
        let images = extract_image_references(&self.content, prefix);
        debug!(
            "{}: {} local image reference(s)",
            self.path.display(),
            images.len()
        );
        images
    }
}

/// Returns the filenames of every image target starting with `prefix`, in
/// order of appearance. Duplicates are kept.
pub fn extract_image_references(content: &str, prefix: &str) -> Vec<String> {
    IMAGE_LINK
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .filter_map(|target| target.as_str().strip_prefix(prefix))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
