use anyhow::{Context, Result, bail};
use ignore::WalkBuilder;
use log::debug;
use std::path::{Path, PathBuf};

/// Collects the `*.md` files directly inside `markdown_dir`, sorted by path.
///
/// Only the top level is scanned. Hidden files and files matched by ignore
/// rules are still included: every markdown file in the folder is a candidate.
pub fn collect_markdown_files(markdown_dir: &Path) -> Result<Vec<PathBuf>> {
    if !markdown_dir.is_dir() {
        bail!(
            "Markdown directory does not exist or is not a directory: {}",
            markdown_dir.display()
        );
    }

    let mut builder = WalkBuilder::new(markdown_dir);
    builder.standard_filters(false).max_depth(Some(1));

    let mut files = Vec::new();

    for result in builder.build() {
        let entry = result
            .with_context(|| format!("Failed to list {}", markdown_dir.display()))?;
        let path = entry.path();

        if path.is_file() && is_markdown(path) {
            debug!("Found markdown file: {}", path.display());
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

fn is_markdown(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.ends_with(".md"))
}
