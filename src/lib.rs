//! # md-image-migrate Library
//!
//! Moves the images of a folder of markdown posts to a remote host:
//!
//! - Finds `![alt](/images/name)` references in every `*.md` file of a folder
//! - Checks which of those images exist in a local images folder
//! - Rewrites each `/images/name` to `<base url>/name` in place
//! - Writes a shell script that copies the found images into an upload folder
//!
//! ## Usage
//!
//! ```rust,no_run
//! use md_image_migrate::{Config, run_migration};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::for_markdown_dir("content/post/seo");
//!     config.images_dir = "content/post/images".into();
//!
//!     let summary = run_migration(&config).await?;
//!     println!("{} files updated", summary.documents_updated.len());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod extractor;
pub mod filewalker;
pub mod reconcile;
pub mod report;
pub mod rewriter;
pub mod writer;

pub use cli::Config;
pub use extractor::{MarkdownDocument, extract_image_references};
pub use filewalker::collect_markdown_files;
pub use reconcile::{Reconciliation, reconcile};
pub use report::MigrationSummary;
pub use rewriter::ImageMap;
pub use writer::{CopyInstruction, CopyScript, write_if_changed};

use anyhow::Result;
use log::info;
use std::collections::BTreeSet;

/// Runs extract, reconcile, rewrite and write over `config.markdown_dir`.
///
/// Progress goes to stdout. Any filesystem error aborts the run; documents
/// already written stay written.
pub async fn run_migration(config: &Config) -> Result<MigrationSummary> {
    let paths = collect_markdown_files(&config.markdown_dir)?;
    info!(
        "Scanning {} markdown file(s) in {}",
        paths.len(),
        config.markdown_dir.display()
    );

    let mut documents = Vec::with_capacity(paths.len());
    let mut all_images = BTreeSet::new();

    for path in &paths {
        let document = MarkdownDocument::read(path).await?;
        all_images.extend(document.image_references(&config.image_prefix));
        documents.push(document);
    }

    println!(
        "Found {} unique images referenced in {} markdown files",
        all_images.len(),
        documents.len()
    );

    let reconciliation = reconcile(&all_images, &config.images_dir).await?;
    for line in reconciliation.report_lines() {
        println!("{line}");
    }

    let image_map = ImageMap::build(&reconciliation, &config.base_url, &config.image_prefix)?;

    let mut updated = Vec::new();
    for document in &documents {
        let new_content = image_map.rewrite(&document.content);
        if new_content == document.content {
            continue;
        }

        let written = config.dry_run || write_if_changed(document, &new_content).await?;
        if written {
            let verb = if config.dry_run { "Would update" } else { "Updated" };
            println!("{verb}: {}", document.file_name());
            updated.push(document.file_name());
        }
    }

    let script = CopyScript::from_reconciliation(&config.script_path, &reconciliation);
    let script_path = if config.dry_run {
        None
    } else {
        script.write_to(&config.script_path).await?;
        info!("Copy script written to {}", config.script_path.display());
        Some(config.script_path.clone())
    };

    let summary = MigrationSummary {
        documents_scanned: documents.len(),
        documents_updated: updated,
        unique_images: all_images.len(),
        found: reconciliation.found.keys().cloned().collect(),
        missing: reconciliation.missing.clone(),
        base_url: image_map.base_url().to_string(),
        script_path,
        dry_run: config.dry_run,
    };

    for line in summary.lines() {
        println!("{line}");
    }

    Ok(summary)
}
