use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tokio::fs;

/// How many missing filenames the report lists before summarising the rest.
pub const MISSING_PREVIEW: usize = 10;

/// Referenced filenames split by whether the local images folder has them.
///
/// Every name handed to [`reconcile`] ends up in exactly one of the two sides.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Filename to absolute source path.
    pub found: BTreeMap<String, PathBuf>,
    pub missing: Vec<String>,
}

impl Reconciliation {
    pub fn total(&self) -> usize {
        self.found.len() + self.missing.len()
    }

    /// Every filename, found or missing, in sorted order.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        let mut names: Vec<&str> = self
            .found
            .keys()
            .map(String::as_str)
            .chain(self.missing.iter().map(String::as_str))
            .collect();
        names.sort_unstable();
        names.into_iter()
    }

    /// Console lines describing the outcome.
    pub fn report_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Found {} images locally", self.found.len())];

        if !self.missing.is_empty() {
            lines.push(format!("Missing {} images:", self.missing.len()));
            for name in self.missing.iter().take(MISSING_PREVIEW) {
                lines.push(format!("  - {name}"));
            }
            if self.missing.len() > MISSING_PREVIEW {
                lines.push(format!(
                    "  ... and {} more",
                    self.missing.len() - MISSING_PREVIEW
                ));
            }
        }

        lines
    }
}

/// Checks each filename against `images_dir`.
///
/// A relative `images_dir` is resolved against the current directory so the
/// recorded source paths are absolute. Nothing is read or written. A name
/// whose existence cannot be checked (e.g. `a.png/` over a regular file)
/// counts as missing.
pub async fn reconcile(names: &BTreeSet<String>, images_dir: &Path) -> Result<Reconciliation> {
    let images_dir = std::path::absolute(images_dir)
        .with_context(|| format!("Failed to resolve images directory: {}", images_dir.display()))?;

    let mut reconciliation = Reconciliation::default();

    for name in names {
        let source = images_dir.join(name);
        match fs::try_exists(&source).await {
            Ok(true) => {
                debug!("Found image: {}", source.display());
                reconciliation.found.insert(name.clone(), source);
            }
            Ok(false) => {
                debug!("Missing image: {}", source.display());
                reconciliation.missing.push(name.clone());
            }
            Err(err) => {
                warn!("Treating {} as missing: {err}", source.display());
                reconciliation.missing.push(name.clone());
            }
        }
    }

    info!(
        "Reconciled {} image(s) against {}: {} found, {} missing",
        names.len(),
        images_dir.display(),
        reconciliation.found.len(),
        reconciliation.missing.len()
    );

    Ok(reconciliation)
}
