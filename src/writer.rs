use crate::cli::DEFAULT_SCRIPT_NAME;
use crate::extractor::MarkdownDocument;
use crate::reconcile::Reconciliation;
use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};

/// Writes `new_content` over the document's file unless nothing changed.
///
/// Returns `true` when the file was written.
pub async fn write_if_changed(document: &MarkdownDocument, new_content: &str) -> Result<bool> {
    if document.content == new_content {
        debug!("Unchanged: {}", document.path.display());
        return Ok(false);
    }

    fs::write(&document.path, new_content)
        .await
        .with_context(|| format!("Failed to write markdown file: {}", document.path.display()))?;

    debug!("Rewrote: {}", document.path.display());
    Ok(true)
}

/// One file to copy into the upload folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyInstruction {
    pub source: PathBuf,
    pub file_name: String,
}

/// The operator's copy list: a guard demanding a destination, then one copy
/// per locally found image. Kept free of shell syntax until [`render`].
///
/// [`render`]: CopyScript::render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyScript {
    script_name: String,
    instructions: Vec<CopyInstruction>,
}

impl CopyScript {
    pub fn new(script_name: impl Into<String>, instructions: Vec<CopyInstruction>) -> Self {
        Self {
            script_name: script_name.into(),
            instructions,
        }
    }

    /// Copy instructions for every found image, in filename order.
    pub fn from_reconciliation(script_path: &Path, reconciliation: &Reconciliation) -> Self {
        let script_name = script_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_SCRIPT_NAME.to_string());

        let instructions = reconciliation
            .found
            .iter()
            .map(|(name, source)| CopyInstruction {
                source: source.clone(),
                file_name: name.clone(),
            })
            .collect();

        Self::new(script_name, instructions)
    }

    pub fn instructions(&self) -> &[CopyInstruction] {
        &self.instructions
    }

    /// Renders a POSIX shell script. With no argument it prints usage and
    /// exits 1 before touching anything.
    pub fn render(&self) -> String {
        let mut script = String::new();

        script.push_str("#!/bin/bash\n");
        script.push_str("# Script to copy images to your GitHub repo clone\n");
        script.push_str(&format!(
            "# Usage: ./{} /path/to/uploads/repo/images\n\n",
            self.script_name
        ));
        script.push_str("if [ -z \"$1\" ]; then\n");
        script.push_str("    echo \"Usage: $0 /path/to/uploads/repo/images\"\n");
        script.push_str("    exit 1\n");
        script.push_str("fi\n\n");
        script.push_str("DEST_DIR=\"$1\"\n\n");

        for instruction in &self.instructions {
            script.push_str(&format!(
                "cp \"{}\" \"$DEST_DIR/{}\"\n",
                quote_double(&instruction.source.to_string_lossy()),
                quote_double(&instruction.file_name)
            ));
        }

        script.push_str(&format!(
            "\necho \"Copied {} images to $DEST_DIR\"\n",
            self.instructions.len()
        ));

        script
    }

    /// Writes the rendered script to `path` and marks it executable (0755).
    pub async fn write_to(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .await
            .with_context(|| format!("Failed to create copy script: {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        writer
            .write_all(self.render().as_bytes())
            .await
            .with_context(|| format!("Failed to write copy script: {}", path.display()))?;
        writer
            .flush()
            .await
            .with_context(|| format!("Failed to flush copy script: {}", path.display()))?;

        make_executable(path).await?;
        debug!(
            "Wrote copy script with {} instruction(s): {}",
            self.instructions.len(),
            path.display()
        );
        Ok(())
    }
}

/// Escapes the characters that stay special inside double quotes.
fn quote_double(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(unix)]
async fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .await
        .with_context(|| format!("Failed to mark executable: {}", path.display()))
}

#[cfg(not(unix))]
async fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
