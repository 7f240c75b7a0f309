use std::path::PathBuf;

/// Outcome of one migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationSummary {
    pub documents_scanned: usize,
    /// Documents rewritten, or that would be rewritten on a dry run.
    pub documents_updated: Vec<String>,
    pub unique_images: usize,
    /// Found locally; these are the files to upload.
    pub found: Vec<String>,
    pub missing: Vec<String>,
    pub base_url: String,
    /// `None` on a dry run.
    pub script_path: Option<PathBuf>,
    pub dry_run: bool,
}

impl MigrationSummary {
    pub fn lines(&self) -> Vec<String> {
        let verb = if self.dry_run { "Would update" } else { "Updated" };
        let mut lines = vec![
            String::new(),
            format!(
                "{verb} {} of {} files",
                self.documents_updated.len(),
                self.documents_scanned
            ),
            format!("All image URLs now point to: {}/[filename]", self.base_url),
            String::new(),
            format!("Images to upload ({} files):", self.found.len()),
        ];

        lines.extend(self.found.iter().map(|name| format!("  - {name}")));

        if !self.found.is_empty() {
            lines.push("Copy these files into the images folder of your uploads clone,".to_string());
            lines.push("then commit and push".to_string());
        }

        match &self.script_path {
            Some(path) => lines.push(format!(
                "Created {} to help copy images",
                path.display()
            )),
            None => lines.push("Dry run: no files were written".to_string()),
        }

        lines
    }
}
