use std::fs;
use std::path::Path;

use tracing::info;

use crate::commands::export::ExportFormat;
use crate::dates;
use crate::error::{Result, TodoError};
use crate::output::{self, Format};
use crate::store::Document;
use crate::store::repo::Repo;

/// Read an export (json or yaml, full document or bare task array,
/// including task arrays written by older tools).
pub fn read_document(path: &Path) -> Result<Document> {
    let data = fs::read_to_string(path)?;
    let corrupt = |e: &dyn std::fmt::Display| {
        TodoError::CorruptStore(path.display().to_string(), e.to_string())
    };
    let doc = match ExportFormat::from_path(path) {
        ExportFormat::Json => Document::from_json(&data).map_err(|e| corrupt(&e))?,
        ExportFormat::Yaml => Document::from_yaml(&data).map_err(|e| corrupt(&e))?,
    };
    doc.check_version()?;
    Ok(doc)
}

/// Append every task from `file` under fresh ids.
pub fn run(repo_root: &Path, file: &Path, format: Format) -> Result<()> {
    let doc = read_document(file)?;
    let repo = Repo::open(repo_root)?;

    let imported = repo.mutate(|list| {
        let ids = list.import(doc.tasks)?;
        Ok(ids
            .into_iter()
            .filter_map(|id| list.get(id).cloned())
            .collect::<Vec<_>>())
    })?;
    info!(count = imported.len(), file = %file.display(), "imported");

    let refs: Vec<_> = imported.iter().collect();
    output::print_tasks(&refs, format, dates::today(), "Nothing to import.")
}
