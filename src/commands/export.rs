use std::fs;
use std::path::Path;

use clap::ValueEnum;
use tracing::info;

use crate::error::Result;
use crate::store::Document;
use crate::store::repo::Repo;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    #[default]
    Json,
    Yaml,
}

impl ExportFormat {
    /// Guess from a file extension; anything but `.yaml`/`.yml` is json.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

pub fn render(doc: &Document, format: ExportFormat) -> Result<String> {
    Ok(match format {
        ExportFormat::Json => serde_json::to_string_pretty(doc)? + "\n",
        ExportFormat::Yaml => serde_yaml::to_string(doc)?,
    })
}

pub fn run(repo_root: &Path, format: ExportFormat, output: Option<&Path>) -> Result<()> {
    let repo = Repo::open(repo_root)?;
    let doc = Document::from_list(&repo.load()?);
    let rendered = render(&doc, format)?;

    match output {
        Some(path) => {
            fs::write(path, rendered)?;
            info!(path = %path.display(), tasks = doc.tasks.len(), "exported");
            eprintln!("Exported {} tasks to {}", doc.tasks.len(), path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}
