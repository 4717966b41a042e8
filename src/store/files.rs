use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::config::Backend;
use crate::error::{Result, TodoError};
use crate::model::TaskList;
use crate::store::{Document, TaskStore};

pub const TASKS_FILE: &str = "tasks.json";

/// Task list kept as one pretty-printed JSON document.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn open(dir: &Path) -> Self {
        Self {
            path: dir.join(TASKS_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn corrupt(&self, reason: impl ToString) -> TodoError {
        TodoError::CorruptStore(self.path.display().to_string(), reason.to_string())
    }
}

impl TaskStore for JsonStore {
    fn backend(&self) -> Backend {
        Backend::Json
    }

    fn load(&self) -> Result<TaskList> {
        if !self.path.exists() {
            return Ok(TaskList::new());
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(TaskList::new());
        }
        let doc = Document::from_json(&data).map_err(|e| self.corrupt(e))?;
        doc.into_list()
    }

    /// Write to a sibling temp file and rename over the target, so readers
    /// never observe a half-written document.
    fn save(&self, list: &TaskList) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let json = serde_json::to_string_pretty(&Document::from_list(list))?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}
