pub mod files;
pub mod lock;
pub mod repo;
pub mod sqlite;

use std::path::Path;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Backend;
use crate::error::{Result, TodoError};
use crate::model::{Task, TaskList};

pub const DOCUMENT_VERSION: u32 = 1;

/// Persistence for the whole task list. Backends load and save the list as a
/// unit; there is no per-task I/O.
pub trait TaskStore {
    fn backend(&self) -> Backend;
    fn load(&self) -> Result<TaskList>;
    fn save(&self, list: &TaskList) -> Result<()>;
}

/// Open the store for `backend` inside a `.todo` directory.
pub fn open_store(dir: &Path, backend: Backend) -> Result<Box<dyn TaskStore>> {
    Ok(match backend {
        Backend::Json => Box::new(files::JsonStore::open(dir)),
        Backend::Sqlite => Box::new(sqlite::SqliteStore::open(dir)?),
    })
}

/// Serialized form of a task list, shared by the json backend and by
/// export/import.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<u64>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Either a full document or a bare array of tasks.
#[derive(Deserialize)]
#[serde(untagged)]
enum AnyDocument {
    Document(Document),
    Bare(Vec<LooseTask>),
}

impl From<AnyDocument> for Document {
    fn from(doc: AnyDocument) -> Self {
        match doc {
            AnyDocument::Document(d) => d,
            AnyDocument::Bare(tasks) => Document {
                version: DOCUMENT_VERSION,
                next_id: None,
                tasks: tasks.into_iter().map(|t| t.0).collect(),
            },
        }
    }
}

/// A task from a bare array, as older files wrote them: `due_date` may be an
/// empty string, timestamps may lack an offset, and `updated_at` may be
/// missing.
#[derive(Deserialize)]
#[serde(try_from = "RawLooseTask")]
struct LooseTask(Task);

#[derive(Deserialize)]
struct RawLooseTask {
    id: u64,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    due_date: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    completed_at: Option<String>,
}

impl TryFrom<RawLooseTask> for LooseTask {
    type Error = String;

    fn try_from(raw: RawLooseTask) -> std::result::Result<Self, String> {
        let due_date = match raw.due_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(day) => Some(
                NaiveDate::parse_from_str(day, "%Y-%m-%d")
                    .map_err(|e| format!("task {}: due_date '{day}': {e}", raw.id))?,
            ),
        };
        let stamp = |field: &str, value: Option<&str>| match value.map(str::trim) {
            None | Some("") => Ok(None),
            Some(v) => parse_timestamp(v)
                .map(Some)
                .ok_or_else(|| format!("task {}: {field} '{v}' is not a timestamp", raw.id)),
        };
        let created_at =
            stamp("created_at", raw.created_at.as_deref())?.unwrap_or_else(Utc::now);
        let updated_at =
            stamp("updated_at", raw.updated_at.as_deref())?.unwrap_or(created_at);
        let completed_at = stamp("completed_at", raw.completed_at.as_deref())?;

        Ok(Self(Task {
            id: raw.id,
            title: raw.title,
            description: raw.description,
            completed: raw.completed,
            due_date,
            created_at,
            updated_at,
            completed_at,
        }))
    }
}

/// RFC 3339, or a naive ISO timestamp read as local time (UTC when the local
/// time is ambiguous or skipped).
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Some(
        Local
            .from_local_datetime(&naive)
            .single()
            .map_or_else(|| naive.and_utc(), |local| local.with_timezone(&Utc)),
    )
}

impl Document {
    pub fn from_list(list: &TaskList) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            next_id: Some(list.next_id()),
            tasks: list.tasks().to_vec(),
        }
    }

    /// Refuse documents written by a newer format.
    pub fn check_version(&self) -> Result<()> {
        if self.version != DOCUMENT_VERSION {
            return Err(TodoError::UnsupportedVersion(self.version));
        }
        Ok(())
    }

    pub fn into_list(self) -> Result<TaskList> {
        self.check_version()?;
        TaskList::from_parts(self.tasks, self.next_id)
    }

    pub fn from_json(data: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str::<AnyDocument>(data).map(Into::into)
    }

    pub fn from_yaml(data: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str::<AnyDocument>(data).map(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_array_is_accepted() {
        let doc = Document::from_json(
            r#"[{"id": 4, "title": "legacy", "created_at": "2025-01-01T00:00:00Z", "updated_at": "2025-01-01T00:00:00Z"}]"#,
        )
        .unwrap();
        assert_eq!(doc.next_id, None);
        let list = doc.into_list().unwrap();
        assert_eq!(list.next_id(), 5);
        assert!(!list.get(4).unwrap().completed);
    }

    #[test]
    fn yaml_document_parses() {
        let yaml = "version: 1\nnext_id: 3\ntasks:\n  - id: 2\n    title: from yaml\n    completed: true\n    created_at: 2025-01-01T00:00:00Z\n    updated_at: 2025-01-01T00:00:00Z\n";
        let list = Document::from_yaml(yaml).unwrap().into_list().unwrap();
        assert_eq!(list.len(), 1);
        assert!(list.get(2).unwrap().completed);
        assert_eq!(list.next_id(), 3);
    }

    const OLDER_TOOL_FILE: &str = r#"[
  {
    "id": 1,
    "title": "Buy groceries",
    "due_date": "2025-11-12",
    "completed": false,
    "created_at": "2025-11-10T14:03:22.123456"
  },
  {
    "id": 2,
    "title": "Call plumber",
    "due_date": "",
    "completed": true,
    "created_at": "2025-11-10T14:05:01"
  }
]"#;

    #[test]
    fn older_tool_task_array_is_accepted() {
        let list = Document::from_json(OLDER_TOOL_FILE)
            .unwrap()
            .into_list()
            .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.next_id(), 3);

        let groceries = list.get(1).unwrap();
        assert_eq!(
            groceries.due_date,
            Some(NaiveDate::from_ymd_opt(2025, 11, 12).unwrap())
        );
        assert_eq!(groceries.updated_at, groceries.created_at);

        let plumber = list.get(2).unwrap();
        assert_eq!(plumber.due_date, None);
        assert!(plumber.completed);
    }

    #[test]
    fn naive_timestamps_read_as_local_time() {
        let parsed = parse_timestamp("2025-11-10T14:05:01").unwrap();
        let local = parsed.with_timezone(&Local).naive_local();
        assert_eq!(local.to_string(), "2025-11-10 14:05:01");
        assert_eq!(
            parse_timestamp("2025-11-10T14:05:01Z").unwrap().to_rfc3339(),
            "2025-11-10T14:05:01+00:00"
        );
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn malformed_due_date_in_task_array_is_rejected() {
        let data = r#"[{"id": 1, "title": "x", "due_date": "soon"}]"#;
        assert!(Document::from_json(data).is_err());
    }

    #[test]
    fn newer_document_version_is_refused() {
        let doc = Document::from_json(r#"{"version": 99, "next_id": 1, "tasks": []}"#).unwrap();
        assert_eq!(doc.version, 99);
        assert!(matches!(
            doc.into_list(),
            Err(TodoError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn max_id_in_task_array_is_corrupt_not_a_panic() {
        let data = format!(
            r#"[{{"id": {}, "title": "edge", "created_at": "2025-01-01T00:00:00Z"}}]"#,
            u64::MAX
        );
        assert!(matches!(
            Document::from_json(&data).unwrap().into_list(),
            Err(TodoError::CorruptStore(_, _))
        ));
    }
}
