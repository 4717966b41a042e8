use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};

use crate::config::Backend;
use crate::error::{Result, TodoError};
use crate::model::{Task, TaskList};
use crate::store::TaskStore;

pub const DB_FILE: &str = "tasks.db";

/// Task list kept in a SQLite database. `position` carries list order.
pub struct SqliteStore {
    conn: Connection,
}

struct RawRow {
    id: u64,
    title: String,
    description: Option<String>,
    completed: bool,
    due_date: Option<String>,
    created_at: String,
    updated_at: String,
    completed_at: Option<String>,
}

impl SqliteStore {
    pub fn open(dir: &Path) -> Result<Self> {
        let conn = Connection::open(dir.join(DB_FILE))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let store = Self { conn };
        store.create_tables()?;
        Ok(store)
    }

    pub fn open_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.create_tables()?;
        Ok(store)
    }

    fn create_tables(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY,
                position INTEGER NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                completed INTEGER NOT NULL DEFAULT 0,
                due_date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                completed_at TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_tasks_position ON tasks(position);
            CREATE TABLE IF NOT EXISTS metadata (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn stored_next_id(&self) -> Result<Option<u64>> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM metadata WHERE key = 'next_id'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        value
            .map(|v| {
                v.parse::<u64>()
                    .map_err(|e| corrupt(format!("next_id '{v}': {e}")))
            })
            .transpose()
    }
}

fn corrupt(reason: String) -> TodoError {
    TodoError::CorruptStore(DB_FILE.into(), reason)
}

fn parse_instant(field: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| corrupt(format!("{field} '{value}': {e}")))
}

impl RawRow {
    fn into_task(self) -> Result<Task> {
        let due_date = self
            .due_date
            .map(|d| {
                NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                    .map_err(|e| corrupt(format!("due_date '{d}': {e}")))
            })
            .transpose()?;
        let completed_at = self
            .completed_at
            .map(|v| parse_instant("completed_at", &v))
            .transpose()?;
        Ok(Task {
            id: self.id,
            title: self.title,
            description: self.description,
            completed: self.completed,
            due_date,
            created_at: parse_instant("created_at", &self.created_at)?,
            updated_at: parse_instant("updated_at", &self.updated_at)?,
            completed_at,
        })
    }
}

impl TaskStore for SqliteStore {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    fn load(&self) -> Result<TaskList> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, description, completed, due_date, created_at, updated_at, completed_at
             FROM tasks ORDER BY position",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(RawRow {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    description: row.get(2)?,
                    completed: row.get(3)?,
                    due_date: row.get(4)?,
                    created_at: row.get(5)?,
                    updated_at: row.get(6)?,
                    completed_at: row.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let tasks = rows
            .into_iter()
            .map(RawRow::into_task)
            .collect::<Result<Vec<_>>>()?;
        TaskList::from_parts(tasks, self.stored_next_id()?)
    }

    fn save(&self, list: &TaskList) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM tasks", [])?;
        for (position, task) in list.iter().enumerate() {
            tx.execute(
                "INSERT INTO tasks (id, position, title, description, completed, due_date, created_at, updated_at, completed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    task.id,
                    position as i64,
                    task.title,
                    task.description,
                    task.completed,
                    task.due_date.map(|d| d.format("%Y-%m-%d").to_string()),
                    task.created_at.to_rfc3339(),
                    task.updated_at.to_rfc3339(),
                    task.completed_at.map(|t| t.to_rfc3339()),
                ],
            )?;
        }
        tx.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES ('next_id', ?1)",
            params![list.next_id().to_string()],
        )?;
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> TaskList {
        let mut list = TaskList::new();
        list.add("Alpha", None, None).unwrap();
        list.add("Beta", Some("second".into()), NaiveDate::from_ymd_opt(2026, 3, 1))
            .unwrap();
        list.add("Gamma", None, None).unwrap();
        list.set_complete(1, true).unwrap();
        list
    }

    #[test]
    fn empty_database_loads_empty_list() {
        let store = SqliteStore::open_memory().unwrap();
        let list = store.load().unwrap();
        assert!(list.is_empty());
        assert_eq!(list.next_id(), 1);
    }

    #[test]
    fn save_and_reload_round_trips() {
        let store = SqliteStore::open_memory().unwrap();
        let list = sample();
        store.save(&list).unwrap();
        assert_eq!(store.load().unwrap(), list);
    }

    #[test]
    fn order_follows_position_not_id() {
        let store = SqliteStore::open_memory().unwrap();
        let mut list = sample();
        list.delete(1).unwrap();
        let mut extra = TaskList::new();
        extra.add("Imported", None, None).unwrap();
        list.import(extra.tasks().to_vec()).unwrap();

        store.save(&list).unwrap();
        let titles: Vec<String> = store
            .load()
            .unwrap()
            .iter()
            .map(|t| t.title.clone())
            .collect();
        assert_eq!(titles, vec!["Beta", "Gamma", "Imported"]);
    }

    #[test]
    fn next_id_survives_deleting_highest_task() {
        let dir = tempdir().unwrap();
        let mut list = sample();
        list.delete(3).unwrap();
        SqliteStore::open(dir.path()).unwrap().save(&list).unwrap();

        let reopened = SqliteStore::open(dir.path()).unwrap();
        assert_eq!(reopened.load().unwrap().next_id(), 4);
    }
}
