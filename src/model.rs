use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TodoError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Trim the title and drop a blank description.
    pub fn normalize(&mut self) {
        let trimmed = self.title.trim();
        if trimmed.len() != self.title.len() {
            self.title = trimmed.to_string();
        }
        if self
            .description
            .as_deref()
            .is_some_and(|d| d.trim().is_empty())
        {
            self.description = None;
        }
    }

    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        self.due_date == Some(day)
    }

    /// Incomplete and due strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < today)
    }

    fn mark(&mut self, completed: bool, now: DateTime<Utc>) {
        self.completed = completed;
        self.completed_at = completed.then_some(now);
        self.updated_at = now;
    }
}

/// How an edit treats the due date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DueChange {
    #[default]
    Keep,
    Set(NaiveDate),
    Clear,
}

/// Field-wise edit; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due: DueChange,
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.due == DueChange::Keep
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[clap(rename_all = "snake_case")]
pub enum Filter {
    #[default]
    All,
    Incomplete,
    Completed,
    DueToday,
    Overdue,
}

impl Filter {
    pub const ALL: [Self; 5] = [
        Self::All,
        Self::Incomplete,
        Self::Completed,
        Self::DueToday,
        Self::Overdue,
    ];

    pub fn matches(self, task: &Task, today: NaiveDate) -> bool {
        match self {
            Self::All => true,
            Self::Incomplete => !task.completed,
            Self::Completed => task.completed,
            Self::DueToday => task.is_due_on(today),
            Self::Overdue => task.is_overdue(today),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Incomplete => "Incomplete",
            Self::Completed => "Completed",
            Self::DueToday => "Due today",
            Self::Overdue => "Overdue",
        }
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Incomplete => write!(f, "incomplete"),
            Self::Completed => write!(f, "completed"),
            Self::DueToday => write!(f, "due_today"),
            Self::Overdue => write!(f, "overdue"),
        }
    }
}

/// The flat, insertion-ordered task list.
///
/// `next_id` only ever grows, so an id freed by a delete is never handed out
/// again.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskList {
    tasks: Vec<Task>,
    next_id: u64,
}

impl Default for TaskList {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a list from persisted parts, rejecting duplicate ids and
    /// raising `next_id` past the highest id present.
    pub fn from_parts(tasks: Vec<Task>, next_id: Option<u64>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(tasks.len());
        for task in &tasks {
            if !seen.insert(task.id) {
                return Err(TodoError::CorruptStore(
                    "task list".into(),
                    format!("duplicate task id {}", task.id),
                ));
            }
        }
        let floor = match tasks.iter().map(|t| t.id).max() {
            None => 1,
            Some(max) => max.checked_add(1).ok_or_else(|| {
                TodoError::CorruptStore(
                    "task list".into(),
                    format!("task id {max} is out of range"),
                )
            })?,
        };
        let next_id = next_id.unwrap_or(floor).max(floor);
        Ok(Self { tasks, next_id })
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Hand out `next_id` and advance the counter. Fails once the id space
    /// is used up instead of wrapping.
    fn allocate_id(&mut self) -> Result<u64> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(TodoError::IdsExhausted)?;
        Ok(id)
    }

    fn position(&self, id: u64) -> Result<usize> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(TodoError::TaskNotFound(id))
    }

    pub fn add(
        &mut self,
        title: &str,
        description: Option<String>,
        due_date: Option<NaiveDate>,
    ) -> Result<&Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TodoError::EmptyTitle);
        }

        let now = Utc::now();
        let mut task = Task {
            id: self.allocate_id()?,
            title: title.to_string(),
            description,
            completed: false,
            due_date,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        task.normalize();

        self.tasks.push(task);
        Ok(&self.tasks[self.tasks.len() - 1])
    }

    /// Apply `edit` to task `id`. Validation happens before any field is
    /// touched, so a rejected edit leaves the list as it was.
    pub fn edit(&mut self, id: u64, edit: TaskEdit) -> Result<&Task> {
        let idx = self.position(id)?;
        if edit.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(TodoError::EmptyTitle);
        }

        let task = &mut self.tasks[idx];
        if let Some(t) = edit.title {
            task.title = t;
        }
        if let Some(d) = edit.description {
            task.description = Some(d);
        }
        match edit.due {
            DueChange::Keep => {}
            DueChange::Set(day) => task.due_date = Some(day),
            DueChange::Clear => task.due_date = None,
        }
        task.normalize();
        task.updated_at = Utc::now();
        Ok(&self.tasks[idx])
    }

    pub fn set_complete(&mut self, id: u64, completed: bool) -> Result<&Task> {
        let idx = self.position(id)?;
        let task = &mut self.tasks[idx];
        if task.completed != completed {
            task.mark(completed, Utc::now());
        }
        Ok(&self.tasks[idx])
    }

    pub fn toggle(&mut self, id: u64) -> Result<&Task> {
        let idx = self.position(id)?;
        let task = &mut self.tasks[idx];
        let flipped = !task.completed;
        task.mark(flipped, Utc::now());
        Ok(&self.tasks[idx])
    }

    pub fn delete(&mut self, id: u64) -> Result<Task> {
        let idx = self.position(id)?;
        Ok(self.tasks.remove(idx))
    }

    /// Remove every completed task, returning the removed ones in list order.
    pub fn clear_completed(&mut self) -> Vec<Task> {
        let (done, open): (Vec<Task>, Vec<Task>) =
            std::mem::take(&mut self.tasks).into_iter().partition(|t| t.completed);
        self.tasks = open;
        done
    }

    /// Append tasks from elsewhere under fresh ids. Everything but the id is
    /// kept. Returns the ids assigned, in input order. Either every task is
    /// appended or, on error, none is.
    pub fn import(&mut self, mut tasks: Vec<Task>) -> Result<Vec<u64>> {
        for task in &mut tasks {
            task.normalize();
            if task.title.is_empty() {
                return Err(TodoError::EmptyTitle);
            }
        }
        let count = u64::try_from(tasks.len()).map_err(|_| TodoError::IdsExhausted)?;
        let first = self.next_id;
        self.next_id = first.checked_add(count).ok_or(TodoError::IdsExhausted)?;

        let assigned: Vec<u64> = (first..self.next_id).collect();
        for (task, &id) in tasks.iter_mut().zip(&assigned) {
            task.id = id;
        }
        self.tasks.extend(tasks);
        Ok(assigned)
    }

    pub fn filter(&self, filter: Filter, today: NaiveDate) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| filter.matches(t, today))
            .collect()
    }
}
