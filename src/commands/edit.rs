use std::path::Path;

use tracing::info;

use crate::dates;
use crate::error::Result;
use crate::model::{DueChange, TaskEdit};
use crate::output::{self, Format};
use crate::store::repo::Repo;

pub fn run(
    repo_root: &Path,
    id: u64,
    title: Option<String>,
    description: Option<String>,
    due: Option<String>,
    format: Format,
) -> Result<()> {
    let today = dates::today();
    let due = match due.as_deref() {
        None => DueChange::Keep,
        Some(d) if dates::is_clear_keyword(d) => DueChange::Clear,
        Some(d) => DueChange::Set(dates::parse_due_date(d, today)?),
    };
    let edit = TaskEdit {
        title,
        description,
        due,
    };
    if edit.is_empty() {
        eprintln!("nothing to change for task {id}");
    }

    let repo = Repo::open(repo_root)?;
    let task = repo.mutate(|list| list.edit(id, edit).cloned())?;
    info!(id, "task edited");

    output::print_task(&task, format, today)?;
    Ok(())
}
