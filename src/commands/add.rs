use std::path::Path;

use tracing::info;

use crate::dates;
use crate::error::Result;
use crate::output::{self, Format};
use crate::store::repo::Repo;

pub fn run(
    repo_root: &Path,
    title: String,
    description: Option<String>,
    due: Option<String>,
    format: Format,
) -> Result<()> {
    let today = dates::today();
    let due_date = due
        .as_deref()
        .map(|d| dates::parse_due_date(d, today))
        .transpose()?;

    let repo = Repo::open(repo_root)?;
    let task = repo.mutate(|list| list.add(&title, description, due_date).cloned())?;
    info!(id = task.id, "task added");

    output::print_task(&task, format, today)?;
    Ok(())
}
