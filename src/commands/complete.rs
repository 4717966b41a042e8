use std::path::Path;

use tracing::info;

use crate::dates;
use crate::error::Result;
use crate::output::{self, Format};
use crate::store::repo::Repo;

fn set(repo_root: &Path, id: u64, completed: bool, format: Format) -> Result<()> {
    let repo = Repo::open(repo_root)?;
    let task = repo.mutate(|list| list.set_complete(id, completed).cloned())?;
    info!(id, completed, "completion set");
    output::print_task(&task, format, dates::today())
}

pub fn done(repo_root: &Path, id: u64, format: Format) -> Result<()> {
    set(repo_root, id, true, format)
}

pub fn undo(repo_root: &Path, id: u64, format: Format) -> Result<()> {
    set(repo_root, id, false, format)
}

pub fn toggle(repo_root: &Path, id: u64, format: Format) -> Result<()> {
    let repo = Repo::open(repo_root)?;
    let task = repo.mutate(|list| list.toggle(id).cloned())?;
    info!(id, completed = task.completed, "completion toggled");
    output::print_task(&task, format, dates::today())
}
