use std::path::Path;

use crate::dates;
use crate::error::{Result, TodoError};
use crate::output::{self, Format};
use crate::store::repo::Repo;

pub fn run(repo_root: &Path, id: u64, format: Format) -> Result<()> {
    let repo = Repo::open(repo_root)?;
    let list = repo.load()?;
    let task = list.get(id).ok_or(TodoError::TaskNotFound(id))?;
    output::print_task(task, format, dates::today())
}
