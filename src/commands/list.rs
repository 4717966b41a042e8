use std::path::Path;

use crate::dates;
use crate::error::Result;
use crate::model::Filter;
use crate::output::{self, Format};
use crate::store::repo::Repo;

pub fn run(repo_root: &Path, filter: Filter, format: Format) -> Result<()> {
    let repo = Repo::open(repo_root)?;
    let list = repo.load()?;
    let today = dates::today();

    let tasks = list.filter(filter, today);
    let empty = if list.is_empty() {
        output::NO_TASKS
    } else {
        output::NO_MATCHES
    };
    output::print_tasks(&tasks, format, today, empty)
}
