use std::path::Path;

use tracing::info;

use crate::dates;
use crate::error::Result;
use crate::output::{self, Format};
use crate::store::repo::Repo;

/// Delete every completed task and print what was removed.
pub fn run(repo_root: &Path, format: Format) -> Result<()> {
    let repo = Repo::open(repo_root)?;
    let removed = repo.mutate(|list| Ok(list.clear_completed()))?;
    info!(count = removed.len(), "completed tasks cleared");

    let refs: Vec<_> = removed.iter().collect();
    output::print_tasks(&refs, format, dates::today(), "No completed tasks to clear.")
}
