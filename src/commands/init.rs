use std::path::Path;

use tracing::info;

use crate::config::Backend;
use crate::error::Result;
use crate::git;
use crate::store::repo::Repo;

pub fn run(cwd: &Path, backend: Backend) -> Result<()> {
    let base = git::init_base(cwd);
    let repo = Repo::init(&base, backend)?;
    let config = repo.config();
    info!(
        dir = %repo.dir().display(),
        backend = %config.backend,
        version = config.version,
        "initialized"
    );
    eprintln!("Initialized {} ({})", repo.dir().display(), config.backend);
    Ok(())
}
