use std::path::{Path, PathBuf};

use git2::Repository;

/// Work tree root of the git repository containing `start`, if any.
/// Bare repositories have no work tree and yield None.
pub fn work_tree_root(start: &Path) -> Option<PathBuf> {
    let repo = Repository::discover(start).ok()?;
    repo.workdir().map(Path::to_path_buf)
}

/// Where `todo init` should place `.todo/`: the enclosing git work tree when
/// there is one, otherwise `cwd` itself.
pub fn init_base(cwd: &Path) -> PathBuf {
    work_tree_root(cwd).unwrap_or_else(|| cwd.to_path_buf())
}
