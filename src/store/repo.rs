use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{Backend, CONFIG_FILE, Config};
use crate::error::{Result, TodoError};
use crate::model::TaskList;
use crate::store::files::TASKS_FILE;
use crate::store::lock::DirLock;
use crate::store::sqlite::DB_FILE;
use crate::store::{TaskStore, open_store};

pub const TODO_DIR: &str = ".todo";
pub const LOCK_FILE: &str = "todo.lock";

/// An initialized `.todo` directory with its configured backend.
pub struct Repo {
    dir: PathBuf,
    config: Config,
    store: Box<dyn TaskStore>,
}

impl Repo {
    /// Create `.todo/` under `base`, write the config and an empty list.
    /// Refuses when a config or any task data file is already there.
    pub fn init(base: &Path, backend: Backend) -> Result<Self> {
        let dir = base.join(TODO_DIR);
        if let Some(existing) = [CONFIG_FILE, TASKS_FILE, DB_FILE]
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
        {
            return Err(TodoError::AlreadyInitialized(
                existing.display().to_string(),
            ));
        }
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(".gitignore"), format!("{LOCK_FILE}\n"))?;

        let config = Config::with_backend(backend);
        config.save(&dir)?;

        let store = open_store(&dir, backend)?;
        store.save(&TaskList::new())?;
        debug!(dir = %dir.display(), %backend, "initialized todo directory");

        Ok(Self { dir, config, store })
    }

    /// Open the `.todo/` directory directly under `base`.
    pub fn open(base: &Path) -> Result<Self> {
        let dir = base.join(TODO_DIR);
        let config = Config::load(&dir)?;
        let store = open_store(&dir, config.backend)?;
        Ok(Self { dir, config, store })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn backend(&self) -> Backend {
        self.store.backend()
    }

    pub fn load(&self) -> Result<TaskList> {
        let list = self.store.load()?;
        debug!(backend = %self.backend(), tasks = list.len(), "loaded task list");
        Ok(list)
    }

    /// Run `op` against a freshly loaded list while holding the directory
    /// lock. The list is saved only if `op` succeeds.
    pub fn mutate<T>(&self, op: impl FnOnce(&mut TaskList) -> Result<T>) -> Result<T> {
        let lock = DirLock::acquire(&self.dir.join(LOCK_FILE))?;

        let mut list = self.load()?;
        let out = op(&mut list)?;
        self.store.save(&list)?;
        debug!(backend = %self.backend(), tasks = list.len(), "saved task list");

        lock.release()?;
        Ok(out)
    }
}

/// Walk up from the current directory to the nearest `.todo/`.
pub fn find_repo_root() -> Result<PathBuf> {
    let cwd = std::env::current_dir().map_err(TodoError::Io)?;
    find_repo_root_from(&cwd)
}

pub fn find_repo_root_from(start: &Path) -> Result<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        if dir.join(TODO_DIR).join(CONFIG_FILE).exists() {
            return Ok(dir);
        }
        if !dir.pop() {
            return Err(TodoError::NotInitialized);
        }
    }
}
