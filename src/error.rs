use thiserror::Error;

#[derive(Debug, Error)]
pub enum TodoError {
    #[error("not a todo directory (run `todo init` first)")]
    NotInitialized,

    #[error("todo already initialized in {0}")]
    AlreadyInitialized(String),

    #[error("task {0} not found")]
    TaskNotFound(u64),

    #[error("task title cannot be empty")]
    EmptyTitle,

    #[error("could not parse date '{0}' (try YYYY-MM-DD, DD/MM/YYYY or 'Nov 12 2025')")]
    InvalidDate(String),

    #[error("invalid task id '{0}': expected a positive integer")]
    InvalidTaskId(String),

    #[error("no task ids left to assign")]
    IdsExhausted,

    #[error("locked by another process: {0}")]
    Locked(String),

    #[error("corrupt store '{0}': {1}")]
    CorruptStore(String, String),

    #[error("unsupported format version {0}")]
    UnsupportedVersion(u32),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
}

impl TodoError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotInitialized => "not_initialized",
            Self::AlreadyInitialized(_) => "already_initialized",
            Self::TaskNotFound(_) => "task_not_found",
            Self::EmptyTitle => "empty_title",
            Self::InvalidDate(_) => "invalid_date",
            Self::InvalidTaskId(_) => "invalid_task_id",
            Self::IdsExhausted => "ids_exhausted",
            Self::Locked(_) => "locked",
            Self::CorruptStore(_, _) => "corrupt_store",
            Self::UnsupportedVersion(_) => "unsupported_version",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
            Self::Yaml(_) => "yaml_error",
            Self::Db(_) => "db_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, TodoError>;
