use std::path::PathBuf;

use clap::{Parser, Subcommand};
use todo::commands::export::ExportFormat;
use todo::config::Backend;
use todo::error::TodoError;
use todo::model::Filter;
use todo::output::Format;

#[derive(Parser)]
#[command(name = "todo", version, about = "A small local to-do list manager")]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    format: Format,
    /// Shorthand for --format json
    #[arg(long, global = true, hide = true)]
    json: bool,
    /// Log debug detail to stderr (TODO_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a .todo/ directory (at the git work tree root when inside one)
    Init {
        /// Storage backend
        #[arg(long, value_enum, default_value = "json")]
        backend: Backend,
    },
    /// Add a task
    Add {
        /// Task title
        title: String,
        /// Longer description
        #[arg(long, short)]
        description: Option<String>,
        /// Due date (YYYY-MM-DD, DD/MM/YYYY, "Nov 12 2025", today, tomorrow)
        #[arg(long)]
        due: Option<String>,
    },
    /// Edit a task's title, description or due date
    Edit {
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description
        #[arg(long, short)]
        description: Option<String>,
        /// New due date, or "clear" to remove it
        #[arg(long)]
        due: Option<String>,
    },
    /// Mark a task complete
    Done { id: String },
    /// Mark a task incomplete
    Undo { id: String },
    /// Flip a task between complete and incomplete
    Toggle { id: String },
    /// Delete a task
    Delete { id: String },
    /// Delete every completed task
    Clear,
    /// List tasks
    List {
        /// Which tasks to show
        #[arg(long, short, value_enum, default_value = "all")]
        filter: Filter,
    },
    /// Show one task
    Show { id: String },
    /// Write all tasks as a json or yaml document
    Export {
        /// Document format (defaults to the output file extension, else json)
        #[arg(long = "as", value_enum)]
        as_format: Option<ExportFormat>,
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Append tasks from a json or yaml export under fresh ids
    Import { file: PathBuf },
    /// Interactive terminal UI
    Tui,
}

fn parse_id(input: &str) -> todo::error::Result<u64> {
    match input.trim().parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(TodoError::InvalidTaskId(input.to_string())),
    }
}

fn run(cli: Cli, format: Format) -> todo::error::Result<()> {
    use todo::store::repo::find_repo_root;

    match cli.command {
        Commands::Init { backend } => {
            let cwd = std::env::current_dir()?;
            todo::commands::init::run(&cwd, backend)
        }
        Commands::Add {
            title,
            description,
            due,
        } => todo::commands::add::run(&find_repo_root()?, title, description, due, format),
        Commands::Edit {
            id,
            title,
            description,
            due,
        } => {
            let id = parse_id(&id)?;
            todo::commands::edit::run(&find_repo_root()?, id, title, description, due, format)
        }
        Commands::Done { id } => {
            let id = parse_id(&id)?;
            todo::commands::complete::done(&find_repo_root()?, id, format)
        }
        Commands::Undo { id } => {
            let id = parse_id(&id)?;
            todo::commands::complete::undo(&find_repo_root()?, id, format)
        }
        Commands::Toggle { id } => {
            let id = parse_id(&id)?;
            todo::commands::complete::toggle(&find_repo_root()?, id, format)
        }
        Commands::Delete { id } => {
            let id = parse_id(&id)?;
            todo::commands::delete::run(&find_repo_root()?, id, format)
        }
        Commands::Clear => todo::commands::clear::run(&find_repo_root()?, format),
        Commands::List { filter } => todo::commands::list::run(&find_repo_root()?, filter, format),
        Commands::Show { id } => {
            let id = parse_id(&id)?;
            todo::commands::show::run(&find_repo_root()?, id, format)
        }
        Commands::Export { as_format, output } => {
            let as_format = as_format.unwrap_or_else(|| {
                output
                    .as_deref()
                    .map(ExportFormat::from_path)
                    .unwrap_or_default()
            });
            todo::commands::export::run(&find_repo_root()?, as_format, output.as_deref())
        }
        Commands::Import { file } => {
            todo::commands::import::run(&find_repo_root()?, &file, format)
        }
        Commands::Tui => todo::commands::tui::run(&find_repo_root()?),
    }
}

fn main() {
    let cli = Cli::parse();
    todo::logging::init(cli.verbose);
    let format = if cli.json { Format::Json } else { cli.format };
    if let Err(e) = run(cli, format) {
        tracing::debug!(code = e.code(), "command failed");
        match format {
            Format::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "error": e.code(),
                        "message": e.to_string()
                    })
                );
            }
            _ => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
