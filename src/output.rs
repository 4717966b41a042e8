use chrono::NaiveDate;
use clap::ValueEnum;
use colored::Colorize;

use crate::error::Result;
use crate::model::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Pretty,
    Minimal,
}

pub const NO_TASKS: &str = "No tasks found.";
pub const NO_MATCHES: &str = "No tasks match that filter.";

fn checkbox(task: &Task) -> &'static str {
    if task.completed { "[x]" } else { "[ ]" }
}

fn due_label(task: &Task) -> String {
    task.due_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "no due date".to_string())
}

/// One-line pretty rendering: checkbox, id, title, due date.
pub fn task_line(task: &Task, today: NaiveDate) -> String {
    let title = if task.completed {
        task.title.dimmed().strikethrough().to_string()
    } else {
        task.title.bold().to_string()
    };
    let due = if task.is_overdue(today) {
        format!("due {} (overdue)", due_label(task)).red().to_string()
    } else if task.is_due_on(today) {
        format!("due {} (today)", due_label(task)).yellow().to_string()
    } else {
        format!("due {}", due_label(task)).dimmed().to_string()
    };
    format!("{} {:>3}  {}  {}", checkbox(task), task.id, title, due)
}

fn minimal_row(task: &Task) -> String {
    let due = task
        .due_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:>4} {:4} {:10} {}",
        task.id,
        if task.completed { "x" } else { "" },
        due,
        truncate_title(&task.title, 40)
    )
}

pub fn print_task(task: &Task, format: Format, today: NaiveDate) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(task)?),
        Format::Pretty => {
            println!("{}", task_line(task, today));
            if let Some(ref desc) = task.description {
                println!("       {}", desc);
            }
            println!(
                "       created: {}",
                task.created_at.format("%Y-%m-%d %H:%M")
            );
            if let Some(done) = task.completed_at {
                println!("       completed: {}", done.format("%Y-%m-%d %H:%M"));
            }
        }
        Format::Minimal => println!("{}", minimal_row(task)),
    }
    Ok(())
}

pub fn truncate_title(title: &str, max_len: usize) -> String {
    if title.chars().count() > max_len {
        let truncated: String = title.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    } else {
        title.to_string()
    }
}

/// Print a list. `empty_message` is what pretty mode shows when nothing
/// is left to print.
pub fn print_tasks(
    tasks: &[&Task],
    format: Format,
    today: NaiveDate,
    empty_message: &str,
) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string(tasks)?),
        Format::Pretty => {
            if tasks.is_empty() {
                println!("{}", empty_message);
            }
            for task in tasks {
                println!("{}", task_line(task, today));
            }
        }
        Format::Minimal => {
            println!("{:>4} {:4} {:10} TITLE", "ID", "DONE", "DUE");
            println!("{}", "-".repeat(50));
            for task in tasks {
                println!("{}", minimal_row(task));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TaskList;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn truncate_keeps_short_titles() {
        assert_eq!(truncate_title("short", 12), "short");
        assert_eq!(truncate_title("a very long title here", 12), "a very lo...");
    }

    #[test]
    fn task_line_marks_state_and_overdue() {
        colored::control::set_override(false);
        let mut list = TaskList::new();
        list.add("Pay rent", None, Some(day(2025, 1, 1))).unwrap();
        list.add("Plan trip", None, None).unwrap();
        list.set_complete(2, true).unwrap();

        let today = day(2025, 2, 1);
        let open = task_line(list.get(1).unwrap(), today);
        assert!(open.starts_with("[ ]"));
        assert!(open.contains("Pay rent"));
        assert!(open.contains("2025-01-01 (overdue)"));

        let done = task_line(list.get(2).unwrap(), today);
        assert!(done.starts_with("[x]"));
        assert!(done.contains("no due date"));
    }

    #[test]
    fn minimal_row_aligns_columns() {
        let mut list = TaskList::new();
        list.add("Errand", None, Some(day(2025, 3, 4))).unwrap();
        let row = minimal_row(list.get(1).unwrap());
        assert!(row.starts_with("   1 "));
        assert!(row.contains("2025-03-04"));
        assert!(row.ends_with("Errand"));
    }
}
