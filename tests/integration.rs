use chrono::NaiveDate;
use tempfile::tempdir;

use todo::config::Backend;
use todo::error::TodoError;
use todo::model::{DueChange, Filter, TaskEdit};
use todo::output::Format;
use todo::store::repo::Repo;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn crud_workflow(backend: Backend) {
    let dir = tempdir().unwrap();
    let repo = Repo::init(dir.path(), backend).unwrap();

    let groceries = repo
        .mutate(|list| {
            list.add("Buy groceries", None, Some(day(2025, 11, 12)))
                .map(|t| t.id)
        })
        .unwrap();
    let report = repo
        .mutate(|list| {
            list.add("Write report", Some("Q3 numbers".into()), None)
                .map(|t| t.id)
        })
        .unwrap();
    let call = repo
        .mutate(|list| list.add("Call plumber", None, None).map(|t| t.id))
        .unwrap();
    assert_eq!((groceries, report, call), (1, 2, 3));

    repo.mutate(|list| list.set_complete(report, true).map(|_| ()))
        .unwrap();
    repo.mutate(|list| {
        list.edit(
            groceries,
            TaskEdit {
                title: Some("Buy groceries and milk".into()),
                due: DueChange::Clear,
                ..TaskEdit::default()
            },
        )
        .map(|_| ())
    })
    .unwrap();
    repo.mutate(|list| list.delete(call).map(|_| ())).unwrap();

    // A fresh handle sees exactly what was saved, in order.
    let reopened = Repo::open(dir.path()).unwrap();
    assert_eq!(reopened.backend(), backend);
    let list = reopened.load().unwrap();
    assert_eq!(list, repo.load().unwrap());

    let titles: Vec<&str> = list.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Buy groceries and milk", "Write report"]);
    assert_eq!(list.get(groceries).unwrap().due_date, None);
    assert!(list.get(report).unwrap().completed);
    assert!(list.get(call).is_none());

    // Deleted ids stay retired across sessions.
    let next = reopened
        .mutate(|list| list.add("Another", None, None).map(|t| t.id))
        .unwrap();
    assert_eq!(next, 4);
}

#[test]
fn crud_workflow_json_backend() {
    crud_workflow(Backend::Json);
}

#[test]
fn crud_workflow_sqlite_backend() {
    crud_workflow(Backend::Sqlite);
}

#[test]
fn edit_of_missing_task_leaves_storage_unchanged() {
    let dir = tempdir().unwrap();
    let repo = Repo::init(dir.path(), Backend::Json).unwrap();
    repo.mutate(|list| list.add("Only task", None, None).map(|_| ()))
        .unwrap();
    let before = std::fs::read_to_string(repo.dir().join("tasks.json")).unwrap();

    let err = repo.mutate(|list| {
        list.edit(
            99,
            TaskEdit {
                title: Some("ghost".into()),
                ..TaskEdit::default()
            },
        )
        .map(|_| ())
    });
    assert!(matches!(err, Err(TodoError::TaskNotFound(99))));

    let after = std::fs::read_to_string(repo.dir().join("tasks.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn overdue_filter_skips_completed_tasks() {
    let dir = tempdir().unwrap();
    let repo = Repo::init(dir.path(), Backend::Json).unwrap();
    repo.mutate(|list| {
        list.add("Late and open", None, Some(day(2024, 1, 1)))?;
        list.add("Late but done", None, Some(day(2024, 1, 1)))?;
        list.set_complete(2, true)?;
        Ok(())
    })
    .unwrap();

    let list = repo.load().unwrap();
    let overdue: Vec<u64> = list
        .filter(Filter::Overdue, day(2025, 1, 1))
        .iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(overdue, vec![1]);
}

#[test]
fn export_then_import_appends_with_fresh_ids() {
    let source_dir = tempdir().unwrap();
    let source = Repo::init(source_dir.path(), Backend::Json).unwrap();
    source
        .mutate(|list| {
            list.add("Exported one", None, None)?;
            list.add("Exported two", None, Some(day(2026, 5, 5)))?;
            list.toggle(2)?;
            Ok(())
        })
        .unwrap();

    let export_path = source_dir.path().join("backup.yaml");
    todo::commands::export::run(
        source_dir.path(),
        todo::commands::export::ExportFormat::Yaml,
        Some(&export_path),
    )
    .unwrap();

    let target_dir = tempdir().unwrap();
    let target = Repo::init(target_dir.path(), Backend::Sqlite).unwrap();
    target
        .mutate(|list| list.add("Already here", None, None).map(|_| ()))
        .unwrap();

    todo::commands::import::run(target_dir.path(), &export_path, Format::Json).unwrap();

    let list = target.load().unwrap();
    let summary: Vec<(u64, &str, bool)> = list
        .iter()
        .map(|t| (t.id, t.title.as_str(), t.completed))
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, "Already here", false),
            (2, "Exported one", false),
            (3, "Exported two", true),
        ]
    );
    assert_eq!(list.get(3).unwrap().due_date, Some(day(2026, 5, 5)));
}

#[test]
fn corrupt_json_store_surfaces_error() {
    let dir = tempdir().unwrap();
    let repo = Repo::init(dir.path(), Backend::Json).unwrap();
    std::fs::write(repo.dir().join("tasks.json"), "[{oops").unwrap();

    let err = repo.load().unwrap_err();
    assert_eq!(err.code(), "corrupt_store");
    assert!(matches!(
        repo.mutate(|list| list.add("x", None, None).map(|_| ())),
        Err(TodoError::CorruptStore(_, _))
    ));
}

#[test]
fn import_reads_task_array_from_older_tool() {
    let dir = tempdir().unwrap();
    let repo = Repo::init(dir.path(), Backend::Json).unwrap();
    let legacy = dir.path().join("todo_data.json");
    std::fs::write(
        &legacy,
        r#"[
  {
    "id": 1,
    "title": "Buy groceries",
    "due_date": "2025-11-12",
    "completed": false,
    "created_at": "2025-11-10T14:03:22.123456"
  },
  {
    "id": 3,
    "title": "Pay rent",
    "due_date": "",
    "completed": true,
    "created_at": "2025-11-10T14:07:45.000001"
  }
]"#,
    )
    .unwrap();

    todo::commands::import::run(dir.path(), &legacy, Format::Json).unwrap();

    let list = repo.load().unwrap();
    let summary: Vec<(u64, &str, bool, Option<NaiveDate>)> = list
        .iter()
        .map(|t| (t.id, t.title.as_str(), t.completed, t.due_date))
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, "Buy groceries", false, Some(day(2025, 11, 12))),
            (2, "Pay rent", true, None),
        ]
    );
    let rent = list.get(2).unwrap();
    assert_eq!(rent.updated_at, rent.created_at);
}

#[test]
fn import_refuses_newer_document_version() {
    let dir = tempdir().unwrap();
    let repo = Repo::init(dir.path(), Backend::Json).unwrap();
    let newer = dir.path().join("newer.json");
    std::fs::write(&newer, r#"{"version": 2, "next_id": 1, "tasks": []}"#).unwrap();

    let err = todo::commands::import::run(dir.path(), &newer, Format::Json).unwrap_err();
    assert!(matches!(err, TodoError::UnsupportedVersion(2)));
    assert!(repo.load().unwrap().is_empty());
}
