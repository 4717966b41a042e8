use std::io;
use std::path::Path;
use std::time::Duration as StdDuration;

use chrono::NaiveDate;
use crossterm::ExecutableCommand;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use tracing::{debug, warn};

use crate::dates;
use crate::error::Result;
use crate::model::{Filter, Task, TaskEdit, TaskList};
use crate::store::repo::Repo;

const TICK_RATE: StdDuration = StdDuration::from_millis(250);

/// A change the UI asks the loop to perform against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    Reload,
    Add(String),
    Rename(u64, String),
    Toggle(u64),
    Delete(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Normal,
    Input { target: InputTarget, buffer: String },
    ConfirmDelete(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputTarget {
    Add,
    Rename(u64),
}

#[derive(Debug, Clone)]
struct TodoTuiApp {
    list: TaskList,
    today: NaiveDate,
    filter: Filter,
    selected: usize,
    mode: Mode,
    help_visible: bool,
    status: Option<String>,
    last_error: Option<String>,
}

impl TodoTuiApp {
    fn new(list: TaskList, today: NaiveDate) -> Self {
        Self {
            list,
            today,
            filter: Filter::All,
            selected: 0,
            mode: Mode::Normal,
            help_visible: false,
            status: None,
            last_error: None,
        }
    }

    fn visible(&self) -> Vec<&Task> {
        self.list.filter(self.filter, self.today)
    }

    fn selected_task(&self) -> Option<&Task> {
        self.visible().get(self.selected).copied()
    }

    fn replace_list(&mut self, list: TaskList) {
        self.list = list;
        self.normalize_selection();
    }

    fn normalize_selection(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        if delta.is_negative() {
            self.selected = self.selected.saturating_sub(delta.unsigned_abs());
        } else {
            self.selected = self
                .selected
                .saturating_add(delta as usize)
                .min(len.saturating_sub(1));
        }
    }

    fn cycle_filter(&mut self, forward: bool) {
        let count = Filter::ALL.len();
        let idx = self.filter_index();
        let next = if forward {
            (idx + 1) % count
        } else {
            (idx + count - 1) % count
        };
        self.filter = Filter::ALL[next];
        self.selected = 0;
    }

    fn filter_index(&self) -> usize {
        Filter::ALL
            .iter()
            .position(|f| *f == self.filter)
            .unwrap_or(0)
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Action::Quit);
        }

        match self.mode.clone() {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Input { target, buffer } => self.handle_input_key(key, target, buffer),
            Mode::ConfirmDelete(id) => {
                self.mode = Mode::Normal;
                match key.code {
                    KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::Delete(id)),
                    _ => {
                        self.status = Some("delete cancelled".into());
                        None
                    }
                }
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Some(Action::Quit),
            KeyCode::Char('?') => self.help_visible = !self.help_visible,
            KeyCode::Char('r') => return Some(Action::Reload),
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => self.cycle_filter(true),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => self.cycle_filter(false),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Home | KeyCode::Char('g') => self.selected = 0,
            KeyCode::End | KeyCode::Char('G') => {
                self.selected = self.visible().len().saturating_sub(1);
            }
            KeyCode::Char('a') => {
                self.mode = Mode::Input {
                    target: InputTarget::Add,
                    buffer: String::new(),
                };
            }
            KeyCode::Char('e') => {
                if let Some((id, title)) = self.selected_task().map(|t| (t.id, t.title.clone())) {
                    self.mode = Mode::Input {
                        target: InputTarget::Rename(id),
                        buffer: title,
                    };
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                return self.selected_task().map(|t| Action::Toggle(t.id));
            }
            KeyCode::Char('x') | KeyCode::Delete => {
                if let Some(id) = self.selected_task().map(|t| t.id) {
                    self.mode = Mode::ConfirmDelete(id);
                }
            }
            _ => {}
        }
        None
    }

    fn handle_input_key(
        &mut self,
        key: KeyEvent,
        target: InputTarget,
        mut buffer: String,
    ) -> Option<Action> {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                None
            }
            KeyCode::Enter => {
                self.mode = Mode::Normal;
                let text = buffer.trim().to_string();
                if text.is_empty() {
                    self.status = Some("title cannot be empty".into());
                    return None;
                }
                Some(match target {
                    InputTarget::Add => Action::Add(text),
                    InputTarget::Rename(id) => Action::Rename(id, text),
                })
            }
            KeyCode::Backspace => {
                buffer.pop();
                self.mode = Mode::Input { target, buffer };
                None
            }
            KeyCode::Char(ch) => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT)
                {
                    buffer.push(ch);
                }
                self.mode = Mode::Input { target, buffer };
                None
            }
            _ => None,
        }
    }

    fn task_row(&self, task: &Task) -> String {
        let check = if task.completed { "[x]" } else { "[ ]" };
        let due = match task.due_date {
            Some(d) if task.is_overdue(self.today) => format!("  (overdue {d})"),
            Some(d) => format!("  (due {d})"),
            None => String::new(),
        };
        format!("{check} {:>3} {}{due}", task.id, task.title)
    }

    fn task_detail(&self, task: &Task) -> String {
        let mut lines = vec![
            format!("id: {}", task.id),
            format!("title: {}", task.title),
            format!(
                "status: {}",
                if task.completed { "completed" } else { "open" }
            ),
            format!(
                "due: {}",
                task.due_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "no due date".into())
            ),
            format!("created: {}", task.created_at.format("%Y-%m-%d %H:%M")),
            format!("updated: {}", task.updated_at.format("%Y-%m-%d %H:%M")),
        ];
        if let Some(done) = task.completed_at {
            lines.push(format!("completed: {}", done.format("%Y-%m-%d %H:%M")));
        }
        if let Some(ref desc) = task.description {
            lines.push(String::new());
            lines.push(desc.clone());
        }
        lines.join("\n")
    }

    fn footer(&self) -> (String, &'static str) {
        match &self.mode {
            Mode::Input {
                target: InputTarget::Add,
                buffer,
            } => (format!("new task: {buffer}_"), "Add (Enter save, Esc cancel)"),
            Mode::Input {
                target: InputTarget::Rename(id),
                buffer,
            } => (
                format!("task {id}: {buffer}_"),
                "Edit title (Enter save, Esc cancel)",
            ),
            Mode::ConfirmDelete(id) => (format!("delete task {id}? (y/n)"), "Confirm"),
            Mode::Normal => {
                let mut line = "q quit | j/k move | Tab filter | space toggle | a add | e edit | x delete | r reload | ? help".to_string();
                if let Some(err) = &self.last_error {
                    line.push_str(&format!(" | error: {err}"));
                } else if let Some(status) = &self.status {
                    line.push_str(&format!(" | {status}"));
                }
                (line, "Controls")
            }
        }
    }

    fn render(&self, frame: &mut Frame) {
        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let open = self.list.iter().filter(|t| !t.completed).count();
        let tab_titles = Filter::ALL
            .iter()
            .map(|f| Line::from(f.label()))
            .collect::<Vec<_>>();
        frame.render_widget(
            Tabs::new(tab_titles)
                .select(self.filter_index())
                .block(Block::default().borders(Borders::ALL).title(format!(
                    "todo ({open} open / {} total)",
                    self.list.len()
                )))
                .highlight_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
            outer[0],
        );

        let center = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(outer[1]);

        self.render_list(frame, center[0]);

        let detail = self
            .selected_task()
            .map(|t| self.task_detail(t))
            .unwrap_or_default();
        frame.render_widget(
            Paragraph::new(detail)
                .block(Block::default().borders(Borders::ALL).title("Detail"))
                .wrap(Wrap { trim: false }),
            center[1],
        );

        let (footer, footer_title) = self.footer();
        frame.render_widget(
            Paragraph::new(footer)
                .block(Block::default().borders(Borders::ALL).title(footer_title))
                .wrap(Wrap { trim: true }),
            outer[2],
        );

        if self.help_visible {
            let popup = centered_rect(60, 60, frame.area());
            frame.render_widget(Clear, popup);
            frame.render_widget(
                Paragraph::new(
                    "todo tui controls\n\n\
                     - Up/Down, j/k: move selection\n\
                     - Tab / Shift+Tab, h/l: switch filter\n\
                     - Space / Enter: toggle complete\n\
                     - a: add a task\n\
                     - e: edit the selected title\n\
                     - x: delete (confirm with y)\n\
                     - r: reload from disk\n\
                     - q / Esc: quit\n\
                     - ?: toggle this help",
                )
                .block(Block::default().borders(Borders::ALL).title("Help"))
                .wrap(Wrap { trim: true }),
                popup,
            );
        }
    }

    fn render_list(&self, frame: &mut Frame, area: Rect) {
        let title = format!("Tasks: {}", self.filter.label());
        let visible = self.visible();
        if visible.is_empty() {
            let message = if self.list.is_empty() {
                "No tasks found. Press 'a' to add one."
            } else {
                "No tasks match that filter."
            };
            frame.render_widget(
                Paragraph::new(message)
                    .block(Block::default().borders(Borders::ALL).title(title))
                    .wrap(Wrap { trim: true }),
                area,
            );
            return;
        }

        let mut state = ListState::default();
        state.select(Some(self.selected));

        let items = visible
            .iter()
            .map(|task| {
                let style = if task.completed {
                    Style::default().fg(Color::DarkGray)
                } else if task.is_overdue(self.today) {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default()
                };
                ListItem::new(self.task_row(task)).style(style)
            })
            .collect::<Vec<_>>();

        frame.render_stateful_widget(
            List::new(items)
                .block(Block::default().borders(Borders::ALL).title(title))
                .highlight_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
                .highlight_symbol("❯ "),
            area,
            &mut state,
        );
    }
}

/// Perform `action` against the store; returns a status line for the footer.
fn apply(repo: &Repo, action: &Action) -> Result<String> {
    match action {
        Action::Quit | Action::Reload => Ok("reloaded".into()),
        Action::Add(title) => {
            let id = repo.mutate(|list| list.add(title, None, None).map(|t| t.id))?;
            Ok(format!("added task {id}"))
        }
        Action::Rename(id, title) => {
            let edit = TaskEdit {
                title: Some(title.clone()),
                ..TaskEdit::default()
            };
            repo.mutate(|list| list.edit(*id, edit).map(|_| ()))?;
            Ok(format!("renamed task {id}"))
        }
        Action::Toggle(id) => {
            let completed = repo.mutate(|list| list.toggle(*id).map(|t| t.completed))?;
            Ok(format!(
                "task {id} marked {}",
                if completed { "completed" } else { "incomplete" }
            ))
        }
        Action::Delete(id) => {
            repo.mutate(|list| list.delete(*id).map(|_| ()))?;
            Ok(format!("deleted task {id}"))
        }
    }
}

pub fn run(repo_root: &Path) -> Result<()> {
    let repo = Repo::open(repo_root)?;
    let mut app = TodoTuiApp::new(repo.load()?, dates::today());

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = run_loop(&mut terminal, &mut app, &repo);

    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}

fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut TodoTuiApp,
    repo: &Repo,
) -> Result<()> {
    loop {
        terminal
            .draw(|frame| app.render(frame))
            .map_err(|err| std::io::Error::other(err.to_string()))?;

        if !event::poll(TICK_RATE)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        let Some(action) = app.handle_key(key) else {
            continue;
        };
        if action == Action::Quit {
            break;
        }

        debug!(?action, "tui action");
        match apply(repo, &action) {
            Ok(status) => {
                app.status = Some(status);
                app.last_error = None;
            }
            Err(err) => {
                warn!(%err, "tui action failed");
                app.last_error = Some(err.to_string());
            }
        }
        match repo.load() {
            Ok(list) => app.replace_list(list),
            Err(err) => app.last_error = Some(err.to_string()),
        }
        app.today = dates::today();
    }

    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
