use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::error::{Error, Result};
use crate::storage::KeyValueStore;
use crate::store::TaskStore;
use crate::view::{Controller, RenderedItem, RenderedList, Surface};

use super::view;

const EVENT_POLL_MS: u64 = 120;

#[derive(Clone, Copy)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Focus {
    Input,
    List,
}

pub struct AppState<S> {
    controller: Controller<S, RenderedList>,
    pub(crate) focus: Focus,
    pub(crate) selected: Option<usize>,
    status_message: Option<String>,
    info_message: Option<String>,
}

impl<S: KeyValueStore> AppState<S> {
    pub fn new(controller: Controller<S, RenderedList>) -> Self {
        let mut app = Self {
            controller,
            focus: Focus::Input,
            selected: None,
            status_message: None,
            info_message: None,
        };
        app.clamp_selection();
        app
    }

    pub(crate) fn items(&self) -> &[RenderedItem] {
        self.controller.surface().items()
    }

    pub(crate) fn input(&self) -> String {
        self.controller.surface().input()
    }

    pub(crate) fn alert(&self) -> Option<&str> {
        self.controller.surface().pending_alert()
    }

    pub(crate) fn selected_item(&self) -> Option<&RenderedItem> {
        self.selected.and_then(|idx| self.items().get(idx))
    }

    pub(crate) fn status_line(&self) -> Option<(String, StatusKind)> {
        if let Some(message) = self.status_message.as_ref() {
            return Some((message.clone(), StatusKind::Error));
        }
        self.info_message
            .as_ref()
            .map(|info| (info.clone(), StatusKind::Info))
    }

    pub(crate) fn footer_hint(&self) -> &'static str {
        if self.alert().is_some() {
            return "any key dismiss";
        }
        match self.focus {
            Focus::Input => "enter add  tab list  ctrl-c quit",
            Focus::List => "j/k move  space complete/undo  d delete  tab input  q quit",
        }
    }

    pub(crate) fn task_count_summary(&self) -> String {
        let total = self.items().len();
        let completed = self.items().iter().filter(|item| item.completed).count();
        format!(
            "{total} tasks  {} active  {completed} completed",
            total - completed
        )
    }

    fn set_error(&mut self, message: String) {
        self.status_message = Some(message);
        self.info_message = None;
    }

    fn set_info(&mut self, message: String) {
        self.info_message = Some(message);
        self.status_message = None;
    }

    fn clamp_selection(&mut self) {
        let len = self.items().len();
        self.selected = match (len, self.selected) {
            (0, _) => None,
            (_, None) => Some(0),
            (len, Some(idx)) => Some(idx.min(len - 1)),
        };
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.items().len();
        if len == 0 {
            self.selected = None;
            return;
        }
        let current = self.selected.unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        self.selected = Some(next as usize);
    }

    fn add_task(&mut self) {
        match self.controller.add() {
            Ok(task) => {
                self.selected = Some(self.items().len().saturating_sub(1));
                self.set_info(format!("added {}", task.id));
            }
            // Already shown as an alert.
            Err(Error::Validation(_)) => {}
            Err(err) => {
                self.clamp_selection();
                self.set_error(err.to_string());
            }
        }
    }

    fn toggle_selected(&mut self) {
        let Some(id) = self.selected_item().map(|item| item.id) else {
            self.set_error("no task selected".to_string());
            return;
        };
        match self.controller.toggle(id) {
            Ok(task) if task.completed => self.set_info(format!("completed {id}")),
            Ok(_) => self.set_info(format!("reopened {id}")),
            Err(err) => self.set_error(err.to_string()),
        }
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.selected_item().map(|item| item.id) else {
            self.set_error("no task selected".to_string());
            return;
        };
        let result = self.controller.delete(id);
        self.clamp_selection();
        match result {
            Ok(_) => self.set_info(format!("deleted {id}")),
            Err(err) => self.set_error(err.to_string()),
        }
    }
}

pub fn run<S: KeyValueStore>(store: TaskStore<S>) -> Result<()> {
    let mut controller = Controller::new(store, RenderedList::new());
    controller.start();
    let mut app = AppState::new(controller);
    run_terminal(&mut app)
}

fn run_terminal<S: KeyValueStore>(app: &mut AppState<S>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop<S: KeyValueStore>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState<S>,
) -> Result<()> {
    let mut dirty = true;
    loop {
        if dirty {
            terminal.draw(|frame| view::render(frame, app))?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key(app, key) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(_, _) => dirty = true,
                _ => {}
            }
        }
    }
    Ok(())
}

/// Apply one key press. Returns `true` when the app should exit.
pub(crate) fn handle_key<S: KeyValueStore>(app: &mut AppState<S>, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if app.alert().is_some() {
        app.controller.surface_mut().dismiss_alert();
        return false;
    }

    if key.code == KeyCode::Tab {
        app.focus = match app.focus {
            Focus::Input => Focus::List,
            Focus::List => Focus::Input,
        };
        return false;
    }

    match app.focus {
        Focus::Input => match key.code {
            KeyCode::Enter => app.add_task(),
            KeyCode::Backspace => {
                app.controller.surface_mut().input_mut().pop();
            }
            KeyCode::Esc => app.focus = Focus::List,
            KeyCode::Char(ch) => app.controller.surface_mut().input_mut().push(ch),
            _ => {}
        },
        Focus::List => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
            KeyCode::Home | KeyCode::Char('g') => app.move_selection(isize::MIN / 2),
            KeyCode::End | KeyCode::Char('G') => app.move_selection(isize::MAX / 2),
            KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Char('c') => app.toggle_selected(),
            KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
            KeyCode::Char('a') | KeyCode::Char('i') => app.focus = Focus::Input,
            _ => {}
        },
    }
    false
}
