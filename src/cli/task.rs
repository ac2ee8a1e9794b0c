//! tasklist task command implementations
//!
//! Every command goes through the same controller as the interactive list:
//! initial render from storage, then at most one user action.

use serde::Serialize;

use crate::error::Result;
use crate::output::{print_result, Message};
use crate::storage::FileStorage;
use crate::task::{Task, TaskState};
use crate::view::{Controller, RenderedItem, RenderedList};

use super::CliContext;

#[derive(Serialize)]
struct TaskReport {
    id: i64,
    text: String,
    completed: bool,
    state: TaskState,
    control: &'static str,
}

impl From<&Task> for TaskReport {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            text: task.text.clone(),
            completed: task.completed,
            state: task.state(),
            control: task.control_label(),
        }
    }
}

#[derive(Serialize)]
struct ListReport {
    tasks: Vec<TaskReport>,
    total: usize,
    completed: usize,
}

fn open_controller(ctx: &CliContext) -> Result<Controller<FileStorage, RenderedList>> {
    let mut controller = Controller::new(ctx.open_store()?, RenderedList::new());
    controller.start();
    Ok(controller)
}

fn item_line(item: &RenderedItem) -> String {
    let mark = if item.completed { "x" } else { " " };
    format!("[{mark}] {}  {}  ({})", item.id, item.text, item.control_label())
}

pub fn run_list(ctx: &CliContext) -> Result<()> {
    let controller = open_controller(ctx)?;
    let tasks = controller.tasks();
    let completed = tasks.iter().filter(|task| task.completed).count();
    let report = ListReport {
        tasks: tasks.iter().map(TaskReport::from).collect(),
        total: tasks.len(),
        completed,
    };

    let items = controller.surface().items();
    let mut message = if items.is_empty() {
        Message::new("No tasks")
    } else {
        Message::new(format!("Tasks ({})", items.len()))
            .field("active", items.len() - completed)
            .field("completed", completed)
    };
    for item in items {
        message.item(item_line(item));
    }

    print_result(ctx.output, "list", &report, &message)
}

pub fn run_add(ctx: &CliContext, text: &str) -> Result<()> {
    let mut controller = open_controller(ctx)?;
    controller.surface_mut().set_input(text);
    let task = controller.add()?;

    let message = Message::new(format!("Added task {}", task.id))
        .field("text", &task.text)
        .field("total", controller.tasks().len());
    print_result(ctx.output, "add", &TaskReport::from(&task), &message)
}

pub fn run_toggle(ctx: &CliContext, id: i64) -> Result<()> {
    let mut controller = open_controller(ctx)?;
    let task = controller.toggle(id)?;

    let verb = if task.completed { "Completed" } else { "Reopened" };
    let message = Message::new(format!("{verb} task {id}"))
        .field("text", &task.text)
        .field("control", task.control_label());
    print_result(ctx.output, "toggle", &TaskReport::from(&task), &message)
}

pub fn run_delete(ctx: &CliContext, id: i64) -> Result<()> {
    let mut controller = open_controller(ctx)?;
    let task = controller.delete(id)?;

    let message = Message::new(format!("Deleted task {id}"))
        .field("text", &task.text)
        .field("remaining", controller.tasks().len());
    print_result(ctx.output, "delete", &TaskReport::from(&task), &message)
}
