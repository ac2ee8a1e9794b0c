//! View/controller: binds add, toggle, and delete triggers to the task store
//! and to a rendering surface.
//!
//! The [`Controller`] is the application context. It owns the store, the
//! surface, and the in-memory copies of the rendered tasks (one rendered item
//! per task, linked by id). Each handler updates the surface directly; there is
//! no full re-render after the initial one.

use serde::Serialize;
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::storage::KeyValueStore;
use crate::store::TaskStore;
use crate::task::{self, Clock, IdAllocator, SystemClock, Task, EMPTY_TASK_MESSAGE};

/// Something that can display tasks and collect user input.
pub trait Surface {
    /// Current contents of the task input.
    fn input(&self) -> String;

    fn clear_input(&mut self);

    /// Render a task at the end of the list.
    fn append_item(&mut self, task: &Task);

    fn remove_item(&mut self, id: i64);

    /// Flip an item's visual state and its complete/undo control label.
    fn set_item_completed(&mut self, id: i64, completed: bool);

    /// Blocking user-facing message.
    fn alert(&mut self, message: &str);
}

/// One rendered list item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedItem {
    pub id: i64,
    pub text: String,
    pub completed: bool,
}

impl RenderedItem {
    pub fn control_label(&self) -> &'static str {
        task::control_label(self.completed)
    }

    pub fn delete_label(&self) -> &'static str {
        task::LABEL_DELETE
    }
}

/// In-memory rendering surface.
#[derive(Debug, Clone, Default)]
pub struct RenderedList {
    items: Vec<RenderedItem>,
    input: String,
    alert: Option<String>,
}

impl RenderedList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[RenderedItem] {
        &self.items
    }

    pub fn item(&self, id: i64) -> Option<&RenderedItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    pub fn pending_alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) -> Option<String> {
        self.alert.take()
    }
}

impl Surface for RenderedList {
    fn input(&self) -> String {
        self.input.clone()
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn append_item(&mut self, task: &Task) {
        self.items.push(RenderedItem {
            id: task.id,
            text: task.text.clone(),
            completed: task.completed,
        });
    }

    fn remove_item(&mut self, id: i64) {
        if let Some(index) = self.items.iter().position(|item| item.id == id) {
            self.items.remove(index);
        }
    }

    fn set_item_completed(&mut self, id: i64, completed: bool) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.completed = completed;
        }
    }

    fn alert(&mut self, message: &str) {
        self.alert = Some(message.to_string());
    }
}

/// Application context: store + surface + in-memory tasks.
pub struct Controller<S, V> {
    store: TaskStore<S>,
    surface: V,
    tasks: Vec<Task>,
    ids: IdAllocator,
}

impl<S: KeyValueStore, V: Surface> Controller<S, V> {
    pub fn new(store: TaskStore<S>, surface: V) -> Self {
        Self::with_clock(store, surface, Box::new(SystemClock))
    }

    pub fn with_clock(store: TaskStore<S>, surface: V, clock: Box<dyn Clock>) -> Self {
        Self {
            store,
            surface,
            tasks: Vec::new(),
            ids: IdAllocator::new(clock),
        }
    }

    /// Initial render: load, uppercase each task's text, render in storage
    /// order. The uppercased copies are not written back.
    pub fn start(&mut self) {
        let loaded = self.store.load();
        debug!(count = loaded.len(), "rendering stored tasks");
        for stored in loaded {
            let task = stored.display_copy();
            self.ids.observe(task.id);
            self.surface.append_item(&task);
            self.tasks.push(task);
        }
    }

    /// Add a task from the surface input.
    ///
    /// Empty input raises an alert and returns [`Error::Validation`] without
    /// touching the list or storage. The task is rendered before it is
    /// persisted; when persisting fails the rendered item stays and the input
    /// is left as typed.
    pub fn add(&mut self) -> Result<Task> {
        let input = self.surface.input();
        if input.trim().is_empty() {
            self.surface.alert(EMPTY_TASK_MESSAGE);
            return Err(Error::Validation(EMPTY_TASK_MESSAGE.to_string()));
        }

        let task = Task::from_input(self.ids.next_id(), &input)?;
        self.surface.append_item(&task);
        self.tasks.push(task.clone());

        if let Err(err) = self.store.append(&task) {
            error!(id = task.id, error = %err, "error adding task");
            return Err(err);
        }
        self.surface.clear_input();
        debug!(id = task.id, "added task");
        Ok(task)
    }

    /// Flip a task between active and completed.
    ///
    /// The in-memory flag flips first; the rendered item only flips once the
    /// change is persisted.
    pub fn toggle(&mut self, id: i64) -> Result<Task> {
        let task = self
            .tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or(Error::TaskNotFound(id))?;
        task.toggle();
        let task = task.clone();

        if let Err(err) = self.store.update_by_id(&task) {
            error!(id, error = %err, "error updating task");
            return Err(err);
        }
        self.surface.set_item_completed(id, task.completed);
        debug!(id, completed = task.completed, "toggled task");
        Ok(task)
    }

    /// Remove a task from the list and from storage. Irreversible.
    pub fn delete(&mut self, id: i64) -> Result<Task> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or(Error::TaskNotFound(id))?;
        let task = self.tasks.remove(index);
        self.surface.remove_item(id);

        if let Err(err) = self.store.delete_by_id(id) {
            error!(id, error = %err, "error deleting task");
            return Err(err);
        }
        debug!(id, "deleted task");
        Ok(task)
    }

    /// In-memory tasks in render order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn surface(&self) -> &V {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut V {
        &mut self.surface
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::store::DEFAULT_KEY;

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now_millis(&self) -> i64 {
            self.0
        }
    }

    /// Storage whose writes always fail.
    #[derive(Default)]
    struct ReadOnlyStorage(MemoryStorage);

    impl KeyValueStore for ReadOnlyStorage {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Storage("quota exceeded".to_string()))
        }
    }

    fn controller(raw: Option<&str>) -> Controller<MemoryStorage, RenderedList> {
        let storage = match raw {
            Some(raw) => MemoryStorage::with_value(DEFAULT_KEY, raw),
            None => MemoryStorage::new(),
        };
        let mut controller = Controller::with_clock(
            TaskStore::new(storage),
            RenderedList::new(),
            Box::new(FixedClock(1_000)),
        );
        controller.start();
        controller
    }

    #[test]
    fn start_renders_in_storage_order_with_uppercase_text() {
        let controller = controller(Some(
            r#"[{"id":2,"text":"second","completed":true},{"id":1,"text":"first","completed":false}]"#,
        ));
        let items = controller.surface().items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text, "SECOND");
        assert_eq!(items[0].control_label(), "Undo");
        assert_eq!(items[1].text, "FIRST");
        assert_eq!(items[1].control_label(), "Complete");
    }

    #[test]
    fn start_does_not_rewrite_storage() {
        let raw = r#"[{"id":1,"text":"buy milk","completed":false}]"#;
        let controller = controller(Some(raw));
        let stored = controller.store().storage().get(DEFAULT_KEY).expect("get");
        assert_eq!(stored.as_deref(), Some(raw));
    }

    #[test]
    fn add_renders_persists_and_clears_input() {
        let mut controller = controller(None);
        controller.surface_mut().set_input("  read book ");
        let task = controller.add().expect("add");

        assert_eq!(task.text, "READ BOOK");
        assert_eq!(task.id, 1_000);
        assert_eq!(controller.surface().input(), "");
        assert_eq!(controller.surface().items().len(), 1);
        assert_eq!(controller.store().load(), vec![task]);
    }

    #[test]
    fn add_whitespace_alerts_and_changes_nothing() {
        let mut controller = controller(None);
        controller.surface_mut().set_input("  ");
        let err = controller.add().unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(controller.surface().pending_alert(), Some(EMPTY_TASK_MESSAGE));
        assert!(controller.surface().items().is_empty());
        assert_eq!(controller.surface().input(), "  ");
        assert!(controller.store().load().is_empty());
    }

    #[test]
    fn add_ids_follow_loaded_ids() {
        let mut controller = controller(Some(r#"[{"id":5000,"text":"a","completed":false}]"#));
        controller.surface_mut().set_input("b");
        let task = controller.add().expect("add");
        assert_eq!(task.id, 5001);
    }

    #[test]
    fn add_storage_failure_keeps_render_and_input() {
        let mut controller = Controller::with_clock(
            TaskStore::new(ReadOnlyStorage::default()),
            RenderedList::new(),
            Box::new(FixedClock(1)),
        );
        controller.start();
        controller.surface_mut().set_input("x");
        let err = controller.add().unwrap_err();

        assert!(err.is_storage());
        assert_eq!(controller.surface().items().len(), 1);
        assert_eq!(controller.surface().input(), "x");
    }

    #[test]
    fn toggle_flips_storage_and_label() {
        let mut controller = controller(None);
        controller.surface_mut().set_input("read book");
        let task = controller.add().expect("add");

        let toggled = controller.toggle(task.id).expect("toggle");
        assert!(toggled.completed);
        assert!(controller.store().load()[0].completed);
        assert_eq!(
            controller.surface().item(task.id).expect("item").control_label(),
            "Undo"
        );

        controller.toggle(task.id).expect("toggle back");
        assert!(!controller.store().load()[0].completed);
        assert_eq!(
            controller.surface().item(task.id).expect("item").control_label(),
            "Complete"
        );
    }

    #[test]
    fn toggle_persists_display_copy() {
        let mut controller = controller(Some(r#"[{"id":1,"text":"buy milk","completed":false}]"#));
        controller.toggle(1).expect("toggle");
        let stored = controller.store().load();
        assert_eq!(stored[0].text, "BUY MILK");
        assert!(stored[0].completed);
    }

    #[test]
    fn toggle_storage_failure_leaves_render_unchanged() {
        let storage = ReadOnlyStorage(MemoryStorage::with_value(
            DEFAULT_KEY,
            r#"[{"id":1,"text":"a","completed":false}]"#,
        ));
        let mut controller = Controller::new(TaskStore::new(storage), RenderedList::new());
        controller.start();

        assert!(controller.toggle(1).is_err());
        assert!(!controller.surface().item(1).expect("item").completed);
        assert!(controller.tasks()[0].completed);
    }

    #[test]
    fn delete_removes_item_and_entry() {
        let mut controller = controller(Some(
            r#"[{"id":1,"text":"a","completed":false},{"id":2,"text":"b","completed":false},{"id":3,"text":"c","completed":true}]"#,
        ));
        let removed = controller.delete(2).expect("delete");
        assert_eq!(removed.id, 2);

        let ids: Vec<i64> = controller.surface().items().iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![1, 3]);
        let stored: Vec<i64> = controller.store().load().iter().map(|task| task.id).collect();
        assert_eq!(stored, vec![1, 3]);
    }

    #[test]
    fn unknown_ids_are_reported() {
        let mut controller = controller(None);
        assert!(matches!(controller.toggle(42), Err(Error::TaskNotFound(42))));
        assert!(matches!(controller.delete(42), Err(Error::TaskNotFound(42))));
    }
}
