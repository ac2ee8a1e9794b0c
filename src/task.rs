//! The task record and the small amount of logic that belongs to it.
//!
//! A task is a fixed-shape record: integer id, display text, completion flag.
//! Text is trimmed and uppercased when a task is created from user input; tasks
//! read back from storage get a display copy with uppercased text, but that
//! copy is never written back on load.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Message shown when the user submits an empty task.
pub const EMPTY_TASK_MESSAGE: &str = "Please enter a task.";

/// Control label for an active task.
pub const LABEL_COMPLETE: &str = "Complete";
/// Control label for a completed task.
pub const LABEL_UNDO: &str = "Undo";
/// Control label for the delete control.
pub const LABEL_DELETE: &str = "Delete";

/// A single task as persisted: `{"id": .., "text": .., "completed": ..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

/// UI-visible state of a task. Deletion is terminal and has no state here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Active,
    Completed,
}

impl Task {
    /// Build a new task from raw user input.
    ///
    /// Fails with [`Error::Validation`] when the input is empty or
    /// whitespace-only.
    pub fn from_input(id: i64, input: &str) -> Result<Self> {
        let text = input.trim();
        if text.is_empty() {
            return Err(Error::Validation(EMPTY_TASK_MESSAGE.to_string()));
        }
        Ok(Self {
            id,
            text: normalize_text(text),
            completed: false,
        })
    }

    /// In-memory copy used for display after loading. Idempotent.
    pub fn display_copy(&self) -> Self {
        Self {
            id: self.id,
            text: normalize_text(&self.text),
            completed: self.completed,
        }
    }

    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }

    pub fn state(&self) -> TaskState {
        if self.completed {
            TaskState::Completed
        } else {
            TaskState::Active
        }
    }

    /// Label of the complete/undo control for the current state.
    pub fn control_label(&self) -> &'static str {
        control_label(self.completed)
    }
}

pub fn control_label(completed: bool) -> &'static str {
    if completed {
        LABEL_UNDO
    } else {
        LABEL_COMPLETE
    }
}

pub fn normalize_text(text: &str) -> String {
    text.to_uppercase()
}

/// Source of creation timestamps used as task ids.
pub trait Clock {
    fn now_millis(&self) -> i64;
}

/// Wall clock in milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Hands out monotonically increasing ids from a clock.
///
/// Two requests inside the same millisecond still get distinct ids.
pub struct IdAllocator {
    clock: Box<dyn Clock>,
    last: Option<i64>,
}

impl IdAllocator {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self { clock, last: None }
    }

    /// Never hand out an id at or below `id` (e.g. the largest loaded id).
    pub fn observe(&mut self, id: i64) {
        self.last = Some(self.last.map_or(id, |last| last.max(id)));
    }

    pub fn next_id(&mut self) -> i64 {
        let now = self.clock.now_millis();
        let id = match self.last {
            Some(last) if now <= last => last.saturating_add(1),
            _ => now,
        };
        self.last = Some(id);
        id
    }
}

impl std::fmt::Debug for IdAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdAllocator")
            .field("last", &self.last)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClock(i64);

    impl Clock for FixedClock {
        fn now_millis(&self) -> i64 {
            self.0
        }
    }

    #[test]
    fn from_input_trims_and_uppercases() {
        let task = Task::from_input(7, "  read book \n").expect("task");
        assert_eq!(task.id, 7);
        assert_eq!(task.text, "READ BOOK");
        assert!(!task.completed);
    }

    #[test]
    fn from_input_rejects_whitespace() {
        for input in ["", "   ", "\t\n"] {
            let err = Task::from_input(1, input).unwrap_err();
            assert!(matches!(err, Error::Validation(ref msg) if msg == EMPTY_TASK_MESSAGE));
        }
    }

    #[test]
    fn display_copy_is_idempotent() {
        let task = Task {
            id: 1,
            text: "buy milk".to_string(),
            completed: true,
        };
        let once = task.display_copy();
        assert_eq!(once.text, "BUY MILK");
        assert_eq!(once.display_copy(), once);
        assert_eq!(task.text, "buy milk");
    }

    #[test]
    fn toggle_twice_restores_state() {
        let mut task = Task::from_input(1, "x").expect("task");
        let original = task.clone();
        task.toggle();
        assert_eq!(task.state(), TaskState::Completed);
        assert_eq!(task.control_label(), LABEL_UNDO);
        task.toggle();
        assert_eq!(task, original);
        assert_eq!(task.control_label(), LABEL_COMPLETE);
    }

    #[test]
    fn serializes_in_field_order() {
        let task = Task {
            id: 1,
            text: "BUY MILK".to_string(),
            completed: false,
        };
        let raw = serde_json::to_string(&task).expect("json");
        assert_eq!(raw, r#"{"id":1,"text":"BUY MILK","completed":false}"#);
    }

    #[test]
    fn ids_stay_unique_within_one_millisecond() {
        let mut ids = IdAllocator::new(Box::new(FixedClock(100)));
        assert_eq!(ids.next_id(), 100);
        assert_eq!(ids.next_id(), 101);
        assert_eq!(ids.next_id(), 102);
    }

    #[test]
    fn ids_start_above_observed() {
        let mut ids = IdAllocator::new(Box::new(FixedClock(5)));
        ids.observe(50);
        ids.observe(10);
        assert_eq!(ids.next_id(), 51);
    }
}
