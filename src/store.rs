//! Task collection persistence
//!
//! The whole collection lives in a single key-value slot as a compact JSON
//! array. Every mutation is a whole-collection read-modify-write; there is no
//! index and no partial update.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::storage::KeyValueStore;
use crate::task::Task;

/// Default slot name for the task collection
pub const DEFAULT_KEY: &str = "tasks";

/// Task collection over a key-value slot
#[derive(Debug, Clone)]
pub struct TaskStore<S> {
    storage: S,
    key: String,
}

impl<S: KeyValueStore> TaskStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, DEFAULT_KEY)
    }

    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Read the collection, failing soft.
    ///
    /// Absent, blank, or unparseable values read as an empty collection.
    /// Entries that do not have the task shape are skipped.
    pub fn load(&self) -> Vec<Task> {
        let raw = match self.storage.get(&self.key) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key = %self.key, error = %err, "failed to read task collection");
                return Vec::new();
            }
        };
        let Some(raw) = raw else {
            return Vec::new();
        };
        if raw.trim().is_empty() {
            return Vec::new();
        }

        let entries = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(entries)) => entries,
            Ok(value) if is_falsy(&value) => return Vec::new(),
            Ok(other) => {
                warn!(key = %self.key, kind = value_kind(&other), "task collection is not an array");
                return Vec::new();
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "task collection is not valid JSON");
                return Vec::new();
            }
        };

        let mut tasks = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<Task>(entry) {
                Ok(task) => tasks.push(task),
                Err(err) => warn!(index, error = %err, "skipping malformed task entry"),
            }
        }
        tasks
    }

    /// Append a task and persist the whole collection.
    pub fn append(&mut self, task: &Task) -> Result<()> {
        let mut entries = self
            .read_entries()
            .map_err(|err| storage_error("save task", err))?;
        entries.push(serde_json::to_value(task)?);
        self.write_entries(&entries)
            .map_err(|err| storage_error("save task", err))?;
        debug!(id = task.id, total = entries.len(), "appended task");
        Ok(())
    }

    /// Replace the first entry whose id matches. Returns `false` (and writes
    /// nothing) when no entry matches.
    pub fn update_by_id(&mut self, task: &Task) -> Result<bool> {
        let mut entries = self
            .read_entries()
            .map_err(|err| storage_error("update task", err))?;
        let Some(index) = entries.iter().position(|entry| entry_id(entry) == Some(task.id)) else {
            debug!(id = task.id, "update skipped, task not persisted");
            return Ok(false);
        };
        entries[index] = serde_json::to_value(task)?;
        self.write_entries(&entries)
            .map_err(|err| storage_error("update task", err))?;
        debug!(id = task.id, completed = task.completed, "updated task");
        Ok(true)
    }

    /// Remove every entry with the id. Returns how many were removed.
    pub fn delete_by_id(&mut self, id: i64) -> Result<usize> {
        let entries = self
            .read_entries()
            .map_err(|err| storage_error("delete task", err))?;
        let before = entries.len();
        let remaining: Vec<Value> = entries
            .into_iter()
            .filter(|entry| entry_id(entry) != Some(id))
            .collect();
        let removed = before - remaining.len();
        self.write_entries(&remaining)
            .map_err(|err| storage_error("delete task", err))?;
        debug!(id, removed, "deleted task");
        Ok(removed)
    }

    /// Serialize and write a whole collection.
    pub fn persist(&mut self, tasks: &[Task]) -> Result<()> {
        let raw = serde_json::to_string(tasks)?;
        self.storage.set(&self.key, &raw)
    }

    fn write_entries(&mut self, entries: &[Value]) -> Result<()> {
        let raw = serde_json::to_string(entries)?;
        self.storage.set(&self.key, &raw)
    }

    /// Read the raw entries for a mutation.
    ///
    /// Entries pass through untouched whether or not they have the task
    /// shape. Falsy JSON (`null`, `false`, `0`, `""`) reads as empty; text
    /// that is not JSON, or a non-array value, is an error so the slot is
    /// never overwritten.
    fn read_entries(&self) -> Result<Vec<Value>> {
        let Some(raw) = self.storage.get(&self.key)? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&raw)? {
            Value::Array(entries) => Ok(entries),
            value if is_falsy(&value) => Ok(Vec::new()),
            other => Err(Error::Storage(format!(
                "task collection is a {}, not an array",
                value_kind(&other)
            ))),
        }
    }
}

fn entry_id(entry: &Value) -> Option<i64> {
    entry.get("id").and_then(Value::as_i64)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn storage_error(action: &str, err: Error) -> Error {
    match err {
        Error::Storage(message) => Error::Storage(format!("failed to {action}: {message}")),
        other @ Error::InvalidArgument(_) => other,
        other => Error::Storage(format!("failed to {action}: {other}")),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn task(id: i64, text: &str, completed: bool) -> Task {
        Task {
            id,
            text: text.to_string(),
            completed,
        }
    }

    fn store_with(raw: &str) -> TaskStore<MemoryStorage> {
        TaskStore::new(MemoryStorage::with_value(DEFAULT_KEY, raw))
    }

    #[test]
    fn load_absent_is_empty() {
        let store = TaskStore::new(MemoryStorage::new());
        assert!(store.load().is_empty());
    }

    #[test]
    fn load_corrupt_values_is_empty() {
        for raw in ["", "   ", "null", "{not json", "{\"id\":1}", "42", "\"tasks\""] {
            assert!(store_with(raw).load().is_empty(), "raw {raw:?}");
        }
    }

    #[test]
    fn load_skips_malformed_entries_and_keeps_order() {
        let store = store_with(
            r#"[{"id":3,"text":"c","completed":true},{"id":"x"},{"text":"no id"},{"id":1,"text":"a"}]"#,
        );
        let tasks = store.load();
        assert_eq!(tasks, vec![task(3, "c", true), task(1, "a", false)]);
    }

    #[test]
    fn load_does_not_transform_text() {
        let store = store_with(r#"[{"id":1,"text":"buy milk","completed":false}]"#);
        assert_eq!(store.load()[0].text, "buy milk");
    }

    #[test]
    fn append_writes_compact_array() {
        let mut store = TaskStore::new(MemoryStorage::new());
        store.append(&task(1, "A", false)).expect("append");
        let raw = store.storage().get(DEFAULT_KEY).expect("get").expect("slot");
        assert_eq!(raw, r#"[{"id":1,"text":"A","completed":false}]"#);
    }

    #[test]
    fn append_refuses_to_overwrite_corrupt_data() {
        let mut store = store_with("{not json");
        let err = store.append(&task(1, "A", false)).unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        let raw = store.storage().get(DEFAULT_KEY).expect("get").expect("slot");
        assert_eq!(raw, "{not json");
    }

    #[test]
    fn update_missing_id_writes_nothing() {
        let mut store = TaskStore::new(MemoryStorage::new());
        let updated = store.update_by_id(&task(9, "X", true)).expect("update");
        assert!(!updated);
        assert_eq!(store.storage().get(DEFAULT_KEY).expect("get"), None);
    }

    #[test]
    fn update_replaces_first_match() {
        let mut store = TaskStore::new(MemoryStorage::new());
        store
            .persist(&[task(1, "A", false), task(2, "B", false)])
            .expect("persist");
        assert!(store.update_by_id(&task(2, "B", true)).expect("update"));
        assert_eq!(store.load(), vec![task(1, "A", false), task(2, "B", true)]);
    }

    #[test]
    fn delete_removes_all_matches() {
        let mut store = TaskStore::new(MemoryStorage::new());
        store
            .persist(&[task(1, "A", false), task(2, "B", false), task(1, "C", true)])
            .expect("persist");
        assert_eq!(store.delete_by_id(1).expect("delete"), 2);
        assert_eq!(store.load(), vec![task(2, "B", false)]);
    }

    #[test]
    fn custom_key_is_used() {
        let mut store = TaskStore::with_key(MemoryStorage::new(), "todo");
        store.append(&task(1, "A", false)).expect("append");
        assert!(store.storage().get("todo").expect("get").is_some());
        assert!(store.storage().get(DEFAULT_KEY).expect("get").is_none());
    }

    #[test]
    fn mutations_keep_entries_load_skips() {
        let malformed = r#"{"id":2}"#;
        let raw = format!(r#"[{{"id":1,"text":"buy milk","completed":false}},{malformed}]"#);

        let mut store = store_with(&raw);
        store.append(&task(3, "C", false)).expect("append");
        assert!(store.update_by_id(&task(1, "BUY MILK", true)).expect("update"));
        assert_eq!(store.delete_by_id(3).expect("delete"), 1);

        let raw = store.storage().get(DEFAULT_KEY).expect("get").expect("slot");
        assert_eq!(
            raw,
            format!(r#"[{{"id":1,"text":"BUY MILK","completed":true}},{malformed}]"#)
        );
        assert_eq!(store.load(), vec![task(1, "BUY MILK", true)]);
    }

    #[test]
    fn entries_without_integer_id_never_match() {
        let raw = r#"[{"text":"no id"},{"id":"1","text":"string id"}]"#;
        let mut store = store_with(raw);
        assert!(!store.update_by_id(&task(1, "X", true)).expect("update"));
        assert_eq!(store.delete_by_id(1).expect("delete"), 0);
        let stored = store.storage().get(DEFAULT_KEY).expect("get").expect("slot");
        assert_eq!(stored, raw);
    }

    #[test]
    fn append_over_falsy_values_starts_fresh() {
        for raw in ["null", "false", "0", "0.0", "\"\""] {
            let mut store = store_with(raw);
            store.append(&task(1, "A", false)).expect("append");
            assert_eq!(store.load(), vec![task(1, "A", false)], "raw {raw:?}");
        }
    }

    #[test]
    fn append_refuses_non_array_values() {
        for raw in ["42", "true", "\"tasks\"", "{\"id\":1}"] {
            let mut store = store_with(raw);
            let err = store.append(&task(1, "A", false)).unwrap_err();
            assert!(matches!(err, Error::Storage(_)), "raw {raw:?}");
            let stored = store.storage().get(DEFAULT_KEY).expect("get").expect("slot");
            assert_eq!(stored, raw);
        }
    }
}
