//! tasklist - a small persistent task list
//!
//! Users add, complete, and delete short text tasks. The collection is kept in
//! a single key-value slot as a JSON array and re-rendered on start.
//!
//! # Core Concepts
//!
//! - **Task**: id (creation timestamp), uppercased text, completion flag
//! - **Store**: whole-collection read-modify-write over a key-value slot
//! - **Controller**: binds add / complete-undo / delete triggers to the store
//!   and to a rendering surface
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `tasklist.toml`
//! - `error`: Error types and result aliases
//! - `output`: Human and JSON output for CLI commands
//! - `storage`: Key-value storage providers (memory, files)
//! - `store`: Task collection persistence
//! - `task`: The task record and id allocation
//! - `ui`: Interactive terminal list
//! - `view`: Rendering surface trait and the controller
//! - `web`: Browser localStorage provider (feature `web`)

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod storage;
pub mod store;
pub mod task;
pub mod ui;
pub mod view;
#[cfg(feature = "web")]
pub mod web;

pub use error::{Error, Result};
pub use store::TaskStore;
pub use task::Task;
pub use view::{Controller, RenderedList, Surface};
