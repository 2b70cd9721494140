//! # pomni-memory
//!
//! Persistent task store for Pomni (SQLite-backed).

pub mod store;

pub use store::{PrefixMatch, Store, Task, TaskOwner};
