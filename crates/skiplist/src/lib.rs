//! # Skiplist
//!
//! The in-memory, ordered index at the heart of the skipkv store.
//!
//! Entries are kept in a probabilistic skip list: level 0 links every node in
//! ascending key order, and each higher level links a randomly thinned subset
//! of the level below it. Traversals start at the highest populated level and
//! drop down one level whenever the next key would overshoot.
//!
//! ```text
//! Level 3:  HEAD ─────────────────────────► 50 ──────────────► NIL
//! Level 2:  HEAD ──────────► 20 ──────────► 50 ──────────────► NIL
//! Level 1:  HEAD ──► 10 ──► 20 ────► 35 ──► 50 ──► 60 ────────► NIL
//! Level 0:  HEAD ──► 10 ──► 20 ──► 25 ──► 35 ──► 50 ──► 60 ──► 70 ──► NIL
//! ```
//!
//! ## Key properties
//! - **Sorted order**: level 0 is strictly ascending with no duplicate keys.
//! - **No overwrite**: inserting an existing key is a no-op that reports
//!   [`InsertResult::AlreadyExists`].
//! - **Geometric levels**: a new node reaches level `n` with probability
//!   `2^-n`, capped at the list's `max_level`.
//! - **Thread safe**: one reader-writer lock guards the whole list, so
//!   mutations are linearized and reads never see a partial splice.
//!
//! ## Example
//! ```rust
//! use skiplist::SkipList;
//!
//! let list = SkipList::new(6);
//! let _ = list.insert("b".to_string(), "2".to_string());
//! let _ = list.insert("a".to_string(), "1".to_string());
//!
//! let mut keys = Vec::new();
//! list.for_each(|k, _| keys.push(k.clone()));
//! assert_eq!(keys, ["a", "b"]);
//! ```

mod level;
mod list;
mod node;

pub use list::{DeleteResult, InsertResult, LevelsDisplay, SkipList, DEFAULT_MAX_LEVEL};
