//! # Snapshot
//!
//! Flat-file snapshots of a [`skiplist::SkipList`].
//!
//! A snapshot is the list's level-0 chain written out in ascending key order,
//! one `key:value` record per line. Loading feeds each record back through
//! the ordinary [`SkipList::insert`] path, so node levels are drawn afresh and
//! duplicate keys keep their first value. The codec never touches the list's
//! internal links; it only uses `insert` and the ordered walk.
//!
//! Snapshots are a point-in-time copy, nothing more: there is no write-ahead
//! log, no checksum and no version marker.
//!
//! ## File layout
//!
//! ```text
//! 1:a
//! 2:b
//! url:http://example.com
//! ```
//!
//! Splitting happens on the first `:` only. Values may contain `:`; keys may
//! not, and neither may contain a line break.
//!
//! ## Example
//! ```rust,no_run
//! use skiplist::SkipList;
//!
//! let list = SkipList::new(12);
//! let _ = list.insert("1".to_string(), "a".to_string());
//! snapshot::dump("store/dumpFile", &list).unwrap();
//!
//! let fresh: SkipList<String, String> = SkipList::new(12);
//! snapshot::load("store/dumpFile", &fresh).unwrap();
//! assert_eq!(fresh.search("1"), Some("a".to_string()));
//! ```

use std::fmt::Display;
use std::io;
use std::path::Path;
use std::str::FromStr;

use skiplist::SkipList;
use thiserror::Error;

pub mod format;
mod reader;
mod writer;

pub use format::DELIMITER;
pub use reader::{LoadStats, SnapshotReader};
pub use writer::SnapshotWriter;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Writes `list` to `path`. See [`SnapshotWriter::dump`].
pub fn dump<P, K, V>(path: P, list: &SkipList<K, V>) -> Result<usize, SnapshotError>
where
    P: AsRef<Path>,
    K: Display,
    V: Display,
{
    SnapshotWriter::dump(path, list)
}

/// Loads the snapshot at `path` into `list`. See [`SnapshotReader::load_into`].
pub fn load<P, K, V>(path: P, list: &SkipList<K, V>) -> Result<LoadStats, SnapshotError>
where
    P: AsRef<Path>,
    K: FromStr + Ord,
    V: FromStr,
{
    SnapshotReader::open(path)?.load_into(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    fn entries<K: Clone, V: Clone>(list: &SkipList<K, V>) -> Vec<(K, V)> {
        let mut out = Vec::new();
        list.for_each(|k, v| out.push((k.clone(), v.clone())));
        out
    }

    #[test]
    fn dump_then_load_restores_pairs() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("dumpFile");

        let list = SkipList::new(6);
        let _ = list.insert("1".to_string(), "a".to_string());
        let _ = list.insert("2".to_string(), "b".to_string());
        dump(&path, &list)?;

        let fresh: SkipList<String, String> = SkipList::new(6);
        let stats = load(&path, &fresh)?;
        assert_eq!(stats.inserted, 2);
        assert_eq!(fresh.search("1"), Some("a".to_string()));
        assert_eq!(fresh.search("2"), Some("b".to_string()));
        assert_eq!(fresh.len(), 2);
        Ok(())
    }

    #[test]
    fn round_trip_of_large_list() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("dumpFile");

        let list = SkipList::with_seed(16, 1);
        for i in (0..2_000u32).rev() {
            let _ = list.insert(format!("key{:05}", i), format!("val:{}", i));
        }
        assert_eq!(dump(&path, &list)?, 2_000);

        let fresh: SkipList<String, String> = SkipList::with_seed(16, 2);
        load(&path, &fresh)?;
        assert_eq!(entries(&fresh), entries(&list));
        Ok(())
    }

    #[test]
    fn numeric_keys_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nums");

        let list = SkipList::new(8);
        for i in [30u64, 10, 20] {
            let _ = list.insert(i, -(i as i32));
        }
        dump(&path, &list)?;
        assert_eq!(fs::read_to_string(&path)?, "10:-10\n20:-20\n30:-30\n");

        let fresh: SkipList<u64, i32> = SkipList::new(8);
        load(&path, &fresh)?;
        assert_eq!(entries(&fresh), entries(&list));
        Ok(())
    }

    #[test]
    fn loading_twice_is_idempotent() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("dumpFile");
        fs::write(&path, "a:1\nb:2\n")?;

        let list: SkipList<String, String> = SkipList::new(6);
        load(&path, &list)?;
        let again = load(&path, &list)?;
        assert_eq!(again.inserted, 0);
        assert_eq!(again.duplicates, 2);
        assert_eq!(list.len(), 2);
        Ok(())
    }

    #[test]
    fn bad_lines_do_not_change_size() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("dumpFile");
        fs::write(&path, "foo\n:bar\n")?;

        let list: SkipList<String, String> = SkipList::new(6);
        let stats = load(&path, &list)?;
        assert_eq!(stats.skipped, 2);
        assert_eq!(list.len(), 0);
        Ok(())
    }

    #[test]
    fn load_missing_file_leaves_list_untouched() {
        let dir = tempdir().unwrap();
        let list = SkipList::new(6);
        let _ = list.insert("k".to_string(), "v".to_string());

        let res = load(dir.path().join("absent"), &list);
        assert!(matches!(res, Err(SnapshotError::Io(_))));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn delimiter_in_key_does_not_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("dumpFile");

        let list = SkipList::new(6);
        let _ = list.insert("a:b".to_string(), "v".to_string());
        dump(&path, &list)?;

        let fresh: SkipList<String, String> = SkipList::new(6);
        load(&path, &fresh)?;
        assert_eq!(fresh.search("a:b"), None);
        assert_eq!(fresh.search("a"), Some("b:v".to_string()));
        Ok(())
    }
}
