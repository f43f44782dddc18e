use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use log::{debug, info};
use skiplist::{InsertResult, SkipList};

use crate::format::parse_record;
use crate::SnapshotError;

/// Counters reported by [`SnapshotReader::load_into`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Records that created a new entry.
    pub inserted: usize,
    /// Records whose key was already present (in the list or earlier in the
    /// file). The existing value was kept.
    pub duplicates: usize,
    /// Lines rejected as malformed or unparsable.
    pub skipped: usize,
}

/// Reads a snapshot line by line. Stops on EOF.
///
/// Malformed lines (empty, no delimiter, empty key or value) are skipped,
/// never reported as errors. Only I/O failures, including text that is not
/// valid UTF-8, abort a read.
pub struct SnapshotReader<R: Read> {
    rdr: BufReader<R>,
}

impl SnapshotReader<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<SnapshotReader<File>, SnapshotError> {
        let f = File::open(path)?;
        Ok(SnapshotReader {
            rdr: BufReader::new(f),
        })
    }
}

impl<R: Read> SnapshotReader<R> {
    pub fn from_reader(reader: R) -> Self {
        SnapshotReader {
            rdr: BufReader::new(reader),
        }
    }

    /// Calls `apply` with every well-formed `(key, value)` pair in file order.
    pub fn replay<F>(&mut self, mut apply: F) -> Result<(), SnapshotError>
    where
        F: FnMut(&str, &str),
    {
        self.scan(|key, value| {
            apply(key, value);
            true
        })
        .map(|_| ())
    }

    /// Inserts every record into `list` through the ordinary insert path.
    ///
    /// Keys and values are parsed with [`FromStr`]; a record that fails to
    /// parse counts as skipped. Keys already present are left untouched, so
    /// the first occurrence of a key wins. Node levels are drawn afresh; only
    /// the key/value set is restored.
    pub fn load_into<K, V>(&mut self, list: &SkipList<K, V>) -> Result<LoadStats, SnapshotError>
    where
        K: FromStr + Ord,
        V: FromStr,
    {
        let mut stats = LoadStats::default();
        let skipped = self.scan(|key, value| {
            let (Ok(k), Ok(v)) = (key.parse::<K>(), value.parse::<V>()) else {
                debug!("snapshot record with key {:?} did not parse", key);
                return false;
            };
            match list.insert(k, v) {
                InsertResult::Inserted => stats.inserted += 1,
                InsertResult::AlreadyExists => stats.duplicates += 1,
            }
            true
        })?;
        stats.skipped = skipped;

        info!(
            "loaded snapshot: {} inserted, {} duplicates, {} skipped",
            stats.inserted, stats.duplicates, stats.skipped
        );
        Ok(stats)
    }

    /// Feeds well-formed records to `accept` and returns how many lines were
    /// skipped, either malformed or refused by `accept`.
    fn scan<F>(&mut self, mut accept: F) -> Result<usize, SnapshotError>
    where
        F: FnMut(&str, &str) -> bool,
    {
        let mut skipped = 0usize;
        for (n, line) in (&mut self.rdr).lines().enumerate() {
            let line = line?;
            match parse_record(&line) {
                Some((key, value)) => {
                    if !accept(key, value) {
                        skipped += 1;
                    }
                }
                None => {
                    debug!("skipping malformed snapshot line {}", n + 1);
                    skipped += 1;
                }
            }
        }
        Ok(skipped)
    }
}
