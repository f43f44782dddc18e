use std::borrow::Borrow;
use std::convert::Infallible;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{debug, trace};

use crate::level::LevelGenerator;
use crate::node::{Arena, Node, NodeId, Position};

/// Level bound used by [`SkipList::default`].
pub const DEFAULT_MAX_LEVEL: usize = 16;

/// Outcome of [`SkipList::insert`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// The key was absent and has been added.
    Inserted,
    /// The key was already present. The stored value is left untouched.
    AlreadyExists,
}

/// Outcome of [`SkipList::delete`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteResult {
    Deleted,
    NotFound,
}

/// An ordered key-value index backed by a probabilistic skip list.
///
/// Every node appears on level 0; a node drawn at level `L` additionally
/// appears on levels `1..=L`, so higher levels are randomly thinned
/// subsequences of the ones below. Lookups descend from the highest populated
/// level, giving expected `O(log n)` insert, search and delete.
///
/// # Concurrency
///
/// All state sits behind a single [`RwLock`]. Mutations (`insert`, `delete`,
/// `clear`) take the write lock for their whole traversal; reads take the
/// read lock, so a reader never observes a half-spliced node. Every method
/// takes `&self`; share a list between threads with `Arc<SkipList<K, V>>`.
///
/// # Example
///
/// ```rust
/// use skiplist::{DeleteResult, InsertResult, SkipList};
///
/// let list = SkipList::new(8);
/// assert_eq!(list.insert(3, "c"), InsertResult::Inserted);
/// assert_eq!(list.insert(1, "a"), InsertResult::Inserted);
/// assert_eq!(list.insert(1, "z"), InsertResult::AlreadyExists);
///
/// assert_eq!(list.search(&1), Some("a"));
/// assert_eq!(list.delete(&3), DeleteResult::Deleted);
/// assert_eq!(list.len(), 1);
/// ```
pub struct SkipList<K, V> {
    max_level: usize,
    inner: RwLock<Inner<K, V>>,
}

struct Inner<K, V> {
    /// Header links, one per level `0..=max_level`.
    head: Box<[Option<NodeId>]>,
    nodes: Arena<K, V>,
    /// Highest level with a non-empty header link, 0 when empty.
    level: usize,
    len: usize,
    levels: LevelGenerator,
}

impl<K, V> SkipList<K, V> {
    /// Creates an empty list whose nodes never rise above `max_level`.
    ///
    /// # Panics
    ///
    /// Panics if `max_level` is zero.
    pub fn new(max_level: usize) -> Self {
        assert!(max_level > 0, "max_level must be at least 1");
        Self::with_generator(max_level, LevelGenerator::new(max_level))
    }

    /// Like [`new`](SkipList::new) but with a seeded level generator, so the
    /// internal shape is reproducible for a given sequence of operations.
    ///
    /// # Panics
    ///
    /// Panics if `max_level` is zero.
    pub fn with_seed(max_level: usize, seed: u64) -> Self {
        assert!(max_level > 0, "max_level must be at least 1");
        Self::with_generator(max_level, LevelGenerator::with_seed(max_level, seed))
    }

    fn with_generator(max_level: usize, levels: LevelGenerator) -> Self {
        Self {
            max_level,
            inner: RwLock::new(Inner {
                head: vec![None; max_level + 1].into_boxed_slice(),
                nodes: Arena::new(),
                level: 0,
                len: 0,
                levels,
            }),
        }
    }

    /// The tallest level any node may reach.
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// The highest level currently populated, or 0 for an empty list.
    pub fn current_level(&self) -> usize {
        self.read().level
    }

    /// Number of entries. O(1).
    pub fn len(&self) -> usize {
        self.read().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every entry and resets the list to its freshly constructed state.
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.nodes.clear();
        inner.head.iter_mut().for_each(|link| *link = None);
        inner.level = 0;
        inner.len = 0;
        debug!("skiplist cleared");
    }

    /// Visits every entry in ascending key order, stopping at the first error.
    ///
    /// The read lock is held for the whole walk, so the visited entries form a
    /// consistent point-in-time view. `f` must not call back into a mutating
    /// method of the same list.
    pub fn try_for_each<E, F>(&self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&K, &V) -> Result<(), E>,
    {
        let inner = self.read();
        let mut cursor = inner.head[0];
        while let Some(id) = cursor {
            let node = inner.nodes.get(id);
            f(&node.key, &node.value)?;
            cursor = node.forward[0];
        }
        Ok(())
    }

    /// Visits every entry in ascending key order.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &V),
    {
        let walked: Result<(), Infallible> = self.try_for_each(|k, v| {
            f(k, v);
            Ok(())
        });
        if let Err(never) = walked {
            match never {}
        }
    }

    /// Returns a value that renders every level, highest first, when
    /// formatted. Nothing is read until it is actually formatted.
    pub fn display(&self) -> LevelsDisplay<'_, K, V> {
        LevelsDisplay { list: self }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner<K, V>> {
        // links are only rewritten after every fallible step, so a poisoned
        // guard still protects a well-formed list
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner<K, V>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K: Ord, V> SkipList<K, V> {
    /// Inserts `key` with `value` unless the key is already present.
    ///
    /// Existing entries are never overwritten: a duplicate key reports
    /// [`InsertResult::AlreadyExists`] and drops the new `value`.
    pub fn insert(&self, key: K, value: V) -> InsertResult {
        self.write().insert(key, value)
    }

    /// Returns a clone of the value stored under `key`.
    pub fn search<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        V: Clone,
    {
        let inner = self.read();
        inner.find(key).map(|id| inner.nodes.get(id).value.clone())
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.read().find(key).is_some()
    }

    /// Unlinks `key` from every level it appears on.
    pub fn delete<Q>(&self, key: &Q) -> DeleteResult
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.write().delete(key)
    }
}

impl<K, V> Default for SkipList<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEVEL)
    }
}

impl<K, V> fmt::Debug for SkipList<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.read();
        f.debug_struct("SkipList")
            .field("max_level", &self.max_level)
            .field("current_level", &inner.level)
            .field("len", &inner.len)
            .finish()
    }
}

impl<K, V> Inner<K, V> {
    fn next(&self, at: Position, level: usize) -> Option<NodeId> {
        match at {
            Position::Head => self.head[level],
            Position::Node(id) => self.nodes.get(id).forward[level],
        }
    }

    fn set_next(&mut self, at: Position, level: usize, to: Option<NodeId>) {
        match at {
            Position::Head => self.head[level] = to,
            Position::Node(id) => self.nodes.get_mut(id).forward[level] = to,
        }
    }
}

impl<K: Ord, V> Inner<K, V> {
    /// Walks from the top level down to level 0, advancing while the next key
    /// is smaller than `key`. `record` sees the last position reached on each
    /// level before descending. Returns the level-0 predecessor.
    fn descend<Q, F>(&self, key: &Q, mut record: F) -> Position
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        F: FnMut(usize, Position),
    {
        let mut cursor = Position::Head;
        for level in (0..=self.level).rev() {
            while let Some(next) = self.next(cursor, level) {
                let next_key: &Q = self.nodes.get(next).key.borrow();
                if next_key >= key {
                    break;
                }
                cursor = Position::Node(next);
            }
            record(level, cursor);
        }
        cursor
    }

    /// The level-0 successor of `pred` if it holds exactly `key`.
    fn matching<Q>(&self, pred: Position, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.next(pred, 0).filter(|&id| {
            let found: &Q = self.nodes.get(id).key.borrow();
            found == key
        })
    }

    fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let pred = self.descend(key, |_, _| {});
        self.matching(pred, key)
    }

    fn insert(&mut self, key: K, value: V) -> InsertResult {
        // levels above the current one have no nodes yet, so their
        // predecessor stays the header
        let mut update = vec![Position::Head; self.head.len()];
        let pred = self.descend(&key, |level, at| update[level] = at);

        if self.matching(pred, &key).is_some() {
            debug!("insert skipped, key already present");
            return InsertResult::AlreadyExists;
        }

        let level = self.levels.next_level();
        if level > self.level {
            trace!("raising current level {} -> {}", self.level, level);
            self.level = level;
        }

        let id = self.nodes.alloc(Node::new(key, value, level));
        for (i, &at) in update.iter().enumerate().take(level + 1) {
            let succ = self.next(at, i);
            self.nodes.get_mut(id).forward[i] = succ;
            self.set_next(at, i, Some(id));
        }
        self.len += 1;

        debug!("inserted node at level {} (len {})", level, self.len);
        InsertResult::Inserted
    }

    fn delete<Q>(&mut self, key: &Q) -> DeleteResult
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut update = vec![Position::Head; self.head.len()];
        let pred = self.descend(key, |level, at| update[level] = at);

        let Some(target) = self.matching(pred, key) else {
            debug!("delete skipped, key not found");
            return DeleteResult::NotFound;
        };

        for (i, &at) in update.iter().enumerate().take(self.level + 1) {
            // a node absent from level i is absent from every level above it
            if self.next(at, i) != Some(target) {
                break;
            }
            let succ = self.nodes.get(target).forward[i];
            self.set_next(at, i, succ);
        }
        let removed = self.nodes.release(target);

        while self.level > 0 && self.head[self.level].is_none() {
            self.level -= 1;
        }
        self.len -= 1;

        debug!(
            "deleted node of level {} (len {}, current level {})",
            removed.level(),
            self.len,
            self.level
        );
        DeleteResult::Deleted
    }
}

/// Lazily formatted view of every level of a [`SkipList`].
///
/// Produced by [`SkipList::display`]. Each line reads
/// `Level <i>: <key>:<value>;<key>:<value>;...`, highest level first.
pub struct LevelsDisplay<'a, K, V> {
    list: &'a SkipList<K, V>,
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for LevelsDisplay<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.list.read();
        for level in (0..=inner.level).rev() {
            write!(f, "Level {}: ", level)?;
            let mut cursor = inner.head[level];
            while let Some(id) = cursor {
                let node = inner.nodes.get(id);
                write!(f, "{}:{};", node.key, node.value)?;
                cursor = node.forward[level];
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
