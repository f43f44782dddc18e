//! Node storage for the skip list.
//!
//! Nodes live in an [`Arena`] and refer to each other by [`NodeId`]. Links
//! only ever point forward, so there are no ownership cycles and no unsafe
//! code: unlinking a node is a matter of rewriting a few `Option<NodeId>`
//! slots and handing the slot back to the arena's free list.

/// Stable index of a node inside an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

/// A position a traversal can stand on: the header or a real node.
///
/// The header carries no key or value, so it is modelled as its own variant
/// rather than as a node holding placeholder data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    Head,
    Node(NodeId),
}

/// A keyed record and its per-level forward links.
///
/// `forward[i]` is the next node participating in level `i`, or `None` at the
/// end of that level. The length is fixed at creation: a node of level `L`
/// has `L + 1` links and appears on every level `0..=L`.
#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) forward: Box<[Option<NodeId>]>,
}

impl<K, V> Node<K, V> {
    pub(crate) fn new(key: K, value: V, level: usize) -> Self {
        Self {
            key,
            value,
            forward: vec![None; level + 1].into_boxed_slice(),
        }
    }

    /// Highest level index this node appears on.
    pub(crate) fn level(&self) -> usize {
        self.forward.len() - 1
    }
}

/// Slot allocator for nodes.
///
/// Released slots are recycled before the backing vector grows, so ids stay
/// small under insert/delete churn. An id is valid from `alloc` until the
/// matching `release`.
#[derive(Debug)]
pub(crate) struct Arena<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<NodeId>,
}

impl<K, V> Arena<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.slots[id.0] = Some(node);
                id
            }
            None => {
                self.slots.push(Some(node));
                NodeId(self.slots.len() - 1)
            }
        }
    }

    /// Takes the node out of its slot and returns the slot to the free list.
    pub(crate) fn release(&mut self, id: NodeId) -> Node<K, V> {
        let node = self.slots[id.0]
            .take()
            .unwrap_or_else(|| panic!("released vacant slot {}", id.0));
        self.free.push(id);
        node
    }

    pub(crate) fn get(&self, id: NodeId) -> &Node<K, V> {
        self.slots[id.0]
            .as_ref()
            .unwrap_or_else(|| panic!("dangling node id {}", id.0))
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        self.slots[id.0]
            .as_mut()
            .unwrap_or_else(|| panic!("dangling node id {}", id.0))
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    /// Number of slots currently holding a node.
    #[cfg(test)]
    pub(crate) fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}
