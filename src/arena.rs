//! Arena-backed node storage for the AVL tree.
//!
//! Nodes live in a `Vec` of slots addressed by [`NodeId`]. Freed slots are
//! chained into an intrusive free list and reused by later allocations.
//! Parent links are plain indices rather than owning references, so the
//! parent/child back-and-forth of a search tree never forms an ownership
//! cycle.

use std::num::NonZeroU32;
use std::ops::{Index, IndexMut};

use static_assertions::assert_eq_size;

/// Index of a node slot in the [`Arena`].
///
/// Stored as the slot position plus one so that `Option<NodeId>` occupies
/// the same four bytes as the raw index. `None` is the "absent" marker for
/// a missing child, the root's parent, and the root of an empty tree.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct NodeId(NonZeroU32);

assert_eq_size!(Option<NodeId>, u32);

impl NodeId {
    fn from_index(index: usize) -> Self {
        let raw = u32::try_from(index)
            .ok()
            .and_then(|position| position.checked_add(1))
            .and_then(NonZeroU32::new);
        match raw {
            Some(id) => Self(id),
            None => panic!("node arena exceeds u32 slot capacity"),
        }
    }

    fn index(self) -> usize {
        self.0.get() as usize - 1
    }
}

/// One stored key-value entry together with its tree links.
///
/// `balance` is height(left subtree) minus height(right subtree). It stays
/// in `{-1, 0, 1}` whenever the tree is between operations; a rebalancing
/// walk may observe `±2` on the node it is about to rotate.
#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    pub key: K,
    pub value: V,
    pub parent: Option<NodeId>,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub balance: i8,
}

impl<K, V> Node<K, V> {
    pub fn new(key: K, value: V, parent: Option<NodeId>) -> Self {
        Self {
            key,
            value,
            parent,
            left: None,
            right: None,
            balance: 0,
        }
    }
}

#[derive(Clone, Debug)]
enum Slot<K, V> {
    Vacant { next_free: Option<NodeId> },
    Occupied(Node<K, V>),
}

/// Slot pool holding every node of one tree.
#[derive(Clone, Debug)]
pub(crate) struct Arena<K, V> {
    slots: Vec<Slot<K, V>>,
    free_head: Option<NodeId>,
}

impl<K, V> Arena<K, V> {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
        }
    }

    /// Places `node` in a vacant slot, reusing a freed one when available.
    pub fn alloc(&mut self, node: Node<K, V>) -> NodeId {
        match self.free_head {
            Some(id) => {
                let next_free = match &self.slots[id.index()] {
                    Slot::Vacant { next_free } => *next_free,
                    Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
                };
                self.free_head = next_free;
                self.slots[id.index()] = Slot::Occupied(node);
                id
            }
            None => {
                let id = NodeId::from_index(self.slots.len());
                self.slots.push(Slot::Occupied(node));
                id
            }
        }
    }

    /// Vacates `id`'s slot, chains it onto the free list, and returns the
    /// node that occupied it.
    ///
    /// # Panics
    ///
    /// Panics if the slot is already vacant.
    pub fn free(&mut self, id: NodeId) -> Node<K, V> {
        let vacated = Slot::Vacant {
            next_free: self.free_head,
        };
        match std::mem::replace(&mut self.slots[id.index()], vacated) {
            Slot::Occupied(node) => {
                self.free_head = Some(id);
                node
            }
            Slot::Vacant { next_free } => {
                self.slots[id.index()] = Slot::Vacant { next_free };
                panic!("node {id:?} freed twice")
            }
        }
    }

    /// Drops every node and resets the free list.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = None;
    }
}

impl<K, V> Index<NodeId> for Arena<K, V> {
    type Output = Node<K, V>;

    fn index(&self, id: NodeId) -> &Node<K, V> {
        match &self.slots[id.index()] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("node {id:?} is not in the tree"),
        }
    }
}

impl<K, V> IndexMut<NodeId> for Arena<K, V> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        match &mut self.slots[id.index()] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("node {id:?} is not in the tree"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
