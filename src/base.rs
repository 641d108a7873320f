//! Plain binary-search-tree mechanics.
//!
//! Everything here manipulates the tree as an ordinary (unbalanced) BST:
//! lookup, leaf attachment, node detachment, and the in-order neighbor
//! walks. The AVL layer in `balance.rs` builds on these operations and
//! repairs whatever height damage they cause.

use std::borrow::Borrow;
use std::cmp::Ordering;

use crate::arena::{Node, NodeId};
use crate::map::AvlTreeMap;

/// Outcome of an unbalanced attach.
pub(crate) enum Attach<V> {
    /// A fresh leaf was linked in; rebalancing starts from it.
    Inserted(NodeId),
    /// The key was already present; this is the value it used to hold.
    /// The tree shape is untouched, so no rebalancing is due.
    Replaced(V),
}

impl<K: Ord, V> AvlTreeMap<K, V> {
    /// Descends from the root comparing keys until it hits `key`'s node.
    pub(crate) fn find_node<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(id) = current {
            current = match key.cmp(self.arena[id].key.borrow()) {
                Ordering::Less => self.arena[id].left,
                Ordering::Greater => self.arena[id].right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    /// Unbalanced BST insert: either links a fresh leaf under the node that
    /// ran out of children in `key`'s direction, or overwrites the value of
    /// an existing node in place.
    pub(crate) fn attach(&mut self, key: K, value: V) -> Attach<V> {
        let Some(mut current) = self.root else {
            let id = self.arena.alloc(Node::new(key, value, None));
            self.root = Some(id);
            return Attach::Inserted(id);
        };

        loop {
            match key.cmp(&self.arena[current].key) {
                Ordering::Less => match self.arena[current].left {
                    Some(next) => current = next,
                    None => {
                        let id = self.arena.alloc(Node::new(key, value, Some(current)));
                        self.arena[current].left = Some(id);
                        return Attach::Inserted(id);
                    }
                },
                Ordering::Greater => match self.arena[current].right {
                    Some(next) => current = next,
                    None => {
                        let id = self.arena.alloc(Node::new(key, value, Some(current)));
                        self.arena[current].right = Some(id);
                        return Attach::Inserted(id);
                    }
                },
                Ordering::Equal => {
                    let old = std::mem::replace(&mut self.arena[current].value, value);
                    return Attach::Replaced(old);
                }
            }
        }
    }
}

impl<K, V> AvlTreeMap<K, V> {
    /// Unbalanced BST removal of `id`.
    ///
    /// A node with two children is first swapped with its in-order
    /// predecessor, which leaves it with at most one child; the node is then
    /// spliced out and its slot freed. Returns the removed value together
    /// with the parent of the splice point, which is where rebalancing must
    /// begin (`None` when the tree just became empty).
    pub(crate) fn detach(&mut self, id: NodeId) -> (V, Option<NodeId>) {
        if let (Some(left), Some(_)) = (self.arena[id].left, self.arena[id].right) {
            let predecessor = self.rightmost(left);
            self.swap_nodes(id, predecessor);
        }

        let parent = self.arena[id].parent;
        let child = self.arena[id].left.or(self.arena[id].right);

        if let Some(child_id) = child {
            self.arena[child_id].parent = parent;
        }
        match parent {
            None => self.root = child,
            Some(parent_id) => {
                if self.arena[parent_id].left == Some(id) {
                    self.arena[parent_id].left = child;
                } else {
                    self.arena[parent_id].right = child;
                }
            }
        }

        let node = self.arena.free(id);
        (node.value, parent)
    }

    /// Exchanges the tree positions of two nodes.
    ///
    /// Balance factors travel with the positions, not with the entries: a
    /// node's factor describes the shape around a slot in the tree, so the
    /// two stored factors are exchanged along with the links.
    pub(crate) fn swap_nodes(&mut self, first: NodeId, second: NodeId) {
        if first == second {
            return;
        }

        let remap = |link: Option<NodeId>| match link {
            Some(id) if id == first => Some(second),
            Some(id) if id == second => Some(first),
            other => other,
        };

        let (first_parent, first_left, first_right) = {
            let node = &self.arena[first];
            (node.parent, node.left, node.right)
        };
        let (second_parent, second_left, second_right) = {
            let node = &self.arena[second];
            (node.parent, node.left, node.right)
        };

        // Point the neighbors outside the pair at their new occupant.
        self.redirect_neighbors(first, second, first_parent, first_left, first_right);
        self.redirect_neighbors(second, first, second_parent, second_left, second_right);

        // Each node takes the other's links. References within the pair are
        // flipped so that adjacent swaps (predecessor as direct child) stay
        // consistent.
        {
            let node = &mut self.arena[first];
            node.parent = remap(second_parent);
            node.left = remap(second_left);
            node.right = remap(second_right);
        }
        {
            let node = &mut self.arena[second];
            node.parent = remap(first_parent);
            node.left = remap(first_left);
            node.right = remap(first_right);
        }

        let first_balance = self.arena[first].balance;
        let second_balance = self.arena[second].balance;
        self.arena[first].balance = second_balance;
        self.arena[second].balance = first_balance;
    }

    /// Points `occupant`'s former neighbors at `replacement`. Neighbors
    /// inside the swapped pair are left alone; their links are rewritten
    /// wholesale by the caller.
    fn redirect_neighbors(
        &mut self,
        occupant: NodeId,
        replacement: NodeId,
        parent: Option<NodeId>,
        left: Option<NodeId>,
        right: Option<NodeId>,
    ) {
        match parent {
            None => self.root = Some(replacement),
            Some(parent_id) if parent_id != replacement => {
                if self.arena[parent_id].left == Some(occupant) {
                    self.arena[parent_id].left = Some(replacement);
                } else {
                    self.arena[parent_id].right = Some(replacement);
                }
            }
            Some(_) => {}
        }
        for child in [left, right].into_iter().flatten() {
            if child != replacement {
                self.arena[child].parent = Some(replacement);
            }
        }
    }

    /// Leftmost node of the subtree rooted at `id`.
    pub(crate) fn leftmost(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(left) = self.arena[current].left {
            current = left;
        }
        current
    }

    /// Rightmost node of the subtree rooted at `id`.
    pub(crate) fn rightmost(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(right) = self.arena[current].right {
            current = right;
        }
        current
    }

    /// In-order predecessor: the rightmost node of the left subtree, or the
    /// nearest ancestor reached from a right child.
    pub(crate) fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(left) = self.arena[id].left {
            return Some(self.rightmost(left));
        }
        let mut current = id;
        while let Some(parent) = self.arena[current].parent {
            if self.arena[parent].right == Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// In-order successor: the leftmost node of the right subtree, or the
    /// nearest ancestor reached from a left child.
    pub(crate) fn successor(&self, id: NodeId) -> Option<NodeId> {
        if let Some(right) = self.arena[id].right {
            return Some(self.leftmost(right));
        }
        let mut current = id;
        while let Some(parent) = self.arena[current].parent {
            if self.arena[parent].left == Some(current) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn sample_map() -> AvlTreeMap<i32, &'static str> {
        let mut map = AvlTreeMap::new();
        for (key, value) in [(4, "four"), (2, "two"), (6, "six"), (1, "one"), (3, "three")] {
            map.insert(key, value);
        }
        map
    }

    #[rstest]
    fn test_find_node_hits_every_key() {
        let map = sample_map();
        for key in [1, 2, 3, 4, 6] {
            let id = map.find_node(&key).expect("key should be present");
            assert_eq!(map.arena[id].key, key);
        }
        assert_eq!(map.find_node(&5), None);
    }

    #[rstest]
    fn test_successor_visits_keys_in_order() {
        let map = sample_map();
        let mut cursor = map.root.map(|root| map.leftmost(root));
        let mut keys = Vec::new();
        while let Some(id) = cursor {
            keys.push(map.arena[id].key);
            cursor = map.successor(id);
        }
        assert_eq!(keys, vec![1, 2, 3, 4, 6]);
    }

    #[rstest]
    fn test_predecessor_visits_keys_in_reverse_order() {
        let map = sample_map();
        let mut cursor = map.root.map(|root| map.rightmost(root));
        let mut keys = Vec::new();
        while let Some(id) = cursor {
            keys.push(map.arena[id].key);
            cursor = map.predecessor(id);
        }
        assert_eq!(keys, vec![6, 4, 3, 2, 1]);
    }

    #[rstest]
    fn test_predecessor_of_minimum_is_absent() {
        let map = sample_map();
        let minimum = map.find_node(&1).expect("present");
        assert_eq!(map.predecessor(minimum), None);
    }

    #[rstest]
    fn test_swap_nodes_exchanges_positions_and_balances() {
        let mut map = sample_map();
        let first = map.find_node(&2).expect("present");
        let second = map.find_node(&6).expect("present");
        let first_balance = map.arena[first].balance;
        let second_balance = map.arena[second].balance;

        map.swap_nodes(first, second);

        // Entries kept their identity but traded places and factors.
        assert_eq!(map.arena[first].balance, second_balance);
        assert_eq!(map.arena[second].balance, first_balance);
        let root = map.root.expect("non-empty");
        assert_eq!(map.arena[root].left, Some(second));
        assert_eq!(map.arena[second].parent, Some(root));

        // Parent and child links stay mutually consistent.
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            for child in [map.arena[id].left, map.arena[id].right]
                .into_iter()
                .flatten()
            {
                assert_eq!(map.arena[child].parent, Some(id));
                stack.push(child);
            }
        }
    }

    #[rstest]
    fn test_swap_nodes_with_direct_child() {
        let mut map = sample_map();
        let parent = map.find_node(&2).expect("present");
        let child = map.arena[parent].left.expect("has a left child");

        map.swap_nodes(parent, child);

        assert_eq!(map.arena[parent].parent, Some(child));
        assert_eq!(map.arena[child].left, Some(parent));
        let root = map.root.expect("non-empty");
        assert_eq!(map.arena[child].parent, Some(root));
        assert_eq!(map.arena[root].left, Some(child));
    }

    #[rstest]
    fn test_detach_leaf_reports_its_parent() {
        let mut map = sample_map();
        let leaf = map.find_node(&3).expect("present");
        let parent = map.arena[leaf].parent;

        let (value, start) = map.detach(leaf);

        assert_eq!(value, "three");
        assert_eq!(start, parent);
    }

    #[rstest]
    fn test_detach_two_children_starts_at_splice_parent() {
        let mut map = sample_map();
        let node = map.find_node(&2).expect("present");
        // Predecessor of 2 is 1, its direct left child; after the swap the
        // splice parent is the predecessor itself.
        let predecessor = map.find_node(&1).expect("present");

        let (value, start) = map.detach(node);

        assert_eq!(value, "two");
        assert_eq!(start, Some(predecessor));
    }
}
