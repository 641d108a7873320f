//! AVL rebalancing: balance factors, rotations, and the upward walk.
//!
//! The base operations in `base.rs` may leave ancestors of a mutation point
//! with subtrees whose heights differ by two. The walk implemented here
//! ascends from that point to the root, recomputing each node's balance
//! factor from its subtree heights and rotating wherever the factor leaves
//! `[-1, 1]`. Factors are always recomputed from ground truth rather than
//! propagated incrementally, and the walk never stops early: a deletion can
//! unbalance several ancestor levels, not just the first.

use crate::arena::NodeId;
use crate::map::AvlTreeMap;

impl<K, V> AvlTreeMap<K, V> {
    /// Height of the subtree rooted at `node`: 0 when absent, 1 for a leaf,
    /// otherwise 1 + the taller child's height.
    pub(crate) fn height_of(&self, node: Option<NodeId>) -> usize {
        node.map_or(0, |id| {
            1 + self
                .height_of(self.arena[id].left)
                .max(self.height_of(self.arena[id].right))
        })
    }

    /// Balance factor of `node`: height(left) minus height(right).
    ///
    /// An absent node is neutral, consistent with an absent subtree having
    /// height 0; it is never dereferenced.
    #[allow(clippy::cast_possible_wrap)] // subtree heights never approach i64::MAX
    pub(crate) fn balance_factor(&self, node: Option<NodeId>) -> i64 {
        node.map_or(0, |id| {
            let left = self.height_of(self.arena[id].left) as i64;
            let right = self.height_of(self.arena[id].right) as i64;
            left - right
        })
    }

    /// Recomputes `id`'s stored balance factor from its subtree heights.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn refresh_balance(&mut self, id: NodeId) {
        // A node under repair is at most doubly unbalanced, so the clamp
        // never actually bites.
        self.arena[id].balance = self.balance_factor(Some(id)).clamp(-2, 2) as i8;
    }

    /// Left rotation: promotes `x`'s right child into `x`'s position.
    ///
    /// The promoted child takes over `x`'s attachment point (its parent's
    /// child link, or the tree root), `x` becomes its left child, and its
    /// former left subtree becomes `x`'s right subtree. Returns the promoted
    /// node. A node with no right child is left untouched and returned
    /// as-is.
    pub(crate) fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let Some(y) = self.arena[x].right else {
            return x;
        };

        // y's left subtree moves under x.
        let moved = self.arena[y].left;
        self.arena[x].right = moved;
        if let Some(moved_id) = moved {
            self.arena[moved_id].parent = Some(x);
        }

        // y takes over x's attachment point.
        let parent = self.arena[x].parent;
        self.arena[y].parent = parent;
        match parent {
            None => self.root = Some(y),
            Some(parent_id) => {
                if self.arena[parent_id].left == Some(x) {
                    self.arena[parent_id].left = Some(y);
                } else {
                    self.arena[parent_id].right = Some(y);
                }
            }
        }

        // x descends to y's left.
        self.arena[y].left = Some(x);
        self.arena[x].parent = Some(y);

        // Only x and y changed height; keep their stored factors truthful.
        self.refresh_balance(x);
        self.refresh_balance(y);

        y
    }

    /// Right rotation: promotes `y`'s left child into `y`'s position.
    ///
    /// Mirror image of [`rotate_left`](Self::rotate_left).
    pub(crate) fn rotate_right(&mut self, y: NodeId) -> NodeId {
        let Some(x) = self.arena[y].left else {
            return y;
        };

        // x's right subtree moves under y.
        let moved = self.arena[x].right;
        self.arena[y].left = moved;
        if let Some(moved_id) = moved {
            self.arena[moved_id].parent = Some(y);
        }

        // x takes over y's attachment point.
        let parent = self.arena[y].parent;
        self.arena[x].parent = parent;
        match parent {
            None => self.root = Some(x),
            Some(parent_id) => {
                if self.arena[parent_id].left == Some(y) {
                    self.arena[parent_id].left = Some(x);
                } else {
                    self.arena[parent_id].right = Some(x);
                }
            }
        }

        // y descends to x's right.
        self.arena[x].right = Some(y);
        self.arena[y].parent = Some(x);

        self.refresh_balance(y);
        self.refresh_balance(x);

        x
    }

    /// Upward rebalancing walk.
    ///
    /// Starting at `start` (the freshly inserted node, or the parent of a
    /// splice point after removal), visits every ancestor up to the root.
    /// At each node the balance factor is recomputed and stored; a factor of
    /// ±2 triggers the classic four-case repair:
    ///
    /// - left-heavy with a right-leaning left child: rotate the left child
    ///   left, then the node right (left-right case)
    /// - left-heavy otherwise: rotate the node right (left-left case)
    /// - right-heavy: the mirror cases
    ///
    /// The walk continues from the parent of whichever node now roots the
    /// repaired subtree. An absent `start` (the tree just became empty) is a
    /// no-op.
    pub(crate) fn rebalance_from(&mut self, start: Option<NodeId>) {
        let mut current = start;
        while let Some(id) = current {
            self.refresh_balance(id);
            let factor = self.balance_factor(Some(id));

            let subtree_root = if factor > 1 {
                if let Some(left) = self.arena[id].left {
                    if self.balance_factor(Some(left)) < 0 {
                        self.rotate_left(left);
                    }
                }
                self.rotate_right(id)
            } else if factor < -1 {
                if let Some(right) = self.arena[id].right {
                    if self.balance_factor(Some(right)) > 0 {
                        self.rotate_right(right);
                    }
                }
                self.rotate_left(id)
            } else {
                id
            };

            current = self.arena[subtree_root].parent;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
