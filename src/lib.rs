//! # avlmap
//!
//! An ordered key-value map backed by a self-balancing AVL tree.
//!
//! ## Overview
//!
//! [`AvlTreeMap`] stores entries in binary-search-tree order and keeps the
//! tree height-balanced through AVL rotations, so lookup, insertion, and
//! removal all stay logarithmic in depth. Nodes live in an internal arena
//! and reference each other by index: child links own their subtrees
//! conceptually, while parent links are plain back-indices used for the
//! upward rebalancing walk and for ordered iteration.
//!
//! - O(log N) depth for `get`, `insert`, and `remove`
//! - Entries always iterate in ascending key order
//! - Duplicate-key insertion overwrites the value in place without
//!   touching the tree shape
//! - Removing an absent key is a silent no-op
//!
//! ## Example
//!
//! ```rust
//! use avlmap::AvlTreeMap;
//!
//! let mut map = AvlTreeMap::new();
//! map.insert(3, "three");
//! map.insert(1, "one");
//! map.insert(2, "two");
//!
//! // Entries are always in sorted key order
//! let keys: Vec<&i32> = map.keys().collect();
//! assert_eq!(keys, vec![&1, &2, &3]);
//!
//! assert_eq!(map.remove(&2), Some("two"));
//! assert_eq!(map.get(&2), None);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod arena;
mod balance;
mod base;
mod map;

pub use map::AvlTreeMap;
pub use map::IntoIter;
pub use map::Iter;
