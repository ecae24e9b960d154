//! An ordered map built on a left-leaning red-black tree, with resumable cursors.
//!
//! This crate provides [`LlrbMap`], a sorted key-value map with the familiar
//! `BTreeMap`-style surface plus explicit in-order cursors:
//!
//! - [`begin`](LlrbMap::begin) / [`end`](LlrbMap::end) - Cursors on the smallest entry and past the last one
//! - [`find`](LlrbMap::find) - A cursor on a key that resumes in key order from there
//! - [`at`](LlrbMap::at) / [`try_at`](LlrbMap::try_at) - Lookup that treats a missing key as a failure
//! - [`get_or_insert_default`](LlrbMap::get_or_insert_default) - Indexed access that inserts on miss
//!
//! # Example
//!
//! ```
//! use llrb_map::LlrbMap;
//!
//! let mut map = LlrbMap::new();
//! for key in [5, 3, 8, 1, 4, 7, 9] {
//!     map.insert(key, key * 10);
//! }
//!
//! // In-order traversal.
//! let keys: Vec<_> = map.keys().copied().collect();
//! assert_eq!(keys, [1, 3, 4, 5, 7, 8, 9]);
//!
//! // Resume from a key.
//! let mut cursor = map.find(&7);
//! cursor.advance();
//! assert_eq!(cursor.key_value(), Some((&8, &80)));
//!
//! // Erase and look up.
//! map.erase(&5);
//! assert!(map.find(&5) == map.end());
//! assert_eq!(*map.at(&3), 30);
//!
//! // Indexed access inserts a default value on miss.
//! *map.get_or_insert_default(10) += 1;
//! assert_eq!(map[&10], 1);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **No unsafe code** - Nodes live in a slot arena and link to each other by handle
//! - **O(log n) operations** - The tree height stays within 2 log<sub>2</sub>(n + 1)
//! - **Borrow-checked cursors** - A cursor borrows its map, so it cannot outlive a mutation
//!
//! # Implementation
//!
//! The map is a left-leaning red-black tree: the binary encoding of a 2-3 tree in which red
//! links only lean left. Insertion and removal are recursive and repair the tree on the way
//! back up with rotations and color flips. Cursors walk the tree with an explicit stack of
//! per-node visit states, so a traversal can stop after any entry and pick up later.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod raw;

pub mod llrb_map;

pub use error::KeyNotFound;
pub use llrb_map::LlrbMap;
