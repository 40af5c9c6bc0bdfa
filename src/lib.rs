//! A red-black tree ordered map for Rust.
//!
//! This crate provides [`RBTreeMap`], an ordered map whose API follows the standard
//! library's `BTreeMap`, backed by a red-black tree whose nodes live in an arena and
//! link to each other by handle rather than by pointer.
//!
//! Beyond the usual map operations it offers:
//!
//! - [`Cursor`]s - bidirectional positions with a single end sentinel
//!   ([`begin`](RBTreeMap::begin), [`end`](RBTreeMap::end), [`rbegin`](RBTreeMap::rbegin),
//!   [`rend`](RBTreeMap::rend), [`find`](RBTreeMap::find))
//! - [`at`](RBTreeMap::at) - value lookup reporting [`Error::KeyNotFound`]
//! - Diagnostics - [`check_red_black_tree_properties`](RBTreeMap::check_red_black_tree_properties),
//!   [`debug_output`](RBTreeMap::debug_output) and [`black_height`](RBTreeMap::black_height)
//!
//! # Example
//!
//! ```
//! use rb_map::RBTreeMap;
//!
//! let mut map = RBTreeMap::new();
//! for (key, name) in [(1, "Aharon"), (8, "Baruch"), (2, "Sarah"), (4, "Ichak")] {
//!     map.insert(key, name);
//! }
//!
//! assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 2, 4, 8]);
//! assert_eq!(map.find(&4).value(), Some(&"Ichak"));
//!
//! map.erase(&4);
//! assert!(map.find(&4).is_end());
//! assert_eq!(map.check_red_black_tree_properties(), "");
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`
//! - **No unsafe code** - Links are arena handles, not pointers
//! - **`demo`** - Builds the `rb_map_demo` binary, which prints tree dumps for a small
//!   fixed scenario
//!
//! # Logging
//!
//! Rebalancing steps are reported through [`tracing`] at `trace` level (one event per
//! fixup case and rotation) and size changes at `debug` level.

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

pub mod rbtree_map;

pub use error::{Error, Result};
pub use rbtree_map::{Cursor, CursorMut, RBTreeMap, Violation};
