//! # board-trie
//!
//! Memory-dense set and map for fixed-size puzzle boards.
//!
//! A solver exploring millions of board configurations needs to answer "have
//! I seen this board before?" cheaply. `board-trie` stores each board as a
//! path through a trie with one level per board row: every row is packed into
//! a 16-bit layer value, and each level maps layer values to the next level
//! using one of four containers:
//!
//! - sorted-prefix arrays with SIMD scanning of the unsorted tail, for sparse
//!   levels
//! - direct-indexed bitmaps, for levels dense enough to preallocate
//! - leaf variants of both, holding a presence bit ([`BoardSet`]) or a payload
//!   ([`BoardMap`])
//!
//! Rows are visited outside-in (see [`row_order`]), which tends to share
//! prefixes between boards that differ in their middle rows.
//!
//! ## Example
//!
//! ```rust
//! use board_trie::{BoardMap, BoardSet, FixedBoard};
//!
//! type Board = FixedBoard<5, 5>;
//!
//! let mut board = Board::new();
//! board.set(2, 2, 7);
//!
//! let mut seen: BoardSet<Board> = BoardSet::new();
//! seen.append(&board).unwrap();
//! seen.append(&board).unwrap();
//! assert_eq!(seen.len(), 1);
//! assert!(seen.contains(&board));
//!
//! let mut parents: BoardMap<Board, u8> = BoardMap::new();
//! parents.insert(&board, 3).unwrap();
//! assert_eq!(parents.get(&board), Some(&3));
//! ```
//!
//! ## Errors
//!
//! Buffer growth never aborts: a failed reservation surfaces as
//! [`TrieError::Alloc`] and the trie keeps its previous contents. Misuse that
//! breaks the trie's preconditions (appending a board already present through
//! the `append_new` fast path, layer values outside the configured width) is
//! only checked by debug assertions.
//!
//! The structures are single-threaded; share them across threads behind a
//! lock or keep one per worker.

#![deny(unsafe_op_in_unsafe_fn)]

pub mod board;
pub mod config;
mod container;
pub mod error;
pub mod key;
mod map;
pub mod scan;
mod set;
mod trie;

pub use board::{FixedBoard, Layered, CELL_BITS, MAX_CELL};
pub use config::{Layout, TrieConfig};
pub use container::{ContainerKind, Representation};
pub use error::{Result, TrieError};
pub use key::CompactKey;
pub use map::BoardMap;
pub use set::BoardSet;
pub use trie::{row_order, MissPoint, Probe, TrieStats};

#[cfg(test)]
mod testutil;

#[cfg(test)]
mod proptests;
