//! Per-level node storage.
//!
//! A trie level is one of four containers:
//!
//! - `Array`: parallel `keys`/`children` arrays with a sorted prefix
//! - `Bitmap`: presence bitmap plus a child slot for every layer value
//! - `LeafArray`, `LeafBitmap`: the same layouts holding payloads instead of
//!   children; nothing lives below a leaf
//!
//! The trie picks the kind when it creates a node and never converts it.
//! Operations that only make sense for one side (child lookups on a leaf,
//! payload lookups on an internal node) are programming errors: they trip a
//! `debug_assert!`, and in release builds lookups report "absent" while
//! mutations panic.

mod array;
mod bitmap;
mod bitset;

use std::fmt;
use std::str::FromStr;

pub(crate) use array::ArrayContainer;
pub(crate) use bitmap::BitmapContainer;

use crate::error::{Result, TrieError};

/// Index of a node in the trie's arena.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct NodeId(u32);

impl NodeId {
    /// Empty child slot in a bitmap container.
    pub(crate) const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub(crate) fn from_index(i: usize) -> Option<Self> {
        u32::try_from(i).ok().filter(|&i| i != u32::MAX).map(NodeId)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        debug_assert!(self != Self::NONE);
        self.0 as usize
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::NONE
    }
}

/// Storage layout requested for a trie depth.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Representation {
    /// Small growable arrays; fits sparse levels.
    Array,
    /// A slot for every possible layer value; O(1) at the cost of
    /// preallocating the whole domain.
    Bitmap,
}

impl FromStr for Representation {
    type Err = TrieError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "array" | "0" => Ok(Self::Array),
            "bitmap" | "1" => Ok(Self::Bitmap),
            other => Err(TrieError::UnknownKind(other.to_string())),
        }
    }
}

/// The four node kinds.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum ContainerKind {
    Array = 0,
    Bitmap = 1,
    LeafArray = 2,
    LeafBitmap = 3,
}

impl ContainerKind {
    pub fn new(rep: Representation, leaf: bool) -> Self {
        match (rep, leaf) {
            (Representation::Array, false) => Self::Array,
            (Representation::Bitmap, false) => Self::Bitmap,
            (Representation::Array, true) => Self::LeafArray,
            (Representation::Bitmap, true) => Self::LeafBitmap,
        }
    }

    #[inline]
    pub fn is_leaf(self) -> bool {
        matches!(self, Self::LeafArray | Self::LeafBitmap)
    }

    #[inline]
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ContainerKind {
    type Error = TrieError;

    fn try_from(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(Self::Array),
            1 => Ok(Self::Bitmap),
            2 => Ok(Self::LeafArray),
            3 => Ok(Self::LeafBitmap),
            other => Err(TrieError::UnknownKind(format!("tag {other}"))),
        }
    }
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Array => "array",
            Self::Bitmap => "bitmap",
            Self::LeafArray => "leaf-array",
            Self::LeafBitmap => "leaf-bitmap",
        })
    }
}

/// One trie level. `V` is the leaf payload (`()` for sets).
pub(crate) enum Container<V> {
    Array(ArrayContainer<NodeId>),
    Bitmap(BitmapContainer<NodeId>),
    LeafArray(ArrayContainer<V>),
    LeafBitmap(BitmapContainer<V>),
}

impl<V: Default> Container<V> {
    /// Builds an empty container of `kind`. Bitmap kinds preallocate
    /// `2^domain_bits` slots.
    pub(crate) fn new(
        kind: ContainerKind,
        initial_capacity: usize,
        domain_bits: u32,
    ) -> Result<Self> {
        Ok(match kind {
            ContainerKind::Array => Self::Array(ArrayContainer::with_capacity(initial_capacity)?),
            ContainerKind::Bitmap => Self::Bitmap(BitmapContainer::new(domain_bits)?),
            ContainerKind::LeafArray => {
                Self::LeafArray(ArrayContainer::with_capacity(initial_capacity)?)
            }
            ContainerKind::LeafBitmap => Self::LeafBitmap(BitmapContainer::new(domain_bits)?),
        })
    }
}

impl<V> Container<V> {
    #[inline]
    pub(crate) fn kind(&self) -> ContainerKind {
        match self {
            Self::Array(_) => ContainerKind::Array,
            Self::Bitmap(_) => ContainerKind::Bitmap,
            Self::LeafArray(_) => ContainerKind::LeafArray,
            Self::LeafBitmap(_) => ContainerKind::LeafBitmap,
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.kind().is_leaf()
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Array(c) => c.len(),
            Self::Bitmap(c) => c.len(),
            Self::LeafArray(c) => c.len(),
            Self::LeafBitmap(c) => c.len(),
        }
    }

    /// Entries in the sorted prefix; bitmaps count as fully sorted.
    pub(crate) fn sorted_len(&self) -> usize {
        match self {
            Self::Array(c) => c.sorted_len(),
            Self::LeafArray(c) => c.sorted_len(),
            Self::Bitmap(c) => c.len(),
            Self::LeafBitmap(c) => c.len(),
        }
    }

    /// Child stored under `key`.
    #[inline]
    pub(crate) fn child(&self, key: u16) -> Option<NodeId> {
        debug_assert!(!self.is_leaf(), "child lookup on a {} container", self.kind());
        match self {
            Self::Array(c) => c.find(key).map(|pos| *c.slot(pos)),
            Self::Bitmap(c) => c.find(key).map(|pos| *c.slot(pos)),
            Self::LeafArray(_) | Self::LeafBitmap(_) => None,
        }
    }

    /// Adds `child` under `key`, which must not already be present.
    pub(crate) fn push_child(
        &mut self,
        key: u16,
        child: NodeId,
        resort_threshold: usize,
    ) -> Result<()> {
        match self {
            Self::Array(c) => c.push(key, child, resort_threshold).map(drop),
            Self::Bitmap(c) => {
                c.insert(key, child);
                Ok(())
            }
            Self::LeafArray(_) | Self::LeafBitmap(_) => {
                unreachable!("append_child on a {} container", self.kind())
            }
        }
    }

    /// Slot position of the payload stored under `key`.
    #[inline]
    pub(crate) fn find_value(&self, key: u16) -> Option<usize> {
        debug_assert!(self.is_leaf(), "leaf lookup on a {} container", self.kind());
        match self {
            Self::LeafArray(c) => c.find(key),
            Self::LeafBitmap(c) => c.find(key),
            Self::Array(_) | Self::Bitmap(_) => None,
        }
    }

    #[inline]
    pub(crate) fn has_leaf(&self, key: u16) -> bool {
        self.find_value(key).is_some()
    }

    /// Payload at a position returned by [`find_value`](Self::find_value) or
    /// [`push_value`](Self::push_value).
    #[inline]
    pub(crate) fn value(&self, pos: usize) -> &V {
        match self {
            Self::LeafArray(c) => c.slot(pos),
            Self::LeafBitmap(c) => c.slot(pos),
            Self::Array(_) | Self::Bitmap(_) => {
                unreachable!("payload read on a {} container", self.kind())
            }
        }
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, pos: usize) -> &mut V {
        match self {
            Self::LeafArray(c) => c.slot_mut(pos),
            Self::LeafBitmap(c) => c.slot_mut(pos),
            Self::Array(_) | Self::Bitmap(_) => {
                unreachable!("payload write on a {} container", self.kind())
            }
        }
    }

    /// Stores `value` under `key`, which must not already be present, and
    /// returns its position.
    pub(crate) fn push_value(
        &mut self,
        key: u16,
        value: V,
        resort_threshold: usize,
    ) -> Result<usize> {
        match self {
            Self::LeafArray(c) => c.push(key, value, resort_threshold),
            Self::LeafBitmap(c) => Ok(c.insert(key, value)),
            Self::Array(_) | Self::Bitmap(_) => {
                unreachable!("append_leaf on a {} container", self.kind())
            }
        }
    }

    /// Live `(key, child)` pairs of an internal container.
    pub(crate) fn children(&self) -> Entries<'_, NodeId> {
        debug_assert!(!self.is_leaf(), "child iteration on a {} container", self.kind());
        match self {
            Self::Array(c) => c.entries(),
            Self::Bitmap(c) => c.entries(),
            Self::LeafArray(_) | Self::LeafBitmap(_) => Entries::Empty,
        }
    }

    /// Live `(key, payload)` pairs of a leaf container.
    pub(crate) fn values(&self) -> Entries<'_, V> {
        debug_assert!(self.is_leaf(), "payload iteration on a {} container", self.kind());
        match self {
            Self::LeafArray(c) => c.entries(),
            Self::LeafBitmap(c) => c.entries(),
            Self::Array(_) | Self::Bitmap(_) => Entries::Empty,
        }
    }

    /// Keys of the live entries, in storage order.
    #[cfg(test)]
    pub(crate) fn keys(&self) -> Vec<u16> {
        match self {
            Self::Array(c) => c.keys().to_vec(),
            Self::LeafArray(c) => c.keys().to_vec(),
            Self::Bitmap(c) => c.entries().map(|(k, _)| k).collect(),
            Self::LeafBitmap(c) => c.entries().map(|(k, _)| k).collect(),
        }
    }

    pub(crate) fn heap_bytes(&self) -> usize {
        match self {
            Self::Array(c) => c.heap_bytes(),
            Self::Bitmap(c) => c.heap_bytes(),
            Self::LeafArray(c) => c.heap_bytes(),
            Self::LeafBitmap(c) => c.heap_bytes(),
        }
    }
}

/// Iterator over the live entries of one container.
///
/// Array kinds walk `[0, len)`; bitmap kinds walk the presence bits of the
/// whole domain.
pub(crate) enum Entries<'a, T> {
    Array {
        keys: std::slice::Iter<'a, u16>,
        slots: std::slice::Iter<'a, T>,
    },
    Bitmap {
        ones: bitset::Ones<'a>,
        slots: &'a [T],
    },
    Empty,
}

impl<'a, T> Iterator for Entries<'a, T> {
    type Item = (u16, &'a T);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Entries::Array { keys, slots } => Some((*keys.next()?, slots.next()?)),
            Entries::Bitmap { ones, slots } => {
                let key = ones.next()?;
                let slots: &'a [T] = slots;
                Some((key as u16, &slots[key]))
            }
            Entries::Empty => None,
        }
    }
}
