//! The row-decomposed trie shared by [`BoardSet`](crate::BoardSet) and
//! [`BoardMap`](crate::BoardMap).
//!
//! A board of `DEPTH` layers is stored as a path of `DEPTH` containers: one
//! per layer, visited in [`row_order`], each keyed by that layer's packed
//! value. Containers above the last depth map layer values to child nodes;
//! the container at the last depth is a leaf holding the payload.
//!
//! Nodes live in one arena and refer to each other by index. Every node has
//! exactly one parent and the arena is append-only, so releasing the arena
//! releases the whole tree.

use std::marker::PhantomData;
use std::mem;

use crate::board::Layered;
use crate::config::TrieConfig;
use crate::container::{Container, ContainerKind, Entries, NodeId};
use crate::error::{Result, TrieError};

/// Layer visiting order for `rows` layers: outer rows first, alternating
/// from the top and the bottom, with an unpaired middle row last.
///
/// ```
/// assert_eq!(board_trie::row_order(5), [0, 4, 1, 3, 2]);
/// assert_eq!(board_trie::row_order(4), [0, 3, 1, 2]);
/// ```
pub fn row_order(rows: usize) -> Vec<usize> {
    let mut order = Vec::with_capacity(rows);
    let (mut lo, mut hi) = (0, rows);
    while lo < hi {
        order.push(lo);
        lo += 1;
        if lo < hi {
            hi -= 1;
            order.push(hi);
        }
    }
    order
}

/// Where a failed lookup stopped: the deepest existing node on the key's path
/// and the depth whose layer value was missing there.
///
/// Pass it back to `append_new`/`insert_new` to continue from that node
/// without walking the matched prefix again. It is only valid until the next
/// mutation that could add the same key, and never across a `shutdown`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MissPoint {
    node: Option<NodeId>,
    depth: usize,
    epoch: u32,
}

impl MissPoint {
    /// Depth at which the key's path left the trie.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Result of a lookup that remembers where it failed.
#[derive(Debug)]
pub enum Probe<'a, V> {
    Present(&'a V),
    Absent(MissPoint),
}

impl<V> Probe<'_, V> {
    pub fn is_present(&self) -> bool {
        matches!(self, Probe::Present(_))
    }
}

/// Node and entry counts for a trie.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrieStats {
    pub array_nodes: usize,
    pub bitmap_nodes: usize,
    pub leaf_array_nodes: usize,
    pub leaf_bitmap_nodes: usize,
    /// Entries stored across all containers, internal and leaf.
    pub entries: usize,
    /// Entries inside sorted prefixes (bitmap entries always count).
    pub sorted_entries: usize,
    /// Heap bytes held by container buffers.
    pub heap_bytes: usize,
}

impl TrieStats {
    pub fn nodes(&self) -> usize {
        self.array_nodes + self.bitmap_nodes + self.leaf_array_nodes + self.leaf_bitmap_nodes
    }
}

pub(crate) struct Trie<B, V, const BITS: u32> {
    nodes: Vec<Container<V>>,
    root: Option<NodeId>,
    len: usize,
    row_order: Box<[usize]>,
    /// Bumped by `shutdown` so stale miss points can be caught.
    epoch: u32,
    config: TrieConfig,
    _board: PhantomData<fn(&B)>,
}

impl<B: Layered, V, const BITS: u32> Trie<B, V, BITS> {
    const SHAPE: () = {
        assert!(B::DEPTH >= 1, "a board needs at least one layer");
        assert!(BITS >= 1, "cells need at least one bit");
        assert!(B::WIDTH as u64 * BITS as u64 <= 16, "a layer value must fit in 16 bits");
    };

    /// Bits per layer value; bitmap containers span `2^LAYER_BITS` slots.
    const LAYER_BITS: u32 = B::WIDTH as u32 * BITS;

    pub(crate) fn new() -> Self {
        Self::from_valid_config(TrieConfig::default())
    }

    pub(crate) fn with_config(config: TrieConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: TrieConfig) -> Self {
        let () = Self::SHAPE;
        let row_order = row_order(B::DEPTH).into_boxed_slice();
        tracing::debug!(
            depth = B::DEPTH,
            layer_bits = Self::LAYER_BITS,
            row_order = ?row_order,
            "created board trie"
        );
        Self {
            nodes: Vec::new(),
            root: None,
            len: 0,
            row_order,
            epoch: 0,
            config,
            _board: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn config(&self) -> &TrieConfig {
        &self.config
    }

    pub(crate) fn row_order(&self) -> &[usize] {
        &self.row_order
    }

    #[inline]
    fn last_depth() -> usize {
        B::DEPTH - 1
    }

    #[inline]
    fn layer(&self, board: &B, depth: usize) -> u16 {
        let value = board.layer_value(self.row_order[depth], BITS);
        debug_assert!(
            u32::from(value) < 1 << Self::LAYER_BITS,
            "layer value {value} outside {} bits",
            Self::LAYER_BITS
        );
        value
    }

    #[inline]
    fn node(&self, id: NodeId) -> &Container<V> {
        &self.nodes[id.index()]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Container<V> {
        &mut self.nodes[id.index()]
    }

    pub(crate) fn get(&self, board: &B) -> Option<&V> {
        match self.probe(board) {
            Probe::Present(v) => Some(v),
            Probe::Absent(_) => None,
        }
    }

    pub(crate) fn contains(&self, board: &B) -> bool {
        let last = Self::last_depth();
        let Some(mut node) = self.root else {
            return false;
        };
        for depth in 0..last {
            match self.node(node).child(self.layer(board, depth)) {
                Some(child) => node = child,
                None => return false,
            }
        }
        self.node(node).has_leaf(self.layer(board, last))
    }

    /// Descends through the first `DEPTH - 1` layers via child lookups and
    /// finishes with a leaf lookup.
    pub(crate) fn probe(&self, board: &B) -> Probe<'_, V> {
        let last = Self::last_depth();
        let epoch = self.epoch;
        let miss = |node: Option<NodeId>, depth: usize| {
            Probe::Absent(MissPoint { node, depth, epoch })
        };

        let Some(mut node) = self.root else {
            return miss(None, 0);
        };
        for depth in 0..last {
            match self.node(node).child(self.layer(board, depth)) {
                Some(child) => node = child,
                None => return miss(Some(node), depth),
            }
        }
        let leaf = self.node(node);
        match leaf.find_value(self.layer(board, last)) {
            Some(pos) => Probe::Present(leaf.value(pos)),
            None => miss(Some(node), last),
        }
    }

    pub(crate) fn get_mut(&mut self, board: &B) -> Option<&mut V> {
        let last = Self::last_depth();
        let mut node = self.root?;
        for depth in 0..last {
            node = self.node(node).child(self.layer(board, depth))?;
        }
        let layer = self.layer(board, last);
        let pos = self.node(node).find_value(layer)?;
        Some(self.node_mut(node).value_mut(pos))
    }

    /// Depth-first walk over every stored board and its payload.
    pub(crate) fn iter(&self) -> Iter<'_, B, V, BITS> {
        Iter {
            trie: self,
            stack: self.root.map(|r| (r, 0, 0)).into_iter().collect(),
            path: vec![0; B::DEPTH],
            leaf: Entries::Empty,
        }
    }

    /// Releases every node. The trie is empty and usable afterwards; calling
    /// this again is a no-op.
    pub(crate) fn shutdown(&mut self) {
        let nodes = mem::take(&mut self.nodes);
        let entries = mem::replace(&mut self.len, 0);
        self.root = None;
        self.epoch = self.epoch.wrapping_add(1);
        if !nodes.is_empty() {
            tracing::debug!(nodes = nodes.len(), entries, "released board trie");
        }
    }

    pub(crate) fn remove(&mut self, _board: &B) -> Result<bool> {
        Err(TrieError::Unsupported("remove"))
    }

    pub(crate) fn stats(&self) -> TrieStats {
        let mut stats = TrieStats::default();
        for node in &self.nodes {
            match node.kind() {
                ContainerKind::Array => stats.array_nodes += 1,
                ContainerKind::Bitmap => stats.bitmap_nodes += 1,
                ContainerKind::LeafArray => stats.leaf_array_nodes += 1,
                ContainerKind::LeafBitmap => stats.leaf_bitmap_nodes += 1,
            }
            stats.entries += node.len();
            stats.sorted_entries += node.sorted_len();
            stats.heap_bytes += node.heap_bytes();
        }
        stats
    }

    /// Approximate heap bytes: the arena plus every container's buffers.
    pub(crate) fn memory_usage(&self) -> usize {
        self.nodes.capacity() * mem::size_of::<Container<V>>()
            + self.nodes.iter().map(Container::heap_bytes).sum::<usize>()
            + self.row_order.len() * mem::size_of::<usize>()
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[cfg(test)]
    pub(crate) fn container(&self, id: NodeId) -> &Container<V> {
        self.node(id)
    }

    #[cfg(test)]
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Kinds of the containers visited while looking `board` up.
    #[cfg(test)]
    pub(crate) fn path_kinds(&self, board: &B) -> Vec<ContainerKind> {
        let mut kinds = Vec::new();
        let Some(mut node) = self.root else {
            return kinds;
        };
        for depth in 0..B::DEPTH {
            let c = self.node(node);
            kinds.push(c.kind());
            if c.is_leaf() {
                break;
            }
            match c.child(self.layer(board, depth)) {
                Some(child) => node = child,
                None => break,
            }
        }
        kinds
    }
}

impl<B: Layered, V: Default, const BITS: u32> Trie<B, V, BITS> {
    /// Inserts `value` under `board` unless present. Returns the stored
    /// payload and whether it was inserted. With `overwrite`, an existing
    /// payload is replaced by `value`.
    pub(crate) fn insert(
        &mut self,
        board: &B,
        value: V,
        overwrite: bool,
    ) -> Result<(&mut V, bool)> {
        let last = Self::last_depth();
        let mut node = match self.root {
            Some(root) => root,
            None => {
                let root = self.alloc_node(0)?;
                self.root = Some(root);
                root
            }
        };

        for depth in 0..last {
            let layer = self.layer(board, depth);
            match self.node(node).child(layer) {
                Some(child) => node = child,
                None => return Ok((self.build_from(node, depth, board, value)?, true)),
            }
        }

        let layer = self.layer(board, last);
        match self.node(node).find_value(layer) {
            Some(pos) => {
                let slot = self.node_mut(node).value_mut(pos);
                if overwrite {
                    *slot = value;
                }
                Ok((slot, false))
            }
            None => Ok((self.build_from(node, last, board, value)?, true)),
        }
    }

    /// Inserts a key known to be absent, continuing from where `miss` says
    /// its lookup stopped.
    ///
    /// The key must really be absent. In release builds a present key is not
    /// detected and ends up stored twice.
    pub(crate) fn insert_new(&mut self, board: &B, miss: MissPoint, value: V) -> Result<&mut V> {
        debug_assert_eq!(miss.epoch, self.epoch, "miss point predates a shutdown");
        debug_assert!(!self.contains(board), "insert_new on a present key");
        match miss.node {
            Some(node) => self.build_from(node, miss.depth, board, value),
            None => Ok(self.insert(board, value, false)?.0),
        }
    }

    /// Creates the path for `board` below `node`, whose layer at `depth` is
    /// absent. None of the new nodes can contain the rest of the key, so no
    /// lookups are needed on the way down.
    fn build_from(
        &mut self,
        mut node: NodeId,
        depth: usize,
        board: &B,
        value: V,
    ) -> Result<&mut V> {
        let last = Self::last_depth();
        let threshold = self.config.resort_threshold;
        for d in depth..last {
            let child = self.alloc_node(d + 1)?;
            let layer = self.layer(board, d);
            if let Err(e) = self.node_mut(node).push_child(layer, child, threshold) {
                // The child is the newest node; drop it so nothing unreachable
                // stays in the arena.
                self.nodes.truncate(child.index());
                return Err(e);
            }
            node = child;
        }
        let layer = self.layer(board, last);
        let pos = self.node_mut(node).push_value(layer, value, threshold)?;
        self.len += 1;
        Ok(self.node_mut(node).value_mut(pos))
    }

    fn alloc_node(&mut self, depth: usize) -> Result<NodeId> {
        let kind = ContainerKind::new(self.config.layout.at(depth), depth == Self::last_depth());
        let id = NodeId::from_index(self.nodes.len()).ok_or(TrieError::NodeLimit)?;
        let container = Container::new(kind, self.config.initial_capacity, Self::LAYER_BITS)?;
        self.nodes.try_reserve(1)?;
        self.nodes.push(container);
        Ok(id)
    }
}

/// Iterator over `(board, payload)` pairs. Order is unspecified.
pub(crate) struct Iter<'a, B, V, const BITS: u32> {
    trie: &'a Trie<B, V, BITS>,
    /// Pending nodes with their depth and the layer value leading to them.
    stack: Vec<(NodeId, usize, u16)>,
    /// Layer values of the current path, by depth.
    path: Vec<u16>,
    leaf: Entries<'a, V>,
}

impl<'a, B: Layered, V, const BITS: u32> Iterator for Iter<'a, B, V, BITS> {
    type Item = (B, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, value)) = self.leaf.next() {
                let last = self.path.len() - 1;
                self.path[last] = key;
                let mut rows = vec![0u16; self.path.len()];
                for (depth, &layer) in self.path.iter().enumerate() {
                    rows[self.trie.row_order[depth]] = layer;
                }
                return Some((B::from_layers(&rows, BITS), value));
            }

            let (id, depth, edge) = self.stack.pop()?;
            if depth > 0 {
                self.path[depth - 1] = edge;
            }
            let trie = self.trie;
            let node = trie.node(id);
            if node.is_leaf() {
                self.leaf = node.values();
            } else {
                self.stack
                    .extend(node.children().map(|(key, &child)| (child, depth + 1, key)));
            }
        }
    }
}
