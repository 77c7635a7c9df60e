use std::fmt;

use crate::board::Layered;
use crate::config::TrieConfig;
use crate::error::Result;
use crate::trie::{MissPoint, Probe, Trie, TrieStats};

/// A map from boards to small payloads, e.g. search distance or the move that
/// reached a board.
///
/// Same layout as [`BoardSet`](crate::BoardSet), with the payload stored in
/// the leaf level. Bitmap leaves preallocate a payload slot for every layer
/// value, which is why inserting requires `V: Default`.
///
/// ```
/// use board_trie::{BoardMap, FixedBoard};
///
/// let mut dist: BoardMap<FixedBoard<3, 3>, u16> = BoardMap::new();
/// let start = FixedBoard::new();
///
/// assert_eq!(dist.insert(&start, 0).unwrap(), (&mut 0, true));
/// assert_eq!(dist.insert(&start, 5).unwrap(), (&mut 0, false));
/// assert_eq!(dist.insert_or_update(&start, 5).unwrap(), (&mut 5, false));
/// assert_eq!(dist.get(&start), Some(&5));
/// ```
pub struct BoardMap<B, V, const BITS: u32 = 3> {
    pub(crate) trie: Trie<B, V, BITS>,
}

impl<B: Layered, V, const BITS: u32> BoardMap<B, V, BITS> {
    pub fn new() -> Self {
        Self { trie: Trie::new() }
    }

    pub fn with_config(config: TrieConfig) -> Result<Self> {
        Ok(Self {
            trie: Trie::with_config(config)?,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.trie.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    pub fn contains_key(&self, board: &B) -> bool {
        self.trie.contains(board)
    }

    pub fn get(&self, board: &B) -> Option<&V> {
        self.trie.get(board)
    }

    pub fn get_mut(&mut self, board: &B) -> Option<&mut V> {
        self.trie.get_mut(board)
    }

    /// Looks `board` up, remembering where the lookup failed so a following
    /// [`insert_new`](Self::insert_new) can skip the matched prefix.
    pub fn probe(&self, board: &B) -> Probe<'_, V> {
        self.trie.probe(board)
    }

    /// Not supported: containers only grow. Always returns
    /// [`TrieError::Unsupported`](crate::TrieError::Unsupported) and leaves the
    /// map unchanged.
    pub fn remove(&mut self, board: &B) -> Result<bool> {
        self.trie.remove(board)
    }

    /// Releases all nodes and payloads, leaving an empty map that can be
    /// reused.
    pub fn shutdown(&mut self) {
        self.trie.shutdown();
    }

    /// Every stored board with its payload, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (B, &V)> + '_ {
        self.trie.iter()
    }

    pub fn stats(&self) -> TrieStats {
        self.trie.stats()
    }

    pub fn memory_usage(&self) -> usize {
        self.trie.memory_usage()
    }

    pub fn config(&self) -> &TrieConfig {
        self.trie.config()
    }

    pub fn row_order(&self) -> &[usize] {
        self.trie.row_order()
    }
}

impl<B: Layered, V: Default, const BITS: u32> BoardMap<B, V, BITS> {
    /// Inserts `value` if `board` is absent. Returns the stored payload and
    /// whether an insert happened; an existing payload is left untouched.
    pub fn insert(&mut self, board: &B, value: V) -> Result<(&mut V, bool)> {
        self.trie.insert(board, value, false)
    }

    /// Same contract as [`insert`](Self::insert).
    pub fn try_insert(&mut self, board: &B, value: V) -> Result<(&mut V, bool)> {
        self.insert(board, value)
    }

    /// Inserts `value`, replacing the payload if `board` is already present.
    pub fn insert_or_update(&mut self, board: &B, value: V) -> Result<(&mut V, bool)> {
        self.trie.insert(board, value, true)
    }

    /// Inserts a board that a previous [`probe`](Self::probe) reported absent.
    ///
    /// No mutation may happen between the probe and this call. In release
    /// builds a board that is already present is stored twice, corrupting the
    /// map.
    pub fn insert_new(&mut self, board: &B, miss: MissPoint, value: V) -> Result<&mut V> {
        self.trie.insert_new(board, miss, value)
    }
}

impl<B: Layered, V, const BITS: u32> Default for BoardMap<B, V, BITS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Layered + fmt::Debug, V: fmt::Debug, const BITS: u32> fmt::Debug for BoardMap<B, V, BITS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
