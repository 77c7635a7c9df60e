use std::fmt;

use crate::board::Layered;
use crate::config::TrieConfig;
use crate::error::Result;
use crate::trie::{MissPoint, Probe, Trie, TrieStats};

/// A set of boards, stored as a row-decomposed trie.
///
/// `BITS` is the number of bits each cell occupies in a layer value; a layer
/// of `B::WIDTH` cells must fit in 16 bits.
///
/// ```
/// use board_trie::{BoardSet, FixedBoard};
///
/// let mut seen: BoardSet<FixedBoard<4, 4>> = BoardSet::new();
/// let mut board = FixedBoard::new();
/// board.set(1, 2, 5);
///
/// assert!(seen.try_append(&board).unwrap());
/// assert!(!seen.try_append(&board).unwrap());
/// assert!(seen.contains(&board));
/// assert_eq!(seen.len(), 1);
/// ```
pub struct BoardSet<B, const BITS: u32 = 3> {
    pub(crate) trie: Trie<B, (), BITS>,
}

impl<B: Layered, const BITS: u32> BoardSet<B, BITS> {
    pub fn new() -> Self {
        Self { trie: Trie::new() }
    }

    pub fn with_config(config: TrieConfig) -> Result<Self> {
        Ok(Self {
            trie: Trie::with_config(config)?,
        })
    }

    /// Number of distinct boards stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.trie.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    pub fn contains(&self, board: &B) -> bool {
        self.trie.contains(board)
    }

    /// Inserts `board`. Inserting a board that is already present does
    /// nothing.
    pub fn append(&mut self, board: &B) -> Result<()> {
        self.try_append(board).map(drop)
    }

    /// Inserts `board` and reports whether it was new.
    pub fn try_append(&mut self, board: &B) -> Result<bool> {
        Ok(self.trie.insert(board, (), false)?.1)
    }

    /// Looks `board` up, remembering where the lookup failed so a following
    /// [`append_new`](Self::append_new) can skip the matched prefix.
    pub fn probe(&self, board: &B) -> Probe<'_, ()> {
        self.trie.probe(board)
    }

    /// Inserts a board that a previous [`probe`](Self::probe) reported absent.
    ///
    /// No mutation may happen between the probe and this call. The board is
    /// not looked up again: in release builds, appending a board that is
    /// already present stores a duplicate leaf entry and corrupts the set.
    pub fn append_new(&mut self, board: &B, miss: MissPoint) -> Result<()> {
        self.trie.insert_new(board, miss, ()).map(drop)
    }

    /// Not supported: containers only grow. Always returns
    /// [`TrieError::Unsupported`](crate::TrieError::Unsupported) and leaves the
    /// set unchanged.
    pub fn remove(&mut self, board: &B) -> Result<bool> {
        self.trie.remove(board)
    }

    /// Releases all nodes, leaving an empty set that can be reused.
    pub fn shutdown(&mut self) {
        self.trie.shutdown();
    }

    /// Every stored board, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = B> + '_ {
        self.trie.iter().map(|(board, _)| board)
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

    /// The order in which board rows are visited, top of the trie first.
    pub fn row_order(&self) -> &[usize] {
        self.trie.row_order()
    }
}

impl<B: Layered, const BITS: u32> Default for BoardSet<B, BITS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Layered + fmt::Debug, const BITS: u32> fmt::Debug for BoardSet<B, BITS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Layout;
    use crate::container::Representation;
    use crate::testutil::{sample_5x5, Board5};
    use crate::TrieError;

    #[test]
    fn test_append_twice() {
        let mut s: BoardSet<Board5> = BoardSet::new();
        let b = sample_5x5();
        s.append(&b).unwrap();
        s.append(&b).unwrap();
        assert_eq!(s.len(), 1);
        assert!(s.contains(&b));
    }

    #[test]
    fn test_one_cell_difference_is_absent() {
        let mut s: BoardSet<Board5> = BoardSet::new();
        let b = sample_5x5();
        s.append(&b).unwrap();
        for i in 0..25 {
            let mut other = b;
            other.set_index(i, (b.get_index(i) + 1) % 8);
            assert!(!s.contains(&other), "cell {i}");
        }
    }

    #[test]
    fn test_try_append_reports_novelty() {
        let mut s: BoardSet<Board5> = BoardSet::new();
        let b = sample_5x5();
        assert!(s.try_append(&b).unwrap());
        assert!(!s.try_append(&b).unwrap());
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_probe_then_append_new() {
        let mut s: BoardSet<Board5> = BoardSet::new();
        let mut b = sample_5x5();
        s.append(&b).unwrap();
        b.set(2, 3, 0);
        match s.probe(&b) {
            Probe::Absent(miss) => s.append_new(&b, miss).unwrap(),
            Probe::Present(_) => panic!("board should be absent"),
        }
        assert!(s.contains(&b));
        assert!(s.contains(&sample_5x5()));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_many_boards_all_layouts() {
        for layout in [
            Layout::default(),
            Layout::uniform(Representation::Bitmap),
            "array,bitmap".parse().unwrap(),
        ] {
            let config = TrieConfig {
                initial_capacity: 2,
                resort_threshold: 8,
                layout,
            };
            let mut s: BoardSet<Board5> = BoardSet::with_config(config).unwrap();
            let mut boards = Vec::new();
            for i in 0..600u32 {
                let mut b = sample_5x5();
                // Vary the first visited row widely so the root container grows.
                b.set(0, 0, (i % 8) as u8);
                b.set(1, 0, ((i / 8) % 8) as u8);
                b.set(2, 0, ((i / 64) % 8) as u8);
                b.set(2, 2, (i % 3) as u8);
                boards.push(b);
            }
            for b in &boards {
                s.append(b).unwrap();
            }
            let distinct: std::collections::HashSet<Board5> = boards.iter().copied().collect();
            assert_eq!(s.len(), distinct.len());
            for b in &distinct {
                assert!(s.contains(b));
            }
            assert_eq!(s.iter().count(), distinct.len());
        }
    }

    #[test]
    fn test_shutdown_then_reuse() {
        let mut s: BoardSet<Board5> = BoardSet::new();
        let b = sample_5x5();
        s.append(&b).unwrap();
        assert!(s.memory_usage() > 0);
        s.shutdown();
        s.shutdown();
        assert!(s.is_empty());
        assert!(!s.contains(&b));
        assert_eq!(s.stats().nodes(), 0);
        assert!(s.try_append(&b).unwrap());
    }

    #[test]
    fn test_remove_is_unsupported() {
        let mut s: BoardSet<Board5> = BoardSet::new();
        let b = sample_5x5();
        s.append(&b).unwrap();
        assert!(matches!(s.remove(&b), Err(TrieError::Unsupported(_))));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_row_order_for_five_rows() {
        let s: BoardSet<Board5> = BoardSet::default();
        assert_eq!(s.row_order(), [0, 4, 1, 3, 2]);
    }

    #[test]
    fn test_custom_bits() {
        // 4 bits per cell, 4 cells per row = 16-bit layer values.
        let mut s: BoardSet<crate::FixedBoard<4, 3>, 4> = BoardSet::new();
        let b = crate::FixedBoard::from_rows([[7, 7, 7, 7], [0, 1, 2, 3], [4, 5, 6, 7]]);
        assert!(s.try_append(&b).unwrap());
        assert!(s.contains(&b));
        assert_eq!(s.iter().collect::<Vec<_>>(), [b]);
    }
}
