//! Fixed-size boards of 3-bit cells and their packed encodings.

use crate::key::CompactKey;

/// Bits used per cell by the whole-board encodings.
pub const CELL_BITS: u32 = 3;

/// Largest value a cell can hold.
pub const MAX_CELL: u8 = (1 << CELL_BITS) - 1;

/// A value the trie can decompose into a fixed number of layers.
///
/// Every layer is packed into a `u16` "layer value" using `bits` bits per cell,
/// lowest cell first. The trie stores one level per layer.
pub trait Layered {
    /// Cells per layer.
    const WIDTH: usize;
    /// Number of layers, i.e. the depth of the trie.
    const DEPTH: usize;

    /// Packs layer `row` with `bits` bits per cell.
    fn layer_value(&self, row: usize, bits: u32) -> u16;

    /// Rebuilds a value from its layer values, indexed by row.
    fn from_layers(layers: &[u16], bits: u32) -> Self;
}

/// An `X` by `Y` grid of cells in `0..=MAX_CELL`.
///
/// Rows are stored as plain byte arrays with no padding, so the derived
/// equality and hashing compare whole rows at once. Every mutator keeps cell
/// values inside the 3-bit range.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FixedBoard<const X: usize, const Y: usize> {
    cells: [[u8; X]; Y],
}

impl<const X: usize, const Y: usize> FixedBoard<X, Y> {
    pub const CELLS: usize = X * Y;

    const PACKED_FITS: () = assert!(
        X * Y * CELL_BITS as usize <= 128,
        "board does not fit a 128-bit packed encoding"
    );

    /// A zero-filled board.
    pub const fn new() -> Self {
        Self { cells: [[0; X]; Y] }
    }

    pub fn from_rows(rows: [[u8; X]; Y]) -> Self {
        let mut board = Self::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                board.set(x, y, v);
            }
        }
        board
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.cells[y][x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        debug_assert!(value <= MAX_CELL, "cell value {value} exceeds {MAX_CELL}");
        self.cells[y][x] = value & MAX_CELL;
    }

    /// Cell at row-major index `i`.
    #[inline]
    pub fn get_index(&self, i: usize) -> u8 {
        self.cells[i / X][i % X]
    }

    #[inline]
    pub fn set_index(&mut self, i: usize, value: u8) {
        self.set(i % X, i / X, value);
    }

    pub fn rows(&self) -> &[[u8; X]; Y] {
        &self.cells
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = u8> + '_ {
        self.cells.iter().flat_map(|row| row.iter().copied())
    }

    /// Whole board packed at 3 bits per cell, row-major, lowest cell first.
    pub fn packed(&self) -> u128 {
        let () = Self::PACKED_FITS;
        self.cells()
            .enumerate()
            .fold(0u128, |acc, (i, c)| acc | (u128::from(c) << (i as u32 * CELL_BITS)))
    }

    /// Like [`packed`](Self::packed), but cells equal to `empty` are skipped and
    /// take no bits.
    pub fn packed_compact(&self, empty: u8) -> u128 {
        let () = Self::PACKED_FITS;
        let mut out = 0u128;
        let mut shift = 0u32;
        for c in self.cells().filter(|&c| c != empty) {
            out |= u128::from(c) << shift;
            shift += CELL_BITS;
        }
        out
    }

    pub fn compact_key(&self) -> CompactKey {
        CompactKey::from(self.packed())
    }
}

impl<const X: usize, const Y: usize> Default for FixedBoard<X, Y> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const X: usize, const Y: usize> Layered for FixedBoard<X, Y> {
    const WIDTH: usize = X;
    const DEPTH: usize = Y;

    #[inline]
    fn layer_value(&self, row: usize, bits: u32) -> u16 {
        let mut value = 0u32;
        for (x, &c) in self.cells[row].iter().enumerate() {
            debug_assert!(u32::from(c) < (1 << bits), "cell {c} does not fit {bits} bits");
            value |= u32::from(c) << (bits * x as u32);
        }
        debug_assert!(value <= u32::from(u16::MAX));
        value as u16
    }

    fn from_layers(layers: &[u16], bits: u32) -> Self {
        debug_assert_eq!(layers.len(), Y);
        let mask = (1u32 << bits) - 1;
        let mut board = Self::new();
        for (y, &layer) in layers.iter().enumerate() {
            for x in 0..X {
                board.set(x, y, ((u32::from(layer) >> (bits * x as u32)) & mask) as u8);
            }
        }
        board
    }
}
