use std::mem;

use super::bitset::BitSet;
use super::Entries;
use crate::error::Result;

/// Direct-indexed container over the full layer value domain.
///
/// Slots for every value are allocated up front and filled with
/// `T::default()`; the presence bitmap says which are live. Never grows.
pub(crate) struct BitmapContainer<T> {
    exists: BitSet,
    slots: Box<[T]>,
    len: usize,
}

impl<T: Default> BitmapContainer<T> {
    pub(crate) fn new(domain_bits: u32) -> Result<Self> {
        debug_assert!(domain_bits <= 16);
        let domain = 1usize << domain_bits;
        let exists = BitSet::new(domain)?;
        let mut slots = Vec::new();
        slots.try_reserve_exact(domain)?;
        slots.resize_with(domain, T::default);
        Ok(Self {
            exists,
            slots: slots.into_boxed_slice(),
            len: 0,
        })
    }
}

impl<T> BitmapContainer<T> {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn domain(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn find(&self, key: u16) -> Option<usize> {
        let i = usize::from(key);
        debug_assert!(i < self.domain(), "layer value {key} outside bitmap domain");
        self.exists.contains(i).then_some(i)
    }

    #[inline]
    pub(crate) fn slot(&self, pos: usize) -> &T {
        &self.slots[pos]
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, pos: usize) -> &mut T {
        &mut self.slots[pos]
    }

    /// Stores `slot` under `key` (which must be absent) and returns its position.
    #[inline]
    pub(crate) fn insert(&mut self, key: u16, slot: T) -> usize {
        let i = usize::from(key);
        debug_assert!(i < self.domain(), "layer value {key} outside bitmap domain");
        let fresh = self.exists.insert(i);
        debug_assert!(fresh, "duplicate key {key} appended");
        self.slots[i] = slot;
        self.len += 1;
        i
    }

    pub(crate) fn entries(&self) -> Entries<'_, T> {
        Entries::Bitmap {
            ones: self.exists.ones(),
            slots: &self.slots,
        }
    }

    pub(crate) fn heap_bytes(&self) -> usize {
        self.exists.heap_bytes() + self.slots.len() * mem::size_of::<T>()
    }
}
