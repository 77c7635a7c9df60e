use std::mem;

use super::Entries;
use crate::error::Result;
use crate::scan;

/// Parallel `keys`/`slots` arrays with an amortized-sort watermark.
///
/// `keys[..sorted]` is strictly ascending; `keys[sorted..]` is in insertion
/// order. Capacity starts at the configured initial size and doubles when
/// full. A doubling from a capacity at or above the resort threshold leaves
/// the whole buffer sorted, so each entry is sorted at most once per
/// doubling.
pub(crate) struct ArrayContainer<T> {
    keys: Vec<u16>,
    slots: Vec<T>,
    sorted: u32,
    capacity: u32,
}

impl<T> ArrayContainer<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Result<Self> {
        debug_assert!(capacity > 0 && capacity <= 1 << 16);
        let mut keys = Vec::new();
        keys.try_reserve_exact(capacity)?;
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;
        Ok(Self {
            keys,
            slots,
            sorted: 0,
            capacity: capacity as u32,
        })
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity as usize
    }

    #[inline]
    pub(crate) fn sorted_len(&self) -> usize {
        self.sorted as usize
    }

    #[cfg(test)]
    pub(crate) fn keys(&self) -> &[u16] {
        &self.keys
    }

    #[inline]
    pub(crate) fn find(&self, key: u16) -> Option<usize> {
        scan::find(&self.keys, self.sorted as usize, key)
    }

    #[inline]
    pub(crate) fn slot(&self, pos: usize) -> &T {
        &self.slots[pos]
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, pos: usize) -> &mut T {
        &mut self.slots[pos]
    }

    /// Appends `key` (which must be absent) and returns its position.
    pub(crate) fn push(&mut self, key: u16, slot: T, resort_threshold: usize) -> Result<usize> {
        debug_assert!(self.find(key).is_none(), "duplicate key {key} appended");
        if self.keys.len() == self.capacity as usize {
            self.grow(resort_threshold)?;
        }
        let pos = self.keys.len();
        self.keys.push(key);
        self.slots.push(slot);
        Ok(pos)
    }

    fn grow(&mut self, resort_threshold: usize) -> Result<()> {
        self.grow_to(self.capacity as usize * 2, resort_threshold)
    }

    /// Moves the entries into buffers of `new_capacity`. On failure the
    /// container keeps its old buffers, watermark and capacity.
    fn grow_to(&mut self, new_capacity: usize, resort_threshold: usize) -> Result<()> {
        let old_capacity = self.capacity as usize;
        let keys = mem::take(&mut self.keys);
        let slots = mem::take(&mut self.slots);
        match scan::regrow(keys, slots, self.sorted as usize, new_capacity, resort_threshold) {
            Ok((keys, slots, sorted)) => {
                if sorted != self.sorted as usize {
                    tracing::trace!(old_capacity, new_capacity, sorted, "resorted array container");
                }
                self.keys = keys;
                self.slots = slots;
                self.sorted = sorted as u32;
                self.capacity = new_capacity as u32;
                Ok(())
            }
            Err((keys, slots, e)) => {
                self.keys = keys;
                self.slots = slots;
                Err(e.into())
            }
        }
    }

    pub(crate) fn entries(&self) -> Entries<'_, T> {
        Entries::Array {
            keys: self.keys.iter(),
            slots: self.slots.iter(),
        }
    }

    pub(crate) fn heap_bytes(&self) -> usize {
        self.keys.capacity() * mem::size_of::<u16>() + self.slots.capacity() * mem::size_of::<T>()
    }
}
