use crate::error::Result;

/// Fixed-size bitset over `0..len`.
pub(crate) struct BitSet {
    words: Box<[u64]>,
}

impl BitSet {
    pub(crate) fn new(len: usize) -> Result<Self> {
        let n = len.div_ceil(64);
        let mut words = Vec::new();
        words.try_reserve_exact(n)?;
        words.resize(n, 0);
        Ok(Self {
            words: words.into_boxed_slice(),
        })
    }

    #[inline]
    pub(crate) fn contains(&self, i: usize) -> bool {
        self.words[i / 64] & (1 << (i % 64)) != 0
    }

    /// Sets bit `i`; returns whether it was clear before.
    #[inline]
    pub(crate) fn insert(&mut self, i: usize) -> bool {
        let word = &mut self.words[i / 64];
        let bit = 1 << (i % 64);
        let was_clear = *word & bit == 0;
        *word |= bit;
        was_clear
    }

    #[cfg(test)]
    pub(crate) fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub(crate) fn ones(&self) -> Ones<'_> {
        Ones {
            words: &self.words,
            idx: 0,
            cur: self.words.first().copied().unwrap_or(0),
        }
    }

    pub(crate) fn heap_bytes(&self) -> usize {
        self.words.len() * 8
    }
}

/// Ascending indices of set bits.
pub(crate) struct Ones<'a> {
    words: &'a [u64],
    idx: usize,
    cur: u64,
}

impl Iterator for Ones<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        while self.cur == 0 {
            self.idx += 1;
            self.cur = *self.words.get(self.idx)?;
        }
        let bit = self.cur.trailing_zeros() as usize;
        self.cur &= self.cur - 1;
        Some(self.idx * 64 + bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_contains_iter() {
        let mut s = BitSet::new(200).unwrap();
        assert_eq!(s.ones().count(), 0);
        for i in [0, 63, 64, 130, 199] {
            assert!(s.insert(i));
        }
        assert!(!s.insert(64));
        assert!(s.contains(130));
        assert!(!s.contains(131));
        assert_eq!(s.count_ones(), 5);
        assert_eq!(s.ones().collect::<Vec<_>>(), [0, 63, 64, 130, 199]);
    }

    #[test]
    fn test_small_domain() {
        let mut s = BitSet::new(8).unwrap();
        s.insert(7);
        assert_eq!(s.ones().collect::<Vec<_>>(), [7]);
        assert_eq!(s.heap_bytes(), 8);
    }
}
