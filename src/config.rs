//! Trie configuration.

use std::str::FromStr;

use crate::container::Representation;
use crate::error::{Result, TrieError};

/// Which container representation each trie depth uses.
///
/// The choice is fixed when a node is created; containers never convert
/// between representations afterwards. Depths beyond the explicit list use
/// the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    depths: Vec<Representation>,
    fallback: Representation,
}

impl Layout {
    pub fn new(depths: Vec<Representation>) -> Self {
        Self {
            depths,
            fallback: Representation::Array,
        }
    }

    /// Every depth uses `rep`.
    pub fn uniform(rep: Representation) -> Self {
        Self {
            depths: Vec::new(),
            fallback: rep,
        }
    }

    pub fn with_fallback(mut self, rep: Representation) -> Self {
        self.fallback = rep;
        self
    }

    #[inline]
    pub fn at(&self, depth: usize) -> Representation {
        self.depths.get(depth).copied().unwrap_or(self.fallback)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::uniform(Representation::Array)
    }
}

/// Parses a comma-separated list of representations, one per depth, e.g.
/// `"bitmap,array,array"`.
impl FromStr for Layout {
    type Err = TrieError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::default());
        }
        let depths = s
            .split(',')
            .map(|part| part.trim().parse())
            .collect::<Result<Vec<Representation>>>()?;
        Ok(Self::new(depths))
    }
}

/// Configuration for [`BoardSet`](crate::BoardSet) and
/// [`BoardMap`](crate::BoardMap).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrieConfig {
    /// Capacity of a freshly created array container.
    pub initial_capacity: usize,
    /// Array containers whose capacity is at least this large sort their
    /// entries when they grow.
    pub resort_threshold: usize,
    /// Container representation per depth.
    pub layout: Layout,
}

impl Default for TrieConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 4,
            resort_threshold: 64,
            layout: Layout::default(),
        }
    }
}

impl TrieConfig {
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity == 0 {
            return Err(TrieError::InvalidConfig("initial_capacity must be at least 1"));
        }
        // A level holds at most one entry per u16 layer value.
        if self.initial_capacity > 1 << 16 {
            return Err(TrieError::InvalidConfig("initial_capacity exceeds the layer value domain"));
        }
        Ok(())
    }
}
