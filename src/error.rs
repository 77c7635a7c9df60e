use std::collections::TryReserveError;

use thiserror::Error;

/// Errors reported by the trie and its containers.
///
/// Precondition violations (appending a key that already exists at a level,
/// out-of-domain layer values, leaf-only calls on internal nodes) are not
/// represented here: they are checked with `debug_assert!` only.
#[derive(Debug, Error)]
pub enum TrieError {
    /// A node buffer could not be reserved. The container that failed to grow
    /// keeps its previous capacity and contents.
    #[error("allocation failed: {0}")]
    Alloc(#[from] TryReserveError),

    #[error("node arena exhausted the u32 index space")]
    NodeLimit,

    /// A container kind tag or name that the node factory does not know.
    #[error("unknown container kind: {0:?}")]
    UnknownKind(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("operation not supported: {0}")]
    Unsupported(&'static str),
}

pub type Result<T, E = TrieError> = std::result::Result<T, E>;
