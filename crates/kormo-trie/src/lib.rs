//! Trie engine for the KORMO morphological analyzer.
//!
//! Two trie variants share one allocation discipline: nodes live in a
//! fixed-capacity arena addressed by index, and the children of a node
//! always occupy a contiguous, key-sorted run of slots so that lookup can
//! binary-search the sibling range.
//!
//! - [`arena`] -- the pooled node arena with a free-list of contiguous runs
//! - [`dict`] -- the static dictionary trie (store / search / fetch)
//! - [`reverse`] -- the dynamic reverse-suffix trie (insert / delete / iterate)
//! - [`number`] -- the table-driven numeral automaton

pub mod arena;
pub mod dict;
pub mod number;
pub mod reverse;

pub use dict::{Cursor, DictTrie, Entry, StoreOutcome};
pub use reverse::{InsertOutcome, ReverseTrie};

use kormo_core::error::CapacityError;

/// Error type for trie operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrieError {
    /// The node pool is full. This is a sizing error of the surrounding
    /// configuration, not a recoverable per-key condition.
    #[error("trie node pool exhausted: {0}")]
    PoolExhausted(#[from] CapacityError),
    /// A key was empty where a non-empty jamo sequence is required.
    #[error("empty key")]
    EmptyKey,
}
