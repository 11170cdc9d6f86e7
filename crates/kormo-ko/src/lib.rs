//! Korean language engine for the KORMO morphological analyzer.
//!
//! Given one eojeol (whitespace-delimited word unit), the engine produces
//! every linguistically valid decomposition into tagged morphemes,
//! covering Korean's agglutinative inflection and the regular/irregular
//! sound-change phenomena.
//!
//! # Architecture
//!
//! - [`connection`] -- tag adjacency matrix compiled from the rule file
//! - [`lattice`] -- per-eojeol segment positions and splice bookkeeping
//! - [`rules`] -- the phonological rule-expansion tables
//! - [`chart`] -- the chart search and candidate enumeration
//! - [`touchup`] -- phonetic repair of finished candidates
//! - [`dictionary`] -- resource file loading
//! - [`handle`] -- the owning [`handle::KoreanAnalyzer`]

pub mod chart;
pub mod connection;
pub mod dictionary;
pub mod handle;
pub mod lattice;
pub mod rules;
pub mod touchup;

use kormo_core::error::CapacityError;
use kormo_trie::TrieError;

/// Error type for resource loading. Loading fails fast: the analyzer
/// never runs with partially loaded tables.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{file}:{line}: {msg}")]
    Parse {
        file: String,
        line: usize,
        msg: String,
    },
    #[error("cannot read {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("missing resource entry '{key}' in {file}")]
    MissingResource { key: &'static str, file: String },
    #[error("dictionary load failed: {0}")]
    Trie(#[from] TrieError),
}

/// Error type for per-eojeol analysis. Capacity overflow fails only the
/// current eojeol; the analyzer remains usable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    /// An invariant of the working storage was violated. Not expected to
    /// occur; surfaced instead of panicking so one eojeol cannot take the
    /// process down.
    #[error("internal analysis error: {0}")]
    Internal(&'static str),
}

impl From<TrieError> for AnalyzeError {
    fn from(err: TrieError) -> Self {
        match err {
            TrieError::PoolExhausted(cap) => AnalyzeError::Capacity(cap),
            TrieError::EmptyKey => AnalyzeError::Internal("empty trie key"),
        }
    }
}
