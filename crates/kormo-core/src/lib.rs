//! Shared leaf types for the KORMO Korean morphological analyzer.
//!
//! This crate has no internal dependencies and is used by every other
//! crate in the workspace:
//!
//! - [`jamo`] -- Hangul syllable/jamo decomposition and recomposition
//! - [`tag`] -- interned morpheme tags and named tag groups
//! - [`morpheme`] -- analysis result and sentence metadata types
//! - [`error`] -- the shared capacity-exceeded error

pub mod error;
pub mod jamo;
pub mod morpheme;
pub mod tag;
