//! Filter module
//!
//! Composable per-candidate predicates, compiled once per evaluation.
//!
//! # Overview
//!
//! - `Predicate` - a single condition over a candidate
//! - `FilterSet` - AND of predicates; an empty set matches everything
//! - `FileFilterSpec` / `MessageFilterSpec` - declarative filters that
//!   compile into a `FilterSet`, failing as a whole on an invalid pattern

mod predicates;
mod types;

pub use predicates::{
    AuthorEquals, FileFilterSpec, FileNamePattern, KeywordContains, MessageFilterSpec,
    DEFAULT_FILE_PATTERN,
};
pub use types::{FilterSet, FilterSpec, Predicate};

#[cfg(test)]
mod tests;
