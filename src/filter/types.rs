//! Filter traits and the predicate set

use crate::error::Result;
use std::fmt;

/// A single condition evaluated against a candidate
pub trait Predicate<T>: Send + Sync + fmt::Debug {
    /// Whether the candidate passes
    fn matches(&self, item: &T) -> bool;

    /// Short human-readable description, used in skip reasons
    fn describe(&self) -> String;
}

/// Conjunction of predicates
pub struct FilterSet<T> {
    predicates: Vec<Box<dyn Predicate<T>>>,
}

impl<T> FilterSet<T> {
    /// A filter that lets everything through
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    /// Add a predicate
    #[must_use]
    pub fn with(mut self, predicate: impl Predicate<T> + 'static) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    /// Add a boxed predicate
    pub fn push(&mut self, predicate: Box<dyn Predicate<T>>) {
        self.predicates.push(predicate);
    }

    /// All predicates pass
    pub fn matches(&self, item: &T) -> bool {
        self.predicates.iter().all(|p| p.matches(item))
    }

    /// Number of predicates
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Whether no predicates are configured
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Description of the whole set, e.g. `name ~ /.*\.csv$/ and author = U1`
    pub fn describe(&self) -> String {
        if self.predicates.is_empty() {
            return "any".to_string();
        }
        self.predicates
            .iter()
            .map(|p| p.describe())
            .collect::<Vec<_>>()
            .join(" and ")
    }
}

impl<T> Default for FilterSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for FilterSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterSet")
            .field("predicates", &self.predicates)
            .finish()
    }
}

/// Declarative filter configuration for one candidate type
pub trait FilterSpec: Send + Sync {
    /// Candidate type the compiled filter applies to
    type Item;

    /// Compile into a predicate set.
    ///
    /// Fails as a whole if any part is invalid; a partially compiled filter
    /// is never returned.
    fn compile(&self) -> Result<FilterSet<Self::Item>>;
}
