//! The typed value chain.
//!
//! As a walk descends the tree, every successful typed capture (and later,
//! every value-extracting guard) appends one decoded value. The chain is
//! owned exclusively by the in-flight match: branches that fail truncate it
//! back to their entry length, and the winning leaf's unpacking closure
//! consumes it.

use std::any::Any;
use std::fmt;

/// Ordered, heterogeneous sequence of decoded values.
#[derive(Default)]
pub struct CapturedValues {
    values: Vec<Box<dyn Any + Send>>,
}

impl CapturedValues {
    /// An empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of values accumulated so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when nothing has been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow a value by position, downcast to its concrete type.
    #[must_use]
    pub fn get<T: Any>(&self, index: usize) -> Option<&T> {
        self.values.get(index).and_then(|v| v.downcast_ref())
    }

    pub(crate) fn push(&mut self, value: Box<dyn Any + Send>) {
        self.values.push(value);
    }

    /// Roll back to a branch entry point during backtracking.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.values.truncate(len);
    }

    pub(crate) fn into_values(self) -> Vec<Box<dyn Any + Send>> {
        self.values
    }
}

impl fmt::Debug for CapturedValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedValues")
            .field("len", &self.values.len())
            .finish_non_exhaustive()
    }
}
