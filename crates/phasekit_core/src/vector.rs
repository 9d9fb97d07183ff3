//! Parameter vectors: indexed, finite sequences terminated by the first absent element.
//!
//! ## Examples
//! ```rust
//! use phasekit_core::{Array, Vector, vector_params};
//!
//! let mut v = Array::new();
//! v.add("a");
//! v.add("b");
//! assert_eq!(v.params(1), Some("b"));
//! assert_eq!(v.params(2), None);
//! assert_eq!(vector_params(&v), vec!["a", "b"]);
//! ```

use serde::{Deserialize, Serialize};

/// An ordered, 0-indexed sequence of test parameters with no length query.
///
/// ## Contract
/// Once `params(id)` returns `None`, it returns `None` for every larger id. Consumers stop at the first `None`.
pub trait Vector {
    type Params;

    /// Return the element at `id`, or `None` once `id` is past the end.
    fn params(&self, id: usize) -> Option<Self::Params>;
}

/// Collect every element of a vector, from id 0 up to (not including) the first absent one.
pub fn vector_params<V: Vector + ?Sized>(vector: &V) -> Vec<V::Params> {
    let mut out = Vec::new();
    let mut id = 0;
    while let Some(params) = vector.params(id) {
        out.push(params);
        id += 1;
    }
    out
}

/// The stock vector, backed by a list. Encodes as a plain JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Array<P>(Vec<P>);

impl<P> Array<P> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append one case.
    pub fn add(&mut self, params: P) {
        self.0.push(params);
    }

    pub fn as_slice(&self) -> &[P] {
        &self.0
    }
}

impl<P> Default for Array<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> From<Vec<P>> for Array<P> {
    fn from(items: Vec<P>) -> Self {
        Self(items)
    }
}

impl<P> FromIterator<P> for Array<P> {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<P: Clone> Vector for Array<P> {
    type Params = P;

    fn params(&self, id: usize) -> Option<P> {
        self.0.get(id).cloned()
    }
}
