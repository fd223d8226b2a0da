//! Neuron id resolution
//!
//! Neuron ids are free-form non-negative integers; matrices need dense
//! positions. A resolver maps each id of a layer to the position at which
//! the id appears in document order.

use std::collections::HashMap;

/// Inverse map from raw neuron id to dense position within one layer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexResolver {
    inverse: HashMap<usize, usize>,
    len: usize,
}

impl IndexResolver {
    /// Build from the ids of a layer in document order
    ///
    /// A repeated id resolves to its last position.
    pub fn from_ids(ids: &[usize]) -> Self {
        let inverse = ids
            .iter()
            .enumerate()
            .map(|(position, &id)| (id, position))
            .collect();
        Self {
            inverse,
            len: ids.len(),
        }
    }

    /// Identity resolver over `0..n`, used for the network inputs
    pub fn sequential(n: usize) -> Self {
        Self {
            inverse: (0..n).map(|i| (i, i)).collect(),
            len: n,
        }
    }

    /// Dense position of `id`, if it belongs to the layer
    pub fn resolve(&self, id: usize) -> Option<usize> {
        self.inverse.get(&id).copied()
    }

    /// Number of ids the resolver was built from
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
