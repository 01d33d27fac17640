//! Content-addressed cache of the dense matrices referenced by steps.

use std::collections::HashMap;

use qudit_core::{approx_eq, CMatrix};

/// Marker for an insertion that hit an existing digest with different
/// matrix content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCollision;

/// Maps 64-bit content digests to dense matrices.
///
/// Steps store digests instead of matrix copies, so structurally identical
/// gates across many steps share one matrix. Since a digest is lossy, every
/// insertion that finds its digest already present verifies elementwise
/// equality with the stored matrix and reports a [`HashCollision`]
/// otherwise; a collision is an integrity violation, never an overwrite.
#[derive(Debug, Clone, Default)]
pub struct MatrixCache {
    table: HashMap<u64, CMatrix>,
}

impl MatrixCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `matrix` under `hash`, verifying content on a digest hit.
    ///
    /// # Errors
    ///
    /// Returns [`HashCollision`] if `hash` is present with different
    /// content. The cache is left unchanged in that case.
    pub fn insert(&mut self, matrix: &CMatrix, hash: u64) -> Result<(), HashCollision> {
        if let Some(existing) = self.table.get(&hash) {
            if !approx_eq(existing, matrix) {
                return Err(HashCollision);
            }
            return Ok(());
        }
        self.table.insert(hash, matrix.clone());
        Ok(())
    }

    /// The matrix stored under `hash`, if any. The executor only asks for
    /// digests the builder inserted, so a `None` there is a logic error.
    #[must_use]
    pub fn get(&self, hash: u64) -> Option<&CMatrix> {
        self.table.get(&hash)
    }

    /// Number of distinct matrices held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qudit_core::{gates, hash_matrix};

    #[test]
    fn insert_and_get_round_trip() {
        let mut cache = MatrixCache::new();
        let h = gates::hadamard();
        let digest = hash_matrix(&h);
        cache.insert(&h, digest).unwrap();
        assert!(approx_eq(cache.get(digest).unwrap(), &h));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn reinserting_identical_content_is_ok() {
        let mut cache = MatrixCache::new();
        let x = gates::pauli_x();
        let digest = hash_matrix(&x);
        cache.insert(&x, digest).unwrap();
        cache.insert(&x, digest).unwrap();
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn forged_digest_with_different_content_collides() {
        let mut cache = MatrixCache::new();
        let x = gates::pauli_x();
        let digest = hash_matrix(&x);
        cache.insert(&x, digest).unwrap();

        // Same digest, different matrix: must be rejected, not overwritten.
        let z = gates::pauli_z();
        assert_eq!(cache.insert(&z, digest), Err(HashCollision));
        assert!(approx_eq(cache.get(digest).unwrap(), &x));
    }

    #[test]
    fn missing_digest_returns_none() {
        let cache = MatrixCache::new();
        assert!(cache.get(42).is_none());
    }
}
