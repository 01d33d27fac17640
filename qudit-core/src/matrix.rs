//! Dense complex matrix helpers: fuzzy equality, content digests, and
//! matrix powers.

use std::hash::{Hash, Hasher};

use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
use rustc_hash::FxHasher;

/// Dense complex matrix, the representation of every gate and measurement
/// basis in this workspace.
pub type CMatrix = DMatrix<Complex64>;

/// Dense complex column vector holding the amplitudes of a pure state.
pub type StateVector = DVector<Complex64>;

/// Elementwise tolerance used by [`approx_eq`].
pub const EQUALITY_TOLERANCE: f64 = 1e-12;

/// Elementwise fuzzy equality of two complex matrices.
///
/// Matrices of different shapes are never equal. Entries compare equal when
/// their difference has modulus at most [`EQUALITY_TOLERANCE`].
#[must_use]
pub fn approx_eq(a: &CMatrix, b: &CMatrix) -> bool {
    a.shape() == b.shape()
        && a.iter()
            .zip(b.iter())
            .all(|(x, y)| (x - y).norm() <= EQUALITY_TOLERANCE)
}

/// 64-bit content digest of a complex matrix.
///
/// The digest covers the shape and the exact bit patterns of every entry, so
/// it is stable across runs and processes. Two matrices that differ only by
/// floating-point noise hash differently; deduplication therefore only kicks
/// in for bitwise-identical matrices, which is what gate construction
/// produces in practice.
#[must_use]
pub fn hash_matrix(u: &CMatrix) -> u64 {
    let mut hasher = FxHasher::default();
    u.nrows().hash(&mut hasher);
    u.ncols().hash(&mut hasher);
    for entry in u.iter() {
        entry.re.to_bits().hash(&mut hasher);
        entry.im.to_bits().hash(&mut hasher);
    }
    hasher.finish()
}

/// Matrix power by repeated squaring. `powm(U, 0)` is the identity.
///
/// # Panics
///
/// Panics if `u` is not square.
#[must_use]
pub fn powm(u: &CMatrix, exponent: usize) -> CMatrix {
    assert!(u.is_square(), "matrix power requires a square matrix");

    let mut result = CMatrix::identity(u.nrows(), u.ncols());
    let mut base = u.clone();
    let mut remaining = exponent;
    while remaining > 0 {
        if remaining & 1 == 1 {
            result = &result * &base;
        }
        remaining >>= 1;
        if remaining > 0 {
            base = &base * &base;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gates;

    #[test]
    fn approx_eq_accepts_tiny_perturbations() {
        let a = gates::hadamard();
        let mut b = a.clone();
        b[(0, 0)] += Complex64::new(EQUALITY_TOLERANCE / 2.0, 0.0);
        assert!(approx_eq(&a, &b));
    }

    #[test]
    fn approx_eq_rejects_different_shapes() {
        assert!(!approx_eq(&gates::id(2), &gates::id(3)));
    }

    #[test]
    fn approx_eq_rejects_different_content() {
        assert!(!approx_eq(&gates::pauli_x(), &gates::pauli_z()));
    }

    #[test]
    fn hash_is_stable_and_content_sensitive() {
        assert_eq!(hash_matrix(&gates::hadamard()), hash_matrix(&gates::hadamard()));
        assert_ne!(hash_matrix(&gates::pauli_x()), hash_matrix(&gates::pauli_y()));
        // Same entries, different shape.
        let one = Complex64::new(1.0, 0.0);
        let row = CMatrix::from_row_slice(1, 4, &[one; 4]);
        let square = CMatrix::from_row_slice(2, 2, &[one; 4]);
        assert_ne!(hash_matrix(&row), hash_matrix(&square));
    }

    #[test]
    fn powm_zero_is_identity() {
        assert!(approx_eq(&powm(&gates::pauli_x(), 0), &gates::id(2)));
    }

    #[test]
    fn powm_matches_repeated_multiplication() {
        let x3 = gates::shift_x(3);
        let expected = &(&x3 * &x3) * &x3;
        assert!(approx_eq(&powm(&x3, 3), &expected));
        assert!(approx_eq(&powm(&x3, 3), &gates::id(3)));
    }
}
