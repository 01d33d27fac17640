//! Standard gate constructors and the named-gate catalog.
//!
//! Gate matrices are plain [`CMatrix`] values; nothing here is magical. The
//! [`GateCatalog`] maps matrix *content* back to a canonical display name,
//! which circuit builders use when the caller does not name a gate.

use std::collections::HashMap;
use std::f64::consts::{FRAC_1_SQRT_2, PI};
use std::sync::{Arc, OnceLock};

use num_complex::Complex64;

use crate::matrix::{approx_eq, hash_matrix, CMatrix};

#[inline]
fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

/// `d × d` identity.
#[must_use]
pub fn id(d: usize) -> CMatrix {
    CMatrix::identity(d, d)
}

/// Generalized shift gate `X_d`: `|j⟩ ↦ |(j + 1) mod d⟩`. For `d = 2` this
/// is the Pauli X.
#[must_use]
pub fn shift_x(d: usize) -> CMatrix {
    CMatrix::from_fn(d, d, |row, col| {
        if row == (col + 1) % d {
            c(1.0, 0.0)
        } else {
            c(0.0, 0.0)
        }
    })
}

/// Generalized clock gate `Z_d = diag(1, ω, …, ω^{d-1})` with
/// `ω = exp(2πi/d)`. For `d = 2` this is the Pauli Z up to rounding.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn clock_z(d: usize) -> CMatrix {
    CMatrix::from_fn(d, d, |row, col| {
        if row == col {
            Complex64::from_polar(1.0, 2.0 * PI * row as f64 / d as f64)
        } else {
            c(0.0, 0.0)
        }
    })
}

/// Discrete Fourier transform `F_d` with entries `ω^{jk}/√d`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn fourier(d: usize) -> CMatrix {
    let scale = 1.0 / (d as f64).sqrt();
    CMatrix::from_fn(d, d, |row, col| {
        Complex64::from_polar(scale, 2.0 * PI * (row * col) as f64 / d as f64)
    })
}

/// Qubit Hadamard, constructed with exact real entries.
#[must_use]
pub fn hadamard() -> CMatrix {
    CMatrix::from_row_slice(
        2,
        2,
        &[
            c(FRAC_1_SQRT_2, 0.0),
            c(FRAC_1_SQRT_2, 0.0),
            c(FRAC_1_SQRT_2, 0.0),
            c(-FRAC_1_SQRT_2, 0.0),
        ],
    )
}

/// Pauli X.
#[must_use]
pub fn pauli_x() -> CMatrix {
    CMatrix::from_row_slice(2, 2, &[c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)])
}

/// Pauli Y.
#[must_use]
pub fn pauli_y() -> CMatrix {
    CMatrix::from_row_slice(2, 2, &[c(0.0, 0.0), c(0.0, -1.0), c(0.0, 1.0), c(0.0, 0.0)])
}

/// Pauli Z.
#[must_use]
pub fn pauli_z() -> CMatrix {
    CMatrix::from_row_slice(2, 2, &[c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(-1.0, 0.0)])
}

/// Phase gate S = diag(1, i).
#[must_use]
pub fn phase_s() -> CMatrix {
    CMatrix::from_row_slice(2, 2, &[c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(0.0, 1.0)])
}

/// T gate = diag(1, exp(iπ/4)).
#[must_use]
pub fn phase_t() -> CMatrix {
    CMatrix::from_row_slice(
        2,
        2,
        &[
            c(1.0, 0.0),
            c(0.0, 0.0),
            c(0.0, 0.0),
            Complex64::from_polar(1.0, PI / 4.0),
        ],
    )
}

/// Controlled-X on two qubits, control first.
#[must_use]
pub fn cnot() -> CMatrix {
    let mut m = CMatrix::zeros(4, 4);
    m[(0, 0)] = c(1.0, 0.0);
    m[(1, 1)] = c(1.0, 0.0);
    m[(2, 3)] = c(1.0, 0.0);
    m[(3, 2)] = c(1.0, 0.0);
    m
}

/// Controlled-Z on two qubits.
#[must_use]
pub fn cz() -> CMatrix {
    let mut m = id(4);
    m[(3, 3)] = c(-1.0, 0.0);
    m
}

/// Swap of two qudits of dimension `d`: `|j, k⟩ ↦ |k, j⟩`.
#[must_use]
pub fn swap(d: usize) -> CMatrix {
    let dim = d * d;
    let mut m = CMatrix::zeros(dim, dim);
    for j in 0..d {
        for k in 0..d {
            m[(k * d + j, j * d + k)] = c(1.0, 0.0);
        }
    }
    m
}

/// Toffoli (controlled-controlled-X) on three qubits.
#[must_use]
pub fn toffoli() -> CMatrix {
    let mut m = id(8);
    m[(6, 6)] = c(0.0, 0.0);
    m[(7, 7)] = c(0.0, 0.0);
    m[(6, 7)] = c(1.0, 0.0);
    m[(7, 6)] = c(1.0, 0.0);
    m
}

/// A read-only map from gate matrix content to canonical display names.
///
/// Lookup goes through the 64-bit content digest and is confirmed by a fuzzy
/// elementwise comparison, so a digest collision can never return a name for
/// the wrong matrix.
#[derive(Debug, Clone, Default)]
pub struct GateCatalog {
    entries: HashMap<u64, (CMatrix, String)>,
}

impl GateCatalog {
    /// An empty catalog. Every lookup returns `None`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard qubit gate set under its conventional names.
    #[must_use]
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        catalog.register(id(2), "Id");
        catalog.register(hadamard(), "H");
        catalog.register(pauli_x(), "X");
        catalog.register(pauli_y(), "Y");
        catalog.register(pauli_z(), "Z");
        catalog.register(phase_s(), "S");
        catalog.register(phase_t(), "T");
        catalog.register(cnot(), "CNOT");
        catalog.register(cz(), "CZ");
        catalog.register(swap(2), "SWAP");
        catalog.register(toffoli(), "TOF");
        catalog
    }

    /// The process-wide default catalog, built once on first use.
    #[must_use]
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<GateCatalog>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::standard())))
    }

    /// Register `gate` under `name`, replacing any previous entry with the
    /// same content.
    pub fn register(&mut self, gate: CMatrix, name: impl Into<String>) {
        self.entries.insert(hash_matrix(&gate), (gate, name.into()));
    }

    /// Canonical name of `gate`, or `None` if its content is not registered.
    #[must_use]
    pub fn name_of(&self, gate: &CMatrix) -> Option<&str> {
        self.entries
            .get(&hash_matrix(gate))
            .filter(|(stored, _)| approx_eq(stored, gate))
            .map(|(_, name)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::powm;

    #[test]
    fn shift_and_clock_have_order_d() {
        for d in 2..=5 {
            assert!(approx_eq(&powm(&shift_x(d), d), &id(d)));
            assert!(approx_eq(&powm(&clock_z(d), d), &id(d)));
        }
    }

    #[test]
    fn fourier_columns_are_orthonormal() {
        for d in 2..=4 {
            let f = fourier(d);
            let product = f.adjoint() * &f;
            assert!(approx_eq(&product, &id(d)), "F_{d} is not unitary");
        }
    }

    #[test]
    fn hadamard_is_self_inverse() {
        let h = hadamard();
        assert!(approx_eq(&(&h * &h), &id(2)));
    }

    #[test]
    fn swap_exchanges_basis_states() {
        let s = swap(3);
        // |1, 2⟩ = index 5 maps to |2, 1⟩ = index 7
        assert_eq!(s[(7, 5)], Complex64::new(1.0, 0.0));
        assert_eq!(s[(5, 7)], Complex64::new(1.0, 0.0));
        assert!(approx_eq(&(&s * &s), &id(9)));
    }

    #[test]
    fn catalog_resolves_standard_names() {
        let catalog = GateCatalog::standard();
        assert_eq!(catalog.name_of(&hadamard()), Some("H"));
        assert_eq!(catalog.name_of(&cnot()), Some("CNOT"));
        assert_eq!(catalog.name_of(&fourier(3)), None);
    }

    #[test]
    fn global_catalog_is_shared() {
        let a = GateCatalog::global();
        let b = GateCatalog::global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
