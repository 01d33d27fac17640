//! Dense complex linear algebra over qudit state vectors.
//!
//! This crate supplies the numerical substrate for qudit circuit
//! simulation:
//!
//! - [`matrix`]: the [`CMatrix`]/[`StateVector`] aliases over
//!   [`nalgebra`] with [`num_complex::Complex64`] entries, fuzzy equality,
//!   64-bit content digests, and matrix powers.
//! - [`gates`]: standard gate constructors (Pauli set, Hadamard, phase
//!   gates, generalized shift/clock, discrete Fourier transform, CNOT/CZ,
//!   SWAP, Toffoli) and the [`GateCatalog`] resolving matrix content to
//!   canonical names.
//! - [`states`]: canonical state constructors.
//! - [`ops`]: joint and controlled gate application on arbitrary subsystem
//!   subsets, and destructive computational-basis and rank-1 projective
//!   measurements with outcome sampling.
//!
//! Basis indices are big-endian mixed-radix: qudit 0 is the most
//! significant digit, so `|j, k⟩ = |j·d + k⟩`.
//!
//! This layer enforces its preconditions with assertions. Recoverable
//! validation (index ranges, measured-qudit tracking, matrix shape
//! checking) belongs to the circuit layer built on top.

pub mod gates;
pub mod matrix;
pub mod ops;
pub mod states;

pub use gates::GateCatalog;
pub use matrix::{approx_eq, hash_matrix, powm, CMatrix, StateVector, EQUALITY_TOLERANCE};
pub use ops::{apply, apply_ctrl, measure, measure_seq};
