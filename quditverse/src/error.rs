//! Typed errors for circuit construction and execution.

use thiserror::Error;

/// Everything that can go wrong while building or executing a circuit.
///
/// Construction-time variants carry the step count at which the offending
/// call happened, so a failing chained build pinpoints the step exactly as
/// the textual circuit listing numbers them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CircuitError {
    /// A required index list was empty, or a circuit was requested with no
    /// qudits.
    #[error("{op}: empty index list or zero-sized circuit (at step {step})")]
    ZeroSize { op: &'static str, step: usize },

    /// An index exceeds `nq`/`nc`, or controls and targets overlap.
    #[error("{op}: index out of range (at step {step})")]
    OutOfRange { op: &'static str, step: usize },

    /// Duplicate index within a control, target, or control-dit list.
    #[error("{op}: duplicate indices (at step {step})")]
    Duplicates { op: &'static str, step: usize },

    /// A quantum position refers to a qudit that was already measured.
    #[error("{op}: qudit already measured (at step {step})")]
    QuditAlreadyMeasured { op: &'static str, step: usize },

    /// A gate or measurement matrix is not square.
    #[error("{op}: matrix is not square (at step {step})")]
    MatrixNotSquare { op: &'static str, step: usize },

    /// A square matrix has the wrong dimension for its targets.
    #[error("{op}: matrix dimension does not match the target subsystems (at step {step})")]
    DimsMismatchMatrix { op: &'static str, step: usize },

    /// A noise model's qudit dimension differs from the circuit's.
    #[error("{op}: noise dimension {noise_d} differs from circuit dimension {circuit_d}")]
    DimsNotEqual {
        op: &'static str,
        noise_d: usize,
        circuit_d: usize,
    },

    /// Two different matrices produced the same content digest. The cache
    /// refuses to overwrite; the enclosing operation halts.
    #[error("{op}: matrix hash collision (at step {step})")]
    HashCollision { op: &'static str, step: usize },

    /// Declared but unimplemented functionality (QFT/TFQ execution, gate
    /// depth queries).
    #[error("{op}: not implemented")]
    NotImplemented { op: &'static str },

    /// A step was handed to an engine bound to a different circuit.
    #[error("{op}: step does not belong to this engine's circuit")]
    InvalidIterator { op: &'static str },
}
