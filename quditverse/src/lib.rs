//! Qudit quantum-circuit construction, storage, and state-vector
//! simulation.
//!
//! `quditverse` builds circuits over `nq` d-level quantum systems (qudits)
//! and `nc` classical d-level registers (dits), and executes them on a
//! dense state vector. The numerical substrate (gate matrices, subsystem
//! application, measurement sampling) comes from [`qudit_core`].
//!
//! # Overview
//!
//! - [`Circuit`]: validated, append-only construction of gate and
//!   measurement steps. Steps reference their matrices through a
//!   content-addressed cache, so structurally identical gates are stored
//!   once; the measured-qudit flags make reuse of a measured qudit a
//!   build-time error.
//! - [`Engine`]: walks a built circuit step by step against a live state
//!   vector, handling quantum-controlled and classically-controlled
//!   unitaries, projective and basis measurements with probabilistic
//!   outcome sampling, and state collapse. Measuring removes a qudit's
//!   tensor factor; an original→relative remap keeps later steps
//!   addressable.
//! - [`NoisyEngine`]: an engine that passes every live qudit through a
//!   [`NoiseModel`] before each step and records which Kraus branch fired.
//! - JSON and textual serialization of circuits and engine state, with a
//!   deserializable [`CircuitSketch`] for round-trip checks.
//!
//! # Quick Start
//!
//! ```
//! use quditverse::{Circuit, Engine};
//! use qudit_core::gates;
//!
//! // Bell pair: H on qubit 0, CNOT, then measure both.
//! let mut circuit = Circuit::named(2, 2, 2, "bell")?;
//! circuit
//!     .gate(&gates::hadamard(), 0, None)?
//!     .ctrl(&gates::pauli_x(), &[0], &[1], None)?
//!     .measure_z(0, 0, None)?
//!     .measure_z(1, 1, None)?;
//!
//! let mut engine = Engine::new(&circuit);
//! engine.run()?;
//!
//! // The outcomes agree, and the first one was a fair coin.
//! assert_eq!(engine.dits()[0], engine.dits()[1]);
//! assert!((engine.probs()[0] - 0.5).abs() < 1e-10);
//! # Ok::<(), quditverse::CircuitError>(())
//! ```
//!
//! # Errors
//!
//! Builder and engine operations return [`CircuitError`]; construction-time
//! diagnostics carry the step count at which the offending call happened.
//! Matrix digest collisions are integrity violations and abort the
//! operation rather than overwrite cached content.

pub mod cache;
pub mod circuit;
pub mod engine;
pub mod error;
pub mod iter;
pub mod noise;
pub mod serialize;
pub mod step;

pub use cache::MatrixCache;
pub use circuit::Circuit;
pub use engine::Engine;
pub use error::CircuitError;
pub use iter::{StepIter, StepKind, StepRef};
pub use noise::{KrausNoise, NoiseModel, NoisyEngine};
pub use serialize::{CircuitSketch, StepSketch};
pub use step::{GateStep, MeasureStep, StepType};
