//! Uncorrelated per-qudit noise channels and the noisy engine.

use derive_more::{Deref, DerefMut};
use qudit_core::{gates, ops, CMatrix, StateVector};
use rand::distributions::{Distribution, WeightedIndex};
use rand::thread_rng;

use crate::circuit::Circuit;
use crate::engine::Engine;
use crate::error::CircuitError;
use crate::iter::StepRef;

/// A single-qudit noise channel applied by [`NoisyEngine`] before every
/// step.
///
/// `apply` acts on one subsystem of the state vector, identified by its
/// *relative* position in the (possibly contracted) state, and remembers
/// which Kraus branch fired so the engine can record it.
pub trait NoiseModel {
    /// Qudit dimension the channel acts on; must match the circuit's.
    fn dimension(&self) -> usize;

    /// Applies the channel to the subsystem at relative position `target`,
    /// returning the new (renormalized) state.
    fn apply(&mut self, psi: &StateVector, target: usize) -> StateVector;

    /// Index of the Kraus branch selected by the most recent `apply`.
    fn last_branch(&self) -> usize;
}

/// A noise channel given by an explicit list of Kraus operators.
///
/// Applying the channel computes `φ_i = (K_i ⊗ I)ψ` for every branch,
/// samples branch `i` with probability `‖φ_i‖²`, and returns the
/// renormalized `φ_i`.
#[derive(Debug, Clone)]
pub struct KrausNoise {
    d: usize,
    kraus: Vec<CMatrix>,
    last_branch: usize,
}

impl KrausNoise {
    /// Builds a channel from its Kraus operators.
    ///
    /// # Panics
    ///
    /// Panics if the list is empty or the operators are not all square of
    /// the same dimension.
    #[must_use]
    pub fn new(kraus: Vec<CMatrix>) -> Self {
        assert!(!kraus.is_empty(), "a channel needs at least one Kraus operator");
        let d = kraus[0].nrows();
        assert!(
            kraus.iter().all(|k| k.is_square() && k.nrows() == d),
            "Kraus operators must all be square of the same dimension"
        );
        Self {
            d,
            kraus,
            last_branch: 0,
        }
    }

    /// Qubit bit-flip channel: `{√(1−p)·I, √p·X}`.
    ///
    /// # Panics
    ///
    /// Panics unless `0 ≤ p ≤ 1`.
    #[must_use]
    pub fn bit_flip(p: f64) -> Self {
        assert!((0.0..=1.0).contains(&p), "flip probability must be in [0, 1]");
        Self::new(vec![
            gates::id(2).scale((1.0 - p).sqrt()),
            gates::pauli_x().scale(p.sqrt()),
        ])
    }

    /// Qubit phase-flip channel: `{√(1−p)·I, √p·Z}`.
    ///
    /// # Panics
    ///
    /// Panics unless `0 ≤ p ≤ 1`.
    #[must_use]
    pub fn phase_flip(p: f64) -> Self {
        assert!((0.0..=1.0).contains(&p), "flip probability must be in [0, 1]");
        Self::new(vec![
            gates::id(2).scale((1.0 - p).sqrt()),
            gates::pauli_z().scale(p.sqrt()),
        ])
    }

    /// Qubit depolarizing channel:
    /// `{√(1−p)·I, √(p/3)·X, √(p/3)·Y, √(p/3)·Z}`.
    ///
    /// # Panics
    ///
    /// Panics unless `0 ≤ p ≤ 1`.
    #[must_use]
    pub fn depolarizing(p: f64) -> Self {
        assert!((0.0..=1.0).contains(&p), "error probability must be in [0, 1]");
        let branch = (p / 3.0).sqrt();
        Self::new(vec![
            gates::id(2).scale((1.0 - p).sqrt()),
            gates::pauli_x().scale(branch),
            gates::pauli_y().scale(branch),
            gates::pauli_z().scale(branch),
        ])
    }

    /// The Kraus operators of the channel.
    #[must_use]
    pub fn kraus(&self) -> &[CMatrix] {
        &self.kraus
    }
}

impl NoiseModel for KrausNoise {
    fn dimension(&self) -> usize {
        self.d
    }

    fn apply(&mut self, psi: &StateVector, target: usize) -> StateVector {
        let candidates: Vec<StateVector> = self
            .kraus
            .iter()
            .map(|k| ops::apply(psi, k, &[target], self.d))
            .collect();
        let weights: Vec<f64> = candidates.iter().map(StateVector::norm_squared).collect();
        let branch = WeightedIndex::new(&weights)
            .expect("Kraus operators do not form a channel")
            .sample(&mut thread_rng());
        self.last_branch = branch;
        let mut collapsed = candidates;
        collapsed.swap_remove(branch).unscale(weights[branch].sqrt())
    }

    fn last_branch(&self) -> usize {
        self.last_branch
    }
}

/// An [`Engine`] that passes every live qudit through a noise channel
/// before each step.
///
/// Before executing the step at timeline position `ip`, the channel is
/// applied to every non-measured qudit in ascending original order, and the
/// Kraus branch that fired for each is appended to `noise_results[ip]`.
/// All engine accessors are available through deref.
#[derive(Debug, Deref, DerefMut)]
pub struct NoisyEngine<'a, N: NoiseModel> {
    #[deref]
    #[deref_mut]
    engine: Engine<'a>,
    noise: N,
    noise_results: Vec<Vec<usize>>,
}

impl<'a, N: NoiseModel> NoisyEngine<'a, N> {
    /// Binds a noisy engine to `circuit`.
    ///
    /// # Errors
    ///
    /// `DimsNotEqual` if the noise dimension differs from the circuit's.
    pub fn new(circuit: &'a Circuit, noise: N) -> Result<Self, CircuitError> {
        if noise.dimension() != circuit.dim() {
            return Err(CircuitError::DimsNotEqual {
                op: "NoisyEngine::new",
                noise_d: noise.dimension(),
                circuit_d: circuit.dim(),
            });
        }
        Ok(Self {
            engine: Engine::new(circuit),
            noise,
            noise_results: vec![Vec::new(); circuit.step_count()],
        })
    }

    /// Applies noise to every live qudit, then executes the step.
    ///
    /// # Errors
    ///
    /// As for [`Engine::execute`].
    pub fn execute(&mut self, step: &StepRef<'_>) -> Result<(), CircuitError> {
        if !step.belongs_to(self.engine.circuit()) {
            return Err(CircuitError::InvalidIterator {
                op: "NoisyEngine::execute",
            });
        }
        let live = self.engine.non_measured_positions();
        let relative = self.engine.relative_positions(&live)?;
        for target in relative {
            self.engine.psi = self.noise.apply(&self.engine.psi, target);
            self.noise_results[step.ip()].push(self.noise.last_branch());
        }
        self.engine.execute(step)
    }

    /// Executes every step of the bound circuit in timeline order, noise
    /// included.
    ///
    /// # Errors
    ///
    /// As for [`execute`](NoisyEngine::execute).
    pub fn run(&mut self) -> Result<(), CircuitError> {
        let circuit = self.engine.circuit();
        for step in circuit.steps() {
            self.execute(&step)?;
        }
        Ok(())
    }

    /// Per-step Kraus branch records: entry `ip` lists, for the step at
    /// timeline position `ip`, the branch fired on each live qudit in
    /// ascending original order.
    #[must_use]
    pub fn noise_results(&self) -> &[Vec<usize>] {
        &self.noise_results
    }

    /// The noise model.
    #[must_use]
    pub fn noise(&self) -> &N {
        &self.noise
    }
}
