//! Step-by-step state-vector execution of a built circuit.

use qudit_core::{ops, powm, states, CMatrix, StateVector};
use rand::thread_rng;

use crate::circuit::Circuit;
use crate::error::CircuitError;
use crate::iter::{StepKind, StepRef};
use crate::step::{GateStep, MeasureStep};

/// Sentinel stored in the subsystem remap for measured qudits.
const MEASURED: usize = usize::MAX;

/// Executes a circuit against a live state vector.
///
/// The engine borrows its circuit for its whole lifetime, so the circuit
/// cannot be mutated while bound. Execution starts from `|0⟩^⊗nq` with all
/// classical dits zero; each [`execute`](Engine::execute) call advances the
/// state by one step, in timeline order.
///
/// Measurements *shrink* the state vector: measuring a qudit removes its
/// tensor factor. The engine keeps an original→relative index remap
/// (`subsys`) so later steps addressed in original indices find their
/// subsystems in the contracted state.
#[derive(Debug, Clone)]
pub struct Engine<'a> {
    circuit: &'a Circuit,
    pub(crate) psi: StateVector,
    dits: Vec<usize>,
    probs: Vec<f64>,
    subsys: Vec<usize>,
}

impl<'a> Engine<'a> {
    /// Binds an engine to `circuit`, in the initial all-zero state.
    #[must_use]
    pub fn new(circuit: &'a Circuit) -> Self {
        Self {
            circuit,
            psi: states::zero(circuit.nq(), circuit.dim()),
            dits: vec![0; circuit.nc()],
            probs: vec![0.0; circuit.nc()],
            subsys: (0..circuit.nq()).collect(),
        }
    }

    // ========== State access ==========

    /// The live state vector, of length `d^(nq - measured)`.
    #[must_use]
    pub fn psi(&self) -> &StateVector {
        &self.psi
    }

    /// The classical dit registers.
    #[must_use]
    pub fn dits(&self) -> &[usize] {
        &self.dits
    }

    /// Value of classical dit `i`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if `i >= nc`.
    pub fn dit(&self, i: usize) -> Result<usize, CircuitError> {
        self.dits
            .get(i)
            .copied()
            .ok_or(CircuitError::OutOfRange {
                op: "Engine::dit",
                step: self.circuit.step_count(),
            })
    }

    /// Sets classical dit `i` to `value`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if `i >= nc`.
    pub fn set_dit(&mut self, i: usize, value: usize) -> Result<&mut Self, CircuitError> {
        if i >= self.dits.len() {
            return Err(CircuitError::OutOfRange {
                op: "Engine::set_dit",
                step: self.circuit.step_count(),
            });
        }
        self.dits[i] = value;
        Ok(self)
    }

    /// Outcome probabilities, stored at the classical register of the
    /// measurement that produced them. Each is conditional on the outcomes
    /// of the measurements executed before it.
    #[must_use]
    pub fn probs(&self) -> &[f64] {
        &self.probs
    }

    /// Whether the engine has executed a measurement of qudit `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= nq`.
    #[must_use]
    pub fn is_measured(&self, i: usize) -> bool {
        self.subsys[i] == MEASURED
    }

    /// Original indices of the measured qudits, ascending.
    #[must_use]
    pub fn measured_positions(&self) -> Vec<usize> {
        (0..self.circuit.nq()).filter(|&i| self.is_measured(i)).collect()
    }

    /// Original indices of the live qudits, ascending.
    #[must_use]
    pub fn non_measured_positions(&self) -> Vec<usize> {
        (0..self.circuit.nq()).filter(|&i| !self.is_measured(i)).collect()
    }

    /// The bound circuit.
    #[must_use]
    pub fn circuit(&self) -> &'a Circuit {
        self.circuit
    }

    /// Restores `|0⟩^⊗nq`, zeroed dits and probabilities, and the identity
    /// subsystem remap. The bound circuit is untouched.
    pub fn reset(&mut self) {
        self.psi = states::zero(self.circuit.nq(), self.circuit.dim());
        self.dits.fill(0);
        self.probs.fill(0.0);
        self.subsys = (0..self.circuit.nq()).collect();
    }

    // ========== Execution ==========

    /// Executes one step.
    ///
    /// # Errors
    ///
    /// `InvalidIterator` if `step` belongs to a different circuit,
    /// `NotImplemented` for QFT/TFQ steps, `QuditAlreadyMeasured` if the
    /// step addresses a qudit this engine has already measured (possible
    /// only when executing steps out of timeline order).
    pub fn execute(&mut self, step: &StepRef<'_>) -> Result<(), CircuitError> {
        if !step.belongs_to(self.circuit) {
            return Err(CircuitError::InvalidIterator {
                op: "Engine::execute",
            });
        }
        match step.kind() {
            StepKind::Gate(gate) => self.execute_gate(gate),
            StepKind::Measurement(measurement) => self.execute_measurement(measurement),
        }
    }

    /// Executes every step of the bound circuit in timeline order.
    ///
    /// # Errors
    ///
    /// As for [`execute`](Engine::execute).
    pub fn run(&mut self) -> Result<(), CircuitError> {
        let circuit = self.circuit;
        for step in circuit.steps() {
            self.execute(&step)?;
        }
        Ok(())
    }

    fn execute_gate(&mut self, gate: &GateStep) -> Result<(), CircuitError> {
        let d = self.circuit.dim();
        match gate {
            GateStep::Single { hash, .. }
            | GateStep::Two { hash, .. }
            | GateStep::Three { hash, .. }
            | GateStep::Custom { hash, .. } => {
                let targets = self.relative_positions(gate.targets())?;
                let u = self.cached_matrix(*hash);
                self.psi = ops::apply(&self.psi, u, &targets, d);
            }
            GateStep::Fan { hash, targets, .. } => {
                let rel = self.relative_positions(targets)?;
                let u = self.cached_matrix(*hash);
                for &target in &rel {
                    self.psi = ops::apply(&self.psi, u, &[target], d);
                }
            }
            GateStep::Qft { .. } | GateStep::Tfq { .. } => {
                return Err(CircuitError::NotImplemented {
                    op: "Engine::execute",
                });
            }
            GateStep::Ctrl {
                hash,
                ctrls,
                targets,
                ..
            } => {
                let ctrl_rel = self.relative_positions(ctrls)?;
                let target_rel = self.relative_positions(targets)?;
                let u = self.joint_matrix(*hash, targets.len());
                self.psi = ops::apply_ctrl(&self.psi, &u, &ctrl_rel, &target_rel, d);
            }
            GateStep::CondCtrl {
                hash,
                ctrl_dits,
                targets,
                ..
            } => {
                let target_rel = self.relative_positions(targets)?;
                let u = self.joint_matrix(*hash, targets.len());
                if self.dits.is_empty() {
                    self.psi = ops::apply(&self.psi, &u, &target_rel, d);
                } else {
                    let first = self.dits[ctrl_dits[0]];
                    let all_equal = ctrl_dits.iter().all(|&c| self.dits[c] == first);
                    if all_equal {
                        self.psi = ops::apply(&self.psi, &powm(&u, first), &target_rel, d);
                    }
                }
            }
        }
        Ok(())
    }

    fn execute_measurement(&mut self, measurement: &MeasureStep) -> Result<(), CircuitError> {
        let d = self.circuit.dim();
        let rel = self.relative_positions(measurement.targets())?;
        match measurement {
            MeasureStep::Z { target, c_reg, .. } => {
                let (outcomes, probability, collapsed) =
                    ops::measure_seq(&self.psi, &rel, d, &mut thread_rng());
                self.psi = collapsed;
                self.dits[*c_reg] = outcomes[0];
                self.probs[*c_reg] = probability;
                self.mark_measured(*target)?;
            }
            MeasureStep::V {
                mat_hash,
                target,
                c_reg,
                ..
            } => {
                let basis = self.cached_matrix(*mat_hash);
                let (outcome, probabilities, mut collapsed) =
                    ops::measure(&self.psi, basis, &rel, d, &mut thread_rng());
                self.psi = collapsed.swap_remove(outcome);
                self.dits[*c_reg] = outcome;
                self.probs[*c_reg] = probabilities[outcome];
                self.mark_measured(*target)?;
            }
            MeasureStep::VJoint {
                mat_hash,
                targets,
                c_reg,
                ..
            } => {
                let basis = self.cached_matrix(*mat_hash);
                let (outcome, probabilities, mut collapsed) =
                    ops::measure(&self.psi, basis, &rel, d, &mut thread_rng());
                self.psi = collapsed.swap_remove(outcome);
                self.dits[*c_reg] = outcome;
                self.probs[*c_reg] = probabilities[outcome];
                for &target in targets {
                    self.mark_measured(target)?;
                }
            }
        }
        Ok(())
    }

    // ========== Subsystem remap ==========

    /// Maps original qudit indices to their positions in the contracted
    /// state vector.
    ///
    /// # Errors
    ///
    /// `QuditAlreadyMeasured` if any index refers to a measured qudit.
    pub(crate) fn relative_positions(&self, originals: &[usize]) -> Result<Vec<usize>, CircuitError> {
        originals
            .iter()
            .map(|&original| {
                if self.is_measured(original) {
                    Err(CircuitError::QuditAlreadyMeasured {
                        op: "Engine::relative_positions",
                        step: self.circuit.step_count(),
                    })
                } else {
                    Ok(self.subsys[original])
                }
            })
            .collect()
    }

    /// Marks original qudit `i` measured and shifts the relative positions
    /// of every live qudit above it down by one.
    fn mark_measured(&mut self, i: usize) -> Result<(), CircuitError> {
        if self.is_measured(i) {
            return Err(CircuitError::QuditAlreadyMeasured {
                op: "Engine::execute",
                step: self.circuit.step_count(),
            });
        }
        self.subsys[i] = MEASURED;
        for m in (i + 1)..self.circuit.nq() {
            if self.subsys[m] != MEASURED {
                self.subsys[m] -= 1;
            }
        }
        Ok(())
    }

    fn cached_matrix(&self, hash: u64) -> &'a CMatrix {
        self.circuit
            .cache()
            .get(hash)
            .expect("step hash was interned by the builder")
    }

    /// The matrix actually applied to `target_count` subsystems: a
    /// single-qudit gate addressed at several targets is lifted to its
    /// `target_count`-fold Kronecker power, joint matrices pass through.
    fn joint_matrix(&self, hash: u64, target_count: usize) -> CMatrix {
        let u = self.cached_matrix(hash);
        if target_count > 1 && u.nrows() == self.circuit.dim() {
            let mut lifted = u.clone();
            for _ in 1..target_count {
                lifted = lifted.kronecker(u);
            }
            lifted
        } else {
            u.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qudit_core::gates;

    const EPSILON: f64 = 1e-10;

    #[test]
    fn fresh_engine_is_in_the_zero_state() {
        let circuit = Circuit::new(2, 3, 2).unwrap();
        let engine = Engine::new(&circuit);
        assert_eq!(engine.psi().len(), 4);
        assert!((engine.psi()[0].norm() - 1.0).abs() < EPSILON);
        assert_eq!(engine.dits(), &[0, 0, 0]);
        assert_eq!(engine.probs(), &[0.0, 0.0, 0.0]);
        assert!(engine.measured_positions().is_empty());
    }

    #[test]
    fn set_dit_validates_the_register() {
        let circuit = Circuit::new(1, 1, 2).unwrap();
        let mut engine = Engine::new(&circuit);
        engine.set_dit(0, 1).unwrap();
        assert_eq!(engine.dit(0).unwrap(), 1);
        assert!(matches!(
            engine.set_dit(1, 0),
            Err(CircuitError::OutOfRange { .. })
        ));
        assert!(matches!(engine.dit(1), Err(CircuitError::OutOfRange { .. })));
    }

    #[test]
    fn executing_a_foreign_step_is_rejected() {
        let mut circuit = Circuit::new(1, 0, 2).unwrap();
        circuit.gate(&gates::hadamard(), 0, None).unwrap();
        let other = circuit.clone();

        let mut engine = Engine::new(&circuit);
        let foreign_step = other.steps().next().unwrap();
        assert_eq!(
            engine.execute(&foreign_step),
            Err(CircuitError::InvalidIterator {
                op: "Engine::execute",
            })
        );
    }

    #[test]
    fn qft_step_fails_at_execution() {
        let mut circuit = Circuit::new(2, 0, 2).unwrap();
        circuit.qft(&[0, 1], true).unwrap();
        let mut engine = Engine::new(&circuit);
        assert!(matches!(
            engine.run(),
            Err(CircuitError::NotImplemented { .. })
        ));
    }

    #[test]
    fn measurement_contracts_the_state_and_remap() {
        let mut circuit = Circuit::new(3, 1, 2).unwrap();
        circuit
            .gate(&gates::pauli_x(), 1, None)
            .unwrap()
            .measure_z(1, 0, None)
            .unwrap()
            .gate(&gates::pauli_x(), 2, None)
            .unwrap();

        let mut engine = Engine::new(&circuit);
        engine.run().unwrap();

        assert_eq!(engine.psi().len(), 4);
        assert_eq!(engine.dit(0).unwrap(), 1);
        assert!((engine.probs()[0] - 1.0).abs() < EPSILON);
        assert_eq!(engine.measured_positions(), vec![1]);
        assert_eq!(engine.non_measured_positions(), vec![0, 2]);
        // After measuring qudit 1, the X on original qudit 2 must land on
        // relative position 1: the state is |0⟩⊗|1⟩ = index 1.
        assert!((engine.psi()[1].norm() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut circuit = Circuit::new(2, 1, 2).unwrap();
        circuit
            .gate(&gates::hadamard(), 0, None)
            .unwrap()
            .measure_z(0, 0, None)
            .unwrap();

        let mut engine = Engine::new(&circuit);
        engine.run().unwrap();
        engine.reset();
        let once: Vec<_> = engine.psi().iter().copied().collect();
        engine.reset();
        let twice: Vec<_> = engine.psi().iter().copied().collect();

        assert_eq!(once, twice);
        assert_eq!(engine.psi().len(), 4);
        assert_eq!(engine.dits(), &[0]);
        assert_eq!(engine.probs(), &[0.0]);
        assert!(engine.measured_positions().is_empty());
    }
}
