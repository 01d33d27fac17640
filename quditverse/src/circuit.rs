//! Circuit construction: validated, append-only emission of gate and
//! measurement steps.

use std::collections::HashMap;
use std::sync::Arc;

use itertools::Itertools;
use qudit_core::{hash_matrix, CMatrix, GateCatalog};

use crate::cache::MatrixCache;
use crate::error::CircuitError;
use crate::iter::StepIter;
use crate::step::{GateStep, MeasureStep, StepType};

/// A qudit quantum circuit under construction.
///
/// The configuration `(nq, nc, d, name)` is fixed at creation; builder
/// calls append steps, update the measured-qudit flags and per-name
/// counters, and intern gate matrices in the content-addressed cache.
/// Steps are never removed or reordered.
///
/// Every builder operation validates its arguments before mutating
/// anything and reports failures as [`CircuitError`] values carrying the
/// current step count, so chained construction with `?` stops at the
/// offending step:
///
/// ```
/// use quditverse::Circuit;
/// use qudit_core::gates;
///
/// let mut circuit = Circuit::new(2, 2, 2)?;
/// circuit
///     .gate(&gates::hadamard(), 0, None)?
///     .ctrl(&gates::pauli_x(), &[0], &[1], None)?
///     .measure_z(0, 0, None)?
///     .measure_z(1, 1, None)?;
/// # Ok::<(), quditverse::CircuitError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Circuit {
    nq: usize,
    nc: usize,
    d: usize,
    name: String,
    measured: Vec<bool>,
    gates: Vec<GateStep>,
    measurements: Vec<MeasureStep>,
    step_types: Vec<StepType>,
    cache: MatrixCache,
    gate_counts: HashMap<String, usize>,
    measurement_counts: HashMap<String, usize>,
    catalog: Arc<GateCatalog>,
}

impl Circuit {
    /// Creates an unnamed circuit over `nq` qudits of dimension `d` and
    /// `nc` classical dits, using the process-wide gate catalog for
    /// display names.
    ///
    /// # Errors
    ///
    /// `ZeroSize` if `nq == 0`, `OutOfRange` if `d < 2`.
    pub fn new(nq: usize, nc: usize, d: usize) -> Result<Self, CircuitError> {
        Self::with_catalog(nq, nc, d, "", GateCatalog::global())
    }

    /// Creates a named circuit.
    ///
    /// # Errors
    ///
    /// `ZeroSize` if `nq == 0`, `OutOfRange` if `d < 2`.
    pub fn named(nq: usize, nc: usize, d: usize, name: impl Into<String>) -> Result<Self, CircuitError> {
        Self::with_catalog(nq, nc, d, name, GateCatalog::global())
    }

    /// Creates a circuit with a caller-supplied gate catalog, for use with
    /// stub catalogs in tests.
    ///
    /// # Errors
    ///
    /// `ZeroSize` if `nq == 0`, `OutOfRange` if `d < 2`.
    pub fn with_catalog(
        nq: usize,
        nc: usize,
        d: usize,
        name: impl Into<String>,
        catalog: Arc<GateCatalog>,
    ) -> Result<Self, CircuitError> {
        if nq == 0 {
            return Err(CircuitError::ZeroSize {
                op: "Circuit::new",
                step: 0,
            });
        }
        if d < 2 {
            return Err(CircuitError::OutOfRange {
                op: "Circuit::new",
                step: 0,
            });
        }
        Ok(Self {
            nq,
            nc,
            d,
            name: name.into(),
            measured: vec![false; nq],
            gates: Vec::new(),
            measurements: Vec::new(),
            step_types: Vec::new(),
            cache: MatrixCache::new(),
            gate_counts: HashMap::new(),
            measurement_counts: HashMap::new(),
            catalog,
        })
    }

    // ========== Introspection ==========

    /// Number of qudits.
    #[must_use]
    pub fn nq(&self) -> usize {
        self.nq
    }

    /// Number of classical dits.
    #[must_use]
    pub fn nc(&self) -> usize {
        self.nc
    }

    /// Qudit dimension.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.d
    }

    /// Circuit name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether qudit `i` has been measured by a recorded step.
    ///
    /// # Panics
    ///
    /// Panics if `i >= nq`.
    #[must_use]
    pub fn is_measured(&self, i: usize) -> bool {
        self.measured[i]
    }

    /// Indices of the measured qudits, ascending.
    #[must_use]
    pub fn measured_positions(&self) -> Vec<usize> {
        (0..self.nq).filter(|&i| self.measured[i]).collect()
    }

    /// Indices of the not-yet-measured qudits, ascending.
    #[must_use]
    pub fn non_measured_positions(&self) -> Vec<usize> {
        (0..self.nq).filter(|&i| !self.measured[i]).collect()
    }

    /// Total gate count. A fan step counts once per target, so this may
    /// exceed the number of gate steps.
    #[must_use]
    pub fn gate_count(&self) -> usize {
        self.gate_counts.values().sum()
    }

    /// Gate count for a display name; 0 if the name never occurred.
    #[must_use]
    pub fn gate_count_of(&self, name: &str) -> usize {
        self.gate_counts.get(name).copied().unwrap_or(0)
    }

    /// Total measurement count.
    #[must_use]
    pub fn measurement_count(&self) -> usize {
        self.measurement_counts.values().sum()
    }

    /// Measurement count for a display name; 0 if the name never occurred.
    #[must_use]
    pub fn measurement_count_of(&self, name: &str) -> usize {
        self.measurement_counts.get(name).copied().unwrap_or(0)
    }

    /// Number of steps in the timeline (gates plus measurements).
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.step_types.len()
    }

    /// Gate depth analysis is not implemented.
    ///
    /// # Errors
    ///
    /// Always `NotImplemented`.
    pub fn gate_depth(&self) -> Result<usize, CircuitError> {
        Err(CircuitError::NotImplemented {
            op: "Circuit::gate_depth",
        })
    }

    /// Per-name gate depth analysis is not implemented.
    ///
    /// # Errors
    ///
    /// Always `NotImplemented`.
    pub fn gate_depth_of(&self, _name: &str) -> Result<usize, CircuitError> {
        Err(CircuitError::NotImplemented {
            op: "Circuit::gate_depth",
        })
    }

    /// The recorded gate steps, in emission order.
    #[must_use]
    pub fn gates(&self) -> &[GateStep] {
        &self.gates
    }

    /// The recorded measurement steps, in emission order.
    #[must_use]
    pub fn measurements(&self) -> &[MeasureStep] {
        &self.measurements
    }

    /// The timeline interleaving gates and measurements.
    #[must_use]
    pub fn step_types(&self) -> &[StepType] {
        &self.step_types
    }

    pub(crate) fn cache(&self) -> &MatrixCache {
        &self.cache
    }

    /// Forward iterator over the timeline.
    #[must_use]
    pub fn steps(&self) -> StepIter<'_> {
        StepIter::new(self)
    }

    // ========== Gates ==========

    /// Applies the single-qudit gate `u` on qudit `i`.
    ///
    /// # Errors
    ///
    /// `OutOfRange`, `QuditAlreadyMeasured`, `MatrixNotSquare`,
    /// `DimsMismatchMatrix`, `HashCollision`.
    pub fn gate(&mut self, u: &CMatrix, i: usize, name: Option<&str>) -> Result<&mut Self, CircuitError> {
        const OP: &str = "Circuit::gate";
        self.check_qudit(i, OP)?;
        self.check_matrix(u, 1, OP)?;

        let name = self.gate_name(name, u);
        let hash = self.intern(u, OP)?;
        self.push_gate(GateStep::Single { hash, target: i, name });
        Ok(self)
    }

    /// Applies the two-qudit gate `u` jointly on qudits `i` and `j`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` (also on `i == j`), `QuditAlreadyMeasured`,
    /// `MatrixNotSquare`, `DimsMismatchMatrix`, `HashCollision`.
    pub fn gate_two(
        &mut self,
        u: &CMatrix,
        i: usize,
        j: usize,
        name: Option<&str>,
    ) -> Result<&mut Self, CircuitError> {
        const OP: &str = "Circuit::gate_two";
        if i == j {
            return Err(self.out_of_range(OP));
        }
        self.check_qudit(i, OP)?;
        self.check_qudit(j, OP)?;
        self.check_matrix(u, 2, OP)?;

        let name = self.gate_name(name, u);
        let hash = self.intern(u, OP)?;
        self.push_gate(GateStep::Two {
            hash,
            targets: [i, j],
            name,
        });
        Ok(self)
    }

    /// Applies the three-qudit gate `u` jointly on qudits `i`, `j`, `k`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` (also on equal indices), `QuditAlreadyMeasured`,
    /// `MatrixNotSquare`, `DimsMismatchMatrix`, `HashCollision`.
    pub fn gate_three(
        &mut self,
        u: &CMatrix,
        i: usize,
        j: usize,
        k: usize,
        name: Option<&str>,
    ) -> Result<&mut Self, CircuitError> {
        const OP: &str = "Circuit::gate_three";
        if i == j || i == k || j == k {
            return Err(self.out_of_range(OP));
        }
        for q in [i, j, k] {
            self.check_qudit(q, OP)?;
        }
        self.check_matrix(u, 3, OP)?;

        let name = self.gate_name(name, u);
        let hash = self.intern(u, OP)?;
        self.push_gate(GateStep::Three {
            hash,
            targets: [i, j, k],
            name,
        });
        Ok(self)
    }

    /// Applies the single-qudit gate `u` independently on every qudit in
    /// `targets`. The gate count increases by `targets.len()`.
    ///
    /// # Errors
    ///
    /// `ZeroSize`, `OutOfRange`, `QuditAlreadyMeasured`, `Duplicates`,
    /// `MatrixNotSquare`, `DimsMismatchMatrix`, `HashCollision`.
    pub fn gate_fan(
        &mut self,
        u: &CMatrix,
        targets: &[usize],
        name: Option<&str>,
    ) -> Result<&mut Self, CircuitError> {
        const OP: &str = "Circuit::gate_fan";
        self.check_qudit_list(targets, OP)?;
        self.check_matrix(u, 1, OP)?;

        let name = self.gate_name(name, u);
        let hash = self.intern(u, OP)?;
        self.push_gate(GateStep::Fan {
            hash,
            targets: targets.to_vec(),
            name,
        });
        Ok(self)
    }

    /// Applies the single-qudit gate `u` on every currently non-measured
    /// qudit. The target set is the snapshot taken at this call; on a fully
    /// measured circuit the step is recorded with no targets and executes
    /// as a no-op.
    ///
    /// # Errors
    ///
    /// `MatrixNotSquare`, `DimsMismatchMatrix`, `HashCollision`.
    pub fn gate_fan_all(&mut self, u: &CMatrix, name: Option<&str>) -> Result<&mut Self, CircuitError> {
        const OP: &str = "Circuit::gate_fan";
        self.check_matrix(u, 1, OP)?;

        let name = self.gate_name(name, u);
        let hash = self.intern(u, OP)?;
        let targets = self.non_measured_positions();
        self.push_gate(GateStep::Fan { hash, targets, name });
        Ok(self)
    }

    /// Jointly applies the multi-qudit gate `u` on the listed targets;
    /// `u` must be square of dimension `d^targets.len()`.
    ///
    /// # Errors
    ///
    /// `ZeroSize`, `OutOfRange`, `QuditAlreadyMeasured`, `Duplicates`,
    /// `MatrixNotSquare`, `DimsMismatchMatrix`, `HashCollision`.
    pub fn gate_custom(
        &mut self,
        u: &CMatrix,
        targets: &[usize],
        name: Option<&str>,
    ) -> Result<&mut Self, CircuitError> {
        const OP: &str = "Circuit::gate_custom";
        self.check_qudit_list(targets, OP)?;
        self.check_matrix(u, targets.len(), OP)?;

        let name = self.gate_name(name, u);
        let hash = self.intern(u, OP)?;
        self.push_gate(GateStep::Custom {
            hash,
            targets: targets.to_vec(),
            name,
        });
        Ok(self)
    }

    /// Records a quantum Fourier transform over `targets`. The step is
    /// stored (and counted) for later expansion; executing it fails with
    /// `NotImplemented`.
    ///
    /// # Errors
    ///
    /// `ZeroSize`, `OutOfRange`, `QuditAlreadyMeasured`, `Duplicates`.
    pub fn qft(&mut self, targets: &[usize], swap: bool) -> Result<&mut Self, CircuitError> {
        const OP: &str = "Circuit::qft";
        self.check_qudit_list(targets, OP)?;
        self.push_gate(GateStep::Qft {
            targets: targets.to_vec(),
            swap,
        });
        Ok(self)
    }

    /// Records an inverse quantum Fourier transform over `targets`.
    /// Executing it fails with `NotImplemented`.
    ///
    /// # Errors
    ///
    /// `ZeroSize`, `OutOfRange`, `QuditAlreadyMeasured`, `Duplicates`.
    pub fn tfq(&mut self, targets: &[usize], swap: bool) -> Result<&mut Self, CircuitError> {
        const OP: &str = "Circuit::tfq";
        self.check_qudit_list(targets, OP)?;
        self.push_gate(GateStep::Tfq {
            targets: targets.to_vec(),
            swap,
        });
        Ok(self)
    }

    /// Applies the single-qudit gate `u` on every target, conditioned on
    /// the quantum control qudits `ctrls`: when the controls hold a common
    /// basis value `v`, the targets receive `u^v`.
    ///
    /// All four control/target arity combinations go through here; the
    /// step's wire tag reflects the arities.
    ///
    /// # Errors
    ///
    /// `ZeroSize`, `OutOfRange` (also on control/target overlap),
    /// `QuditAlreadyMeasured`, `Duplicates`, `MatrixNotSquare`,
    /// `DimsMismatchMatrix`, `HashCollision`.
    pub fn ctrl(
        &mut self,
        u: &CMatrix,
        ctrls: &[usize],
        targets: &[usize],
        name: Option<&str>,
    ) -> Result<&mut Self, CircuitError> {
        const OP: &str = "Circuit::ctrl";
        self.check_qudit_list(ctrls, OP)?;
        self.check_qudit_list(targets, OP)?;
        self.check_disjoint(ctrls, targets, OP)?;
        self.check_matrix(u, 1, OP)?;

        let name = self.ctrl_name(name, u, false);
        let hash = self.intern(u, OP)?;
        self.push_gate(GateStep::Ctrl {
            hash,
            ctrls: ctrls.to_vec(),
            targets: targets.to_vec(),
            custom: false,
            name,
        });
        Ok(self)
    }

    /// Jointly applies the multi-qudit gate `u` (square of dimension
    /// `d^targets.len()`) on the targets, conditioned on the quantum
    /// control qudits.
    ///
    /// # Errors
    ///
    /// As for [`Circuit::ctrl`].
    pub fn ctrl_custom(
        &mut self,
        u: &CMatrix,
        ctrls: &[usize],
        targets: &[usize],
        name: Option<&str>,
    ) -> Result<&mut Self, CircuitError> {
        const OP: &str = "Circuit::ctrl_custom";
        self.check_qudit_list(ctrls, OP)?;
        self.check_qudit_list(targets, OP)?;
        self.check_disjoint(ctrls, targets, OP)?;
        self.check_matrix(u, targets.len(), OP)?;

        let name = self.ctrl_name(name, u, false);
        let hash = self.intern(u, OP)?;
        self.push_gate(GateStep::Ctrl {
            hash,
            ctrls: ctrls.to_vec(),
            targets: targets.to_vec(),
            custom: true,
            name,
        });
        Ok(self)
    }

    /// Applies the single-qudit gate `u` on every target, conditioned on
    /// the classical dits `ctrl_dits`: at execution time, if every listed
    /// dit holds the same value `v`, the targets receive `u^v`; otherwise
    /// nothing happens.
    ///
    /// # Errors
    ///
    /// `ZeroSize`, `OutOfRange` (dit indices checked against `nc`),
    /// `QuditAlreadyMeasured`, `Duplicates`, `MatrixNotSquare`,
    /// `DimsMismatchMatrix`, `HashCollision`.
    pub fn cctrl(
        &mut self,
        u: &CMatrix,
        ctrl_dits: &[usize],
        targets: &[usize],
        name: Option<&str>,
    ) -> Result<&mut Self, CircuitError> {
        const OP: &str = "Circuit::cctrl";
        self.check_dit_list(ctrl_dits, OP)?;
        self.check_qudit_list(targets, OP)?;
        self.check_matrix(u, 1, OP)?;

        let name = self.ctrl_name(name, u, true);
        let hash = self.intern(u, OP)?;
        self.push_gate(GateStep::CondCtrl {
            hash,
            ctrl_dits: ctrl_dits.to_vec(),
            targets: targets.to_vec(),
            custom: false,
            name,
        });
        Ok(self)
    }

    /// Jointly applies the multi-qudit gate `u` on the targets, conditioned
    /// on the classical dits.
    ///
    /// # Errors
    ///
    /// As for [`Circuit::cctrl`].
    pub fn cctrl_custom(
        &mut self,
        u: &CMatrix,
        ctrl_dits: &[usize],
        targets: &[usize],
        name: Option<&str>,
    ) -> Result<&mut Self, CircuitError> {
        const OP: &str = "Circuit::cctrl_custom";
        self.check_dit_list(ctrl_dits, OP)?;
        self.check_qudit_list(targets, OP)?;
        self.check_matrix(u, targets.len(), OP)?;

        let name = self.ctrl_name(name, u, true);
        let hash = self.intern(u, OP)?;
        self.push_gate(GateStep::CondCtrl {
            hash,
            ctrl_dits: ctrl_dits.to_vec(),
            targets: targets.to_vec(),
            custom: true,
            name,
        });
        Ok(self)
    }

    // ========== Measurements ==========

    /// Measures qudit `target` in the computational basis, storing the
    /// outcome in classical dit `c_reg`. Marks the qudit measured.
    ///
    /// # Errors
    ///
    /// `OutOfRange` (target against `nq`, register against `nc`),
    /// `QuditAlreadyMeasured`.
    pub fn measure_z(
        &mut self,
        target: usize,
        c_reg: usize,
        name: Option<&str>,
    ) -> Result<&mut Self, CircuitError> {
        const OP: &str = "Circuit::measure_z";
        self.check_qudit(target, OP)?;
        self.check_c_reg(c_reg, OP)?;

        let name = name.unwrap_or("Z").to_string();
        self.measured[target] = true;
        self.push_measurement(MeasureStep::Z { target, c_reg, name });
        Ok(self)
    }

    /// Measures qudit `target` in the orthonormal basis (or rank-1
    /// projector set) given by the columns of `v`.
    ///
    /// # Errors
    ///
    /// `OutOfRange`, `QuditAlreadyMeasured`, `MatrixNotSquare`,
    /// `DimsMismatchMatrix`, `HashCollision`.
    pub fn measure_v(
        &mut self,
        v: &CMatrix,
        target: usize,
        c_reg: usize,
        name: Option<&str>,
    ) -> Result<&mut Self, CircuitError> {
        const OP: &str = "Circuit::measure_v";
        self.check_qudit(target, OP)?;
        self.check_c_reg(c_reg, OP)?;
        self.check_matrix(v, 1, OP)?;

        let name = self.gate_name(name, v);
        let mat_hash = self.intern(v, OP)?;
        self.measured[target] = true;
        self.push_measurement(MeasureStep::V {
            mat_hash,
            target,
            c_reg,
            name,
        });
        Ok(self)
    }

    /// Jointly measures the listed qudits in the basis given by the columns
    /// of `v` (square of dimension `d^targets.len()`), marking every
    /// target measured.
    ///
    /// # Errors
    ///
    /// `ZeroSize`, `OutOfRange`, `QuditAlreadyMeasured`, `Duplicates`,
    /// `MatrixNotSquare`, `DimsMismatchMatrix`, `HashCollision`.
    pub fn measure_v_joint(
        &mut self,
        v: &CMatrix,
        targets: &[usize],
        c_reg: usize,
        name: Option<&str>,
    ) -> Result<&mut Self, CircuitError> {
        const OP: &str = "Circuit::measure_v_joint";
        self.check_qudit_list(targets, OP)?;
        self.check_c_reg(c_reg, OP)?;
        self.check_matrix(v, targets.len(), OP)?;

        let name = self.gate_name(name, v);
        let mat_hash = self.intern(v, OP)?;
        for &t in targets {
            self.measured[t] = true;
        }
        self.push_measurement(MeasureStep::VJoint {
            mat_hash,
            targets: targets.to_vec(),
            c_reg,
            name,
        });
        Ok(self)
    }

    // ========== Validation helpers ==========

    fn out_of_range(&self, op: &'static str) -> CircuitError {
        CircuitError::OutOfRange {
            op,
            step: self.step_count(),
        }
    }

    fn check_qudit(&self, i: usize, op: &'static str) -> Result<(), CircuitError> {
        if i >= self.nq {
            return Err(self.out_of_range(op));
        }
        if self.measured[i] {
            return Err(CircuitError::QuditAlreadyMeasured {
                op,
                step: self.step_count(),
            });
        }
        Ok(())
    }

    fn check_qudit_list(&self, list: &[usize], op: &'static str) -> Result<(), CircuitError> {
        if list.is_empty() {
            return Err(CircuitError::ZeroSize {
                op,
                step: self.step_count(),
            });
        }
        for &i in list {
            self.check_qudit(i, op)?;
        }
        if !list.iter().all_unique() {
            return Err(CircuitError::Duplicates {
                op,
                step: self.step_count(),
            });
        }
        Ok(())
    }

    fn check_dit_list(&self, list: &[usize], op: &'static str) -> Result<(), CircuitError> {
        if list.is_empty() {
            return Err(CircuitError::ZeroSize {
                op,
                step: self.step_count(),
            });
        }
        if list.iter().any(|&i| i >= self.nc) {
            return Err(self.out_of_range(op));
        }
        if !list.iter().all_unique() {
            return Err(CircuitError::Duplicates {
                op,
                step: self.step_count(),
            });
        }
        Ok(())
    }

    fn check_disjoint(&self, ctrls: &[usize], targets: &[usize], op: &'static str) -> Result<(), CircuitError> {
        if ctrls.iter().any(|c| targets.contains(c)) {
            return Err(self.out_of_range(op));
        }
        Ok(())
    }

    fn check_c_reg(&self, c_reg: usize, op: &'static str) -> Result<(), CircuitError> {
        if c_reg >= self.nc {
            return Err(self.out_of_range(op));
        }
        Ok(())
    }

    /// Checks that `u` is square with dimension `d^target_count`.
    #[allow(clippy::cast_possible_truncation)]
    fn check_matrix(&self, u: &CMatrix, target_count: usize, op: &'static str) -> Result<(), CircuitError> {
        if !u.is_square() {
            return Err(CircuitError::MatrixNotSquare {
                op,
                step: self.step_count(),
            });
        }
        if u.nrows() != self.d.pow(target_count as u32) {
            return Err(CircuitError::DimsMismatchMatrix {
                op,
                step: self.step_count(),
            });
        }
        Ok(())
    }

    // ========== Emission helpers ==========

    /// Display name for an uncontrolled step: caller-supplied, or the
    /// catalog's canonical name for the matrix content, or empty.
    fn gate_name(&self, name: Option<&str>, u: &CMatrix) -> String {
        match name {
            Some(given) => given.to_string(),
            None => self.catalog.name_of(u).unwrap_or_default().to_string(),
        }
    }

    /// Display name for a controlled step: `CTRL-`/`cCTRL-` prefix on the
    /// catalog name, or the bare prefix when the catalog has no name.
    fn ctrl_name(&self, name: Option<&str>, u: &CMatrix, classical: bool) -> String {
        if let Some(given) = name {
            return given.to_string();
        }
        let prefix = if classical { "cCTRL" } else { "CTRL" };
        match self.catalog.name_of(u) {
            Some(gate_name) if !gate_name.is_empty() => format!("{prefix}-{gate_name}"),
            _ => prefix.to_string(),
        }
    }

    /// Hashes `u` and interns it in the matrix cache.
    fn intern(&mut self, u: &CMatrix, op: &'static str) -> Result<u64, CircuitError> {
        let hash = hash_matrix(u);
        self.cache
            .insert(u, hash)
            .map_err(|_| CircuitError::HashCollision {
                op,
                step: self.step_count(),
            })?;
        Ok(hash)
    }

    fn push_gate(&mut self, step: GateStep) {
        let increment = match &step {
            GateStep::Fan { targets, .. } => targets.len(),
            _ => 1,
        };
        *self.gate_counts.entry(step.name().to_string()).or_insert(0) += increment;
        self.gates.push(step);
        self.step_types.push(StepType::Gate);
    }

    fn push_measurement(&mut self, step: MeasureStep) {
        *self
            .measurement_counts
            .entry(step.name().to_string())
            .or_insert(0) += 1;
        self.measurements.push(step);
        self.step_types.push(StepType::Measurement);
    }
}
