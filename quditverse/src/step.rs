//! Step records: the tagged entries the builder appends and the engines
//! replay.
//!
//! The discriminants encode the operation shape; the textual wire tags of
//! the serialized form (`SINGLE`, `SINGLE_CTRL_MULTIPLE_TARGET`,
//! `MEASURE_V_MANY`, …) are recovered from the variant plus the
//! control/target arities by [`GateStep::tag`] and [`MeasureStep::tag`].

use std::fmt;
use std::slice;

/// Timeline tag: what kind of step sits at a given instruction pointer.
///
/// The k-th `Gate` tag in the timeline refers to the k-th gate record, and
/// likewise for measurements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepType {
    Gate,
    Measurement,
}

/// One gate step.
///
/// Quantum-controlled and classically-controlled shapes share a variant
/// each; `custom` distinguishes a joint multi-qudit matrix from a
/// single-qudit matrix fanned over the targets.
#[derive(Debug, Clone, PartialEq)]
pub enum GateStep {
    /// Single-qudit gate.
    Single { hash: u64, target: usize, name: String },
    /// Joint two-qudit gate.
    Two { hash: u64, targets: [usize; 2], name: String },
    /// Joint three-qudit gate.
    Three { hash: u64, targets: [usize; 3], name: String },
    /// Joint gate on an arbitrary target list.
    Custom { hash: u64, targets: Vec<usize>, name: String },
    /// The same single-qudit gate applied to every target independently.
    Fan { hash: u64, targets: Vec<usize>, name: String },
    /// Quantum Fourier transform over the targets. Recorded, not executable.
    Qft { targets: Vec<usize>, swap: bool },
    /// Inverse quantum Fourier transform. Recorded, not executable.
    Tfq { targets: Vec<usize>, swap: bool },
    /// Gate conditioned on quantum control qudits.
    Ctrl {
        hash: u64,
        ctrls: Vec<usize>,
        targets: Vec<usize>,
        custom: bool,
        name: String,
    },
    /// Gate conditioned on classical control dits.
    CondCtrl {
        hash: u64,
        ctrl_dits: Vec<usize>,
        targets: Vec<usize>,
        custom: bool,
        name: String,
    },
}

impl GateStep {
    /// Target qudit indices, in application order.
    #[must_use]
    pub fn targets(&self) -> &[usize] {
        match self {
            GateStep::Single { target, .. } => slice::from_ref(target),
            GateStep::Two { targets, .. } => targets,
            GateStep::Three { targets, .. } => targets,
            GateStep::Custom { targets, .. }
            | GateStep::Fan { targets, .. }
            | GateStep::Qft { targets, .. }
            | GateStep::Tfq { targets, .. }
            | GateStep::Ctrl { targets, .. }
            | GateStep::CondCtrl { targets, .. } => targets,
        }
    }

    /// Control indices: qudit positions for quantum controls, dit positions
    /// for classical controls, empty for uncontrolled gates.
    #[must_use]
    pub fn ctrls(&self) -> &[usize] {
        match self {
            GateStep::Ctrl { ctrls, .. } => ctrls,
            GateStep::CondCtrl { ctrl_dits, .. } => ctrl_dits,
            _ => &[],
        }
    }

    /// Content digest of the gate matrix; `None` for the recorded-only
    /// Fourier steps.
    #[must_use]
    pub fn hash(&self) -> Option<u64> {
        match self {
            GateStep::Single { hash, .. }
            | GateStep::Two { hash, .. }
            | GateStep::Three { hash, .. }
            | GateStep::Custom { hash, .. }
            | GateStep::Fan { hash, .. }
            | GateStep::Ctrl { hash, .. }
            | GateStep::CondCtrl { hash, .. } => Some(*hash),
            GateStep::Qft { .. } | GateStep::Tfq { .. } => None,
        }
    }

    /// Display name of the step.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            GateStep::Single { name, .. }
            | GateStep::Two { name, .. }
            | GateStep::Three { name, .. }
            | GateStep::Custom { name, .. }
            | GateStep::Fan { name, .. }
            | GateStep::Ctrl { name, .. }
            | GateStep::CondCtrl { name, .. } => name,
            GateStep::Qft { .. } => "QFT",
            GateStep::Tfq { .. } => "TFQ",
        }
    }

    /// Wire-level textual tag of the step type.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            GateStep::Single { .. } => "SINGLE",
            GateStep::Two { .. } => "TWO",
            GateStep::Three { .. } => "THREE",
            GateStep::Custom { .. } => "CUSTOM",
            GateStep::Fan { .. } => "FAN",
            GateStep::Qft { .. } => "QFT",
            GateStep::Tfq { .. } => "TFQ",
            GateStep::Ctrl {
                ctrls,
                targets,
                custom,
                ..
            } => match (custom, ctrls.len(), targets.len()) {
                (true, _, _) => "CUSTOM_CTRL",
                (false, 1, 1) => "SINGLE_CTRL_SINGLE_TARGET",
                (false, 1, _) => "SINGLE_CTRL_MULTIPLE_TARGET",
                (false, _, 1) => "MULTIPLE_CTRL_SINGLE_TARGET",
                (false, _, _) => "MULTIPLE_CTRL_MULTIPLE_TARGET",
            },
            GateStep::CondCtrl {
                ctrl_dits,
                targets,
                custom,
                ..
            } => match (custom, ctrl_dits.len(), targets.len()) {
                (true, _, _) => "CUSTOM_cCTRL",
                (false, 1, 1) => "SINGLE_cCTRL_SINGLE_TARGET",
                (false, 1, _) => "SINGLE_cCTRL_MULTIPLE_TARGET",
                (false, _, 1) => "MULTIPLE_cCTRL_SINGLE_TARGET",
                (false, _, _) => "MULTIPLE_cCTRL_MULTIPLE_TARGET",
            },
        }
    }

    /// True for the classically-controlled shapes.
    #[must_use]
    pub fn is_classically_controlled(&self) -> bool {
        matches!(self, GateStep::CondCtrl { .. })
    }
}

impl fmt::Display for GateStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, ", self.tag())?;
        if !self.ctrls().is_empty() {
            write!(f, "ctrl = {:?}, ", self.ctrls())?;
        }
        write!(f, "target = {:?}, name = \"{}\"", self.targets(), self.name())
    }
}

/// One measurement step.
#[derive(Debug, Clone, PartialEq)]
pub enum MeasureStep {
    /// Computational-basis measurement of one qudit.
    Z { target: usize, c_reg: usize, name: String },
    /// Measurement of one qudit in the basis given by the columns of a
    /// cached matrix.
    V {
        mat_hash: u64,
        target: usize,
        c_reg: usize,
        name: String,
    },
    /// Joint basis measurement of several qudits.
    VJoint {
        mat_hash: u64,
        targets: Vec<usize>,
        c_reg: usize,
        name: String,
    },
}

impl MeasureStep {
    /// Measured qudit indices.
    #[must_use]
    pub fn targets(&self) -> &[usize] {
        match self {
            MeasureStep::Z { target, .. } | MeasureStep::V { target, .. } => slice::from_ref(target),
            MeasureStep::VJoint { targets, .. } => targets,
        }
    }

    /// Classical register receiving the outcome.
    #[must_use]
    pub fn c_reg(&self) -> usize {
        match self {
            MeasureStep::Z { c_reg, .. }
            | MeasureStep::V { c_reg, .. }
            | MeasureStep::VJoint { c_reg, .. } => *c_reg,
        }
    }

    /// Content digest of the measurement basis; `None` for Z measurements.
    #[must_use]
    pub fn mat_hash(&self) -> Option<u64> {
        match self {
            MeasureStep::Z { .. } => None,
            MeasureStep::V { mat_hash, .. } | MeasureStep::VJoint { mat_hash, .. } => Some(*mat_hash),
        }
    }

    /// Display name of the step.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            MeasureStep::Z { name, .. }
            | MeasureStep::V { name, .. }
            | MeasureStep::VJoint { name, .. } => name,
        }
    }

    /// Wire-level textual tag of the measurement type.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            MeasureStep::Z { .. } => "MEASURE_Z",
            MeasureStep::V { .. } => "MEASURE_V",
            MeasureStep::VJoint { .. } => "MEASURE_V_MANY",
        }
    }
}

impl fmt::Display for MeasureStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, target = {:?}, c_reg = {}, name = \"{}\"",
            self.tag(),
            self.targets(),
            self.c_reg(),
            self.name(),
        )
    }
}
