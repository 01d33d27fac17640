//! Forward iteration over a circuit's timeline.

use std::fmt;
use std::ptr;

use crate::circuit::Circuit;
use crate::step::{GateStep, MeasureStep, StepType};

/// The step a cursor currently points at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepKind<'a> {
    Gate(&'a GateStep),
    Measurement(&'a MeasureStep),
}

/// A resolved timeline entry: the instruction pointer plus a borrow of the
/// underlying gate or measurement record. Engines check that a step's
/// circuit is the one they are bound to before executing it.
#[derive(Debug, Clone, Copy)]
pub struct StepRef<'a> {
    circuit: &'a Circuit,
    ip: usize,
    kind: StepKind<'a>,
}

impl<'a> StepRef<'a> {
    /// Position of this step in the timeline.
    #[must_use]
    pub fn ip(&self) -> usize {
        self.ip
    }

    /// The gate or measurement record.
    #[must_use]
    pub fn kind(&self) -> StepKind<'a> {
        self.kind
    }

    /// The circuit this step belongs to.
    #[must_use]
    pub fn circuit(&self) -> &'a Circuit {
        self.circuit
    }

    pub(crate) fn belongs_to(&self, circuit: &Circuit) -> bool {
        ptr::eq(self.circuit, circuit)
    }
}

impl fmt::Display for StepRef<'_> {
    /// One line per step: the instruction pointer left-padded to the width
    /// of the largest step number plus one, then the step record;
    /// measurement lines carry a `|> ` marker.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.circuit.step_count().to_string().len() + 1;
        write!(f, "{:<width$}", self.ip)?;
        match self.kind {
            StepKind::Gate(gate) => write!(f, "{gate}"),
            StepKind::Measurement(measurement) => write!(f, "|> {measurement}"),
        }
    }
}

/// Forward cursor over the timeline, advancing the gate and measurement
/// sub-cursors jointly.
///
/// Two iterators compare equal when they sit at the same position of the
/// same circuit.
#[derive(Debug, Clone, Copy)]
pub struct StepIter<'a> {
    circuit: &'a Circuit,
    ip: usize,
    gate_pos: usize,
    measurement_pos: usize,
}

impl<'a> StepIter<'a> {
    pub(crate) fn new(circuit: &'a Circuit) -> Self {
        Self {
            circuit,
            ip: 0,
            gate_pos: 0,
            measurement_pos: 0,
        }
    }
}

impl PartialEq for StepIter<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.circuit, other.circuit)
            && self.ip == other.ip
            && self.gate_pos == other.gate_pos
            && self.measurement_pos == other.measurement_pos
    }
}

impl Eq for StepIter<'_> {}

impl<'a> Iterator for StepIter<'a> {
    type Item = StepRef<'a>;

    fn next(&mut self) -> Option<StepRef<'a>> {
        let step_type = self.circuit.step_types().get(self.ip)?;
        let kind = match step_type {
            StepType::Gate => {
                let gate = &self.circuit.gates()[self.gate_pos];
                self.gate_pos += 1;
                StepKind::Gate(gate)
            }
            StepType::Measurement => {
                let measurement = &self.circuit.measurements()[self.measurement_pos];
                self.measurement_pos += 1;
                StepKind::Measurement(measurement)
            }
        };
        let step = StepRef {
            circuit: self.circuit,
            ip: self.ip,
            kind,
        };
        self.ip += 1;
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.circuit.step_count() - self.ip;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for StepIter<'_> {}

impl<'a> IntoIterator for &'a Circuit {
    type Item = StepRef<'a>;
    type IntoIter = StepIter<'a>;

    fn into_iter(self) -> StepIter<'a> {
        self.steps()
    }
}
