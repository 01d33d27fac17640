//! JSON and textual serialization of circuits and engine state.
//!
//! The JSON layout is stable: a circuit object carries `nq`, `nc`, `d`,
//! `name`, `steps` (one object per timeline entry, with `ctrl` present only
//! on controlled gates and `c_reg` only on measurements), then
//! `"gate count"`, `"measured positions"` and `"non-measured positions"`.
//! An engine object carries `measured`, `dits` and `probs`.
//! [`CircuitSketch`] reads the circuit form back for round-trip checks.

use std::fmt;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::circuit::Circuit;
use crate::engine::Engine;
use crate::iter::StepKind;

impl Circuit {
    /// The circuit as a JSON value, keys in serialization order.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let steps: Vec<Value> = self
            .steps()
            .map(|step| {
                let mut entry = Map::new();
                entry.insert("step".into(), json!(step.ip()));
                match step.kind() {
                    StepKind::Gate(gate) => {
                        entry.insert("type".into(), json!(gate.tag()));
                        if !gate.ctrls().is_empty() {
                            entry.insert("ctrl".into(), json!(gate.ctrls()));
                        }
                        entry.insert("target".into(), json!(gate.targets()));
                        entry.insert("name".into(), json!(gate.name()));
                    }
                    StepKind::Measurement(measurement) => {
                        entry.insert("type".into(), json!(measurement.tag()));
                        entry.insert("target".into(), json!(measurement.targets()));
                        entry.insert("c_reg".into(), json!(measurement.c_reg()));
                        entry.insert("name".into(), json!(measurement.name()));
                    }
                }
                Value::Object(entry)
            })
            .collect();

        let mut root = Map::new();
        root.insert("nq".into(), json!(self.nq()));
        root.insert("nc".into(), json!(self.nc()));
        root.insert("d".into(), json!(self.dim()));
        root.insert("name".into(), json!(self.name()));
        root.insert("steps".into(), Value::Array(steps));
        root.insert("gate count".into(), json!(self.gate_count()));
        root.insert("measured positions".into(), json!(self.measured_positions()));
        root.insert(
            "non-measured positions".into(),
            json!(self.non_measured_positions()),
        );
        Value::Object(root)
    }

    /// The circuit as a JSON string, with or without the enclosing curly
    /// brackets.
    #[must_use]
    pub fn to_json_string(&self, enclosed_in_curly_brackets: bool) -> String {
        let serialized = self.to_json().to_string();
        if enclosed_in_curly_brackets {
            serialized
        } else {
            serialized[1..serialized.len() - 1].to_string()
        }
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "nq = {}, nc = {}, d = {}, name = \"{}\"",
            self.nq(),
            self.nc(),
            self.dim(),
            self.name(),
        )?;
        for step in self.steps() {
            writeln!(f, "{step}")?;
        }
        writeln!(f, "gate count: {}", self.gate_count())?;
        writeln!(f, "measured positions: {:?}", self.measured_positions())?;
        write!(f, "non-measured positions: {:?}", self.non_measured_positions())
    }
}

impl Engine<'_> {
    /// The engine state as a JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut root = Map::new();
        root.insert("measured".into(), json!(self.measured_positions()));
        root.insert("dits".into(), json!(self.dits()));
        root.insert("probs".into(), json!(self.probs()));
        Value::Object(root)
    }

    /// The engine state as a JSON string, with or without the enclosing
    /// curly brackets.
    #[must_use]
    pub fn to_json_string(&self, enclosed_in_curly_brackets: bool) -> String {
        let serialized = self.to_json().to_string();
        if enclosed_in_curly_brackets {
            serialized
        } else {
            serialized[1..serialized.len() - 1].to_string()
        }
    }
}

impl fmt::Display for Engine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "measured: {:?}", self.measured_positions())?;
        writeln!(f, "dits: {:?}", self.dits())?;
        write!(f, "probs: {:?}", self.probs())
    }
}

/// One serialized timeline entry, as read back from JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StepSketch {
    pub step: usize,
    #[serde(rename = "type")]
    pub tag: String,
    #[serde(default)]
    pub ctrl: Option<Vec<usize>>,
    pub target: Vec<usize>,
    #[serde(default)]
    pub c_reg: Option<usize>,
    pub name: String,
}

/// The deserializable mirror of the circuit JSON form.
///
/// Steps reference matrices by content digest, and digests are not part of
/// the serialized form, so a parsed circuit cannot be re-executed; the
/// sketch captures everything the JSON carries and is what round-trip
/// tests compare.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CircuitSketch {
    pub nq: usize,
    pub nc: usize,
    pub d: usize,
    pub name: String,
    pub steps: Vec<StepSketch>,
    #[serde(rename = "gate count")]
    pub gate_count: usize,
    #[serde(rename = "measured positions")]
    pub measured_positions: Vec<usize>,
    #[serde(rename = "non-measured positions")]
    pub non_measured_positions: Vec<usize>,
}

impl CircuitSketch {
    /// Parses the JSON emitted by [`Circuit::to_json_string`].
    ///
    /// # Errors
    ///
    /// Any `serde_json` parse error.
    pub fn from_json_str(serialized: &str) -> serde_json::Result<Self> {
        serde_json::from_str(serialized)
    }

    /// The sketch a circuit is expected to serialize to, extracted
    /// directly from the in-memory circuit.
    #[must_use]
    pub fn of(circuit: &Circuit) -> Self {
        let steps = circuit
            .steps()
            .map(|step| match step.kind() {
                StepKind::Gate(gate) => StepSketch {
                    step: step.ip(),
                    tag: gate.tag().to_string(),
                    ctrl: if gate.ctrls().is_empty() {
                        None
                    } else {
                        Some(gate.ctrls().to_vec())
                    },
                    target: gate.targets().to_vec(),
                    c_reg: None,
                    name: gate.name().to_string(),
                },
                StepKind::Measurement(measurement) => StepSketch {
                    step: step.ip(),
                    tag: measurement.tag().to_string(),
                    ctrl: None,
                    target: measurement.targets().to_vec(),
                    c_reg: Some(measurement.c_reg()),
                    name: measurement.name().to_string(),
                },
            })
            .collect();
        Self {
            nq: circuit.nq(),
            nc: circuit.nc(),
            d: circuit.dim(),
            name: circuit.name().to_string(),
            steps,
            gate_count: circuit.gate_count(),
            measured_positions: circuit.measured_positions(),
            non_measured_positions: circuit.non_measured_positions(),
        }
    }
}
