//! Criterion benchmarks for circuit construction and execution.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use qudit_core::gates;
use quditverse::{Circuit, Engine, KrausNoise, NoisyEngine};

/// GHZ-style preparation: H on qubit 0, a CNOT chain, then measure all.
fn ghz_circuit(qubits: usize) -> Circuit {
    let mut circuit = Circuit::new(qubits, qubits, 2).unwrap();
    circuit.gate(&gates::hadamard(), 0, None).unwrap();
    for i in 0..qubits - 1 {
        circuit.ctrl(&gates::pauli_x(), &[i], &[i + 1], None).unwrap();
    }
    for i in 0..qubits {
        circuit.measure_z(i, i, None).unwrap();
    }
    circuit
}

fn construction_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("construction");
    for qubits in [4, 8, 12] {
        group.bench_function(BenchmarkId::new("ghz", qubits), |bencher| {
            bencher.iter(|| ghz_circuit(qubits));
        });
    }
    group.finish();
}

fn execution_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("execution");
    group.sample_size(20);
    for qubits in [4, 8, 12] {
        let circuit = ghz_circuit(qubits);
        group.bench_with_input(BenchmarkId::new("ghz", qubits), &circuit, |bencher, circuit| {
            bencher.iter(|| {
                let mut engine = Engine::new(circuit);
                engine.run().unwrap();
                engine.dits().to_vec()
            });
        });
    }
    group.finish();
}

fn noisy_execution_benchmark(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("noisy_execution");
    group.sample_size(20);
    let circuit = ghz_circuit(8);
    for p_error in [0.001, 0.01, 0.1] {
        let param = format!("p{p_error}");
        group.bench_with_input(BenchmarkId::new("ghz8", &param), &p_error, |bencher, &p| {
            bencher.iter(|| {
                let mut engine = NoisyEngine::new(&circuit, KrausNoise::depolarizing(p)).unwrap();
                engine.run().unwrap();
                engine.dits().to_vec()
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    construction_benchmark,
    execution_benchmark,
    noisy_execution_benchmark
);
criterion_main!(benches);
