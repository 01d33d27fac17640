use qudit_core::gates;
use quditverse::{Circuit, Engine, KrausNoise, NoisyEngine};

const EPSILON: f64 = 1e-10;

fn three_step_circuit() -> Circuit {
    let mut circuit = Circuit::new(1, 0, 2).unwrap();
    circuit
        .gate(&gates::hadamard(), 0, None)
        .unwrap()
        .gate(&gates::phase_s(), 0, None)
        .unwrap()
        .gate(&gates::hadamard(), 0, None)
        .unwrap();
    circuit
}

#[test]
fn branch_record_has_one_entry_per_step_and_live_qudit() {
    let circuit = three_step_circuit();
    let mut engine = NoisyEngine::new(&circuit, KrausNoise::bit_flip(0.4)).unwrap();
    engine.run().unwrap();

    let results = engine.noise_results();
    assert_eq!(results.len(), 3);
    for per_step in results {
        assert_eq!(per_step.len(), 1, "one live qudit per step");
        assert!(per_step[0] < 2, "bit flip has two Kraus branches");
    }
}

#[test]
fn measured_qudits_stop_receiving_noise() {
    let mut circuit = Circuit::new(2, 1, 2).unwrap();
    circuit
        .gate(&gates::hadamard(), 0, None)
        .unwrap()
        .measure_z(0, 0, None)
        .unwrap()
        .gate(&gates::pauli_x(), 1, None)
        .unwrap();

    let mut engine = NoisyEngine::new(&circuit, KrausNoise::depolarizing(0.2)).unwrap();
    engine.run().unwrap();

    let lengths: Vec<usize> = engine.noise_results().iter().map(Vec::len).collect();
    assert_eq!(lengths, vec![2, 2, 1]);
}

#[test]
fn certain_bit_flip_always_selects_the_flip_branch() {
    let circuit = three_step_circuit();
    let mut engine = NoisyEngine::new(&circuit, KrausNoise::bit_flip(1.0)).unwrap();
    engine.run().unwrap();

    for per_step in engine.noise_results() {
        assert_eq!(per_step, &[1]);
    }
}

#[test]
fn zero_noise_reproduces_the_noiseless_engine() {
    let circuit = three_step_circuit();

    let mut noisy = NoisyEngine::new(&circuit, KrausNoise::bit_flip(0.0)).unwrap();
    noisy.run().unwrap();

    let mut clean = Engine::new(&circuit);
    clean.run().unwrap();

    for (a, b) in noisy.psi().iter().zip(clean.psi().iter()) {
        assert!((a - b).norm() < EPSILON);
    }
    for per_step in noisy.noise_results() {
        assert_eq!(per_step, &[0], "only the identity branch can fire");
    }
}

#[test]
fn noise_keeps_the_state_normalized() {
    let circuit = three_step_circuit();
    for _ in 0..50 {
        let mut engine = NoisyEngine::new(&circuit, KrausNoise::depolarizing(0.5)).unwrap();
        engine.run().unwrap();
        assert!((engine.psi().norm() - 1.0).abs() < EPSILON);
    }
}

#[test]
fn engine_accessors_are_available_through_deref() {
    let mut circuit = Circuit::new(1, 1, 2).unwrap();
    circuit.cctrl(&gates::pauli_x(), &[0], &[0], None).unwrap();

    let mut engine = NoisyEngine::new(&circuit, KrausNoise::bit_flip(0.0)).unwrap();
    engine.set_dit(0, 1).unwrap();
    engine.run().unwrap();
    assert!((engine.psi()[1].norm() - 1.0).abs() < EPSILON);
    assert_eq!(engine.dits(), &[1]);
}
