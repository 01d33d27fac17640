use qudit_core::gates;
use quditverse::{Circuit, Engine};

fn main() {
    // Bell pair with measurement of both qubits.
    let mut circuit = Circuit::named(2, 2, 2, "bell").unwrap();
    circuit
        .gate(&gates::hadamard(), 0, None)
        .unwrap()
        .ctrl(&gates::pauli_x(), &[0], &[1], None)
        .unwrap()
        .measure_z(0, 0, None)
        .unwrap()
        .measure_z(1, 1, None)
        .unwrap();

    println!("{circuit}\n");

    // The outcomes agree shot after shot; the first is a fair coin.
    let mut counts = [0usize; 2];
    for _ in 0..1000 {
        let mut engine = Engine::new(&circuit);
        engine.run().unwrap();
        assert_eq!(engine.dits()[0], engine.dits()[1]);
        counts[engine.dits()[0]] += 1;
    }

    println!("Outcome statistics over 1000 shots:");
    println!("  |00⟩: {} shots", counts[0]);
    println!("  |11⟩: {} shots", counts[1]);
}
