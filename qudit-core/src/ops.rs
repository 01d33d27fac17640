//! State-vector operations over subsets of qudit subsystems.
//!
//! Indexing is big-endian mixed-radix: qudit 0 is the most significant digit
//! of a basis index, so `|j, k⟩ = |j·d + k⟩` for two qudits of dimension
//! `d`. Gates act *jointly* on an ordered list of subsystem positions;
//! measurements collapse the state and *remove* the measured subsystems, so
//! the returned vectors are shorter than the inputs.
//!
//! Preconditions (positions in range and pairwise distinct, matrix shapes
//! matching `d^k`) are enforced with assertions; callers that need
//! recoverable validation do it before reaching this layer.

use num_complex::Complex64;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::matrix::{powm, CMatrix, StateVector};

/// Number of qudits of dimension `d` making up a state of length `dim`.
///
/// # Panics
///
/// Panics if `dim` is not a power of `d`.
fn subsystem_count(dim: usize, d: usize) -> usize {
    let mut count = 0;
    let mut product = 1;
    while product < dim {
        product *= d;
        count += 1;
    }
    assert_eq!(product, dim, "state length {dim} is not a power of {d}");
    count
}

/// Stride of the digit at `position` in a big-endian `n`-digit base-`d`
/// index.
#[allow(clippy::cast_possible_truncation)]
fn stride(position: usize, n: usize, d: usize) -> usize {
    d.pow((n - 1 - position) as u32)
}

fn check_positions(positions: &[usize], n: usize) {
    for (i, &p) in positions.iter().enumerate() {
        assert!(p < n, "subsystem position {p} out of range for {n} qudits");
        debug_assert!(
            !positions[..i].contains(&p),
            "subsystem positions must be pairwise distinct"
        );
    }
}

/// Per-column index offsets of the target digits: entry `v` is the absolute
/// index contribution of writing the digit string of `v` into the target
/// positions.
#[allow(clippy::cast_possible_truncation)]
fn target_offsets(targets: &[usize], n: usize, d: usize) -> Vec<usize> {
    let k = targets.len();
    let strides: Vec<usize> = targets.iter().map(|&t| stride(t, n, d)).collect();
    let dk = d.pow(k as u32);
    let mut offsets = vec![0usize; dk];
    for (value, offset) in offsets.iter_mut().enumerate() {
        let mut remaining = value;
        for j in (0..k).rev() {
            *offset += (remaining % d) * strides[j];
            remaining /= d;
        }
    }
    offsets
}

/// Digit string of index `i` read at the target positions, as a row index
/// into a `d^k` matrix.
fn target_digits(i: usize, targets: &[usize], n: usize, d: usize) -> usize {
    let mut row = 0;
    for &t in targets {
        row = row * d + (i / stride(t, n, d)) % d;
    }
    row
}

/// Applies the `d^k × d^k` matrix `u` jointly to the `k` subsystems listed
/// in `targets`, leaving all other tensor factors unchanged.
///
/// An empty target list returns the state unchanged.
///
/// # Panics
///
/// Panics if a target is out of range or `u` is not square of size `d^k`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn apply(psi: &StateVector, u: &CMatrix, targets: &[usize], d: usize) -> StateVector {
    if targets.is_empty() {
        return psi.clone();
    }

    let dim = psi.len();
    let n = subsystem_count(dim, d);
    check_positions(targets, n);

    let dk = d.pow(targets.len() as u32);
    assert!(
        u.is_square() && u.nrows() == dk,
        "gate of shape {}x{} cannot act on {} qudits of dimension {d}",
        u.nrows(),
        u.ncols(),
        targets.len(),
    );

    let offsets = target_offsets(targets, n, d);
    let mut out = StateVector::zeros(dim);
    for i in 0..dim {
        let row = target_digits(i, targets, n, d);
        let base = i - offsets[row];
        let mut acc = Complex64::new(0.0, 0.0);
        for (col, &offset) in offsets.iter().enumerate() {
            acc += u[(row, col)] * psi[base + offset];
        }
        out[i] = acc;
    }
    out
}

/// Applies `u` to `targets` conditioned on the control subsystems: basis
/// states whose control digits all equal a common value `v` receive `u^v`
/// on the targets, every other basis state is left alone.
///
/// With a single control this is the usual controlled gate generalized to
/// qudits (`v = 1` applies `u`, `v = 0` nothing, higher `v` higher powers);
/// an empty control list degenerates to [`apply`].
///
/// # Panics
///
/// Panics if a position is out of range, controls and targets overlap, or
/// `u` is not square of size `d^k`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn apply_ctrl(
    psi: &StateVector,
    u: &CMatrix,
    ctrls: &[usize],
    targets: &[usize],
    d: usize,
) -> StateVector {
    if ctrls.is_empty() {
        return apply(psi, u, targets, d);
    }

    let dim = psi.len();
    let n = subsystem_count(dim, d);
    check_positions(targets, n);
    check_positions(ctrls, n);
    debug_assert!(
        ctrls.iter().all(|c| !targets.contains(c)),
        "control and target subsystems must be disjoint"
    );

    let dk = d.pow(targets.len() as u32);
    assert!(
        u.is_square() && u.nrows() == dk,
        "gate of shape {}x{} cannot act on {} qudits of dimension {d}",
        u.nrows(),
        u.ncols(),
        targets.len(),
    );

    let powers: Vec<CMatrix> = (0..d).map(|v| powm(u, v)).collect();
    let ctrl_strides: Vec<usize> = ctrls.iter().map(|&c| stride(c, n, d)).collect();
    let offsets = target_offsets(targets, n, d);

    let mut out = StateVector::zeros(dim);
    for i in 0..dim {
        let first = (i / ctrl_strides[0]) % d;
        let uniform = ctrl_strides[1..].iter().all(|&s| (i / s) % d == first);
        if !uniform {
            out[i] = psi[i];
            continue;
        }
        let uv = &powers[first];
        let row = target_digits(i, targets, n, d);
        let base = i - offsets[row];
        let mut acc = Complex64::new(0.0, 0.0);
        for (col, &offset) in offsets.iter().enumerate() {
            acc += uv[(row, col)] * psi[base + offset];
        }
        out[i] = acc;
    }
    out
}

/// Measures the listed subsystems in the computational basis, one at a
/// time, sampling each outcome from the marginal distribution of the
/// current (already partially collapsed) state.
///
/// Returns the sampled digits in the order of `targets`, the joint
/// probability of the sampled outcome string, and the collapsed state with
/// the measured subsystems removed.
///
/// # Panics
///
/// Panics if a target is out of range or listed twice.
#[must_use]
pub fn measure_seq<R: Rng + ?Sized>(
    psi: &StateVector,
    targets: &[usize],
    d: usize,
    rng: &mut R,
) -> (Vec<usize>, f64, StateVector) {
    let n = subsystem_count(psi.len(), d);
    check_positions(targets, n);

    // Collapse from the highest position down so removals do not shift the
    // positions of the subsystems still waiting to be measured.
    let mut order: Vec<usize> = (0..targets.len()).collect();
    order.sort_unstable_by(|&a, &b| targets[b].cmp(&targets[a]));

    let mut state = psi.clone();
    let mut outcomes = vec![0usize; targets.len()];
    let mut probability = 1.0;
    for &slot in &order {
        let (outcome, p, collapsed) = measure_one(&state, targets[slot], d, rng);
        outcomes[slot] = outcome;
        probability *= p;
        state = collapsed;
    }
    (outcomes, probability, state)
}

/// Computational-basis measurement of a single subsystem.
fn measure_one<R: Rng + ?Sized>(
    psi: &StateVector,
    target: usize,
    d: usize,
    rng: &mut R,
) -> (usize, f64, StateVector) {
    let dim = psi.len();
    let n = subsystem_count(dim, d);
    let s = stride(target, n, d);

    let mut marginals = vec![0.0f64; d];
    for i in 0..dim {
        marginals[(i / s) % d] += psi[i].norm_sqr();
    }

    let outcome = WeightedIndex::new(&marginals)
        .expect("state norm vanished")
        .sample(rng);
    let p = marginals[outcome];
    let scale = p.sqrt();

    let mut collapsed = StateVector::zeros(dim / d);
    let mut j = 0;
    for i in 0..dim {
        if (i / s) % d == outcome {
            collapsed[j] = psi[i] / scale;
            j += 1;
        }
    }
    (outcome, p, collapsed)
}

/// Rank-1 projective measurement of the subsystems listed in `targets`,
/// with projectors given by the columns of `v`.
///
/// For an orthonormal basis `v` is square of size `d^k`; any matrix whose
/// columns are unit vectors of length `d^k` is accepted. Returns the
/// sampled outcome index, the probabilities of *all* outcomes, and the
/// post-measurement states (targets removed, normalized; outcomes of zero
/// probability keep an all-zero vector).
///
/// # Panics
///
/// Panics if a target is out of range or `v` has a row count other than
/// `d^k`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn measure<R: Rng + ?Sized>(
    psi: &StateVector,
    v: &CMatrix,
    targets: &[usize],
    d: usize,
    rng: &mut R,
) -> (usize, Vec<f64>, Vec<StateVector>) {
    let dim = psi.len();
    let n = subsystem_count(dim, d);
    check_positions(targets, n);

    let dk = d.pow(targets.len() as u32);
    assert_eq!(
        v.nrows(),
        dk,
        "measurement basis has {} rows but the targets span dimension {dk}",
        v.nrows(),
    );
    let outcome_count = v.ncols();

    let mut is_target = vec![false; n];
    for &t in targets {
        is_target[t] = true;
    }

    // One pass over the state accumulates ⟨v_m| ⊗ I |ψ⟩ for every outcome.
    let remaining_dim = dim / dk;
    let mut amplitudes = vec![StateVector::zeros(remaining_dim); outcome_count];
    for i in 0..dim {
        let row = target_digits(i, targets, n, d);
        let mut rest = 0;
        for (position, &targeted) in is_target.iter().enumerate() {
            if !targeted {
                rest = rest * d + (i / stride(position, n, d)) % d;
            }
        }
        for (m, amplitude) in amplitudes.iter_mut().enumerate() {
            amplitude[rest] += v[(row, m)].conj() * psi[i];
        }
    }

    let probabilities: Vec<f64> = amplitudes.iter().map(StateVector::norm_squared).collect();
    let outcome = WeightedIndex::new(&probabilities)
        .expect("measurement probabilities vanished")
        .sample(rng);

    let states: Vec<StateVector> = amplitudes
        .into_iter()
        .zip(probabilities.iter())
        .map(|(amplitude, &p)| if p > 0.0 { amplitude.unscale(p.sqrt()) } else { amplitude })
        .collect();

    (outcome, probabilities, states)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::approx_eq;
    use crate::{gates, states};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const EPSILON: f64 = 1e-10;

    fn assert_close(actual: &StateVector, expected: &[Complex64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).norm() < EPSILON, "expected {expected:?}, got {actual:?}");
        }
    }

    fn re(x: f64) -> Complex64 {
        Complex64::new(x, 0.0)
    }

    #[test]
    fn apply_hadamard_to_first_of_two() {
        let psi = states::zero(2, 2);
        let out = apply(&psi, &gates::hadamard(), &[0], 2);
        let r = std::f64::consts::FRAC_1_SQRT_2;
        assert_close(&out, &[re(r), re(0.0), re(r), re(0.0)]);
    }

    #[test]
    fn apply_joint_cnot_builds_bell_state() {
        let psi = states::zero(2, 2);
        let plus = apply(&psi, &gates::hadamard(), &[0], 2);
        let bell = apply(&plus, &gates::cnot(), &[0, 1], 2);
        let r = std::f64::consts::FRAC_1_SQRT_2;
        assert_close(&bell, &[re(r), re(0.0), re(0.0), re(r)]);
    }

    #[test]
    fn apply_respects_target_order() {
        // CNOT with the target listed first swaps the roles of the qubits.
        let psi = states::zero(2, 2);
        let flipped = apply(&psi, &gates::pauli_x(), &[1], 2); // |01⟩
        let out = apply(&flipped, &gates::cnot(), &[1, 0], 2); // qubit 1 controls
        assert_close(&out, &[re(0.0), re(0.0), re(0.0), re(1.0)]); // |11⟩
    }

    #[test]
    fn apply_empty_target_list_is_identity() {
        let psi = states::zero(2, 2);
        let out = apply(&psi, &gates::hadamard(), &[], 2);
        assert_close(&out, &[re(1.0), re(0.0), re(0.0), re(0.0)]);
    }

    #[test]
    fn apply_qutrit_shift() {
        let psi = states::zero(2, 3);
        let out = apply(&psi, &gates::shift_x(3), &[1], 3);
        // |00⟩ ↦ |01⟩
        assert!((out[1].norm() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn ctrl_with_unset_control_is_identity() {
        let psi = states::zero(2, 2);
        let out = apply_ctrl(&psi, &gates::pauli_x(), &[0], &[1], 2);
        assert_close(&out, &[re(1.0), re(0.0), re(0.0), re(0.0)]);
    }

    #[test]
    fn ctrl_matches_joint_cnot_matrix() {
        let r = std::f64::consts::FRAC_1_SQRT_2;
        let mut psi = StateVector::zeros(4);
        psi[0] = re(r);
        psi[2] = re(r); // (|00⟩ + |10⟩)/√2
        let via_ctrl = apply_ctrl(&psi, &gates::pauli_x(), &[0], &[1], 2);
        let via_matrix = apply(&psi, &gates::cnot(), &[0, 1], 2);
        assert!(approx_eq(
            &CMatrix::from_column_slice(4, 1, via_ctrl.as_slice()),
            &CMatrix::from_column_slice(4, 1, via_matrix.as_slice()),
        ));
    }

    #[test]
    fn ctrl_applies_matrix_power_for_qutrits() {
        // Control at value 2 applies X_3 squared.
        let mut psi = StateVector::zeros(9);
        psi[6] = re(1.0); // |20⟩
        let out = apply_ctrl(&psi, &gates::shift_x(3), &[0], &[1], 3);
        // |20⟩ ↦ |2, (0+2) mod 3⟩ = |22⟩ = index 8
        assert!((out[8].norm() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn multi_ctrl_fires_only_on_common_value() {
        // |110⟩: both controls at 1 → target flips.
        let mut psi = StateVector::zeros(8);
        psi[6] = re(1.0);
        let out = apply_ctrl(&psi, &gates::pauli_x(), &[0, 1], &[2], 2);
        assert!((out[7].norm() - 1.0).abs() < EPSILON);

        // |100⟩: controls disagree → untouched.
        let mut psi = StateVector::zeros(8);
        psi[4] = re(1.0);
        let out = apply_ctrl(&psi, &gates::pauli_x(), &[0, 1], &[2], 2);
        assert!((out[4].norm() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn measure_one_collapses_and_removes_subsystem() {
        let mut rng = SmallRng::seed_from_u64(7);
        let psi = apply(&states::zero(2, 2), &gates::pauli_x(), &[0], 2); // |10⟩
        let (outcomes, p, collapsed) = measure_seq(&psi, &[0], 2, &mut rng);
        assert_eq!(outcomes, vec![1]);
        assert!((p - 1.0).abs() < EPSILON);
        assert_close(&collapsed, &[re(1.0), re(0.0)]);
    }

    #[test]
    fn measure_seq_on_product_state_is_deterministic() {
        let mut rng = SmallRng::seed_from_u64(11);
        let psi = apply(&states::zero(3, 2), &gates::pauli_x(), &[1], 2); // |010⟩
        let (outcomes, p, collapsed) = measure_seq(&psi, &[2, 1], 2, &mut rng);
        assert_eq!(outcomes, vec![0, 1]);
        assert!((p - 1.0).abs() < EPSILON);
        assert_close(&collapsed, &[re(1.0), re(0.0)]);
    }

    #[test]
    fn measure_seq_probability_is_conditional_product() {
        let mut rng = SmallRng::seed_from_u64(3);
        let plus = apply(&states::zero(1, 2), &gates::hadamard(), &[0], 2);
        let (outcomes, p, collapsed) = measure_seq(&plus, &[0], 2, &mut rng);
        assert!(outcomes[0] < 2);
        assert!((p - 0.5).abs() < EPSILON);
        assert_eq!(collapsed.len(), 1);
        assert!((collapsed[0].norm() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn measure_in_hadamard_basis() {
        let mut rng = SmallRng::seed_from_u64(5);
        let plus = apply(&states::zero(1, 2), &gates::hadamard(), &[0], 2);
        let (outcome, probabilities, states) = measure(&plus, &gates::hadamard(), &[0], 2, &mut rng);
        // |+⟩ projects onto the first Hadamard column with certainty.
        assert_eq!(outcome, 0);
        assert!((probabilities[0] - 1.0).abs() < EPSILON);
        assert!(probabilities[1].abs() < EPSILON);
        assert_eq!(states[0].len(), 1);
    }

    #[test]
    fn joint_fourier_measurement_is_uniform_from_zero() {
        let mut rng = SmallRng::seed_from_u64(9);
        let psi = states::zero(2, 3);
        let basis = gates::fourier(3).kronecker(&gates::fourier(3));
        let (outcome, probabilities, states) = measure(&psi, &basis, &[0, 1], 3, &mut rng);
        assert!(outcome < 9);
        for &p in &probabilities {
            assert!((p - 1.0 / 9.0).abs() < EPSILON);
        }
        assert_eq!(states[outcome].len(), 1);
        assert!((states[outcome][0].norm() - 1.0).abs() < EPSILON);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn phase_gate(angles: &[f64]) -> CMatrix {
            CMatrix::from_fn(angles.len(), angles.len(), |row, col| {
                if row == col {
                    Complex64::from_polar(1.0, angles[row])
                } else {
                    Complex64::new(0.0, 0.0)
                }
            })
        }

        proptest! {
            #[test]
            fn unitary_application_preserves_norm(
                angles in proptest::collection::vec(0.0..std::f64::consts::TAU, 3),
                target in 0usize..3,
            ) {
                let mut psi = states::zero(3, 3);
                // Spread amplitude around first so the check is not trivial.
                psi = apply(&psi, &gates::fourier(3), &[0], 3);
                psi = apply(&psi, &gates::fourier(3), &[2], 3);
                let out = apply(&psi, &phase_gate(&angles), &[target], 3);
                prop_assert!((out.norm() - 1.0).abs() < EPSILON);
            }

            #[test]
            fn measurement_probabilities_sum_to_one(seed in 0u64..1000) {
                let mut rng = SmallRng::seed_from_u64(seed);
                let mut psi = states::zero(2, 2);
                psi = apply(&psi, &gates::hadamard(), &[0], 2);
                psi = apply(&psi, &gates::cnot(), &[0, 1], 2);
                let (_, probabilities, _) = measure(&psi, &gates::id(2), &[1], 2, &mut rng);
                let total: f64 = probabilities.iter().sum();
                prop_assert!((total - 1.0).abs() < EPSILON);
            }
        }
    }

    #[test]
    fn measurement_outcomes_follow_born_rule() {
        let mut rng = SmallRng::seed_from_u64(42);
        let plus = apply(&states::zero(1, 2), &gates::hadamard(), &[0], 2);
        let trials = 20_000;
        let mut ones = 0;
        for _ in 0..trials {
            let (outcomes, _, _) = measure_seq(&plus, &[0], 2, &mut rng);
            ones += outcomes[0];
        }
        let ratio = ones as f64 / f64::from(trials);
        assert!((0.47..0.53).contains(&ratio), "outcome ratio {ratio} not ~0.5");
    }
}
