//! Properties of circuit construction and parameter binding.

use mitex_runner::{CircuitModel, ParameterBinder, RunError, ansatz};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

proptest! {
    #[test]
    fn parameter_count_and_operands_in_range(n in 1u32..12, depth in 0u32..6, seed in any::<u64>()) {
        let (circuit, observable) = CircuitModel::new(n, depth)
            .with_ansatz_seed(seed)
            .with_barriers(seed % 2 == 0)
            .build()
            .unwrap();

        prop_assert_eq!(circuit.num_parameters(), (n * (depth + 1)) as usize);
        prop_assert_eq!(observable.num_qubits(), n);
        for inst in circuit.instructions() {
            for q in &inst.qubits {
                prop_assert!(q.0 < n);
            }
        }
    }

    #[test]
    fn binding_is_deterministic_and_bounded(
        n in 1u32..8,
        depth in 0u32..4,
        seed in any::<u64>(),
        phi_max in 0.01f64..10.0,
    ) {
        let (circuit, _) = ansatz::build(n, depth).unwrap();
        let binder = ParameterBinder::new(phi_max).unwrap();

        let first = binder.bind_seeded(&circuit, seed);
        let second = binder.bind(&circuit, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), circuit.num_parameters());
        for v in first.iter() {
            prop_assert!((-phi_max..=phi_max).contains(&v));
        }
    }

    #[test]
    fn same_ansatz_seed_same_circuit(n in 1u32..8, depth in 0u32..4, seed in any::<u64>()) {
        let a = CircuitModel::new(n, depth).with_ansatz_seed(seed).build().unwrap();
        let b = CircuitModel::new(n, depth).with_ansatz_seed(seed).build().unwrap();
        prop_assert_eq!(a.0.instructions(), b.0.instructions());
    }
}

#[test]
fn zero_qubits_is_a_configuration_error() {
    assert!(matches!(ansatz::build(0, 4), Err(RunError::Configuration(_))));
}

#[test]
fn binding_with_non_positive_phi_max_fails() {
    let (circuit, _) = ansatz::build(2, 1).unwrap();
    let err = mitex_runner::binder::bind(&circuit, &mut StdRng::seed_from_u64(0), 0.0).unwrap_err();
    assert!(matches!(err, RunError::Configuration(_)));
}

#[test]
fn default_observable_is_second_to_last_qubit() {
    let model = CircuitModel::new(30, 4);
    assert_eq!(model.observable_qubit(), 28);
    assert_eq!(model.num_parameters(), 150);
    assert_eq!(CircuitModel::new(1, 0).observable_qubit(), 0);
}
