//! End-to-end mapping tests across pipelines and targets.

use mitex_compile::{BasisGates, CompileError, CouplingMap, transpile};
use mitex_ir::{Circuit, QubitId, StandardGate};
use proptest::prelude::*;

fn native_ibm_circuit() -> Circuit {
    let mut circuit = Circuit::new("native", 3);
    circuit.rz(0.3, QubitId(0)).unwrap();
    circuit.sx(QubitId(0)).unwrap();
    circuit.cx(QubitId(0), QubitId(1)).unwrap();
    circuit.rz(-1.1, QubitId(1)).unwrap();
    circuit.cx(QubitId(1), QubitId(2)).unwrap();
    circuit.x(QubitId(2)).unwrap();
    circuit
}

#[test]
fn native_connected_circuit_is_a_noop_at_every_level() {
    let circuit = native_ibm_circuit();
    for level in 0..=3 {
        let out = transpile(&circuit, CouplingMap::linear(5), BasisGates::ibm_cx(), level).unwrap();
        assert_eq!(out.circuit.instructions(), circuit.instructions(), "level {level}");
        assert_eq!(out.initial_layout, vec![0, 1, 2]);
        assert_eq!(out.final_layout, vec![0, 1, 2]);
        assert_eq!(out.swaps_inserted, 0);
    }
}

#[test]
fn too_wide_for_device() {
    let circuit = Circuit::new("wide", 6);
    let err = transpile(&circuit, CouplingMap::linear(5), BasisGates::ibm_cx(), 1).unwrap_err();
    assert!(matches!(err, CompileError::CircuitTooLarge { required: 6, available: 5 }));
}

#[test]
fn disconnected_device_fails_routing() {
    let mut circuit = Circuit::new("c", 2);
    circuit.cz(QubitId(0), QubitId(1)).unwrap();
    let map = CouplingMap::from_edges(4, &[(0, 2), (1, 3)]).unwrap();
    let err = transpile(&circuit, map, BasisGates::iqm(), 0).unwrap_err();
    assert!(matches!(err, CompileError::RoutingFailed { .. }));
}

#[test]
fn routed_output_respects_coupling() {
    let mut circuit = Circuit::new("ring", 5);
    for q in 0..5 {
        circuit.h(QubitId(q)).unwrap();
    }
    for q in 0..5 {
        circuit.cx(QubitId(q), QubitId((q + 2) % 5)).unwrap();
    }
    let map = CouplingMap::linear(5);
    let out = transpile(&circuit, map.clone(), BasisGates::ibm_cx(), 1).unwrap();

    assert!(out.swaps_inserted > 0);
    for inst in out.circuit.instructions() {
        if inst.is_two_qubit_gate() {
            assert!(map.is_adjacent(inst.qubits[0].0, inst.qubits[1].0));
        }
    }
    let mut sorted = out.final_layout.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), 5);
}

#[test]
fn iqm_output_is_prx_cz_only() {
    let mut circuit = Circuit::new("mixed", 3);
    let theta = circuit.add_parameter("theta").unwrap();
    circuit.ry(theta, QubitId(0)).unwrap();
    circuit.h(QubitId(1)).unwrap();
    circuit.cx(QubitId(1), QubitId(2)).unwrap();
    circuit.gate(StandardGate::RZZ(0.4.into()), [QubitId(0), QubitId(2)]).unwrap();
    let out = transpile(&circuit, CouplingMap::star(5), BasisGates::iqm(), 2).unwrap();
    for inst in out.circuit.instructions() {
        assert!(["prx", "cz"].contains(&inst.name()), "unexpected {}", inst.name());
    }
    assert_eq!(out.circuit.parameters(), circuit.parameters());
}

fn arb_gate(n: u32) -> impl Strategy<Value = (u8, u32, u32, f64)> {
    (0u8..4, 0..n, 0..n, -3.0f64..3.0)
}

proptest! {
    #[test]
    fn random_circuits_map_on_every_level(
        n in 2u32..6,
        ops in prop::collection::vec(arb_gate(6), 0..24),
        level in 0u8..=3,
    ) {
        let mut circuit = Circuit::new("random", n);
        for (kind, a, b, angle) in ops {
            let (a, b) = (a % n, b % n);
            match kind {
                0 => { circuit.h(QubitId(a)).unwrap(); }
                1 => { circuit.rz(angle, QubitId(a)).unwrap(); }
                2 => { circuit.ry(angle, QubitId(a)).unwrap(); }
                _ if a != b => { circuit.cx(QubitId(a), QubitId(b)).unwrap(); }
                _ => {}
            }
        }
        let map = CouplingMap::linear(6);
        let out = transpile(&circuit, map.clone(), BasisGates::ibm_cx(), level).unwrap();
        for inst in out.circuit.instructions() {
            prop_assert!(["rz", "sx", "x", "cx"].contains(&inst.name()));
            if inst.is_two_qubit_gate() {
                prop_assert!(map.is_adjacent(inst.qubits[0].0, inst.qubits[1].0));
            }
        }
        prop_assert_eq!(out.final_layout.len(), n as usize);
    }
}
