//! Routing: rewrite onto physical qubits and insert SWAPs.

use tracing::debug;

use mitex_ir::{Circuit, Instruction, QubitId, StandardGate};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Routing statistics, stored in the [`PropertySet`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoutingStats {
    /// SWAP gates inserted.
    pub swaps_inserted: usize,
}

/// Greedy shortest-path router.
///
/// Walks the circuit in program order. Each operand is relabelled through
/// the current layout; when a two-qubit gate lands on an uncoupled pair, the
/// first operand is swapped along a shortest path until it neighbours the
/// second, and the layout is updated. The output lives on the full device
/// register and the final placement is recorded as
/// [`PropertySet::final_layout`].
pub struct BasicRouting;

impl Pass for BasicRouting {
    fn name(&self) -> &'static str {
        "BasicRouting"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling_map = properties
            .coupling_map
            .as_ref()
            .ok_or(CompileError::MissingCouplingMap)?;
        let mut layout = properties
            .layout
            .clone()
            .ok_or(CompileError::MissingLayout)?;

        let mut routed = Circuit::like(circuit, coupling_map.num_qubits());
        let mut swaps = 0usize;

        for inst in circuit.instructions() {
            let mut physical = Vec::with_capacity(inst.qubits.len());
            for &q in &inst.qubits {
                physical.push(layout.physical(q).ok_or(CompileError::MissingLayout)?);
            }

            if inst.is_two_qubit_gate() && !coupling_map.is_adjacent(physical[0], physical[1]) {
                let path = coupling_map
                    .shortest_path(physical[0], physical[1])
                    .ok_or(CompileError::RoutingFailed {
                        qubit1: physical[0],
                        qubit2: physical[1],
                    })?;
                for hop in path.windows(2).take(path.len().saturating_sub(2)) {
                    routed.push(Instruction::gate(
                        StandardGate::Swap,
                        [QubitId(hop[0]), QubitId(hop[1])],
                    ))?;
                    layout.swap(hop[0], hop[1]);
                    swaps += 1;
                }
                physical[0] = path[path.len() - 2];
            }

            let mut ops = physical.into_iter();
            routed.push(inst.remap(|_| QubitId(ops.next().unwrap_or_default())))?;
        }

        debug!("BasicRouting inserted {} SWAPs", swaps);
        *circuit = routed;
        properties.final_layout = Some(layout);
        properties.insert(RoutingStats {
            swaps_inserted: swaps,
        });
        Ok(())
    }

    fn should_run(&self, _circuit: &Circuit, properties: &PropertySet) -> bool {
        properties.coupling_map.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{BasisGates, CouplingMap, Layout};

    fn route(circuit: &mut Circuit, map: CouplingMap) -> CompileResult<PropertySet> {
        let n = circuit.num_qubits();
        let mut props = PropertySet::new()
            .with_target(map, BasisGates::universal())
            .with_layout(Layout::trivial(n));
        BasicRouting.run(circuit, &mut props)?;
        Ok(props)
    }

    #[test]
    fn test_adjacent_gate_untouched() {
        let mut circuit = Circuit::bell().unwrap();
        let props = route(&mut circuit, CouplingMap::linear(3)).unwrap();
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(circuit.num_ops(), 2);
        assert_eq!(props.get::<RoutingStats>().unwrap().swaps_inserted, 0);
        assert_eq!(props.final_layout.unwrap().physical_qubits(2), Some(vec![0, 1]));
    }

    #[test]
    fn test_swaps_inserted_in_order() {
        let mut circuit = Circuit::new("c", 4);
        circuit.h(QubitId(3)).unwrap();
        circuit.cx(QubitId(0), QubitId(3)).unwrap();
        circuit.x(QubitId(0)).unwrap();
        let props = route(&mut circuit, CouplingMap::linear(4)).unwrap();

        let names: Vec<_> = circuit.instructions().iter().map(|i| i.name()).collect();
        assert_eq!(names, vec!["h", "swap", "swap", "cx", "x"]);
        // logical 0 travelled 0 -> 1 -> 2
        let cx = &circuit.instructions()[3];
        assert_eq!(cx.qubits, vec![QubitId(2), QubitId(3)]);
        assert_eq!(circuit.instructions()[4].qubits, vec![QubitId(2)]);

        let final_layout = props.final_layout.as_ref().unwrap();
        assert_eq!(final_layout.physical(QubitId(0)), Some(2));
        assert_eq!(final_layout.physical(QubitId(1)), Some(0));
        assert_eq!(final_layout.physical(QubitId(2)), Some(1));
        assert_eq!(props.get::<RoutingStats>().unwrap().swaps_inserted, 2);
    }

    #[test]
    fn test_unreachable_pair() {
        let mut circuit = Circuit::bell().unwrap();
        let map = CouplingMap::from_edges(3, &[(1, 2)]).unwrap();
        let err = route(&mut circuit, map).unwrap_err();
        assert!(matches!(err, CompileError::RoutingFailed { qubit1: 0, qubit2: 1 }));
    }

    #[test]
    fn test_requires_layout() {
        let mut circuit = Circuit::bell().unwrap();
        let mut props = PropertySet::new().with_target(CouplingMap::linear(2), BasisGates::iqm());
        assert!(matches!(
            BasicRouting.run(&mut circuit, &mut props),
            Err(CompileError::MissingLayout)
        ));
    }
}
