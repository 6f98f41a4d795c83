//! Layout passes: choose the initial physical home of each logical qubit.

use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use tracing::debug;

use mitex_ir::Circuit;

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{CouplingMap, Layout, PropertySet};

fn check_fits(circuit: &Circuit, coupling_map: &CouplingMap) -> CompileResult<()> {
    if circuit.num_qubits() > coupling_map.num_qubits() {
        return Err(CompileError::CircuitTooLarge {
            required: circuit.num_qubits(),
            available: coupling_map.num_qubits(),
        });
    }
    Ok(())
}

/// Logical qubit `i` on physical qubit `i`.
pub struct TrivialLayout;

impl Pass for TrivialLayout {
    fn name(&self) -> &'static str {
        "TrivialLayout"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling_map = properties
            .coupling_map
            .as_ref()
            .ok_or(CompileError::MissingCouplingMap)?;
        check_fits(circuit, coupling_map)?;
        properties.layout = Some(Layout::trivial(circuit.num_qubits()));
        Ok(())
    }

    fn should_run(&self, _circuit: &Circuit, properties: &PropertySet) -> bool {
        properties.layout.is_none() && properties.coupling_map.is_some()
    }
}

/// Places the circuit on the most densely coupled connected region of the
/// device.
///
/// When the trivial layout already puts every interacting pair on a coupler
/// it is kept, so native and connected input maps to itself.
pub struct DenseLayout;

impl DenseLayout {
    /// Breadth-first region of `size` qubits grown from `start`.
    fn region(coupling_map: &CouplingMap, start: u32, size: usize) -> Vec<u32> {
        let mut seen = FxHashSet::default();
        let mut order = Vec::with_capacity(size);
        let mut queue = VecDeque::from([start]);
        seen.insert(start);
        while let Some(q) = queue.pop_front() {
            order.push(q);
            if order.len() == size {
                break;
            }
            for n in coupling_map.neighbors(q) {
                if seen.insert(n) {
                    queue.push_back(n);
                }
            }
        }
        order
    }

    fn internal_edges(coupling_map: &CouplingMap, region: &[u32]) -> usize {
        let members: FxHashSet<u32> = region.iter().copied().collect();
        coupling_map
            .edges()
            .into_iter()
            .filter(|(a, b)| members.contains(a) && members.contains(b))
            .count()
    }

    fn trivial_is_native(circuit: &Circuit, coupling_map: &CouplingMap) -> bool {
        circuit
            .instructions()
            .iter()
            .filter(|i| i.is_two_qubit_gate())
            .all(|i| coupling_map.is_adjacent(i.qubits[0].0, i.qubits[1].0))
    }
}

impl Pass for DenseLayout {
    fn name(&self) -> &'static str {
        "DenseLayout"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let coupling_map = properties
            .coupling_map
            .as_ref()
            .ok_or(CompileError::MissingCouplingMap)?;
        check_fits(circuit, coupling_map)?;

        let n = circuit.num_qubits() as usize;
        if n == 0 || Self::trivial_is_native(circuit, coupling_map) {
            debug!("DenseLayout: trivial layout already satisfies connectivity");
            properties.layout = Some(Layout::trivial(circuit.num_qubits()));
            return Ok(());
        }

        let mut best: Option<(usize, Vec<u32>)> = None;
        for start in 0..coupling_map.num_qubits() {
            let region = Self::region(coupling_map, start, n);
            if region.len() < n {
                continue;
            }
            let score = Self::internal_edges(coupling_map, &region);
            if best.as_ref().is_none_or(|(s, _)| score > *s) {
                best = Some((score, region));
            }
        }

        // No connected region is large enough; routing will report the
        // unreachable pair.
        let physical = match best {
            Some((score, region)) => {
                debug!("DenseLayout: region {:?} with {} couplers", region, score);
                region
            }
            None => (0..circuit.num_qubits()).collect(),
        };
        properties.layout = Some(Layout::from_physical(&physical));
        Ok(())
    }

    fn should_run(&self, _circuit: &Circuit, properties: &PropertySet) -> bool {
        properties.layout.is_none() && properties.coupling_map.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::BasisGates;
    use mitex_ir::QubitId;

    #[test]
    fn test_trivial_layout() {
        let mut circuit = Circuit::new("c", 3);
        let mut props = PropertySet::new().with_target(CouplingMap::linear(5), BasisGates::iqm());
        TrivialLayout.run(&mut circuit, &mut props).unwrap();
        let layout = props.layout.unwrap();
        assert_eq!(layout.physical_qubits(3), Some(vec![0, 1, 2]));
    }

    #[test]
    fn test_layout_too_large() {
        let mut circuit = Circuit::new("c", 6);
        let mut props = PropertySet::new().with_target(CouplingMap::linear(5), BasisGates::iqm());
        let err = TrivialLayout.run(&mut circuit, &mut props).unwrap_err();
        assert!(matches!(err, CompileError::CircuitTooLarge { required: 6, available: 5 }));

        let err = DenseLayout.run(&mut circuit, &mut props).unwrap_err();
        assert!(matches!(err, CompileError::CircuitTooLarge { .. }));
    }

    #[test]
    fn test_dense_keeps_native_trivial() {
        let mut circuit = Circuit::bell().unwrap();
        let mut props = PropertySet::new().with_target(CouplingMap::linear(5), BasisGates::ibm_cx());
        DenseLayout.run(&mut circuit, &mut props).unwrap();
        assert_eq!(props.layout.unwrap().physical_qubits(2), Some(vec![0, 1]));
    }

    #[test]
    fn test_dense_prefers_hub() {
        // 0 and 2 are not coupled on a star, so the trivial layout is rejected
        // and the hub-centred region wins.
        let mut circuit = Circuit::new("c", 3);
        circuit.cz(QubitId(0), QubitId(1)).unwrap();
        circuit.cz(QubitId(1), QubitId(2)).unwrap();
        let mut props = PropertySet::new().with_target(CouplingMap::star(5), BasisGates::iqm());
        DenseLayout.run(&mut circuit, &mut props).unwrap();
        let physical = props.layout.unwrap().physical_qubits(3).unwrap();
        assert_eq!(physical[0], 0);
    }
}
