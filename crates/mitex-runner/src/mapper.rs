//! Mapping of logical artifacts onto a device.

use mitex_compile::{BasisGates, CompileError, CouplingMap, MAX_OPTIMIZATION_LEVEL, transpile};
use mitex_hal::Capabilities;
use mitex_ir::{Circuit, QubitId, SparseObservable};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{RunError, RunResult};

/// A circuit and observable rewritten for one device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappedArtifact {
    /// Native circuit on the device register.
    pub circuit: Circuit,
    /// Observable relabeled through the final layout.
    pub observable: SparseObservable,
    /// Device name.
    pub backend: String,
    /// Optimization level used.
    pub optimization_level: u8,
    /// Physical qubit of each logical qubit before the first gate.
    pub initial_layout: Vec<u32>,
    /// Physical qubit of each logical qubit after the last gate.
    pub final_layout: Vec<u32>,
    /// SWAPs inserted by routing.
    pub swaps_inserted: usize,
}

/// Rewrites logical circuits for a device description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendMapper {
    optimization_level: u8,
}

impl BackendMapper {
    /// A mapper at `optimization_level` (0..=3).
    pub fn new(optimization_level: u8) -> RunResult<Self> {
        if optimization_level > MAX_OPTIMIZATION_LEVEL {
            return Err(RunError::Configuration(format!(
                "optimization level must be 0..={MAX_OPTIMIZATION_LEVEL}, got {optimization_level}"
            )));
        }
        Ok(Self { optimization_level })
    }

    /// The optimization level.
    pub fn optimization_level(&self) -> u8 {
        self.optimization_level
    }

    /// Map `circuit` and `observable` onto `capabilities`.
    #[instrument(skip_all, fields(backend = %capabilities.name, level = self.optimization_level))]
    pub fn map(
        &self,
        circuit: &Circuit,
        observable: &SparseObservable,
        capabilities: &Capabilities,
    ) -> RunResult<MappedArtifact> {
        let mapping_error = |source: CompileError| RunError::Mapping {
            backend: capabilities.name.clone(),
            source,
        };

        if observable.num_qubits() != circuit.num_qubits() {
            return Err(RunError::Configuration(format!(
                "observable acts on {} qubits, circuit '{}' has {}",
                observable.num_qubits(),
                circuit.name(),
                circuit.num_qubits()
            )));
        }

        let coupling = coupling_map(capabilities).map_err(mapping_error)?;
        let out = transpile(circuit, coupling, basis_gates(capabilities), self.optimization_level)
            .map_err(mapping_error)?;

        let layout: Vec<QubitId> = out.final_layout.iter().copied().map(QubitId).collect();
        let mapped_observable = observable
            .apply_layout(&layout, capabilities.num_qubits)
            .map_err(|e| mapping_error(CompileError::Ir(e)))?;

        info!(
            "Mapped '{}' onto {}: {} -> {} ops, {} swaps, final layout {:?}",
            circuit.name(),
            capabilities.name,
            circuit.num_ops(),
            out.circuit.num_ops(),
            out.swaps_inserted,
            out.final_layout
        );

        Ok(MappedArtifact {
            circuit: out.circuit,
            observable: mapped_observable,
            backend: capabilities.name.clone(),
            optimization_level: self.optimization_level,
            initial_layout: out.initial_layout,
            final_layout: out.final_layout,
            swaps_inserted: out.swaps_inserted,
        })
    }
}

/// Coupling graph of a device.
pub fn coupling_map(capabilities: &Capabilities) -> Result<CouplingMap, CompileError> {
    CouplingMap::from_edges(capabilities.num_qubits, &capabilities.topology.edges)
}

/// Native alphabet of a device, with measurement and barriers allowed.
pub fn basis_gates(capabilities: &Capabilities) -> BasisGates {
    let mut gates = capabilities.gate_set.native_gates();
    gates.extend(["measure".to_string(), "barrier".to_string()]);
    BasisGates::new(gates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mitex_hal::{DeviceCatalog, GateSet, Topology};
    use mitex_ir::Pauli;

    #[test]
    fn test_rejects_level_four() {
        assert!(matches!(BackendMapper::new(4), Err(RunError::Configuration(_))));
    }

    #[test]
    fn test_too_few_qubits() {
        let circuit = Circuit::new("wide", 6);
        let observable = SparseObservable::single(Pauli::Z, 0, 1.0, 6).unwrap();
        let caps = DeviceCatalog::builtin().describe("fake_iqm5").unwrap();
        let err = BackendMapper::new(1).unwrap().map(&circuit, &observable, &caps).unwrap_err();
        assert!(matches!(
            err,
            RunError::Mapping { source: CompileError::CircuitTooLarge { .. }, .. }
        ));
    }

    #[test]
    fn test_observable_follows_final_layout() {
        // Qubits 0 and 2 interact on a 3-qubit line, forcing one SWAP.
        let mut circuit = Circuit::new("hop", 3);
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(2)).unwrap();
        let observable = SparseObservable::single(Pauli::Z, 0, 1.0, 3).unwrap();
        let caps = Capabilities::ibm("line3", GateSet::ibm_cx(), Topology::linear(3));

        let mapped = BackendMapper::new(0).unwrap().map(&circuit, &observable, &caps).unwrap();
        assert_eq!(mapped.swaps_inserted, 1);
        let moved = mapped.final_layout[0];
        assert_ne!(moved, mapped.initial_layout[0]);
        assert_eq!(mapped.observable.support(), vec![QubitId(moved)]);
    }

    #[test]
    fn test_basis_gates_from_capabilities() {
        let caps = DeviceCatalog::builtin().describe("fake_iqm5").unwrap();
        let basis = basis_gates(&caps);
        assert!(basis.contains("prx") && basis.contains("cz") && basis.contains("barrier"));
        assert!(!basis.contains("cx"));
    }
}
