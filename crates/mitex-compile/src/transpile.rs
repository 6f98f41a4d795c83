//! One-call mapping of a circuit onto a target.

use tracing::{info, instrument};

use mitex_ir::Circuit;

use crate::error::{CompileError, CompileResult};
use crate::manager::PassManagerBuilder;
use crate::passes::RoutingStats;
use crate::property::{BasisGates, CouplingMap, Layout};

/// Output of [`transpile`].
#[derive(Debug, Clone)]
pub struct Transpiled {
    /// Native circuit on the device register.
    pub circuit: Circuit,
    /// Physical qubit of each logical qubit before the first gate.
    pub initial_layout: Vec<u32>,
    /// Physical qubit of each logical qubit after the last gate.
    pub final_layout: Vec<u32>,
    /// SWAPs inserted by routing.
    pub swaps_inserted: usize,
}

/// Map `circuit` onto `coupling_map` and `basis_gates` at the given
/// optimization level.
///
/// ```
/// use mitex_compile::{transpile, BasisGates, CouplingMap};
/// use mitex_ir::Circuit;
///
/// let bell = Circuit::bell().unwrap();
/// let out = transpile(&bell, CouplingMap::linear(5), BasisGates::ibm_cx(), 1).unwrap();
/// assert_eq!(out.circuit.num_qubits(), 5);
/// assert_eq!(out.final_layout, vec![0, 1]);
/// ```
#[instrument(skip_all, fields(circuit = circuit.name(), level = optimization_level))]
pub fn transpile(
    circuit: &Circuit,
    coupling_map: CouplingMap,
    basis_gates: BasisGates,
    optimization_level: u8,
) -> CompileResult<Transpiled> {
    let num_logical = circuit.num_qubits();
    let (pm, mut props) = PassManagerBuilder::new()
        .with_optimization_level(optimization_level)?
        .with_target(coupling_map, basis_gates)
        .build();

    let mut out = circuit.clone();
    pm.run(&mut out, &mut props)?;

    let initial = props.layout.as_ref().ok_or(CompileError::MissingLayout)?;
    let final_layout = props.final_layout.as_ref().unwrap_or(initial);
    let swaps_inserted = props.get::<RoutingStats>().map_or(0, |s| s.swaps_inserted);

    let result = Transpiled {
        initial_layout: physical(initial, num_logical)?,
        final_layout: physical(final_layout, num_logical)?,
        swaps_inserted,
        circuit: out,
    };
    info!(
        "Transpiled {} -> {} ops, depth {}, {} swaps",
        circuit.num_ops(),
        result.circuit.num_ops(),
        result.circuit.depth(),
        swaps_inserted
    );
    Ok(result)
}

fn physical(layout: &Layout, num_logical: u32) -> CompileResult<Vec<u32>> {
    layout
        .physical_qubits(num_logical)
        .ok_or(CompileError::MissingLayout)
}
