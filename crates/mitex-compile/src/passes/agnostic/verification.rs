//! Post-mapping verification.

use tracing::debug;

use mitex_ir::{Circuit, InstructionKind};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

/// Checks that the output is executable on the target: every gate is native
/// and every two-qubit gate sits on a coupler.
pub struct CheckMapping;

impl Pass for CheckMapping {
    fn name(&self) -> &'static str {
        "CheckMapping"
    }

    fn kind(&self) -> PassKind {
        PassKind::Analysis
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        for inst in circuit.instructions() {
            let InstructionKind::Gate(gate) = &inst.kind else {
                continue;
            };
            if let Some(basis) = &properties.basis_gates {
                if !basis.contains(gate.name()) {
                    return Err(CompileError::GateNotInBasis {
                        gate: gate.name().to_string(),
                        basis: basis.to_string(),
                    });
                }
            }
            if let (Some(map), true) = (&properties.coupling_map, inst.qubits.len() == 2) {
                let (a, b) = (inst.qubits[0].0, inst.qubits[1].0);
                if !map.is_adjacent(a, b) {
                    return Err(CompileError::ConnectivityViolation {
                        gate: gate.name().to_string(),
                        qubit1: a,
                        qubit2: b,
                    });
                }
            }
        }
        debug!("CheckMapping: {} instructions verified", circuit.instructions().len());
        Ok(())
    }
}
