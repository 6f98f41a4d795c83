//! Basis translation: rewrite every gate into the target's native alphabet.
//!
//! Rules are listed in program (time) order and hold up to global phase.
//!
//! | Gate | IBM (`rz`, `sx`, `x`) | IQM (`prx`) |
//! |------|-----------------------|-------------|
//! | `h` | `rz(π/2) sx rz(π/2)` | `ry(π/2) rx(π)` |
//! | `rx(θ)` | `rz(π/2) sx rz(θ+π) sx rz(π/2)` | `prx(θ, 0)` |
//! | `ry(θ)` | `sx rz(θ+π) sx rz(π)` | `prx(θ, π/2)` |
//! | `rz(θ)` | native | `prx(π, 0) prx(π, θ/2)` |
//!
//! Two-qubit gates are reduced to whichever of `cx`/`cz` the target offers.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use tracing::debug;

use mitex_ir::{Circuit, Instruction, InstructionKind, ParameterExpression, QubitId, StandardGate};

use crate::error::{CompileError, CompileResult};
use crate::pass::{Pass, PassKind};
use crate::property::{BasisGates, PropertySet};

const MAX_DEPTH: usize = 8;

/// Single-qubit strategy implied by the alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    /// `rz` + `sx` (+ `x`).
    Ibm,
    /// `prx`.
    Iqm,
    /// Anything else: only gate-level rewrites that land in the alphabet.
    Generic,
}

impl Family {
    fn of(basis: &BasisGates) -> Self {
        if basis.contains("rz") && basis.contains("sx") {
            Family::Ibm
        } else if basis.contains("prx") {
            Family::Iqm
        } else {
            Family::Generic
        }
    }
}

/// Decompose gates outside the target alphabet.
pub struct BasisTranslation;

impl BasisTranslation {
    fn translate(
        gate: &StandardGate,
        qubits: &[QubitId],
        basis: &BasisGates,
        family: Family,
        depth: usize,
        out: &mut Vec<Instruction>,
    ) -> CompileResult<()> {
        if basis.contains(gate.name()) {
            out.push(Instruction::gate(gate.clone(), qubits.iter().copied()));
            return Ok(());
        }
        let unsupported = || CompileError::GateNotInBasis {
            gate: gate.name().to_string(),
            basis: basis.to_string(),
        };
        if depth >= MAX_DEPTH {
            return Err(unsupported());
        }

        let steps = if gate.num_qubits() == 1 {
            Self::rewrite_1q(gate, family, basis)
        } else {
            Self::rewrite_2q(gate, basis)
        }
        .ok_or_else(unsupported)?;

        for (g, operands) in steps {
            let operands: Vec<QubitId> = match operands {
                Operands::Same => qubits.to_vec(),
                Operands::Pick(idx) => idx.iter().map(|&i| qubits[i]).collect(),
            };
            Self::translate(&g, &operands, basis, family, depth + 1, out)?;
        }
        Ok(())
    }

    fn rewrite_1q(
        gate: &StandardGate,
        family: Family,
        basis: &BasisGates,
    ) -> Option<Vec<(StandardGate, Operands)>> {
        use StandardGate as G;
        let c = ParameterExpression::constant;
        let pi = ParameterExpression::pi;
        let seq = |gates: Vec<StandardGate>| -> Option<Vec<(StandardGate, Operands)>> {
            Some(gates.into_iter().map(|g| (g, Operands::Same)).collect())
        };

        match (gate, family) {
            (G::I, _) => Some(vec![]),
            (G::Z, _) => seq(vec![G::Rz(pi())]),
            (G::S, _) => seq(vec![G::Rz(c(FRAC_PI_2))]),
            (G::Sdg, _) => seq(vec![G::Rz(c(-FRAC_PI_2))]),
            (G::T, _) => seq(vec![G::Rz(c(FRAC_PI_4))]),
            (G::Tdg, _) => seq(vec![G::Rz(c(-FRAC_PI_4))]),
            (G::P(l), _) => seq(vec![G::Rz(l.clone())]),
            (G::U(theta, phi, lambda), _) => seq(vec![
                G::Rz(lambda.clone()),
                G::Ry(theta.clone()),
                G::Rz(phi.clone()),
            ]),
            (G::PRX(theta, phi), _) => seq(vec![
                G::Rz(-phi.clone()),
                G::Rx(theta.clone()),
                G::Rz(phi.clone()),
            ]),

            (G::X, Family::Iqm) => seq(vec![G::PRX(pi(), c(0.0))]),
            (G::X, _) if basis.contains("rx") => seq(vec![G::Rx(pi())]),
            (G::Y, Family::Ibm) => seq(vec![G::Rz(pi()), G::X]),
            (G::Y, _) => seq(vec![G::Ry(pi())]),
            (G::H, Family::Ibm) => seq(vec![G::Rz(c(FRAC_PI_2)), G::SX, G::Rz(c(FRAC_PI_2))]),
            (G::H, _) => seq(vec![G::Ry(c(FRAC_PI_2)), G::Rx(pi())]),
            (G::SX, _) => seq(vec![G::Rx(c(FRAC_PI_2))]),
            (G::SXdg, Family::Ibm) => seq(vec![G::Rz(pi()), G::SX, G::Rz(pi())]),
            (G::SXdg, _) => seq(vec![G::Rx(c(-FRAC_PI_2))]),

            (G::Rx(theta), Family::Iqm) => seq(vec![G::PRX(theta.clone(), c(0.0))]),
            (G::Ry(theta), Family::Iqm) => seq(vec![G::PRX(theta.clone(), c(FRAC_PI_2))]),
            (G::Rz(theta), Family::Iqm) => {
                seq(vec![G::PRX(pi(), c(0.0)), G::PRX(pi(), theta.half())])
            }
            (G::Rx(theta), Family::Ibm) => seq(vec![
                G::Rz(c(FRAC_PI_2)),
                G::SX,
                G::Rz(theta.clone() + pi()),
                G::SX,
                G::Rz(c(FRAC_PI_2)),
            ]),
            (G::Ry(theta), Family::Ibm) => seq(vec![
                G::SX,
                G::Rz(theta.clone() + pi()),
                G::SX,
                G::Rz(c(PI)),
            ]),
            _ => None,
        }
    }

    fn rewrite_2q(gate: &StandardGate, basis: &BasisGates) -> Option<Vec<(StandardGate, Operands)>> {
        use StandardGate as G;
        let c = ParameterExpression::constant;
        let (a, b) = (Operands::Pick(vec![0]), Operands::Pick(vec![1]));
        let ab = || Operands::Pick(vec![0, 1]);
        let ba = || Operands::Pick(vec![1, 0]);

        let steps = match gate {
            G::CX if basis.contains("cz") => {
                vec![(G::H, b.clone()), (G::CZ, ab()), (G::H, b)]
            }
            G::CZ if basis.contains("cx") => {
                vec![(G::H, b.clone()), (G::CX, ab()), (G::H, b)]
            }
            G::CX | G::CZ => return None,
            G::Swap => vec![(G::CX, ab()), (G::CX, ba()), (G::CX, ab())],
            G::CY => vec![(G::Sdg, b.clone()), (G::CX, ab()), (G::S, b)],
            G::RZZ(theta) => vec![(G::CX, ab()), (G::Rz(theta.clone()), b), (G::CX, ab())],
            G::RXX(theta) => vec![
                (G::H, a.clone()),
                (G::H, b.clone()),
                (G::RZZ(theta.clone()), ab()),
                (G::H, a),
                (G::H, b),
            ],
            G::RYY(theta) => vec![
                (G::Rx(c(FRAC_PI_2)), a.clone()),
                (G::Rx(c(FRAC_PI_2)), b.clone()),
                (G::RZZ(theta.clone()), ab()),
                (G::Rx(c(-FRAC_PI_2)), a),
                (G::Rx(c(-FRAC_PI_2)), b),
            ],
            G::CRz(theta) => vec![
                (G::Rz(theta.half()), b.clone()),
                (G::CX, ab()),
                (G::Rz(-theta.half()), b.clone()),
                (G::CX, ab()),
            ],
            G::CRy(theta) => vec![
                (G::Ry(theta.half()), b.clone()),
                (G::CX, ab()),
                (G::Ry(-theta.half()), b.clone()),
                (G::CX, ab()),
            ],
            G::CP(lambda) => vec![
                (G::P(lambda.half()), a),
                (G::CX, ab()),
                (G::P(-lambda.half()), b.clone()),
                (G::CX, ab()),
                (G::P(lambda.half()), b),
            ],
            _ => return None,
        };
        Some(steps)
    }
}

/// Which operands of the parent gate a rewritten gate acts on.
#[derive(Debug, Clone)]
enum Operands {
    Same,
    Pick(Vec<usize>),
}

impl Pass for BasisTranslation {
    fn name(&self) -> &'static str {
        "BasisTranslation"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        let basis = properties
            .basis_gates
            .as_ref()
            .ok_or(CompileError::MissingBasisGates)?;
        let family = Family::of(basis);

        let mut out = Vec::with_capacity(circuit.instructions().len());
        for inst in circuit.instructions() {
            match &inst.kind {
                InstructionKind::Gate(g) => {
                    Self::translate(g, &inst.qubits, basis, family, 0, &mut out)?;
                }
                _ => out.push(inst.clone()),
            }
        }
        debug!(
            "BasisTranslation ({:?}): {} -> {} instructions",
            family,
            circuit.instructions().len(),
            out.len()
        );
        circuit.set_instructions(out)?;
        Ok(())
    }

    fn should_run(&self, _circuit: &Circuit, properties: &PropertySet) -> bool {
        properties.basis_gates.is_some()
    }
}
