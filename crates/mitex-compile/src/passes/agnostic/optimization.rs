//! Peephole cleanup that never changes the implemented operation.

use tracing::debug;

use mitex_ir::{Circuit, Instruction, InstructionKind, StandardGate};

use crate::error::CompileResult;
use crate::pass::{Pass, PassKind};
use crate::property::PropertySet;

const ZERO_TOL: f64 = 1e-12;

/// Per-qubit stacks of indices into a working instruction list, so that the
/// instruction most recently touching a qubit can be found and removed.
struct Frontier {
    out: Vec<Option<Instruction>>,
    stacks: Vec<Vec<usize>>,
}

impl Frontier {
    fn new(num_qubits: u32) -> Self {
        Self {
            out: Vec::new(),
            stacks: vec![Vec::new(); num_qubits as usize],
        }
    }

    /// Index of the instruction last touching every qubit of `inst`, if it is
    /// the same instruction for all of them and acts on exactly those qubits.
    fn shared_predecessor(&self, inst: &Instruction) -> Option<usize> {
        let mut idx = None;
        for q in &inst.qubits {
            let top = *self.stacks[q.index()].last()?;
            match idx {
                None => idx = Some(top),
                Some(i) if i == top => {}
                Some(_) => return None,
            }
        }
        let i = idx?;
        let prev = self.out[i].as_ref()?;
        (prev.qubits.len() == inst.qubits.len()).then_some(i)
    }

    fn push(&mut self, inst: Instruction) {
        let i = self.out.len();
        for q in &inst.qubits {
            self.stacks[q.index()].push(i);
        }
        self.out.push(Some(inst));
    }

    fn remove(&mut self, i: usize) {
        if let Some(inst) = self.out[i].take() {
            for q in &inst.qubits {
                self.stacks[q.index()].pop();
            }
        }
    }

    fn finish(self) -> Vec<Instruction> {
        self.out.into_iter().flatten().collect()
    }
}

/// Removes adjacent gate pairs whose product is the identity: `h h`, `cx cx`
/// on the same operands, `s sdg`, `sx sxdg` and so on.
pub struct CancelAdjacent;

impl CancelAdjacent {
    fn same_operands(a: &Instruction, b: &Instruction, gate: &StandardGate) -> bool {
        if a.qubits == b.qubits {
            return true;
        }
        gate.is_symmetric() && a.qubits.len() == 2 && a.qubits[0] == b.qubits[1] && a.qubits[1] == b.qubits[0]
    }
}

impl Pass for CancelAdjacent {
    fn name(&self) -> &'static str {
        "CancelAdjacent"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, _properties: &mut PropertySet) -> CompileResult<()> {
        let before = circuit.instructions().len();
        let mut frontier = Frontier::new(circuit.num_qubits());

        for inst in circuit.instructions() {
            if let InstructionKind::Gate(gate) = &inst.kind {
                if let Some(i) = frontier.shared_predecessor(inst) {
                    let cancels = frontier.out[i].as_ref().is_some_and(|prev| {
                        prev.as_gate().is_some_and(|g| g.cancels_with(gate))
                            && Self::same_operands(prev, inst, gate)
                    });
                    if cancels {
                        frontier.remove(i);
                        continue;
                    }
                }
            }
            frontier.push(inst.clone());
        }

        let out = frontier.finish();
        debug!("CancelAdjacent removed {} gates", before - out.len());
        circuit.set_instructions(out)?;
        Ok(())
    }
}

/// Fuses consecutive rotations about the same axis on the same qubit and
/// drops rotations by a multiple of 2π.
pub struct MergeRotations;

impl MergeRotations {
    fn merge(a: &StandardGate, b: &StandardGate) -> Option<StandardGate> {
        use StandardGate as G;
        match (a, b) {
            (G::Rz(x), G::Rz(y)) => Some(G::Rz(x.clone() + y.clone())),
            (G::Rx(x), G::Rx(y)) => Some(G::Rx(x.clone() + y.clone())),
            (G::Ry(x), G::Ry(y)) => Some(G::Ry(x.clone() + y.clone())),
            (G::P(x), G::P(y)) => Some(G::P(x.clone() + y.clone())),
            _ => None,
        }
    }

    fn is_identity(gate: &StandardGate) -> bool {
        match gate {
            StandardGate::I => true,
            StandardGate::Rz(t) | StandardGate::Rx(t) | StandardGate::Ry(t) | StandardGate::P(t) => {
                t.is_zero_rotation(ZERO_TOL)
            }
            _ => false,
        }
    }
}

impl Pass for MergeRotations {
    fn name(&self) -> &'static str {
        "MergeRotations"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, _properties: &mut PropertySet) -> CompileResult<()> {
        let before = circuit.instructions().len();
        let mut frontier = Frontier::new(circuit.num_qubits());

        for inst in circuit.instructions() {
            let Some(gate) = inst.as_gate() else {
                frontier.push(inst.clone());
                continue;
            };
            if Self::is_identity(gate) {
                continue;
            }
            if gate.num_qubits() == 1 {
                if let Some(i) = frontier.shared_predecessor(inst) {
                    let merged = frontier.out[i]
                        .as_ref()
                        .and_then(Instruction::as_gate)
                        .and_then(|prev| Self::merge(prev, gate));
                    if let Some(merged) = merged {
                        frontier.remove(i);
                        if !Self::is_identity(&merged) {
                            frontier.push(Instruction::gate(merged, inst.qubits.iter().copied()));
                        }
                        continue;
                    }
                }
            }
            frontier.push(inst.clone());
        }

        let out = frontier.finish();
        debug!("MergeRotations removed {} gates", before - out.len());
        circuit.set_instructions(out)?;
        Ok(())
    }
}

/// Repeats a group of passes until the operation count stops shrinking.
pub struct FixedPoint {
    passes: Vec<Box<dyn Pass>>,
    max_rounds: usize,
}

impl FixedPoint {
    /// Iterate `passes` at most `max_rounds` times.
    pub fn new(passes: Vec<Box<dyn Pass>>, max_rounds: usize) -> Self {
        Self { passes, max_rounds }
    }
}

impl Pass for FixedPoint {
    fn name(&self) -> &'static str {
        "FixedPoint"
    }

    fn kind(&self) -> PassKind {
        PassKind::Transformation
    }

    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        for round in 0..self.max_rounds {
            let before = circuit.instructions().len();
            for pass in &self.passes {
                pass.run(circuit, properties)?;
            }
            if circuit.instructions().len() >= before {
                debug!("FixedPoint converged after {} rounds", round + 1);
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mitex_ir::{ParameterExpression, QubitId};

    fn run(pass: &dyn Pass, circuit: &mut Circuit) {
        pass.run(circuit, &mut PropertySet::new()).unwrap();
    }

    #[test]
    fn test_cancel_hh_and_cxcx() {
        let mut circuit = Circuit::new("c", 2);
        circuit.h(QubitId(0)).unwrap();
        circuit.h(QubitId(0)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.x(QubitId(1)).unwrap();
        run(&CancelAdjacent, &mut circuit);
        assert_eq!(circuit.num_ops(), 1);
        assert_eq!(circuit.instructions()[0].name(), "x");
    }

    #[test]
    fn test_cancel_nested() {
        // h x x h collapses completely once the inner pair is gone
        let mut circuit = Circuit::new("c", 1);
        circuit.h(QubitId(0)).unwrap();
        circuit.x(QubitId(0)).unwrap();
        circuit.x(QubitId(0)).unwrap();
        circuit.h(QubitId(0)).unwrap();
        run(&CancelAdjacent, &mut circuit);
        assert_eq!(circuit.num_ops(), 0);
    }

    #[test]
    fn test_blocked_by_intervening_gate() {
        let mut circuit = Circuit::new("c", 2);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.h(QubitId(1)).unwrap();
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        run(&CancelAdjacent, &mut circuit);
        assert_eq!(circuit.num_ops(), 3);
    }

    #[test]
    fn test_reversed_cx_not_cancelled() {
        let mut circuit = Circuit::new("c", 2);
        circuit.cx(QubitId(0), QubitId(1)).unwrap();
        circuit.cx(QubitId(1), QubitId(0)).unwrap();
        run(&CancelAdjacent, &mut circuit);
        assert_eq!(circuit.num_ops(), 2);

        let mut sym = Circuit::new("c", 2);
        sym.cz(QubitId(0), QubitId(1)).unwrap();
        sym.cz(QubitId(1), QubitId(0)).unwrap();
        run(&CancelAdjacent, &mut sym);
        assert_eq!(sym.num_ops(), 0);
    }

    #[test]
    fn test_barrier_blocks_cancellation() {
        let mut circuit = Circuit::new("c", 1);
        circuit.h(QubitId(0)).unwrap();
        circuit.barrier_all().unwrap();
        circuit.h(QubitId(0)).unwrap();
        run(&CancelAdjacent, &mut circuit);
        assert_eq!(circuit.num_ops(), 2);
    }

    #[test]
    fn test_merge_rz() {
        let mut circuit = Circuit::new("c", 1);
        circuit.rz(0.25, QubitId(0)).unwrap();
        circuit.rz(0.5, QubitId(0)).unwrap();
        circuit.sx(QubitId(0)).unwrap();
        run(&MergeRotations, &mut circuit);
        assert_eq!(circuit.num_ops(), 2);
        assert_eq!(
            circuit.instructions()[0].as_gate(),
            Some(&StandardGate::Rz(ParameterExpression::Constant(0.75)))
        );
    }

    #[test]
    fn test_merge_to_identity_drops() {
        let mut circuit = Circuit::new("c", 1);
        circuit.rz(1.0, QubitId(0)).unwrap();
        circuit.rz(-1.0, QubitId(0)).unwrap();
        circuit.rx(0.0, QubitId(0)).unwrap();
        run(&MergeRotations, &mut circuit);
        assert_eq!(circuit.num_ops(), 0);
    }

    #[test]
    fn test_merge_symbolic() {
        let mut circuit = Circuit::new("c", 1);
        let a = circuit.add_parameter("a").unwrap();
        circuit.rz(a, QubitId(0)).unwrap();
        circuit.rz(0.5, QubitId(0)).unwrap();
        run(&MergeRotations, &mut circuit);
        assert_eq!(circuit.num_ops(), 1);
        assert!(circuit.is_parameterized());
    }

    #[test]
    fn test_fixed_point() {
        // rz(0.5) h h rz(-0.5): cancel then merge then nothing left
        let mut circuit = Circuit::new("c", 1);
        circuit.rz(0.5, QubitId(0)).unwrap();
        circuit.h(QubitId(0)).unwrap();
        circuit.h(QubitId(0)).unwrap();
        circuit.rz(-0.5, QubitId(0)).unwrap();
        let pass = FixedPoint::new(vec![Box::new(CancelAdjacent), Box::new(MergeRotations)], 8);
        run(&pass, &mut circuit);
        assert_eq!(circuit.num_ops(), 0);
    }
}
