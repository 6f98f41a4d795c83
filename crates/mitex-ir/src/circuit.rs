//! Circuit: an ordered instruction list over a fixed qubit register.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{IrError, IrResult};
use crate::gate::StandardGate;
use crate::instruction::{Instruction, InstructionKind};
use crate::parameter::{ParameterExpression, ParameterVector};
use crate::qubit::QubitId;

/// A quantum circuit.
///
/// Every instruction is validated on insertion: operands must lie in
/// `[0, num_qubits)`, must not repeat, must match the gate's arity, and every
/// symbol a gate mentions must have been declared with
/// [`Circuit::add_parameter`]. Binding never mutates the template; it returns
/// a new circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    name: String,
    num_qubits: u32,
    parameters: Vec<String>,
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Empty circuit over `num_qubits` qubits.
    pub fn new(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            parameters: Vec::new(),
            instructions: Vec::new(),
        }
    }

    /// Empty circuit that shares `other`'s name and parameter declarations
    /// but lives on a register of `num_qubits`.
    pub fn like(other: &Circuit, num_qubits: u32) -> Self {
        Self {
            name: other.name.clone(),
            num_qubits,
            parameters: other.parameters.clone(),
            instructions: Vec::new(),
        }
    }

    /// Declare a free parameter and return its symbol.
    pub fn add_parameter(&mut self, name: impl Into<String>) -> IrResult<ParameterExpression> {
        let name = name.into();
        if self.parameters.contains(&name) {
            return Err(IrError::DuplicateParameter(name));
        }
        self.parameters.push(name.clone());
        Ok(ParameterExpression::Symbol(name))
    }

    /// Append a validated instruction.
    pub fn push(&mut self, instruction: Instruction) -> IrResult<&mut Self> {
        self.check(&instruction)?;
        self.instructions.push(instruction);
        Ok(self)
    }

    /// Append a gate.
    pub fn gate(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> IrResult<&mut Self> {
        self.push(Instruction::gate(gate, qubits))
    }

    /// Hadamard.
    pub fn h(&mut self, q: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::H, [q])
    }

    /// Pauli-X.
    pub fn x(&mut self, q: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::X, [q])
    }

    /// sqrt(X).
    pub fn sx(&mut self, q: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::SX, [q])
    }

    /// X rotation.
    pub fn rx(&mut self, theta: impl Into<ParameterExpression>, q: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Rx(theta.into()), [q])
    }

    /// Y rotation.
    pub fn ry(&mut self, theta: impl Into<ParameterExpression>, q: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Ry(theta.into()), [q])
    }

    /// Z rotation.
    pub fn rz(&mut self, theta: impl Into<ParameterExpression>, q: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Rz(theta.into()), [q])
    }

    /// Phased RX.
    pub fn prx(
        &mut self,
        theta: impl Into<ParameterExpression>,
        phi: impl Into<ParameterExpression>,
        q: QubitId,
    ) -> IrResult<&mut Self> {
        self.gate(StandardGate::PRX(theta.into(), phi.into()), [q])
    }

    /// CNOT.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CX, [control, target])
    }

    /// Controlled-Z.
    pub fn cz(&mut self, a: QubitId, b: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::CZ, [a, b])
    }

    /// SWAP.
    pub fn swap(&mut self, a: QubitId, b: QubitId) -> IrResult<&mut Self> {
        self.gate(StandardGate::Swap, [a, b])
    }

    /// Barrier across every qubit.
    pub fn barrier_all(&mut self) -> IrResult<&mut Self> {
        self.push(Instruction::barrier((0..self.num_qubits).map(QubitId)))
    }

    /// Barrier then a measurement on every qubit.
    pub fn measure_all(&mut self) -> IrResult<&mut Self> {
        self.barrier_all()?;
        for q in 0..self.num_qubits {
            self.push(Instruction::measure(QubitId(q)))?;
        }
        Ok(self)
    }

    /// Circuit name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register width.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Declared parameter names, in binding order.
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Number of declared parameters.
    pub fn num_parameters(&self) -> usize {
        self.parameters.len()
    }

    /// Instructions, in program order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Consume into the instruction list.
    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    /// Replace the instruction list, validating every entry. On error the
    /// circuit is left unchanged.
    pub fn set_instructions(&mut self, instructions: Vec<Instruction>) -> IrResult<()> {
        for inst in &instructions {
            self.check(inst)?;
        }
        self.instructions = instructions;
        Ok(())
    }

    /// Number of non-barrier operations.
    pub fn num_ops(&self) -> usize {
        self.instructions.iter().filter(|i| !i.is_barrier()).count()
    }

    /// Histogram of operation names (barriers excluded).
    pub fn count_ops(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for inst in self.instructions.iter().filter(|i| !i.is_barrier()) {
            *counts.entry(inst.name().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of two-qubit gates.
    pub fn num_two_qubit_gates(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_two_qubit_gate()).count()
    }

    /// Whether the circuit contains measurements.
    pub fn has_measurements(&self) -> bool {
        self.instructions.iter().any(Instruction::is_measure)
    }

    /// Whether any gate still carries a symbolic angle.
    pub fn is_parameterized(&self) -> bool {
        self.instructions
            .iter()
            .filter_map(Instruction::as_gate)
            .any(StandardGate::is_parameterized)
    }

    /// Longest chain of operations over any qubit. Barriers align their
    /// operands but add no layer.
    pub fn depth(&self) -> usize {
        let mut level = vec![0usize; self.num_qubits as usize];
        for inst in &self.instructions {
            let start = inst.qubits.iter().map(|q| level[q.index()]).max().unwrap_or(0);
            let next = if inst.is_barrier() { start } else { start + 1 };
            for q in &inst.qubits {
                level[q.index()] = next;
            }
        }
        level.into_iter().max().unwrap_or(0)
    }

    /// New circuit with every declared parameter replaced by the value at the
    /// same position in `values`. The result declares no parameters.
    pub fn bind(&self, values: &ParameterVector) -> IrResult<Circuit> {
        if values.len() != self.parameters.len() {
            return Err(IrError::ParameterCountMismatch {
                expected: self.parameters.len(),
                got: values.len(),
            });
        }
        let mut table = FxHashMap::default();
        for (name, value) in self.parameters.iter().zip(values.iter()) {
            if !value.is_finite() {
                return Err(IrError::NonFiniteParameter {
                    name: name.clone(),
                    value,
                });
            }
            table.insert(name.clone(), value);
        }

        let instructions = self
            .instructions
            .iter()
            .map(|inst| match &inst.kind {
                InstructionKind::Gate(g) => Instruction {
                    kind: InstructionKind::Gate(g.map_parameters(|p| p.substitute(&table))),
                    qubits: inst.qubits.clone(),
                },
                _ => inst.clone(),
            })
            .collect();

        Ok(Circuit {
            name: self.name.clone(),
            num_qubits: self.num_qubits,
            parameters: Vec::new(),
            instructions,
        })
    }

    fn check(&self, inst: &Instruction) -> IrResult<()> {
        let name = inst.name();
        if let InstructionKind::Gate(g) = &inst.kind {
            let got = inst.qubits.len() as u32;
            if got != g.num_qubits() {
                return Err(IrError::QubitCountMismatch {
                    gate: name.to_string(),
                    expected: g.num_qubits(),
                    got,
                });
            }
            let mut missing = None;
            for p in g.parameters() {
                p.visit_symbols(&mut |sym| {
                    if missing.is_none() && !self.parameters.iter().any(|d| d == sym) {
                        missing = Some(sym.to_string());
                    }
                });
            }
            if let Some(sym) = missing {
                return Err(IrError::UndeclaredParameter {
                    name: sym,
                    gate: name.to_string(),
                });
            }
        }

        let mut seen = FxHashSet::default();
        for &q in &inst.qubits {
            if q.0 >= self.num_qubits {
                return Err(IrError::QubitOutOfRange {
                    qubit: q,
                    num_qubits: self.num_qubits,
                    gate: name.to_string(),
                });
            }
            if !seen.insert(q) {
                return Err(IrError::DuplicateQubit {
                    qubit: q,
                    gate: name.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Two-qubit Bell-state preparation, `H(0)` then `CX(0, 1)`.
    pub fn bell() -> IrResult<Self> {
        let mut circuit = Self::new("bell", 2);
        circuit.h(QubitId(0))?.cx(QubitId(0), QubitId(1))?;
        Ok(circuit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_bell() {
        let circuit = Circuit::bell().unwrap();
        assert_eq!(circuit.num_qubits(), 2);
        assert_eq!(circuit.num_ops(), 2);
        assert_eq!(circuit.depth(), 2);
        assert_eq!(circuit.num_two_qubit_gates(), 1);
        assert!(!circuit.has_measurements());
    }

    #[test]
    fn test_measure_all() {
        let mut circuit = Circuit::bell().unwrap();
        circuit.measure_all().unwrap();
        assert!(circuit.has_measurements());
        assert_eq!(circuit.count_ops().get("measure"), Some(&2));
        assert_eq!(circuit.depth(), 3);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let mut circuit = Circuit::new("c", 2);
        let err = circuit.cx(QubitId(0), QubitId(2)).unwrap_err();
        assert!(matches!(err, IrError::QubitOutOfRange { qubit: QubitId(2), .. }));
        assert!(circuit.instructions().is_empty());
    }

    #[test]
    fn test_rejects_duplicate_operand() {
        let mut circuit = Circuit::new("c", 2);
        let err = circuit.cz(QubitId(1), QubitId(1)).unwrap_err();
        assert!(matches!(err, IrError::DuplicateQubit { .. }));
    }

    #[test]
    fn test_rejects_arity_mismatch() {
        let mut circuit = Circuit::new("c", 3);
        let err = circuit
            .gate(StandardGate::CX, [QubitId(0), QubitId(1), QubitId(2)])
            .unwrap_err();
        assert!(matches!(err, IrError::QubitCountMismatch { expected: 2, got: 3, .. }));
    }

    #[test]
    fn test_rejects_undeclared_parameter() {
        let mut circuit = Circuit::new("c", 1);
        let err = circuit.rx("theta", QubitId(0)).unwrap_err();
        assert!(matches!(err, IrError::UndeclaredParameter { .. }));

        let theta = circuit.add_parameter("theta").unwrap();
        circuit.rx(theta, QubitId(0)).unwrap();
        assert!(circuit.is_parameterized());
        assert!(matches!(
            circuit.add_parameter("theta"),
            Err(IrError::DuplicateParameter(_))
        ));
    }

    #[test]
    fn test_bind_returns_new_circuit() {
        let mut circuit = Circuit::new("c", 2);
        let a = circuit.add_parameter("a").unwrap();
        let b = circuit.add_parameter("b").unwrap();
        circuit.ry(a, QubitId(0)).unwrap();
        circuit.rz(b + ParameterExpression::pi(), QubitId(1)).unwrap();

        let bound = circuit.bind(&vec![0.25, -0.5].into()).unwrap();
        assert!(!bound.is_parameterized());
        assert_eq!(bound.num_parameters(), 0);
        assert_eq!(
            bound.instructions()[1].as_gate(),
            Some(&StandardGate::Rz(ParameterExpression::Constant(-0.5 + PI)))
        );
        // template untouched
        assert!(circuit.is_parameterized());
        assert_eq!(circuit.num_parameters(), 2);
    }

    #[test]
    fn test_bind_length_mismatch() {
        let mut circuit = Circuit::new("c", 1);
        circuit.add_parameter("a").unwrap();
        let err = circuit.bind(&ParameterVector::empty()).unwrap_err();
        assert!(matches!(err, IrError::ParameterCountMismatch { expected: 1, got: 0 }));
    }

    #[test]
    fn test_bind_rejects_nan() {
        let mut circuit = Circuit::new("c", 1);
        circuit.add_parameter("a").unwrap();
        let err = circuit.bind(&vec![f64::NAN].into()).unwrap_err();
        assert!(matches!(err, IrError::NonFiniteParameter { .. }));
    }
}
