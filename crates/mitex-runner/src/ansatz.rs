//! Circuit and observable construction.
//!
//! [`CircuitModel`] builds a Pauli two-design ansatz together with the
//! single-term observable whose expectation value the experiment estimates:
//!
//! ```text
//! q0: ─RY(π/4)─R(θ0)─■───────R(θ3)─ ... ─R(θ..)─
//!                    │
//! q1: ─RY(π/4)─R(θ1)─■─■─────R(θ4)─ ... ─R(θ..)─
//!                      │
//! q2: ─RY(π/4)─R(θ2)───■─────R(θ5)─ ... ─R(θ..)─
//! ```
//!
//! Each `R` is RX, RY or RZ, picked by a seeded generator so the same seed
//! always yields the same circuit.

use std::f64::consts::FRAC_PI_4;

use mitex_ir::{Circuit, Pauli, QubitId, SparseObservable};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{RunError, RunResult};

/// Default seed for the rotation-gate choice.
pub const DEFAULT_ANSATZ_SEED: u64 = 5;

/// Builder for the ansatz circuit and its observable.
#[derive(Debug, Clone, PartialEq)]
pub struct CircuitModel {
    num_qubits: u32,
    depth: u32,
    ansatz_seed: u64,
    observable_qubit: Option<u32>,
    observable_pauli: Pauli,
    coefficient: f64,
    barriers: bool,
}

impl CircuitModel {
    /// Ansatz of `num_qubits` qubits and `depth` entangling repetitions.
    pub fn new(num_qubits: u32, depth: u32) -> Self {
        Self {
            num_qubits,
            depth,
            ansatz_seed: DEFAULT_ANSATZ_SEED,
            observable_qubit: None,
            observable_pauli: Pauli::Z,
            coefficient: 1.0,
            barriers: false,
        }
    }

    /// Seed for the rotation-gate choice.
    pub fn with_ansatz_seed(mut self, seed: u64) -> Self {
        self.ansatz_seed = seed;
        self
    }

    /// Qubit the observable acts on.
    pub fn with_observable_qubit(mut self, qubit: u32) -> Self {
        self.observable_qubit = Some(qubit);
        self
    }

    /// Pauli operator and coefficient of the observable.
    pub fn with_observable(mut self, pauli: Pauli, coefficient: f64) -> Self {
        self.observable_pauli = pauli;
        self.coefficient = coefficient;
        self
    }

    /// Separate layers with barriers.
    pub fn with_barriers(mut self, barriers: bool) -> Self {
        self.barriers = barriers;
        self
    }

    /// Number of free parameters [`build`](Self::build) will declare.
    pub fn num_parameters(&self) -> usize {
        self.num_qubits as usize * (self.depth as usize + 1)
    }

    /// The observable qubit after defaults: the second-to-last qubit, or 0 on
    /// a single-qubit register.
    pub fn observable_qubit(&self) -> u32 {
        self.observable_qubit
            .unwrap_or(if self.num_qubits >= 2 { self.num_qubits - 2 } else { 0 })
    }

    /// Build the circuit and observable.
    pub fn build(&self) -> RunResult<(Circuit, SparseObservable)> {
        if self.num_qubits < 1 {
            return Err(RunError::Configuration(
                "num_qubits must be at least 1".into(),
            ));
        }
        let target = self.observable_qubit();
        if target >= self.num_qubits {
            return Err(RunError::Configuration(format!(
                "observable qubit {target} is outside the {}-qubit register",
                self.num_qubits
            )));
        }
        if !self.coefficient.is_finite() {
            return Err(RunError::Configuration(format!(
                "observable coefficient must be finite, got {}",
                self.coefficient
            )));
        }

        let circuit = self.build_circuit().map_err(RunError::Circuit)?;
        let observable =
            SparseObservable::single(self.observable_pauli, target, self.coefficient, self.num_qubits)
                .map_err(RunError::Circuit)?;

        debug!(
            "Built ansatz: {} qubits, depth {}, {} parameters, observable {}",
            self.num_qubits,
            self.depth,
            circuit.num_parameters(),
            observable
        );
        Ok((circuit, observable))
    }

    fn build_circuit(&self) -> mitex_ir::IrResult<Circuit> {
        let n = self.num_qubits;
        let mut circuit = Circuit::new("PauliTwoDesign", n);
        let mut rng = StdRng::seed_from_u64(self.ansatz_seed);
        let mut next_param = 0usize;

        for q in 0..n {
            circuit.ry(FRAC_PI_4, QubitId(q))?;
        }
        self.separator(&mut circuit)?;

        for _ in 0..self.depth {
            self.rotation_layer(&mut circuit, &mut rng, &mut next_param)?;
            self.separator(&mut circuit)?;
            // Pairwise entanglement: even pairs, then odd pairs.
            for first in [0, 1] {
                for a in (first..n.saturating_sub(1)).step_by(2) {
                    circuit.cz(QubitId(a), QubitId(a + 1))?;
                }
            }
            self.separator(&mut circuit)?;
        }
        self.rotation_layer(&mut circuit, &mut rng, &mut next_param)?;

        Ok(circuit)
    }

    fn rotation_layer(
        &self,
        circuit: &mut Circuit,
        rng: &mut StdRng,
        next_param: &mut usize,
    ) -> mitex_ir::IrResult<()> {
        for q in 0..self.num_qubits {
            let theta = circuit.add_parameter(format!("θ[{next_param}]"))?;
            *next_param += 1;
            match rng.gen_range(0..3) {
                0 => circuit.rx(theta, QubitId(q))?,
                1 => circuit.ry(theta, QubitId(q))?,
                _ => circuit.rz(theta, QubitId(q))?,
            };
        }
        Ok(())
    }

    fn separator(&self, circuit: &mut Circuit) -> mitex_ir::IrResult<()> {
        if self.barriers {
            circuit.barrier_all()?;
        }
        Ok(())
    }
}

/// `build(num_qubits, depth)` with default seed and observable.
pub fn build(num_qubits: u32, depth: u32) -> RunResult<(Circuit, SparseObservable)> {
    CircuitModel::new(num_qubits, depth).build()
}

/// Two-qubit Bell circuit (H on 0, CX 0->1), optionally measured.
pub fn bell(measure: bool) -> RunResult<Circuit> {
    let mut circuit = Circuit::bell().map_err(RunError::Circuit)?;
    if measure {
        circuit.measure_all().map_err(RunError::Circuit)?;
    }
    Ok(circuit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_count() {
        let (circuit, _) = build(4, 3).unwrap();
        assert_eq!(circuit.num_parameters(), 16);
        assert_eq!(circuit.parameters()[0], "θ[0]");
        assert_eq!(circuit.parameters()[15], "θ[15]");
    }

    #[test]
    fn test_depth_zero_is_two_layers() {
        let (circuit, _) = build(3, 0).unwrap();
        assert_eq!(circuit.num_parameters(), 3);
        assert_eq!(circuit.num_two_qubit_gates(), 0);
        assert_eq!(circuit.depth(), 2);
    }

    #[test]
    fn test_each_layer_entangles_even_then_odd_pairs() {
        let (circuit, _) = build(5, 2).unwrap();
        let pairs: Vec<(u32, u32)> = circuit
            .instructions()
            .iter()
            .filter(|i| i.is_two_qubit_gate())
            .map(|i| (i.qubits[0].0, i.qubits[1].0))
            .collect();
        let layer = [(0, 1), (2, 3), (1, 2), (3, 4)];
        assert_eq!(pairs, [layer, layer].concat());
        assert_eq!(build(30, 4).unwrap().0.num_two_qubit_gates(), 4 * 29);
    }

    #[test]
    fn test_seed_controls_rotations() {
        let a = CircuitModel::new(6, 4).build().unwrap().0;
        let b = CircuitModel::new(6, 4).build().unwrap().0;
        assert_eq!(a, b);
        let c = CircuitModel::new(6, 4).with_ansatz_seed(6).build().unwrap().0;
        assert_eq!(a.num_parameters(), c.num_parameters());
    }

    #[test]
    fn test_default_observable_qubit() {
        let (_, obs) = build(5, 1).unwrap();
        assert_eq!(obs.support(), vec![QubitId(3)]);
        let (_, single) = build(1, 2).unwrap();
        assert_eq!(single.support(), vec![QubitId(0)]);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(build(0, 1), Err(RunError::Configuration(_))));
        let out_of_range = CircuitModel::new(3, 1).with_observable_qubit(3).build();
        assert!(matches!(out_of_range, Err(RunError::Configuration(_))));
    }

    #[test]
    fn test_barriers_do_not_add_ops() {
        let plain = CircuitModel::new(4, 2).build().unwrap().0;
        let fenced = CircuitModel::new(4, 2).with_barriers(true).build().unwrap().0;
        assert_eq!(plain.num_ops(), fenced.num_ops());
        assert!(fenced.instructions().iter().any(|i| i.is_barrier()));
    }

    #[test]
    fn test_bell() {
        let circuit = bell(false).unwrap();
        assert_eq!(circuit.count_ops().get("cx"), Some(&1));
        assert!(bell(true).unwrap().has_measurements());
    }
}
