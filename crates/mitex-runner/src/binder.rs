//! Deterministic parameter values.

use std::f64::consts::FRAC_PI_2;

use mitex_ir::{Circuit, ParameterVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{RunError, RunResult};

/// Default half-width of the sampling interval.
pub const DEFAULT_PHI_MAX: f64 = FRAC_PI_2;

/// Default binding seed.
pub const DEFAULT_BINDING_SEED: u64 = 0;

/// Draws one value per free parameter, uniformly from `[-phi_max, phi_max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterBinder {
    phi_max: f64,
}

impl ParameterBinder {
    /// A binder for the interval `[-phi_max, phi_max]`.
    pub fn new(phi_max: f64) -> RunResult<Self> {
        if !phi_max.is_finite() || phi_max <= 0.0 {
            return Err(RunError::Configuration(format!(
                "phi_max must be a positive number, got {phi_max}"
            )));
        }
        Ok(Self { phi_max })
    }

    /// Half-width of the interval.
    pub fn phi_max(&self) -> f64 {
        self.phi_max
    }

    /// One sample per declared parameter of `circuit`, in declaration order.
    pub fn bind<R: Rng + ?Sized>(&self, circuit: &Circuit, rng: &mut R) -> ParameterVector {
        let values: ParameterVector = (0..circuit.num_parameters())
            .map(|_| rng.gen_range(-self.phi_max..=self.phi_max))
            .collect();
        debug!(
            "Bound {} parameters of '{}' in [-{}, {}]",
            values.len(),
            circuit.name(),
            self.phi_max,
            self.phi_max
        );
        values
    }

    /// [`bind`](Self::bind) with a fresh `StdRng` seeded from `seed`.
    pub fn bind_seeded(&self, circuit: &Circuit, seed: u64) -> ParameterVector {
        self.bind(circuit, &mut StdRng::seed_from_u64(seed))
    }
}

impl Default for ParameterBinder {
    fn default() -> Self {
        Self {
            phi_max: DEFAULT_PHI_MAX,
        }
    }
}

/// `bind(circuit, rng, phi_max)`.
pub fn bind<R: Rng + ?Sized>(
    circuit: &Circuit,
    rng: &mut R,
    phi_max: f64,
) -> RunResult<ParameterVector> {
    Ok(ParameterBinder::new(phi_max)?.bind(circuit, rng))
}

/// Apply `values` to `circuit`, producing a circuit with constant angles.
pub fn apply(circuit: &Circuit, values: &ParameterVector) -> RunResult<Circuit> {
    circuit.bind(values).map_err(|source| RunError::Binding {
        circuit: circuit.name().to_string(),
        source,
    })
}
