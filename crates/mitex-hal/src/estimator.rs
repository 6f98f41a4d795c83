//! Estimation requests, mitigation options and results.

use std::fmt;

use mitex_ir::{Circuit, ParameterVector, SparseObservable};
use serde::{Deserialize, Serialize};

use crate::error::{HalError, HalResult};

/// One primitive unified bloc: a circuit, the observable to estimate and the
/// values for the circuit's free parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorPub {
    /// Circuit on the backend's physical register.
    pub circuit: Circuit,
    /// Observable on the same register.
    pub observable: SparseObservable,
    /// Values for the circuit's declared parameters, in declaration order.
    pub parameter_values: ParameterVector,
}

impl EstimatorPub {
    /// Bundle a request.
    pub fn new(
        circuit: Circuit,
        observable: SparseObservable,
        parameter_values: ParameterVector,
    ) -> Self {
        Self {
            circuit,
            observable,
            parameter_values,
        }
    }

    /// Structural checks that do not depend on a backend.
    pub fn validate(&self) -> HalResult<()> {
        if self.parameter_values.len() != self.circuit.num_parameters() {
            return Err(HalError::InvalidRequest(format!(
                "circuit '{}' declares {} parameters but {} values were given",
                self.circuit.name(),
                self.circuit.num_parameters(),
                self.parameter_values.len()
            )));
        }
        if self.observable.num_qubits() != self.circuit.num_qubits() {
            return Err(HalError::InvalidRequest(format!(
                "observable acts on {} qubits, circuit has {}",
                self.observable.num_qubits(),
                self.circuit.num_qubits()
            )));
        }
        if self.circuit.has_measurements() {
            return Err(HalError::InvalidRequest(
                "estimator circuits must not contain measurements".into(),
            ));
        }
        Ok(())
    }
}

/// Error-mitigation intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ResilienceLevel {
    /// No mitigation.
    None = 0,
    /// Readout mitigation and gate twirling.
    Moderate = 1,
    /// Zero-noise extrapolation on top of level 1.
    Full = 2,
}

impl ResilienceLevel {
    /// The numeric level.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ResilienceLevel {
    type Error = HalError;

    fn try_from(level: u8) -> HalResult<Self> {
        match level {
            0 => Ok(Self::None),
            1 => Ok(Self::Moderate),
            2 => Ok(Self::Full),
            other => Err(HalError::Configuration(format!(
                "resilience level must be 0, 1 or 2, got {other}"
            ))),
        }
    }
}

impl From<ResilienceLevel> for u8 {
    fn from(level: ResilienceLevel) -> u8 {
        level.as_u8()
    }
}

impl fmt::Display for ResilienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Pulse sequence inserted into idle windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DdSequence {
    /// Two X pulses.
    #[serde(rename = "XX")]
    Xx,
    /// X followed by -X.
    #[default]
    #[serde(rename = "XpXm")]
    XpXm,
    /// X, Y, X, Y.
    #[serde(rename = "XY4")]
    Xy4,
}

impl fmt::Display for DdSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DdSequence::Xx => write!(f, "XX"),
            DdSequence::XpXm => write!(f, "XpXm"),
            DdSequence::Xy4 => write!(f, "XY4"),
        }
    }
}

/// Dynamical decoupling settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicalDecoupling {
    /// Whether DD is applied.
    pub enable: bool,
    /// Sequence used when enabled.
    #[serde(default)]
    pub sequence_type: DdSequence,
}

impl Default for DynamicalDecoupling {
    fn default() -> Self {
        Self {
            enable: true,
            sequence_type: DdSequence::XpXm,
        }
    }
}

/// Options attached to one estimation job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimatorOptions {
    /// Mitigation intensity.
    pub resilience_level: ResilienceLevel,
    /// Target standard error.
    pub default_precision: f64,
    /// Idle-window decoupling.
    #[serde(default)]
    pub dynamical_decoupling: DynamicalDecoupling,
}

impl EstimatorOptions {
    /// Options with DD at its default.
    pub fn new(resilience_level: ResilienceLevel, default_precision: f64) -> Self {
        Self {
            resilience_level,
            default_precision,
            dynamical_decoupling: DynamicalDecoupling::default(),
        }
    }

    /// Replace the DD settings.
    pub fn with_dynamical_decoupling(mut self, dd: DynamicalDecoupling) -> Self {
        self.dynamical_decoupling = dd;
        self
    }

    /// Reject non-positive or non-finite precision.
    pub fn validate(&self) -> HalResult<()> {
        if !self.default_precision.is_finite() || self.default_precision <= 0.0 {
            return Err(HalError::Configuration(format!(
                "precision must be a positive number, got {}",
                self.default_precision
            )));
        }
        Ok(())
    }
}

/// Expectation value and standard error for one request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimatorResult {
    /// Estimated expectation value.
    pub evs: f64,
    /// Standard error of the estimate.
    pub stds: f64,
}

impl EstimatorResult {
    /// A result.
    pub fn new(evs: f64, stds: f64) -> Self {
        Self { evs, stds }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mitex_ir::Pauli;

    fn bell_pub() -> EstimatorPub {
        let circuit = Circuit::bell().unwrap();
        let observable = SparseObservable::single(Pauli::Z, 1, 1.0, 2).unwrap();
        EstimatorPub::new(circuit, observable, ParameterVector::empty())
    }

    #[test]
    fn test_resilience_level_serde() {
        let level: ResilienceLevel = serde_json::from_str("2").unwrap();
        assert_eq!(level, ResilienceLevel::Full);
        assert_eq!(serde_json::to_string(&ResilienceLevel::Moderate).unwrap(), "1");
        assert!(serde_json::from_str::<ResilienceLevel>("3").is_err());
    }

    #[test]
    fn test_dd_sequence_names() {
        let dd: DynamicalDecoupling =
            serde_json::from_str(r#"{"enable": true, "sequence_type": "XY4"}"#).unwrap();
        assert_eq!(dd.sequence_type, DdSequence::Xy4);
        assert_eq!(DdSequence::default().to_string(), "XpXm");
    }

    #[test]
    fn test_precision_must_be_positive() {
        assert!(EstimatorOptions::new(ResilienceLevel::None, 1e-2).validate().is_ok());
        assert!(EstimatorOptions::new(ResilienceLevel::None, 0.0).validate().is_err());
        assert!(EstimatorOptions::new(ResilienceLevel::None, f64::NAN).validate().is_err());
    }

    #[test]
    fn test_pub_validation() {
        assert!(bell_pub().validate().is_ok());

        let mut measured = bell_pub();
        measured.circuit.measure_all().unwrap();
        assert!(measured.validate().is_err());

        let mut extra = bell_pub();
        extra.parameter_values = ParameterVector::new(vec![0.1]);
        assert!(extra.validate().is_err());

        let mut narrow = bell_pub();
        narrow.observable = SparseObservable::single(Pauli::X, 0, 1.0, 1).unwrap();
        assert!(narrow.validate().is_err());
    }
}
