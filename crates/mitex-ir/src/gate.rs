//! Gate alphabet.

use serde::{Deserialize, Serialize};

use crate::parameter::ParameterExpression;

/// Gates understood by the IR and the mapper.
///
/// Covers the logical gates the ansatz and Bell builders emit plus the native
/// alphabets of the supported device families (`rz`/`sx`/`x`/`cx`/`cz` and
/// `prx`/`cz`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Identity.
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
    /// Hadamard.
    H,
    /// sqrt(Z).
    S,
    /// S-dagger.
    Sdg,
    /// fourth root of Z.
    T,
    /// T-dagger.
    Tdg,
    /// sqrt(X).
    SX,
    /// sqrt(X)-dagger.
    SXdg,
    /// X-axis rotation.
    Rx(ParameterExpression),
    /// Y-axis rotation.
    Ry(ParameterExpression),
    /// Z-axis rotation.
    Rz(ParameterExpression),
    /// Phase gate.
    P(ParameterExpression),
    /// U(θ, φ, λ).
    U(
        ParameterExpression,
        ParameterExpression,
        ParameterExpression,
    ),
    /// Phased RX: PRX(θ, φ) = RZ(φ)·RX(θ)·RZ(-φ).
    PRX(ParameterExpression, ParameterExpression),
    /// Controlled-X.
    CX,
    /// Controlled-Y.
    CY,
    /// Controlled-Z.
    CZ,
    /// SWAP.
    Swap,
    /// Controlled Y rotation.
    CRy(ParameterExpression),
    /// Controlled Z rotation.
    CRz(ParameterExpression),
    /// Controlled phase.
    CP(ParameterExpression),
    /// exp(-iθ/2 XX).
    RXX(ParameterExpression),
    /// exp(-iθ/2 YY).
    RYY(ParameterExpression),
    /// exp(-iθ/2 ZZ).
    RZZ(ParameterExpression),
}

impl StandardGate {
    /// Lower-case gate name, as used in basis-gate lists.
    pub fn name(&self) -> &'static str {
        match self {
            Self::I => "id",
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
            Self::H => "h",
            Self::S => "s",
            Self::Sdg => "sdg",
            Self::T => "t",
            Self::Tdg => "tdg",
            Self::SX => "sx",
            Self::SXdg => "sxdg",
            Self::Rx(_) => "rx",
            Self::Ry(_) => "ry",
            Self::Rz(_) => "rz",
            Self::P(_) => "p",
            Self::U(..) => "u",
            Self::PRX(..) => "prx",
            Self::CX => "cx",
            Self::CY => "cy",
            Self::CZ => "cz",
            Self::Swap => "swap",
            Self::CRy(_) => "cry",
            Self::CRz(_) => "crz",
            Self::CP(_) => "cp",
            Self::RXX(_) => "rxx",
            Self::RYY(_) => "ryy",
            Self::RZZ(_) => "rzz",
        }
    }

    /// Arity.
    pub fn num_qubits(&self) -> u32 {
        match self {
            Self::CX
            | Self::CY
            | Self::CZ
            | Self::Swap
            | Self::CRy(_)
            | Self::CRz(_)
            | Self::CP(_)
            | Self::RXX(_)
            | Self::RYY(_)
            | Self::RZZ(_) => 2,
            _ => 1,
        }
    }

    /// Angle operands, in declaration order.
    pub fn parameters(&self) -> Vec<&ParameterExpression> {
        match self {
            Self::Rx(p)
            | Self::Ry(p)
            | Self::Rz(p)
            | Self::P(p)
            | Self::CRy(p)
            | Self::CRz(p)
            | Self::CP(p)
            | Self::RXX(p)
            | Self::RYY(p)
            | Self::RZZ(p) => vec![p],
            Self::U(a, b, c) => vec![a, b, c],
            Self::PRX(a, b) => vec![a, b],
            _ => vec![],
        }
    }

    /// Whether any angle is still symbolic.
    pub fn is_parameterized(&self) -> bool {
        self.parameters().iter().any(|p| p.is_symbolic())
    }

    /// Rebuild the gate with every angle passed through `f`.
    pub fn map_parameters(&self, mut f: impl FnMut(&ParameterExpression) -> ParameterExpression) -> Self {
        match self {
            Self::Rx(p) => Self::Rx(f(p)),
            Self::Ry(p) => Self::Ry(f(p)),
            Self::Rz(p) => Self::Rz(f(p)),
            Self::P(p) => Self::P(f(p)),
            Self::CRy(p) => Self::CRy(f(p)),
            Self::CRz(p) => Self::CRz(f(p)),
            Self::CP(p) => Self::CP(f(p)),
            Self::RXX(p) => Self::RXX(f(p)),
            Self::RYY(p) => Self::RYY(f(p)),
            Self::RZZ(p) => Self::RZZ(f(p)),
            Self::U(a, b, c) => Self::U(f(a), f(b), f(c)),
            Self::PRX(a, b) => Self::PRX(f(a), f(b)),
            other => other.clone(),
        }
    }

    /// Whether `self` followed by `other` on the same operands is the
    /// identity. Only fixed (unparameterized) gates are considered.
    pub fn cancels_with(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::X, Self::X)
                | (Self::Y, Self::Y)
                | (Self::Z, Self::Z)
                | (Self::H, Self::H)
                | (Self::CX, Self::CX)
                | (Self::CY, Self::CY)
                | (Self::CZ, Self::CZ)
                | (Self::Swap, Self::Swap)
                | (Self::S, Self::Sdg)
                | (Self::Sdg, Self::S)
                | (Self::T, Self::Tdg)
                | (Self::Tdg, Self::T)
                | (Self::SX, Self::SXdg)
                | (Self::SXdg, Self::SX)
        )
    }

    /// Whether the two-qubit gate is symmetric in its operands.
    pub fn is_symmetric(&self) -> bool {
        matches!(
            self,
            Self::CZ | Self::Swap | Self::CP(_) | Self::RXX(_) | Self::RYY(_) | Self::RZZ(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_arity() {
        assert_eq!(StandardGate::H.name(), "h");
        assert_eq!(StandardGate::PRX(0.1.into(), 0.2.into()).name(), "prx");
        assert_eq!(StandardGate::CX.num_qubits(), 2);
        assert_eq!(StandardGate::Rz(0.3.into()).num_qubits(), 1);
        assert_eq!(StandardGate::RZZ("t".into()).num_qubits(), 2);
    }

    #[test]
    fn test_parameterized() {
        assert!(StandardGate::Ry("theta".into()).is_parameterized());
        assert!(!StandardGate::Ry(0.5.into()).is_parameterized());
        assert_eq!(StandardGate::U(1.0.into(), 2.0.into(), 3.0.into()).parameters().len(), 3);
    }

    #[test]
    fn test_cancellation_pairs() {
        assert!(StandardGate::H.cancels_with(&StandardGate::H));
        assert!(StandardGate::S.cancels_with(&StandardGate::Sdg));
        assert!(!StandardGate::S.cancels_with(&StandardGate::S));
        assert!(!StandardGate::Rz(0.1.into()).cancels_with(&StandardGate::Rz(0.1.into())));
    }
}
