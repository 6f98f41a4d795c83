//! Error types for the compilation crate.

use thiserror::Error;

/// Errors that can occur while mapping a circuit onto a target.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompileError {
    /// Error from the IR crate.
    #[error("IR error: {0}")]
    Ir(#[from] mitex_ir::IrError),

    /// Routing or layout requested without a coupling map.
    #[error("Missing coupling map for routing")]
    MissingCouplingMap,

    /// Routing requested before a layout pass ran.
    #[error("Missing layout for routing")]
    MissingLayout,

    /// Translation requested without basis gates.
    #[error("Missing basis gates for translation")]
    MissingBasisGates,

    /// The circuit is wider than the device.
    #[error("Circuit requires {required} qubits but target only has {available}")]
    CircuitTooLarge {
        /// Logical qubits in the circuit.
        required: u32,
        /// Physical qubits on the device.
        available: u32,
    },

    /// No physical path joins the two qubits of an interaction.
    #[error("Routing failed: physical qubits {qubit1} and {qubit2} are not connected")]
    RoutingFailed {
        /// First physical qubit.
        qubit1: u32,
        /// Second physical qubit.
        qubit2: u32,
    },

    /// No decomposition rule reaches the target alphabet.
    #[error("Gate '{gate}' cannot be expressed in target basis [{basis}]")]
    GateNotInBasis {
        /// The gate that could not be translated.
        gate: String,
        /// Comma-separated target alphabet.
        basis: String,
    },

    /// A two-qubit gate in the output sits on an uncoupled pair.
    #[error("Gate '{gate}' acts on uncoupled physical qubits {qubit1} and {qubit2}")]
    ConnectivityViolation {
        /// Gate name.
        gate: String,
        /// First physical qubit.
        qubit1: u32,
        /// Second physical qubit.
        qubit2: u32,
    },

    /// Optimization level outside 0..=3.
    #[error("Optimization level {0} is out of range (expected 0..=3)")]
    InvalidOptimizationLevel(u8),

    /// Malformed target description.
    #[error("Invalid target: {0}")]
    InvalidTarget(String),
}

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompileError>;
