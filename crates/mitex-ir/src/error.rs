//! Error types for the IR crate.

use crate::qubit::QubitId;
use thiserror::Error;

/// Errors raised while building or transforming circuits and observables.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A gate operand lies outside the circuit's qubit range.
    #[error("Qubit {qubit} out of range for {num_qubits}-qubit circuit (gate: {gate})")]
    QubitOutOfRange {
        /// The offending operand.
        qubit: QubitId,
        /// Width of the circuit.
        num_qubits: u32,
        /// Name of the instruction that referenced it.
        gate: String,
    },

    /// Gate applied to the wrong number of qubits.
    #[error("Gate '{gate}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate.
        gate: String,
        /// Arity of the gate.
        expected: u32,
        /// Number of operands supplied.
        got: u32,
    },

    /// The same qubit appears twice in one instruction.
    #[error("Duplicate qubit {qubit} in operation (gate: {gate})")]
    DuplicateQubit {
        /// The repeated qubit.
        qubit: QubitId,
        /// Name of the instruction.
        gate: String,
    },

    /// A gate references a parameter the circuit never declared.
    #[error("Parameter '{name}' used by gate '{gate}' is not declared")]
    UndeclaredParameter {
        /// Symbol name.
        name: String,
        /// Gate that referenced it.
        gate: String,
    },

    /// A parameter name was declared twice.
    #[error("Parameter '{0}' declared more than once")]
    DuplicateParameter(String),

    /// Bound vector length does not match the declared parameter count.
    #[error("Expected {expected} parameter values, got {got}")]
    ParameterCountMismatch {
        /// Declared parameter count.
        expected: usize,
        /// Supplied vector length.
        got: usize,
    },

    /// Parameter value is NaN or infinite.
    #[error("Parameter '{name}' bound to non-finite value {value}")]
    NonFiniteParameter {
        /// Symbol name.
        name: String,
        /// The rejected value.
        value: f64,
    },

    /// Parameter is still symbolic where a number is required.
    #[error("Parameter '{0}' is unbound")]
    UnboundParameter(String),

    /// Malformed observable term.
    #[error("Invalid observable: {0}")]
    InvalidObservable(String),

    /// Observable term acts on a qubit outside its declared width.
    #[error("Observable term acts on qubit {qubit}, but the observable spans {num_qubits} qubits")]
    ObservableQubitOutOfRange {
        /// The offending qubit.
        qubit: QubitId,
        /// Declared width.
        num_qubits: u32,
    },

    /// Layout does not cover every logical qubit.
    #[error("Layout covers {layout_len} qubits, observable needs {needed}")]
    IncompleteLayout {
        /// Entries in the supplied layout.
        layout_len: usize,
        /// Logical qubits requiring a physical image.
        needed: u32,
    },
}

/// Result type for IR operations.
pub type IrResult<T> = Result<T, IrError>;
