//! mitex circuit intermediate representation
//!
//! Data types shared by every stage of an estimation experiment: the logical
//! circuit, its symbolic parameters, the bound parameter vector and the Pauli
//! observable whose expectation value is estimated.
//!
//! # Core Components
//!
//! - [`QubitId`]: qubit index, logical before mapping and physical after
//! - [`StandardGate`]: gate alphabet, including the IBM (`rz`, `sx`, `x`,
//!   `cx`/`cz`) and IQM (`prx`, `cz`) native sets
//! - [`ParameterExpression`]: symbolic angles; [`ParameterVector`]: their
//!   bound values in declaration order
//! - [`Circuit`]: validated, ordered instruction list
//! - [`SparseObservable`]: weighted sum of sparse Pauli strings
//!
//! # Example
//!
//! ```rust
//! use mitex_ir::{Circuit, Pauli, ParameterVector, QubitId, SparseObservable};
//!
//! let mut circuit = Circuit::new("variational", 2);
//! let theta = circuit.add_parameter("theta").unwrap();
//! circuit.ry(theta, QubitId(0)).unwrap();
//! circuit.cx(QubitId(0), QubitId(1)).unwrap();
//!
//! let observable = SparseObservable::single(Pauli::Z, 1, 1.0, 2).unwrap();
//! let bound = circuit.bind(&ParameterVector::new(vec![0.3])).unwrap();
//!
//! assert!(!bound.is_parameterized());
//! assert_eq!(observable.num_qubits(), bound.num_qubits());
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod instruction;
pub mod observable;
pub mod parameter;
pub mod qubit;

pub use circuit::Circuit;
pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use instruction::{Instruction, InstructionKind};
pub use observable::{Pauli, PauliTerm, SparseObservable};
pub use parameter::{ParameterExpression, ParameterVector};
pub use qubit::QubitId;
