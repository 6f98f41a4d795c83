//! mitex mapping framework
//!
//! Rewrites a logical circuit into a circuit a specific device can execute:
//! qubits are placed on the device, SWAPs are inserted where an interaction
//! has no coupler, and every gate is decomposed into the native alphabet.
//!
//! # Architecture
//!
//! ```text
//! Logical circuit
//!       |
//!       v
//! PassManager  <-- PropertySet (coupling map, basis gates, layouts)
//!       |
//!       +-- TrivialLayout / DenseLayout
//!       +-- BasicRouting
//!       +-- BasisTranslation
//!       +-- MergeRotations / CancelAdjacent
//!       +-- CheckMapping
//!       v
//! Native circuit + initial/final layout
//! ```
//!
//! # Example
//!
//! ```rust
//! use mitex_compile::{BasisGates, CouplingMap, PassManagerBuilder};
//! use mitex_ir::Circuit;
//!
//! let mut circuit = Circuit::bell().unwrap();
//! let (pm, mut props) = PassManagerBuilder::new()
//!     .with_optimization_level(2)
//!     .unwrap()
//!     .with_target(CouplingMap::star(5), BasisGates::iqm())
//!     .build();
//! pm.run(&mut circuit, &mut props).unwrap();
//!
//! assert!(circuit
//!     .instructions()
//!     .iter()
//!     .all(|i| ["prx", "cz"].contains(&i.name())));
//! ```
//!
//! # Custom Passes
//!
//! ```rust
//! use mitex_compile::{CompileResult, Pass, PassKind, PropertySet};
//! use mitex_ir::Circuit;
//!
//! struct CountOps;
//!
//! impl Pass for CountOps {
//!     fn name(&self) -> &str { "CountOps" }
//!     fn kind(&self) -> PassKind { PassKind::Analysis }
//!
//!     fn run(&self, circuit: &mut Circuit, props: &mut PropertySet) -> CompileResult<()> {
//!         props.insert(circuit.num_ops());
//!         Ok(())
//!     }
//! }
//! ```

pub mod error;
pub mod manager;
pub mod pass;
pub mod passes;
pub mod property;
pub mod transpile;

pub use error::{CompileError, CompileResult};
pub use manager::{MAX_OPTIMIZATION_LEVEL, PassManager, PassManagerBuilder};
pub use pass::{Pass, PassKind};
pub use property::{BasisGates, CouplingMap, Layout, PropertySet};
pub use transpile::{Transpiled, transpile};
