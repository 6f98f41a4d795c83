//! Built-in passes.
//!
//! - [`agnostic`]: cleanup and verification that only look at the circuit
//! - [`target`]: layout, routing and translation driven by target properties

pub mod agnostic;
pub mod target;

pub use agnostic::{CancelAdjacent, CheckMapping, FixedPoint, MergeRotations};
pub use target::{BasicRouting, BasisTranslation, DenseLayout, RoutingStats, TrivialLayout};
