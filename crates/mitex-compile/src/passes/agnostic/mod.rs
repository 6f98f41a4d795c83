//! Target-agnostic passes.

pub mod optimization;
pub mod verification;

pub use optimization::{CancelAdjacent, FixedPoint, MergeRotations};
pub use verification::CheckMapping;
