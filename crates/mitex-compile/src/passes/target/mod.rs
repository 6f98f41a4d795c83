//! Passes that need target properties.

pub mod layout;
pub mod routing;
pub mod translation;

pub use layout::{DenseLayout, TrivialLayout};
pub use routing::{BasicRouting, RoutingStats};
pub use translation::BasisTranslation;
