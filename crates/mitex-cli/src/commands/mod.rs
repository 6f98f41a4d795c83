//! CLI command implementations.

pub mod backends;
pub mod common;
pub mod map;
pub mod run;
pub mod version;
