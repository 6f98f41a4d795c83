//! The pass abstraction.

use mitex_ir::Circuit;

use crate::error::CompileResult;
use crate::property::PropertySet;

/// Whether a pass rewrites the circuit or only inspects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Reads the circuit, may write properties.
    Analysis,
    /// Rewrites the circuit.
    Transformation,
}

/// A unit of work in a mapping pipeline.
///
/// Passes share state through the [`PropertySet`]: layout passes write the
/// initial layout, routing reads it and records the final one, translation
/// reads the basis gates.
pub trait Pass: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Kind of pass.
    fn kind(&self) -> PassKind;

    /// Run the pass.
    fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()>;

    /// Whether the pass has anything to do for this circuit and properties.
    fn should_run(&self, _circuit: &Circuit, _properties: &PropertySet) -> bool {
        true
    }
}
