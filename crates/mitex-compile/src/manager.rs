//! Pass manager and preset pipelines.

use tracing::{debug, info, instrument};

use mitex_ir::Circuit;

use crate::error::{CompileError, CompileResult};
use crate::pass::Pass;
use crate::passes::{
    BasicRouting, BasisTranslation, CancelAdjacent, CheckMapping, DenseLayout, FixedPoint,
    MergeRotations, TrivialLayout,
};
use crate::property::{BasisGates, CouplingMap, PropertySet};

/// Highest supported optimization level.
pub const MAX_OPTIMIZATION_LEVEL: u8 = 3;

const FIXED_POINT_ROUNDS: usize = 16;

/// Runs passes in order over one circuit.
pub struct PassManager {
    passes: Vec<Box<dyn Pass>>,
}

impl PassManager {
    /// No passes.
    pub fn new() -> Self {
        Self { passes: vec![] }
    }

    /// Append a pass.
    pub fn add_pass(&mut self, pass: impl Pass + 'static) {
        self.passes.push(Box::new(pass));
    }

    /// Names of the scheduled passes.
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run every pass whose `should_run` holds.
    #[instrument(skip(self, circuit, properties), fields(circuit = circuit.name()))]
    pub fn run(&self, circuit: &mut Circuit, properties: &mut PropertySet) -> CompileResult<()> {
        info!(
            "Running {} passes on {}-qubit circuit with {} ops",
            self.passes.len(),
            circuit.num_qubits(),
            circuit.num_ops()
        );

        for pass in &self.passes {
            if pass.should_run(circuit, properties) {
                debug!("Running pass: {}", pass.name());
                pass.run(circuit, properties)?;
                debug!("Pass {} completed, ops: {}", pass.name(), circuit.num_ops());
            } else {
                debug!("Skipping pass: {}", pass.name());
            }
        }

        info!(
            "Pass manager completed, depth: {}, ops: {}",
            circuit.depth(),
            circuit.num_ops()
        );
        Ok(())
    }

    /// Number of passes.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Whether no passes are scheduled.
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl Default for PassManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the preset pipeline for an optimization level.
///
/// | Level | Pipeline |
/// |-------|----------|
/// | 0 | TrivialLayout, BasicRouting, BasisTranslation |
/// | 1 | level 0 + MergeRotations, CancelAdjacent |
/// | 2 | DenseLayout instead of TrivialLayout |
/// | 3 | level 2 with cleanup repeated to a fixed point |
///
/// Every pipeline ends with [`CheckMapping`].
pub struct PassManagerBuilder {
    optimization_level: u8,
    properties: PropertySet,
}

impl PassManagerBuilder {
    /// Level 1, no target.
    pub fn new() -> Self {
        Self {
            optimization_level: 1,
            properties: PropertySet::new(),
        }
    }

    /// Set the optimization level, rejecting values above 3.
    pub fn with_optimization_level(mut self, level: u8) -> CompileResult<Self> {
        if level > MAX_OPTIMIZATION_LEVEL {
            return Err(CompileError::InvalidOptimizationLevel(level));
        }
        self.optimization_level = level;
        Ok(self)
    }

    /// Set coupling map and basis gates.
    #[must_use]
    pub fn with_target(mut self, coupling_map: CouplingMap, basis_gates: BasisGates) -> Self {
        self.properties.coupling_map = Some(coupling_map);
        self.properties.basis_gates = Some(basis_gates);
        self
    }

    /// Replace the property set wholesale.
    #[must_use]
    pub fn with_properties(mut self, properties: PropertySet) -> Self {
        self.properties = properties;
        self
    }

    /// The pass manager and the property set it should run with.
    pub fn build(self) -> (PassManager, PropertySet) {
        let mut pm = PassManager::new();
        let level = self.optimization_level;

        if self.properties.coupling_map.is_some() {
            if level >= 2 {
                pm.add_pass(DenseLayout);
            } else {
                pm.add_pass(TrivialLayout);
            }
            pm.add_pass(BasicRouting);
        }

        if self.properties.basis_gates.is_some() {
            pm.add_pass(BasisTranslation);
        }

        match level {
            0 => {}
            1 | 2 => {
                pm.add_pass(MergeRotations);
                pm.add_pass(CancelAdjacent);
            }
            _ => pm.add_pass(FixedPoint::new(
                vec![Box::new(MergeRotations), Box::new(CancelAdjacent)],
                FIXED_POINT_ROUNDS,
            )),
        }

        pm.add_pass(CheckMapping);
        (pm, self.properties)
    }
}

impl Default for PassManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
