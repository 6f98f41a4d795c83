//! Shared pass state: layout, coupling map, basis gates.
//!
//! ```
//! use mitex_compile::{BasisGates, CouplingMap, PropertySet};
//!
//! let props = PropertySet::new().with_target(CouplingMap::linear(5), BasisGates::iqm());
//! assert!(props.coupling_map.as_ref().unwrap().is_adjacent(0, 1));
//! assert!(props.basis_gates.as_ref().unwrap().contains("prx"));
//! ```

use petgraph::algo::{astar, connected_components};
use petgraph::graph::{NodeIndex, UnGraph};
use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};

use mitex_ir::QubitId;

use crate::error::{CompileError, CompileResult};

/// Bijection between logical qubits and the physical qubits holding them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    to_physical: FxHashMap<QubitId, u32>,
    to_logical: FxHashMap<u32, QubitId>,
}

impl Layout {
    /// Empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Logical `i` on physical `i`.
    pub fn trivial(num_qubits: u32) -> Self {
        Self::from_physical((0..num_qubits).collect::<Vec<_>>().as_slice())
    }

    /// Logical `i` on `physical[i]`.
    pub fn from_physical(physical: &[u32]) -> Self {
        let mut layout = Self::new();
        for (i, &p) in physical.iter().enumerate() {
            layout.assign(QubitId(i as u32), p);
        }
        layout
    }

    /// Place `logical` on `physical`, evicting whatever either side held.
    pub fn assign(&mut self, logical: QubitId, physical: u32) {
        if let Some(prev) = self.to_logical.insert(physical, logical) {
            if prev != logical {
                self.to_physical.remove(&prev);
            }
        }
        if let Some(prev) = self.to_physical.insert(logical, physical) {
            if prev != physical {
                self.to_logical.remove(&prev);
            }
        }
    }

    /// Physical home of a logical qubit.
    pub fn physical(&self, logical: QubitId) -> Option<u32> {
        self.to_physical.get(&logical).copied()
    }

    /// Logical qubit on a physical qubit.
    pub fn logical(&self, physical: u32) -> Option<QubitId> {
        self.to_logical.get(&physical).copied()
    }

    /// Exchange the contents of two physical qubits.
    pub fn swap(&mut self, p1: u32, p2: u32) {
        let l1 = self.to_logical.remove(&p1);
        let l2 = self.to_logical.remove(&p2);
        if let Some(l) = l1 {
            self.to_logical.insert(p2, l);
            self.to_physical.insert(l, p2);
        }
        if let Some(l) = l2 {
            self.to_logical.insert(p1, l);
            self.to_physical.insert(l, p1);
        }
    }

    /// Number of placed logical qubits.
    pub fn len(&self) -> usize {
        self.to_physical.len()
    }

    /// Whether nothing is placed.
    pub fn is_empty(&self) -> bool {
        self.to_physical.is_empty()
    }

    /// Physical qubit of each logical qubit `0..num_logical`, or `None` if
    /// any is unplaced.
    pub fn physical_qubits(&self, num_logical: u32) -> Option<Vec<u32>> {
        (0..num_logical).map(|l| self.physical(QubitId(l))).collect()
    }
}

/// Device connectivity: an undirected graph over physical qubits `0..n`.
#[derive(Debug, Clone)]
pub struct CouplingMap {
    graph: UnGraph<(), ()>,
}

impl CouplingMap {
    /// `n` isolated qubits.
    pub fn new(num_qubits: u32) -> Self {
        let mut graph = UnGraph::with_capacity(num_qubits as usize, 0);
        for _ in 0..num_qubits {
            graph.add_node(());
        }
        Self { graph }
    }

    /// Build from an explicit edge list.
    pub fn from_edges(num_qubits: u32, edges: &[(u32, u32)]) -> CompileResult<Self> {
        let mut map = Self::new(num_qubits);
        for &(a, b) in edges {
            map.add_edge(a, b)?;
        }
        Ok(map)
    }

    /// Couple two qubits. Duplicate and reversed edges are ignored.
    pub fn add_edge(&mut self, a: u32, b: u32) -> CompileResult<()> {
        let n = self.num_qubits();
        if a >= n || b >= n {
            return Err(CompileError::InvalidTarget(format!(
                "edge ({a}, {b}) references a qubit outside 0..{n}"
            )));
        }
        if a == b {
            return Err(CompileError::InvalidTarget(format!("self-loop on qubit {a}")));
        }
        self.link(a, b);
        Ok(())
    }

    fn link(&mut self, a: u32, b: u32) {
        self.graph
            .update_edge(NodeIndex::new(a as usize), NodeIndex::new(b as usize), ());
    }

    /// 0-1-2-...-(n-1).
    pub fn linear(n: u32) -> Self {
        let mut map = Self::new(n);
        for i in 1..n {
            map.link(i - 1, i);
        }
        map
    }

    /// Qubit 0 coupled to every other qubit.
    pub fn star(n: u32) -> Self {
        let mut map = Self::new(n);
        for i in 1..n {
            map.link(0, i);
        }
        map
    }

    /// Every pair coupled.
    pub fn full(n: u32) -> Self {
        let mut map = Self::new(n);
        for i in 0..n {
            for j in (i + 1)..n {
                map.link(i, j);
            }
        }
        map
    }

    /// Number of physical qubits.
    pub fn num_qubits(&self) -> u32 {
        self.graph.node_count() as u32
    }

    /// Number of couplings.
    pub fn num_edges(&self) -> usize {
        self.graph.edge_count()
    }

    /// Whether two physical qubits share a coupler.
    pub fn is_adjacent(&self, a: u32, b: u32) -> bool {
        let n = self.num_qubits();
        a < n
            && b < n
            && self
                .graph
                .find_edge(NodeIndex::new(a as usize), NodeIndex::new(b as usize))
                .is_some()
    }

    /// Coupled neighbours of a qubit.
    pub fn neighbors(&self, qubit: u32) -> Vec<u32> {
        if qubit >= self.num_qubits() {
            return Vec::new();
        }
        let mut out: Vec<u32> = self
            .graph
            .neighbors(NodeIndex::new(qubit as usize))
            .map(|n| n.index() as u32)
            .collect();
        out.sort_unstable();
        out
    }

    /// Couplings as `(low, high)` pairs.
    pub fn edges(&self) -> Vec<(u32, u32)> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| {
                let (a, b) = (a.index() as u32, b.index() as u32);
                (a.min(b), a.max(b))
            })
            .collect()
    }

    /// Whether every qubit can reach every other.
    pub fn is_connected(&self) -> bool {
        self.num_qubits() <= 1 || connected_components(&self.graph) == 1
    }

    /// Shortest path from `from` to `to`, both endpoints included.
    pub fn shortest_path(&self, from: u32, to: u32) -> Option<Vec<u32>> {
        let n = self.num_qubits();
        if from >= n || to >= n {
            return None;
        }
        let goal = NodeIndex::new(to as usize);
        astar(
            &self.graph,
            NodeIndex::new(from as usize),
            |node| node == goal,
            |_| 1u32,
            |_| 0,
        )
        .map(|(_, path)| path.into_iter().map(|n| n.index() as u32).collect())
    }

    /// Hop count between two qubits.
    pub fn distance(&self, from: u32, to: u32) -> Option<u32> {
        self.shortest_path(from, to).map(|p| p.len() as u32 - 1)
    }
}

/// Native gate alphabet of a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasisGates {
    gates: Vec<String>,
}

impl BasisGates {
    /// Alphabet from gate names.
    pub fn new(gates: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            gates: gates.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a gate name is native.
    pub fn contains(&self, gate: &str) -> bool {
        self.gates.iter().any(|g| g == gate)
    }

    /// Gate names.
    pub fn gates(&self) -> &[String] {
        &self.gates
    }

    /// IBM Falcon/Eagle family: RZ, SX, X, CX.
    pub fn ibm_cx() -> Self {
        Self::new(["rz", "sx", "x", "cx", "id", "measure", "barrier"])
    }

    /// IBM Heron family: RZ, SX, X, CZ.
    pub fn ibm_cz() -> Self {
        Self::new(["rz", "sx", "x", "cz", "id", "measure", "barrier"])
    }

    /// IQM: PRX, CZ.
    pub fn iqm() -> Self {
        Self::new(["prx", "cz", "measure", "barrier"])
    }

    /// Every gate the IR knows.
    pub fn universal() -> Self {
        Self::new([
            "id", "x", "y", "z", "h", "s", "sdg", "t", "tdg", "sx", "sxdg", "rx", "ry", "rz", "p",
            "u", "prx", "cx", "cy", "cz", "swap", "cry", "crz", "cp", "rxx", "ryy", "rzz",
            "measure", "barrier",
        ])
    }
}

impl std::fmt::Display for BasisGates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.gates.join(", "))
    }
}

/// State passed through every pass of a [`PassManager`](crate::PassManager).
#[derive(Debug, Default)]
pub struct PropertySet {
    /// Initial placement, written by layout passes.
    pub layout: Option<Layout>,

    /// Placement at the end of the circuit, written by routing.
    pub final_layout: Option<Layout>,

    /// Target connectivity.
    pub coupling_map: Option<CouplingMap>,

    /// Target alphabet.
    pub basis_gates: Option<BasisGates>,

    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    /// Empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set coupling map and basis gates.
    #[must_use]
    pub fn with_target(mut self, coupling_map: CouplingMap, basis_gates: BasisGates) -> Self {
        self.coupling_map = Some(coupling_map);
        self.basis_gates = Some(basis_gates);
        self
    }

    /// Preset the initial layout; layout passes then leave it alone.
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Store a typed value, replacing any previous value of that type.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Typed value, if stored.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom.get(&TypeId::of::<T>()).and_then(|v| v.downcast_ref())
    }

    /// Mutable typed value, if stored.
    pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.custom.get_mut(&TypeId::of::<T>()).and_then(|v| v.downcast_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_assign_evicts() {
        let mut layout = Layout::trivial(3);
        layout.assign(QubitId(0), 2);
        assert_eq!(layout.physical(QubitId(0)), Some(2));
        assert_eq!(layout.logical(2), Some(QubitId(0)));
        assert_eq!(layout.physical(QubitId(2)), None);
        assert_eq!(layout.logical(0), None);
    }

    #[test]
    fn test_layout_swap_with_empty_slot() {
        let mut layout = Layout::from_physical(&[0, 1]);
        layout.swap(1, 4);
        assert_eq!(layout.physical(QubitId(1)), Some(4));
        assert_eq!(layout.logical(1), None);
        assert_eq!(layout.physical_qubits(2), Some(vec![0, 4]));
        assert_eq!(layout.physical_qubits(3), None);
    }

    #[test]
    fn test_coupling_presets() {
        let line = CouplingMap::linear(4);
        assert_eq!(line.num_edges(), 3);
        assert!(line.is_adjacent(2, 1));
        assert!(!line.is_adjacent(0, 2));
        assert_eq!(line.distance(0, 3), Some(3));
        assert_eq!(line.shortest_path(3, 1), Some(vec![3, 2, 1]));

        let star = CouplingMap::star(5);
        assert_eq!(star.neighbors(0), vec![1, 2, 3, 4]);
        assert_eq!(star.distance(1, 2), Some(2));

        assert_eq!(CouplingMap::full(4).num_edges(), 6);
    }

    #[test]
    fn test_disconnected_map() {
        let map = CouplingMap::from_edges(4, &[(0, 1), (2, 3)]).unwrap();
        assert!(!map.is_connected());
        assert_eq!(map.shortest_path(0, 3), None);
        assert!(CouplingMap::linear(4).is_connected());
    }

    #[test]
    fn test_invalid_edges() {
        assert!(CouplingMap::from_edges(2, &[(0, 2)]).is_err());
        assert!(CouplingMap::from_edges(2, &[(1, 1)]).is_err());
        let map = CouplingMap::from_edges(2, &[(0, 1), (1, 0)]).unwrap();
        assert_eq!(map.num_edges(), 1);
        assert_eq!(map.edges(), vec![(0, 1)]);
    }

    #[test]
    fn test_custom_properties() {
        #[derive(Debug, PartialEq)]
        struct Marker(u32);

        let mut props = PropertySet::new();
        props.insert(Marker(3));
        props.get_mut::<Marker>().unwrap().0 += 1;
        assert_eq!(props.get::<Marker>(), Some(&Marker(4)));
    }
}
