//! Backend capability introspection.
//!
//! Describes what a device offers the mapper: qubit count, native gate
//! alphabet and coupling topology. All edges in [`Topology`] are
//! bidirectional.

use serde::{Deserialize, Serialize};

/// Hardware capabilities of a backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    /// Name of the device.
    pub name: String,
    /// Number of physical qubits.
    pub num_qubits: u32,
    /// Supported gate set.
    pub gate_set: GateSet,
    /// Qubit connectivity. All edges are bidirectional.
    pub topology: Topology,
    /// Whether this is a simulator (`true`) or a hardware model (`false`).
    pub is_simulator: bool,
    /// Free-form capability flags, e.g. `"estimator"`, `"dynamical_decoupling"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
}

impl Capabilities {
    /// All-to-all simulator with every gate native.
    pub fn simulator(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set: GateSet::universal(),
            topology: Topology::full(num_qubits),
            is_simulator: true,
            features: vec!["estimator".into()],
        }
    }

    /// IBM-style device on a given topology.
    pub fn ibm(name: impl Into<String>, gate_set: GateSet, topology: Topology) -> Self {
        Self {
            name: name.into(),
            num_qubits: topology.num_qubits(),
            gate_set,
            topology,
            is_simulator: false,
            features: vec!["estimator".into(), "dynamical_decoupling".into()],
        }
    }

    /// IQM-style device with a star coupler.
    pub fn iqm(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            gate_set: GateSet::iqm(),
            topology: Topology::star(num_qubits),
            is_simulator: false,
            features: vec!["estimator".into()],
        }
    }

    /// Replace the topology.
    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    /// Whether a feature flag is set.
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }
}

/// Gate set supported by a backend.
///
/// Gate names follow the IR's lowercase naming (`rz`, `sx`, `cx`, `prx`).
/// If `native` is empty, every supported gate is native.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSet {
    /// Single-qubit gates supported.
    pub single_qubit: Vec<String>,
    /// Two-qubit gates supported.
    pub two_qubit: Vec<String>,
    /// Gates that execute without decomposition.
    pub native: Vec<String>,
}

fn names(gates: &[&str]) -> Vec<String> {
    gates.iter().map(|g| (*g).to_string()).collect()
}

impl GateSet {
    /// IBM Falcon/Eagle family: `rz, sx, x, cx`.
    pub fn ibm_cx() -> Self {
        Self {
            single_qubit: names(&["rz", "sx", "x", "id"]),
            two_qubit: names(&["cx"]),
            native: names(&["rz", "sx", "x", "id", "cx"]),
        }
    }

    /// IBM Heron family: `rz, sx, x, cz`.
    pub fn ibm_cz() -> Self {
        Self {
            single_qubit: names(&["rz", "sx", "x", "id"]),
            two_qubit: names(&["cz"]),
            native: names(&["rz", "sx", "x", "id", "cz"]),
        }
    }

    /// IQM: `prx, cz`.
    pub fn iqm() -> Self {
        Self {
            single_qubit: names(&["prx"]),
            two_qubit: names(&["cz"]),
            native: names(&["prx", "cz"]),
        }
    }

    /// Everything the IR can express.
    pub fn universal() -> Self {
        Self {
            single_qubit: names(&[
                "id", "x", "y", "z", "h", "s", "sdg", "t", "tdg", "sx", "sxdg", "rx", "ry", "rz",
                "p", "u", "prx",
            ]),
            two_qubit: names(&["cx", "cy", "cz", "swap", "cry", "crz", "cp", "rxx", "ryy", "rzz"]),
            native: vec![],
        }
    }

    /// Check if a gate is supported.
    pub fn contains(&self, gate: &str) -> bool {
        self.single_qubit.iter().any(|g| g == gate) || self.two_qubit.iter().any(|g| g == gate)
    }

    /// Check if a gate is native.
    pub fn is_native(&self, gate: &str) -> bool {
        if self.native.is_empty() {
            self.contains(gate)
        } else {
            self.native.iter().any(|g| g == gate)
        }
    }

    /// The native alphabet as a flat list.
    pub fn native_gates(&self) -> Vec<String> {
        if self.native.is_empty() {
            self.single_qubit.iter().chain(&self.two_qubit).cloned().collect()
        } else {
            self.native.clone()
        }
    }
}

/// Qubit connectivity topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topology {
    /// Kind of topology.
    pub kind: TopologyKind,
    /// Coupling edges. Bidirectional.
    pub edges: Vec<(u32, u32)>,
}

/// Falcon r4/r5 27-qubit coupling list.
const FALCON27_EDGES: [(u32, u32); 28] = [
    (0, 1),
    (1, 2),
    (1, 4),
    (2, 3),
    (3, 5),
    (4, 7),
    (5, 8),
    (6, 7),
    (7, 10),
    (8, 9),
    (8, 11),
    (10, 12),
    (11, 14),
    (12, 13),
    (12, 15),
    (13, 14),
    (14, 16),
    (15, 18),
    (16, 19),
    (17, 18),
    (18, 21),
    (19, 20),
    (19, 22),
    (21, 23),
    (22, 25),
    (23, 24),
    (24, 25),
    (25, 26),
];

impl Topology {
    /// Create a linear topology.
    pub fn linear(n: u32) -> Self {
        let edges: Vec<_> = (0..n.saturating_sub(1)).map(|i| (i, i + 1)).collect();
        Self {
            kind: TopologyKind::Linear,
            edges,
        }
    }

    /// Create a star topology centred on qubit 0.
    pub fn star(n: u32) -> Self {
        let edges: Vec<_> = (1..n).map(|i| (0, i)).collect();
        Self {
            kind: TopologyKind::Star,
            edges,
        }
    }

    /// Create a fully connected topology.
    pub fn full(n: u32) -> Self {
        let mut edges = vec![];
        for i in 0..n {
            for j in (i + 1)..n {
                edges.push((i, j));
            }
        }
        Self {
            kind: TopologyKind::FullyConnected,
            edges,
        }
    }

    /// Create a grid topology, row-major.
    pub fn grid(rows: u32, cols: u32) -> Self {
        let mut edges = vec![];
        for r in 0..rows {
            for c in 0..cols {
                let idx = r * cols + c;
                if c + 1 < cols {
                    edges.push((idx, idx + 1));
                }
                if r + 1 < rows {
                    edges.push((idx, idx + cols));
                }
            }
        }
        Self {
            kind: TopologyKind::Grid { rows, cols },
            edges,
        }
    }

    /// Create a custom topology from edges.
    pub fn custom(edges: Vec<(u32, u32)>) -> Self {
        Self {
            kind: TopologyKind::Custom,
            edges,
        }
    }

    /// The 27-qubit heavy-hex lattice of Falcon processors.
    pub fn heavy_hex_falcon27() -> Self {
        Self {
            kind: TopologyKind::HeavyHex,
            edges: FALCON27_EDGES.to_vec(),
        }
    }

    /// The 127-qubit heavy-hex lattice of Eagle processors.
    ///
    /// Seven rows (14, 15, 15, 15, 15, 15, 14 qubits) joined by groups of four
    /// bridge qubits. Bridges alternate between columns 0, 4, 8, 12 and
    /// 2, 6, 10, 14. The last row starts one column in.
    pub fn heavy_hex_eagle127() -> Self {
        const ROWS: [(u32, u32); 7] = [(14, 0), (15, 0), (15, 0), (15, 0), (15, 0), (15, 0), (14, 1)];

        let mut edges = Vec::with_capacity(144);
        let mut next = 0u32;
        let mut row_start = Vec::with_capacity(ROWS.len());

        for (r, &(len, _)) in ROWS.iter().enumerate() {
            let start = next;
            row_start.push(start);
            edges.extend((start..start + len - 1).map(|q| (q, q + 1)));
            next += len;

            if r + 1 < ROWS.len() {
                // Bridges are numbered right after the row they hang from.
                let cols: [u32; 4] = if r % 2 == 0 { [0, 4, 8, 12] } else { [2, 6, 10, 14] };
                let below_offset = ROWS[r + 1].1;
                let below_start = next + 4;
                for (i, col) in cols.into_iter().enumerate() {
                    let bridge = next + i as u32;
                    edges.push((start + col - ROWS[r].1, bridge));
                    edges.push((bridge, below_start + col - below_offset));
                }
                next += 4;
            }
        }

        Self {
            kind: TopologyKind::HeavyHex,
            edges,
        }
    }

    /// Check if two qubits are connected.
    pub fn is_connected(&self, q1: u32, q2: u32) -> bool {
        self.edges
            .iter()
            .any(|&(a, b)| (a == q1 && b == q2) || (a == q2 && b == q1))
    }

    /// One more than the largest qubit index on any edge.
    pub fn num_qubits(&self) -> u32 {
        self.edges
            .iter()
            .map(|&(a, b)| a.max(b) + 1)
            .max()
            .unwrap_or(0)
    }
}

/// Kind of qubit topology.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopologyKind {
    /// Fully connected (all-to-all).
    FullyConnected,
    /// Linear chain.
    Linear,
    /// Star topology (center connected to all).
    Star,
    /// 2D grid.
    Grid { rows: u32, cols: u32 },
    /// Heavy-hex lattice.
    HeavyHex,
    /// Custom topology.
    Custom,
}
