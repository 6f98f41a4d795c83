//! Named device descriptions.
//!
//! | Name | Qubits | Coupling | Native gates |
//! |------|--------|----------|--------------|
//! | `ideal_simulator` | 32 | all-to-all | everything |
//! | `fake_falcon27` | 27 | heavy-hex | `rz, sx, x, cx` |
//! | `fake_eagle127` | 127 | heavy-hex | `rz, sx, x, cx` |
//! | `fake_heron_line20` | 20 | line | `rz, sx, x, cz` |
//! | `fake_iqm5` | 5 | star | `prx, cz` |

use std::collections::BTreeMap;

use tracing::debug;

use crate::capability::{Capabilities, GateSet, Topology};
use crate::error::{HalError, HalResult};

/// Width of the built-in ideal simulator.
pub const IDEAL_SIMULATOR_QUBITS: u32 = 32;

/// Lookup table from device name to [`Capabilities`].
#[derive(Debug, Clone)]
pub struct DeviceCatalog {
    devices: BTreeMap<String, Capabilities>,
}

impl DeviceCatalog {
    /// A catalog with no devices.
    pub fn empty() -> Self {
        Self {
            devices: BTreeMap::new(),
        }
    }

    /// The built-in devices.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        catalog.register(Capabilities::simulator("ideal_simulator", IDEAL_SIMULATOR_QUBITS));
        catalog.register(Capabilities::ibm(
            "fake_falcon27",
            GateSet::ibm_cx(),
            Topology::heavy_hex_falcon27(),
        ));
        catalog.register(Capabilities::ibm(
            "fake_eagle127",
            GateSet::ibm_cx(),
            Topology::heavy_hex_eagle127(),
        ));
        catalog.register(Capabilities::ibm(
            "fake_heron_line20",
            GateSet::ibm_cz(),
            Topology::linear(20),
        ));
        catalog.register(Capabilities::iqm("fake_iqm5", 5));
        catalog
    }

    /// Add or replace a device.
    pub fn register(&mut self, capabilities: Capabilities) {
        debug!("Registering device: {}", capabilities.name);
        self.devices.insert(capabilities.name.clone(), capabilities);
    }

    /// Describe a device by name.
    pub fn describe(&self, name: &str) -> HalResult<Capabilities> {
        self.devices
            .get(name)
            .cloned()
            .ok_or_else(|| HalError::UnknownBackend(format!("no device named '{name}'")))
    }

    /// Device names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.devices.keys().map(String::as_str).collect()
    }

    /// All devices in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Capabilities> {
        self.devices.values()
    }
}

impl Default for DeviceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::TopologyKind;

    #[test]
    fn test_builtin_devices() {
        let catalog = DeviceCatalog::builtin();
        assert_eq!(
            catalog.names(),
            vec![
                "fake_eagle127",
                "fake_falcon27",
                "fake_heron_line20",
                "fake_iqm5",
                "ideal_simulator"
            ]
        );

        let eagle = catalog.describe("fake_eagle127").unwrap();
        assert_eq!(eagle.num_qubits, 127);
        assert_eq!(eagle.topology.kind, TopologyKind::HeavyHex);

        let heron = catalog.describe("fake_heron_line20").unwrap();
        assert_eq!(heron.num_qubits, 20);
        assert!(heron.gate_set.is_native("cz"));
        assert!(!heron.is_simulator);

        assert!(catalog.describe("ideal_simulator").unwrap().is_simulator);
    }

    #[test]
    fn test_unknown_device() {
        let err = DeviceCatalog::builtin().describe("ibm_nowhere").unwrap_err();
        assert!(matches!(err, HalError::UnknownBackend(_)));
    }

    #[test]
    fn test_register_replaces() {
        let mut catalog = DeviceCatalog::empty();
        catalog.register(Capabilities::iqm("lab", 5));
        catalog.register(Capabilities::iqm("lab", 20));
        assert_eq!(catalog.describe("lab").unwrap().num_qubits, 20);
        assert_eq!(catalog.iter().count(), 1);
    }
}
