//! Helpers shared by the commands.

use mitex_adapter_mock::MockBackend;
use mitex_hal::{BackendRegistry, Capabilities};

/// Backend providers the CLI can construct by name.
pub fn registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    registry.register::<MockBackend>("mock");
    registry
}

/// One-line description of a device.
pub fn describe(caps: &Capabilities) -> String {
    format!(
        "{} qubits, {:?} topology ({} couplings), gates: {}",
        caps.num_qubits,
        caps.topology.kind,
        caps.topology.edges.len(),
        caps.gate_set.native_gates().join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mitex_hal::{BackendConfig, DeviceCatalog};

    #[test]
    fn test_registry_builds_mock_for_device() {
        let registry = registry();
        assert_eq!(registry.available_backends(), vec!["mock".to_string()]);

        let config =
            BackendConfig::new("mock").with_extra("device", serde_json::json!("fake_iqm5"));
        let backend = registry.create("mock", config).unwrap();
        assert_eq!(backend.capabilities().name, "fake_iqm5");
        assert!(registry.create("ibm", BackendConfig::new("ibm")).is_err());
    }

    #[test]
    fn test_describe() {
        let caps = DeviceCatalog::builtin().describe("fake_iqm5").unwrap();
        let line = describe(&caps);
        assert!(line.starts_with("5 qubits"));
        assert!(line.contains("prx"));
    }
}
