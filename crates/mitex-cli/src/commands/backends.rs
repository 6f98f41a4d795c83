//! Backends command implementation.

use anyhow::Result;
use console::style;

use mitex_hal::{BackendConfig, DeviceCatalog};

use super::common::{describe, registry};

/// Execute the backends command.
pub async fn execute() -> Result<()> {
    let registry = registry();

    println!("{} Devices:\n", style("mitex").cyan().bold());
    for caps in DeviceCatalog::builtin().iter() {
        println!(
            "  {} {} {}",
            style("●").green(),
            style(&caps.name).bold(),
            if caps.is_simulator { "(simulator)" } else { "" }
        );
        println!("    {}", describe(caps));
    }
    println!();

    println!("{} Providers:\n", style("mitex").cyan().bold());
    for name in registry.available_backends() {
        let backend = registry.create(&name, BackendConfig::new(&name))?;
        let available = backend.availability().await.is_ok_and(|a| a.is_available);
        println!(
            "  {} {}",
            if available {
                style("●").green()
            } else {
                style("○").red()
            },
            style(&name).bold()
        );
    }
    println!();
    println!(
        "  Select with {} and {} (or MITEX_BACKEND)",
        style("--provider").yellow(),
        style("--backend <device>").yellow()
    );

    Ok(())
}
