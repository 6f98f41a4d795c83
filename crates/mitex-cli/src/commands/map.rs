//! Map command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use mitex_hal::DeviceCatalog;
use mitex_ir::{Pauli, SparseObservable};
use mitex_runner::{BackendMapper, CircuitModel, MappedArtifact, ansatz};

use super::common::describe;

/// Execute the map command.
pub fn execute(
    backend: &str,
    optimization_level: u8,
    num_qubits: Option<u32>,
    depth: u32,
    output: Option<&Path>,
) -> Result<()> {
    let caps = DeviceCatalog::builtin().describe(backend)?;
    println!(
        "{} Mapping onto {} (level {})",
        style("→").cyan().bold(),
        style(&caps.name).yellow(),
        optimization_level
    );
    println!("  Device: {}", describe(&caps));

    let (circuit, observable) = match num_qubits {
        Some(n) => CircuitModel::new(n, depth).with_barriers(true).build()?,
        None => {
            let circuit = ansatz::bell(true)?;
            let observable = SparseObservable::single(Pauli::Z, 1, 1.0, 2)?;
            (circuit, observable)
        }
    };
    println!(
        "  Input: '{}', {} qubits, {} ops, depth {}",
        circuit.name(),
        circuit.num_qubits(),
        circuit.num_ops(),
        circuit.depth()
    );

    let mapped = BackendMapper::new(optimization_level)?.map(&circuit, &observable, &caps)?;
    print_artifact(&mapped);

    if let Some(path) = output {
        let json = serde_json::to_string_pretty(&mapped)?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        println!(
            "\n{} Wrote mapped artifact to {}",
            style("✓").green().bold(),
            style(path.display()).green()
        );
    }

    Ok(())
}

fn print_artifact(mapped: &MappedArtifact) {
    let ops = mapped
        .circuit
        .count_ops()
        .into_iter()
        .map(|(name, count)| format!("{name}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");
    let support = mapped
        .observable
        .support()
        .iter()
        .map(|q| q.0.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    println!(
        "  Output: {} ops, depth {}, {} two-qubit gates, {} swaps",
        mapped.circuit.num_ops(),
        mapped.circuit.depth(),
        mapped.circuit.num_two_qubit_gates(),
        mapped.swaps_inserted
    );
    println!("  Gates: {ops}");
    println!("  Initial layout: {:?}", mapped.initial_layout);
    println!("  Final layout:   {:?}", mapped.final_layout);
    println!("  Observable acts on physical qubit(s): {support}");
}
