//! Run command implementation.

use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use mitex_runner::{
    CircuitKind, ComparisonReport, ConfigOutcome, ExecutionMode, Experiment, ExperimentConfig,
};

use super::common::{describe, registry};
use crate::RunArgs;

/// Execute the run command.
pub async fn execute(args: &RunArgs) -> Result<()> {
    let config = ExperimentConfig::load(args.config.as_deref())?;
    let config = apply_overrides(config, args);
    debug!("Effective configuration: {:?}", config);
    let reference = config.reference.context(
        "no reference value: pass --reference or set `reference` in the configuration",
    )?;
    let experiment = Experiment::new(config)?;
    let config = experiment.config();

    let backend = registry()
        .create(&config.provider, config.backend_config())
        .with_context(|| format!("creating backend provider '{}'", config.provider))?;
    let avail = backend.availability().await?;
    if !avail.is_available {
        anyhow::bail!("Backend '{}' is not available", backend.name());
    }

    println!(
        "{} Running {} on {} via {}",
        style("→").cyan().bold(),
        style(circuit_label(config)).green(),
        style(&config.backend).yellow(),
        config.provider
    );
    println!("  Device: {}", describe(backend.capabilities()));
    println!(
        "  Seed {}, phi_max {:.4}, level {}, {} configurations ({:?})",
        config.binding.seed,
        config.binding.phi_max,
        config.optimization_level,
        config.configs.len(),
        config.execution.mode
    );

    let progress = ProgressBar::new(config.configs.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );
    progress.enable_steady_tick(std::time::Duration::from_millis(100));
    progress.set_message("submitting...");

    let outcome = experiment
        .run_with(backend, &|done: &ConfigOutcome| {
            progress.inc(1);
            progress.set_message(format!("{} done", done.config.name));
        })
        .await;
    progress.finish_and_clear();
    let outcome = outcome?;

    println!(
        "  Mapped: {} ops, {} swaps, final layout of observable qubit(s) {:?}",
        outcome.artifact.circuit.num_ops(),
        outcome.artifact.swaps_inserted,
        outcome.artifact.observable.support().iter().map(|q| q.0).collect::<Vec<_>>()
    );
    println!();

    let report = outcome.report(reference);
    print_report(&report);

    if let Some(path) = &args.export {
        report.write_json(path)?;
        println!(
            "\n{} Wrote report to {}",
            style("✓").green().bold(),
            style(path.display()).green()
        );
    }

    Ok(())
}

/// Apply command-line flags on top of file and environment settings.
fn apply_overrides(mut config: ExperimentConfig, args: &RunArgs) -> ExperimentConfig {
    if let Some(backend) = &args.backend {
        config.backend.clone_from(backend);
    }
    if let Some(provider) = &args.provider {
        config.provider.clone_from(provider);
    }
    if args.bell {
        config.circuit.kind = CircuitKind::Bell;
    }
    if let Some(n) = args.num_qubits {
        config.circuit.num_qubits = n;
    }
    if let Some(depth) = args.depth {
        config.circuit.depth = depth;
    }
    if let Some(q) = args.observable_qubit {
        config.circuit.observable_qubit = Some(q);
    }
    if let Some(seed) = args.seed {
        config.binding.seed = seed;
    }
    if let Some(phi_max) = args.phi_max {
        config.binding.phi_max = phi_max;
    }
    if let Some(level) = args.optimization_level {
        config.optimization_level = level;
    }
    if let Some(reference) = args.reference {
        config.reference = Some(reference);
    }
    if args.concurrent {
        config.execution.mode = ExecutionMode::Concurrent;
    }
    if let Some(ms) = args.timeout_ms {
        config.execution.timeout_ms = Some(ms);
    }
    if let Some(attempts) = args.max_attempts {
        config.execution.retry.max_attempts = attempts;
    }
    if args.no_dd {
        config.dynamical_decoupling.enable = false;
    }
    config
}

fn circuit_label(config: &ExperimentConfig) -> String {
    match config.circuit.kind {
        CircuitKind::Bell => "Bell circuit".to_string(),
        CircuitKind::Ansatz => format!(
            "{}-qubit ansatz (depth {})",
            config.circuit.num_qubits, config.circuit.depth
        ),
    }
}

fn print_report(report: &ComparisonReport) {
    println!("{}", style("Comparison").cyan().bold());
    print!("{report}");

    if let Some(best) = report.closest() {
        println!(
            "\n  Closest to reference: {} ({:.6} off)",
            style(&best.config).green().bold(),
            best.abs_error
        );
    }
    if !report.is_complete() {
        println!(
            "  {} missing: {}",
            style("!").yellow().bold(),
            report.missing_configs().join(", ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_flags_override_config() {
        let mut config = ExperimentConfig::default();
        config.reference = Some(0.5);
        let args = RunArgs {
            backend: Some("fake_iqm5".into()),
            bell: true,
            seed: Some(7),
            reference: Some(0.1484375),
            concurrent: true,
            no_dd: true,
            export: Some(PathBuf::from("out.json")),
            ..RunArgs::default()
        };

        let config = apply_overrides(config, &args);
        assert_eq!(config.backend, "fake_iqm5");
        assert_eq!(config.circuit.kind, CircuitKind::Bell);
        assert_eq!(config.binding.seed, 7);
        assert_eq!(config.reference, Some(0.1484375));
        assert_eq!(config.execution.mode, ExecutionMode::Concurrent);
        assert!(!config.dynamical_decoupling.enable);
        assert_eq!(config.circuit.num_qubits, 30);
    }

    #[test]
    fn test_no_flags_keeps_config() {
        let config = ExperimentConfig::default();
        assert_eq!(apply_overrides(config.clone(), &RunArgs::default()), config);
    }

    #[tokio::test]
    async fn test_excessive_attempts_rejected() {
        let args = RunArgs {
            bell: true,
            reference: Some(0.0),
            max_attempts: Some(100),
            ..RunArgs::default()
        };
        let err = execute(&args).await.unwrap_err();
        assert!(format!("{err:#}").contains("max_attempts"));
    }

    #[tokio::test]
    async fn test_bell_run_exports_report() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("bell.yaml");
        let report_path = dir.path().join("report.json");
        std::fs::write(
            &config_path,
            "backend: ideal_simulator\ncircuit:\n  kind: bell\nreference: 0.0\n",
        )
        .unwrap();

        let args = RunArgs {
            config: Some(config_path),
            export: Some(report_path.clone()),
            ..RunArgs::default()
        };
        execute(&args).await.unwrap();

        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
        assert_eq!(report["rows"].as_array().unwrap().len(), 3);
        assert_eq!(report["rows"][0]["estimate"], 0.0);
    }
}
