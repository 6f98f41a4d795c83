//! mitex command-line interface
//!
//! ```text
//! mitex run -c config/experiment.yaml      estimate under every mitigation config
//! mitex run --bell --reference 0.0         quick end-to-end check on the mock
//! mitex map --backend fake_eagle127        map the Bell circuit and show the layout
//! mitex backends                           built-in devices and providers
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{backends, map, run, version};

/// mitex - compare error-mitigation levels on an estimation backend
#[derive(Parser)]
#[command(name = "mitex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the ansatz under every mitigation configuration and compare
    Run(RunArgs),

    /// Map a circuit onto a device and show the result
    Map {
        /// Device name from the catalog
        #[arg(short, long, default_value = "fake_eagle127")]
        backend: String,

        /// Optimization level (0-3)
        #[arg(short = 'O', long, default_value = "1")]
        optimization_level: u8,

        /// Map the ansatz of this width instead of the measured Bell circuit
        #[arg(short, long)]
        num_qubits: Option<u32>,

        /// Ansatz repetitions
        #[arg(short, long, default_value = "4")]
        depth: u32,

        /// Write the mapped artifact as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List built-in devices and backend providers
    Backends,

    /// Show version information
    Version,
}

/// Options of `mitex run`. Flags override the configuration file and the
/// `MITEX_*` environment variables.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Experiment configuration (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Device name from the catalog
    #[arg(short, long)]
    pub backend: Option<String>,

    /// Backend provider that runs the jobs
    #[arg(long)]
    pub provider: Option<String>,

    /// Run the two-qubit Bell circuit instead of the ansatz
    #[arg(long)]
    pub bell: bool,

    /// Ansatz width
    #[arg(short, long)]
    pub num_qubits: Option<u32>,

    /// Ansatz repetitions
    #[arg(short, long)]
    pub depth: Option<u32>,

    /// Observable qubit (defaults to the second-to-last qubit)
    #[arg(long)]
    pub observable_qubit: Option<u32>,

    /// Parameter binding seed
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Half-width of the parameter sampling interval
    #[arg(long)]
    pub phi_max: Option<f64>,

    /// Optimization level (0-3)
    #[arg(short = 'O', long)]
    pub optimization_level: Option<u8>,

    /// Exact expectation value to compare against
    #[arg(short, long, allow_hyphen_values = true)]
    pub reference: Option<f64>,

    /// Submit all configurations at once
    #[arg(long)]
    pub concurrent: bool,

    /// Per-job timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Submissions per configuration, retries included (1-20)
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Disable dynamical decoupling
    #[arg(long)]
    pub no_dd: bool,

    /// Write the comparison report as JSON
    #[arg(short, long)]
    pub export: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Run(args) => run::execute(&args).await,

        Commands::Map {
            backend,
            optimization_level,
            num_qubits,
            depth,
            output,
        } => map::execute(&backend, optimization_level, num_qubits, depth, output.as_deref()),

        Commands::Backends => backends::execute().await,

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "mitex", "-vv", "run", "-c", "exp.yaml", "--bell", "-O", "3", "--reference", "-0.25",
            "--concurrent", "--timeout-ms", "5000",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config, Some(PathBuf::from("exp.yaml")));
        assert!(args.bell && args.concurrent && !args.no_dd);
        assert_eq!(args.optimization_level, Some(3));
        assert_eq!(args.reference, Some(-0.25));
        assert_eq!(args.timeout_ms, Some(5000));
    }

    #[test]
    fn test_parse_map_defaults() {
        let cli = Cli::try_parse_from(["mitex", "map"]).unwrap();
        let Commands::Map {
            backend,
            optimization_level,
            num_qubits,
            depth,
            output,
        } = cli.command
        else {
            panic!("expected map");
        };
        assert_eq!(backend, "fake_eagle127");
        assert_eq!(optimization_level, 1);
        assert_eq!(num_qubits, None);
        assert_eq!(depth, 4);
        assert!(output.is_none());
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["mitex", "submit"]).is_err());
    }
}
