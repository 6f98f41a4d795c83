//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - error-mitigation comparison harness",
        style("mitex").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  mitex-ir        Circuit and observable representation");
    println!("  mitex-compile   Mapping onto device topologies and gate sets");
    println!("  mitex-hal       Device descriptions and estimation jobs");
    println!("  mitex-runner    Ansatz, binding, mitigation runs and reports");
    println!("  mitex-cli       Command-line interface");
    println!();
    println!(
        "Repository: {}",
        style("https://github.com/mitex-lab/mitex").underlined()
    );
    println!("License:    {}", style("Apache-2.0").dim());
}
