//! CLI entry point for girbind.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

/// girbind — generate TypeScript bindings from GIR XML.
#[derive(Parser, Debug)]
#[command(name = "girbind", version, about)]
struct Cli {
    /// Path to the girbind.toml configuration file.
    #[arg(default_value = "girbind.toml")]
    config: PathBuf,

    /// Output directory (overrides config).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("girbind=info")),
        )
        .init();

    let cli = Cli::parse();
    let report = girbind::run(&cli.config, cli.output.as_deref())?;

    let failures: Vec<_> = report.failed_units().collect();
    if !failures.is_empty() {
        for unit in &failures {
            tracing::warn!(
                unit = %unit.qualified_name,
                reason = unit.reason.as_deref().unwrap_or("unknown"),
                "unit skipped"
            );
        }
    }
    Ok(())
}
