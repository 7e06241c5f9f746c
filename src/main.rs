//! Design Influence - Main Entry Point
//!
//! Sensitivity analysis of Hamiltonian parameters against design parameters.

use clap::Parser;
use design_influence::cli::{cmd_analyze, cmd_info, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "design_influence=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => cmd_analyze(&args)?,
        Commands::Info(args) => cmd_info(&args)?,
    }

    Ok(())
}
