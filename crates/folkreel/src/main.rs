//! Folkreel CLI binary.
//!
//! - `serve` runs the HTTP API with its reset jobs
//! - `generate` runs one pipeline locally

use clap::Parser;
use folkreel_server::FolkreelConfig;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, run_generate, run_serve};

    // Provider keys usually live in .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => FolkreelConfig::from_file(path)?,
        None => FolkreelConfig::load()?,
    };
    if cli.verbose {
        config.logging = config.logging.clone().with_level("debug");
    }

    #[cfg(feature = "observability")]
    let provider = folkreel::telemetry::init_observability(&config.logging)?;
    #[cfg(not(feature = "observability"))]
    folkreel_core::init_tracing(&config.logging)?;

    let result = match cli.command {
        Commands::Serve { bind } => run_serve(&config, bind).await,
        Commands::Generate { country, tier } => run_generate(&config, &country, tier).await,
    };

    #[cfg(feature = "observability")]
    folkreel::telemetry::shutdown_observability(provider);

    result?;
    Ok(())
}
