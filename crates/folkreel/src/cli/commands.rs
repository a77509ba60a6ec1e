//! CLI command definitions.

use clap::{Parser, Subcommand};
use folkreel_core::SubscriptionTier;
use std::path::PathBuf;

/// Folkreel - folk tales, voiceovers and scenes under a generation quota
#[derive(Parser, Debug)]
#[command(name = "folkreel")]
#[command(about = "Folk tale, voiceover and scene generation under a generation quota", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file replacing the layered lookup
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Listen address, overriding `[server] bind`
        #[arg(long)]
        bind: Option<String>,
    },

    /// Run one generation locally and print where the artifacts went
    Generate {
        /// Country to draw the folk tale from
        #[arg(long)]
        country: String,

        /// Tier of the throwaway account running the generation
        #[arg(long, default_value = "premium")]
        tier: SubscriptionTier,
    },
}
