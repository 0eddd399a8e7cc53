//! Ridefleet unified CLI.
//!
//! Cross-region ride handoff coordination over two-phase commit.
//!
//! # Quick Start
//!
//! ```bash
//! # Start two region participants
//! ridefleet region start --name us-west --address 9001
//! ridefleet region start --name us-east --address 9002
//!
//! # Start the coordinator (reads ridefleet.toml for the regions table)
//! ridefleet coordinator start --address 8080
//!
//! # Hand a ride off between regions
//! ridefleet handoff ride-42 --from us-west --to us-east --coordinator 127.0.0.1:8080
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ridefleet")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Region participant commands.
    #[command(subcommand)]
    Region(RegionCommands),

    /// Coordinator commands.
    #[command(subcommand)]
    Coordinator(CoordinatorCommands),

    /// Submit a single ride handoff to a running coordinator.
    Handoff {
        /// Ride id to hand off.
        ride_id: String,

        /// Source region.
        #[arg(long)]
        from: String,

        /// Target region.
        #[arg(long)]
        to: String,

        /// Coordinator address.
        #[arg(long, default_value = "127.0.0.1:8080")]
        coordinator: String,
    },

    /// List recent transactions from a running coordinator.
    Transactions {
        /// Coordinator address.
        #[arg(long, default_value = "127.0.0.1:8080")]
        coordinator: String,

        /// Maximum number of records to return.
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum RegionCommands {
    /// Run a region participant HTTP server.
    Start {
        /// Region name.
        #[arg(long)]
        name: String,

        /// Address to bind to (port only: 9001, or full: 127.0.0.1:9001).
        #[arg(long, default_value = "9001")]
        address: String,

        /// Directory for the region's persisted snapshot. Omit for an
        /// in-memory store that does not survive a restart.
        #[arg(long)]
        data_dir: Option<String>,
    },
}

#[derive(Subcommand)]
enum CoordinatorCommands {
    /// Run the coordinator and query router HTTP server.
    Start {
        /// Address to bind to (port only: 8080, or full: 127.0.0.1:8080).
        #[arg(long, default_value = "8080")]
        address: String,

        /// Path to a `ridefleet.toml` project config file. If its
        /// directory also holds a `ridefleet.local.toml`, that overrides
        /// it; `RIDEFLEET_*` environment variables override both.
        #[arg(long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Region(RegionCommands::Start { name, address, data_dir }) => {
            commands::region::start(&name, &address, data_dir.as_deref()).await
        }
        Commands::Coordinator(CoordinatorCommands::Start { address, config }) => {
            commands::coordinator::start(&address, config.as_deref()).await
        }
        Commands::Handoff { ride_id, from, to, coordinator } => {
            commands::handoff::run(&coordinator, &ride_id, &from, &to).await
        }
        Commands::Transactions { coordinator, limit } => {
            commands::transactions::run(&coordinator, limit).await
        }
    }
}
