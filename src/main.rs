use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use idea_ranking::{
    config::{Config, LogFormat},
    listing::ListingParams,
    ranking::CriterionRegistry,
    server::{AppState, McpServer, SharedState},
    storage::SqliteStorage,
};

/// Idea listing service with per-session re-ranking.
#[derive(Parser, Debug)]
#[command(name = "idea-ranking", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Serve JSON-RPC requests over stdio (default)
    Serve,

    /// Print the ranked idea listing as JSON
    List {
        /// Criterion to rank by: comments, votes, age
        #[arg(long)]
        reorder: Option<String>,

        /// Session whose sort directions apply (and are updated)
        #[arg(long)]
        session: Option<String>,
    },

    /// Print the supported ranking criteria
    Criteria,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Criteria => {
            let registry = CriterionRegistry::new();
            println!("{}", serde_json::to_string_pretty(&registry.list())?);
        }
        Commands::List { reorder, session } => {
            let state = init_state(&config).await?;
            let params = ListingParams {
                reorder,
                session_id: session,
            };
            let listing = state.listing.list(&params).await?;
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        Commands::Serve => {
            let state = init_state(&config).await?;
            let server = McpServer::new(state);

            info!("Server ready, waiting for requests on stdin...");

            if let Err(e) = server.run().await {
                error!(error = %e, "Server error");
                return Err(e.into());
            }

            info!("Server shutdown complete");
        }
    }

    Ok(())
}

/// Open storage and build the shared application state
async fn init_state(config: &Config) -> anyhow::Result<SharedState> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Idea ranking service starting..."
    );

    let storage = match SqliteStorage::new(&config.database).await {
        Ok(s) => {
            info!(path = %config.database.path.display(), "Database initialized");
            s
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize database");
            return Err(e.into());
        }
    };

    Ok(Arc::new(AppState::new(storage)))
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
