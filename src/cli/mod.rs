//! CLI for operating the roadbook cache
//!
//! - `sweep`: rebuild the cached views of one or every entity kind
//! - `flush`: drop the cached views of one or every entity kind
//! - `check`: show the resolved backends and test connectivity

pub mod check;
pub mod flush;
pub mod sweep;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;
use crate::domain::EntityKind;
use crate::infrastructure::logging;

/// Roadbook - cache-coherent persistence core for a travel planner
#[derive(Parser)]
#[command(name = "roadbook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Rebuild cached views from the store
    Sweep {
        /// Entity kind (user, travel, step, subscription, preference); all when omitted
        #[arg(long)]
        kind: Option<EntityKind>,
    },

    /// Drop cached views without touching the store
    Flush {
        /// Entity kind; all when omitted
        #[arg(long)]
        kind: Option<EntityKind>,
    },

    /// Print the resolved configuration and test connectivity
    Check,
}

/// Loads `.env` and configuration, then installs logging
pub(crate) fn bootstrap() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    Ok(config)
}

/// The selected kind, or every kind
pub(crate) fn kinds(kind: Option<EntityKind>) -> Vec<EntityKind> {
    match kind {
        Some(kind) => vec![kind],
        None => EntityKind::ALL.to_vec(),
    }
}
