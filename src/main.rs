use clap::Parser;
use roadbook::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Sweep { kind } => cli::sweep::run(kind).await,
        Command::Flush { kind } => cli::flush::run(kind).await,
        Command::Check => cli::check::run().await,
    }
}
