use anyhow::Context;
use clap::Parser;
use dwd_heat_days::cli::{run, setup_logging, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.log_file.as_deref()).context("Failed to initialise logging")?;

    let command = command_name(&cli);
    run(cli)
        .await
        .with_context(|| format!("{} failed", command))
}

fn command_name(cli: &Cli) -> &'static str {
    use dwd_heat_days::cli::Commands;

    match cli.command {
        Commands::Fetch(_) => "fetch",
        Commands::Aggregate(_) => "aggregate",
        Commands::Geojoin => "geojoin",
        Commands::Run { .. } => "run",
        Commands::Info { .. } => "info",
    }
}
