use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod context;
mod execute;
mod formatters;

use commands::Commands;

#[derive(Parser)]
#[command(name = "appenv")]
#[command(
    about = "Resolve configuration store keys into environment variables",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Settings file (defaults to ./appenv.json, or $APPENV_CONFIG)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> eyre::Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();

    appenv_utils::tracing::init(appenv_utils::tracing::level_for_verbosity(cli.verbose))
        .map_err(|e| eyre::eyre!("failed to initialise logging: {e}"))?;

    cli.command.execute(cli.config).await
}
