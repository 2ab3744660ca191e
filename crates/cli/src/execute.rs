use crate::commands::{env_name, exec, init, list, refresh, watch, Commands};
use crate::context::Context;
use std::path::PathBuf;
use std::process::ExitCode;

impl Commands {
    pub async fn execute(self, config: Option<PathBuf>) -> eyre::Result<ExitCode> {
        match self {
            // Pure commands never read settings
            Commands::EnvName { keys } => env_name::execute(&keys),
            Commands::Init {
                endpoint,
                label,
                keys,
                force,
            } => init::execute(config, endpoint, label, keys, force),

            Commands::Refresh {
                label,
                keys,
                export,
            } => {
                let context = Context::load(config)?;
                refresh::execute(&context, label, keys, export).await
            }
            Commands::List { label, reveal } => {
                let context = Context::load(config)?;
                list::execute(&context, label, reveal).await
            }
            Commands::Watch { interval } => {
                let context = Context::load(config)?;
                watch::execute(&context, interval).await
            }
            Commands::Exec { command, args } => {
                let context = Context::load(config)?;
                exec::execute(&context, command, args).await
            }
        }
    }
}
