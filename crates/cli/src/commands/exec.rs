use crate::context::{report, Context};
use appenv_core::Error;
use appenv_env::MemorySink;
use std::process::{Command, ExitCode};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Resolve into memory, then run `command` with the values added to its
/// environment. This process's own environment is left untouched.
///
/// The command runs even when some keys failed; those variables are simply
/// absent. The exit code is the child's.
pub async fn execute(context: &Context, command: String, args: Vec<String>) -> eyre::Result<ExitCode> {
    let sink = Arc::new(MemorySink::new());
    let engine = context.engine(sink.clone())?;
    let batch = context.batch(None, Vec::new());
    let outcome = engine.resolve(&batch, &CancellationToken::new()).await;
    if !outcome.is_complete_success() {
        report(&outcome);
    }

    let values = sink.snapshot();
    tracing::debug!(command = %command, args = args.len(), variables = values.len(), "running command");
    let status = tokio::task::spawn_blocking(move || {
        Command::new(&command)
            .args(&args)
            .envs(values)
            .status()
            .map_err(|e| Error::configuration(format!("failed to run '{command}': {e}")))
    })
    .await??;

    let code = status.code().unwrap_or(1);
    Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
}
