use crate::context::{exit_code, report, Context};
use crate::formatters::export_line;
use appenv_env::MemorySink;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub async fn execute(
    context: &Context,
    label: Option<String>,
    keys: Vec<String>,
    export: bool,
) -> eyre::Result<ExitCode> {
    let sink = Arc::new(MemorySink::new());
    let engine = context.engine(sink.clone())?;
    let batch = context.batch(label, keys);

    let Some(outcome) = engine
        .refresh(&batch, &CancellationToken::new())
        .await
        .into_option()
    else {
        // Only reachable if another task shares this engine
        tracing::warn!("a refresh is already running");
        return Ok(ExitCode::FAILURE);
    };

    if export {
        let mut values: Vec<_> = sink.snapshot().into_iter().collect();
        values.sort();
        for (name, value) in &values {
            println!("{}", export_line(name, value));
        }
    }

    report(&outcome);
    Ok(exit_code(&outcome))
}
