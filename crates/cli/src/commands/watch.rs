use crate::context::{report, Context};
use appenv_env::MemorySink;
use appenv_utils::GuardOutcome;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Refresh every `interval` seconds until Ctrl-C.
///
/// Each tick starts a guarded pass in the background, so a tick that lands
/// while the previous pass is still running is skipped.
pub async fn execute(context: &Context, interval: u64) -> eyre::Result<ExitCode> {
    let engine = context.engine(Arc::new(MemorySink::new()))?;
    let batch = Arc::new(context.batch(None, Vec::new()));
    let cancel = CancellationToken::new();

    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted, stopping after in-flight keys finish");
            on_signal.cancel();
        }
    });

    let startup_delay = context.settings.startup_delay();
    if !startup_delay.is_zero() {
        tracing::info!(delay_ms = startup_delay.as_millis() as u64, "waiting before first refresh");
        tokio::select! {
            _ = tokio::time::sleep(startup_delay) => {}
            _ = cancel.cancelled() => return Ok(ExitCode::SUCCESS),
        }
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(interval));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut passes = JoinSet::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            Some(joined) = passes.join_next(), if !passes.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!(error = %e, "refresh task failed");
                }
            }
            _ = ticker.tick() => {
                let engine = engine.clone();
                let batch = batch.clone();
                let cancel = cancel.clone();
                passes.spawn(async move {
                    match engine.refresh(&batch, &cancel).await {
                        GuardOutcome::Executed(outcome) => report(&outcome),
                        GuardOutcome::Skipped => {
                            tracing::info!("previous refresh still running, skipping tick");
                        }
                    }
                });
            }
        }
    }

    while passes.join_next().await.is_some() {}
    Ok(ExitCode::SUCCESS)
}
