use crate::context::{exit_code, report, Context};
use crate::formatters::{KeyTree, TreeChars, MASK};
use appenv_core::ConfigEntry;
use appenv_env::MemorySink;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub async fn execute(
    context: &Context,
    label: Option<String>,
    reveal: bool,
) -> eyre::Result<ExitCode> {
    let engine = context.engine(Arc::new(MemorySink::new()))?;
    let batch = context.batch(label, Vec::new());
    let outcome = engine.resolve(&batch, &CancellationToken::new()).await;

    let mut tree = KeyTree::new();
    for entry in &outcome.items {
        tree.insert(entry.key(), describe(entry, reveal));
    }
    for (key, error) in &outcome.errors {
        tree.insert(key, format!("<{}>", error.kind()));
    }
    print!("{}", tree.render(&TreeChars::detect()));

    report(&outcome);
    Ok(exit_code(&outcome))
}

fn describe(entry: &ConfigEntry, reveal: bool) -> String {
    let value = if entry.is_secret_reference() && !reveal {
        MASK
    } else {
        entry.resolved_value()
    };
    format!("{value}  [{}]", entry.env_name())
}
