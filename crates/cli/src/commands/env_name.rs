use appenv_core::derive_env_name;
use std::process::ExitCode;

pub fn execute(keys: &[String]) -> eyre::Result<ExitCode> {
    for line in render(keys) {
        println!("{line}");
    }
    Ok(ExitCode::SUCCESS)
}

fn render(keys: &[String]) -> Vec<String> {
    keys.iter()
        .map(|key| format!("{key}\t{}", derive_env_name(key)))
        .collect()
}
