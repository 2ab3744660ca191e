use appenv_config::{Settings, SettingsLoader};
use eyre::bail;
use std::path::PathBuf;
use std::process::ExitCode;

pub fn execute(
    config: Option<PathBuf>,
    endpoint: String,
    label: String,
    keys: Vec<String>,
    force: bool,
) -> eyre::Result<ExitCode> {
    let mut loader = SettingsLoader::new();
    if let Some(path) = config {
        loader = loader.path(path);
    }
    let (path, _) = loader.resolve_path();

    if path.exists() && !force {
        bail!("{} already exists. Use --force to overwrite.", path.display());
    }

    let settings = Settings {
        endpoint: Some(endpoint),
        label,
        keys,
        ..Settings::default()
    };
    settings.validate()?;
    settings.save(&path)?;

    eprintln!("Created {}", path.display());
    eprintln!("Set APPENV_ACCESS_TOKEN, then run 'appenv refresh'.");
    Ok(ExitCode::SUCCESS)
}
