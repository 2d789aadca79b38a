//! Configuration command handlers

use std::path::Path;
use tracing::info;

use crate::config::Settings;
use crate::utils::errors::{VpassError, Result};
use super::ConfigCommand;
use super::super::CliContext;

pub async fn handle_config(ctx: &mut CliContext, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Init { path, force } => write_default_config(&path, force).await,
        ConfigCommand::Show => {
            print!("{}", ctx.settings.to_toml()?);
            Ok(())
        }
    }
}

/// Write the default settings as TOML, refusing to overwrite unless `force`
pub async fn write_default_config(path: &Path, force: bool) -> Result<()> {
    if !force && tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(VpassError::Config(format!(
            "{} already exists, pass --force to overwrite",
            path.display()
        )));
    }

    let rendered = Settings::default().to_toml()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, rendered).await?;
    info!(path = %path.display(), "Wrote default configuration");
    println!("Wrote {}", path.display());
    Ok(())
}
