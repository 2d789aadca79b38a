//! VPass command line client
//!
//! Main application entry point

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use vpass::{
    config::Settings,
    handlers::{handle_command, CliContext, Command},
    state::alert_text,
    utils::logging,
};

#[derive(Parser)]
#[command(name = "vpass")]
#[command(version, about = "VPass event attendance and certificate client")]
struct Cli {
    /// Configuration file, extension optional
    #[arg(long, global = true, default_value = "config")]
    config: String,
    /// Override the backend base URL
    #[arg(long, global = true, env = "VPASS_API_URL")]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let mut settings = Settings::from_file(&cli.config).context("failed to load configuration")?;
    if let Some(api_url) = cli.api_url {
        settings.api.base_url = api_url;
    }
    settings.validate().context("invalid configuration")?;

    // Initialize logging; the guard flushes the file writer on exit
    let guard = logging::init_logging(&settings.logging).context("failed to initialize logging")?;
    info!(version = vpass::VERSION, base_url = %settings.api.base_url, "Starting {}", vpass::info());

    let mut ctx = CliContext::new(settings).await.context("failed to start client")?;
    let action = cli.command.action();

    if let Err(e) = handle_command(&mut ctx, cli.command).await {
        warn!(error = %e, severity = %e.severity(), "Command failed");
        let message = match action {
            Some(action) => alert_text(action, &e),
            None => e.user_message(&e.to_string()),
        };
        eprintln!("{}", message);
        drop(ctx);
        drop(guard);
        std::process::exit(1);
    }

    Ok(())
}
