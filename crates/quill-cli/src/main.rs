//! Quill CLI - Turn news sources into SEO-ready WordPress drafts.

use clap::Parser;
use quill_cli::commands;
use quill_cli::session::default_session_path;
use quill_cli::{Cli, CliError, Command, Formatter, QuillConfig};
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    // Logs go to stderr; stdout carries the article JSON and HTML
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> quill_cli::Result<()> {
    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => QuillConfig::default_path()?,
    };
    let session_path = match &cli.session {
        Some(path) => path.clone(),
        None => default_session_path()?,
    };
    let formatter = Formatter::new(!cli.no_color);

    let explicit = cli.config.is_some();

    match cli.command {
        // `config` manages the file itself, so it must not require a valid one
        Command::Config(args) => {
            commands::execute_config(args, &config_path, &formatter)?;
        }
        Command::Generate(args) => {
            let config = load_config(&config_path, explicit)?;
            commands::execute_generate(args, &config, &session_path, &formatter).await?;
        }
        Command::Repair(args) => {
            commands::execute_repair(args, &formatter)?;
        }
        Command::Render(args) => {
            let config = load_config(&config_path, explicit)?;
            commands::execute_render(args, &config, &session_path)?;
        }
        Command::Publish(args) => {
            let config = load_config(&config_path, explicit)?;
            commands::execute_publish(args, &config, &session_path, &formatter).await?;
        }
    }

    Ok(())
}

/// Load the config; a path given explicitly must exist.
fn load_config(path: &Path, explicit: bool) -> quill_cli::Result<QuillConfig> {
    if explicit && !path.exists() {
        return Err(CliError::Config(format!(
            "Config file {} does not exist",
            path.display()
        )));
    }
    QuillConfig::load(path)
}
