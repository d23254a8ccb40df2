//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::QuillConfig;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use std::path::Path;

const REDACTED: &str = "********";

/// Copy of `config` with API keys and passwords masked.
pub fn redacted(mut config: QuillConfig) -> QuillConfig {
    let mask = |secret: &mut Option<String>| {
        if secret.is_some() {
            *secret = Some(REDACTED.to_string());
        }
    };
    mask(&mut config.gemini.api_key);
    mask(&mut config.together.api_key);
    mask(&mut config.jina.api_key);
    for site in config.sites.values_mut() {
        mask(&mut site.app_password);
    }
    config
}

/// Execute the config command.
pub fn execute_config(args: ConfigArgs, path: &Path, formatter: &Formatter) -> Result<()> {
    match args.action {
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::InvalidInput(format!(
                    "{} already exists; pass --force to overwrite",
                    path.display()
                )));
            }
            QuillConfig::default().save(path)?;
            eprintln!(
                "{}",
                formatter.success(&format!("Wrote {}", path.display()))
            );
        }
        ConfigAction::Show => {
            let config = redacted(QuillConfig::load(path)?);
            println!("{}", config.to_toml().map_err(CliError::Config)?);
        }
        ConfigAction::Path => println!("{}", path.display()),
    }
    Ok(())
}
