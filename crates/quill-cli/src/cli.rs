//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Quill - Turn news sources into SEO-ready WordPress drafts.
#[derive(Debug, Parser)]
#[command(name = "quill")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path (default: ~/.quill/config.toml)
    #[arg(short, long, global = true, env = "QUILL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Session file path (default: ~/.quill/session.json)
    #[arg(long, global = true)]
    pub session: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract sources and generate an article
    Generate(GenerateArgs),

    /// Repair a malformed model response
    Repair(RepairArgs),

    /// Render an article to HTML
    Render(RenderArgs),

    /// Publish an article as a WordPress draft
    Publish(PublishArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Arguments for the generate command.
#[derive(Debug, Parser)]
pub struct GenerateArgs {
    /// Source URL (repeatable; YouTube links use the transcript)
    #[arg(short, long = "url", required_unless_present_any = ["text", "text_file"])]
    pub urls: Vec<String>,

    /// Primary SEO keyword
    #[arg(short, long)]
    pub keyword: String,

    /// Secondary keywords, comma separated
    #[arg(long, value_delimiter = ',')]
    pub secondary: Vec<String>,

    /// Angle the article should take
    #[arg(short, long, default_value = "")]
    pub angle: String,

    /// Number of body sections
    #[arg(long)]
    pub sections: Option<usize>,

    /// Extra source text
    #[arg(long)]
    pub text: Option<String>,

    /// File with extra source text
    #[arg(long)]
    pub text_file: Option<PathBuf>,

    /// Promotion to feature (from the configured catalog)
    #[arg(long)]
    pub promotion: Option<String>,

    /// Suffix the slug must end with
    #[arg(long)]
    pub slug_suffix: Option<String>,

    /// Write the article JSON here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Publish the article after generating it
    #[arg(long)]
    pub publish: bool,

    /// Site to publish to (default: default_site)
    #[arg(long)]
    pub site: Option<String>,

    /// Generate and upload a featured image when publishing
    #[arg(long)]
    pub image: bool,

    /// Accept leniently validated output when strict validation keeps failing
    #[arg(long)]
    pub lenient: bool,
}

/// Arguments for the repair command.
#[derive(Debug, Parser)]
pub struct RepairArgs {
    /// File with the raw response (reads stdin when omitted)
    pub file: Option<PathBuf>,

    /// Require a complete article instead of filling defaults
    #[arg(long)]
    pub strict: bool,

    /// Primary keyword for templated defaults
    #[arg(short, long, default_value = "")]
    pub keyword: String,
}

/// Arguments for the render command.
#[derive(Debug, Parser)]
pub struct RenderArgs {
    /// Article JSON file (default: the session's last article)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Site whose rendering options to apply
    #[arg(long)]
    pub site: Option<String>,

    /// Focus keyword
    #[arg(short, long, default_value = "")]
    pub keyword: String,

    /// Write the HTML here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the publish command.
#[derive(Debug, Parser)]
pub struct PublishArgs {
    /// Article JSON file (default: the session's last article)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Site to publish to (default: default_site)
    #[arg(long)]
    pub site: Option<String>,

    /// Focus keyword
    #[arg(short, long)]
    pub keyword: String,

    /// The article features a promotion (adds the disclosure note)
    #[arg(long)]
    pub promoted: bool,

    /// Generate and upload a featured image
    #[arg(long)]
    pub image: bool,
}

/// Arguments for configuration management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,
}
