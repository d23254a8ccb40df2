//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use quill_generator::{GeneratorConfig, Promotion};
use quill_llm::{GeminiConfig, TogetherConfig};
use quill_publisher::SiteConfig;
use quill_sources::{JinaConfig, TranscriptConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration, stored as TOML.
///
/// Every section is optional; missing sections take their defaults. API keys
/// may be left out and supplied through `GEMINI_API_KEY`, `TOGETHER_API_KEY`
/// and `WP_APP_PASSWORD` instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuillConfig {
    /// Site used when a command does not name one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_site: Option<String>,

    /// Retry and prompt settings
    pub generator: GeneratorConfig,

    /// Text generation provider
    pub gemini: GeminiConfig,

    /// Image generation provider
    pub together: TogetherConfig,

    /// Web page reader
    pub jina: JinaConfig,

    /// YouTube caption fetcher
    pub transcripts: TranscriptConfig,

    /// Publishing targets by name
    pub sites: BTreeMap<String, SiteConfig>,

    /// Promotions an article may feature
    pub promotions: Vec<Promotion>,
}

impl QuillConfig {
    /// Default configuration file path (`~/.quill/config.toml`).
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".quill").join("config.toml"))
    }

    /// Load configuration from `path`, or defaults when the file is absent.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        let config: QuillConfig = toml::from_str(&contents)?;
        config.validate().map_err(CliError::Config)?;
        Ok(config)
    }

    /// Save configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = self.to_toml().map_err(CliError::Config)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Load from a TOML string
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize to a TOML string
    pub fn to_toml(&self) -> std::result::Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize TOML: {}", e))
    }

    /// Validate every section
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.generator
            .validate()
            .map_err(|e| format!("generator: {}", e))?;

        for (name, site) in &self.sites {
            site.validate().map_err(|e| format!("sites.{}: {}", name, e))?;
        }

        if let Some(name) = &self.default_site {
            if !self.sites.contains_key(name) {
                return Err(format!("default_site '{}' is not configured", name));
            }
        }

        for promotion in &self.promotions {
            if promotion.name.trim().is_empty() || promotion.image_url.trim().is_empty() {
                return Err("promotions need a name and an image_url".to_string());
            }
        }
        Ok(())
    }

    /// Look up a site by name, falling back to `default_site`.
    pub fn site<'a>(&'a self, name: Option<&'a str>) -> Result<(&'a str, &'a SiteConfig)> {
        let name = name.or(self.default_site.as_deref()).ok_or_else(|| {
            CliError::Config("No site given and no default_site configured".into())
        })?;
        self.sites
            .get(name)
            .map(|site| (name, site))
            .ok_or_else(|| CliError::Config(format!("Site '{}' not found", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
default_site = "icobench"

[generator]
max_attempts = 5
locale = "english"

[gemini]
model = "gemini-2.0-flash"

[sites.icobench]
base_url = "https://icobench.com"
language_path = "/th"
username = "editor"

[sites.icobench.categories]
Bitcoin = 7
Dogecoin = 527

[[promotions]]
name = "Best Wallet"
image_url = "https://cdn.example/best-wallet.png"
alt = "Best Wallet"
width = 600
height = 558
"#;

    #[test]
    fn test_default_config() {
        let config = QuillConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.sites.is_empty());
        assert_eq!(config.generator.max_attempts, 3);
    }

    #[test]
    fn test_parse_sample() {
        let config = QuillConfig::from_toml(SAMPLE).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.generator.max_attempts, 5);
        // Unspecified fields keep their defaults
        assert_eq!(config.generator.section_count, 3);
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.promotions[0].width, Some(600));

        let (name, site) = config.site(None).unwrap();
        assert_eq!(name, "icobench");
        assert_eq!(site.categories_for("bitcoin"), vec![7]);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = QuillConfig::from_toml(SAMPLE).unwrap();
        let toml_str = config.to_toml().unwrap();
        let parsed = QuillConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed.sites, config.sites);
        assert_eq!(parsed.promotions, config.promotions);
        assert_eq!(parsed.default_site, config.default_site);
    }

    #[test]
    fn test_unknown_site() {
        let config = QuillConfig::from_toml(SAMPLE).unwrap();
        assert!(matches!(
            config.site(Some("newsbtc")),
            Err(CliError::Config(_))
        ));
        assert!(QuillConfig::default().site(None).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_sections() {
        let mut config = QuillConfig::from_toml(SAMPLE).unwrap();
        config.default_site = Some("missing".to_string());
        assert!(config.validate().is_err());

        let mut config = QuillConfig::from_toml(SAMPLE).unwrap();
        config.generator.max_attempts = 0;
        assert!(config.validate().unwrap_err().starts_with("generator:"));

        let mut config = QuillConfig::from_toml(SAMPLE).unwrap();
        if let Some(site) = config.sites.get_mut("icobench") {
            site.base_url = "not a url".to_string();
        }
        assert!(config.validate().unwrap_err().starts_with("sites.icobench:"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = QuillConfig::from_toml(SAMPLE).unwrap();
        config.save(&path).unwrap();

        let loaded = QuillConfig::load(&path).unwrap();
        assert_eq!(loaded.sites, config.sites);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = QuillConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert!(config.sites.is_empty());
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[generator]\nmax_attempts = \"three\"\n").unwrap();
        assert!(matches!(QuillConfig::load(&path), Err(CliError::Toml(_))));
    }
}
