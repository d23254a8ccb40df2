//! Configuration for article generation

use crate::validate::Locale;
use quill_domain::ImageRef;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the [`ArticleGenerator`](crate::ArticleGenerator) and pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Model calls allowed per generation, counting every kind of failure
    pub max_attempts: u32,

    /// Backoff before the second attempt after a transport failure (milliseconds)
    pub base_delay_ms: u64,

    /// Upper bound on a single backoff delay (milliseconds)
    pub max_delay_ms: u64,

    /// Maximum time for a single model call (seconds)
    pub request_timeout_secs: u64,

    /// Language of templated defaults
    pub locale: Locale,

    /// Number of body sections requested from the model
    pub section_count: usize,

    /// Section cap when merging supplementary articles
    pub max_sections: usize,
}

impl GeneratorConfig {
    /// Get the per-call timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Backoff delay before retrying after failed attempt number `attempt`
    ///
    /// Doubles from `base_delay_ms` and is capped at `max_delay_ms`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let delay = self.base_delay_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(delay.min(self.max_delay_ms))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be greater than 0".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        if self.base_delay_ms > self.max_delay_ms {
            return Err("base_delay_ms cannot exceed max_delay_ms".to_string());
        }
        if self.section_count == 0 {
            return Err("section_count must be greater than 0".to_string());
        }
        if self.max_sections < self.section_count {
            return Err("max_sections cannot be less than section_count".to_string());
        }
        Ok(())
    }
}

impl Default for GeneratorConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1_000,
            max_delay_ms: 20_000,
            request_timeout_secs: 120,
            locale: Locale::Thai,
            section_count: 3,
            max_sections: 8,
        }
    }
}

impl GeneratorConfig {
    /// Aggressive preset: fewer attempts and short waits
    pub fn aggressive() -> Self {
        Self {
            max_attempts: 2,
            base_delay_ms: 250,
            max_delay_ms: 2_000,
            request_timeout_secs: 60,
            ..Self::default()
        }
    }

    /// Patient preset: more attempts and longer waits for flaky providers
    pub fn patient() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 4_000,
            max_delay_ms: 20_000,
            request_timeout_secs: 300,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

/// A promoted product whose banner is appended to generated articles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    /// Name used in prompts and to select the promotion
    pub name: String,
    /// Banner image URL
    pub image_url: String,
    /// Banner alt text
    #[serde(default)]
    pub alt: String,
    /// Banner width in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Banner height in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl Promotion {
    /// The banner as an article image
    pub fn image_ref(&self) -> ImageRef {
        ImageRef {
            url: self.image_url.clone(),
            alt_text: if self.alt.is_empty() {
                self.name.clone()
            } else {
                self.alt.clone()
            },
            placement: None,
            context: None,
            width: self.width,
            height: self.height,
        }
    }
}

/// Look up a promotion by name, ignoring case and surrounding whitespace
pub fn find_promotion<'a>(catalog: &'a [Promotion], name: &str) -> Option<&'a Promotion> {
    let name = name.trim();
    catalog.iter().find(|p| p.name.trim().eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(GeneratorConfig::aggressive().validate().is_ok());
        assert!(GeneratorConfig::patient().validate().is_ok());
    }

    #[test]
    fn test_invalid_max_attempts() {
        let config = GeneratorConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_delays() {
        let config = GeneratorConfig {
            base_delay_ms: 5_000,
            max_delay_ms: 1_000,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let config = GeneratorConfig {
            base_delay_ms: 1_000,
            max_delay_ms: 5_000,
            ..Default::default()
        };
        assert_eq!(config.backoff_delay(1), Duration::from_millis(1_000));
        assert_eq!(config.backoff_delay(2), Duration::from_millis(2_000));
        assert_eq!(config.backoff_delay(3), Duration::from_millis(4_000));
        assert_eq!(config.backoff_delay(4), Duration::from_millis(5_000));
        assert_eq!(config.backoff_delay(100), Duration::from_millis(5_000));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = GeneratorConfig::patient();
        let toml_str = config.to_toml().unwrap();
        let parsed = GeneratorConfig::from_toml(&toml_str).unwrap();

        assert_eq!(config.max_attempts, parsed.max_attempts);
        assert_eq!(config.base_delay_ms, parsed.base_delay_ms);
        assert_eq!(config.locale, parsed.locale);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed = GeneratorConfig::from_toml("max_attempts = 7\nlocale = \"english\"").unwrap();
        assert_eq!(parsed.max_attempts, 7);
        assert_eq!(parsed.locale, Locale::English);
        assert_eq!(parsed.section_count, 3);
    }

    #[test]
    fn test_find_promotion() {
        let catalog = vec![Promotion {
            name: "Best Wallet".to_string(),
            image_url: "https://cdn.example/best-wallet.png".to_string(),
            alt: String::new(),
            width: Some(600),
            height: Some(558),
        }];

        let promo = find_promotion(&catalog, " best wallet ").unwrap();
        let image = promo.image_ref();
        assert_eq!(image.alt_text, "Best Wallet");
        assert_eq!(image.width, Some(600));
        assert!(find_promotion(&catalog, "Solaxy").is_none());
    }
}
