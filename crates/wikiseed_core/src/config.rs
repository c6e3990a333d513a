use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "https://en.wikipedia.org/w/api.php";
// Per WMF API etiquette, clients must identify themselves.
// https://meta.wikimedia.org/wiki/User-Agent_policy
pub const DEFAULT_USER_AGENT: &str = "wikiseed/0.2 (+https://github.com/remiliacorporation/wikiseed)";
pub const DEFAULT_TIMEOUT_MS: u64 = 20_000;
pub const DEFAULT_OUTPUT: &str = "wiki_seeds.csv";

/// Run settings resolved env > config file > built-in default. The crawl
/// itself takes no flags; these are the tunables around it.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct SeedConfig {
    #[serde(default)]
    pub wiki: WikiSection,
    #[serde(default)]
    pub crawl: CrawlSection,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct WikiSection {
    pub api_url: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct CrawlSection {
    pub timeout_ms: Option<u64>,
    pub output: Option<String>,
}

impl SeedConfig {
    pub fn api_url(&self) -> String {
        env_value("WIKI_API_URL")
            .or_else(|| self.wiki.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    pub fn user_agent(&self) -> String {
        env_value("WIKI_USER_AGENT")
            .or_else(|| self.wiki.user_agent.clone())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }

    pub fn timeout_ms(&self) -> u64 {
        env_value("WIKI_HTTP_TIMEOUT_MS")
            .and_then(|value| value.parse::<u64>().ok())
            .or(self.crawl.timeout_ms)
            .unwrap_or(DEFAULT_TIMEOUT_MS)
    }

    pub fn output(&self) -> String {
        env_value("WIKISEED_OUTPUT")
            .or_else(|| self.crawl.output.clone())
            .unwrap_or_else(|| DEFAULT_OUTPUT.to_string())
    }
}

/// Load a SeedConfig from a TOML file. A missing file yields the defaults.
pub fn load_config(config_path: &Path) -> Result<SeedConfig> {
    if !config_path.exists() {
        return Ok(SeedConfig::default());
    }
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let parsed: SeedConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    Ok(parsed)
}

fn env_value(key: &str) -> Option<String> {
    let value = env::var(key).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_API_URL, DEFAULT_OUTPUT, DEFAULT_TIMEOUT_MS, SeedConfig, load_config};

    #[test]
    fn defaults_apply_when_nothing_is_configured() {
        let config = SeedConfig::default();
        assert_eq!(config.api_url(), DEFAULT_API_URL);
        assert_eq!(config.timeout_ms(), DEFAULT_TIMEOUT_MS);
        assert_eq!(config.output(), DEFAULT_OUTPUT);
    }

    #[test]
    fn file_values_override_defaults() {
        let parsed: SeedConfig = toml::from_str(
            r#"
            [wiki]
            api_url = "https://de.wikipedia.org/w/api.php"
            user_agent = "seedbot/9.9"

            [crawl]
            timeout_ms = 5000
            output = "seeds.csv"
            "#,
        )
        .expect("parse");
        assert_eq!(parsed.api_url(), "https://de.wikipedia.org/w/api.php");
        assert_eq!(parsed.user_agent(), "seedbot/9.9");
        assert_eq!(parsed.timeout_ms(), 5_000);
        assert_eq!(parsed.output(), "seeds.csv");
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = load_config(&temp.path().join("absent.toml")).expect("load");
        assert_eq!(config, SeedConfig::default());
    }

    #[test]
    fn partial_config_keeps_defaults_for_missing_keys() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("wikiseed.toml");
        std::fs::write(&path, "[crawl]\ntimeout_ms = 1234\n").expect("write");
        let config = load_config(&path).expect("load");
        assert_eq!(config.timeout_ms(), 1_234);
        assert_eq!(config.api_url(), DEFAULT_API_URL);
    }
}
