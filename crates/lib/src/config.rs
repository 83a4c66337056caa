//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.anki-tools/config.json`) and environment.
//! Every field has a default, so a missing or empty file works against a stock AnkiConnect.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::anki::DEFAULT_ENDPOINT;
use crate::format::{QuestionFormatter, DEFAULT_VOCAB_MODELS};
use crate::session::DEFAULT_SETTLE_DELAY;

/// Top-level application config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// AnkiConnect connection settings.
    #[serde(default)]
    pub anki: AnkiConfig,

    /// Card presentation settings.
    #[serde(default)]
    pub cards: CardsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnkiConfig {
    /// AnkiConnect URL (default "http://127.0.0.1:8765"). Overridden by ANKI_CONNECT_URL env.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Milliseconds to wait after answering before fetching the next card (default 1000).
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_settle_delay_ms() -> u64 {
    DEFAULT_SETTLE_DELAY.as_millis() as u64
}

impl Default for AnkiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl AnkiConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardsConfig {
    /// Note types whose questions get the vocabulary prompt. Overridden by ANKI_VOCAB_MODELS env (comma-separated).
    #[serde(default = "default_vocab_models")]
    pub vocab_models: Vec<String>,
}

fn default_vocab_models() -> Vec<String> {
    DEFAULT_VOCAB_MODELS.iter().map(|s| s.to_string()).collect()
}

impl Default for CardsConfig {
    fn default() -> Self {
        Self {
            vocab_models: default_vocab_models(),
        }
    }
}

/// Resolve the AnkiConnect endpoint: env ANKI_CONNECT_URL overrides config.
pub fn resolve_endpoint(config: &Config) -> String {
    non_empty_env("ANKI_CONNECT_URL").unwrap_or_else(|| config.anki.endpoint.clone())
}

/// Resolve vocabulary models: env ANKI_VOCAB_MODELS (comma-separated) overrides config.
pub fn resolve_vocab_models(config: &Config) -> Vec<String> {
    non_empty_env("ANKI_VOCAB_MODELS")
        .map(|s| parse_model_list(&s))
        .filter(|models| !models.is_empty())
        .unwrap_or_else(|| config.cards.vocab_models.clone())
}

/// Formatter built from the resolved vocabulary models.
pub fn question_formatter(config: &Config) -> QuestionFormatter {
    QuestionFormatter::new(resolve_vocab_models(config))
}

fn parse_model_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect()
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("ANKI_TOOLS_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".anki-tools").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, else the default path (or ANKI_TOOLS_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        parse_config(&s).with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

fn parse_config(s: &str) -> Result<Config> {
    if s.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_json::from_str(s)?)
}

/// Create the config directory and write the default config if the file does not exist.
/// Returns the config directory.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if !config_path.exists() {
        let default_config = serde_json::to_string_pretty(&Config::default())?;
        std::fs::write(config_path, default_config)
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    } else {
        log::debug!("config already exists at {}, skipping", config_path.display());
    }
    Ok(config_dir.to_path_buf())
}
