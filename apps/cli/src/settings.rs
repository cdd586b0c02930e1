use std::{path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use notion_client::{ClientConfig, RetryPolicy};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "NOTION";
const DEFAULT_CONFIG_FILE: &str = "notion-blocks";

/// Connection settings merged from an optional config file and `NOTION_*`
/// environment variables (environment wins).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub api_version: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
}

impl Settings {
    /// Loads `path` when given, otherwise `notion-blocks.{toml,json,...}` from
    /// the working directory if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(prefix).try_parsing(true))
            .build()
            .context("failed to load settings")?
            .try_deserialize()
            .context("invalid settings")
    }

    pub fn client_config(&self) -> Result<ClientConfig> {
        let Some(api_key) = self.api_key.clone().filter(|key| !key.trim().is_empty()) else {
            bail!(
                "no Notion API key configured; set {ENV_PREFIX}_API_KEY or `api_key` in the config file"
            );
        };

        let mut config = ClientConfig::new(api_key);
        if let Some(base_url) = &self.base_url {
            config.base_url.clone_from(base_url);
        }
        if let Some(api_version) = &self.api_version {
            config.api_version.clone_from(api_version);
        }
        if let Some(timeout) = self.timeout_secs {
            config.timeout = Duration::from_secs(timeout);
        }
        if let Some(max_attempts) = self.max_attempts {
            config.retry = RetryPolicy {
                max_attempts: max_attempts.max(1),
                ..config.retry
            };
        }
        Ok(config)
    }
}
