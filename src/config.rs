use std::path::PathBuf;

use eyre::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::service::PREFERRED_LANGS;

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Address the server listens on
    pub bind: Option<String>,
    /// Languages tried on the first attempt, highest priority first
    pub preferred_langs: Option<Vec<String>>,
    /// Server `fetch` talks to; in-process when unset
    pub server_url: Option<String>,
}

impl Config {
    /// Load config from ~/.config/ytsub/config.toml if it exists
    pub fn load() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            debug!("Loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            debug!("No config file found at {}", path.display());
            Ok(Config::default())
        }
    }

    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or(DEFAULT_BIND)
    }

    pub fn preferred_langs(&self) -> Vec<String> {
        match &self.preferred_langs {
            Some(langs) if !langs.is_empty() => langs.clone(),
            _ => PREFERRED_LANGS.iter().map(|l| l.to_string()).collect(),
        }
    }
}

pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("ytsub")
        .join("config.toml")
}
