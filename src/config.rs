use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8069";
pub const DEFAULT_GREETING: &str = "Hello! I'm the Dragon Coders assistant. How can I help you today?";

/// A canned message bound to a shortcut. Sent as-is, bypassing the input box.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct QuickReply {
    pub label: String,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub server_url: Option<String>,
    pub greeting: Option<String>,
    #[serde(default)]
    pub quick_replies: Vec<QuickReply>,
}

impl Config {
    pub fn new() -> Self {
        Self {
            server_url: None,
            greeting: None,
            quick_replies: vec![
                QuickReply {
                    label: "Services".to_string(),
                    message: "What services does Dragon Coders offer?".to_string(),
                },
                QuickReply {
                    label: "Pricing".to_string(),
                    message: "How is your pricing structured?".to_string(),
                },
                QuickReply {
                    label: "Docs".to_string(),
                    message: "Where can I find the documentation?".to_string(),
                },
            ],
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load the config, writing out the defaults on first run.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::new();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn server_url(&self) -> &str {
        self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn greeting(&self) -> &str {
        self.greeting.as_deref().unwrap_or(DEFAULT_GREETING)
    }

    fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Log file next to the config; stderr belongs to the TUI.
    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("dragon-chat.log"))
    }

    fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("dragon-chat"))
    }
}
