//! TOML configuration parsing and validation.
//!
//! ```toml
//! [db]
//! path = "./data/bones.sqlite"
//!
//! [bootstrap]
//! top_k = 10
//!
//! [logging]
//! level = "info"
//!
//! [aliases]
//! Phalanges_Hand = "Phalanges"
//! Tibia = "Tibiae"
//! ```

use anyhow::{Context, Result};
use bone_atlas_core::aggregate::LabelAliases;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Detector class name → catalog name rewrites.
    #[serde(default)]
    pub aliases: LabelAliases,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapConfig {
    /// Highest-confidence detections kept per image case.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Replaces the built-in question when the user asks nothing.
    #[serde(default)]
    pub default_question: Option<String>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            default_question: None,
        }
    }
}

fn default_top_k() -> usize {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

impl Config {
    /// Configuration for commands that run without a config file.
    pub fn minimal() -> Self {
        Self {
            db: DbConfig {
                path: PathBuf::from("./data/bones.sqlite"),
            },
            bootstrap: BootstrapConfig::default(),
            logging: LoggingConfig::default(),
            aliases: LabelAliases::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.bootstrap.top_k == 0 {
        anyhow::bail!("bootstrap.top_k must be >= 1");
    }

    if let Some(q) = &config.bootstrap.default_question {
        if q.trim().is_empty() {
            anyhow::bail!("bootstrap.default_question must not be blank when set");
        }
    }

    match config.logging.level.to_ascii_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        other => anyhow::bail!(
            "Unknown logging level: '{}'. Must be trace, debug, info, warn, or error.",
            other
        ),
    }

    Ok(config)
}
