//! Configuration parsing and validation.
//!
//! Memoir Harness is configured via a TOML file (default `config/memoir.toml`).
//! Every section is optional; missing values fall back to the defaults below.
//!
//! ```toml
//! [flow]
//! consecutive_limit = 6
//! engagement_low = 0.5
//!
//! [context]
//! radius = 500
//!
//! [history]
//! max_entries = 50
//!
//! [logging]
//! level = "warn"
//! ```

use anyhow::{Context, Result};
use memoir_core::context::DEFAULT_CONTEXT_RADIUS;
use memoir_core::store::DEFAULT_MAX_HISTORY;
use memoir_core::FlowThresholds;
use serde::Deserialize;
use std::path::Path;

/// Smallest and largest context radius accepted in `[context]`.
pub const MIN_CONTEXT_RADIUS: usize = 200;
pub const MAX_CONTEXT_RADIUS: usize = 500;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub flow: FlowThresholds,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContextConfig {
    #[serde(default = "default_radius")]
    pub radius: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            radius: default_radius(),
        }
    }
}

fn default_radius() -> usize {
    DEFAULT_CONTEXT_RADIUS
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

fn default_max_entries() -> usize {
    DEFAULT_MAX_HISTORY
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
    "warn".to_string()
}

impl Config {
    /// Built-in defaults, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }
}

/// Load the config at `path`, or defaults if the file does not exist.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::minimal())
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let flow = &config.flow;

    // Validate flow
    if flow.window == 0 {
        anyhow::bail!("flow.window must be > 0");
    }
    if flow.topic_span == 0 || flow.engagement_span == 0 {
        anyhow::bail!("flow.topic_span and flow.engagement_span must be > 0");
    }
    if flow.consecutive_limit == 0 {
        anyhow::bail!("flow.consecutive_limit must be > 0");
    }
    for (name, value) in [
        ("decline_percent", flow.decline_percent),
        ("significant_decline_percent", flow.significant_decline_percent),
    ] {
        if !(0.0..=100.0).contains(&value) {
            anyhow::bail!("flow.{} must be in [0, 100]", name);
        }
    }
    if flow.increase_percent < 0.0 {
        anyhow::bail!("flow.increase_percent must be >= 0");
    }
    if flow.engagement_low > flow.engagement_high {
        anyhow::bail!("flow.engagement_low must be <= flow.engagement_high");
    }

    // Validate context
    if !(MIN_CONTEXT_RADIUS..=MAX_CONTEXT_RADIUS).contains(&config.context.radius) {
        anyhow::bail!(
            "context.radius must be in [{}, {}]",
            MIN_CONTEXT_RADIUS,
            MAX_CONTEXT_RADIUS
        );
    }

    // Validate history
    if config.history.max_entries == 0 {
        anyhow::bail!("history.max_entries must be > 0");
    }

    match config.logging.level.to_ascii_lowercase().as_str() {
        "error" | "warn" | "info" | "debug" | "trace" => {}
        other => anyhow::bail!(
            "Unknown logging level: '{}'. Must be error, warn, info, debug, or trace.",
            other
        ),
    }

    Ok(())
}
