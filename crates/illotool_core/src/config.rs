use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://undraw.co/api/illustrations";
pub const DEFAULT_USER_AGENT: &str = "illotool/0.1";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub const DEFAULT_ASSETS_DIR: &str = "illustrations";
pub const DEFAULT_MAPPING_PATH: &str = "lib/illustrations.g.dart";
pub const DEFAULT_COLORS_REPORT: &str = "colors.json";
pub const DEFAULT_COLORS_PER_ASSET_REPORT: &str = "colors_illustration.json";

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct ToolConfig {
    #[serde(default)]
    pub catalog: CatalogSection,
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub mapping: MappingSection,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct CatalogSection {
    pub api_url: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct PathsSection {
    pub assets_dir: Option<String>,
    pub mapping_path: Option<String>,
    pub colors_report: Option<String>,
    pub colors_per_asset_report: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct MappingSection {
    /// Command run on the generated file after it is written, e.g. `["dart", "format"]`.
    #[serde(default)]
    pub format_command: Vec<String>,
}

impl ToolConfig {
    /// Resolve the catalog API URL: env ILLO_API_URL > config > DEFAULT_API_URL.
    pub fn api_url(&self) -> String {
        env_override("ILLO_API_URL")
            .or_else(|| self.catalog.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Resolve user agent: env ILLO_USER_AGENT > config > DEFAULT_USER_AGENT.
    pub fn user_agent(&self) -> String {
        env_override("ILLO_USER_AGENT")
            .or_else(|| self.catalog.user_agent.clone())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }

    pub fn timeout_ms(&self) -> u64 {
        env_override("ILLO_HTTP_TIMEOUT_MS")
            .and_then(|value| value.parse::<u64>().ok())
            .or(self.catalog.timeout_ms)
            .unwrap_or(DEFAULT_TIMEOUT_MS)
    }

    pub fn assets_dir(&self) -> &str {
        self.paths
            .assets_dir
            .as_deref()
            .unwrap_or(DEFAULT_ASSETS_DIR)
    }

    pub fn mapping_path(&self) -> &str {
        self.paths
            .mapping_path
            .as_deref()
            .unwrap_or(DEFAULT_MAPPING_PATH)
    }

    pub fn colors_report(&self) -> &str {
        self.paths
            .colors_report
            .as_deref()
            .unwrap_or(DEFAULT_COLORS_REPORT)
    }

    pub fn colors_per_asset_report(&self) -> &str {
        self.paths
            .colors_per_asset_report
            .as_deref()
            .unwrap_or(DEFAULT_COLORS_PER_ASSET_REPORT)
    }
}

/// Load and parse a ToolConfig from a TOML file. Returns default if file doesn't exist.
pub fn load_config(config_path: &Path) -> Result<ToolConfig> {
    if !config_path.exists() {
        return Ok(ToolConfig::default());
    }
    let content = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    let parsed: ToolConfig = toml::from_str(&content)
        .with_context(|| format!("failed to parse {}", config_path.display()))?;
    Ok(parsed)
}

fn env_override(key: &str) -> Option<String> {
    let value = env::var(key).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
