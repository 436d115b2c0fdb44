//! Configuration handling for Sublim
//!
//! Shop configuration lives in `.sublim/config.toml`: working hours, the
//! per-garment time catalog and the list of designers. User preferences live
//! in `~/.config/sublim/config.toml` (global).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{TimeCatalog, WorkCalendar, WorkCalendarConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Shop-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Designers orders can be assigned to
    pub designers: Vec<String>,

    /// Working hours used for delivery projection
    pub calendar: WorkCalendarConfig,

    /// Minutes per garment type
    pub catalog: TimeCatalog,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            designers: Vec::new(),
            calendar: WorkCalendarConfig::default(),
            catalog: TimeCatalog::default(),
        }
    }
}

impl ShopConfig {
    /// Builds the validated work calendar
    pub fn work_calendar(&self) -> Result<WorkCalendar> {
        WorkCalendar::new(self.calendar)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
            .context("Invalid [calendar] section in shop config")
    }

    /// Checks calendar and catalog
    pub fn validate(&self) -> Result<()> {
        self.work_calendar()?;
        self.catalog
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
            .context("Invalid [catalog] section in shop config")?;
        Ok(())
    }

    pub fn has_designer(&self, name: &str) -> bool {
        self.designers.iter().any(|d| d.eq_ignore_ascii_case(name))
    }

    /// Adds a designer, returning false if already listed
    pub fn add_designer(&mut self, name: &str) -> bool {
        if self.has_designer(name) {
            return false;
        }
        self.designers.push(name.to_string());
        true
    }

    /// Removes a designer, returning false if not listed
    pub fn remove_designer(&mut self, name: &str) -> bool {
        let before = self.designers.len();
        self.designers.retain(|d| !d.eq_ignore_ascii_case(name));
        self.designers.len() != before
    }
}

/// Global user configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GlobalConfig {
    /// Default output format (text or json)
    pub default_format: OutputFormat,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Combined configuration (global + shop)
#[derive(Debug, Clone)]
pub struct Config {
    pub shop: ShopConfig,
    pub global: GlobalConfig,
    pub shop_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration for a specific shop
    pub fn for_shop(shop_root: &Path) -> Result<Self> {
        let global = Self::load_global()?;
        let shop = Self::load_shop_config(shop_root)?;

        Ok(Self {
            shop,
            global,
            shop_root: Some(shop_root.to_path_buf()),
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "sublim", "sublim-cli").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Loads global configuration
    pub fn load_global() -> Result<GlobalConfig> {
        let config_dir = match Self::global_config_dir() {
            Some(dir) => dir,
            None => return Ok(GlobalConfig::default()),
        };

        let config_path = config_dir.join("config.toml");
        if !config_path.exists() {
            return Ok(GlobalConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read global config: {}", config_path.display()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse global config")
    }

    /// Loads and validates shop configuration from a specific root
    fn load_shop_config(shop_root: &Path) -> Result<ShopConfig> {
        let config_path = Self::shop_config_path(shop_root);

        if !config_path.exists() {
            return Ok(ShopConfig::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read shop config: {}", config_path.display()))?;

        let config: ShopConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse shop config")?;

        config.validate()?;
        tracing::debug!(path = %config_path.display(), "loaded shop config");
        Ok(config)
    }

    fn shop_config_path(shop_root: &Path) -> PathBuf {
        shop_root.join(".sublim").join("config.toml")
    }

    /// Finds the shop root by looking for a `.sublim/` directory
    pub fn find_shop_root() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            if current.join(".sublim").is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Returns the shop root, or an error if not in a shop directory
    pub fn require_shop_root(&self) -> Result<&Path> {
        self.shop_root
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Not in a sublim shop. Run 'sublim init' first."))
    }

    /// Validates and saves the shop configuration
    pub fn save_shop(&self) -> Result<()> {
        self.shop.validate()?;

        let root = self.require_shop_root()?;
        let config_path = Self::shop_config_path(root);

        let content =
            toml::to_string_pretty(&self.shop).context("Failed to serialize shop config")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write shop config: {}", config_path.display()))
    }
}
