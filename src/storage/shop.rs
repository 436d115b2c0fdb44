//! Shop management
//!
//! Handles shop initialization and provides access to the order store.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::{Config, OrderStore};
use crate::domain::WorkCalendar;

#[derive(Debug, Error)]
pub enum ShopError {
    #[error("Not in a sublim shop. Run 'sublim init' first.")]
    NotInShop,

    #[error("Unknown designer '{0}'. Add it with 'sublim settings designer add'.")]
    UnknownDesigner(String),
}

const DEFAULT_CONFIG: &str = r#"# Sublim shop configuration

# Designers orders can be assigned to (empty list accepts any name)
designers = []

# Working day used to project delivery dates (hours, 24h clock)
[calendar]
start_hour = 8
end_hour = 18
lunch_start = 13
lunch_end = 14

# Per-garment minutes live under [catalog.<garment>]. Leave this out to use
# the built-in catalog, or set individual values with
# 'sublim settings set-time GARMENT COMPONENT MINUTES'.
"#;

const GITIGNORE: &str = r#"# Lock and temp files used while writing orders
orders.lock
*.tmp
"#;

/// A Sublim shop directory
pub struct Shop {
    root: PathBuf,
    config: Config,
}

impl Shop {
    /// Opens an existing shop at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.join(".sublim").is_dir() {
            return Err(ShopError::NotInShop.into());
        }

        let config = Config::for_shop(&root)?;
        Ok(Self { root, config })
    }

    /// Opens the shop at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_shop_root().ok_or(ShopError::NotInShop)?;
        Self::open(root)
    }

    /// Initializes a new shop at the given path
    ///
    /// Existing files are left alone, so running it twice is harmless.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let sublim_dir = root.join(".sublim");

        fs::create_dir_all(&sublim_dir).with_context(|| {
            format!("Failed to create .sublim directory: {}", sublim_dir.display())
        })?;

        let config_path = sublim_dir.join("config.toml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = sublim_dir.join(".gitignore");
        if !gitignore_path.exists() {
            fs::write(&gitignore_path, GITIGNORE).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        tracing::info!(root = %root.display(), "shop initialized");
        Self::open(root)
    }

    /// Returns the shop root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .sublim directory path
    pub fn sublim_dir(&self) -> PathBuf {
        self.root.join(".sublim")
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Returns the order store
    pub fn order_store(&self) -> OrderStore {
        OrderStore::for_shop(&self.root)
    }

    /// Returns the configured work calendar
    pub fn work_calendar(&self) -> Result<WorkCalendar> {
        self.config.shop.work_calendar()
    }

    /// Resolves a designer name against the configured list
    ///
    /// Returns the spelling from the list. An empty list accepts any name.
    pub fn resolve_designer(&self, name: &str) -> Result<String> {
        let designers = &self.config.shop.designers;
        if designers.is_empty() {
            return Ok(name.trim().to_string());
        }

        designers
            .iter()
            .find(|d| d.eq_ignore_ascii_case(name.trim()))
            .cloned()
            .ok_or_else(|| ShopError::UnknownDesigner(name.trim().to_string()).into())
    }
}
