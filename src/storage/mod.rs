//! # Storage Layer
//!
//! Persistence for Sublim shops using plain files next to the work.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Orders | JSONL (one JSON per line) | `.sublim/orders.jsonl` |
//! | Config | TOML | `.sublim/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`OrderStore`] uses file locking (`fs2`) for concurrent access
//! - [`OrderStore::modify`] holds an exclusive lock across read-modify-write
//! - All rewrites are atomic (temp file + rename)
//!
//! ## Shop Structure
//!
//! ```text
//! .sublim/
//! ├── orders.jsonl          # All orders
//! ├── orders.lock           # Held while an order is being modified
//! ├── config.toml           # Calendar, catalog and designers
//! └── .gitignore            # Ignores lock and temp files
//! ```

mod config;
mod jsonl;
mod shop;

pub use config::{Config, ConfigError, GlobalConfig, OutputFormat, ShopConfig};
pub use jsonl::OrderStore;
pub use shop::{Shop, ShopError};
