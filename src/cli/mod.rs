//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Shop setup and overview | `init`, `status` |
//! | Quote | Time and delivery without an order | `estimate --item polo:2` |
//! | Order | Order lifecycle | `order add`, `order start`, `order done`, `order archive` |
//! | Query | Work queues | `design`, `archive --week 2026-W43` |
//! | Settings | Calendar, catalog, designers | `settings show`, `settings set-time` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Time
//!
//! `--now "2026-10-19 09:00"` (or `SUBLIM_NOW`) pins the clock used for stage
//! stamps, archival weeks and delivery projections.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod logging;
mod order;
mod output;
mod query;
mod quote;
mod settings;

pub use app::{run, Cli, CommandClock, Commands};
pub use output::{Output, OutputFormat};
