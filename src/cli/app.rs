//! Main CLI application structure

use anyhow::Result;
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{logging, order, query, quote, settings};
use crate::domain::{parse_timestamp, Clock, FixedClock, OrderItem, SystemClock, WeekTag};
use crate::storage::{Config, Shop};

#[derive(Parser)]
#[command(name = "sublim")]
#[command(author, version, about = "Production tracking for a garment customization shop")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Pin the current time, e.g. "2026-10-19 09:00"
    #[arg(long, global = true, env = "SUBLIM_NOW", value_parser = parse_now)]
    pub now: Option<NaiveDateTime>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new shop
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Quote production time and delivery without creating an order
    ///
    /// Examples:
    ///   sublim estimate --item polo:2 --design-hours 0.5
    ///   sublim estimate -i polo:10 -i short:10
    Estimate {
        /// Garment and quantity as GARMENT[:QTY] (repeatable)
        #[arg(long = "item", short = 'i', required = true)]
        items: Vec<OrderItem>,

        /// Designer's estimate in hours
        #[arg(long, default_value = "0")]
        design_hours: f64,
    },

    /// Manage orders
    #[command(subcommand)]
    Order(order::OrderCommands),

    /// Show orders waiting on the design desk
    Design,

    /// Show archived orders grouped by week
    Archive {
        /// Only this ISO week, e.g. 2026-W43
        #[arg(long)]
        week: Option<WeekTag>,
    },

    /// Show shop status overview
    Status,

    /// View and change shop settings
    #[command(subcommand)]
    Settings(settings::SettingsCommands),
}

fn parse_now(s: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(s).ok_or_else(|| {
        format!(
            "invalid timestamp '{}' (expected YYYY-MM-DD HH:MM[:SS])",
            s
        )
    })
}

/// Clock handed to commands: pinned by `--now`, otherwise the system clock
#[derive(Debug, Clone, Copy)]
pub enum CommandClock {
    System(SystemClock),
    Fixed(FixedClock),
}

impl CommandClock {
    pub fn new(now: Option<NaiveDateTime>) -> Self {
        match now {
            Some(ts) => CommandClock::Fixed(FixedClock(ts)),
            None => CommandClock::System(SystemClock),
        }
    }
}

impl Clock for CommandClock {
    fn now(&self) -> NaiveDateTime {
        match self {
            CommandClock::System(clock) => clock.now(),
            CommandClock::Fixed(clock) => clock.now(),
        }
    }
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let format = match cli.format {
        Some(format) => format,
        None => Config::load_global()?.default_format.into(),
    };
    let output = Output::new(format);
    let clock = CommandClock::new(cli.now);
    tracing::debug!(?clock, ?format, "sublim starting");

    match cli.command {
        Commands::Init { path } => {
            let shop = Shop::init(&path)?;
            output.success(&format!(
                "Initialized sublim shop at {}",
                shop.root().display()
            ));
        }

        Commands::Estimate {
            items,
            design_hours,
        } => quote::estimate(&output, &clock, &items, design_hours)?,

        Commands::Order(cmd) => order::run(cmd, &output, &clock)?,

        Commands::Design => query::design_queue(&output)?,
        Commands::Archive { week } => query::archive(&output, week)?,
        Commands::Status => query::status(&output, &clock)?,

        Commands::Settings(cmd) => settings::run(cmd, &output)?,
    }

    tracing::debug!("command completed");
    Ok(())
}
