//! Settings commands: calendar, catalog and designers

use anyhow::Result;
use clap::Subcommand;
use serde_json::json;

use super::output::Output;
use crate::domain::{Component, GarmentType};
use crate::storage::{Shop, ShopConfig};

#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show working hours, designers and the time catalog
    Show,

    /// Set one production component of a garment, in minutes per unit
    ///
    /// Example:
    ///   sublim settings set-time polo print 9
    SetTime {
        /// Garment type (polo, polo-long-sleeve, short, skirt-short, shorts-pant)
        garment: GarmentType,

        /// Component (print, cut, press, control, contingency)
        component: Component,

        /// Minutes per unit
        minutes: f64,
    },

    /// Change working hours (24h clock)
    Calendar {
        /// Opening hour
        #[arg(long)]
        start: Option<u32>,

        /// Closing hour
        #[arg(long)]
        end: Option<u32>,

        /// Hour the lunch break begins
        #[arg(long)]
        lunch_start: Option<u32>,

        /// Hour the lunch break ends
        #[arg(long)]
        lunch_end: Option<u32>,
    },

    /// Manage the designer list
    #[command(subcommand)]
    Designer(DesignerCommands),
}

#[derive(Subcommand)]
pub enum DesignerCommands {
    /// Add a designer
    Add {
        /// Designer name
        name: String,
    },

    /// Remove a designer
    Remove {
        /// Designer name
        name: String,
    },
}

pub fn run(cmd: SettingsCommands, output: &Output) -> Result<()> {
    match cmd {
        SettingsCommands::Show => show(output),
        SettingsCommands::SetTime {
            garment,
            component,
            minutes,
        } => set_time(output, garment, component, minutes),
        SettingsCommands::Calendar {
            start,
            end,
            lunch_start,
            lunch_end,
        } => set_calendar(output, start, end, lunch_start, lunch_end),
        SettingsCommands::Designer(DesignerCommands::Add { name }) => add_designer(output, &name),
        SettingsCommands::Designer(DesignerCommands::Remove { name }) => {
            remove_designer(output, &name)
        }
    }
}

fn show(output: &Output) -> Result<()> {
    let shop = Shop::open_current()?;
    let config: &ShopConfig = &shop.config().shop;

    if output.is_json() {
        output.data(&json!({
            "calendar": config.calendar,
            "daily_minutes": config.calendar.daily_minutes(),
            "designers": config.designers,
            "catalog": config.catalog,
        }));
        return Ok(());
    }

    let cal = &config.calendar;
    println!(
        "Working hours: {:02}:00-{:02}:00, lunch {:02}:00-{:02}:00 ({} min/day)",
        cal.start_hour,
        cal.end_hour,
        cal.lunch_start,
        cal.lunch_end,
        cal.daily_minutes()
    );

    if config.designers.is_empty() {
        println!("Designers: (any)");
    } else {
        println!("Designers: {}", config.designers.join(", "));
    }

    println!();
    println!("Catalog (minutes per unit):");
    println!(
        "{:<18} {:>7} {:>6} {:>6} {:>6} {:>8} {:>12} {:>7}",
        "GARMENT", "DESIGN", "PRINT", "CUT", "PRESS", "CONTROL", "CONTINGENCY", "TOTAL"
    );
    for (garment, entry) in config.catalog.iter() {
        let p = &entry.production;
        println!(
            "{:<18} {:>7} {:>6} {:>6} {:>6} {:>8} {:>12} {:>7}",
            garment,
            entry.design,
            p.print,
            p.cut,
            p.press,
            p.control,
            p.contingency,
            p.per_unit()
        );
    }

    Ok(())
}

fn set_time(output: &Output, garment: GarmentType, component: Component, minutes: f64) -> Result<()> {
    let mut shop = Shop::open_current()?;

    let entry = shop.config_mut().shop.catalog.entry_mut(garment);
    entry.production.set(component, minutes);
    let per_unit = entry.production.per_unit();

    shop.config().save_shop()?;
    tracing::info!(%garment, %component, minutes, "catalog updated");

    output.success(&format!(
        "Set {} {} to {} min (now {} min per unit)",
        garment, component, minutes, per_unit
    ));
    Ok(())
}

fn set_calendar(
    output: &Output,
    start: Option<u32>,
    end: Option<u32>,
    lunch_start: Option<u32>,
    lunch_end: Option<u32>,
) -> Result<()> {
    if start.is_none() && end.is_none() && lunch_start.is_none() && lunch_end.is_none() {
        anyhow::bail!("Nothing to change. Pass --start, --end, --lunch-start or --lunch-end.");
    }

    let mut shop = Shop::open_current()?;
    let calendar = &mut shop.config_mut().shop.calendar;
    if let Some(hour) = start {
        calendar.start_hour = hour;
    }
    if let Some(hour) = end {
        calendar.end_hour = hour;
    }
    if let Some(hour) = lunch_start {
        calendar.lunch_start = hour;
    }
    if let Some(hour) = lunch_end {
        calendar.lunch_end = hour;
    }
    let updated = *calendar;

    shop.config().save_shop()?;
    tracing::info!(?updated, "calendar updated");

    output.success(&format!(
        "Working hours set to {:02}:00-{:02}:00, lunch {:02}:00-{:02}:00",
        updated.start_hour, updated.end_hour, updated.lunch_start, updated.lunch_end
    ));
    Ok(())
}

fn add_designer(output: &Output, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("Designer name cannot be empty");
    }

    let mut shop = Shop::open_current()?;
    if !shop.config_mut().shop.add_designer(name) {
        output.success(&format!("{} is already listed", name));
        return Ok(());
    }

    shop.config().save_shop()?;
    output.success(&format!("Added designer {}", name));
    Ok(())
}

fn remove_designer(output: &Output, name: &str) -> Result<()> {
    let mut shop = Shop::open_current()?;
    if !shop.config_mut().shop.remove_designer(name.trim()) {
        anyhow::bail!("Designer not found: {}", name.trim());
    }

    shop.config().save_shop()?;
    output.success(&format!("Removed designer {}", name.trim()));
    Ok(())
}
