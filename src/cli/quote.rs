//! Quote command: estimate time and delivery without creating an order

use anyhow::Result;
use serde_json::json;

use super::app::CommandClock;
use super::output::{self, Output};
use crate::domain::{
    format_minutes, CatalogProvider, DeliveryProjector, OrderItem, OrderTimeEstimator,
};
use crate::storage::{Config, ShopConfig};

/// Uses the shop's settings when run inside a shop, the built-in ones otherwise
fn active_config() -> Result<ShopConfig> {
    match Config::find_shop_root() {
        Some(root) => Ok(Config::for_shop(&root)?.shop),
        None => {
            tracing::debug!("not in a shop, quoting with default settings");
            Ok(ShopConfig::default())
        }
    }
}

pub fn estimate(
    output: &Output,
    clock: &CommandClock,
    items: &[OrderItem],
    design_hours: f64,
) -> Result<()> {
    let config = active_config()?;
    let calendar = config.work_calendar()?;

    let estimate = OrderTimeEstimator::new(&config.catalog).estimate(items, design_hours)?;
    let projector = DeliveryProjector::new(&calendar, *clock);
    let start = projector.now();
    let delivery = projector.project_from(estimate.total_minutes, start)?;

    let lines: Vec<(OrderItem, f64)> = items
        .iter()
        .map(|item| {
            let per_unit = config
                .catalog
                .lookup(item.garment)
                .map(|entry| entry.production.per_unit())
                .unwrap_or(0.0);
            (*item, per_unit * f64::from(item.quantity))
        })
        .collect();

    if output.is_json() {
        output.data(&json!({
            "items": lines
                .iter()
                .map(|(item, minutes)| json!({
                    "garment": item.garment,
                    "quantity": item.quantity,
                    "minutes": minutes,
                }))
                .collect::<Vec<_>>(),
            "design_minutes": estimate.design_minutes,
            "production_minutes": estimate.production_minutes,
            "total_minutes": estimate.total_minutes,
            "total": format_minutes(estimate.total_minutes),
            "start": start,
            "delivery": delivery,
        }));
    } else {
        for (item, minutes) in &lines {
            println!("  {:<24} {:>9}", item.to_string(), format_minutes(*minutes));
        }
        println!("  {:<24} {:>9}", "Design", format_minutes(estimate.design_minutes));
        println!("{}", "-".repeat(36));
        println!("  {:<24} {:>9}", "Total", format_minutes(estimate.total_minutes));
        println!();
        println!("Start:    {}", output::timestamp(start));
        println!("Delivery: {}", output::timestamp(delivery));
    }

    Ok(())
}
