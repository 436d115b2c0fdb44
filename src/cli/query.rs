//! Query commands (design, archive, status)

use std::collections::BTreeMap;

use anyhow::Result;
use serde_json::json;

use super::app::CommandClock;
use super::output::{self, Output};
use crate::domain::{Clock, Order, OrderStatus, WeekTag};
use crate::storage::Shop;

/// Show orders still waiting on the design desk
pub fn design_queue(output: &Output) -> Result<()> {
    let shop = Shop::open_current()?;
    let queue: Vec<Order> = shop
        .order_store()
        .read_sorted()?
        .into_iter()
        .filter(|o| o.status().is_design_queue())
        .collect();

    tracing::debug!(count = queue.len(), "design queue");

    if output.is_json() {
        let items: Vec<_> = queue
            .iter()
            .map(|o| {
                json!({
                    "id": o.id,
                    "name": o.name,
                    "status": o.status(),
                    "designer": o.designer,
                    "design_hours": o.design_hours,
                    "created_at": o.created_at,
                    "estimated_delivery": o.estimated_delivery,
                })
            })
            .collect();
        output.data(&items);
    } else if queue.is_empty() {
        println!("Design queue is empty.");
    } else {
        println!("Design queue ({}):", queue.len());
        println!("{:<10} {:<10} {:<12} NAME", "ID", "STATUS", "DESIGNER");
        println!("{}", "-".repeat(60));
        for order in &queue {
            println!(
                "{:<10} {:<10} {:<12} {}",
                order.id,
                order.status(),
                order.designer.as_deref().unwrap_or("-"),
                output::truncate(&order.name, 30)
            );
        }
    }

    Ok(())
}

/// Groups archived orders by week tag, newest week first
fn group_by_week(orders: Vec<Order>, only: Option<WeekTag>) -> Vec<(WeekTag, Vec<Order>)> {
    let mut weeks: BTreeMap<WeekTag, Vec<Order>> = BTreeMap::new();
    for order in orders {
        let Some(week) = order.archive_week else {
            continue;
        };
        if only.is_some_and(|w| w != week) {
            continue;
        }
        weeks.entry(week).or_default().push(order);
    }
    weeks.into_iter().rev().collect()
}

/// Show archived orders, optionally for one ISO week
pub fn archive(output: &Output, week: Option<WeekTag>) -> Result<()> {
    let shop = Shop::open_current()?;
    let weeks = group_by_week(shop.order_store().read_sorted()?, week);

    if output.is_json() {
        let items: Vec<_> = weeks
            .iter()
            .map(|(week, orders)| {
                json!({
                    "week": week,
                    "orders": orders
                        .iter()
                        .map(|o| json!({
                            "id": o.id,
                            "name": o.name,
                            "client": o.client,
                            "archived_at": o.archived_at,
                        }))
                        .collect::<Vec<_>>(),
                })
            })
            .collect();
        output.data(&items);
    } else if weeks.is_empty() {
        match week {
            Some(week) => println!("No orders archived in {}.", week),
            None => println!("No archived orders."),
        }
    } else {
        for (week, orders) in &weeks {
            println!("{} ({} orders)", week, orders.len());
            for order in orders {
                let archived = order
                    .archived_at
                    .map(output::timestamp)
                    .unwrap_or_default();
                println!("  {:<10} {:<17} {}", order.id, archived, order.name);
            }
        }
    }

    Ok(())
}

/// Counts per status plus active orders past their projected delivery
fn tally(orders: &[Order], now: chrono::NaiveDateTime) -> (BTreeMap<&'static str, usize>, usize) {
    let mut counts: BTreeMap<&'static str, usize> =
        OrderStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
    let mut late = 0;

    for order in orders {
        let status = order.status();
        *counts.entry(status.as_str()).or_default() += 1;

        let active = !matches!(status, OrderStatus::Completed | OrderStatus::Archived);
        if active && order.estimated_delivery < now {
            late += 1;
        }
    }

    (counts, late)
}

/// Show shop status overview
pub fn status(output: &Output, clock: &CommandClock) -> Result<()> {
    let shop = Shop::open_current()?;
    let orders = shop.order_store().read_sorted()?;
    let (counts, late) = tally(&orders, clock.now());

    if output.is_json() {
        output.data(&json!({
            "total": orders.len(),
            "by_status": counts,
            "late": late,
        }));
    } else {
        println!("Shop Status");
        println!("{}", "=".repeat(40));
        println!();
        println!("Orders: {} total", orders.len());
        for status in OrderStatus::ALL {
            let count = counts.get(status.as_str()).copied().unwrap_or(0);
            println!("  {:<14} {}", status, count);
        }
        if late > 0 {
            println!();
            println!("Past projected delivery: {}", late);
        }
    }

    Ok(())
}
