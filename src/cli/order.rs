//! Order CLI commands

use anyhow::Result;
use clap::Subcommand;
use serde_json::json;

use super::app::CommandClock;
use super::output::{self, Output};
use crate::domain::{
    format_minutes, AttachmentKind, DeliveryProjector, Order, OrderDraft, OrderId, OrderItem,
    Stage, StageState,
};
use crate::storage::Shop;

#[derive(Subcommand)]
pub enum OrderCommands {
    /// Create an order and project its delivery date
    ///
    /// Examples:
    ///   sublim order add "Team polos" --item polo:12 --design-hours 1.5
    ///   sublim order add "League kits" -i polo:20 -i shorts-pant:20 --designer Ana
    Add {
        /// Display name
        name: String,

        /// Garment and quantity as GARMENT[:QTY] (repeatable)
        #[arg(long = "item", short = 'i', required = true)]
        items: Vec<OrderItem>,

        /// Designer's estimate in hours
        #[arg(long, default_value = "0")]
        design_hours: f64,

        /// Client reference
        #[arg(long)]
        client: Option<String>,

        /// Assigned designer
        #[arg(long)]
        designer: Option<String>,

        /// Free-text notes
        #[arg(long)]
        description: Option<String>,
    },

    /// List active orders
    List {
        /// Include archived orders
        #[arg(long)]
        all: bool,
    },

    /// Show order details
    Show {
        /// Order ID
        id: String,
    },

    /// Start (or restart) a stage: design, print, cut, press, control
    Start {
        /// Order ID
        id: String,

        /// Stage name
        stage: Stage,
    },

    /// Mark a started stage as done
    Done {
        /// Order ID
        id: String,

        /// Stage name
        stage: Stage,
    },

    /// Archive a completed order under the current ISO week
    Archive {
        /// Order ID
        id: String,
    },

    /// Replace the order description (empty text clears it)
    Describe {
        /// Order ID
        id: String,

        /// New description
        text: String,
    },

    /// Assign a designer
    Assign {
        /// Order ID
        id: String,

        /// Designer name
        designer: String,
    },

    /// Attach a file reference: list-photo, print-file or design-image
    Attach {
        /// Order ID
        id: String,

        /// Attachment kind
        kind: AttachmentKind,

        /// Reference understood by the file store
        reference: String,
    },

    /// Remove a file reference
    Detach {
        /// Order ID
        id: String,

        /// Attachment kind
        kind: AttachmentKind,

        /// Reference to remove
        reference: String,
    },
}

pub fn run(cmd: OrderCommands, output: &Output, clock: &CommandClock) -> Result<()> {
    match cmd {
        OrderCommands::Add {
            name,
            items,
            design_hours,
            client,
            designer,
            description,
        } => {
            let mut draft = OrderDraft::new(name.trim(), items, design_hours);
            draft.client = client;
            draft.designer = designer;
            draft.description = description.filter(|d| !d.trim().is_empty());
            add_order(output, clock, draft)
        }
        OrderCommands::List { all } => list_orders(output, all),
        OrderCommands::Show { id } => show_order(output, &id),
        OrderCommands::Start { id, stage } => start_stage(output, clock, &id, stage),
        OrderCommands::Done { id, stage } => complete_stage(output, clock, &id, stage),
        OrderCommands::Archive { id } => archive_order(output, clock, &id),
        OrderCommands::Describe { id, text } => describe_order(output, clock, &id, text),
        OrderCommands::Assign { id, designer } => assign_designer(output, clock, &id, &designer),
        OrderCommands::Attach {
            id,
            kind,
            reference,
        } => attach(output, clock, &id, kind, reference),
        OrderCommands::Detach {
            id,
            kind,
            reference,
        } => detach(output, clock, &id, kind, &reference),
    }
}

/// Full JSON view of an order, including its derived status
pub(crate) fn order_json(order: &Order) -> serde_json::Value {
    let stages: serde_json::Map<String, serde_json::Value> = order
        .stages
        .iter()
        .map(|(stage, record)| {
            (
                stage.to_string(),
                json!({
                    "state": record.state(),
                    "started_at": record.started_at,
                    "finished_at": record.finished_at,
                }),
            )
        })
        .collect();

    json!({
        "id": order.id,
        "name": order.name,
        "status": order.status(),
        "client": order.client,
        "designer": order.designer,
        "description": order.description,
        "items": order.items,
        "design_hours": order.design_hours,
        "estimate": order.estimate,
        "total": format_minutes(order.estimate.total_minutes),
        "created_at": order.created_at,
        "updated_at": order.updated_at,
        "estimated_delivery": order.estimated_delivery,
        "stages": stages,
        "attachments": order.attachments,
        "archived_at": order.archived_at,
        "archive_week": order.archive_week,
    })
}

fn add_order(output: &Output, clock: &CommandClock, mut draft: OrderDraft) -> Result<()> {
    if draft.name.is_empty() {
        anyhow::bail!("Order name cannot be empty");
    }

    let shop = Shop::open_current()?;
    if let Some(designer) = &draft.designer {
        draft.designer = Some(shop.resolve_designer(designer)?);
    }

    let calendar = shop.work_calendar()?;
    let projector = DeliveryProjector::new(&calendar, *clock);
    let order = Order::create(draft, &shop.config().shop.catalog, &projector)?;

    shop.order_store().insert_new(&order)?;

    if output.is_json() {
        output.data(&order_json(&order));
    } else {
        println!("Created order {}: {}", order.id, order.name);
        println!(
            "Estimated time: {}",
            format_minutes(order.estimate.total_minutes)
        );
        println!("Delivery: {}", output::timestamp(order.estimated_delivery));
    }

    Ok(())
}

fn list_orders(output: &Output, include_archived: bool) -> Result<()> {
    let shop = Shop::open_current()?;
    let orders: Vec<_> = shop
        .order_store()
        .read_sorted()?
        .into_iter()
        .filter(|o| include_archived || !o.is_archived())
        .collect();

    if output.is_json() {
        let items: Vec<_> = orders
            .iter()
            .map(|o| {
                json!({
                    "id": o.id,
                    "name": o.name,
                    "status": o.status(),
                    "designer": o.designer,
                    "total_minutes": o.estimate.total_minutes,
                    "estimated_delivery": o.estimated_delivery,
                })
            })
            .collect();
        output.data(&items);
    } else if orders.is_empty() {
        println!("No orders found.");
    } else {
        println!("{:<10} {:<14} {:<17} NAME", "ID", "STATUS", "DELIVERY");
        println!("{}", "-".repeat(70));
        for order in &orders {
            println!(
                "{:<10} {:<14} {:<17} {}",
                order.id,
                order.status(),
                output::timestamp(order.estimated_delivery),
                output::truncate(&order.name, 30)
            );
        }
    }

    Ok(())
}

fn show_order(output: &Output, id_str: &str) -> Result<()> {
    let shop = Shop::open_current()?;
    let id: OrderId = id_str.parse()?;
    let order = shop.order_store().get(&id)?;

    if output.is_json() {
        output.data(&order_json(&order));
        return Ok(());
    }

    println!("Order: {}", order.id);
    println!("Name: {}", order.name);
    println!("Status: {}", order.status());
    if let Some(client) = &order.client {
        println!("Client: {}", client);
    }
    if let Some(designer) = &order.designer {
        println!("Designer: {}", designer);
    }

    println!("\nItems:");
    for item in &order.items {
        println!("  {}", item);
    }

    println!();
    println!(
        "Estimated time: {} (design {}, production {})",
        format_minutes(order.estimate.total_minutes),
        format_minutes(order.estimate.design_minutes),
        format_minutes(order.estimate.production_minutes)
    );
    println!("Created: {}", output::timestamp(order.created_at));
    println!("Delivery: {}", output::timestamp(order.estimated_delivery));
    if let (Some(week), Some(at)) = (order.archive_week, order.archived_at) {
        println!("Archived: {} ({})", week, output::timestamp(at));
    }

    println!("\nStages:");
    for (stage, record) in order.stages.iter() {
        let marker = match record.state() {
            StageState::NotStarted => "[ ]",
            StageState::InProgress => "[~]",
            StageState::Completed => "[x]",
        };
        let mut line = format!("  {} {:<8}", marker, stage);
        if let Some(started) = record.started_at {
            line.push_str(&format!(" started {}", output::timestamp(started)));
        }
        if let Some(finished) = record.finished_at {
            line.push_str(&format!(", done {}", output::timestamp(finished)));
        }
        println!("{}", line.trim_end());
    }

    if !order.attachments.is_empty() {
        println!("\nAttachments:");
        for attachment in &order.attachments {
            println!("  {}: {}", attachment.kind, attachment.reference);
        }
    }

    if let Some(desc) = &order.description {
        println!("\nDescription:");
        println!("{}", desc);
    }

    Ok(())
}

fn start_stage(output: &Output, clock: &CommandClock, id_str: &str, stage: Stage) -> Result<()> {
    let shop = Shop::open_current()?;
    let id: OrderId = id_str.parse()?;

    let (order, status) = shop
        .order_store()
        .modify(&id, |o| o.start_stage(stage, clock))?;

    if output.is_json() {
        output.data(&json!({
            "id": order.id,
            "stage": stage,
            "state": order.stage_state(stage),
            "status": status,
        }));
    } else {
        println!("Started {} on {} (status: {})", stage, order.id, status);
    }

    Ok(())
}

fn complete_stage(
    output: &Output,
    clock: &CommandClock,
    id_str: &str,
    stage: Stage,
) -> Result<()> {
    let shop = Shop::open_current()?;
    let id: OrderId = id_str.parse()?;

    let (order, status) = shop
        .order_store()
        .modify(&id, |o| o.complete_stage(stage, clock))?;

    if output.is_json() {
        output.data(&json!({
            "id": order.id,
            "stage": stage,
            "state": order.stage_state(stage),
            "status": status,
        }));
    } else {
        println!("Completed {} on {} (status: {})", stage, order.id, status);
    }

    Ok(())
}

fn archive_order(output: &Output, clock: &CommandClock, id_str: &str) -> Result<()> {
    let shop = Shop::open_current()?;
    let id: OrderId = id_str.parse()?;

    let (order, week) = shop.order_store().modify(&id, |o| o.archive(clock))?;

    if output.is_json() {
        output.data(&json!({
            "id": order.id,
            "status": order.status(),
            "archive_week": week,
            "archived_at": order.archived_at,
        }));
    } else {
        println!("Archived {} in {}", order.id, week);
    }

    Ok(())
}

fn describe_order(output: &Output, clock: &CommandClock, id_str: &str, text: String) -> Result<()> {
    let shop = Shop::open_current()?;
    let id: OrderId = id_str.parse()?;

    let (order, ()) = shop
        .order_store()
        .modify(&id, |o| o.set_description(text, clock))?;

    let message = match order.description {
        Some(_) => format!("Updated description of {}", order.id),
        None => format!("Cleared description of {}", order.id),
    };
    output.success(&message);
    Ok(())
}

fn assign_designer(
    output: &Output,
    clock: &CommandClock,
    id_str: &str,
    designer: &str,
) -> Result<()> {
    let shop = Shop::open_current()?;
    let id: OrderId = id_str.parse()?;
    let designer = shop.resolve_designer(designer)?;

    let (order, ()) = shop
        .order_store()
        .modify(&id, |o| o.assign_designer(designer.clone(), clock))?;

    output.success(&format!("Assigned {} to {}", designer, order.id));
    Ok(())
}

fn attach(
    output: &Output,
    clock: &CommandClock,
    id_str: &str,
    kind: AttachmentKind,
    reference: String,
) -> Result<()> {
    let shop = Shop::open_current()?;
    let id: OrderId = id_str.parse()?;

    let (order, ()) = shop
        .order_store()
        .modify(&id, |o| o.attach(kind, reference.clone(), clock))?;

    output.success(&format!("Attached {} {} to {}", kind, reference, order.id));
    Ok(())
}

fn detach(
    output: &Output,
    clock: &CommandClock,
    id_str: &str,
    kind: AttachmentKind,
    reference: &str,
) -> Result<()> {
    let shop = Shop::open_current()?;
    let id: OrderId = id_str.parse()?;

    let (order, removed) = shop
        .order_store()
        .modify(&id, |o| o.detach(kind, reference, clock))?;

    if !removed {
        anyhow::bail!("No {} '{}' on order {}", kind, reference, order.id);
    }

    output.success(&format!("Removed {} {} from {}", kind, reference, order.id));
    Ok(())
}
