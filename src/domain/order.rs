//! Order domain model
//!
//! An order is created once with a frozen time estimate and delivery date.
//! After that only stage progress, description, designer and attachment
//! references change, until the order is archived.
//!
//! Status is never stored: it is derived from the stage board every time it
//! is asked for, so it cannot drift from the stages that produce it.

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::catalog::CatalogProvider;
use super::clock::Clock;
use super::error::EngineError;
use super::estimate::{Estimate, OrderTimeEstimator};
use super::garment::OrderItem;
use super::id::OrderId;
use super::projector::DeliveryProjector;
use super::stage::{Stage, StageBoard, StageState};

/// Overall order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    InDesign,
    InProduction,
    Pressing,
    Completed,
    Archived,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::InDesign,
        OrderStatus::InProduction,
        OrderStatus::Pressing,
        OrderStatus::Completed,
        OrderStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InDesign => "in_design",
            OrderStatus::InProduction => "in_production",
            OrderStatus::Pressing => "pressing",
            OrderStatus::Completed => "completed",
            OrderStatus::Archived => "archived",
        }
    }

    /// Orders still waiting on the design desk
    pub fn is_design_queue(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::InDesign)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Derives order status from the stage board
///
/// Highest match wins:
/// 1. every stage completed -> `Completed`
/// 2. press in progress -> `Pressing`
/// 3. any of print, cut, press, control started or done -> `InProduction`
/// 4. design started or done -> `InDesign`
/// 5. otherwise `Pending`
pub fn derive_status(stages: &StageBoard) -> OrderStatus {
    if stages.all_completed() {
        return OrderStatus::Completed;
    }
    if stages.state(Stage::Press) == StageState::InProgress {
        return OrderStatus::Pressing;
    }
    let shop_floor = [Stage::Print, Stage::Cut, Stage::Press, Stage::Control];
    if shop_floor.iter().any(|s| stages.state(*s).is_touched()) {
        return OrderStatus::InProduction;
    }
    if stages.state(Stage::Design).is_touched() {
        return OrderStatus::InDesign;
    }
    OrderStatus::Pending
}

/// ISO-8601 week an order was archived in, shown as `2026-W43`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekTag {
    year: i32,
    week: u32,
}

impl WeekTag {
    pub fn of(ts: NaiveDateTime) -> Self {
        let iso = ts.iso_week();
        Self {
            year: iso.year(),
            week: iso.week(),
        }
    }

    /// ISO week-numbering year
    pub fn year(&self) -> i32 {
        self.year
    }

    /// ISO week number (1-53)
    pub fn week(&self) -> u32 {
        self.week
    }
}

impl fmt::Display for WeekTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{}-W{:02}", self.year, self.week))
    }
}

impl FromStr for WeekTag {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidWeekTag(s.to_string());
        let (year, week) = s.trim().split_once("-W").ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let week: u32 = week.parse().map_err(|_| invalid())?;
        if !(1..=53).contains(&week) {
            return Err(invalid());
        }
        Ok(Self { year, week })
    }
}

impl TryFrom<String> for WeekTag {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WeekTag> for String {
    fn from(tag: WeekTag) -> Self {
        tag.to_string()
    }
}

/// What an attachment reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttachmentKind {
    /// Photo of the client's name/size list (one per order)
    ListPhoto,
    /// Artwork sent to the printer (any number)
    PrintFile,
    /// Approved design mockup (one per order)
    DesignImage,
}

impl AttachmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentKind::ListPhoto => "list-photo",
            AttachmentKind::PrintFile => "print-file",
            AttachmentKind::DesignImage => "design-image",
        }
    }

    /// Kinds that hold at most one reference
    pub fn is_single_slot(&self) -> bool {
        !matches!(self, AttachmentKind::PrintFile)
    }
}

impl fmt::Display for AttachmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for AttachmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list-photo" => Ok(AttachmentKind::ListPhoto),
            "print-file" => Ok(AttachmentKind::PrintFile),
            "design-image" => Ok(AttachmentKind::DesignImage),
            other => Err(format!(
                "unknown attachment kind '{}' (expected list-photo, print-file or design-image)",
                other
            )),
        }
    }
}

/// Opaque reference to a blob kept by an external store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub reference: String,
}

/// Input for creating an order
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub name: String,
    pub client: Option<String>,
    pub designer: Option<String>,
    pub description: Option<String>,
    pub items: Vec<OrderItem>,
    pub design_hours: f64,
}

impl OrderDraft {
    pub fn new(name: impl Into<String>, items: Vec<OrderItem>, design_hours: f64) -> Self {
        Self {
            name: name.into(),
            client: None,
            designer: None,
            description: None,
            items,
            design_hours,
        }
    }
}

/// A production order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,

    /// Display name
    pub name: String,

    /// Reference into the client directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub items: Vec<OrderItem>,

    /// Designer's estimate as entered
    pub design_hours: f64,

    /// Minute totals frozen at creation
    pub estimate: Estimate,

    pub created_at: NaiveDateTime,

    pub updated_at: NaiveDateTime,

    /// Delivery projected at creation
    pub estimated_delivery: NaiveDateTime,

    #[serde(default)]
    pub stages: StageBoard,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<NaiveDateTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_week: Option<WeekTag>,
}

impl Order {
    /// Creates an order, snapshotting its estimate and delivery date
    ///
    /// The projector's clock supplies the creation time, which is also the
    /// instant the delivery projection starts from.
    pub fn create<P, C>(
        draft: OrderDraft,
        catalog: &P,
        projector: &DeliveryProjector<'_, C>,
    ) -> Result<Self, EngineError>
    where
        P: CatalogProvider + ?Sized,
        C: Clock,
    {
        if draft.items.is_empty() {
            return Err(EngineError::EmptyOrder);
        }

        let estimate = OrderTimeEstimator::new(catalog).estimate(&draft.items, draft.design_hours)?;
        let created_at = projector.now();
        let estimated_delivery = projector.project_from(estimate.total_minutes, created_at)?;

        let order = Self {
            id: OrderId::new(&draft.name, created_at),
            name: draft.name,
            client: draft.client,
            designer: draft.designer,
            description: draft.description,
            items: draft.items,
            design_hours: draft.design_hours,
            estimate,
            created_at,
            updated_at: created_at,
            estimated_delivery,
            stages: StageBoard::default(),
            attachments: Vec::new(),
            archived_at: None,
            archive_week: None,
        };

        tracing::info!(
            order = %order.id,
            total_minutes = estimate.total_minutes,
            delivery = %estimated_delivery,
            "order created"
        );
        Ok(order)
    }

    /// Current status, derived from the stage board unless archived
    pub fn status(&self) -> OrderStatus {
        if self.archive_week.is_some() {
            OrderStatus::Archived
        } else {
            derive_status(&self.stages)
        }
    }

    pub fn is_archived(&self) -> bool {
        self.archive_week.is_some()
    }

    pub fn stage_state(&self, stage: Stage) -> StageState {
        self.stages.state(stage)
    }

    fn ensure_mutable(&self) -> Result<(), EngineError> {
        if self.is_archived() {
            return Err(EngineError::OrderArchived(self.id.clone()));
        }
        Ok(())
    }

    /// Starts (or restarts) a stage and returns the resulting status
    pub fn start_stage(&mut self, stage: Stage, clock: &impl Clock) -> Result<OrderStatus, EngineError> {
        self.ensure_mutable()?;
        let now = clock.now();
        self.stages.get_mut(stage).start(stage, now)?;
        self.updated_at = now;

        let status = self.status();
        tracing::info!(order = %self.id, %stage, %status, "stage started");
        Ok(status)
    }

    /// Completes a started stage and returns the resulting status
    pub fn complete_stage(
        &mut self,
        stage: Stage,
        clock: &impl Clock,
    ) -> Result<OrderStatus, EngineError> {
        self.ensure_mutable()?;
        let now = clock.now();
        self.stages.get_mut(stage).complete(stage, now)?;
        self.updated_at = now;

        let status = self.status();
        tracing::info!(order = %self.id, %stage, %status, "stage completed");
        Ok(status)
    }

    /// Moves a completed order to the archive, stamping the ISO week
    pub fn archive(&mut self, clock: &impl Clock) -> Result<WeekTag, EngineError> {
        let status = self.status();
        if status != OrderStatus::Completed {
            return Err(EngineError::InvalidArchivalState {
                id: self.id.clone(),
                status: status.to_string(),
            });
        }

        let now = clock.now();
        let tag = WeekTag::of(now);
        self.archived_at = Some(now);
        self.archive_week = Some(tag);
        self.updated_at = now;

        tracing::info!(order = %self.id, week = %tag, "order archived");
        Ok(tag)
    }

    pub fn set_description(
        &mut self,
        description: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), EngineError> {
        self.ensure_mutable()?;
        let description = description.into();
        self.description = if description.trim().is_empty() {
            None
        } else {
            Some(description)
        };
        self.updated_at = clock.now();
        Ok(())
    }

    pub fn assign_designer(
        &mut self,
        designer: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), EngineError> {
        self.ensure_mutable()?;
        self.designer = Some(designer.into());
        self.updated_at = clock.now();
        Ok(())
    }

    /// Adds a reference; single-slot kinds replace what they held
    pub fn attach(
        &mut self,
        kind: AttachmentKind,
        reference: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), EngineError> {
        self.ensure_mutable()?;
        let reference = reference.into();

        if kind.is_single_slot() {
            self.attachments.retain(|a| a.kind != kind);
        } else if self
            .attachments
            .iter()
            .any(|a| a.kind == kind && a.reference == reference)
        {
            return Ok(());
        }

        self.attachments.push(Attachment { kind, reference });
        self.updated_at = clock.now();
        Ok(())
    }

    /// Removes a reference, returning whether anything was removed
    pub fn detach(
        &mut self,
        kind: AttachmentKind,
        reference: &str,
        clock: &impl Clock,
    ) -> Result<bool, EngineError> {
        self.ensure_mutable()?;
        let before = self.attachments.len();
        self.attachments
            .retain(|a| !(a.kind == kind && a.reference == reference));

        let removed = self.attachments.len() != before;
        if removed {
            self.updated_at = clock.now();
        }
        Ok(removed)
    }

    pub fn attachments_of(&self, kind: AttachmentKind) -> impl Iterator<Item = &Attachment> {
        self.attachments.iter().filter(move |a| a.kind == kind)
    }
}
