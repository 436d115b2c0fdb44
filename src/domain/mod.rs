//! Domain models for Sublim
//!
//! Time estimation, the work calendar, delivery projection and the
//! production state machine. No I/O happens here.

mod calendar;
mod catalog;
mod clock;
mod error;
mod estimate;
mod garment;
mod id;
mod order;
mod projector;
mod stage;

pub use calendar::{WorkCalendar, WorkCalendarConfig};
pub use catalog::{CatalogEntry, CatalogProvider, Component, ProductionMinutes, TimeCatalog};
pub use clock::{parse_timestamp, Clock, FixedClock, SystemClock};
pub use error::EngineError;
pub use estimate::{format_minutes, Estimate, OrderTimeEstimator};
pub use garment::{GarmentType, OrderItem};
pub use id::{IdError, OrderId};
pub use order::{
    derive_status, Attachment, AttachmentKind, Order, OrderDraft, OrderStatus, WeekTag,
};
pub use projector::DeliveryProjector;
pub use stage::{Stage, StageBoard, StageRecord, StageState};
