//! Error kinds raised by the estimation engine and the production state machine

use thiserror::Error;

use super::garment::GarmentType;
use super::id::OrderId;
use super::stage::Stage;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("No time catalog entry for garment type '{0}'")]
    UnknownGarmentType(String),

    #[error("Invalid quantity {quantity} for {garment}: must be at least 1")]
    InvalidQuantity { garment: GarmentType, quantity: u32 },

    #[error("Invalid design hours {0}: must be a finite number >= 0")]
    InvalidDesignHours(f64),

    #[error("Invalid duration {0} minutes: must be a finite number >= 0")]
    InvalidDuration(f64),

    #[error("Invalid work calendar: {0}")]
    InvalidCalendarConfig(String),

    #[error("Working time from {0} runs past the last representable date")]
    CalendarOverflow(chrono::NaiveDateTime),

    #[error("Stage '{0}' has not been started")]
    StageNotStarted(Stage),

    #[error("Stage '{0}' is already completed")]
    StageAlreadyCompleted(Stage),

    #[error("Unknown stage '{0}' (expected design, print, cut, press or control)")]
    UnknownStage(String),

    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("Order {id} cannot be archived while {status}")]
    InvalidArchivalState { id: OrderId, status: String },

    #[error("Order {0} is archived and can no longer change")]
    OrderArchived(OrderId),

    #[error("An order needs at least one item")]
    EmptyOrder,

    #[error("Invalid item '{0}': expected GARMENT[:QUANTITY], e.g. polo:2")]
    InvalidItem(String),

    #[error("Invalid week tag '{0}': expected YYYY-Www, e.g. 2026-W43")]
    InvalidWeekTag(String),
}
