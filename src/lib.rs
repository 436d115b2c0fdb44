//! Sublim CLI - production tracking for a garment customization shop
//!
//! Orders move through five shop-floor stages (design, print, cut, press,
//! control). When an order is created its production time is estimated from
//! a per-garment catalog and a delivery date is projected over the shop's
//! working hours.

pub mod cli;
pub mod domain;
pub mod storage;

pub use domain::{EngineError, Order, OrderId, OrderStatus, Stage, WorkCalendar};
