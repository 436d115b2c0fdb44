//! Order identifiers
//!
//! Format: `o-{7-char-hash}` (e.g. `o-7f2b4c1`).
//!
//! The hash is derived from the order name + creation timestamp, so two orders
//! with the same name placed at different instants get different IDs.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid order ID format: expected 'o-{{7-char-hash}}', got '{0}'")]
    InvalidOrderId(String),
}

/// Generates a 7-character hash from name and timestamp
fn generate_hash(name: &str, timestamp: NaiveDateTime) -> String {
    let nanos = timestamp.and_utc().timestamp_nanos_opt().unwrap_or(0);
    let input = format!("{}{}", name, nanos);
    let hash = blake3::hash(input.as_bytes());
    hash.to_hex()[..7].to_string()
}

/// Order ID in the format `o-{7-char-hash}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderId {
    hash: String,
}

impl OrderId {
    /// Creates a new order ID from the order name and its creation time
    pub fn new(name: &str, created_at: NaiveDateTime) -> Self {
        Self {
            hash: generate_hash(name, created_at),
        }
    }

    /// Returns the hash portion of the ID
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("o-{}", self.hash))
    }
}

impl FromStr for OrderId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let hash = s
            .strip_prefix("o-")
            .ok_or_else(|| IdError::InvalidOrderId(s.to_string()))?;

        if hash.len() != 7 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdError::InvalidOrderId(s.to_string()));
        }

        Ok(Self {
            hash: hash.to_ascii_lowercase(),
        })
    }
}

impl TryFrom<String> for OrderId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrderId> for String {
    fn from(id: OrderId) -> Self {
        id.to_string()
    }
}
