use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::errors::ServiceError;

/// Wire timestamp layout shared by movement listings (`dd/MM/yyyy HH:mm:ss`).
pub const WIRE_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Category size class. Wire tokens are the legacy Portuguese spellings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum CategorySize {
    #[strum(serialize = "PEQUENO")]
    Small,
    #[strum(serialize = "MEDIO")]
    Medium,
    #[strum(serialize = "GRANDE")]
    Large,
}

impl CategorySize {
    /// Parses a wire token, mapping failure to the validation message
    /// clients are told to act on.
    pub fn parse_wire(token: &str) -> Result<Self, ServiceError> {
        Self::from_str(token.trim()).map_err(|_| {
            ServiceError::validation("Invalid size. Use: PEQUENO, MEDIO or GRANDE")
        })
    }
}

/// Category packaging class. Wire tokens are the legacy Portuguese spellings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum CategoryPackaging {
    #[strum(serialize = "LATA")]
    Can,
    #[strum(serialize = "VIDRO")]
    Glass,
    #[strum(serialize = "PLASTICO")]
    Plastic,
}

impl CategoryPackaging {
    pub fn parse_wire(token: &str) -> Result<Self, ServiceError> {
        Self::from_str(token.trim()).map_err(|_| {
            ServiceError::validation("Invalid packaging. Use: LATA, VIDRO or PLASTICO")
        })
    }
}

/// Direction of a stock movement.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum MovementKind {
    #[strum(serialize = "ENTRADA")]
    Inbound,
    #[strum(serialize = "SAIDA")]
    Outbound,
}

impl MovementKind {
    pub fn parse_wire(token: &str) -> Result<Self, ServiceError> {
        Self::from_str(token.trim()).map_err(|_| {
            ServiceError::validation("Invalid movement type. Use: ENTRADA or SAIDA")
        })
    }
}

/// A grouping of products by size and packaging.
///
/// `name` is the identity; matching is case-insensitive everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub size: CategorySize,
    pub packaging: CategoryPackaging,
}

/// A stocked item. `current_stock` is the materialized balance; the
/// movement log is history, not the source of truth for reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub unit_price: rust_decimal::Decimal,
    pub unit: String,
    pub current_stock: i32,
    pub min_stock: i32,
    pub max_stock: i32,
    pub category: String,
}

impl Product {
    pub fn is_below_minimum(&self) -> bool {
        self.current_stock < self.min_stock
    }
}

/// A single stock-affecting event. Append-only: never updated, only
/// bulk-cleared by the administrative reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: Uuid,
    pub product_name: String,
    pub occurred_at: DateTime<Utc>,
    pub quantity: i32,
    pub kind: MovementKind,
}

impl Movement {
    pub fn wire_timestamp(&self) -> String {
        self.occurred_at.format(WIRE_TIMESTAMP_FORMAT).to_string()
    }
}
