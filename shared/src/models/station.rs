//! Kitchen station reference data
//!
//! Stations are static reference data owned by the catalog; the engine only
//! reads them to route tickets.

use serde::{Deserialize, Serialize};

/// Station category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StationCategory {
    Grill,
    Fry,
    Saute,
    Cold,
    Beverage,
    Expeditor,
}

/// A physical kitchen work area
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Station {
    pub id: i64,
    pub name: String,
    pub category: StationCategory,
}

impl Station {
    pub fn new(id: i64, name: impl Into<String>, category: StationCategory) -> Self {
        Self {
            id,
            name: name.into(),
            category,
        }
    }
}
