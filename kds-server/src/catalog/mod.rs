//! Static catalog - menu items, stations, tables, recipes
//!
//! Reference data owned by external collaborators (menu CRUD, floor plan).
//! The engine only reads it: menu-item -> station for routing, menu-item ->
//! ingredient quantities for stock deduction, table lookup for validation.
//! Loaded once at startup, immutable afterwards.

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shared::models::inventory::RecipeEntry;
use shared::models::station::{Station, StationCategory};

/// A sellable menu item with its routing target and recipe
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    /// Station this item is prepared at
    pub station_id: i64,
    /// Ingredient quantities consumed per unit ordered
    #[serde(default)]
    pub recipe: Vec<RecipeEntry>,
}

/// A dining table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiningTable {
    pub id: i64,
    pub table_number: i32,
}

/// Catalog load/validation errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Menu item {item_id} references unknown station {station_id}")]
    UnknownStation { item_id: i64, station_id: i64 },
}

/// Serialized catalog shape (JSON file)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogFile {
    stations: Vec<Station>,
    menu_items: Vec<MenuItem>,
    tables: Vec<DiningTable>,
}

/// Immutable catalog indexed for lookup
#[derive(Debug)]
pub struct Catalog {
    stations: HashMap<i64, Station>,
    menu_items: HashMap<i64, MenuItem>,
    tables: HashMap<i64, DiningTable>,
}

impl Catalog {
    /// Build a catalog from parts, validating cross references
    pub fn new(
        stations: Vec<Station>,
        menu_items: Vec<MenuItem>,
        tables: Vec<DiningTable>,
    ) -> Result<Self, CatalogError> {
        let stations: HashMap<i64, Station> = stations.into_iter().map(|s| (s.id, s)).collect();
        for item in &menu_items {
            if !stations.contains_key(&item.station_id) {
                return Err(CatalogError::UnknownStation {
                    item_id: item.id,
                    station_id: item.station_id,
                });
            }
        }
        Ok(Self {
            menu_items: menu_items.into_iter().map(|m| (m.id, m)).collect(),
            tables: tables.into_iter().map(|t| (t.id, t)).collect(),
            stations,
        })
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let file: CatalogFile = serde_json::from_str(&raw)?;
        Self::new(file.stations, file.menu_items, file.tables)
    }

    pub fn station(&self, id: i64) -> Option<&Station> {
        self.stations.get(&id)
    }

    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    pub fn menu_item(&self, id: i64) -> Option<&MenuItem> {
        self.menu_items.get(&id)
    }

    pub fn table(&self, id: i64) -> Option<&DiningTable> {
        self.tables.get(&id)
    }

    /// Station an item routes to
    pub fn station_for(&self, menu_item_id: i64) -> Option<i64> {
        self.menu_items.get(&menu_item_id).map(|m| m.station_id)
    }

    /// Recipe lines for an item
    pub fn recipe_for(&self, menu_item_id: i64) -> Option<&[RecipeEntry]> {
        self.menu_items.get(&menu_item_id).map(|m| m.recipe.as_slice())
    }

    /// Built-in demo catalog for local runs and tests
    pub fn demo() -> Self {
        let stations = vec![
            Station::new(1, "Grill", StationCategory::Grill),
            Station::new(2, "Fry", StationCategory::Fry),
            Station::new(3, "Saute", StationCategory::Saute),
            Station::new(4, "Cold", StationCategory::Cold),
            Station::new(5, "Beverage", StationCategory::Beverage),
            Station::new(6, "Expeditor", StationCategory::Expeditor),
        ];
        let menu_items = vec![
            MenuItem {
                id: 101,
                name: "Ribeye Steak".into(),
                station_id: 1,
                recipe: vec![
                    RecipeEntry {
                        ingredient_id: 1,
                        quantity_per_unit: Decimal::new(3, 1), // 0.3 kg beef
                    },
                    RecipeEntry {
                        ingredient_id: 2,
                        quantity_per_unit: Decimal::new(2, 2), // 0.02 kg butter
                    },
                ],
            },
            MenuItem {
                id: 102,
                name: "French Fries".into(),
                station_id: 2,
                recipe: vec![RecipeEntry {
                    ingredient_id: 3,
                    quantity_per_unit: Decimal::new(25, 2), // 0.25 kg potatoes
                }],
            },
            MenuItem {
                id: 103,
                name: "Caesar Salad".into(),
                station_id: 4,
                recipe: vec![RecipeEntry {
                    ingredient_id: 4,
                    quantity_per_unit: Decimal::new(15, 2), // 0.15 kg romaine
                }],
            },
            MenuItem {
                id: 104,
                name: "Lemonade".into(),
                station_id: 5,
                recipe: vec![RecipeEntry {
                    ingredient_id: 5,
                    quantity_per_unit: Decimal::new(3, 1), // 0.3 l lemon juice
                }],
            },
        ];
        let tables = (1..=12)
            .map(|n| DiningTable {
                id: n,
                table_number: n as i32,
            })
            .collect();
        Self::new(stations, menu_items, tables).expect("demo catalog is self-consistent")
    }
}
