use std::fmt;

use serde::{Deserialize, Serialize};

use super::trolley::LineItem;

// ---------------------------------------------------------------------------
// DisplayQuantity — Human-facing amount in the list's own unit
// ---------------------------------------------------------------------------

/// An amount as written on the shopping list, e.g. `3 bags`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayQuantity {
    pub value: f64,
    pub unit: Option<String>,
}

impl DisplayQuantity {
    pub fn new(value: f64, unit: Option<&str>) -> Self {
        Self {
            value,
            unit: unit.map(str::to_string),
        }
    }

    /// The unit name, or `item` when the list gives none.
    pub fn unit_or_default(&self) -> &str {
        self.unit.as_deref().unwrap_or("item")
    }
}

impl fmt::Display for DisplayQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.unit {
            Some(unit) => write!(f, "{} {}", self.value, unit),
            None => write!(f, "{}", self.value),
        }
    }
}

// ---------------------------------------------------------------------------
// ShoppingEntry — One row of the shopping list
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingEntry {
    pub display_name: String,
    pub display_quantity: DisplayQuantity,
    /// The product previously matched to this entry, carrying the quantity to order.
    pub known_trolley_mapping: Option<LineItem>,
}

impl ShoppingEntry {
    /// The text to type into the retailer's search bar for this entry.
    pub fn search_term(&self) -> &str {
        match &self.known_trolley_mapping {
            Some(item) => &item.name,
            None => &self.display_name,
        }
    }
}
