//! Derivation of the multiplier linking a shopping-list amount to the
//! retailer's unit of sale.
//!
//! A multiplier is always expressed against the unit of the observed trolley
//! line: "items per list unit" or "kilograms per list unit". No conversion
//! between the two units happens here.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::expression;
use crate::models::{DisplayQuantity, LineItem, Quantity, QuantityUnit, ShoppingEntry};

// ---------------------------------------------------------------------------
// Multiplier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Multiplier {
    pub value: f64,
    pub unit: QuantityUnit,
}

impl Multiplier {
    /// Ratio units as shown to the operator, e.g. `kg/bags` or `items/item`.
    pub fn ratio_label(unit: QuantityUnit, display: &DisplayQuantity) -> String {
        format!("{}/{}", unit.short_label(), display.unit_or_default())
    }
}

/// `magnitude(observed) / display.value`, or `None` when the display value
/// is not positive.
pub fn automatic_multiplier(display: &DisplayQuantity, observed: &Quantity) -> Option<Multiplier> {
    if display.value <= 0.0 {
        return None;
    }
    Some(Multiplier {
        value: observed.magnitude() / display.value,
        unit: observed.unit(),
    })
}

/// Evaluate an operator-typed ratio against the unit of `observed`.
pub fn manual_multiplier(observed: &Quantity, ratio: &str) -> Result<Multiplier> {
    let value = expression::evaluate(ratio)?.as_f64();
    Ok(Multiplier {
        value,
        unit: observed.unit(),
    })
}

// ---------------------------------------------------------------------------
// MappingRecord — What gets persisted back to the list
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRecord {
    pub display_name: String,
    pub multiplier: f64,
    pub unit: QuantityUnit,
    pub sainsburys_item_name: String,
    pub sainsburys_product_uid: String,
}

impl MappingRecord {
    pub fn new(entry: &ShoppingEntry, item: &LineItem, multiplier: Multiplier) -> Self {
        Self {
            display_name: entry.display_name.clone(),
            multiplier: multiplier.value,
            unit: multiplier.unit,
            sainsburys_item_name: item.name.clone(),
            sainsburys_product_uid: item.id.clone(),
        }
    }
}
