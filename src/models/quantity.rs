use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AssistantError, Result};

// ---------------------------------------------------------------------------
// QuantityUnit — The retailer's unit of sale
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantityUnit {
    Items,
    Kilograms,
}

impl QuantityUnit {
    /// The name stored in the `Sainsbury's Unit` select property.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuantityUnit::Items => "Items",
            QuantityUnit::Kilograms => "Kilograms",
        }
    }

    /// Short label used when showing ratios to the operator.
    pub fn short_label(&self) -> &'static str {
        match self {
            QuantityUnit::Items => "items",
            QuantityUnit::Kilograms => "kg",
        }
    }
}

impl fmt::Display for QuantityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuantityUnit {
    type Err = AssistantError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Items" => Ok(QuantityUnit::Items),
            "Kilograms" => Ok(QuantityUnit::Kilograms),
            other => Err(AssistantError::InvalidArgument(format!(
                "Encountered unrecognised Sainsbury's Unit value '{}'",
                other
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Quantity — An amount of a trolley line in the retailer's unit
// ---------------------------------------------------------------------------

/// An amount of one trolley line, either counted or weighed.
///
/// Only subtraction between quantities of the same variant is defined. Items
/// and weight never convert into one another here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Quantity {
    ByItems { count: u32 },
    ByWeight { kilograms: f64 },
}

impl Quantity {
    pub fn items(count: u32) -> Self {
        Quantity::ByItems { count }
    }

    pub fn kilograms(kilograms: f64) -> Self {
        Quantity::ByWeight { kilograms }
    }

    pub fn unit(&self) -> QuantityUnit {
        match self {
            Quantity::ByItems { .. } => QuantityUnit::Items,
            Quantity::ByWeight { .. } => QuantityUnit::Kilograms,
        }
    }

    /// The amount as a plain number, in whichever unit the variant uses.
    pub fn magnitude(&self) -> f64 {
        match *self {
            Quantity::ByItems { count } => f64::from(count),
            Quantity::ByWeight { kilograms } => kilograms,
        }
    }

    /// True iff the magnitude is exactly zero.
    pub fn is_empty(&self) -> bool {
        match *self {
            Quantity::ByItems { count } => count == 0,
            Quantity::ByWeight { kilograms } => kilograms == 0.0,
        }
    }

    /// Subtract `other` from `self`.
    ///
    /// Fails with [`AssistantError::TypeMismatch`] when the variants differ and
    /// with [`AssistantError::InvariantViolation`] when the result would be
    /// negative, or for weights not a finite number. A negative result is
    /// never clamped.
    pub fn subtract(&self, other: &Quantity) -> Result<Quantity> {
        match (*self, *other) {
            (Quantity::ByItems { count: a }, Quantity::ByItems { count: b }) => a
                .checked_sub(b)
                .map(Quantity::items)
                .ok_or_else(|| {
                    AssistantError::InvariantViolation(format!("{} items - {} items", a, b))
                }),
            (Quantity::ByWeight { kilograms: a }, Quantity::ByWeight { kilograms: b }) => {
                let difference = a - b;
                if !difference.is_finite() || difference < 0.0 {
                    return Err(AssistantError::InvariantViolation(format!(
                        "{} kg - {} kg",
                        a, b
                    )));
                }
                Ok(Quantity::kilograms(difference))
            }
            (left, right) => Err(AssistantError::TypeMismatch {
                left: left.unit(),
                right: right.unit(),
            }),
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quantity::ByItems { count } => write!(f, "{} items", count),
            Quantity::ByWeight { kilograms } => write!(f, "{} kg", kilograms),
        }
    }
}
