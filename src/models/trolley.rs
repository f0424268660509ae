use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::quantity::Quantity;
use crate::error::Result;

// ---------------------------------------------------------------------------
// LineItem — One product line in the trolley
// ---------------------------------------------------------------------------

/// A product line. Two lines are the same line iff their `id`s are equal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// The retailer's product uid.
    pub id: String,
    pub name: String,
    pub quantity: Quantity,
}

impl LineItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, quantity: Quantity) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            quantity,
        }
    }
}

// ---------------------------------------------------------------------------
// TrolleySnapshot — Ordered point-in-time read of the trolley
// ---------------------------------------------------------------------------

/// The trolley's lines at one moment, in the order the retailer returned them.
///
/// Duplicate ids are tolerated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrolleySnapshot {
    items: Vec<LineItem>,
}

impl TrolleySnapshot {
    pub fn new(items: Vec<LineItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lines added to this snapshot relative to `since`, in this snapshot's order.
    ///
    /// A line whose id is missing from `since` is returned unchanged. A line
    /// present in both is returned with the quantity difference, or dropped if
    /// the difference is empty. When `since` holds the same id more than once
    /// the last occurrence is the one compared against.
    ///
    /// A line whose quantity shrank or changed unit is an error, not an
    /// addition.
    pub fn items_added(&self, since: &TrolleySnapshot) -> Result<Vec<LineItem>> {
        let mut previous: HashMap<&str, &Quantity> = HashMap::with_capacity(since.len());
        for item in since {
            previous.insert(item.id.as_str(), &item.quantity);
        }

        let mut added = Vec::new();
        for item in &self.items {
            match previous.get(item.id.as_str()) {
                None => added.push(item.clone()),
                Some(old) => {
                    let delta = item.quantity.subtract(old)?;
                    if !delta.is_empty() {
                        added.push(LineItem {
                            id: item.id.clone(),
                            name: item.name.clone(),
                            quantity: delta,
                        });
                    }
                }
            }
        }
        Ok(added)
    }
}

impl<'a> IntoIterator for &'a TrolleySnapshot {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<LineItem> for TrolleySnapshot {
    fn from_iter<I: IntoIterator<Item = LineItem>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
