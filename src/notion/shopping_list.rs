//! The shopping list and item mappings stored in Notion.
//!
//! Assumes a Shopping Item database (one page per grocery) and a Recipe
//! database whose ingredient rows relate to exactly one shopping item each.
//! The property names below are the schema both databases must follow.

use std::collections::{HashMap, HashSet};

use serde_json::{json, Value};
use tracing::{info, warn};

use super::client::NotionClient;
use super::query_builder::{
    checkbox_equals, formula_number_greater_than, number_is_not_empty, title_equals, QueryBuilder,
};
use crate::error::{AssistantError, Result};
use crate::models::{DisplayQuantity, LineItem, Quantity, QuantityUnit, ShoppingEntry};
use crate::reconcile::MappingRecord;

pub const GROCERY: &str = "Grocery";
pub const AISLE: &str = "Aisle";
pub const UNIT: &str = "Unit";
pub const TOTAL_NEEDED: &str = "Total Needed";
pub const MANUAL_QUANTITY: &str = "Manual quantity";
pub const WEEKLY_ITEM: &str = "Weekly Item";
pub const EXTRA_ITEM: &str = "Extra Item";
pub const ON_DEMAND_ITEM: &str = "On-demand Item";
pub const STOCKED: &str = "Stocked?";
pub const SAINSBURYS_ITEM_NAME: &str = "Sainsbury's Item Name";
pub const SAINSBURYS_UNIT: &str = "Sainsbury's Unit";
pub const SAINSBURYS_MULTIPLIER: &str = "Sainsbury's Multiplier";
pub const SAINSBURYS_PRODUCT_UID: &str = "Sainsbury's Product UID";
/// Relation from a recipe ingredient row to its shopping item.
pub const RECIPE_ITEM: &str = "Item";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Items that are needed by a recipe, flagged as wanted, or given a manual
/// quantity, and are not already stocked. Sorted by aisle, then name.
pub fn shopping_list_query() -> QueryBuilder {
    let mut query = QueryBuilder::new();
    query
        .where_any(&[
            formula_number_greater_than(TOTAL_NEEDED, 0.0),
            checkbox_equals(WEEKLY_ITEM, true),
            checkbox_equals(EXTRA_ITEM, true),
            number_is_not_empty(MANUAL_QUANTITY),
            checkbox_equals(ON_DEMAND_ITEM, true),
        ])
        .where_condition(checkbox_equals(STOCKED, false))
        .sort_ascending(AISLE)
        .sort_ascending(GROCERY);
    query
}

/// Recipe ingredient rows that contribute a positive amount.
pub fn recipe_query() -> QueryBuilder {
    let mut query = QueryBuilder::new();
    query.where_condition(formula_number_greater_than(TOTAL_NEEDED, 0.0));
    query
}

pub fn item_by_name_query(display_name: &str) -> QueryBuilder {
    let mut query = QueryBuilder::new();
    query.where_condition(title_equals(GROCERY, display_name));
    query
}

// ---------------------------------------------------------------------------
// Page parsing
// ---------------------------------------------------------------------------

fn page_id(page: &Value) -> Result<&str> {
    page.get("id")
        .and_then(Value::as_str)
        .ok_or_else(|| AssistantError::UnexpectedResponse("page without an id".to_string()))
}

fn property<'a>(page: &'a Value, name: &str) -> Result<&'a Value> {
    page.get("properties")
        .and_then(|p| p.get(name))
        .ok_or_else(|| {
            AssistantError::UnexpectedResponse(format!(
                "page {} has no property '{}'",
                page.get("id").and_then(Value::as_str).unwrap_or("?"),
                name
            ))
        })
}

/// First `plain_text` of a `title` or `rich_text` property, if any.
fn first_plain_text(page: &Value, name: &str, kind: &str) -> Result<Option<String>> {
    Ok(property(page, name)?
        .get(kind)
        .and_then(Value::as_array)
        .and_then(|parts| parts.first())
        .and_then(|part| part.get("plain_text"))
        .and_then(Value::as_str)
        .map(str::to_string))
}

fn checkbox(page: &Value, name: &str) -> Result<bool> {
    Ok(property(page, name)?
        .get("checkbox")
        .and_then(Value::as_bool)
        .unwrap_or(false))
}

fn number(page: &Value, name: &str) -> Result<Option<f64>> {
    Ok(property(page, name)?.get("number").and_then(Value::as_f64))
}

fn formula_number(page: &Value, name: &str) -> Result<Option<f64>> {
    Ok(property(page, name)?
        .get("formula")
        .and_then(|f| f.get("number"))
        .and_then(Value::as_f64))
}

/// Sum the amount every recipe needs of each shopping item, keyed by item page id.
pub fn recipe_quantities(rows: &[Value]) -> Result<HashMap<String, f64>> {
    let mut seen = HashSet::with_capacity(rows.len());
    let mut quantities: HashMap<String, f64> = HashMap::new();

    for row in rows {
        let row_id = page_id(row)?;
        if !seen.insert(row_id) {
            return Err(AssistantError::UnexpectedResponse(format!(
                "recipe row {} returned more than once",
                row_id
            )));
        }

        let related = property(row, RECIPE_ITEM)?
            .get("relation")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let item_id = match related {
            [only] => only.get("id").and_then(Value::as_str).ok_or_else(|| {
                AssistantError::UnexpectedResponse(format!(
                    "recipe row {} relates to an item without an id",
                    row_id
                ))
            })?,
            _ => {
                return Err(AssistantError::UnexpectedResponse(format!(
                    "recipe row {} relates to {} items, expected exactly one",
                    row_id,
                    related.len()
                )))
            }
        };

        let needed = formula_number(row, TOTAL_NEEDED)?.ok_or_else(|| {
            AssistantError::UnexpectedResponse(format!(
                "recipe row {} has no '{}' value",
                row_id, TOTAL_NEEDED
            ))
        })?;
        *quantities.entry(item_id.to_string()).or_insert(0.0) += needed;
    }

    Ok(quantities)
}

/// The trolley quantity to order for `total_needed` list units at the given
/// multiplier.
///
/// Weights are used as-is. Item counts are rounded up unless within
/// `tolerance` of the whole number below, and any non-zero need of less than
/// `tolerance` items becomes one item.
pub fn expected_quantity(
    total_needed: f64,
    multiplier: f64,
    unit: QuantityUnit,
    tolerance: f64,
) -> Result<Quantity> {
    let mut value = total_needed * multiplier;
    if !value.is_finite() || value < 0.0 {
        return Err(AssistantError::InvalidArgument(format!(
            "cannot order {} x {} {}",
            total_needed,
            multiplier,
            unit.short_label()
        )));
    }
    match unit {
        QuantityUnit::Items => {
            if value != 0.0 && value <= tolerance {
                value = 1.0;
            }
            let count = (value - tolerance).ceil().max(0.0);
            Ok(Quantity::items(count as u32))
        }
        QuantityUnit::Kilograms => Ok(Quantity::kilograms(value)),
    }
}

fn known_mapping(page: &Value, total_needed: f64, tolerance: f64) -> Result<Option<LineItem>> {
    let name = first_plain_text(page, SAINSBURYS_ITEM_NAME, "rich_text")?;
    let uid = first_plain_text(page, SAINSBURYS_PRODUCT_UID, "rich_text")?;
    let unit = property(page, SAINSBURYS_UNIT)?
        .get("select")
        .filter(|s| !s.is_null());
    let multiplier = number(page, SAINSBURYS_MULTIPLIER)?.filter(|m| *m != 0.0);

    let (Some(name), Some(uid), Some(unit), Some(multiplier)) = (name, uid, unit, multiplier)
    else {
        return Ok(None);
    };

    let unit: QuantityUnit = unit
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            AssistantError::UnexpectedResponse(format!(
                "'{}' of page {} has no name",
                SAINSBURYS_UNIT,
                page_id(page).unwrap_or("?")
            ))
        })?
        .parse()?;

    let quantity = expected_quantity(total_needed, multiplier, unit, tolerance)?;
    Ok(Some(LineItem::new(uid, name, quantity)))
}

/// Build the shopping entry for one Shopping Item page.
pub fn shopping_entry_from_page(
    page: &Value,
    recipe_quantities: &HashMap<String, f64>,
    tolerance: f64,
) -> Result<ShoppingEntry> {
    let id = page_id(page)?;
    let mut total_needed = recipe_quantities.get(id).copied().unwrap_or(0.0)
        + number(page, MANUAL_QUANTITY)?.unwrap_or(0.0);

    // Items flagged as wanted without an explicit quantity get one unit.
    if total_needed == 0.0
        && (checkbox(page, EXTRA_ITEM)?
            || checkbox(page, WEEKLY_ITEM)?
            || checkbox(page, ON_DEMAND_ITEM)?)
    {
        total_needed = 1.0;
    }

    let display_name = first_plain_text(page, GROCERY, "title")?.ok_or_else(|| {
        AssistantError::UnexpectedResponse(format!("page {} has an empty '{}'", id, GROCERY))
    })?;
    let unit = first_plain_text(page, UNIT, "rich_text")?;

    Ok(ShoppingEntry {
        display_name,
        display_quantity: DisplayQuantity {
            value: total_needed,
            unit,
        },
        known_trolley_mapping: known_mapping(page, total_needed, tolerance)?,
    })
}

/// Split entries into those to order and the names of those with nothing to order.
pub fn split_zero_quantity(entries: Vec<ShoppingEntry>) -> (Vec<ShoppingEntry>, Vec<String>) {
    let (zero, non_zero): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .partition(|e| e.display_quantity.value == 0.0);
    (non_zero, zero.into_iter().map(|e| e.display_name).collect())
}

fn rich_text(content: &str) -> Value {
    json!({
        "rich_text": [
            { "type": "text", "text": { "content": content } }
        ]
    })
}

/// Page properties that store `record` on its shopping item.
pub fn mapping_properties(record: &MappingRecord) -> Value {
    json!({
        SAINSBURYS_MULTIPLIER: { "number": record.multiplier },
        SAINSBURYS_ITEM_NAME: rich_text(&record.sainsburys_item_name),
        SAINSBURYS_PRODUCT_UID: rich_text(&record.sainsburys_product_uid),
        SAINSBURYS_UNIT: { "select": { "name": record.unit.as_str() } },
    })
}

// ---------------------------------------------------------------------------
// NotionDataProvider
// ---------------------------------------------------------------------------

/// Reads the shopping list from, and writes item mappings back to, Notion.
pub struct NotionDataProvider {
    client: NotionClient,
    shopping_item_db: String,
    recipe_db: String,
    items_rounding_tolerance: f64,
}

impl NotionDataProvider {
    pub fn new(
        client: NotionClient,
        shopping_item_db: &str,
        recipe_db: &str,
        items_rounding_tolerance: f64,
    ) -> Self {
        Self {
            client,
            shopping_item_db: shopping_item_db.to_string(),
            recipe_db: recipe_db.to_string(),
            items_rounding_tolerance,
        }
    }

    /// Fetch the entries that need ordering, in aisle order.
    ///
    /// Entries that work out to a zero quantity are dropped with a warning.
    pub fn shopping_list(&self) -> Result<Vec<ShoppingEntry>> {
        let pages = self
            .client
            .query_database(&self.shopping_item_db, &shopping_list_query())?;
        let recipe_rows = self
            .client
            .query_database(&self.recipe_db, &recipe_query())?;
        let quantities = recipe_quantities(&recipe_rows)?;

        let entries = pages
            .iter()
            .map(|page| shopping_entry_from_page(page, &quantities, self.items_rounding_tolerance))
            .collect::<Result<Vec<_>>>()?;

        let (entries, skipped) = split_zero_quantity(entries);
        if !skipped.is_empty() {
            warn!(
                items = ?skipped,
                "the following items have a quantity of 0 and will be skipped"
            );
        }
        info!(entries = entries.len(), "fetched shopping list");
        Ok(entries)
    }

    /// Store `record` on the shopping item with the same name.
    ///
    /// Nothing is written unless exactly one item has that name.
    pub fn store_mapping(&self, record: &MappingRecord) -> Result<()> {
        let matches = self.client.query_database(
            &self.shopping_item_db,
            &item_by_name_query(&record.display_name),
        )?;
        let page = match matches.as_slice() {
            [] => {
                return Err(AssistantError::NotFound(format!(
                    "no shopping item named {}",
                    record.display_name
                )))
            }
            [page] => page,
            _ => return Err(AssistantError::AmbiguousMatch(record.display_name.clone())),
        };

        self.client
            .update_page(page_id(page)?, mapping_properties(record))?;
        info!(
            item = %record.display_name,
            product = %record.sainsburys_item_name,
            multiplier = record.multiplier,
            unit = %record.unit,
            "stored item mapping"
        );
        Ok(())
    }
}
