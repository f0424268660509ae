//! Builder for Notion database-query request bodies.
//!
//! Builder methods return `&mut Self` for chaining; [`QueryBuilder::build`]
//! produces the JSON body for `POST /databases/{id}/query`.
//!
//! # Example
//!
//! ```rust
//! use sainsburys_assistant::notion::query_builder::{checkbox_equals, QueryBuilder};
//! let body = QueryBuilder::new()
//!     .where_condition(checkbox_equals("Stocked?", false))
//!     .sort_ascending("Aisle")
//!     .build();
//! assert_eq!(body["filter"]["checkbox"]["equals"], false);
//! ```

use serde_json::{json, Map, Value};

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

/// `{property}` is a formula whose number result is greater than `value`.
pub fn formula_number_greater_than(property: &str, value: f64) -> Value {
    json!({
        "property": property,
        "formula": { "number": { "greater_than": value } }
    })
}

/// `{property}` is a checkbox equal to `value`.
pub fn checkbox_equals(property: &str, value: bool) -> Value {
    json!({
        "property": property,
        "checkbox": { "equals": value }
    })
}

/// `{property}` is a number that has been filled in.
pub fn number_is_not_empty(property: &str) -> Value {
    json!({
        "property": property,
        "number": { "is_not_empty": true }
    })
}

/// `{property}` is a title exactly equal to `value`.
pub fn title_equals(property: &str, value: &str) -> Value {
    json!({
        "property": property,
        "title": { "equals": value }
    })
}

// ---------------------------------------------------------------------------
// QueryBuilder
// ---------------------------------------------------------------------------

/// Builds a Notion database query body.
///
/// Top-level conditions are combined with `and`. A single condition is sent
/// bare, and no conditions omit the `filter` key entirely.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    conditions: Vec<Value>,
    sorts: Vec<Value>,
    start_cursor: Option<String>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition that must hold.
    pub fn where_condition(&mut self, condition: Value) -> &mut Self {
        self.conditions.push(condition);
        self
    }

    /// Add a group of conditions of which at least one must hold.
    ///
    /// An empty group is ignored.
    pub fn where_any(&mut self, conditions: &[Value]) -> &mut Self {
        match conditions {
            [] => {}
            [single] => self.conditions.push(single.clone()),
            many => self.conditions.push(json!({ "or": many })),
        }
        self
    }

    pub fn sort_ascending(&mut self, property: &str) -> &mut Self {
        self.sorts
            .push(json!({ "property": property, "direction": "ascending" }));
        self
    }

    /// Resume from the `next_cursor` of a previous page.
    pub fn start_cursor(&mut self, cursor: &str) -> &mut Self {
        self.start_cursor = Some(cursor.to_string());
        self
    }

    /// Build the JSON request body.
    pub fn build(&self) -> Value {
        let mut body = Map::new();

        match self.conditions.as_slice() {
            [] => {}
            [single] => {
                body.insert("filter".to_string(), single.clone());
            }
            many => {
                body.insert("filter".to_string(), json!({ "and": many }));
            }
        }

        if !self.sorts.is_empty() {
            body.insert("sorts".to_string(), Value::Array(self.sorts.clone()));
        }

        if let Some(cursor) = &self.start_cursor {
            body.insert("start_cursor".to_string(), json!(cursor));
        }

        Value::Object(body)
    }
}
