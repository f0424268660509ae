//! Shared fixtures for the assistant integration tests.
//!
//! Provides Notion page builders shaped like real API responses, sample
//! trolley lines, and in-memory fakes of the ordering collaborators.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use sainsburys_assistant::error::{AssistantError, Result};
use sainsburys_assistant::ordering::{
    ManualAction, MappingSink, Operator, StorefrontBrowser, TrolleyApi,
};
use sainsburys_assistant::{LineItem, MappingRecord, Quantity, ShoppingEntry, TrolleySnapshot};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Trolley lines
// ---------------------------------------------------------------------------

pub fn items(id: &str, count: u32) -> LineItem {
    LineItem::new(id, format!("Sainsbury's {}", id), Quantity::items(count))
}

pub fn weight(id: &str, kilograms: f64) -> LineItem {
    LineItem::new(id, format!("Sainsbury's {}", id), Quantity::kilograms(kilograms))
}

pub fn snapshot(lines: &[LineItem]) -> TrolleySnapshot {
    TrolleySnapshot::new(lines.to_vec())
}

// ---------------------------------------------------------------------------
// Notion pages
// ---------------------------------------------------------------------------

fn rich_text(text: Option<&str>) -> Value {
    match text {
        Some(t) => json!({ "rich_text": [ { "plain_text": t } ] }),
        None => json!({ "rich_text": [] }),
    }
}

/// A Shopping Item page with no mapping, no flags and no manual quantity.
pub fn shopping_page(id: &str, grocery: &str) -> Value {
    json!({
        "id": id,
        "properties": {
            "Grocery": { "title": [ { "plain_text": grocery } ] },
            "Unit": rich_text(None),
            "Manual quantity": { "number": null },
            "Weekly Item": { "checkbox": false },
            "Extra Item": { "checkbox": false },
            "On-demand Item": { "checkbox": false },
            "Sainsbury's Item Name": rich_text(None),
            "Sainsbury's Unit": { "select": null },
            "Sainsbury's Multiplier": { "number": null },
            "Sainsbury's Product UID": rich_text(None),
        }
    })
}

pub fn with_unit(mut page: Value, unit: &str) -> Value {
    page["properties"]["Unit"] = rich_text(Some(unit));
    page
}

pub fn with_manual_quantity(mut page: Value, quantity: f64) -> Value {
    page["properties"]["Manual quantity"] = json!({ "number": quantity });
    page
}

pub fn with_checkbox(mut page: Value, property: &str) -> Value {
    page["properties"][property] = json!({ "checkbox": true });
    page
}

pub fn with_mapping(mut page: Value, name: &str, uid: &str, unit: &str, multiplier: f64) -> Value {
    page["properties"]["Sainsbury's Item Name"] = rich_text(Some(name));
    page["properties"]["Sainsbury's Product UID"] = rich_text(Some(uid));
    page["properties"]["Sainsbury's Unit"] = json!({ "select": { "name": unit } });
    page["properties"]["Sainsbury's Multiplier"] = json!({ "number": multiplier });
    page
}

/// A Recipe ingredient row needing `total` of the item page `item_id`.
pub fn recipe_row(id: &str, item_id: &str, total: f64) -> Value {
    json!({
        "id": id,
        "properties": {
            "Item": { "relation": [ { "id": item_id } ] },
            "Total Needed": { "formula": { "type": "number", "number": total } },
        }
    })
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

/// A trolley that applies adds to its own lines, and lets a test script
/// what the operator adds by hand.
#[derive(Default)]
pub struct FakeTrolley {
    pub lines: RefCell<Vec<LineItem>>,
    /// Product uids whose automatic add fails.
    pub failing: Vec<String>,
    pub emptied: RefCell<bool>,
}

impl FakeTrolley {
    /// Simulate the operator adding `item` in the browser.
    pub fn add_by_hand(&self, item: LineItem) {
        let mut lines = self.lines.borrow_mut();
        match lines.iter_mut().find(|l| l.id == item.id) {
            Some(existing) => {
                existing.quantity = match (existing.quantity, item.quantity) {
                    (Quantity::ByItems { count: a }, Quantity::ByItems { count: b }) => {
                        Quantity::items(a + b)
                    }
                    (Quantity::ByWeight { kilograms: a }, Quantity::ByWeight { kilograms: b }) => {
                        Quantity::kilograms(a + b)
                    }
                    (_, replacement) => replacement,
                }
            }
            None => lines.push(item),
        }
    }
}

impl TrolleyApi for FakeTrolley {
    fn add_item(&self, item: &LineItem) -> Result<()> {
        if self.failing.contains(&item.id) {
            return Err(AssistantError::UnexpectedResponse(format!(
                "404 adding {}",
                item.id
            )));
        }
        self.add_by_hand(item.clone());
        Ok(())
    }

    fn capture_trolley(&self) -> Result<TrolleySnapshot> {
        Ok(TrolleySnapshot::new(self.lines.borrow().clone()))
    }

    fn empty_trolley(&self) -> Result<()> {
        self.lines.borrow_mut().clear();
        *self.emptied.borrow_mut() = true;
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeBrowser {
    pub searches: Vec<String>,
    pub refreshes: usize,
}

impl StorefrontBrowser for FakeBrowser {
    fn search_for(&mut self, term: &str) -> Result<()> {
        self.searches.push(term.to_string());
        Ok(())
    }

    fn refresh(&mut self) -> Result<()> {
        self.refreshes += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeSink {
    pub stored: RefCell<Vec<MappingRecord>>,
    /// Display names that more than one list entry shares.
    pub ambiguous: Vec<String>,
}

impl MappingSink for FakeSink {
    fn store_mapping(&self, record: &MappingRecord) -> Result<()> {
        if self.ambiguous.contains(&record.display_name) {
            return Err(AssistantError::AmbiguousMatch(record.display_name.clone()));
        }
        self.stored.borrow_mut().push(record.clone());
        Ok(())
    }
}

/// One scripted reaction to a manual-entry prompt: lines the operator adds
/// to the trolley, then the action chosen.
pub struct ManualStep {
    pub adds: Vec<LineItem>,
    pub action: ManualAction,
}

/// An operator that follows a script, adding to a shared trolley.
pub struct ScriptedOperator<'a> {
    pub trolley: &'a FakeTrolley,
    pub steps: VecDeque<ManualStep>,
    pub ratios: VecDeque<String>,
    pub notices: Vec<String>,
    pub warnings: Vec<String>,
    pub prompts: Vec<String>,
}

impl<'a> ScriptedOperator<'a> {
    pub fn new(trolley: &'a FakeTrolley, steps: Vec<ManualStep>) -> Self {
        Self {
            trolley,
            steps: steps.into(),
            ratios: VecDeque::new(),
            notices: Vec::new(),
            warnings: Vec::new(),
            prompts: Vec::new(),
        }
    }

    pub fn with_ratios(mut self, ratios: &[&str]) -> Self {
        self.ratios = ratios.iter().map(|r| r.to_string()).collect();
        self
    }
}

impl Operator for ScriptedOperator<'_> {
    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn wait_for_enter(&mut self, _message: &str) -> Result<()> {
        Ok(())
    }

    fn manual_action(
        &mut self,
        _position: usize,
        _total: usize,
        _entry: &ShoppingEntry,
    ) -> Result<ManualAction> {
        let step = self
            .steps
            .pop_front()
            .expect("operator script ran out of steps");
        for item in step.adds {
            self.trolley.add_by_hand(item);
        }
        Ok(step.action)
    }

    fn ratio(&mut self, prompt: &str) -> Result<String> {
        self.prompts.push(prompt.to_string());
        Ok(self
            .ratios
            .pop_front()
            .expect("operator script ran out of ratios"))
    }
}
