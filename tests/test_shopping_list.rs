//! Turning Notion pages into shopping entries, and mappings into page properties.

mod common;

use std::collections::HashMap;

use common::{
    recipe_row, shopping_page, with_checkbox, with_manual_quantity, with_mapping, with_unit,
};
use sainsburys_assistant::notion::shopping_list::{
    expected_quantity, mapping_properties, recipe_quantities, shopping_entry_from_page,
    split_zero_quantity,
};
use sainsburys_assistant::{
    AssistantError, DisplayQuantity, LineItem, MappingRecord, Quantity, QuantityUnit,
};
use serde_json::json;

const TOLERANCE: f64 = 0.2;

// ---------------------------------------------------------------------------
// recipe_quantities
// ---------------------------------------------------------------------------

#[test]
fn recipe_quantities_sum_per_item() {
    let rows = vec![
        recipe_row("r1", "onion", 1.0),
        recipe_row("r2", "onion", 2.5),
        recipe_row("r3", "garlic", 3.0),
    ];
    let quantities = recipe_quantities(&rows).unwrap();
    assert_eq!(quantities.len(), 2);
    assert_eq!(quantities["onion"], 3.5);
    assert_eq!(quantities["garlic"], 3.0);
}

#[test]
fn recipe_quantities_reject_duplicate_rows() {
    let rows = vec![recipe_row("r1", "onion", 1.0), recipe_row("r1", "onion", 1.0)];
    assert!(matches!(
        recipe_quantities(&rows),
        Err(AssistantError::UnexpectedResponse(_))
    ));
}

#[test]
fn recipe_quantities_need_exactly_one_item() {
    let mut row = recipe_row("r1", "onion", 1.0);
    row["properties"]["Item"]["relation"] = json!([{ "id": "a" }, { "id": "b" }]);
    assert!(recipe_quantities(&[row]).is_err());

    let mut row = recipe_row("r2", "onion", 1.0);
    row["properties"]["Item"]["relation"] = json!([]);
    assert!(recipe_quantities(&[row]).is_err());
}

// ---------------------------------------------------------------------------
// expected_quantity
// ---------------------------------------------------------------------------

#[test]
fn weights_are_not_rounded() {
    let q = expected_quantity(3.0, 0.25, QuantityUnit::Kilograms, TOLERANCE).unwrap();
    assert_eq!(q, Quantity::kilograms(0.75));
}

#[test]
fn items_round_up_beyond_tolerance() {
    let q = |needed: f64| expected_quantity(needed, 1.0, QuantityUnit::Items, TOLERANCE).unwrap();
    assert_eq!(q(2.0), Quantity::items(2));
    assert_eq!(q(2.5), Quantity::items(3));
    assert_eq!(q(2.1), Quantity::items(2));
    assert_eq!(q(0.0), Quantity::items(0));
}

#[test]
fn small_item_needs_become_one() {
    let q = expected_quantity(1.0, 0.1, QuantityUnit::Items, TOLERANCE).unwrap();
    assert_eq!(q, Quantity::items(1));
}

#[test]
fn negative_quantities_are_rejected() {
    assert!(expected_quantity(2.0, -1.0, QuantityUnit::Kilograms, TOLERANCE).is_err());
}

// ---------------------------------------------------------------------------
// shopping_entry_from_page
// ---------------------------------------------------------------------------

#[test]
fn entry_combines_recipe_and_manual_quantities() {
    let page = with_unit(with_manual_quantity(shopping_page("onion", "Onions"), 1.0), "onions");
    let quantities = HashMap::from([("onion".to_string(), 2.0)]);

    let entry = shopping_entry_from_page(&page, &quantities, TOLERANCE).unwrap();
    assert_eq!(entry.display_name, "Onions");
    assert_eq!(entry.display_quantity, DisplayQuantity::new(3.0, Some("onions")));
    assert!(entry.known_trolley_mapping.is_none());
}

#[test]
fn flagged_entry_without_quantity_defaults_to_one() {
    for flag in ["Weekly Item", "Extra Item", "On-demand Item"] {
        let page = with_checkbox(shopping_page("milk", "Milk"), flag);
        let entry = shopping_entry_from_page(&page, &HashMap::new(), TOLERANCE).unwrap();
        assert_eq!(entry.display_quantity.value, 1.0, "flag {}", flag);
    }
}

#[test]
fn unflagged_entry_without_quantity_is_zero() {
    let page = shopping_page("milk", "Milk");
    let entry = shopping_entry_from_page(&page, &HashMap::new(), TOLERANCE).unwrap();
    assert_eq!(entry.display_quantity.value, 0.0);
}

#[test]
fn mapped_entry_carries_expected_trolley_line() {
    let page = with_mapping(
        with_manual_quantity(shopping_page("avo", "Avocado"), 3.0),
        "By Sainsbury's Large Ripe & Ready Avocado",
        "avolarge",
        "Items",
        0.5,
    );
    let entry = shopping_entry_from_page(&page, &HashMap::new(), TOLERANCE).unwrap();
    assert_eq!(
        entry.known_trolley_mapping,
        Some(LineItem::new(
            "avolarge",
            "By Sainsbury's Large Ripe & Ready Avocado",
            Quantity::items(2)
        ))
    );
    assert_eq!(entry.search_term(), "By Sainsbury's Large Ripe & Ready Avocado");
}

#[test]
fn incomplete_or_zero_mapping_is_ignored() {
    let page = with_mapping(shopping_page("avo", "Avocado"), "Avocado", "avo", "Items", 0.0);
    let entry = shopping_entry_from_page(&page, &HashMap::new(), TOLERANCE).unwrap();
    assert!(entry.known_trolley_mapping.is_none());
    assert_eq!(entry.search_term(), "Avocado");

    let mut page = with_mapping(shopping_page("avo", "Avocado"), "Avocado", "avo", "Items", 1.0);
    page["properties"]["Sainsbury's Product UID"] = json!({ "rich_text": [] });
    let entry = shopping_entry_from_page(&page, &HashMap::new(), TOLERANCE).unwrap();
    assert!(entry.known_trolley_mapping.is_none());
}

#[test]
fn unknown_unit_is_an_error() {
    let page = with_mapping(shopping_page("oil", "Oil"), "Olive Oil", "oil", "Litres", 1.0);
    assert!(matches!(
        shopping_entry_from_page(&page, &HashMap::new(), TOLERANCE),
        Err(AssistantError::InvalidArgument(_))
    ));
}

#[test]
fn missing_property_is_an_error() {
    let mut page = shopping_page("milk", "Milk");
    page["properties"]
        .as_object_mut()
        .unwrap()
        .remove("Extra Item");
    assert!(matches!(
        shopping_entry_from_page(&page, &HashMap::new(), TOLERANCE),
        Err(AssistantError::UnexpectedResponse(_))
    ));
}

#[test]
fn zero_quantity_entries_are_split_out() {
    let quantities = HashMap::from([("bread".to_string(), 1.0)]);
    let entries = vec![
        shopping_entry_from_page(&shopping_page("milk", "Milk"), &quantities, TOLERANCE).unwrap(),
        shopping_entry_from_page(&shopping_page("bread", "Bread"), &quantities, TOLERANCE).unwrap(),
    ];
    let (to_order, skipped) = split_zero_quantity(entries);
    assert_eq!(to_order.len(), 1);
    assert_eq!(to_order[0].display_name, "Bread");
    assert_eq!(skipped, vec!["Milk".to_string()]);
}

// ---------------------------------------------------------------------------
// mapping_properties
// ---------------------------------------------------------------------------

#[test]
fn mapping_properties_shape() {
    let record = MappingRecord {
        display_name: "Carrots".to_string(),
        multiplier: 0.1,
        unit: QuantityUnit::Kilograms,
        sainsburys_item_name: "Sainsbury's British Carrots Loose".to_string(),
        sainsburys_product_uid: "carrot".to_string(),
    };
    assert_eq!(
        mapping_properties(&record),
        json!({
            "Sainsbury's Multiplier": { "number": 0.1 },
            "Sainsbury's Item Name": {
                "rich_text": [ { "type": "text", "text": { "content": "Sainsbury's British Carrots Loose" } } ]
            },
            "Sainsbury's Product UID": {
                "rich_text": [ { "type": "text", "text": { "content": "carrot" } } ]
            },
            "Sainsbury's Unit": { "select": { "name": "Kilograms" } },
        })
    );
}
