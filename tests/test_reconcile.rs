//! Multiplier derivation and mapping records.

use sainsburys_assistant::reconcile::{automatic_multiplier, manual_multiplier};
use sainsburys_assistant::{
    AssistantError, DisplayQuantity, LineItem, MappingRecord, Multiplier, Quantity, QuantityUnit,
    ShoppingEntry,
};

// ---------------------------------------------------------------------------
// automatic_multiplier
// ---------------------------------------------------------------------------

#[test]
fn automatic_multiplier_divides_by_display_value() {
    let display = DisplayQuantity::new(2.0, Some("bags"));
    let multiplier = automatic_multiplier(&display, &Quantity::items(6)).unwrap();
    assert_eq!(
        multiplier,
        Multiplier {
            value: 3.0,
            unit: QuantityUnit::Items
        }
    );
}

#[test]
fn automatic_multiplier_for_weight() {
    let display = DisplayQuantity::new(4.0, Some("portions"));
    let multiplier = automatic_multiplier(&display, &Quantity::kilograms(1.0)).unwrap();
    assert_eq!(multiplier.value, 0.25);
    assert_eq!(multiplier.unit, QuantityUnit::Kilograms);
}

#[test]
fn automatic_multiplier_needs_positive_display_value() {
    assert!(automatic_multiplier(&DisplayQuantity::new(0.0, None), &Quantity::items(2)).is_none());
    assert!(automatic_multiplier(&DisplayQuantity::new(-1.0, None), &Quantity::items(2)).is_none());
}

// ---------------------------------------------------------------------------
// manual_multiplier
// ---------------------------------------------------------------------------

#[test]
fn manual_multiplier_uses_observed_unit() {
    let multiplier = manual_multiplier(&Quantity::kilograms(0.5), "4/5").unwrap();
    assert_eq!(multiplier.value, 0.8);
    assert_eq!(multiplier.unit, QuantityUnit::Kilograms);

    let multiplier = manual_multiplier(&Quantity::items(1), "1+2+3").unwrap();
    assert_eq!(multiplier.value, 6.0);
    assert_eq!(multiplier.unit, QuantityUnit::Items);
}

#[test]
fn manual_multiplier_propagates_evaluator_errors() {
    let err = manual_multiplier(&Quantity::items(1), "two").unwrap_err();
    assert!(matches!(err, AssistantError::NotSimpleExpression(_)));
}

// ---------------------------------------------------------------------------
// MappingRecord / labels
// ---------------------------------------------------------------------------

#[test]
fn mapping_record_takes_product_identity_from_line() {
    let entry = ShoppingEntry {
        display_name: "Avocado".to_string(),
        display_quantity: DisplayQuantity::new(2.0, None),
        known_trolley_mapping: None,
    };
    let line = LineItem::new(
        "avolarge",
        "By Sainsbury's Large Ripe & Ready Avocado",
        Quantity::items(2),
    );
    let multiplier = automatic_multiplier(&entry.display_quantity, &line.quantity).unwrap();

    let record = MappingRecord::new(&entry, &line, multiplier);
    assert_eq!(record.display_name, "Avocado");
    assert_eq!(record.multiplier, 1.0);
    assert_eq!(record.unit, QuantityUnit::Items);
    assert_eq!(
        record.sainsburys_item_name,
        "By Sainsbury's Large Ripe & Ready Avocado"
    );
    assert_eq!(record.sainsburys_product_uid, "avolarge");
}

#[test]
fn ratio_label_defaults_to_item() {
    assert_eq!(
        Multiplier::ratio_label(QuantityUnit::Kilograms, &DisplayQuantity::new(1.0, Some("bags"))),
        "kg/bags"
    );
    assert_eq!(
        Multiplier::ratio_label(QuantityUnit::Items, &DisplayQuantity::new(1.0, None)),
        "items/item"
    );
}

#[test]
fn display_quantity_formats_like_the_list() {
    assert_eq!(DisplayQuantity::new(3.0, Some("bags")).to_string(), "3 bags");
    assert_eq!(DisplayQuantity::new(0.5, None).to_string(), "0.5");
}
