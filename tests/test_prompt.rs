//! Terminal prompts driven from in-memory input.

use std::io::Cursor;

use sainsburys_assistant::ordering::{ManualAction, Operator};
use sainsburys_assistant::{AssistantError, DisplayQuantity, ShoppingEntry, TerminalOperator};

fn entry() -> ShoppingEntry {
    ShoppingEntry {
        display_name: "Rice".to_string(),
        display_quantity: DisplayQuantity::new(2.0, Some("bags")),
        known_trolley_mapping: None,
    }
}

fn actions(input: &str) -> Vec<ManualAction> {
    let mut output = Vec::new();
    let mut operator = TerminalOperator::new(Cursor::new(input.to_string()), &mut output);
    input
        .lines()
        .map(|_| operator.manual_action(1, 1, &entry()).unwrap())
        .collect()
}

#[test]
fn manual_action_answers() {
    assert_eq!(
        actions("\nm\nMANUAL\nx\nX\nanything\n"),
        vec![
            ManualAction::Save,
            ManualAction::SetRatio,
            ManualAction::SetRatio,
            ManualAction::Skip,
            ManualAction::Skip,
            ManualAction::Save,
        ]
    );
}

#[test]
fn manual_action_prompt_names_the_entry() {
    let mut output = Vec::new();
    {
        let mut operator = TerminalOperator::new(Cursor::new("\n"), &mut output);
        operator.manual_action(2, 5, &entry()).unwrap();
    }
    let written = String::from_utf8(output).unwrap();
    assert!(written.starts_with("(2/5) Add Rice (2 bags) then press Enter"));
}

#[test]
fn ratio_is_trimmed() {
    let mut output = Vec::new();
    let mut operator = TerminalOperator::new(Cursor::new("  3/4  \n"), &mut output);
    assert_eq!(operator.ratio("Set ratio [kg/bags]").unwrap(), "3/4");
}

#[test]
fn warnings_are_marked() {
    let mut output = Vec::new();
    {
        let mut operator = TerminalOperator::new(Cursor::new(""), &mut output);
        operator.notify("Logging in...");
        operator.warn("Could not record");
    }
    assert_eq!(
        String::from_utf8(output).unwrap(),
        "Logging in...\n! Could not record\n"
    );
}

#[test]
fn closed_input_is_an_error() {
    let mut output = Vec::new();
    let mut operator = TerminalOperator::new(Cursor::new(""), &mut output);
    assert!(matches!(
        operator.wait_for_enter("Press Enter"),
        Err(AssistantError::Io(_))
    ));
}
