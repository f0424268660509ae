//! The ordering session: fill the trolley from the shopping list, then walk
//! the operator through every entry that has no known product.
//!
//! The flow only talks to its collaborators through the traits below, so it
//! runs the same against the live site and against in-memory fakes.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::error::Result;
use crate::models::{LineItem, ShoppingEntry, TrolleySnapshot};
use crate::notion::NotionDataProvider;
use crate::reconcile::{automatic_multiplier, manual_multiplier, MappingRecord, Multiplier};
use crate::sainsburys::{SainsburysClient, SainsburysDriver};

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// The retailer's trolley.
pub trait TrolleyApi {
    /// Add `item`, growing any existing line for the same product.
    fn add_item(&self, item: &LineItem) -> Result<()>;
    fn capture_trolley(&self) -> Result<TrolleySnapshot>;
    fn empty_trolley(&self) -> Result<()>;
}

/// The browser window the operator shops in.
pub trait StorefrontBrowser {
    fn search_for(&mut self, term: &str) -> Result<()>;
    fn refresh(&mut self) -> Result<()>;
}

/// Where discovered entry-to-product mappings are kept.
pub trait MappingSink {
    fn store_mapping(&self, record: &MappingRecord) -> Result<()>;
}

/// What the operator chose after adding an item by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualAction {
    /// Record the mapping with a multiplier worked out from the quantities.
    Save,
    /// Record the mapping with a ratio the operator types in.
    SetRatio,
    /// Record nothing.
    Skip,
}

/// The person at the keyboard.
pub trait Operator {
    fn notify(&mut self, message: &str);
    fn warn(&mut self, message: &str);
    /// Show `message` and block until the operator acknowledges it.
    fn wait_for_enter(&mut self, message: &str) -> Result<()>;
    /// Ask the operator to add `entry` by hand; `position` counts from 1.
    fn manual_action(
        &mut self,
        position: usize,
        total: usize,
        entry: &ShoppingEntry,
    ) -> Result<ManualAction>;
    fn ratio(&mut self, prompt: &str) -> Result<String>;
}

impl TrolleyApi for SainsburysClient {
    fn add_item(&self, item: &LineItem) -> Result<()> {
        SainsburysClient::add_item(self, item)
    }

    fn capture_trolley(&self) -> Result<TrolleySnapshot> {
        SainsburysClient::capture_trolley(self)
    }

    fn empty_trolley(&self) -> Result<()> {
        SainsburysClient::empty_trolley(self)
    }
}

impl StorefrontBrowser for SainsburysDriver {
    fn search_for(&mut self, term: &str) -> Result<()> {
        SainsburysDriver::search_for(self, term)
    }

    fn refresh(&mut self) -> Result<()> {
        SainsburysDriver::refresh(self)
    }
}

impl MappingSink for NotionDataProvider {
    fn store_mapping(&self, record: &MappingRecord) -> Result<()> {
        NotionDataProvider::store_mapping(self, record)
    }
}

// ---------------------------------------------------------------------------
// OrderingReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderingReport {
    /// Entries added from their known mapping.
    pub added_automatically: usize,
    /// Mappings discovered and stored during the manual pass.
    pub recorded: Vec<MappingRecord>,
    /// Manual entries the operator chose not to record.
    pub skipped: usize,
    /// Manual entries where no mapping could be recorded.
    pub unrecorded: usize,
}

// ---------------------------------------------------------------------------
// OrderingFlow
// ---------------------------------------------------------------------------

pub struct OrderingFlow<'a, T, B, S, O> {
    trolley: &'a T,
    browser: &'a mut B,
    sink: &'a S,
    operator: &'a mut O,
    show_progress: bool,
}

impl<'a, T, B, S, O> OrderingFlow<'a, T, B, S, O>
where
    T: TrolleyApi,
    B: StorefrontBrowser,
    S: MappingSink,
    O: Operator,
{
    pub fn new(trolley: &'a T, browser: &'a mut B, sink: &'a S, operator: &'a mut O) -> Self {
        Self {
            trolley,
            browser,
            sink,
            operator,
            show_progress: true,
        }
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Empty the trolley and order `entries`, automatically where possible.
    pub fn run(&mut self, entries: Vec<ShoppingEntry>) -> Result<OrderingReport> {
        self.operator
            .wait_for_enter("Press Enter when ready to empty trolley and add items")?;
        self.trolley.empty_trolley()?;

        let mut report = OrderingReport::default();
        let manual = self.order_automatically(entries, &mut report);
        self.browser.refresh()?;

        if !manual.is_empty() {
            self.operator.notify(&format!(
                "Please manually add the remaining {} items:",
                manual.len()
            ));
        }
        let total = manual.len();
        for (index, entry) in manual.iter().enumerate() {
            self.order_manually(index + 1, total, entry, &mut report)?;
        }

        info!(
            automatic = report.added_automatically,
            recorded = report.recorded.len(),
            skipped = report.skipped,
            unrecorded = report.unrecorded,
            "finished list"
        );
        Ok(report)
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) =
            ProgressStyle::default_bar().template("Adding items to trolley [{bar:40}] {pos}/{len}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb
    }

    /// Add every entry with a known mapping; return the rest.
    ///
    /// A failed add is logged and the entry is handed to the manual pass.
    fn order_automatically(
        &mut self,
        entries: Vec<ShoppingEntry>,
        report: &mut OrderingReport,
    ) -> Vec<ShoppingEntry> {
        let pb = self.progress_bar(entries.len());
        let mut manual = Vec::new();

        for entry in entries {
            pb.inc(1);
            let added = match &entry.known_trolley_mapping {
                None => false,
                Some(item) => match self.trolley.add_item(item) {
                    Ok(()) => true,
                    Err(e) => {
                        pb.suspend(|| {
                            warn!(item = %entry.display_name, "failed to automatically order: {}", e)
                        });
                        false
                    }
                },
            };
            if added {
                report.added_automatically += 1;
            } else {
                manual.push(entry);
            }
        }

        pb.finish_and_clear();
        manual
    }

    fn order_manually(
        &mut self,
        position: usize,
        total: usize,
        entry: &ShoppingEntry,
        report: &mut OrderingReport,
    ) -> Result<()> {
        self.browser.search_for(entry.search_term())?;
        let before = self.trolley.capture_trolley()?;

        let action = self.operator.manual_action(position, total, entry)?;
        if action == ManualAction::Skip {
            report.skipped += 1;
            return Ok(());
        }

        let after = self.trolley.capture_trolley()?;
        let added = match after.items_added(&before) {
            Ok(added) => added,
            Err(e) => {
                self.operator.warn(&format!(
                    "Could not work out what was added for {}: {}",
                    entry.display_name, e
                ));
                report.unrecorded += 1;
                return Ok(());
            }
        };
        let [item] = added.as_slice() else {
            self.operator
                .warn("Found no or multiple new items in trolley so did not record choice");
            report.unrecorded += 1;
            return Ok(());
        };
        if entry.display_quantity.value <= 0.0 {
            self.operator.warn(&format!(
                "{} has no quantity on the list so did not record choice",
                entry.display_name
            ));
            report.unrecorded += 1;
            return Ok(());
        }

        let multiplier = match (action, automatic_multiplier(&entry.display_quantity, &item.quantity)) {
            (ManualAction::Save, Some(multiplier)) => multiplier,
            _ => self.ask_ratio(entry, item)?,
        };

        let record = MappingRecord::new(entry, item, multiplier);
        match self.sink.store_mapping(&record) {
            Ok(()) => {
                self.operator.notify(&format!(
                    "Recorded '{}' ({} {})",
                    item.name,
                    record.multiplier,
                    Multiplier::ratio_label(record.unit, &entry.display_quantity)
                ));
                report.recorded.push(record);
            }
            Err(e) => {
                self.operator.warn(&format!(
                    "Encountered error when recording item association for: {}\n{}",
                    entry.display_name, e
                ));
                report.unrecorded += 1;
            }
        }
        Ok(())
    }

    /// Prompt until the operator types a ratio that evaluates.
    fn ask_ratio(&mut self, entry: &ShoppingEntry, item: &LineItem) -> Result<Multiplier> {
        let prompt = format!(
            "Detected '{}' for Notion item '{}'. Set ratio [{}]",
            item.name,
            entry.display_name,
            Multiplier::ratio_label(item.quantity.unit(), &entry.display_quantity)
        );
        loop {
            let text = self.operator.ratio(&prompt)?;
            match manual_multiplier(&item.quantity, &text) {
                Ok(multiplier) => return Ok(multiplier),
                Err(e) => self.operator.warn(&e.to_string()),
            }
        }
    }
}
