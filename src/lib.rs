//! Sainsbury's grocery reordering assistant.
//!
//! Reads a shopping list from Notion, logs in to Sainsbury's in a browser,
//! empties the trolley and adds every item whose product is already known.
//! For the rest the operator searches and adds a product by hand; the
//! assistant works out what was added by diffing the trolley and stores the
//! item-to-product mapping, with a unit multiplier, back in Notion for next
//! time.
//!
//! # Quick start
//!
//! ```no_run
//! use sainsburys_assistant::{Assistant, Config, TerminalOperator};
//!
//! let config = Config::from_env().unwrap();
//! let assistant = Assistant::builder().build(config).unwrap();
//! let report = assistant.run(&mut TerminalOperator::stdio()).unwrap();
//! println!("recorded {} new mappings", report.recorded.len());
//! ```

pub mod config;
pub mod error;
pub mod expression;
mod http;
pub mod models;
pub mod notion;
pub mod ordering;
pub mod prompt;
pub mod reconcile;
pub mod sainsburys;
pub mod webdriver;

pub use config::Config;
pub use error::{AssistantError, Result};
pub use expression::evaluate;
pub use models::{DisplayQuantity, LineItem, Quantity, QuantityUnit, ShoppingEntry, TrolleySnapshot};
pub use notion::NotionDataProvider;
pub use ordering::{OrderingFlow, OrderingReport};
pub use prompt::TerminalOperator;
pub use reconcile::{MappingRecord, Multiplier};

use std::fmt;
use std::time::Duration;

use notion::NotionClient;
use ordering::Operator;
use sainsburys::SainsburysDriver;

// ---------------------------------------------------------------------------
// AssistantBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`Assistant`].
///
/// Use [`Assistant::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](AssistantBuilder::build) with the
/// environment [`Config`].
pub struct AssistantBuilder {
    webdriver_url: String,
    timeout: Duration,
    items_rounding_tolerance: f64,
    show_progress: bool,
}

impl Default for AssistantBuilder {
    fn default() -> Self {
        Self {
            webdriver_url: config::DEFAULT_WEBDRIVER_URL.to_string(),
            timeout: Duration::from_secs(30),
            items_rounding_tolerance: config::DEFAULT_ITEMS_ROUNDING_TOLERANCE,
            show_progress: true,
        }
    }
}

impl AssistantBuilder {
    /// Address of the WebDriver server driving the browser.
    ///
    /// Defaults to `http://localhost:4444`, where `geckodriver` listens.
    pub fn webdriver_url(mut self, url: &str) -> Self {
        self.webdriver_url = url.to_string();
        self
    }

    /// Set the timeout for every HTTP request.
    ///
    /// Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// How far above a whole number an item count may be before it is
    /// rounded up. Defaults to 0.2.
    pub fn items_rounding_tolerance(mut self, tolerance: f64) -> Self {
        self.items_rounding_tolerance = tolerance;
        self
    }

    /// Show a progress bar while adding known items. Defaults to `true`.
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Build the assistant. No network requests are made until
    /// [`Assistant::run`].
    pub fn build(self, config: Config) -> Result<Assistant> {
        if !(0.0..1.0).contains(&self.items_rounding_tolerance) {
            return Err(AssistantError::InvalidArgument(format!(
                "items rounding tolerance must be in [0, 1), got {}",
                self.items_rounding_tolerance
            )));
        }
        let client = NotionClient::new(&config.notion_secret, self.timeout)?;
        let provider = NotionDataProvider::new(
            client,
            &config.shopping_item_db,
            &config.recipe_db,
            self.items_rounding_tolerance,
        );
        Ok(Assistant {
            config,
            provider,
            webdriver_url: self.webdriver_url,
            timeout: self.timeout,
            show_progress: self.show_progress,
        })
    }
}

// ---------------------------------------------------------------------------
// Assistant
// ---------------------------------------------------------------------------

/// Wires the Notion list, the browser and the basket API into one ordering
/// session.
pub struct Assistant {
    config: Config,
    provider: NotionDataProvider,
    webdriver_url: String,
    timeout: Duration,
    show_progress: bool,
}

impl Assistant {
    pub fn builder() -> AssistantBuilder {
        AssistantBuilder::default()
    }

    /// Run a full ordering session with `operator` at the keyboard.
    ///
    /// Fetches the list, opens a browser and logs in, then hands over to
    /// [`OrderingFlow`]. The browser is closed when this returns.
    pub fn run<O: Operator>(&self, operator: &mut O) -> Result<OrderingReport> {
        let entries = self.provider.shopping_list()?;

        let mut driver = SainsburysDriver::connect(&self.webdriver_url, self.timeout)?;
        operator.notify("Logging in...");
        driver.login(self.config.credentials.as_ref())?;
        let trolley = driver.api_client(self.timeout)?;

        let report = OrderingFlow::new(&trolley, &mut driver, &self.provider, operator)
            .show_progress(self.show_progress)
            .run(entries)?;

        operator.wait_for_enter("Finished list. Press Enter to quit")?;
        Ok(report)
    }
}

impl fmt::Display for Assistant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Assistant(webdriver_url={}, timeout={}s, auto_login={})",
            self.webdriver_url,
            self.timeout.as_secs(),
            self.config.credentials.is_some()
        )
    }
}
