//! Sainsbury's basket API, authenticated with credentials lifted from a
//! logged-in browser session.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config;
use crate::error::{AssistantError, Result};
use crate::http::checked;
use crate::models::{LineItem, Quantity, TrolleySnapshot};
use crate::webdriver::Cookie;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct BasketResponse {
    pub items: Vec<BasketLine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BasketLine {
    pub product: BasketProduct,
    pub quantity: f64,
    pub uom: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BasketProduct {
    pub product_uid: String,
    pub name: String,
}

/// Convert the basket as returned by the API into a snapshot.
///
/// Lines sold by `kg` become weights; every other unit is a count of items,
/// which must then be a whole non-negative number.
pub fn snapshot_from_basket(basket: BasketResponse) -> Result<TrolleySnapshot> {
    basket
        .items
        .into_iter()
        .map(|line| {
            let quantity = if line.uom == "kg" {
                Quantity::kilograms(line.quantity)
            } else if line.quantity >= 0.0
                && line.quantity.fract() == 0.0
                && line.quantity <= f64::from(u32::MAX)
            {
                Quantity::items(line.quantity as u32)
            } else {
                return Err(AssistantError::UnexpectedResponse(format!(
                    "basket line {} has {} {}, expected a whole number of items",
                    line.product.product_uid, line.quantity, line.uom
                )));
            };
            Ok(LineItem::new(
                line.product.product_uid,
                line.product.name,
                quantity,
            ))
        })
        .collect()
}

/// Request body adding `item` to the basket.
pub fn add_item_request(item: &LineItem) -> Value {
    let (quantity, uom) = match item.quantity {
        Quantity::ByItems { count } => (json!(count), "ea"),
        Quantity::ByWeight { kilograms } => (json!(kilograms), "kg"),
    };
    json!({
        "quantity": quantity,
        "uom": uom,
        "selected_catchweight": "",
        "product_uid": item.id,
    })
}

// ---------------------------------------------------------------------------
// SessionCredentials
// ---------------------------------------------------------------------------

/// What the basket API needs from a logged-in browser.
#[derive(Clone)]
pub struct SessionCredentials {
    pub access_token: String,
    pub wc_auth_token: String,
    /// `name=value` pairs for the retailer's domain.
    pub cookies: Vec<(String, String)>,
}

impl std::fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("cookies", &self.cookies.len())
            .finish_non_exhaustive()
    }
}

impl SessionCredentials {
    /// Build credentials from the OIDC user entry in local storage and the
    /// browser's cookies.
    pub fn from_browser(oidc_user: &str, cookies: &[Cookie]) -> Result<Self> {
        let user: Value = serde_json::from_str(oidc_user)?;
        let access_token = user
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AssistantError::NotFound("access token in the browser's local storage".into())
            })?
            .to_string();

        let wc_auth_token = cookies
            .iter()
            .find(|c| c.name.starts_with(config::WC_AUTH_COOKIE_PREFIX))
            .map(|c| c.value.clone())
            .ok_or_else(|| {
                AssistantError::NotFound(format!(
                    "a {}* cookie in the browser",
                    config::WC_AUTH_COOKIE_PREFIX
                ))
            })?;

        let cookies = cookies
            .iter()
            .filter(|c| {
                c.domain
                    .as_deref()
                    .map_or(true, |d| d.trim_start_matches('.').ends_with(config::COOKIE_DOMAIN))
            })
            .map(|c| (c.name.clone(), c.value.clone()))
            .collect();

        Ok(Self {
            access_token,
            wc_auth_token,
            cookies,
        })
    }

    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// ---------------------------------------------------------------------------
// SainsburysClient
// ---------------------------------------------------------------------------

pub struct SainsburysClient {
    client: Client,
    credentials: SessionCredentials,
}

impl SainsburysClient {
    pub fn new(credentials: SessionCredentials, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            credentials,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.credentials.access_token)
            .header("WCAuthToken", &self.credentials.wc_auth_token)
            .header(reqwest::header::COOKIE, self.credentials.cookie_header())
    }

    /// Add `item` to the trolley. An existing line for the same product grows
    /// by the item's quantity.
    pub fn add_item(&self, item: &LineItem) -> Result<()> {
        let response = self
            .authorized(self.client.post(config::BASKET_ITEM_URL))
            .json(&add_item_request(item))
            .send()?;
        checked(response)?;
        debug!(product = %item.id, quantity = %item.quantity, "added to trolley");
        Ok(())
    }

    pub fn capture_trolley(&self) -> Result<TrolleySnapshot> {
        let response = self
            .authorized(self.client.get(config::BASKET_URL))
            .send()?;
        let basket: BasketResponse = checked(response)?.json()?;
        snapshot_from_basket(basket)
    }

    pub fn empty_trolley(&self) -> Result<()> {
        let response = self
            .authorized(self.client.delete(config::BASKET_URL))
            .send()?;
        checked(response)?;
        debug!("emptied trolley");
        Ok(())
    }
}
