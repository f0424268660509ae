use std::env;

use crate::error::{AssistantError, Result};

pub const NOTION_API_BASE: &str = "https://api.notion.com/v1";
pub const NOTION_VERSION: &str = "2022-06-28";

pub const BASKET_URL: &str =
    "https://www.sainsburys.co.uk/groceries-api/gol-services/basket/v1/basket";
pub const BASKET_ITEM_URL: &str =
    "https://www.sainsburys.co.uk/groceries-api/gol-services/basket/v1/basket/item";
pub const LOGIN_URL: &str = "https://www.sainsburys.co.uk/webapp/wcs/stores/servlet/LogonView?catalogId=10122&langId=44&storeId=10151&logonCallerId=LogonButton&URL=TopCategoriesDisplayView";
pub const ACCESS_TOKEN_STORAGE_KEY: &str = "oidc.user:https://account.sainsburys.co.uk:gol";
pub const WC_AUTH_COOKIE_PREFIX: &str = "WC_AUTHENTICATION_";
pub const COOKIE_DOMAIN: &str = "sainsburys.co.uk";

pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:4444";

/// Item counts within this much of the next whole number down are rounded
/// down rather than up when turning a list quantity into a trolley quantity.
pub const DEFAULT_ITEMS_ROUNDING_TOLERANCE: f64 = 0.2;

const NOTION_SECRET: &str = "NOTION_SECRET";
const NOTION_SHOPPING_ITEM_DB: &str = "NOTION_SHOPPING_ITEM_DB";
const NOTION_RECIPE_DB: &str = "NOTION_RECIPE_DB";
const SAINSBURYS_EMAIL: &str = "SAINSBURYS_EMAIL";
const SAINSBURYS_PASSWORD: &str = "SAINSBURYS_PASSWORD";

/// Login details for the retailer's website.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Secrets and database ids read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub notion_secret: String,
    pub shopping_item_db: String,
    pub recipe_db: String,
    /// `None` means the operator logs in by hand in the browser window.
    pub credentials: Option<Credentials>,
}

impl Config {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    ///
    /// Every missing required variable is reported in a single
    /// [`AssistantError::Config`] error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let secret = read(NOTION_SECRET);
        let shopping = read(NOTION_SHOPPING_ITEM_DB);
        let recipes = read(NOTION_RECIPE_DB);

        let missing: Vec<&str> = [
            (NOTION_SECRET, secret.is_none()),
            (NOTION_SHOPPING_ITEM_DB, shopping.is_none()),
            (NOTION_RECIPE_DB, recipes.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        match (secret, shopping, recipes) {
            (Some(notion_secret), Some(shopping_item_db), Some(recipe_db)) => {
                let credentials = match (read(SAINSBURYS_EMAIL), read(SAINSBURYS_PASSWORD)) {
                    (Some(email), Some(password)) => Some(Credentials { email, password }),
                    _ => None,
                };
                Ok(Self {
                    notion_secret,
                    shopping_item_db,
                    recipe_db,
                    credentials,
                })
            }
            _ => Err(AssistantError::Config(format!(
                "please set {}: {} must be a secret for a Notion connection with access to \
                 your grocery databases, {} the id of the Shopping Item database and {} the \
                 id of the Recipe database",
                missing.join(", "),
                NOTION_SECRET,
                NOTION_SHOPPING_ITEM_DB,
                NOTION_RECIPE_DB
            ))),
        }
    }
}
