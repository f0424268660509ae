//! Programmatic control of an interactive Sainsbury's browser session.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::basket::{SainsburysClient, SessionCredentials};
use crate::config::{self, Credentials};
use crate::error::{AssistantError, Result};
use crate::webdriver::{ElementId, Locator, WebDriverSession, RETURN_KEY};

const COOKIE_BANNER_BUTTON: &str = "onetrust-accept-btn-handler";
const USERNAME_FIELD: &str = "username";
const PASSWORD_FIELD: &str = "password";
const SEARCH_BARS: [&str; 2] = ["search", "search-bar-input"];
const LOGGED_IN_MARKERS: [&str; 2] = ["loggedOutLink", "top-right-links--logout"];

const COOKIE_BANNER_TIMEOUT: Duration = Duration::from_secs(5);
const COOKIE_BANNER_DISMISS_TIMEOUT: Duration = Duration::from_secs(10);
const LOGIN_FORM_TIMEOUT: Duration = Duration::from_secs(3);
/// Long enough for the operator to type a verification code.
const LOGIN_TIMEOUT: Duration = Duration::from_secs(300);

pub struct SainsburysDriver {
    session: WebDriverSession,
}

impl SainsburysDriver {
    pub fn connect(webdriver_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            session: WebDriverSession::connect(webdriver_url, timeout)?,
        })
    }

    /// Open the login page and sign in.
    ///
    /// With no credentials the operator signs in by hand. Either way this
    /// waits until the page shows a logged-in marker.
    pub fn login(&mut self, credentials: Option<&Credentials>) -> Result<()> {
        self.session.navigate(config::LOGIN_URL)?;
        let title = self.session.title()?;
        if !title.contains("Sainsbury's") {
            return Err(AssistantError::UnexpectedResponse(format!(
                "login page has title '{}'",
                title
            )));
        }
        self.accept_cookies()?;

        match credentials {
            Some(credentials) => {
                let username = self
                    .session
                    .wait_for(LOGIN_FORM_TIMEOUT, |s| {
                        s.find_element(Locator::Id(USERNAME_FIELD))
                    })?
                    .ok_or_else(|| AssistantError::NotFound("login form".to_string()))?;
                self.session.send_keys(&username, &credentials.email)?;
                let password = self.required(Locator::Id(PASSWORD_FIELD))?;
                self.session.send_keys(&password, &credentials.password)?;
                self.session.send_keys(&password, RETURN_KEY)?;
            }
            None => warn!(
                "SAINSBURYS_EMAIL and SAINSBURYS_PASSWORD are not set, log in using the browser window"
            ),
        }

        let logged_in = self.session.wait_for(LOGIN_TIMEOUT, |s| {
            for marker in LOGGED_IN_MARKERS {
                if s.find_element(Locator::ClassName(marker))?.is_some() {
                    return Ok(Some(()));
                }
            }
            Ok(None)
        })?;
        if logged_in.is_none() {
            return Err(AssistantError::LoginNotDetected);
        }
        info!("logged in");
        Ok(())
    }

    fn accept_cookies(&self) -> Result<()> {
        let button = self.session.wait_for(COOKIE_BANNER_TIMEOUT, |s| {
            s.find_element(Locator::Id(COOKIE_BANNER_BUTTON))
        })?;
        let Some(button) = button else {
            debug!("no cookie banner shown");
            return Ok(());
        };

        self.session.execute(
            &format!(
                "document.getElementById(\"{}\").click()",
                COOKIE_BANNER_BUTTON
            ),
            Vec::new(),
        )?;
        let dismissed = self
            .session
            .wait_for(COOKIE_BANNER_DISMISS_TIMEOUT, |s| {
                Ok((!s.is_displayed(&button)?).then_some(()))
            })?;
        if dismissed.is_none() {
            warn!("cookie banner is still shown");
        }
        Ok(())
    }

    fn required(&self, locator: Locator<'_>) -> Result<ElementId> {
        self.session
            .find_element(locator)?
            .ok_or_else(|| AssistantError::NotFound(format!("element {:?}", locator)))
    }

    /// Type `term` into the search bar and submit. Does not wait for results.
    pub fn search_for(&mut self, term: &str) -> Result<()> {
        let mut search_bar = None;
        for id in SEARCH_BARS {
            search_bar = self.session.find_element(Locator::Id(id))?;
            if search_bar.is_some() {
                break;
            }
        }
        let search_bar =
            search_bar.ok_or_else(|| AssistantError::NotFound("search bar".to_string()))?;

        self.session.clear(&search_bar)?;
        self.session.send_keys(&search_bar, term)?;
        self.session.send_keys(&search_bar, RETURN_KEY)?;
        Ok(())
    }

    pub fn refresh(&mut self) -> Result<()> {
        self.session.refresh()
    }

    /// Read the basket API credentials out of the logged-in browser.
    pub fn session_credentials(&self) -> Result<SessionCredentials> {
        let oidc_user = self.session.execute(
            &format!(
                "return window.localStorage.getItem('{}');",
                config::ACCESS_TOKEN_STORAGE_KEY
            ),
            Vec::new(),
        )?;
        let oidc_user = match oidc_user {
            Value::String(s) => s,
            _ => {
                return Err(AssistantError::NotFound(
                    "logged-in user in the browser's local storage".to_string(),
                ))
            }
        };
        SessionCredentials::from_browser(&oidc_user, &self.session.cookies()?)
    }

    /// A basket API client acting as the logged-in browser user.
    pub fn api_client(&self, timeout: Duration) -> Result<SainsburysClient> {
        SainsburysClient::new(self.session_credentials()?, timeout)
    }
}
