//! Minimal W3C WebDriver client.
//!
//! Talks to a running WebDriver server (e.g. `geckodriver`) over HTTP and
//! covers only the commands the storefront driver needs. The browser session
//! is deleted when the [`WebDriverSession`] is dropped.

use std::thread;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{AssistantError, Result};

/// Key under which the protocol wraps element references.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52f-4a16e4a3b8d0";
/// The Enter key in `send_keys` text.
pub const RETURN_KEY: &str = "\u{E006}";

const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementId(String);

/// How to locate an element.
#[derive(Debug, Clone, Copy)]
pub enum Locator<'a> {
    Id(&'a str),
    ClassName(&'a str),
}

impl Locator<'_> {
    fn to_css(self) -> String {
        match self {
            Locator::Id(id) => format!("[id=\"{}\"]", id),
            Locator::ClassName(class) => format!(".{}", class),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

/// An error reported by the WebDriver server itself, as opposed to a
/// transport failure.
#[derive(Debug)]
struct CommandFailure {
    error: String,
    message: String,
}

// ---------------------------------------------------------------------------
// WebDriverSession
// ---------------------------------------------------------------------------

pub struct WebDriverSession {
    client: Client,
    base_url: String,
    session_id: String,
    closed: bool,
}

impl WebDriverSession {
    /// Start a new Firefox session on the WebDriver server at `base_url`.
    pub fn connect(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let response: Value = client
            .post(format!("{}/session", base_url))
            .json(&json!({
                "capabilities": { "alwaysMatch": { "browserName": "firefox" } }
            }))
            .send()?
            .json()?;

        let session_id = response
            .get("value")
            .and_then(|v| v.get("sessionId"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AssistantError::WebDriver(format!("could not start a session: {}", response))
            })?
            .to_string();
        debug!(%session_id, "started browser session");

        Ok(Self {
            client,
            base_url,
            session_id,
            closed: false,
        })
    }

    fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<std::result::Result<Value, CommandFailure>> {
        let url = format!("{}/session/{}{}", self.base_url, self.session_id, path);
        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send()?;
        let status = response.status();
        let payload: Value = response.json()?;
        let value = payload.get("value").cloned().unwrap_or(Value::Null);

        if status.is_success() {
            return Ok(Ok(value));
        }
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Ok(Err(CommandFailure {
            error: field("error"),
            message: field("message"),
        }))
    }

    fn command(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value> {
        self.send(method, path, body)?.map_err(|failure| {
            AssistantError::WebDriver(format!(
                "{} {}: {}",
                failure.error, path, failure.message
            ))
        })
    }

    pub fn navigate(&self, url: &str) -> Result<()> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))?;
        Ok(())
    }

    pub fn title(&self) -> Result<String> {
        Ok(self
            .command(Method::GET, "/title", None)?
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    pub fn refresh(&self) -> Result<()> {
        self.command(Method::POST, "/refresh", Some(json!({})))?;
        Ok(())
    }

    /// Run `script` synchronously in the page and return its result.
    pub fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value> {
        self.command(
            Method::POST,
            "/execute/sync",
            Some(json!({ "script": script, "args": args })),
        )
    }

    pub fn cookies(&self) -> Result<Vec<Cookie>> {
        let value = self.command(Method::GET, "/cookie", None)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Find the first element matching `locator`, or `None` if there is none.
    pub fn find_element(&self, locator: Locator<'_>) -> Result<Option<ElementId>> {
        let body = json!({ "using": "css selector", "value": locator.to_css() });
        match self.send(Method::POST, "/element", Some(body))? {
            Ok(value) => value
                .get(ELEMENT_KEY)
                .and_then(Value::as_str)
                .map(|id| Some(ElementId(id.to_string())))
                .ok_or_else(|| {
                    AssistantError::WebDriver(format!("malformed element reference: {}", value))
                }),
            Err(failure) if failure.error == "no such element" => Ok(None),
            Err(failure) => Err(AssistantError::WebDriver(format!(
                "{}: {}",
                failure.error, failure.message
            ))),
        }
    }

    pub fn clear(&self, element: &ElementId) -> Result<()> {
        self.command(
            Method::POST,
            &format!("/element/{}/clear", element.0),
            Some(json!({})),
        )?;
        Ok(())
    }

    pub fn send_keys(&self, element: &ElementId, text: &str) -> Result<()> {
        self.command(
            Method::POST,
            &format!("/element/{}/value", element.0),
            Some(json!({ "text": text })),
        )?;
        Ok(())
    }

    pub fn click(&self, element: &ElementId) -> Result<()> {
        self.command(
            Method::POST,
            &format!("/element/{}/click", element.0),
            Some(json!({})),
        )?;
        Ok(())
    }

    /// Whether the element is shown. An element no longer in the page is not.
    pub fn is_displayed(&self, element: &ElementId) -> Result<bool> {
        match self.send(
            Method::GET,
            &format!("/element/{}/displayed", element.0),
            None,
        )? {
            Ok(value) => Ok(value.as_bool().unwrap_or(false)),
            Err(failure) if failure.error == "stale element reference" => Ok(false),
            Err(failure) => Err(AssistantError::WebDriver(format!(
                "{}: {}",
                failure.error, failure.message
            ))),
        }
    }

    /// Poll `check` until it yields a value or `timeout` passes.
    pub fn wait_for<T, F>(&self, timeout: Duration, mut check: F) -> Result<Option<T>>
    where
        F: FnMut(&Self) -> Result<Option<T>>,
    {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(found) = check(self)? {
                return Ok(Some(found));
            }
            if Instant::now() >= deadline {
                return Ok(None);
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// End the browser session.
    pub fn quit(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.command(Method::DELETE, "", None)?;
        debug!(session_id = %self.session_id, "closed browser session");
        Ok(())
    }
}

impl Drop for WebDriverSession {
    fn drop(&mut self) {
        if let Err(e) = self.quit() {
            warn!("failed to close browser session: {}", e);
        }
    }
}
