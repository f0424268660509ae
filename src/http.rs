use reqwest::blocking::Response;

use crate::error::{AssistantError, Result};

/// Turn a non-2xx response into an error carrying its body.
pub(crate) fn checked(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().to_string();
    let body = response.text().unwrap_or_default();
    Err(AssistantError::UnexpectedResponse(format!(
        "{} from {}: {}",
        status, url, body
    )))
}
