//! Shared HTTP plumbing: client construction and error conversion.

use std::time::Duration;

use reqwest::Client;

use heliosite_core::SourceError;

use crate::ClientBuildError;

/// Build a reqwest client with the standard timeout and user agent.
pub(crate) fn build_client(
    user_agent: &str,
    timeout: Duration,
) -> Result<Client, ClientBuildError> {
    Ok(Client::builder()
        .user_agent(user_agent)
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()?)
}

/// Convert a reqwest error into the boundary error taxonomy.
pub(crate) fn convert_reqwest_error(
    error: &reqwest::Error,
    url: &str,
    timeout: Duration,
) -> SourceError {
    if error.is_timeout() {
        return SourceError::Timeout {
            url: url.to_owned(),
            timeout_secs: timeout.as_secs(),
        };
    }
    if let Some(status) = error.status() {
        return SourceError::Http {
            url: url.to_owned(),
            status: status.as_u16(),
        };
    }
    SourceError::Network {
        url: url.to_owned(),
        message: error.to_string(),
    }
}

/// GET `url` and return the response body.
pub(crate) async fn get_text(
    client: &Client,
    url: &str,
    timeout: Duration,
) -> Result<String, SourceError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|err| convert_reqwest_error(&err, url, timeout))?
        .error_for_status()
        .map_err(|err| convert_reqwest_error(&err, url, timeout))?;
    response
        .text()
        .await
        .map_err(|err| convert_reqwest_error(&err, url, timeout))
}

/// POST a single form field to `url` and return the response body.
pub(crate) async fn post_form(
    client: &Client,
    url: &str,
    field: &str,
    value: &str,
    timeout: Duration,
) -> Result<String, SourceError> {
    let response = client
        .post(url)
        .form(&[(field, value)])
        .send()
        .await
        .map_err(|err| convert_reqwest_error(&err, url, timeout))?
        .error_for_status()
        .map_err(|err| convert_reqwest_error(&err, url, timeout))?;
    response
        .text()
        .await
        .map_err(|err| convert_reqwest_error(&err, url, timeout))
}
