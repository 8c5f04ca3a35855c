use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use snafu::{ResultExt, Snafu};
use url::Url;

/// Bounds the whole POST, connect included. Webhook endpoints answer fast
/// or not at all.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    /// The endpoint answered 200.
    Accepted,
    /// The endpoint answered with anything else; the caller decides how
    /// severe that is.
    UnexpectedStatus(u16),
}

/// Fires single best-effort POSTs. No retry, no backoff, no queue; a
/// failed notification is the caller's problem to log and move on from.
pub struct WebhookClient {
    client: Client,
}

impl WebhookClient {
    pub fn new() -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context(RequestSnafu)?;
        Ok(Self { client })
    }

    pub fn notify<T: Serialize>(&self, url: &Url, payload: &T) -> Result<NotifyOutcome, NotifyError> {
        let body = serde_json::to_string(payload).context(SerializeSnafu)?;
        debug!("Sending info to webhook: {}", body);

        let response = self.client
            .post(url.as_str())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .context(RequestSnafu)?;

        let status = response.status();
        debug!("Webhook responded {} {}", status.as_u16(), status.canonical_reason().unwrap_or("(none)"));

        if status.as_u16() == 200 {
            Ok(NotifyOutcome::Accepted)
        } else {
            Ok(NotifyOutcome::UnexpectedStatus(status.as_u16()))
        }
    }
}

// ////// //
// Errors //
// ////// //

#[derive(Debug, Snafu)]
pub enum NotifyError {
    #[snafu(display("webhook request failed: {source}"))]
    Request { source: reqwest::Error },

    #[snafu(display("could not serialize webhook payload: {source}"))]
    Serialize { source: serde_json::Error },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error + Send + Sync>, Some)))]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}
