use crate::{Error, Result};
use core::time::Duration;
use serde_json::Value;
use url::Url;

const LOG_TARGET: &str = " transport";

const USER_AGENT: &str = concat!("page-insights/", env!("CARGO_PKG_VERSION"));

/// Fetches a URL and returns its body as JSON.
///
/// Implementations return the body of error responses too, so that callers can
/// surface the provider's error payload.
pub trait Transport: Send + Sync {
    fn get_json(&self, url: &Url) -> impl Future<Output = Result<Value, Error>> + Send;
}

/// [`Transport`] backed by a `reqwest` client with a bounded per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport whose requests fail once `timeout` elapses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the HTTP client cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn get_json(&self, url: &Url) -> Result<Value, Error> {
        // the query carries access tokens
        log::debug!(target: LOG_TARGET, "GET {}", url.path());

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => {
                if !status.is_success() {
                    log::debug!(target: LOG_TARGET, "HTTP {} from {}", status.as_u16(), url.path());
                }
                Ok(value)
            }
            Err(e) if status.is_success() => Err(Error::Decode(e)),
            Err(_) => Err(Error::Http {
                status: status.as_u16(),
                path: url.path().to_owned(),
            }),
        }
    }
}
