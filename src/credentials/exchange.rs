use crate::graph::{GraphApi, Transport};
use crate::{Error, Result};
use core::fmt;
use serde::Deserialize;
use std::sync::Arc;

const LOG_TARGET: &str = "  exchange";

/// The application id and secret that authorize token exchanges.
#[derive(Clone, PartialEq, Eq)]
pub struct AppCredentials {
    pub app_id: String,
    pub app_secret: String,
}

impl AppCredentials {
    pub fn new(app_id: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
        }
    }

    fn is_complete(&self) -> bool {
        !self.app_id.is_empty() && !self.app_secret.is_empty()
    }
}

impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"***")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ExchangeResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Converts short-lived tokens into long-lived ones.
#[derive(Debug)]
pub struct TokenExchanger<T> {
    graph: Arc<GraphApi<T>>,
    app: Option<AppCredentials>,
}

impl<T: Transport> TokenExchanger<T> {
    #[must_use]
    pub const fn new(graph: Arc<GraphApi<T>>, app: Option<AppCredentials>) -> Self {
        Self { graph, app }
    }

    /// Exchange `short_lived` for a long-lived token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] without issuing a request when the app id or
    /// secret is missing, and [`Error::Api`] when the provider refuses.
    pub async fn exchange(&self, short_lived: &str) -> Result<String, Error> {
        let Some(app) = self.app.as_ref().filter(|app| app.is_complete()) else {
            return Err(Error::Config("an app id and app secret are required to exchange a token".into()));
        };

        if short_lived.is_empty() {
            return Err(Error::Argument("token to exchange must not be empty".into()));
        }

        let url = self.graph.composer().url(
            &["oauth", "access_token"],
            [
                ("grant_type", "fb_exchange_token"),
                ("client_id", app.app_id.as_str()),
                ("client_secret", app.app_secret.as_str()),
                ("fb_exchange_token", short_lived),
            ],
        );

        let response: ExchangeResponse = self.graph.get_as(&url).await?;
        log::debug!(
            target: LOG_TARGET,
            "Exchanged token (type: {}, expires in: {})",
            response.token_type.as_deref().unwrap_or("unknown"),
            response.expires_in.map_or_else(|| "never".to_owned(), |s| format!("{s}s"))
        );

        response
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(Error::MissingField("access_token"))
    }
}
