//! Typed errors surfaced by the provider client.

use crate::graph::ApiErrorPayload;

/// Errors produced while resolving credentials or fetching and decoding insights.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required client configuration is missing (e.g. app id/secret for a token exchange).
    #[error("configuration error: {0}")]
    Config(String),

    /// No configured token source yields a usable page token.
    #[error("credential error: {0}")]
    Credential(String),

    /// The provider answered with an error payload.
    #[error("provider error {code}: {message}", code = .0.code, message = .0.message)]
    Api(ApiErrorPayload),

    /// A request was rejected before reaching the provider.
    #[error("validation error: {0}")]
    Validation(String),

    /// A caller supplied an empty or conflicting argument.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// The provider answered with a non-success status and a body that is not JSON.
    #[error("HTTP status {status} from '{path}'")]
    Http { status: u16, path: String },

    /// The request never produced a response (network failure or timeout).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A JSON payload did not have the expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    /// A successful response lacked a field every caller relies on.
    #[error("provider response has no '{0}'")]
    MissingField(&'static str),

    /// A pagination cursor could not be followed.
    #[error("invalid paging cursor '{url}': {source}")]
    Cursor {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The durable credential store could not be read or written.
    #[error("credential store failure at '{path}': {source}")]
    Store {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// The provider error payload, when this error came from the provider.
    #[must_use]
    pub const fn api_payload(&self) -> Option<&ApiErrorPayload> {
        match self {
            Self::Api(payload) => Some(payload),
            _ => None,
        }
    }
}
