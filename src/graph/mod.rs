//! Provider plumbing: URL composition, the JSON transport, wire types and cursor pagination.
//!
//! Every provider call goes through [`GraphApi`], which pairs a [`RequestComposer`]
//! with a [`Transport`] and turns error payloads into [`Error::Api`](crate::Error::Api).

mod paging;
mod request;
mod transport;
mod wire;

pub use paging::{PagedRequest, PaginatedCollector, TimeWindow};
pub use request::RequestComposer;
pub use transport::{HttpTransport, Transport};
pub use wire::{ApiErrorPayload, Cursors, Page, Paging, check_api_error};

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

/// A composer bound to a transport.
#[derive(Debug)]
pub struct GraphApi<T> {
    composer: RequestComposer,
    transport: T,
}

impl<T: Transport> GraphApi<T> {
    #[must_use]
    pub const fn new(composer: RequestComposer, transport: T) -> Self {
        Self { composer, transport }
    }

    #[must_use]
    pub const fn composer(&self) -> &RequestComposer {
        &self.composer
    }

    /// Fetch `url` and fail with [`Error::Api`] when the body carries an error payload.
    pub async fn get(&self, url: &Url) -> Result<Value, Error> {
        let value = self.transport.get_json(url).await?;
        check_api_error(&value)?;
        Ok(value)
    }

    /// Fetch `url` and decode the body into `R`.
    pub async fn get_as<R: DeserializeOwned>(&self, url: &Url) -> Result<R, Error> {
        let value = self.get(url).await?;
        Ok(serde_json::from_value(value)?)
    }
}
