use super::{GraphApi, Page, Transport};
use crate::credentials::AccessToken;
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

const LOG_TARGET: &str = "    paging";

/// An inclusive `[since, until]` window in Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub since: i64,
    pub until: i64,
}

impl TimeWindow {
    #[must_use]
    pub const fn new(since: i64, until: i64) -> Self {
        Self { since, until }
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `since` is later than `until`.
    pub fn validate(&self) -> Result<(), Error> {
        if self.since > self.until {
            return Err(Error::Validation(format!(
                "since ({}) must not be later than until ({})",
                self.since, self.until
            )));
        }
        Ok(())
    }
}

/// The first request of a paginated query.
#[derive(Debug, Clone)]
pub struct PagedRequest {
    resource_id: String,
    endpoint: String,
    params: Vec<(String, String)>,
    window: Option<TimeWindow>,
}

impl PagedRequest {
    pub fn new(resource_id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            endpoint: endpoint.into(),
            params: Vec::new(),
            window: None,
        }
    }

    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn window(mut self, window: Option<TimeWindow>) -> Self {
        self.window = window;
        self
    }

    #[must_use]
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    fn query(&self) -> impl Iterator<Item = (String, String)> + '_ {
        let window = self
            .window
            .into_iter()
            .flat_map(|w| [("since".to_owned(), w.since.to_string()), ("until".to_owned(), w.until.to_string())]);
        self.params.iter().cloned().chain(window)
    }
}

/// Follows `paging.next` links until the provider stops returning one.
#[derive(Debug)]
pub struct PaginatedCollector<T> {
    graph: Arc<GraphApi<T>>,
}

impl<T: Transport> PaginatedCollector<T> {
    #[must_use]
    pub const fn new(graph: Arc<GraphApi<T>>) -> Self {
        Self { graph }
    }

    /// Collect every item of `request`, in provider order.
    ///
    /// The window is validated before any request is issued. Any provider error
    /// aborts the whole collection.
    pub async fn collect_all<I: DeserializeOwned>(&self, request: &PagedRequest, token: &AccessToken) -> Result<Vec<I>, Error> {
        if let Some(window) = &request.window {
            window.validate()?;
        }

        let mut url = self
            .graph
            .composer()
            .compose(&request.resource_id, &request.endpoint, token.as_str(), request.query())?;

        let mut items = Vec::new();
        let mut pages = 0_usize;
        loop {
            let page: Page<I> = self.graph.get_as(&url).await?;
            pages += 1;
            let next = page.next_url().map(str::to_owned);
            items.extend(page.data);

            let Some(next) = next else {
                break;
            };
            url = Url::parse(&next).map_err(|source| Error::Cursor { url: next, source })?;
        }

        log::debug!(
            target: LOG_TARGET,
            "Collected {} item(s) from {}/{} across {pages} page(s)",
            items.len(),
            request.resource_id,
            request.endpoint
        );

        Ok(items)
    }
}
