use super::{AccessToken, AppCredentials, CredentialStore, TokenDebugInfo, TokenExchanger, TokenIntrospector, TokenKind, mask};
use crate::graph::{GraphApi, Transport};
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const LOG_TARGET: &str = "  resolver";

/// The configured tokens a page token may be derived from.
#[derive(Clone, Default)]
pub struct TokenSources {
    pub user_token: Option<String>,
    pub default_page_token: Option<String>,
}

impl TokenSources {
    fn user_token(&self) -> Option<&str> {
        self.user_token.as_deref().filter(|t| !t.is_empty())
    }

    fn default_page_token(&self) -> Option<&str> {
        self.default_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

impl core::fmt::Debug for TokenSources {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenSources")
            .field("user_token", &self.user_token.as_deref().map(mask))
            .field("default_page_token", &self.default_page_token.as_deref().map(mask))
            .finish()
    }
}

#[derive(Debug, Clone)]
enum CachedToken {
    Resolved(String),
    Unresolvable,
}

#[derive(Debug, Deserialize)]
struct AccountsResponse {
    #[serde(default)]
    data: Vec<Account>,
}

#[derive(Debug, Deserialize)]
struct Account {
    id: String,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Produces durable, scope-verified page tokens for resource ids.
#[derive(Debug)]
pub struct CredentialResolver<T, S> {
    graph: Arc<GraphApi<T>>,
    introspector: TokenIntrospector<T>,
    exchanger: TokenExchanger<T>,
    sources: TokenSources,
    store: S,
    memory: Mutex<HashMap<String, CachedToken>>,
}

impl<T: Transport, S: CredentialStore> CredentialResolver<T, S> {
    pub fn new(graph: Arc<GraphApi<T>>, app: Option<AppCredentials>, sources: TokenSources, store: S) -> Self {
        Self {
            introspector: TokenIntrospector::new(Arc::clone(&graph)),
            exchanger: TokenExchanger::new(Arc::clone(&graph), app),
            graph,
            sources,
            store,
            memory: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve the page token for `resource_id`.
    ///
    /// Sources are tried in order: the in-process cache, the durable store, the
    /// default page token, then the user token. A freshly resolved token is
    /// persisted and cached before it is returned. Once every source has failed
    /// for a resource id, later calls fail immediately.
    ///
    /// # Errors
    ///
    /// - [`Error::Credential`] when no source yields a usable token
    /// - [`Error::Config`] when an exchange is needed but app credentials are missing
    /// - [`Error::Api`] when an exchange or the accounts listing is refused
    pub async fn resolve_page_token(&self, resource_id: &str) -> Result<AccessToken, Error> {
        if resource_id.is_empty() {
            return Err(Error::Argument("resource id must not be empty".into()));
        }

        match self.cached(resource_id) {
            Some(CachedToken::Resolved(token)) => return Ok(AccessToken::page(token)),
            Some(CachedToken::Unresolvable) => {
                return Err(Error::Credential(format!("no valid token for {resource_id}")));
            }
            None => {}
        }

        if let Some(token) = self.store.get(resource_id).await? {
            log::debug!(target: LOG_TARGET, "Using stored page token for {resource_id}");
            return Ok(AccessToken::page(self.remember(resource_id, token)));
        }

        let resolved = match self.from_default_page_token(resource_id).await? {
            Some(token) => Some(token),
            None => self.from_user_token(resource_id).await?,
        };

        let Some(token) = resolved else {
            let _ = self.memory().insert(resource_id.to_owned(), CachedToken::Unresolvable);
            return Err(Error::Credential("no available valid user/page token".into()));
        };

        self.store.put(resource_id, &token).await?;
        log::info!(target: LOG_TARGET, "Resolved page token for {resource_id}");
        Ok(AccessToken::page(self.remember(resource_id, token)))
    }

    async fn from_default_page_token(&self, resource_id: &str) -> Result<Option<String>, Error> {
        let Some(token) = self.sources.default_page_token() else {
            return Ok(None);
        };

        let Some(info) = self.inspect(token, "default page").await? else {
            return Ok(None);
        };

        if !usable(&info, TokenKind::Page, resource_id, "default page") {
            return Ok(None);
        }

        if info.never_expires() {
            log::debug!(target: LOG_TARGET, "Default page token is long-lived");
            return Ok(Some(token.to_owned()));
        }

        self.exchanger.exchange(token).await.map(Some)
    }

    async fn from_user_token(&self, resource_id: &str) -> Result<Option<String>, Error> {
        let Some(token) = self.sources.user_token() else {
            return Ok(None);
        };

        let Some(info) = self.inspect(token, "user").await? else {
            return Ok(None);
        };

        if !usable(&info, TokenKind::User, resource_id, "user") {
            return Ok(None);
        }

        let user_token = if info.never_expires() {
            token.to_owned()
        } else {
            self.exchanger.exchange(token).await?
        };

        let url = self.graph.composer().url(&["me", "accounts"], [("access_token", user_token.as_str())]);
        let accounts: AccountsResponse = self.graph.get_as(&url).await?;

        let page_token = accounts
            .data
            .into_iter()
            .find(|account| account.id == resource_id)
            .and_then(|account| {
                log::debug!(
                    target: LOG_TARGET,
                    "Found page {resource_id} ({}) among the user's accounts",
                    account.name.as_deref().unwrap_or("unnamed")
                );
                account.access_token
            })
            .filter(|t| !t.is_empty());

        if page_token.is_none() {
            log::warn!(target: LOG_TARGET, "The user token does not manage page {resource_id}");
        }

        Ok(page_token)
    }

    /// Introspect `token`, treating a provider refusal or an empty reply as "not usable".
    async fn inspect(&self, token: &str, label: &str) -> Result<Option<TokenDebugInfo>, Error> {
        match self.introspector.introspect(token).await {
            Ok(info) => Ok(Some(info)),
            Err(Error::Api(payload)) => {
                log::warn!(
                    target: LOG_TARGET,
                    "The {label} token could not be inspected: {} (code {})",
                    payload.message,
                    payload.code
                );
                Ok(None)
            }
            Err(Error::MissingField(field)) => {
                log::warn!(target: LOG_TARGET, "The {label} token could not be inspected: reply has no '{field}'");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn cached(&self, resource_id: &str) -> Option<CachedToken> {
        self.memory().get(resource_id).cloned()
    }

    /// Cache `token` unless a token is already cached, returning the cached one.
    fn remember(&self, resource_id: &str, token: String) -> String {
        let mut memory = self.memory();
        if let Some(CachedToken::Resolved(existing)) = memory.get(resource_id) {
            return existing.clone();
        }

        let _ = memory.insert(resource_id.to_owned(), CachedToken::Resolved(token.clone()));
        token
    }

    fn memory(&self) -> MutexGuard<'_, HashMap<String, CachedToken>> {
        self.memory.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn usable(info: &TokenDebugInfo, kind: TokenKind, resource_id: &str, label: &str) -> bool {
    if !info.is_valid {
        log::warn!(target: LOG_TARGET, "The {label} token is not valid");
        return false;
    }

    if !info.is_kind(kind) {
        log::warn!(target: LOG_TARGET, "The {label} token is not a {kind} token");
        return false;
    }

    if !info.grants_insights_for(resource_id) {
        log::warn!(target: LOG_TARGET, "The {label} token is not scoped to read insights of {resource_id}");
        return false;
    }

    true
}
