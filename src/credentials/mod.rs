//! Credential resolution for page-scoped requests.
//!
//! A page token is obtained, in order of preference, from the in-process cache,
//! the durable [`CredentialStore`], a configured default page token, or a
//! configured user token (via the `/me/accounts` listing). Each configured token
//! is introspected and scope-checked before use and exchanged for a long-lived
//! token when it expires.

mod exchange;
mod introspect;
mod resolver;
mod store;

pub use exchange::{AppCredentials, TokenExchanger};
pub use introspect::{GranularScope, TokenDebugInfo, TokenIntrospector, TokenKind};
pub use resolver::{CredentialResolver, TokenSources};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};

use core::fmt;

const MASK_PREFIX_LEN: usize = 6;
const MASK_SUFFIX_LEN: usize = 4;

/// An opaque provider token together with the kind of subject it acts for.
///
/// The `Debug` and `Display` forms are masked.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    kind: TokenKind,
}

impl AccessToken {
    pub fn new(value: impl Into<String>, kind: TokenKind) -> Self {
        Self { value: value.into(), kind }
    }

    pub fn page(value: impl Into<String>) -> Self {
        Self::new(value, TokenKind::Page)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        self.kind
    }

    #[must_use]
    pub fn masked(&self) -> String {
        mask(&self.value)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &self.masked())
            .field("kind", &self.kind)
            .finish()
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

pub(crate) fn mask(token: &str) -> String {
    let chars: Vec<char> = token.trim().chars().collect();
    if chars.len() <= MASK_PREFIX_LEN + MASK_SUFFIX_LEN {
        return "*".repeat(chars.len().min(8));
    }

    let prefix: String = chars.iter().take(MASK_PREFIX_LEN).collect();
    let suffix: String = chars.iter().skip(chars.len() - MASK_SUFFIX_LEN).collect();
    format!("{prefix}...{suffix}")
}
