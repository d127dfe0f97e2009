use crate::graph::{GraphApi, Transport};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::Display;

/// Capability a token needs before it may read insights at all.
pub const READ_INSIGHTS_SCOPE: &str = "read_insights";

/// Granular capability that must list the target page.
pub const PAGE_ENGAGEMENT_SCOPE: &str = "pages_read_engagement";

/// The subject a token acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "lowercase")]
pub enum TokenKind {
    User,
    Page,
    #[serde(other)]
    Other,
}

/// A scope restricted to a set of target ids.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GranularScope {
    pub scope: String,
    #[serde(default)]
    pub target_ids: Option<Vec<String>>,
}

/// Validity, expiry and scope data reported by `/debug_token`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TokenDebugInfo {
    #[serde(default)]
    pub is_valid: bool,

    /// Unix seconds; `0` means the token never expires.
    #[serde(default)]
    pub expires_at: i64,

    #[serde(default)]
    pub scopes: Vec<String>,

    #[serde(default)]
    pub granular_scopes: Vec<GranularScope>,

    #[serde(default, rename = "type")]
    pub subject_type: Option<TokenKind>,

    /// Set for page tokens only.
    #[serde(default, rename = "profile_id")]
    pub subject_id: Option<String>,

    #[serde(default)]
    pub app_id: Option<String>,

    #[serde(default)]
    pub user_id: Option<String>,
}

impl TokenDebugInfo {
    #[must_use]
    pub const fn never_expires(&self) -> bool {
        self.expires_at == 0
    }

    #[must_use]
    pub fn is_kind(&self, kind: TokenKind) -> bool {
        self.subject_type == Some(kind)
    }

    /// Whether the token may read insights of `resource_id`.
    ///
    /// Requires `read_insights` and a `pages_read_engagement` granular scope
    /// whose target ids contain `resource_id`. A granular scope without target
    /// ids never qualifies.
    #[must_use]
    pub fn grants_insights_for(&self, resource_id: &str) -> bool {
        self.scopes.iter().any(|s| s == READ_INSIGHTS_SCOPE)
            && self
                .granular_scopes
                .iter()
                .filter(|g| g.scope == PAGE_ENGAGEMENT_SCOPE)
                .any(|g| g.target_ids.as_ref().is_some_and(|ids| ids.iter().any(|id| id == resource_id)))
    }
}

#[derive(Debug, Deserialize)]
struct DebugTokenResponse {
    #[serde(default)]
    data: Option<TokenDebugInfo>,
}

/// Calls the provider's token-debug capability.
#[derive(Debug)]
pub struct TokenIntrospector<T> {
    graph: Arc<GraphApi<T>>,
}

impl<T: Transport> TokenIntrospector<T> {
    #[must_use]
    pub const fn new(graph: Arc<GraphApi<T>>) -> Self {
        Self { graph }
    }

    /// Inspect `token`, using it both as the caller and as the subject.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] when the provider rejects the token outright, which
    /// is how malformed tokens are reported.
    pub async fn introspect(&self, token: &str) -> Result<TokenDebugInfo, Error> {
        if token.is_empty() {
            return Err(Error::Argument("token to introspect must not be empty".into()));
        }

        let url = self
            .graph
            .composer()
            .url(&["debug_token"], [("access_token", token), ("input_token", token)]);
        let response: DebugTokenResponse = self.graph.get_as(&url).await?;
        response.data.ok_or(Error::MissingField("data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page_token_info(target_ids: serde_json::Value) -> TokenDebugInfo {
        serde_json::from_value(json!({
            "app_id": "138483919580948",
            "type": "PAGE",
            "application": "Insights Reader",
            "expires_at": 0,
            "is_valid": true,
            "issued_at": 1_622_604_000,
            "profile_id": "104902651770903",
            "scopes": ["read_insights", "pages_read_engagement", "pages_show_list"],
            "granular_scopes": [
                {"scope": "pages_show_list", "target_ids": ["104902651770903"]},
                {"scope": "pages_read_engagement", "target_ids": target_ids}
            ],
            "user_id": "10224950014375894"
        }))
        .unwrap()
    }

    #[test]
    fn test_page_token_payload() {
        let info = page_token_info(json!(["104902651770903"]));
        assert!(info.is_valid);
        assert!(info.never_expires());
        assert!(info.is_kind(TokenKind::Page));
        assert_eq!(info.subject_id.as_deref(), Some("104902651770903"));
        assert!(info.grants_insights_for("104902651770903"));
        assert!(!info.grants_insights_for("999"));
    }

    #[test]
    fn test_null_target_ids_never_grant() {
        let info = page_token_info(serde_json::Value::Null);
        assert!(!info.grants_insights_for("104902651770903"));
    }

    #[test]
    fn test_missing_read_insights_never_grants() {
        let mut info = page_token_info(json!(["104902651770903"]));
        info.scopes.retain(|s| s != READ_INSIGHTS_SCOPE);
        assert!(!info.grants_insights_for("104902651770903"));
    }

    #[test]
    fn test_user_token_payload_with_expiry() {
        let info: TokenDebugInfo = serde_json::from_value(json!({
            "type": "USER",
            "expires_at": 1_627_786_800,
            "is_valid": true,
            "scopes": ["read_insights"]
        }))
        .unwrap();

        assert!(info.is_kind(TokenKind::User));
        assert!(!info.never_expires());
        assert_eq!(info.subject_id, None);
        assert!(info.granular_scopes.is_empty());
    }

    #[test]
    fn test_unknown_subject_type() {
        let info: TokenDebugInfo = serde_json::from_value(json!({"type": "APP", "is_valid": true})).unwrap();
        assert_eq!(info.subject_type, Some(TokenKind::Other));
        assert!(!info.is_kind(TokenKind::User));
        assert!(!info.is_kind(TokenKind::Page));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(TokenKind::User.to_string(), "user");
        assert_eq!(TokenKind::Page.to_string(), "page");
    }
}
