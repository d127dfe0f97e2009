use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The provider's error object, as found under a top-level `error` key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiErrorPayload {
    pub code: i64,
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub error_subcode: Option<i64>,
    #[serde(default)]
    pub fbtrace_id: Option<String>,
}

/// One page of a cursor-paginated collection.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<I> {
    #[serde(default = "Vec::new")]
    pub data: Vec<I>,
    #[serde(default)]
    pub paging: Option<Paging>,
}

impl<I> Page<I> {
    /// The URL of the following page, absent on the last page.
    #[must_use]
    pub fn next_url(&self) -> Option<&str> {
        self.paging.as_ref().and_then(|p| p.next.as_deref()).filter(|next| !next.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub cursors: Option<Cursors>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Cursors {
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
}

/// Fail with [`Error::Api`] when `value` carries a top-level error object.
pub fn check_api_error(value: &Value) -> Result<(), Error> {
    match value.get("error") {
        Some(error) if error.is_object() => {
            let payload: ApiErrorPayload = serde_json::from_value(error.clone())?;
            Err(Error::Api(payload))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_payload_becomes_api_error() {
        let body = json!({
            "error": {
                "message": "Invalid OAuth access token.",
                "type": "OAuthException",
                "code": 190,
                "fbtrace_id": "AbC"
            }
        });

        let err = check_api_error(&body).unwrap_err();
        let payload = err.api_payload().unwrap();
        assert_eq!(payload.code, 190);
        assert_eq!(payload.message, "Invalid OAuth access token.");
        assert_eq!(payload.kind.as_deref(), Some("OAuthException"));
        assert_eq!(payload.error_subcode, None);
    }

    #[test]
    fn test_data_payload_passes() {
        assert!(check_api_error(&json!({"data": []})).is_ok());
        assert!(check_api_error(&json!({"error": null})).is_ok());
    }

    #[test]
    fn test_malformed_error_object_is_a_decode_error() {
        let err = check_api_error(&json!({"error": {"message": "no code"}})).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_next_url() {
        let page: Page<Value> = serde_json::from_value(json!({
            "data": [1, 2],
            "paging": {"cursors": {"before": "a", "after": "b"}, "next": "https://x/next"}
        }))
        .unwrap();
        assert_eq!(page.next_url(), Some("https://x/next"));

        let last: Page<Value> = serde_json::from_value(json!({"data": [], "paging": {"cursors": {}}})).unwrap();
        assert_eq!(last.next_url(), None);

        let bare: Page<Value> = serde_json::from_value(json!({})).unwrap();
        assert!(bare.data.is_empty());
        assert_eq!(bare.next_url(), None);
    }
}
