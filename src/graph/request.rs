use crate::{Error, Result};
use url::Url;

/// Builds provider request URLs rooted at `{api_server}/{api_version}`.
#[derive(Debug, Clone)]
pub struct RequestComposer {
    api_base: Url,
}

impl RequestComposer {
    /// Create a composer for the given server and API version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] if the server is not an absolute base URL or the version is empty.
    pub fn new(api_server: &str, api_version: &str) -> Result<Self, Error> {
        let version = api_version.trim_matches('/');
        if version.is_empty() {
            return Err(Error::Argument("API version must not be empty".into()));
        }

        let raw = format!("{}/{version}", api_server.trim_end_matches('/'));
        let api_base = Url::parse(&raw).map_err(|e| Error::Argument(format!("invalid API base URL '{raw}': {e}")))?;
        if api_base.cannot_be_a_base() {
            return Err(Error::Argument(format!("API base URL '{raw}' cannot carry a path")));
        }

        Ok(Self { api_base })
    }

    /// Compose `{base}/{base_id}/{endpoint}?access_token=...&{params}`.
    ///
    /// Parameters follow `access_token` in the order given. Only presence of
    /// `base_id`, `endpoint` and `token` is checked.
    pub fn compose<I, K, V>(&self, base_id: &str, endpoint: &str, token: &str, params: I) -> Result<Url, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        require("base id", base_id)?;
        require("endpoint", endpoint)?;
        require("access token", token)?;

        let mut url = self.url(&[base_id, endpoint], [("access_token", token)]);
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                let _ = query.append_pair(key.as_ref(), value.as_ref());
            }
        }

        Ok(url)
    }

    /// URL for a fixed path below the API base, with a query only when `params` is non-empty.
    pub(crate) fn url<I, K, V>(&self, segments: &[&str], params: I) -> Url
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut url = self.api_base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            let _ = path.pop_if_empty().extend(segments);
        }

        let mut params = params.into_iter().peekable();
        if params.peek().is_some() {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                let _ = query.append_pair(key.as_ref(), value.as_ref());
            }
        }

        url
    }
}

fn require(what: &str, value: &str) -> Result<(), Error> {
    if value.is_empty() {
        return Err(Error::Argument(format!("{what} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer() -> RequestComposer {
        RequestComposer::new("https://graph.example.com", "v10.0").unwrap()
    }

    #[test]
    fn test_compose_orders_token_first_then_params() {
        let url = composer()
            .compose(
                "123",
                "insights",
                "tok",
                [("metric", "page_views_total,page_video_views"), ("period", "week")],
            )
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://graph.example.com/v10.0/123/insights?access_token=tok&metric=page_views_total%2Cpage_video_views&period=week"
        );
    }

    #[test]
    fn test_compose_without_params() {
        let url = composer().compose("me", "accounts", "tok", Vec::<(&str, &str)>::new()).unwrap();
        assert_eq!(url.as_str(), "https://graph.example.com/v10.0/me/accounts?access_token=tok");
    }

    #[test]
    fn test_compose_rejects_empty_arguments() {
        let c = composer();
        let no_params = Vec::<(&str, &str)>::new;

        assert!(matches!(c.compose("", "insights", "tok", no_params()), Err(Error::Argument(_))));
        assert!(matches!(c.compose("123", "", "tok", no_params()), Err(Error::Argument(_))));
        assert!(matches!(c.compose("123", "insights", "", no_params()), Err(Error::Argument(_))));
    }

    #[test]
    fn test_trailing_slashes_are_tolerated() {
        let c = RequestComposer::new("http://127.0.0.1:8080/", "/v10.0/").unwrap();
        let url = c.url(&["debug_token"], [("input_token", "abc")]);
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/v10.0/debug_token?input_token=abc");
    }

    #[test]
    fn test_url_without_params_has_no_query() {
        let url = composer().url(&["oauth", "access_token"], Vec::<(&str, &str)>::new());
        assert_eq!(url.query(), None);
    }

    #[test]
    fn test_invalid_base() {
        assert!(matches!(RequestComposer::new("not a url", "v10.0"), Err(Error::Argument(_))));
        assert!(matches!(RequestComposer::new("mailto:someone", "v10.0"), Err(Error::Argument(_))));
        assert!(matches!(RequestComposer::new("https://graph.example.com", ""), Err(Error::Argument(_))));
    }
}
