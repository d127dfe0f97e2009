use super::metrics::{self, DatePreset, PageMetric, Period, PostDetailMetric, PostMetric};
use super::normalize::{normalize_page_series, normalize_post_bundle, partition_post_series};
use super::rows::{NormalizedPageRow, NormalizedPostRow, PostRecord};
use super::value::MetricSeries;
use crate::credentials::{AccessToken, AppCredentials, CredentialResolver, CredentialStore, TokenSources};
use crate::graph::{GraphApi, PagedRequest, PaginatedCollector, RequestComposer, TimeWindow, Transport};
use crate::{Error, Result};
use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use strum::IntoEnumIterator;

const LOG_TARGET: &str = "    client";

pub const DEFAULT_API_SERVER: &str = "https://graph.facebook.com";
pub const DEFAULT_API_VERSION: &str = "v10.0";

/// Days covered by a post window when only one bound (or none) is given.
pub const DEFAULT_BETWEEN_DAYS: u32 = 365;

/// Fields requested for each listed post.
const POST_FIELDS: &str = "id,created_time,message,story";

/// Everything an [`InsightsClient`] needs besides its transport and store.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub api_server: String,
    pub api_version: String,
    pub default_page_id: Option<String>,
    pub app: Option<AppCredentials>,
    pub sources: TokenSources,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_server: DEFAULT_API_SERVER.to_owned(),
            api_version: DEFAULT_API_VERSION.to_owned(),
            default_page_id: None,
            app: None,
            sources: TokenSources::default(),
        }
    }
}

/// Parameters of a raw page insights query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInsightsQuery {
    /// Metrics to request; empty means every [`PageMetric`].
    pub metrics: Vec<PageMetric>,
    pub date_preset: DatePreset,
    pub period: Period,
    pub window: Option<TimeWindow>,
}

impl Default for PageInsightsQuery {
    fn default() -> Self {
        Self {
            metrics: Vec::new(),
            date_preset: DatePreset::Yesterday,
            period: Period::Week,
            window: None,
        }
    }
}

/// Which metrics to request for a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostMetricSelection {
    Standard { basic: bool, detail: bool },
    Custom(Vec<String>),
}

impl Default for PostMetricSelection {
    fn default() -> Self {
        Self::Standard { basic: true, detail: true }
    }
}

impl PostMetricSelection {
    fn metric_names(&self) -> Vec<String> {
        match self {
            Self::Custom(names) => names.clone(),
            Self::Standard { basic, detail } => {
                let basic = basic.then(|| PostMetric::iter().map(|m| m.to_string())).into_iter().flatten();
                let detail = detail
                    .then(|| {
                        PostDetailMetric::iter()
                            .filter(|m| m.requested_by_default())
                            .map(|m| m.to_string())
                    })
                    .into_iter()
                    .flatten();
                basic.chain(detail).collect()
            }
        }
    }
}

/// Parameters of a normalized page insights query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageWebInsightQuery {
    /// Applied only when `until` is given too.
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub date_preset: DatePreset,
    pub period: Period,
}

impl Default for PageWebInsightQuery {
    fn default() -> Self {
        Self {
            since: None,
            until: None,
            date_preset: DatePreset::Yesterday,
            period: Period::Week,
        }
    }
}

/// Parameters of a normalized post insights query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostWebInsightQuery {
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub between_days: Option<u32>,
}

/// Normalized insights of every post in a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostsWebInsight {
    pub query_time: DateTime<Utc>,
    pub rows: Vec<NormalizedPostRow>,
    pub posts: Vec<PostRecord>,
}

#[derive(Debug, Deserialize)]
struct InsightsResponse {
    #[serde(default)]
    data: Vec<Value>,
}

impl InsightsResponse {
    /// Decode each series on its own, skipping those with an unfamiliar shape.
    fn into_series(self) -> Vec<MetricSeries> {
        self.data
            .into_iter()
            .filter_map(|raw| match MetricSeries::deserialize(&raw) {
                Ok(series) => Some(series),
                Err(e) => {
                    let name = raw.get("name").and_then(Value::as_str).unwrap_or("unnamed");
                    log::warn!(target: LOG_TARGET, "Skipping metric series '{name}': {e}");
                    None
                }
            })
            .collect()
    }
}

/// High-level access to page and post insights.
#[derive(Debug)]
pub struct InsightsClient<T, S> {
    graph: Arc<GraphApi<T>>,
    resolver: CredentialResolver<T, S>,
    collector: PaginatedCollector<T>,
    default_page_id: Option<String>,
}

impl<T: Transport, S: CredentialStore> InsightsClient<T, S> {
    /// # Errors
    ///
    /// Returns [`Error::Argument`] when the API server or version is unusable.
    pub fn new(transport: T, store: S, options: ClientOptions) -> Result<Self, Error> {
        let composer = RequestComposer::new(&options.api_server, &options.api_version)?;
        let graph = Arc::new(GraphApi::new(composer, transport));

        Ok(Self {
            resolver: CredentialResolver::new(Arc::clone(&graph), options.app, options.sources, store),
            collector: PaginatedCollector::new(Arc::clone(&graph)),
            graph,
            default_page_id: options.default_page_id.filter(|id| !id.is_empty()),
        })
    }

    /// `page_id`, or the configured default page id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] when neither is available.
    pub fn page_id<'a>(&'a self, page_id: Option<&'a str>) -> Result<&'a str, Error> {
        page_id
            .or(self.default_page_id.as_deref())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::Argument("no page id given and no default page id configured".into()))
    }

    /// Resolve the page token for `page_id` (or the default page).
    pub async fn page_token(&self, page_id: Option<&str>) -> Result<AccessToken, Error> {
        let page_id = self.page_id(page_id)?;
        self.resolver.resolve_page_token(page_id).await
    }

    /// Raw page-level metric series.
    pub async fn page_insights(&self, page_id: Option<&str>, query: &PageInsightsQuery) -> Result<Vec<MetricSeries>, Error> {
        let page_id = self.page_id(page_id)?;
        if let Some(window) = &query.window {
            window.validate()?;
        }

        let token = self.resolver.resolve_page_token(page_id).await?;

        let metric = if query.metrics.is_empty() {
            metrics::join(PageMetric::iter())
        } else {
            metrics::join(query.metrics.iter().copied())
        };

        let mut params = vec![
            ("metric", metric),
            ("date_preset", query.date_preset.to_string()),
            ("period", query.period.to_string()),
        ];
        if let Some(window) = query.window {
            params.push(("since", window.since.to_string()));
            params.push(("until", window.until.to_string()));
        }

        let url = self.graph.composer().compose(page_id, "insights", token.as_str(), params)?;
        let response: InsightsResponse = self.graph.get_as(&url).await?;
        Ok(response.into_series())
    }

    /// Every post of a page, optionally restricted to a window, tagged with the page id.
    pub async fn posts(&self, page_id: Option<&str>, window: Option<TimeWindow>) -> Result<Vec<PostRecord>, Error> {
        let page_id = self.page_id(page_id)?;
        if let Some(window) = &window {
            window.validate()?;
        }

        let token = self.resolver.resolve_page_token(page_id).await?;
        let request = PagedRequest::new(page_id, "posts").param("fields", POST_FIELDS).window(window);

        let mut posts: Vec<PostRecord> = self.collector.collect_all(&request, &token).await?;
        for post in &mut posts {
            post.page_id = Some(page_id.to_owned());
        }

        Ok(posts)
    }

    /// Lifetime metric series of one post.
    ///
    /// The token is resolved for the page that owns the post, taken from the
    /// `{page}_{post}` form of the post id.
    pub async fn post_insights(&self, post_id: &str, selection: &PostMetricSelection) -> Result<Vec<MetricSeries>, Error> {
        if post_id.is_empty() {
            return Err(Error::Argument("post id must not be empty".into()));
        }

        let names = selection.metric_names();
        if names.is_empty() {
            return Err(Error::Argument("no post metrics selected".into()));
        }

        let token = self.resolver.resolve_page_token(owning_page_id(post_id)).await?;
        let url = self
            .graph
            .composer()
            .compose(post_id, "insights", token.as_str(), [("metric", names.join(","))])?;
        let response: InsightsResponse = self.graph.get_as(&url).await?;
        Ok(response.into_series())
    }

    /// Page insights normalized into one row per `end_time`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for the `lifetime` period, which page metrics do not support.
    pub async fn page_web_insight(&self, page_id: Option<&str>, query: &PageWebInsightQuery) -> Result<Vec<NormalizedPageRow>, Error> {
        if query.period == Period::Lifetime {
            return Err(Error::Validation("period can not be lifetime when querying page insights".into()));
        }

        let page_id = self.page_id(page_id)?;
        let window = match (query.since, query.until) {
            (Some(since), Some(until)) => Some(TimeWindow::new(midnight_timestamp(since), midnight_timestamp(until))),
            _ => None,
        };

        let insights_query = PageInsightsQuery {
            metrics: Vec::new(),
            date_preset: query.date_preset,
            period: query.period,
            window,
        };

        let series = self.page_insights(Some(page_id), &insights_query).await?;
        let rows = normalize_page_series(&series, page_id);
        log::info!(target: LOG_TARGET, "Normalized {} series into {} page row(s)", series.len(), rows.len());
        Ok(rows)
    }

    /// Every post in a window with its insights, normalized into one row per post.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] when `since`, `until` and `between_days` are all given.
    pub async fn post_web_insight(&self, page_id: Option<&str>, query: &PostWebInsightQuery) -> Result<PostsWebInsight, Error> {
        let query_time = Utc::now();
        let window = post_window(query, query_time)?;

        let posts = self.posts(page_id, Some(window)).await?;
        let mut rows = Vec::with_capacity(posts.len());
        for post in &posts {
            let series = self.post_insights(&post.id, &PostMetricSelection::default()).await?;
            let (basic, detail) = partition_post_series(series);
            rows.push(normalize_post_bundle(post, &basic, &detail, query_time));
        }

        log::info!(target: LOG_TARGET, "Normalized insights of {} post(s)", rows.len());
        Ok(PostsWebInsight { query_time, rows, posts })
    }
}

/// The page id part of a `{page}_{post}` post id.
fn owning_page_id(post_id: &str) -> &str {
    post_id.split_once('_').map_or(post_id, |(page, _)| page)
}

/// Unix seconds of midnight UTC at the start of `date`.
fn midnight_timestamp(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp()
}

/// The posts window for `query`, anchored at `now` when no bound is given.
///
/// `between_days` defaults to [`DEFAULT_BETWEEN_DAYS`]. Without an `until`,
/// the window ends `between_days` after `since`, or at `now` when `since` is
/// absent too. Without a `since`, it starts `between_days` before `until`.
fn post_window(query: &PostWebInsightQuery, now: DateTime<Utc>) -> Result<TimeWindow, Error> {
    if query.since.is_some() && query.until.is_some() && query.between_days.is_some() {
        return Err(Error::Argument("since, until and between_days can not all be given".into()));
    }

    let span = Days::new(u64::from(query.between_days.unwrap_or(DEFAULT_BETWEEN_DAYS)));
    let at_midnight = |date: NaiveDate| date.and_time(chrono::NaiveTime::MIN).and_utc();
    let out_of_range = || Error::Argument("post window is out of range".into());

    let until = match (query.since, query.until) {
        (_, Some(until)) => at_midnight(until),
        (Some(since), None) => at_midnight(since).checked_add_days(span).ok_or_else(out_of_range)?,
        (None, None) => now,
    };

    let since = match query.since {
        Some(since) => at_midnight(since),
        None => until.checked_sub_days(span).ok_or_else(out_of_range)?,
    };

    Ok(TimeWindow::new(since.timestamp(), until.timestamp()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ts(y: i32, m: u32, d: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap().timestamp()
    }

    #[test]
    fn test_owning_page_id() {
        assert_eq!(owning_page_id("104902651770903_153254550269046"), "104902651770903");
        assert_eq!(owning_page_id("104902651770903"), "104902651770903");
    }

    #[test]
    fn test_midnight_timestamp() {
        assert_eq!(midnight_timestamp(date(2021, 9, 9)), 1_631_145_600);
    }

    #[test]
    fn test_post_window_defaults_to_a_year_before_now() {
        let now = Utc.with_ymd_and_hms(2021, 9, 1, 12, 30, 0).unwrap();
        let window = post_window(&PostWebInsightQuery::default(), now).unwrap();

        assert_eq!(window.until, now.timestamp());
        assert_eq!(window.since, Utc.with_ymd_and_hms(2020, 9, 1, 12, 30, 0).unwrap().timestamp());
    }

    #[test]
    fn test_post_window_from_since_only() {
        let query = PostWebInsightQuery {
            since: Some(date(2021, 1, 1)),
            until: None,
            between_days: Some(10),
        };
        let window = post_window(&query, Utc::now()).unwrap();
        assert_eq!(window, TimeWindow::new(ts(2021, 1, 1), ts(2021, 1, 11)));
    }

    #[test]
    fn test_post_window_from_until_only() {
        let query = PostWebInsightQuery {
            since: None,
            until: Some(date(2021, 3, 1)),
            between_days: None,
        };
        let window = post_window(&query, Utc::now()).unwrap();
        assert_eq!(window, TimeWindow::new(ts(2020, 3, 1), ts(2021, 3, 1)));
    }

    #[test]
    fn test_post_window_explicit_dates() {
        let query = PostWebInsightQuery {
            since: Some(date(2021, 1, 1)),
            until: Some(date(2021, 2, 1)),
            between_days: None,
        };
        let window = post_window(&query, Utc::now()).unwrap();
        assert_eq!(window, TimeWindow::new(ts(2021, 1, 1), ts(2021, 2, 1)));
    }

    #[test]
    fn test_post_window_rejects_all_three_inputs() {
        let query = PostWebInsightQuery {
            since: Some(date(2021, 1, 1)),
            until: Some(date(2021, 2, 1)),
            between_days: Some(3),
        };
        assert!(matches!(post_window(&query, Utc::now()), Err(Error::Argument(_))));
    }

    #[test]
    fn test_metric_selection() {
        let defaults = PostMetricSelection::default().metric_names();
        assert_eq!(defaults.len(), 9);
        assert!(!defaults.iter().any(|name| name == "post_negative_feedback_by_type"));
        assert_eq!(
            PostMetricSelection::Standard { basic: true, detail: false }.metric_names(),
            vec!["post_impressions_organic_unique", "post_clicks", "post_activity"]
        );
        assert!(PostMetricSelection::Standard { basic: false, detail: false }.metric_names().is_empty());
        assert_eq!(PostMetricSelection::Custom(vec!["post_clicks".into()]).metric_names(), vec!["post_clicks"]);
    }

    #[test]
    fn test_unfamiliar_series_are_skipped() {
        let response: InsightsResponse = serde_json::from_value(serde_json::json!({
            "data": [
                {"name": "page_views_total", "period": "week", "values": [{"value": 3, "end_time": "2021-09-02T07:00:00+0000"}]},
                {"name": "page_new_metric", "period": "total_over_range", "values": [{"value": 9}]},
                {"name": "page_video_views", "period": "day", "values": [{"value": 1, "end_time": "yesterday-ish"}]},
                {"name": "page_total_actions", "period": "day", "values": []}
            ]
        }))
        .unwrap();

        let names: Vec<_> = response.into_series().into_iter().map(|series| series.name).collect();
        assert_eq!(names, vec!["page_views_total", "page_total_actions"]);
    }
}
