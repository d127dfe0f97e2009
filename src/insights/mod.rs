//! Page and post insights.
//!
//! The provider reports each metric as a series of `(value, end_time)` points,
//! where a value may be a number, a record of named sub-counts, or an empty
//! record. [`MetricValue`] classifies each value once at ingestion, and the
//! normalizer writes it into the row field chosen by the metric's [`Dispatch`].
//!
//! Page series merge into one [`NormalizedPageRow`] per `end_time`. Post
//! series merge into one [`NormalizedPostRow`] per post.

mod client;
mod metrics;
mod normalize;
mod rows;
mod value;

pub use client::{
    ClientOptions, DEFAULT_API_SERVER, DEFAULT_API_VERSION, DEFAULT_BETWEEN_DAYS, InsightsClient, PageInsightsQuery,
    PageWebInsightQuery, PostMetricSelection, PostWebInsightQuery, PostsWebInsight,
};
pub use metrics::{
    DatePreset, Dispatch, PageMetric, Period, PostDetailMetric, PostMetric, page_dispatch, post_dispatch,
};
pub use normalize::{normalize_page_series, normalize_post_bundle, partition_post_series};
pub use rows::{NormalizedPageRow, NormalizedPostRow, PageField, PostField, PostRecord};
pub use value::{MetricPoint, MetricSeries, MetricValue, parse_provider_time};
