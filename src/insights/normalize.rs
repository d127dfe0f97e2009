//! Merges metric series into flat rows.

use super::metrics::{PostMetric, page_dispatch, post_dispatch};
use super::rows::{NormalizedPageRow, NormalizedPostRow, PostRecord};
use super::value::MetricSeries;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

const LOG_TARGET: &str = " normalize";

/// Merge page-level series into one row per distinct `end_time`.
///
/// Rows appear in the order their `end_time` is first seen. Unknown metrics
/// still create rows but set no field.
#[must_use]
pub fn normalize_page_series(series: &[MetricSeries], page_id: &str) -> Vec<NormalizedPageRow> {
    let mut rows: Vec<NormalizedPageRow> = Vec::new();
    let mut index: HashMap<Option<DateTime<Utc>>, usize> = HashMap::new();

    for s in series {
        let dispatch = page_dispatch(&s.name);
        if dispatch.is_none() {
            log::debug!(target: LOG_TARGET, "Skipping unknown page metric '{}'", s.name);
        }

        for point in &s.values {
            let slot = *index.entry(point.end_time).or_insert_with(|| {
                rows.push(NormalizedPageRow::new(page_id, s.period, point.end_time));
                rows.len() - 1
            });

            if let Some(dispatch) = &dispatch {
                let row = &mut rows[slot];
                let _ = point.value.apply(dispatch, |field, value| row.set(field, value));
            }
        }
    }

    rows
}

/// Split a post's series into basic and detail metrics.
#[must_use]
pub fn partition_post_series(series: Vec<MetricSeries>) -> (Vec<MetricSeries>, Vec<MetricSeries>) {
    series.into_iter().partition(|s| s.name.parse::<PostMetric>().is_ok())
}

/// Flatten one post's basic and detail series into a row.
///
/// Only the first value of each series is used; posts report lifetime totals.
#[must_use]
pub fn normalize_post_bundle(
    post: &PostRecord,
    basic: &[MetricSeries],
    detail: &[MetricSeries],
    query_time: DateTime<Utc>,
) -> NormalizedPostRow {
    let mut row = NormalizedPostRow::new(&post.id, query_time);

    for s in basic.iter().chain(detail) {
        let Some(dispatch) = post_dispatch(&s.name) else {
            log::debug!(target: LOG_TARGET, "Skipping unknown post metric '{}'", s.name);
            continue;
        };

        if let Some(point) = s.values.first() {
            let _ = point.value.apply(&dispatch, |field, value| row.set(field, value));
        }
    }

    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::Period;
    use chrono::TimeZone;
    use serde_json::{Value, json};

    fn series(value: Value) -> Vec<MetricSeries> {
        serde_json::from_value(value).unwrap()
    }

    fn post() -> PostRecord {
        serde_json::from_value(json!({"id": "1_2", "created_time": "2021-08-07T07:00:00+0000"})).unwrap()
    }

    #[test]
    fn test_single_scalar_metric() {
        let rows = normalize_page_series(
            &series(json!([{
                "name": "page_views_total",
                "period": "week",
                "values": [{"value": 42, "end_time": "2021-01-01T00:00:00+0000"}]
            }])),
            "123",
        );

        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.page_id, "123");
        assert_eq!(row.period, Period::Week);
        assert_eq!(row.end_time, Some(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(row.page_views, Some(42));
        assert_eq!(row.actions_on_page, None);
    }

    #[test]
    fn test_metrics_merge_by_end_time_in_first_seen_order() {
        let rows = normalize_page_series(
            &series(json!([
                {
                    "name": "page_views_total",
                    "period": "day",
                    "values": [
                        {"value": 5, "end_time": "2021-01-02T08:00:00+0000"},
                        {"value": 6, "end_time": "2021-01-03T08:00:00+0000"}
                    ]
                },
                {
                    "name": "page_video_views",
                    "period": "day",
                    "values": [
                        {"value": 1, "end_time": "2021-01-03T08:00:00+0000"},
                        {"value": 2, "end_time": "2021-01-04T08:00:00+0000"}
                    ]
                }
            ])),
            "123",
        );

        let summary: Vec<_> = rows.iter().map(|r| (r.end_time.unwrap().format("%d").to_string(), r.page_views, r.videos)).collect();
        assert_eq!(
            summary,
            vec![
                ("02".to_owned(), Some(5), None),
                ("03".to_owned(), Some(6), Some(1)),
                ("04".to_owned(), None, Some(2)),
            ]
        );
    }

    #[test]
    fn test_fan_adds_only_unique_feeds_page_likes() {
        let rows = normalize_page_series(
            &series(json!([
                {"name": "page_fan_adds", "period": "week", "values": [{"value": 99, "end_time": "2021-01-01T00:00:00+0000"}]},
                {"name": "page_fan_adds_unique", "period": "week", "values": [{"value": 4, "end_time": "2021-01-01T00:00:00+0000"}]}
            ])),
            "123",
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].page_likes, Some(4));
    }

    #[test]
    fn test_unknown_page_metric_creates_empty_row() {
        let rows = normalize_page_series(
            &series(json!([{"name": "page_new_metric", "period": "week", "values": [{"value": 1, "end_time": "2021-01-01T00:00:00+0000"}]}])),
            "123",
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], NormalizedPageRow::new("123", Period::Week, rows[0].end_time));
    }

    #[test]
    fn test_activity_breakdown() {
        let (basic, detail) = partition_post_series(series(json!([
            {"name": "post_activity_by_action_type", "period": "lifetime", "values": [{"value": {"like": 3, "comment": 1, "share": 0}}]}
        ])));
        let row = normalize_post_bundle(&post(), &basic, &detail, Utc::now());

        assert_eq!(row.likes, Some(3));
        assert_eq!(row.comments, Some(1));
        assert_eq!(row.shares, Some(0));
    }

    #[test]
    fn test_empty_breakdown_leaves_fields_unset() {
        let (basic, detail) = partition_post_series(series(json!([
            {"name": "post_activity_by_action_type", "period": "lifetime", "values": [{"value": {}}]},
            {"name": "post_clicks_by_type", "period": "lifetime", "values": [{"value": {}}]}
        ])));
        let row = normalize_post_bundle(&post(), &basic, &detail, Utc::now());

        assert_eq!(row.likes, None);
        assert_eq!(row.comments, None);
        assert_eq!(row.shares, None);
        assert_eq!(row.photo_views, None);
    }

    #[test]
    fn test_click_breakdown_and_reactions() {
        let (basic, detail) = partition_post_series(series(json!([
            {"name": "post_clicks_by_type", "period": "lifetime", "values": [{"value": {"photo view": 8, "link clicks": 2, "other clicks": 5, "video play": 1}}]},
            {"name": "post_reactions_like_total", "period": "lifetime", "values": [{"value": 11}]},
            {"name": "post_reactions_love_total", "period": "lifetime", "values": [{"value": 3}]},
            {"name": "post_reactions_wow_total", "period": "lifetime", "values": [{"value": 0}]},
            {"name": "post_reactions_haha_total", "period": "lifetime", "values": [{"value": 1}]},
            {"name": "post_negative_feedback_by_type", "period": "lifetime", "values": [{"value": {"hide_clicks": 1}}]}
        ])));
        assert!(basic.is_empty());
        assert_eq!(detail.len(), 6);

        let row = normalize_post_bundle(&post(), &basic, &detail, Utc::now());
        assert_eq!((row.photo_views, row.link_clicks, row.other_clicks), (Some(8), Some(2), Some(5)));
        assert_eq!((row.likes_like, row.likes_love, row.likes_wow, row.likes_haha), (Some(11), Some(3), Some(0), Some(1)));
    }

    #[test]
    fn test_basic_only_bundle() {
        let query_time = Utc.with_ymd_and_hms(2021, 9, 1, 12, 0, 0).unwrap();
        let (basic, detail) = partition_post_series(series(json!([
            {"name": "post_impressions_organic_unique", "period": "lifetime", "values": [{"value": 120}]},
            {"name": "post_clicks", "period": "lifetime", "values": [{"value": 9}]},
            {"name": "post_activity", "period": "lifetime", "values": [{"value": 4}]}
        ])));
        assert_eq!(basic.len(), 3);
        assert!(detail.is_empty());

        let row = normalize_post_bundle(&post(), &basic, &detail, query_time);
        assert_eq!(row.post_id, "1_2");
        assert_eq!(row.query_time, query_time);
        assert_eq!(row.period, Period::Lifetime);
        assert_eq!((row.reach, row.engagement_post_clicks, row.engagement_activity), (Some(120), Some(9), Some(4)));

        let mut expected = NormalizedPostRow::new("1_2", query_time);
        expected.reach = row.reach;
        expected.engagement_post_clicks = row.engagement_post_clicks;
        expected.engagement_activity = row.engagement_activity;
        assert_eq!(row, expected);
    }

    #[test]
    fn test_series_without_values_are_skipped() {
        let (basic, detail) = partition_post_series(series(json!([
            {"name": "post_clicks", "period": "lifetime", "values": []}
        ])));
        let row = normalize_post_bundle(&post(), &basic, &detail, Utc::now());
        assert_eq!(row.engagement_post_clicks, None);
    }
}
