//! Static metric tables and the metric-to-field dispatch.

use super::rows::{PageField, PostField};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Page-level metrics requested by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum PageMetric {
    PageTotalActions,
    PageViewsTotal,
    PageFanAddsUnique,
    PageFanAdds,
    PagePostEngagements,
    PageVideoViews,
    PageDailyFollowsUnique,
    PageImpressionsOrganicUnique,
}

/// Post-level metrics that map directly onto a row field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum PostMetric {
    PostImpressionsOrganicUnique,
    PostClicks,
    PostActivity,
}

/// Post-level metrics whose values need shape resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum PostDetailMetric {
    PostActivityByActionType,
    PostClicksByType,
    PostReactionsLikeTotal,
    PostReactionsLoveTotal,
    PostReactionsWowTotal,
    PostReactionsHahaTotal,
    PostNegativeFeedbackByType,
    PostNegativeFeedbackByTypeUnique,
}

/// Aggregation period of a metric series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Period {
    Day,
    Week,
    #[serde(rename = "days_28")]
    #[strum(serialize = "days_28")]
    Days28,
    Month,
    Lifetime,
}

/// Relative date ranges understood by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DatePreset {
    Today,
    Yesterday,
    ThisMonth,
    LastMonth,
    ThisQuarter,
    Maximum,
    #[serde(rename = "last_3d")]
    #[strum(serialize = "last_3d")]
    Last3d,
    #[serde(rename = "last_7d")]
    #[strum(serialize = "last_7d")]
    Last7d,
    #[serde(rename = "last_14d")]
    #[strum(serialize = "last_14d")]
    Last14d,
    #[serde(rename = "last_28d")]
    #[strum(serialize = "last_28d")]
    Last28d,
    #[serde(rename = "last_30d")]
    #[strum(serialize = "last_30d")]
    Last30d,
    #[serde(rename = "last_90d")]
    #[strum(serialize = "last_90d")]
    Last90d,
    LastWeekMonSun,
    LastWeekSunSat,
    LastQuarter,
    LastYear,
    ThisWeekMonToday,
    ThisWeekSunToday,
    ThisYear,
}

/// How a metric's value lands in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch<F: 'static> {
    /// A bare number stored in one field.
    Scalar(F),

    /// Named sub-counts stored in one field each; other keys are dropped.
    Breakdown(&'static [(&'static str, F)]),

    /// Known metric deliberately not stored.
    Ignored,
}

const ACTIVITY_BREAKDOWN: &[(&str, PostField)] = &[
    ("like", PostField::Likes),
    ("comment", PostField::Comments),
    ("share", PostField::Shares),
];

const CLICK_BREAKDOWN: &[(&str, PostField)] = &[
    ("photo view", PostField::PhotoViews),
    ("link clicks", PostField::LinkClicks),
    ("other clicks", PostField::OtherClicks),
];

impl PageMetric {
    #[must_use]
    pub const fn dispatch(self) -> Dispatch<PageField> {
        match self {
            Self::PageTotalActions => Dispatch::Scalar(PageField::ActionsOnPage),
            Self::PageViewsTotal => Dispatch::Scalar(PageField::PageViews),
            Self::PageFanAddsUnique => Dispatch::Scalar(PageField::PageLikes),
            Self::PagePostEngagements => Dispatch::Scalar(PageField::PostEngagement),
            Self::PageVideoViews => Dispatch::Scalar(PageField::Videos),
            Self::PageDailyFollowsUnique => Dispatch::Scalar(PageField::PageFollowers),
            Self::PageImpressionsOrganicUnique => Dispatch::Scalar(PageField::PostReach),
            Self::PageFanAdds => Dispatch::Ignored,
        }
    }
}

impl PostMetric {
    #[must_use]
    pub const fn dispatch(self) -> Dispatch<PostField> {
        match self {
            Self::PostImpressionsOrganicUnique => Dispatch::Scalar(PostField::Reach),
            Self::PostClicks => Dispatch::Scalar(PostField::EngagementPostClicks),
            Self::PostActivity => Dispatch::Scalar(PostField::EngagementActivity),
        }
    }
}

impl PostDetailMetric {
    #[must_use]
    pub const fn dispatch(self) -> Dispatch<PostField> {
        match self {
            Self::PostActivityByActionType => Dispatch::Breakdown(ACTIVITY_BREAKDOWN),
            Self::PostClicksByType => Dispatch::Breakdown(CLICK_BREAKDOWN),
            Self::PostReactionsLikeTotal => Dispatch::Scalar(PostField::LikesLike),
            Self::PostReactionsLoveTotal => Dispatch::Scalar(PostField::LikesLove),
            Self::PostReactionsWowTotal => Dispatch::Scalar(PostField::LikesWow),
            Self::PostReactionsHahaTotal => Dispatch::Scalar(PostField::LikesHaha),
            Self::PostNegativeFeedbackByType | Self::PostNegativeFeedbackByTypeUnique => Dispatch::Ignored,
        }
    }

    /// Whether the metric is part of the default detail request.
    #[must_use]
    pub const fn requested_by_default(self) -> bool {
        !matches!(self, Self::PostNegativeFeedbackByType | Self::PostNegativeFeedbackByTypeUnique)
    }
}

/// Dispatch for a page metric name, `None` when the name is unknown.
#[must_use]
pub fn page_dispatch(metric: &str) -> Option<Dispatch<PageField>> {
    metric.parse::<PageMetric>().ok().map(PageMetric::dispatch)
}

/// Dispatch for a basic or detail post metric name, `None` when the name is unknown.
#[must_use]
pub fn post_dispatch(metric: &str) -> Option<Dispatch<PostField>> {
    metric
        .parse::<PostMetric>()
        .map(PostMetric::dispatch)
        .or_else(|_| metric.parse::<PostDetailMetric>().map(PostDetailMetric::dispatch))
        .ok()
}

/// Comma-joined names of `metrics`, in order.
pub fn join<M: Into<&'static str>>(metrics: impl IntoIterator<Item = M>) -> String {
    metrics.into_iter().map(Into::into).collect::<Vec<&str>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_provider_names() {
        assert_eq!(PageMetric::PageDailyFollowsUnique.to_string(), "page_daily_follows_unique");
        assert_eq!(PostDetailMetric::PostNegativeFeedbackByTypeUnique.to_string(), "post_negative_feedback_by_type_unique");
        assert_eq!(Period::Days28.to_string(), "days_28");
        assert_eq!(DatePreset::Last3d.to_string(), "last_3d");
        assert_eq!(DatePreset::ThisWeekMonToday.to_string(), "this_week_mon_today");
        assert_eq!("days_28".parse::<Period>().unwrap(), Period::Days28);
        assert_eq!("yesterday".parse::<DatePreset>().unwrap(), DatePreset::Yesterday);
    }

    #[test]
    fn test_period_serde_matches_display() {
        for period in Period::iter() {
            let json = serde_json::to_string(&period).unwrap();
            assert_eq!(json, format!("\"{period}\""));
        }
    }

    #[test]
    fn test_fan_adds_variants() {
        assert_eq!(page_dispatch("page_fan_adds_unique"), Some(Dispatch::Scalar(PageField::PageLikes)));
        assert_eq!(page_dispatch("page_fan_adds"), Some(Dispatch::Ignored));
        assert_eq!(page_dispatch("page_something_new"), None);
    }

    #[test]
    fn test_post_dispatch_covers_basic_and_detail() {
        assert_eq!(post_dispatch("post_clicks"), Some(Dispatch::Scalar(PostField::EngagementPostClicks)));
        assert_eq!(post_dispatch("post_activity_by_action_type"), Some(Dispatch::Breakdown(ACTIVITY_BREAKDOWN)));
        assert_eq!(post_dispatch("post_negative_feedback_by_type"), Some(Dispatch::Ignored));
        assert_eq!(post_dispatch("page_views_total"), None);
    }

    #[test]
    fn test_join() {
        assert_eq!(
            join(PageMetric::iter()),
            "page_total_actions,page_views_total,page_fan_adds_unique,page_fan_adds,page_post_engagements,\
             page_video_views,page_daily_follows_unique,page_impressions_organic_unique"
        );
        assert_eq!(join([PostMetric::PostClicks]), "post_clicks");
    }
}
