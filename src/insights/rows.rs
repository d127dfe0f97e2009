//! Flattened records produced by normalization.

use super::metrics::Period;
use super::value::provider_time;
use crate::reports::Tabular;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page-level insights for one `end_time`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedPageRow {
    pub page_id: String,
    pub end_time: Option<DateTime<Utc>>,
    pub period: Period,
    pub actions_on_page: Option<i64>,
    pub page_views: Option<i64>,
    pub page_likes: Option<i64>,
    pub post_engagement: Option<i64>,
    pub videos: Option<i64>,
    pub page_followers: Option<i64>,
    pub post_reach: Option<i64>,
}

/// The metric-backed fields of a [`NormalizedPageRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageField {
    ActionsOnPage,
    PageViews,
    PageLikes,
    PostEngagement,
    Videos,
    PageFollowers,
    PostReach,
}

impl Tabular for NormalizedPageRow {
    const COLUMNS: &'static [&'static str] = &[
        "page_id",
        "end_time",
        "period",
        "actions_on_page",
        "page_views",
        "page_likes",
        "post_engagement",
        "videos",
        "page_followers",
        "post_reach",
    ];
}

impl NormalizedPageRow {
    pub fn new(page_id: impl Into<String>, period: Period, end_time: Option<DateTime<Utc>>) -> Self {
        Self {
            page_id: page_id.into(),
            end_time,
            period,
            actions_on_page: None,
            page_views: None,
            page_likes: None,
            post_engagement: None,
            videos: None,
            page_followers: None,
            post_reach: None,
        }
    }

    pub fn set(&mut self, field: PageField, value: i64) {
        let slot = match field {
            PageField::ActionsOnPage => &mut self.actions_on_page,
            PageField::PageViews => &mut self.page_views,
            PageField::PageLikes => &mut self.page_likes,
            PageField::PostEngagement => &mut self.post_engagement,
            PageField::Videos => &mut self.videos,
            PageField::PageFollowers => &mut self.page_followers,
            PageField::PostReach => &mut self.post_reach,
        };
        *slot = Some(value);
    }
}

/// Post-level insights for one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedPostRow {
    pub post_id: String,

    /// When the insights were fetched; not part of the provider response.
    pub query_time: DateTime<Utc>,

    pub period: Period,
    pub reach: Option<i64>,
    pub engagement_post_clicks: Option<i64>,
    pub engagement_activity: Option<i64>,
    pub likes: Option<i64>,
    pub comments: Option<i64>,
    pub shares: Option<i64>,
    pub photo_views: Option<i64>,
    pub link_clicks: Option<i64>,
    pub other_clicks: Option<i64>,
    pub likes_like: Option<i64>,
    pub likes_love: Option<i64>,
    pub likes_wow: Option<i64>,
    pub likes_haha: Option<i64>,
}

/// The metric-backed fields of a [`NormalizedPostRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostField {
    Reach,
    EngagementPostClicks,
    EngagementActivity,
    Likes,
    Comments,
    Shares,
    PhotoViews,
    LinkClicks,
    OtherClicks,
    LikesLike,
    LikesLove,
    LikesWow,
    LikesHaha,
}

impl Tabular for NormalizedPostRow {
    const COLUMNS: &'static [&'static str] = &[
        "post_id",
        "query_time",
        "period",
        "reach",
        "engagement_post_clicks",
        "engagement_activity",
        "likes",
        "comments",
        "shares",
        "photo_views",
        "link_clicks",
        "other_clicks",
        "likes_like",
        "likes_love",
        "likes_wow",
        "likes_haha",
    ];
}

impl NormalizedPostRow {
    pub fn new(post_id: impl Into<String>, query_time: DateTime<Utc>) -> Self {
        Self {
            post_id: post_id.into(),
            query_time,
            period: Period::Lifetime,
            reach: None,
            engagement_post_clicks: None,
            engagement_activity: None,
            likes: None,
            comments: None,
            shares: None,
            photo_views: None,
            link_clicks: None,
            other_clicks: None,
            likes_like: None,
            likes_love: None,
            likes_wow: None,
            likes_haha: None,
        }
    }

    pub fn set(&mut self, field: PostField, value: i64) {
        let slot = match field {
            PostField::Reach => &mut self.reach,
            PostField::EngagementPostClicks => &mut self.engagement_post_clicks,
            PostField::EngagementActivity => &mut self.engagement_activity,
            PostField::Likes => &mut self.likes,
            PostField::Comments => &mut self.comments,
            PostField::Shares => &mut self.shares,
            PostField::PhotoViews => &mut self.photo_views,
            PostField::LinkClicks => &mut self.link_clicks,
            PostField::OtherClicks => &mut self.other_clicks,
            PostField::LikesLike => &mut self.likes_like,
            PostField::LikesLove => &mut self.likes_love,
            PostField::LikesWow => &mut self.likes_wow,
            PostField::LikesHaha => &mut self.likes_haha,
        };
        *slot = Some(value);
    }
}

/// A post as listed by `/{page}/posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,

    /// The page the post was listed under; filled in by the client.
    #[serde(default)]
    pub page_id: Option<String>,

    #[serde(deserialize_with = "provider_time::deserialize")]
    pub created_time: DateTime<Utc>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub story: Option<String>,
}

impl PostRecord {
    /// The post's message, or its story when it has no message.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.message.as_deref().or(self.story.as_deref())
    }
}
