//! Metric series as returned by `/{id}/insights`, with value shapes resolved at ingestion.

use super::metrics::{Dispatch, Period};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Timestamp layout used by the provider, e.g. `2021-08-07T07:00:00+0000`.
const PROVIDER_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// A metric value, classified by shape.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Scalar(i64),
    Breakdown(BTreeMap<String, i64>),
    #[default]
    Unknown,
}

impl MetricValue {
    /// Classify a raw JSON value.
    ///
    /// Integers are scalars; objects keep their integer members as a breakdown;
    /// anything else, including an object without integer members, is unknown.
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => n.as_i64().map_or(Self::Unknown, Self::Scalar),
            Value::Object(members) => {
                let counts: BTreeMap<String, i64> = members
                    .iter()
                    .filter_map(|(key, v)| v.as_i64().map(|n| (key.clone(), n)))
                    .collect();
                if counts.is_empty() { Self::Unknown } else { Self::Breakdown(counts) }
            }
            _ => Self::Unknown,
        }
    }

    /// Write this value into fields through `dispatch`, returning how many fields were written.
    ///
    /// A shape that does not fit the dispatch writes nothing.
    pub fn apply<F: Copy>(&self, dispatch: &Dispatch<F>, mut write: impl FnMut(F, i64)) -> usize {
        match (self, dispatch) {
            (Self::Scalar(n), Dispatch::Scalar(field)) => {
                write(*field, *n);
                1
            }
            (Self::Breakdown(counts), Dispatch::Breakdown(table)) => {
                let mut written = 0;
                for (key, field) in *table {
                    if let Some(n) = counts.get(*key) {
                        write(*field, *n);
                        written += 1;
                    }
                }
                written
            }
            _ => 0,
        }
    }
}

impl<'de> Deserialize<'de> for MetricValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(Self::from_json(&raw))
    }
}

/// One `(value, end_time)` point of a series.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetricPoint {
    #[serde(default)]
    pub value: MetricValue,

    #[serde(default, deserialize_with = "provider_time::deserialize_opt")]
    pub end_time: Option<DateTime<Utc>>,
}

/// The values of one metric over time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetricSeries {
    pub name: String,
    pub period: Period,
    #[serde(default)]
    pub values: Vec<MetricPoint>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Parse a provider timestamp, falling back to RFC 3339.
#[must_use]
pub fn parse_provider_time(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(text, PROVIDER_TIME_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(text))
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

pub(crate) mod provider_time {
    use super::parse_provider_time;
    use chrono::{DateTime, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_provider_time(&text).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{text}'")))
    }

    pub fn deserialize_opt<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|text| parse_provider_time(&text).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{text}'"))))
            .transpose()
    }
}
