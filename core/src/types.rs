//! Response types for the link endpoints.
//!
//! # Design
//! The API returns a different subset of fields from each endpoint, so
//! `Link` carries all of them and every field falls back to its zero value
//! when the service omits it or sends `null`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DefaultOnNull};

/// Data returned from link endpoints.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    /// Clicks on this bitlink, as reported by `/link/clicks`.
    #[serde(rename = "link_clicks")]
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub clicks: i64,
    /// Click total, as reported by `/user/popular_links`.
    #[serde(rename = "clicks")]
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub clicks_total: i64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub short_url: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub long_url: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub global_hash: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub user_hash: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub hash: String,
    /// 1 when `/shorten` minted a new hash, 0 when it reused one.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub new_hash: i64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub title: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub url: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub aggregate_link: String,
    /// Unix timestamp in seconds.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub created_at: i64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub created_by: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub link: String,
    /// Per-entry failure such as `NOT_FOUND` for an unknown bitlink.
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub error: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub unit: String,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub units: i64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub tz_offset: i64,
}

/// A user's most clicked links over a time window, most clicked first.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopularLinks {
    #[serde(rename = "popular_links")]
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub links: Vec<Link>,
}

/// Granularity of the time window for click and popularity queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl TimeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of `TimeUnit`s to look back over. `-1` asks for all time.
pub type Units = i64;

pub const ALL_TIME: Units = -1;
