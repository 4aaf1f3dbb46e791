use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::broker::TopicPath;

/// A request sent by a subscriber over the API connection.
///
/// Paths are transmitted as segment lists, one inner vector per path,
/// so segments never need escaping.
#[derive(Debug, Deserialize)]
#[serde(tag = "action")]
pub enum SubscriptionRequest {
    #[serde(rename = "add")]
    Add { paths: Vec<Vec<String>> },

    #[serde(rename = "remove")]
    Remove { paths: Vec<Vec<String>> },

    #[serde(rename = "topics")]
    Topics,
}

/// Reply to a `topics` request.
#[derive(Debug, Serialize, Deserialize)]
pub struct TopicList {
    pub topics: Vec<String>,
}

/// Applies the API path filter: a path whose segments are all non-empty
/// and free of '/' becomes a [`TopicPath`]; any other path is rejected
/// and logged.
pub fn filter_paths(paths: Vec<Vec<String>>) -> Vec<TopicPath> {
    paths
        .into_iter()
        .filter_map(|segments| {
            if segments
                .iter()
                .any(|s| s.is_empty() || s.contains('/'))
            {
                warn!(?segments, "rejecting path with invalid segment");
                return None;
            }
            TopicPath::from_segments(segments)
        })
        .collect()
}
