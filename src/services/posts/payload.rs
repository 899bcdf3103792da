// Wire shapes for the posts endpoints

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::scheduled_item::{PostStatus, ScheduledItem};

#[derive(Deserialize)]
#[serde(untagged)]
enum PostListBody {
    Bare(Vec<Value>),
    Envelope { posts: Vec<Value> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PostBody {
    Envelope { post: ScheduledItem },
    Bare(ScheduledItem),
}

/// Partial update sent when a post is dropped on a new day
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleBody {
    pub scheduled_at: String,
    pub status: PostStatus,
}

impl RescheduleBody {
    pub fn new(scheduled_at: DateTime<Local>) -> Self {
        Self {
            scheduled_at: scheduled_at.to_rfc3339(),
            status: PostStatus::Scheduled,
        }
    }
}

/// Parse a list response, accepting either a bare array or `{ "posts": [...] }`.
///
/// Entries that do not decode or fail validation are dropped with a warning;
/// only a body that is neither shape is an error.
pub fn parse_post_list(body: &str) -> Result<Vec<ScheduledItem>, serde_json::Error> {
    let entries = match serde_json::from_str::<PostListBody>(body)? {
        PostListBody::Bare(entries) => entries,
        PostListBody::Envelope { posts } => posts,
    };

    Ok(entries.into_iter().filter_map(decode_entry).collect())
}

fn decode_entry(entry: Value) -> Option<ScheduledItem> {
    let id = entry.get("id").cloned().unwrap_or(Value::Null);

    let item = match serde_json::from_value::<ScheduledItem>(entry) {
        Ok(item) => item,
        Err(err) => {
            log::warn!("Skipping undecodable post {} from backend: {}", id, err);
            return None;
        }
    };

    match item.validate() {
        Ok(()) => Some(item),
        Err(err) => {
            log::warn!("Skipping post {:?} from backend: {}", item.id, err);
            None
        }
    }
}

/// Parse the body of an update response, if it holds a post
pub fn parse_updated_post(body: &str) -> Option<ScheduledItem> {
    if body.trim().is_empty() {
        return None;
    }

    match serde_json::from_str::<PostBody>(body) {
        Ok(PostBody::Envelope { post }) | Ok(PostBody::Bare(post)) => Some(post),
        Err(err) => {
            log::debug!("Update response carried no post: {}", err);
            None
        }
    }
}
