use serde::{Deserialize, Serialize};

/// A message delivered to subscriber mailboxes and streamed out over the
/// subscription API.
///
/// # Fields
///
/// - `topic` - The canonical path the message was published to.
/// - `content` - The published content, decoded from the CoAP payload.
/// - `timestamp` - Unix timestamp in milliseconds, stamped at publish time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherResponse {
    pub topic: String,
    pub content: String,
    pub timestamp: i64,
}
