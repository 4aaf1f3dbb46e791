//! The `api` module is the remote-subscriber façade of the broker.
//!
//! Subscribers connect over WebSocket and drive their subscriptions with
//! tagged JSON requests (`add`, `remove`, `topics`); published messages
//! stream back to them as their mailbox drains. Paths arrive as segment
//! lists and pass an API filter before they reach the broker: a segment
//! that is empty or contains '/' disqualifies its path.

pub mod message;
pub mod websocket;

pub use message::{SubscriptionRequest, TopicList};
pub use websocket::start_api_server;
