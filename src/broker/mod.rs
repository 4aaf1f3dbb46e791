//! The `broker` module is the core of the pub/sub side of the gateway.
//!
//! It contains the following main components:
//!
//! - `Broker`: the transactional store of topics, subscriptions, and
//!   per-subscriber mailboxes.
//! - `TopicPath`: canonicalized hierarchical topic paths and their
//!   prefix expansion.
//! - `PublisherResponse`: the message shape delivered to mailboxes.
//!
//! The broker is responsible for routing published messages to every
//! subscriber whose subscription covers the published path.

pub mod engine;
pub mod message;
pub mod topic;

pub use engine::{Broker, BrokerError};
pub use message::PublisherResponse;
pub use topic::{SubscriberId, TopicPath};

#[cfg(test)]
mod tests;
