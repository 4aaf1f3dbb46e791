//! Broker engine
//!
//! This module contains the in-memory broker implementation responsible
//! for:
//! - managing topic keys and their subscriber sets
//! - maintaining the inverse subscriber → paths index
//! - delivering published messages to subscriber mailboxes
//! - allocating subscriber ids from a monotonic counter
//!
//! Concurrency and usage notes:
//! - All four maps live behind a single `Mutex`, and every public
//!   operation takes the lock exactly once for its whole duration, so
//!   each operation is one atomic transaction: concurrent readers observe
//!   either the pre-state or the post-state, never an intermediate.
//! - Mailboxes are unbounded `tokio::sync::mpsc` channels; offering a
//!   message never blocks, and a drain task suspends on `recv` until a
//!   message arrives or the mailbox is deleted.
//! - Sub-path expansion for publishes happens before the lock is taken
//!   to keep the critical section small.
//!
//! Invariants held between operations:
//! - `subscriptions[p]` contains `s` iff `subscribers[s]` contains `p`
//! - every id present in any subscription set has a mailbox
//! - the id counter only increases

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::warn;

use crate::broker::message::PublisherResponse;
use crate::broker::topic::{SubscriberId, TopicPath};

/// Broker operations that check state at entry fail with one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BrokerError {
    #[error("no such subscriber: {0}")]
    MissingSubscriber(SubscriberId),

    /// A subscriber is known but its mailbox bucket is gone; the two maps
    /// have diverged.
    #[error("no mailbox bucket for subscriber {0}")]
    MissingBrokerBucket(SubscriberId),
}

/// A subscriber's FIFO of pending responses. The receiving half is taken
/// by the drain task when the subscriber registers; dropping the entry
/// drops the sender, which the drain task observes as end-of-stream.
#[derive(Debug)]
struct Mailbox {
    tx: UnboundedSender<PublisherResponse>,
    rx: Option<UnboundedReceiver<PublisherResponse>>,
}

impl Mailbox {
    fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx: Some(rx) }
    }
}

#[derive(Debug, Default)]
struct State {
    mailboxes: HashMap<SubscriberId, Mailbox>,
    subscriptions: HashMap<String, HashSet<SubscriberId>>,
    subscribers: HashMap<SubscriberId, HashSet<String>>,
    counter: SubscriberId,
}

impl State {
    fn next_id(&mut self) -> SubscriberId {
        let id = self.counter;
        self.counter += 1;
        id
    }
}

#[derive(Debug, Default)]
pub struct Broker {
    state: Mutex<State>,
}

impl Broker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates the next subscriber id. Ids are never reused.
    pub fn next_id(&self) -> SubscriberId {
        self.state.lock().unwrap().next_id()
    }

    /// Allocates a fresh id, creates its mailbox, and hands back the
    /// receiving half for the caller's drain task. One transaction.
    pub fn register_subscriber(&self) -> (SubscriberId, UnboundedReceiver<PublisherResponse>) {
        let mut state = self.state.lock().unwrap();
        let id = state.next_id();
        let (tx, rx) = mpsc::unbounded_channel();
        state.mailboxes.insert(id, Mailbox { tx, rx: None });
        state.subscribers.entry(id).or_default();
        (id, rx)
    }

    /// Claims the parked receiving half of a mailbox that was created by
    /// [`add_subscriber_to`](Self::add_subscriber_to) rather than
    /// [`register_subscriber`](Self::register_subscriber).
    pub fn take_mailbox(
        &self,
        id: SubscriberId,
    ) -> Result<UnboundedReceiver<PublisherResponse>, BrokerError> {
        let mut state = self.state.lock().unwrap();
        let mailbox = state
            .mailboxes
            .get_mut(&id)
            .ok_or(BrokerError::MissingSubscriber(id))?;
        mailbox.rx.take().ok_or(BrokerError::MissingBrokerBucket(id))
    }

    /// Subscribes `id` to every path in `paths`, creating topic keys and
    /// the mailbox as needed. All updates commit as one transaction.
    pub fn add_subscriber_to(&self, paths: &[TopicPath], id: SubscriberId) {
        let mut state = self.state.lock().unwrap();
        state.subscribers.entry(id).or_default();
        for path in paths {
            let key = path.as_canonical();
            state.subscriptions.entry(key.clone()).or_default().insert(id);
            state.subscribers.entry(id).or_default().insert(key);
        }
        state.mailboxes.entry(id).or_insert_with(Mailbox::new);
    }

    /// Tears down `id`: detaches it from every subscribed path (topic
    /// keys stay, possibly with empty sets) and deletes its mailbox and
    /// inverse-index entry.
    pub fn remove_subscriber(&self, id: SubscriberId) -> Result<(), BrokerError> {
        let mut state = self.state.lock().unwrap();
        if !state.subscribers.contains_key(&id) {
            return Err(BrokerError::MissingSubscriber(id));
        }
        if !state.mailboxes.contains_key(&id) {
            return Err(BrokerError::MissingBrokerBucket(id));
        }

        let paths = state.subscribers.remove(&id).unwrap_or_default();
        for path in &paths {
            if let Some(ids) = state.subscriptions.get_mut(path) {
                ids.remove(&id);
            }
        }
        state.mailboxes.remove(&id);
        Ok(())
    }

    /// Unsubscribes `id` from the given paths only. The mailbox and any
    /// other subscriptions are untouched.
    pub fn remove_subscriptions(&self, paths: &[TopicPath], id: SubscriberId) {
        let mut state = self.state.lock().unwrap();
        for path in paths {
            let key = path.as_canonical();
            if let Some(ids) = state.subscriptions.get_mut(&key) {
                ids.remove(&id);
            }
            if let Some(keys) = state.subscribers.get_mut(&id) {
                keys.remove(&key);
            }
        }
    }

    /// Ensures every prefix of `path` exists as a topic key. Existing
    /// entries are never overwritten.
    pub fn add_topic(&self, path: &TopicPath) {
        let sub_paths = path.sub_paths();
        let mut state = self.state.lock().unwrap();
        for key in sub_paths {
            state.subscriptions.entry(key).or_default();
        }
    }

    /// Publishes `response` to every subscriber of `path` or of any of
    /// its prefixes. The target set is deduplicated at the id level, so a
    /// subscriber covering a path through several subscriptions receives
    /// the message once.
    pub fn push(&self, path: &TopicPath, mut response: PublisherResponse) {
        let sub_paths = path.sub_paths();
        response.timestamp = chrono::Utc::now().timestamp_millis();

        let mut state = self.state.lock().unwrap();
        let mut targets: HashSet<SubscriberId> = HashSet::new();
        for key in &sub_paths {
            if let Some(ids) = state.subscriptions.get(key) {
                targets.extend(ids);
            }
        }

        for id in targets {
            // A subscription without a mailbox means teardown raced this
            // publish; restore the bucket and offer anyway.
            let mailbox = state.mailboxes.entry(id).or_insert_with(Mailbox::new);
            if mailbox.tx.send(response.clone()).is_err() {
                warn!("mailbox for subscriber {id} is closed");
            }
        }
    }

    /// The subscriber set of an exact canonical path key, if the key
    /// exists.
    pub fn get_subscribers(&self, path: &str) -> Option<HashSet<SubscriberId>> {
        self.state.lock().unwrap().subscriptions.get(path).cloned()
    }

    /// All known topic keys, sorted.
    pub fn get_topics(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let mut topics: Vec<String> = state.subscriptions.keys().cloned().collect();
        topics.sort();
        topics
    }

    /// The paths `id` is subscribed to, if the subscriber is known.
    pub fn subscriptions_of(&self, id: SubscriberId) -> Option<HashSet<String>> {
        self.state.lock().unwrap().subscribers.get(&id).cloned()
    }

    pub fn topic_count(&self) -> usize {
        self.state.lock().unwrap().subscriptions.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.lock().unwrap().subscribers.len()
    }

    pub fn mailbox_count(&self) -> usize {
        self.state.lock().unwrap().mailboxes.len()
    }
}
