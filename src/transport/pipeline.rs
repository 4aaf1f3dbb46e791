//! Per-datagram orchestration: read → decode → respond → deliver.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, trace};

use crate::broker::{Broker, PublisherResponse, TopicPath};
use crate::codec::header::MessageId;
use crate::codec::respond::RespondError;
use crate::codec::{decode, respond};
use crate::dedup::DuplicateTracker;

/// Identity of one CoAP exchange for retransmission detection.
pub type ExchangeKey = (SocketAddr, MessageId);

/// Connects the codec, the duplicate tracker, and the broker for one
/// gateway socket. Replies go out through the egress channel so that
/// acknowledging a peer never waits on broker delivery.
pub struct Pipeline {
    broker: Arc<Broker>,
    tracker: DuplicateTracker<ExchangeKey>,
    replies: UnboundedSender<(SocketAddr, Vec<u8>)>,
    dedup_window: Duration,
}

impl Pipeline {
    pub fn new(
        broker: Arc<Broker>,
        tracker: DuplicateTracker<ExchangeKey>,
        replies: UnboundedSender<(SocketAddr, Vec<u8>)>,
        dedup_window: Duration,
    ) -> Self {
        Self {
            broker,
            tracker,
            replies,
            dedup_window,
        }
    }

    /// Handles one inbound datagram end to end. Codec failures never
    /// propagate: they produce a reset (when the message id could be
    /// recovered) or a silent drop, and the datagram is finished.
    ///
    /// Must run inside a tokio runtime (the duplicate tracker schedules
    /// its evictions on it).
    pub fn handle_datagram(&self, peer: SocketAddr, datagram: &[u8]) {
        let decoded = decode(datagram);

        match respond(peer, &decoded) {
            Ok(reply) => {
                if self.replies.send(reply).is_err() {
                    error!("egress channel closed, dropping reply");
                }
            }
            Err(RespondError::MissingCoapId) => {
                debug!(%peer, "unidentifiable datagram dropped");
            }
            Err(RespondError::NoResponseAvailable) => {
                trace!(%peer, "no reply owed");
            }
        }

        let message = match decoded {
            Ok(message) => message,
            Err(e) => {
                debug!(%peer, error = %e, "failed to decode datagram");
                return;
            }
        };

        let id = message.message_id();
        if !self
            .tracker
            .add_and_delete_after((peer, id), self.dedup_window)
        {
            debug!(%peer, id = id.value(), "retransmission dropped");
            return;
        }

        let Some(path) = TopicPath::from_segments(message.uri_path_segments()) else {
            debug!(%peer, id = id.value(), "datagram carries no topic, absorbed");
            return;
        };

        let content = message.payload_text();
        trace!(%peer, topic = %path, "publishing payload");
        self.broker.push(
            &path,
            PublisherResponse {
                topic: path.as_canonical(),
                content,
                timestamp: 0,
            },
        );
    }
}
