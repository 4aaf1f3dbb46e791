use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::broker::{Broker, TopicPath};
use crate::dedup::{DuplicateTracker, EXCHANGE_LIFETIME};
use crate::transport::pipeline::Pipeline;

fn peer() -> SocketAddr {
    "10.0.0.7:41234".parse().unwrap()
}

// This builds the same pipeline the UDP server runs, with the egress
// channel captured so tests can observe outbound replies.
fn pipeline(broker: Arc<Broker>) -> (Pipeline, UnboundedReceiver<(SocketAddr, Vec<u8>)>) {
    let (reply_tx, reply_rx) = mpsc::unbounded_channel();
    let pipeline = Pipeline::new(broker, DuplicateTracker::new(), reply_tx, EXCHANGE_LIFETIME);
    (pipeline, reply_rx)
}

#[tokio::test]
async fn test_confirmable_datagram_is_acked_and_published() {
    let broker = Arc::new(Broker::new());
    let (id, mut mailbox) = broker.register_subscriber();
    broker.add_subscriber_to(&[TopicPath::parse("test").unwrap()], id);

    let (pipeline, mut replies) = pipeline(Arc::clone(&broker));

    // CON GET id=5, Uri-Path "test", payload "hello"
    let mut datagram = vec![0x40, 0x01, 0x00, 0x05, 0xB4];
    datagram.extend_from_slice(b"test");
    datagram.push(0xFF);
    datagram.extend_from_slice(b"hello");
    pipeline.handle_datagram(peer(), &datagram);

    let (addr, reply) = replies.try_recv().unwrap();
    assert_eq!(addr, peer());
    assert_eq!(reply, vec![0x60, 0x00, 0x00, 0x05]);

    let delivered = mailbox.try_recv().unwrap();
    assert_eq!(delivered.topic, "test");
    assert_eq!(delivered.content, "hello");
}

#[tokio::test]
async fn test_malformed_datagram_gets_reset_and_no_publish() {
    let broker = Arc::new(Broker::new());
    let (id, mut mailbox) = broker.register_subscriber();
    broker.add_subscriber_to(&[TopicPath::parse("test").unwrap()], id);

    let (pipeline, mut replies) = pipeline(Arc::clone(&broker));

    // payload marker with nothing behind it
    pipeline.handle_datagram(peer(), &[0x40, 0x01, 0xAB, 0xCD, 0xFF]);

    let (_, reply) = replies.try_recv().unwrap();
    assert_eq!(reply, vec![0x70, 0x00, 0xAB, 0xCD]);
    assert!(mailbox.try_recv().is_err());
}

#[tokio::test]
async fn test_retransmission_is_acked_but_not_republished() {
    let broker = Arc::new(Broker::new());
    let (id, mut mailbox) = broker.register_subscriber();
    broker.add_subscriber_to(&[TopicPath::parse("test").unwrap()], id);

    let (pipeline, mut replies) = pipeline(Arc::clone(&broker));

    let mut datagram = vec![0x40, 0x01, 0x00, 0x05, 0xB4];
    datagram.extend_from_slice(b"test");
    datagram.push(0xFF);
    datagram.extend_from_slice(b"once");

    pipeline.handle_datagram(peer(), &datagram);
    pipeline.handle_datagram(peer(), &datagram);

    // both copies are acknowledged
    assert!(replies.try_recv().is_ok());
    assert!(replies.try_recv().is_ok());

    // but only the first reaches the broker
    assert_eq!(mailbox.try_recv().unwrap().content, "once");
    assert!(mailbox.try_recv().is_err());
}

#[tokio::test]
async fn test_same_id_from_another_peer_is_not_a_duplicate() {
    let broker = Arc::new(Broker::new());
    let (id, mut mailbox) = broker.register_subscriber();
    broker.add_subscriber_to(&[TopicPath::parse("test").unwrap()], id);

    let (pipeline, _replies) = pipeline(Arc::clone(&broker));

    let mut datagram = vec![0x50, 0x01, 0x00, 0x05, 0xB4];
    datagram.extend_from_slice(b"test");
    datagram.push(0xFF);
    datagram.extend_from_slice(b"hi");

    pipeline.handle_datagram(peer(), &datagram);
    pipeline.handle_datagram("10.0.0.8:41234".parse().unwrap(), &datagram);

    assert!(mailbox.try_recv().is_ok());
    assert!(mailbox.try_recv().is_ok());
}

#[tokio::test]
async fn test_unidentifiable_datagram_is_dropped_silently() {
    let broker = Arc::new(Broker::new());
    let (pipeline, mut replies) = pipeline(Arc::clone(&broker));

    pipeline.handle_datagram(peer(), &[0x40]);

    assert!(replies.try_recv().is_err());
}

#[tokio::test]
async fn test_non_confirmable_is_published_without_reply() {
    let broker = Arc::new(Broker::new());
    let (id, mut mailbox) = broker.register_subscriber();
    broker.add_subscriber_to(&[TopicPath::parse("sensors").unwrap()], id);

    let (pipeline, mut replies) = pipeline(Arc::clone(&broker));

    // NON POST id=9, Uri-Path "sensors", payload "21.5"
    let mut datagram = vec![0x50, 0x02, 0x00, 0x09, 0xB7];
    datagram.extend_from_slice(b"sensors");
    datagram.push(0xFF);
    datagram.extend_from_slice(b"21.5");
    pipeline.handle_datagram(peer(), &datagram);

    assert!(replies.try_recv().is_err());
    assert_eq!(mailbox.try_recv().unwrap().content, "21.5");
}

#[tokio::test]
async fn test_datagram_without_topic_is_absorbed() {
    let broker = Arc::new(Broker::new());
    let (pipeline, mut replies) = pipeline(Arc::clone(&broker));

    // well-formed CON with no Uri-Path options: acked, not published
    pipeline.handle_datagram(peer(), &[0x40, 0x01, 0x12, 0x34]);

    assert_eq!(replies.try_recv().unwrap().1, vec![0x60, 0x00, 0x12, 0x34]);
    assert_eq!(broker.topic_count(), 0);
}
