use super::topic::TopicPath;
use super::{Broker, BrokerError, PublisherResponse};

fn path(raw: &str) -> TopicPath {
    TopicPath::parse(raw).unwrap()
}

fn response(topic: &str, content: &str) -> PublisherResponse {
    PublisherResponse {
        topic: topic.to_string(),
        content: content.to_string(),
        timestamp: 0,
    }
}

#[test]
fn test_topic_path_canonicalization() {
    assert_eq!(path("root//node/").as_canonical(), "root/node");

    let cleaned = TopicPath::from_segments(["root", "", "no/de"].map(String::from)).unwrap();
    assert_eq!(cleaned.as_canonical(), "root/node");
    assert_eq!(cleaned.segments(), &["root".to_string(), "node".to_string()]);

    // nothing survives cleaning
    assert!(TopicPath::parse("///").is_none());
    assert!(TopicPath::from_segments(["".to_string()]).is_none());
}

#[test]
fn test_sub_path_expansion() {
    assert_eq!(path("a/b/c").sub_paths(), vec!["a", "a/b", "a/b/c"]);
    assert_eq!(path("a").sub_paths(), vec!["a"]);
}

#[test]
fn test_next_id_is_strictly_increasing() {
    let broker = Broker::new();
    let ids: Vec<u64> = (0..8).map(|_| broker.next_id()).collect();
    for pair in ids.windows(2) {
        assert!(pair[0] < pair[1]);
    }

    // registration draws from the same counter
    let (registered, _rx) = broker.register_subscriber();
    assert!(registered > ids[7]);
}

#[test]
fn test_subscribe_creates_topic_and_mailbox() {
    let broker = Broker::new();
    let (id, _rx) = broker.register_subscriber();

    broker.add_subscriber_to(&[path("root/node")], id);

    assert!(broker.get_subscribers("root/node").unwrap().contains(&id));
    assert_eq!(broker.mailbox_count(), 1);
    assert!(broker.subscriptions_of(id).unwrap().contains("root/node"));
}

#[test]
fn test_inverse_index_stays_consistent() {
    let broker = Broker::new();
    let (a, _rx_a) = broker.register_subscriber();
    let (b, _rx_b) = broker.register_subscriber();

    broker.add_subscriber_to(&[path("x"), path("x/y")], a);
    broker.add_subscriber_to(&[path("x")], b);
    broker.remove_subscriptions(&[path("x")], a);

    let check = |id: u64| {
        let paths = broker.subscriptions_of(id).unwrap();
        for p in &paths {
            assert!(
                broker.get_subscribers(p).unwrap().contains(&id),
                "subscribers[{id}] lists {p} but subscriptions[{p}] misses {id}"
            );
        }
        for topic in broker.get_topics() {
            let forward = broker.get_subscribers(&topic).unwrap().contains(&id);
            assert_eq!(
                forward,
                paths.contains(&topic),
                "index mismatch for id {id} on {topic}"
            );
        }
    };
    check(a);
    check(b);
}

#[test]
fn test_remove_subscriber_unknown_id_fails() {
    let broker = Broker::new();
    assert_eq!(
        broker.remove_subscriber(42),
        Err(BrokerError::MissingSubscriber(42))
    );
}

#[test]
fn test_remove_subscriber_leaves_topic_keys() {
    let broker = Broker::new();
    let (id, rx) = broker.register_subscriber();
    broker.add_subscriber_to(&[path("alpha"), path("beta")], id);

    broker.remove_subscriber(id).unwrap();

    // both topic keys survive with empty subscriber sets
    assert!(broker.get_subscribers("alpha").unwrap().is_empty());
    assert!(broker.get_subscribers("beta").unwrap().is_empty());
    assert_eq!(broker.mailbox_count(), 0);
    assert!(broker.subscriptions_of(id).is_none());

    // the drain task sees end-of-stream
    drop(rx);
    assert_eq!(
        broker.remove_subscriber(id),
        Err(BrokerError::MissingSubscriber(id))
    );
}

#[test]
fn test_push_reaches_prefix_subscribers_once() {
    let broker = Broker::new();
    let (leaf, mut leaf_rx) = broker.register_subscriber();
    let (node, mut node_rx) = broker.register_subscriber();
    broker.add_subscriber_to(&[path("root/node/leaf")], leaf);
    broker.add_subscriber_to(&[path("root/node")], node);

    broker.push(&path("root/node/leaf/extra"), response("root/node/leaf/extra", "hello"));

    for rx in [&mut leaf_rx, &mut node_rx] {
        let msg = rx.try_recv().unwrap();
        assert_eq!(msg.topic, "root/node/leaf/extra");
        assert_eq!(msg.content, "hello");
        assert!(rx.try_recv().is_err(), "delivered more than once");
    }

    // overlapping subscriptions still deliver once per publish
    broker.add_subscriber_to(&[path("root")], leaf);
    broker.push(&path("root/node/leaf/extra"), response("root/node/leaf/extra", "again"));

    for rx in [&mut leaf_rx, &mut node_rx] {
        assert_eq!(rx.try_recv().unwrap().content, "again");
        assert!(rx.try_recv().is_err(), "delivered more than once");
    }
}

#[test]
fn test_push_to_unmatched_path_is_absorbed() {
    let broker = Broker::new();
    let (id, mut rx) = broker.register_subscriber();
    broker.add_subscriber_to(&[path("a/b")], id);

    // sibling branch, no prefix overlap
    broker.push(&path("a2/b"), response("a2/b", "stray"));
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_remove_subscriptions_keeps_mailbox_and_others() {
    let broker = Broker::new();
    let (id, mut rx) = broker.register_subscriber();
    broker.add_subscriber_to(&[path("keep"), path("drop")], id);

    broker.remove_subscriptions(&[path("drop")], id);

    assert!(!broker.get_subscribers("drop").unwrap().contains(&id));
    assert!(broker.get_subscribers("keep").unwrap().contains(&id));
    assert_eq!(broker.mailbox_count(), 1);

    broker.push(&path("keep"), response("keep", "still here"));
    assert_eq!(rx.try_recv().unwrap().content, "still here");
}

#[test]
fn test_add_topic_creates_all_prefixes() {
    let broker = Broker::new();
    broker.add_topic(&path("a/b/c"));

    assert_eq!(broker.get_topics(), vec!["a", "a/b", "a/b/c"]);
    assert!(broker.get_subscribers("a/b").unwrap().is_empty());

    // re-adding never clobbers an existing subscriber set
    let (id, _rx) = broker.register_subscriber();
    broker.add_subscriber_to(&[path("a/b")], id);
    broker.add_topic(&path("a/b/c"));
    assert!(broker.get_subscribers("a/b").unwrap().contains(&id));
}

#[test]
fn test_push_to_closed_mailbox_does_not_panic() {
    let broker = Broker::new();
    let (id, rx) = broker.register_subscriber();
    broker.add_subscriber_to(&[path("t")], id);

    drop(rx);
    broker.push(&path("t"), response("t", "into the void"));
}

#[test]
fn test_take_mailbox_refused_for_registered_subscriber() {
    let broker = Broker::new();
    let (id, _rx) = broker.register_subscriber();
    broker.add_subscriber_to(&[path("t")], id);

    // claiming the parked half of a registered mailbox is refused
    assert!(matches!(
        broker.take_mailbox(id),
        Err(BrokerError::MissingBrokerBucket(i)) if i == id
    ));
}

#[test]
fn test_mailbox_deleted_on_remove() {
    let broker = Broker::new();
    let (id, mut rx) = broker.register_subscriber();
    broker.add_subscriber_to(&[path("t")], id);

    broker.remove_subscriber(id).unwrap();

    // sender side is gone, the drain loop terminates
    assert!(matches!(
        rx.try_recv(),
        Err(tokio::sync::mpsc::error::TryRecvError::Disconnected)
    ));
}

#[test]
fn test_take_mailbox_for_lazily_created_subscriber() {
    let broker = Broker::new();
    let id = broker.next_id();
    broker.add_subscriber_to(&[path("lazy")], id);

    let mut rx = broker.take_mailbox(id).unwrap();
    broker.push(&path("lazy"), response("lazy", "late bind"));
    assert_eq!(rx.try_recv().unwrap().content, "late bind");

    assert!(matches!(
        broker.take_mailbox(999),
        Err(BrokerError::MissingSubscriber(999))
    ));
}
