use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio_tungstenite::accept_async;
use tracing::{debug, info, warn};
use tungstenite::protocol::Message as WsMessage;

use crate::api::message::{filter_paths, SubscriptionRequest, TopicList};
use crate::broker::{Broker, SubscriberId};
use crate::utils::error::{unreachable_code, GatewayError};

/// Serves the subscription API until the listener fails.
pub async fn start_api_server(addr: &str, broker: Arc<Broker>) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("subscription API listening on ws://{addr}");

    loop {
        let (stream, _) = listener.accept().await?;
        let broker = Arc::clone(&broker);

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, broker).await {
                warn!("subscriber connection ended with error: {e}");
            }
        });
    }
}

/// One subscriber connection: register a mailbox, stream it out, apply
/// requests from the socket, and tear the subscriber down on disconnect.
async fn handle_connection(stream: TcpStream, broker: Arc<Broker>) -> Result<(), GatewayError> {
    let peer = stream.peer_addr().map_err(|_| GatewayError::MissingAddress)?;
    let ws_stream = accept_async(stream).await?;
    let (mut sink, mut requests) = ws_stream.split();

    let (id, mut mailbox) = broker.register_subscriber();
    info!(%peer, id, "subscriber connected");

    // All outbound frames funnel through one channel so the writer task
    // owns the sink.
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<WsMessage>();

    tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if sink.send(frame).await.is_err() {
                break;
            }
        }
    });

    // Forward the mailbox until the broker deletes it (sender dropped).
    let forward_tx = out_tx.clone();
    tokio::spawn(async move {
        while let Some(response) = mailbox.recv().await {
            match serde_json::to_string(&response) {
                Ok(json) => {
                    if forward_tx.send(WsMessage::text(json)).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("failed to serialize response: {e}"),
            }
        }
    });

    while let Some(Ok(frame)) = requests.next().await {
        if !frame.is_text() {
            continue;
        }
        let text = match frame.to_text() {
            Ok(text) => text,
            Err(_) => {
                let _ = unreachable_code("text frame without utf-8 content");
                continue;
            }
        };
        handle_request(&broker, id, text, &out_tx);
    }

    broker.remove_subscriber(id)?;
    info!(%peer, id, "subscriber disconnected");
    Ok(())
}

/// Applies one parsed request against the broker.
pub(crate) fn handle_request(
    broker: &Broker,
    id: SubscriberId,
    text: &str,
    out: &UnboundedSender<WsMessage>,
) {
    match serde_json::from_str::<SubscriptionRequest>(text) {
        Ok(SubscriptionRequest::Add { paths }) => {
            let paths = filter_paths(paths);
            broker.add_subscriber_to(&paths, id);
            debug!(id, "added {} subscription(s)", paths.len());
        }
        Ok(SubscriptionRequest::Remove { paths }) => {
            broker.remove_subscriptions(&filter_paths(paths), id);
        }
        Ok(SubscriptionRequest::Topics) => {
            let list = TopicList {
                topics: broker.get_topics(),
            };
            match serde_json::to_string(&list) {
                Ok(json) => {
                    let _ = out.send(WsMessage::text(json));
                }
                Err(e) => warn!("failed to serialize topic list: {e}"),
            }
        }
        Err(e) => {
            warn!(id, "invalid subscription request: {e} | {text}");
        }
    }
}
