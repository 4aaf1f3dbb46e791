use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::broker::Broker;
use crate::dedup::DuplicateTracker;
use crate::transport::pipeline::{ExchangeKey, Pipeline};

/// Default CoAP message size (RFC 7252 §4.6); larger datagrams are
/// truncated by the kernel and will fail to parse.
const MAX_DATAGRAM_SIZE: usize = 1152;

/// Binds the gateway socket and serves it until a socket error occurs.
///
/// Receive errors are fatal: the loop returns and the process exits for a
/// supervisor to restart. Send errors on the egress side only cost the
/// one reply.
pub async fn start_udp_server(
    addr: &str,
    broker: Arc<Broker>,
    tracker: DuplicateTracker<ExchangeKey>,
    dedup_window: Duration,
) -> std::io::Result<()> {
    let socket = Arc::new(UdpSocket::bind(addr).await?);
    info!("CoAP gateway listening on udp://{addr}");

    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<(SocketAddr, Vec<u8>)>();

    let egress = Arc::clone(&socket);
    tokio::spawn(async move {
        while let Some((peer, datagram)) = reply_rx.recv().await {
            if let Err(e) = egress.send_to(&datagram, peer).await {
                warn!(%peer, "failed to send reply: {e}");
            }
        }
    });

    let pipeline = Pipeline::new(broker, tracker, reply_tx, dedup_window);
    let mut buf = [0u8; MAX_DATAGRAM_SIZE];
    loop {
        let (len, peer) = socket.recv_from(&mut buf).await?;
        pipeline.handle_datagram(peer, &buf[..len]);
    }
}
