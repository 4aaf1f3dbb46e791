//! The per-datagram reply decision.
//!
//! Stateless: retransmission handling belongs to the duplicate tracker,
//! and delivery belongs to the broker. This function only knows which
//! protocol reply, if any, a single decode result is owed.

use std::net::SocketAddr;

use thiserror::Error;

use crate::codec::encode::{ack, encode, reset};
use crate::codec::error::ParseError;
use crate::codec::header::MessageType;
use crate::codec::message::CoapMessage;

/// Why no reply is owed for a datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RespondError {
    /// The datagram failed to parse before its message id could be
    /// recovered; it is silently dropped.
    #[error("datagram unparseable and no message id recovered")]
    MissingCoapId,

    /// The message parsed but is not confirmable, so nothing is sent.
    #[error("no response owed for this message")]
    NoResponseAvailable,
}

/// An outbound datagram addressed to the peer that triggered it.
pub type Reply = (SocketAddr, Vec<u8>);

/// Decides the reply for one decoded datagram:
///
/// - a parse error with a recovered id earns a reset
/// - a well-formed confirmable message earns an acknowledgement
/// - everything else earns nothing
pub fn respond(
    peer: SocketAddr,
    decoded: &Result<CoapMessage, ParseError>,
) -> Result<Reply, RespondError> {
    match decoded {
        Err(ParseError { id: Some(id), .. }) => Ok((peer, encode(&reset(*id)))),
        Err(ParseError { id: None, .. }) => Err(RespondError::MissingCoapId),
        Ok(message) if message.mtype() == MessageType::Confirmable => {
            Ok((peer, encode(&ack(message.message_id()))))
        }
        Ok(_) => Err(RespondError::NoResponseAvailable),
    }
}
