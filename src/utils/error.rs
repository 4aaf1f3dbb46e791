//! Gateway-level errors.
//!
//! Codec errors never appear here: they stay local to a single datagram
//! and resolve to a reset or a silent drop inside the pipeline. What
//! remains are the failures that cross component boundaries.

use thiserror::Error;
use tracing::error;

use crate::broker::BrokerError;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The peer address of a connection could not be determined. Fatal
    /// to that connection, not to the process.
    #[error("peer address could not be determined")]
    MissingAddress,

    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error("websocket transport error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("entered unreachable code: {0}")]
    UnreachableCode(&'static str),
}

/// Records entry into a branch the invariants rule out. Fatal in debug
/// builds; in release builds it logs and the caller carries on.
pub fn unreachable_code(context: &'static str) -> GatewayError {
    debug_assert!(false, "entered unreachable code: {context}");
    error!("entered unreachable code: {context}");
    GatewayError::UnreachableCode(context)
}
