use thiserror::Error;

use crate::bytes::InvalidChunkSize;
use crate::codec::header::MessageId;

/// The reason a datagram failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error(transparent)]
    InvalidChunkSize(#[from] InvalidChunkSize),

    #[error("version must be 1, got {0}")]
    InvalidVersion(u8),

    #[error("message type out of range: {0}")]
    InvalidType(u8),

    #[error("token length must be 0..=8, got {0}")]
    InvalidTokenLength(u8),

    #[error("code class must be 0..=7, got {0}")]
    InvalidCodeClass(u8),

    #[error("code detail must be 0..=31, got {0}")]
    InvalidCodeDetail(u8),

    /// Delta nibble 15 is reserved by RFC 7252 §3.1.
    #[error("option delta nibble 15 is reserved")]
    InvalidOptionDelta,

    /// Length nibble 15 is reserved by RFC 7252 §3.1.
    #[error("option length nibble 15 is reserved")]
    InvalidOptionLength,

    #[error("option number out of range: {0}")]
    InvalidOptionNumber(u32),

    /// A payload marker (0xFF) must be followed by at least one byte.
    #[error("payload marker with no payload bytes")]
    InvalidPayloadMarker,
}

/// A parse failure, tagged with the message id recovered from bytes 2..4
/// of the datagram when those bytes were present.
///
/// The id is what lets the responder send a reset for a malformed but
/// identifiable datagram; without it the datagram is silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub id: Option<MessageId>,
}
