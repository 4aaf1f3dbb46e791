//! The `codec` module implements the CoAP (RFC 7252) wire format.
//!
//! It contains the following main components:
//!
//! - value types for the fixed header, token, options, and body
//! - `decode`: bytes → [`CoapMessage`], with message-id recovery on failure
//! - `encode`: [`CoapMessage`] → bytes, plus the pure `ack`/`reset` builders
//! - `respond`: the per-datagram reply decision (reset / ack / nothing)
//!
//! The codec is pure; all I/O lives in the `transport` module.

pub mod decode;
pub mod encode;
pub mod error;
pub mod header;
pub mod message;
pub mod option;
pub mod respond;

pub use decode::decode;
pub use encode::{ack, encode, reset};
pub use error::{ParseError, ParseErrorKind};
pub use header::{Code, CoapHeader, MessageId, MessageType, TokenLength, Version};
pub use message::{CoapBody, CoapMessage, CoapPayload, CoapToken, MediaType};
pub use option::{CoapOption, OptionNumber};
pub use respond::{respond, RespondError};
