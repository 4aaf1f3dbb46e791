//! Datagram serializer, the reciprocal of [`decode`](super::decode).

use crate::codec::decode::PAYLOAD_MARKER;
use crate::codec::header::{Code, MessageId, MessageType};
use crate::codec::message::{CoapBody, CoapMessage};
use crate::codec::option::{encode_extended, CoapOption};

/// Serializes a message into its wire bytes.
///
/// Options are emitted in ascending number order with minimal delta and
/// length encodings, so `decode(encode(m)) == Ok(m)` for any decoded `m`.
pub fn encode(message: &CoapMessage) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + encoded_body_hint(&message.body));
    out.extend_from_slice(&message.header.to_bytes());

    if let Some(token) = &message.body.token {
        out.extend_from_slice(token.as_bytes());
    }

    if let Some(options) = &message.body.options {
        let mut ordered: Vec<&CoapOption> = options.iter().collect();
        ordered.sort_by_key(|opt| opt.number());

        let mut previous = 0u32;
        for opt in ordered {
            let (delta_nibble, delta_ext) = encode_extended(opt.number().value() - previous);
            let (length_nibble, length_ext) = encode_extended(opt.value().len() as u32);
            out.push((delta_nibble << 4) | length_nibble);
            out.extend_from_slice(&delta_ext);
            out.extend_from_slice(&length_ext);
            out.extend_from_slice(opt.value());
            previous = opt.number().value();
        }
    }

    if let Some(payload) = &message.body.payload {
        out.push(PAYLOAD_MARKER);
        out.extend_from_slice(&payload.content);
    }

    out
}

fn encoded_body_hint(body: &CoapBody) -> usize {
    let token = body.token.as_ref().map(|t| t.len()).unwrap_or(0);
    let options: usize = body
        .options
        .iter()
        .flatten()
        .map(|opt| 5 + opt.value().len())
        .sum();
    let payload = body
        .payload
        .as_ref()
        .map(|p| 1 + p.content.len())
        .unwrap_or(0);
    token + options + payload
}

/// The empty acknowledgement for a confirmable message with id `id`.
pub fn ack(id: MessageId) -> CoapMessage {
    CoapMessage::new(
        MessageType::Acknowledgement,
        Code::EMPTY,
        id,
        CoapBody::empty(),
    )
}

/// The reset for a malformed but identifiable message with id `id`.
pub fn reset(id: MessageId) -> CoapMessage {
    CoapMessage::new(MessageType::Reset, Code::EMPTY, id, CoapBody::empty())
}
