//! Datagram deserializer.
//!
//! Parsing is short-circuiting: the first failure terminates the walk.
//! Before anything is validated the decoder looks at bytes 2..4 of the
//! raw input; whenever those bytes exist, every error produced anywhere
//! in the parse carries the message id they spell, so the responder can
//! still address a reset to the sender.

use crate::bytes;
use crate::codec::error::{ParseError, ParseErrorKind};
use crate::codec::header::{CoapHeader, MessageId};
use crate::codec::message::{media_type_of, CoapBody, CoapMessage, CoapPayload, CoapToken};
use crate::codec::option::{decode_extended, CoapOption, OptionNumber};

/// The byte separating the option list from the payload.
pub const PAYLOAD_MARKER: u8 = 0xFF;

/// Parses one datagram into a message.
pub fn decode(input: &[u8]) -> Result<CoapMessage, ParseError> {
    // Recover the id up front so later failures can report it.
    let recovered_id = input
        .get(2..4)
        .map(|raw| MessageId::from_be_bytes([raw[0], raw[1]]));

    decode_inner(input).map_err(|kind| ParseError {
        kind,
        id: recovered_id,
    })
}

fn decode_inner(input: &[u8]) -> Result<CoapMessage, ParseErrorKind> {
    let raw_header = bytes::take_exact(input, 4)?;
    let header = CoapHeader::from_bytes([raw_header[0], raw_header[1], raw_header[2], raw_header[3]])?;
    let rest = bytes::drop_exact(input, 4)?;

    let tkl = usize::from(header.token_length.value());
    let (token, rest) = if tkl == 0 {
        (None, rest)
    } else {
        let raw = bytes::take_non_empty(rest, tkl)?;
        (
            Some(CoapToken::new(raw.to_vec())?),
            bytes::drop_exact(rest, tkl)?,
        )
    };

    let (options, rest) = decode_options(rest)?;
    let payload = decode_payload(rest, &options)?;

    Ok(CoapMessage {
        header,
        body: CoapBody::new(token, options, payload),
    })
}

/// Parses options until the buffer ends or a payload marker is reached.
/// Returns the options together with the unconsumed input.
fn decode_options(mut input: &[u8]) -> Result<(Vec<CoapOption>, &[u8]), ParseErrorKind> {
    let mut options = Vec::new();
    let mut number = 0u32;

    while let Some(&first) = input.first() {
        if first == PAYLOAD_MARKER {
            break;
        }

        let rest = bytes::drop_exact(input, 1)?;
        let (delta, rest) =
            decode_extended(first >> 4, rest, ParseErrorKind::InvalidOptionDelta)?;
        let (length, rest) =
            decode_extended(first & 0x0F, rest, ParseErrorKind::InvalidOptionLength)?;

        let value = bytes::take_exact(rest, length as usize)?;
        number += delta;
        options.push(CoapOption::new(OptionNumber::new(number)?, value.to_vec()));
        input = bytes::drop_exact(rest, length as usize)?;
    }

    Ok((options, input))
}

/// Interprets whatever follows the option list. An exhausted buffer means
/// no payload; a payload marker must be followed by at least one byte.
fn decode_payload(
    input: &[u8],
    options: &[CoapOption],
) -> Result<Option<CoapPayload>, ParseErrorKind> {
    match input.first() {
        None => Ok(None),
        Some(&PAYLOAD_MARKER) => {
            let content = bytes::drop_exact(input, 1)?;
            if content.is_empty() {
                return Err(ParseErrorKind::InvalidPayloadMarker);
            }
            Ok(Some(CoapPayload {
                media_type: media_type_of(options),
                content: content.to_vec(),
            }))
        }
        // decode_options only stops at a marker or the end of input
        Some(_) => Ok(None),
    }
}
