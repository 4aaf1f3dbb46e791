//! Message body value types: token, payload, media type, and the
//! assembled [`CoapMessage`].

use std::collections::HashMap;

use crate::bytes;
use crate::codec::error::ParseErrorKind;
use crate::codec::header::{Code, CoapHeader, MessageId, MessageType, TokenLength, Version};
use crate::codec::option::{CoapOption, OptionNumber};

/// Message token, 1..=8 opaque bytes. An absent token is modeled as
/// `Option<CoapToken>` on the body rather than an empty token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoapToken(Vec<u8>);

impl CoapToken {
    pub fn new(value: Vec<u8>) -> Result<Self, ParseErrorKind> {
        match value.len() {
            1..=8 => Ok(Self(value)),
            n => Err(ParseErrorKind::InvalidTokenLength(n as u8)),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl From<&CoapToken> for TokenLength {
    fn from(token: &CoapToken) -> Self {
        // CoapToken guarantees 1..=8 bytes, inside the refinement range
        TokenLength::new(token.len() as u8).unwrap_or(TokenLength::ZERO)
    }
}

/// Payload media type, selected by the Content-Format option (number 12).
///
/// Values outside the RFC 7252 registry, values that are not an integer,
/// and absent Content-Format all fall back to [`MediaType::Sniff`], which
/// the gateway currently treats as plain text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    TextPlain,
    LinkFormat,
    Xml,
    OctetStream,
    Exi,
    Json,
    Sniff,
}

impl MediaType {
    pub fn from_content_format(raw: u16) -> Self {
        match raw {
            0 => Self::TextPlain,
            40 => Self::LinkFormat,
            41 => Self::Xml,
            42 => Self::OctetStream,
            47 => Self::Exi,
            50 => Self::Json,
            _ => Self::Sniff,
        }
    }

    /// The registry value, if this media type has one.
    pub fn content_format(self) -> Option<u16> {
        match self {
            Self::TextPlain => Some(0),
            Self::LinkFormat => Some(40),
            Self::Xml => Some(41),
            Self::OctetStream => Some(42),
            Self::Exi => Some(47),
            Self::Json => Some(50),
            Self::Sniff => None,
        }
    }

    /// Builds the Content-Format option announcing this media type, with
    /// the integer value in its minimal big-endian form.
    pub fn to_option(self) -> Option<CoapOption> {
        self.content_format().map(|raw| {
            CoapOption::new(
                OptionNumber::CONTENT_FORMAT,
                bytes::strip_leading_zeros(&raw.to_be_bytes()).to_vec(),
            )
        })
    }
}

/// Payload bytes and the media type that governs their interpretation.
/// The content is never empty: a payload marker with nothing after it is
/// a parse error, and an absent payload is `None` on the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoapPayload {
    pub media_type: MediaType,
    pub content: Vec<u8>,
}

/// Everything after the fixed header. Empty collections are normalized
/// to `None` so that an absent part has exactly one representation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoapBody {
    pub token: Option<CoapToken>,
    pub options: Option<Vec<CoapOption>>,
    pub payload: Option<CoapPayload>,
}

impl CoapBody {
    pub fn new(
        token: Option<CoapToken>,
        options: Vec<CoapOption>,
        payload: Option<CoapPayload>,
    ) -> Self {
        Self {
            token,
            options: if options.is_empty() {
                None
            } else {
                Some(options)
            },
            payload,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// A complete CoAP message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoapMessage {
    pub header: CoapHeader,
    pub body: CoapBody,
}

impl CoapMessage {
    /// Assembles a message, deriving the header's token length from the
    /// body so the two cannot disagree.
    pub fn new(mtype: MessageType, code: Code, id: MessageId, body: CoapBody) -> Self {
        let token_length = body
            .token
            .as_ref()
            .map(TokenLength::from)
            .unwrap_or(TokenLength::ZERO);
        Self {
            header: CoapHeader::new(Version::default(), mtype, token_length, code, id),
            body,
        }
    }

    pub fn message_id(&self) -> MessageId {
        self.header.message_id
    }

    pub fn mtype(&self) -> MessageType {
        self.header.mtype
    }

    /// Uri-Path option values in option order, one segment each.
    pub fn uri_path_segments(&self) -> Vec<String> {
        self.body
            .options
            .iter()
            .flatten()
            .filter(|opt| opt.number() == OptionNumber::URI_PATH)
            .map(|opt| String::from_utf8_lossy(opt.value()).into_owned())
            .collect()
    }

    /// Payload content as text. Sniffed content is treated as text for
    /// now, so this applies lossy UTF-8 decoding regardless of media type.
    pub fn payload_text(&self) -> String {
        self.body
            .payload
            .as_ref()
            .map(|p| String::from_utf8_lossy(&p.content).into_owned())
            .unwrap_or_default()
    }

    /// Collapses the option list into a map. Repeatable option numbers
    /// keep every occurrence in encounter order; for non-repeatable
    /// numbers only the first occurrence is retained.
    pub fn options_map(&self) -> HashMap<OptionNumber, Vec<Vec<u8>>> {
        let mut map: HashMap<OptionNumber, Vec<Vec<u8>>> = HashMap::new();
        for opt in self.body.options.iter().flatten() {
            let values = map.entry(opt.number()).or_default();
            if values.is_empty() || opt.number().is_repeatable() {
                values.push(opt.value().to_vec());
            }
        }
        map
    }
}

/// Selects the media type announced by a Content-Format option, if any.
///
/// A Content-Format value wider than two bytes is not a registry integer,
/// so it falls back to sniffing like an absent option does.
pub(crate) fn media_type_of(options: &[CoapOption]) -> MediaType {
    options
        .iter()
        .find(|opt| opt.number() == OptionNumber::CONTENT_FORMAT)
        .and_then(|opt| {
            if opt.value().len() > 2 {
                return None;
            }
            bytes::be_u16(&bytes::left_pad_to(opt.value(), 2, 0))
                .ok()
                .map(MediaType::from_content_format)
        })
        .unwrap_or(MediaType::Sniff)
}
