//! The fixed 4-byte CoAP message header and its field refinements.
//!
//! ```text
//! byte 0           byte 1        bytes 2..4
//! vv tt llll       ccc ddddd     iiiiiiii iiiiiiii
//! |  |  |          |   |         |
//! |  |  |          |   |         message id (big-endian)
//! |  |  |          |   code detail (0..=31)
//! |  |  |          code class (0..=7)
//! |  |  token length (0..=8)
//! |  message type (CON/NON/ACK/RST)
//! version (always 1)
//! ```
//!
//! Every field type rejects out-of-range values at construction, so a
//! [`CoapHeader`] that exists is valid by definition.

use crate::codec::error::ParseErrorKind;

/// CoAP protocol version. RFC 7252 defines exactly one: 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version(u8);

impl Version {
    pub fn new(raw: u8) -> Result<Self, ParseErrorKind> {
        if raw == 1 {
            Ok(Self(raw))
        } else {
            Err(ParseErrorKind::InvalidVersion(raw))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Version {
    fn default() -> Self {
        Self(1)
    }
}

/// The four CoAP message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Confirmable = 0,
    NonConfirmable = 1,
    Acknowledgement = 2,
    Reset = 3,
}

impl TryFrom<u8> for MessageType {
    type Error = ParseErrorKind;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Confirmable),
            1 => Ok(Self::NonConfirmable),
            2 => Ok(Self::Acknowledgement),
            3 => Ok(Self::Reset),
            other => Err(ParseErrorKind::InvalidType(other)),
        }
    }
}

/// Number of token bytes that follow the header, 0..=8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLength(u8);

impl TokenLength {
    pub const ZERO: Self = Self(0);

    pub fn new(raw: u8) -> Result<Self, ParseErrorKind> {
        if raw <= 8 {
            Ok(Self(raw))
        } else {
            Err(ParseErrorKind::InvalidTokenLength(raw))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// Message code, written `c.dd` (e.g. 0.01 for GET, 2.05 for Content).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Code {
    class: u8,
    detail: u8,
}

impl Code {
    /// 0.00, the empty code carried by ACK and RST messages.
    pub const EMPTY: Self = Self {
        class: 0,
        detail: 0,
    };

    pub fn new(class: u8, detail: u8) -> Result<Self, ParseErrorKind> {
        if class > 0b111 {
            return Err(ParseErrorKind::InvalidCodeClass(class));
        }
        if detail > 0b1_1111 {
            return Err(ParseErrorKind::InvalidCodeDetail(detail));
        }
        Ok(Self { class, detail })
    }

    pub fn class(self) -> u8 {
        self.class
    }

    pub fn detail(self) -> u8 {
        self.detail
    }
}

/// 16-bit message id used to pair acknowledgements with confirmable
/// messages and to detect retransmissions.
///
/// The id occupies exactly two wire bytes, so a `u16` makes out-of-range
/// values unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(u16);

impl MessageId {
    pub fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub fn from_be_bytes(raw: [u8; 2]) -> Self {
        Self(u16::from_be_bytes(raw))
    }

    pub fn to_be_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

/// The parsed 4-byte header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoapHeader {
    pub version: Version,
    pub mtype: MessageType,
    pub token_length: TokenLength,
    pub code: Code,
    pub message_id: MessageId,
}

impl CoapHeader {
    pub fn new(
        version: Version,
        mtype: MessageType,
        token_length: TokenLength,
        code: Code,
        message_id: MessageId,
    ) -> Self {
        Self {
            version,
            mtype,
            token_length,
            code,
            message_id,
        }
    }

    /// Decodes the four header bytes, validating each field through its
    /// refinement constructor.
    pub fn from_bytes(raw: [u8; 4]) -> Result<Self, ParseErrorKind> {
        let version = Version::new(raw[0] >> 6)?;
        let mtype = MessageType::try_from((raw[0] >> 4) & 0b11)?;
        let token_length = TokenLength::new(raw[0] & 0b1111)?;
        let code = Code::new(raw[1] >> 5, raw[1] & 0b1_1111)?;
        let message_id = MessageId::from_be_bytes([raw[2], raw[3]]);
        Ok(Self {
            version,
            mtype,
            token_length,
            code,
            message_id,
        })
    }

    /// Packs the header back into its four wire bytes.
    pub fn to_bytes(self) -> [u8; 4] {
        let b0 = (self.version.value() << 6) | ((self.mtype as u8) << 4) | self.token_length.value();
        let b1 = (self.code.class() << 5) | self.code.detail();
        let [b2, b3] = self.message_id.to_be_bytes();
        [b0, b1, b2, b3]
    }
}
