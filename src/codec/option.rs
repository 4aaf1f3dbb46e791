//! CoAP options: absolute option numbers and the nibble-with-extensions
//! wire scheme shared by option deltas and lengths.
//!
//! On the wire each option starts with one header byte whose high nibble
//! is the delta from the previous option's number and whose low nibble is
//! the value length. Nibble values 13 and 14 pull one or two extension
//! bytes; 15 is reserved and always an error.

use crate::bytes;
use crate::codec::error::ParseErrorKind;

/// Nibble value introducing a one-byte extension (+13).
pub(crate) const EXT_ONE_BYTE: u8 = 13;
/// Nibble value introducing a two-byte big-endian extension (+269).
pub(crate) const EXT_TWO_BYTES: u8 = 14;

pub(crate) const EXT_ONE_BYTE_BASE: u32 = 13;
pub(crate) const EXT_TWO_BYTES_BASE: u32 = 269;

/// Absolute option number, the running sum of deltas.
///
/// The IANA registry is 16 bits wide, so anything above 65535 is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionNumber(u32);

impl OptionNumber {
    /// Uri-Path, one option per path segment.
    pub const URI_PATH: Self = Self(11);
    /// Content-Format, an unsigned integer from the media-type registry.
    pub const CONTENT_FORMAT: Self = Self(12);

    pub fn new(raw: u32) -> Result<Self, ParseErrorKind> {
        if raw <= u32::from(u16::MAX) {
            Ok(Self(raw))
        } else {
            Err(ParseErrorKind::InvalidOptionNumber(raw))
        }
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Whether RFC 7252 defines this option as repeatable. Repeats of a
    /// non-repeatable option must be treated as unrecognized (§5.4.5).
    pub fn is_repeatable(self) -> bool {
        // If-Match, ETag, Location-Path, Uri-Path, Uri-Query, Location-Query
        matches!(self.0, 1 | 4 | 8 | 11 | 15 | 20)
    }
}

/// A decoded option: its absolute number and opaque value bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoapOption {
    number: OptionNumber,
    value: Vec<u8>,
}

impl CoapOption {
    pub fn new(number: OptionNumber, value: Vec<u8>) -> Self {
        Self { number, value }
    }

    pub fn number(&self) -> OptionNumber {
        self.number
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

/// Resolves a delta or length nibble against the bytes that follow it,
/// returning the effective value and the input remaining after any
/// extension bytes. `reserved` is the error for nibble 15, which differs
/// between the delta and length positions.
pub(crate) fn decode_extended(
    nibble: u8,
    input: &[u8],
    reserved: ParseErrorKind,
) -> Result<(u32, &[u8]), ParseErrorKind> {
    match nibble {
        0..=12 => Ok((u32::from(nibble), input)),
        EXT_ONE_BYTE => {
            let ext = bytes::be_u8(input)?;
            Ok((u32::from(ext) + EXT_ONE_BYTE_BASE, bytes::drop_exact(input, 1)?))
        }
        EXT_TWO_BYTES => {
            let ext = bytes::be_u16(input)?;
            Ok((u32::from(ext) + EXT_TWO_BYTES_BASE, bytes::drop_exact(input, 2)?))
        }
        // 15, the reserved nibble
        _ => Err(reserved),
    }
}

/// Splits a delta or length into its nibble and extension bytes, using
/// the extended forms only when the value does not fit in a nibble.
pub(crate) fn encode_extended(value: u32) -> (u8, Vec<u8>) {
    if value < EXT_ONE_BYTE_BASE {
        (value as u8, Vec::new())
    } else if value < EXT_TWO_BYTES_BASE {
        (EXT_ONE_BYTE, vec![(value - EXT_ONE_BYTE_BASE) as u8])
    } else {
        let ext = (value - EXT_TWO_BYTES_BASE) as u16;
        (EXT_TWO_BYTES, ext.to_be_bytes().to_vec())
    }
}
