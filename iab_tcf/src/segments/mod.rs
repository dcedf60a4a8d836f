//! Decoders for the segments of a TCF v2 consent string.
//!
//! A TCF v2 string is made of a mandatory Core String segment, optionally followed by
//! other segments separated by `.` characters. Every segment is an independently
//! Base64-URL encoded bit stream.
//!
//! The Core String carries no type tag. Every other segment starts with a 3-bit
//! [`SegmentType`] which tells how the rest of the segment must be read.
//!
//! Vendor lists may be encoded either as a bit field or as a list of ranges, both
//! decoders live in the [`vendors`] module and produce a [`VendorSet`](vendors::VendorSet).
//!
use crate::core::base64::DecodeError;
use crate::core::{Bits, OutOfRange};
use bitstream_io::UnsignedInteger;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum_macros::Display;
use thiserror::Error;

pub mod core_string;
pub mod disclosed_vendors;
pub mod publisher_restrictions;
pub mod vendors;

pub type IdSet = BTreeSet<u16>;

/// The error type for TCF v2 consent string decoding operations.
///
/// Decoding is all-or-nothing: no partially decoded value is ever returned alongside
/// an error.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum TcfDecodeError {
    /// The consent string is empty.
    #[error("empty consent string")]
    EmptyInput,
    /// A segment contains characters outside of the Base64-URL alphabet.
    #[error("unable to decode segment: {0}")]
    Base64Decode(#[from] DecodeError),
    /// The data is structurally invalid: too short to hold its fixed fields, or carrying
    /// an unexpected type tag or version.
    #[error("malformed consent string: {0}")]
    Malformed(String),
    /// A variable length field claims more bits than the segment holds.
    #[error("truncated {field} ({needed} bits needed at offset {offset}, {available} available)")]
    Truncated {
        field: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },
}

impl From<OutOfRange> for TcfDecodeError {
    fn from(e: OutOfRange) -> Self {
        Self::Malformed(e.to_string())
    }
}

/// The 3-bit tag found at the start of every segment following the Core String.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SegmentType {
    Core,
    DisclosedVendors,
    AllowedVendors,
    PublisherTc,
    Reserved(u8),
}

impl From<u8> for SegmentType {
    fn from(tag: u8) -> Self {
        match tag {
            0 => Self::Core,
            1 => Self::DisclosedVendors,
            2 => Self::AllowedVendors,
            3 => Self::PublisherTc,
            n => Self::Reserved(n),
        }
    }
}

impl SegmentType {
    /// Reads the tag from the top 3 bits of a decoded segment.
    pub(crate) fn read(data: &[u8]) -> Result<Self, TcfDecodeError> {
        let first = data
            .first()
            .ok_or_else(|| TcfDecodeError::Malformed("segment too short".to_string()))?;

        Ok(Self::from(first >> 5))
    }
}

/// Sequential reader used once the fixed part of a segment has been read.
///
/// Running out of bits is reported as [`TcfDecodeError::Truncated`], naming the field
/// being read.
pub(crate) struct BitCursor<'a> {
    bits: Bits<'a>,
    pos: usize,
}

impl<'a> BitCursor<'a> {
    pub fn new(bits: Bits<'a>, pos: usize) -> Self {
        Self { bits, pos }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn read_unsigned<U: UnsignedInteger>(
        &mut self,
        width: u32,
        field: &'static str,
    ) -> Result<U, TcfDecodeError> {
        let value = self
            .bits
            .read_unsigned(self.pos, width)
            .map_err(|_| self.truncated(field, width as usize))?;
        self.pos += width as usize;

        Ok(value)
    }

    pub fn read_bool(&mut self, field: &'static str) -> Result<bool, TcfDecodeError> {
        let value = self
            .bits
            .read_bool(self.pos)
            .map_err(|_| self.truncated(field, 1))?;
        self.pos += 1;

        Ok(value)
    }

    pub fn read_string(
        &mut self,
        chars: usize,
        field: &'static str,
    ) -> Result<String, TcfDecodeError> {
        let value = self
            .bits
            .read_string(self.pos, chars)
            .map_err(|_| self.truncated(field, chars * 6))?;
        self.pos += chars * 6;

        Ok(value)
    }

    pub fn read_fixed_bitfield(
        &mut self,
        bits: u16,
        field: &'static str,
    ) -> Result<IdSet, TcfDecodeError> {
        let value = self
            .bits
            .read_fixed_bitfield(self.pos, bits)
            .map_err(|_| self.truncated(field, usize::from(bits)))?;
        self.pos += usize::from(bits);

        Ok(value)
    }

    fn truncated(&self, field: &'static str, needed: usize) -> TcfDecodeError {
        TcfDecodeError::Truncated {
            field,
            offset: self.pos,
            needed,
            available: self.bits.len().saturating_sub(self.pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tests::b;
    use test_case::test_case;

    #[test_case(&[0x00] => SegmentType::Core)]
    #[test_case(&[0x20, 0x01] => SegmentType::DisclosedVendors)]
    #[test_case(&[0x5f] => SegmentType::AllowedVendors)]
    #[test_case(&[0x64, 0x00] => SegmentType::PublisherTc)]
    #[test_case(&[0xe0] => SegmentType::Reserved(7))]
    fn segment_type(data: &[u8]) -> SegmentType {
        SegmentType::read(data).unwrap()
    }

    #[test]
    fn segment_type_empty() {
        assert!(matches!(
            SegmentType::read(&[]),
            Err(TcfDecodeError::Malformed(_))
        ));
    }

    #[test]
    fn cursor_advances() {
        let buf = b("101 0000000000001010 1 0110");
        let mut c = BitCursor::new(Bits::new(&buf), 3);

        assert_eq!(c.read_unsigned::<u16>(16, "max vendor id").unwrap(), 10);
        assert!(c.read_bool("encoding type").unwrap());
        assert_eq!(
            c.read_fixed_bitfield(4, "vendors").unwrap(),
            IdSet::from([2, 3])
        );
        assert_eq!(c.position(), 24);
    }

    #[test]
    fn cursor_truncated() {
        let buf = b("00000000 0000");
        let mut c = BitCursor::new(Bits::new(&buf), 4);

        let e = c.read_unsigned::<u16>(16, "max vendor id").unwrap_err();
        assert!(matches!(
            e,
            TcfDecodeError::Truncated {
                field: "max vendor id",
                offset: 4,
                needed: 16,
                available: 12,
            }
        ));
        assert_eq!(c.position(), 4);
    }
}
