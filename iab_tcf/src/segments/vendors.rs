//! Vendor lists and their two bit encodings.
//!
//! A vendor list is prefixed by the highest vendor ID it covers and a single bit
//! telling whether it is encoded as a bit field (one bit per vendor) or as a list of
//! ranges. Both encodings answer the same membership question through [`VendorSet`].
//!
use crate::core::Bits;
use crate::segments::{BitCursor, IdSet, TcfDecodeError};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::iter::repeat_with;

/// A decoded list of vendors.
///
/// Queries for IDs outside `1..=max_vendor_id()` always return `false`.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VendorSet {
    BitField(BitField),
    RangeSection(RangeSection),
}

impl VendorSet {
    /// Returns `true` if the vendor is part of the list.
    pub fn contains(&self, vendor_id: u16) -> bool {
        if vendor_id < 1 || vendor_id > self.max_vendor_id() {
            return false;
        }

        match self {
            VendorSet::BitField(f) => f.vendor_ids.contains(&vendor_id),
            VendorSet::RangeSection(s) => s.ranges.iter().any(|r| r.contains(vendor_id)),
        }
    }

    /// The highest vendor ID covered by this list, as declared in the string.
    pub fn max_vendor_id(&self) -> u16 {
        match self {
            VendorSet::BitField(f) => f.max_vendor_id,
            VendorSet::RangeSection(s) => s.max_vendor_id,
        }
    }

    pub fn is_range_encoded(&self) -> bool {
        matches!(self, VendorSet::RangeSection(_))
    }

    /// All vendor IDs for which [`contains`](VendorSet::contains) returns `true`, in
    /// ascending order.
    pub fn vendor_ids(&self) -> IdSet {
        match self {
            VendorSet::BitField(f) => f.vendor_ids.clone(),
            VendorSet::RangeSection(s) => s
                .ranges
                .iter()
                .flat_map(|r| r.start.max(1)..=r.end.min(s.max_vendor_id))
                .collect(),
        }
    }
}

/// One bit per vendor, vendor 1 first.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BitField {
    max_vendor_id: u16,
    vendor_ids: IdSet,
}

/// A list of inclusive vendor ID ranges.
///
/// Ranges are kept as found in the string: they may be unsorted, overlap, or exceed
/// the declared maximum vendor ID.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RangeSection {
    max_vendor_id: u16,
    ranges: Vec<VendorRange>,
}

impl RangeSection {
    pub fn ranges(&self) -> &[VendorRange] {
        &self.ranges
    }
}

/// An inclusive range of vendor IDs. A single ID is a range where `start == end`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VendorRange {
    pub start: u16,
    pub end: u16,
}

impl VendorRange {
    pub fn contains(&self, vendor_id: u16) -> bool {
        self.start <= vendor_id && vendor_id <= self.end
    }
}

/// Decodes a vendor list body starting at `start`, using the encoding selected by the
/// flag read just before it.
///
/// Returns the list and the offset of the first bit following it.
pub(crate) fn decode_vendor_set(
    bits: Bits,
    max_vendor_id: u16,
    is_range_encoded: bool,
    start: usize,
) -> Result<(VendorSet, usize), TcfDecodeError> {
    if is_range_encoded {
        decode_range_section(bits, max_vendor_id, start)
    } else {
        decode_bit_field(bits, max_vendor_id, start)
    }
}

pub(crate) fn decode_bit_field(
    bits: Bits,
    max_vendor_id: u16,
    start: usize,
) -> Result<(VendorSet, usize), TcfDecodeError> {
    let mut c = BitCursor::new(bits, start);
    let vendor_ids = c.read_fixed_bitfield(max_vendor_id, "vendor bit field")?;

    Ok((
        VendorSet::BitField(BitField {
            max_vendor_id,
            vendor_ids,
        }),
        c.position(),
    ))
}

pub(crate) fn decode_range_section(
    bits: Bits,
    max_vendor_id: u16,
    start: usize,
) -> Result<(VendorSet, usize), TcfDecodeError> {
    let mut c = BitCursor::new(bits, start);
    let ranges = read_range_entries(&mut c)?;

    Ok((
        VendorSet::RangeSection(RangeSection {
            max_vendor_id,
            ranges,
        }),
        c.position(),
    ))
}

/// Reads a 12-bit entry count followed by that many single IDs or ID ranges.
pub(crate) fn read_range_entries(c: &mut BitCursor) -> Result<Vec<VendorRange>, TcfDecodeError> {
    let n = c.read_unsigned::<u16>(12, "number of ranges")?;

    repeat_with(|| {
        let is_range = c.read_bool("range entry type")?;
        if is_range {
            let start = c.read_unsigned(16, "range start vendor id")?;
            let end = c.read_unsigned(16, "range end vendor id")?;
            Ok(VendorRange { start, end })
        } else {
            let id = c.read_unsigned(16, "range vendor id")?;
            Ok(VendorRange { start: id, end: id })
        }
    })
    .take(usize::from(n))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tests::b;
    use test_case::test_case;

    fn bit_field(s: &str, max_vendor_id: u16) -> (VendorSet, usize) {
        decode_bit_field(Bits::new(&b(s)), max_vendor_id, 0).unwrap()
    }

    fn range_section(s: &str, max_vendor_id: u16) -> (VendorSet, usize) {
        decode_range_section(Bits::new(&b(s)), max_vendor_id, 0).unwrap()
    }

    #[test]
    fn decode_bit_field_at_offset() {
        let buf = b("111 1010100000 1");
        let (set, end) = decode_bit_field(Bits::new(&buf), 10, 3).unwrap();

        assert_eq!(end, 13);
        assert!(!set.is_range_encoded());
        assert_eq!(set.max_vendor_id(), 10);
        assert_eq!(set.vendor_ids(), IdSet::from([1, 3, 5]));
    }

    #[test]
    fn decode_empty_bit_field() {
        let (set, end) = bit_field("", 0);

        assert_eq!(end, 0);
        assert_eq!(set.max_vendor_id(), 0);
        assert!(set.vendor_ids().is_empty());
    }

    #[test_case("000000000010 0 0000000000000011 1 0000000000000101 0000000000001000" => (vec![VendorRange { start: 3, end: 3 }, VendorRange { start: 5, end: 8 }], 62) ; "single and range")]
    #[test_case("000000000000" => (vec![], 12) ; "empty")]
    #[test_case("000000000010 1 0000000000001000 0000000000000101 0 0000000000000110" => (vec![VendorRange { start: 8, end: 5 }, VendorRange { start: 6, end: 6 }], 62) ; "unsorted")]
    fn decode_ranges(s: &str) -> (Vec<VendorRange>, usize) {
        match range_section(s, 10) {
            (VendorSet::RangeSection(r), end) => (r.ranges().to_vec(), end),
            (s, _) => panic!("unexpected vendor set {s:?}"),
        }
    }

    #[test_case("1010100000", 10 ; "bit field")]
    #[test_case("000000000011 0 0000000000000001 0 0000000000000011 0 0000000000000101", 10 ; "single ids")]
    #[test_case("000000000011 0 0000000000000101 0 0000000000000001 0 0000000000000011", 10 ; "single ids unsorted")]
    #[test_case("000000000100 0 0000000000000001 0 0000000000000011 0 0000000000000101 0 0000000000000101", 10 ; "duplicates")]
    fn equivalent_encodings(s: &str, max_vendor_id: u16) {
        let expected = bit_field("1010100000", 10).0;
        let actual = if s.len() == 10 {
            bit_field(s, max_vendor_id).0
        } else {
            range_section(s, max_vendor_id).0
        };

        for id in 0..=max_vendor_id + 5 {
            assert_eq!(actual.contains(id), expected.contains(id), "vendor {id}");
        }
    }

    #[test]
    fn range_and_bit_field_agree_on_runs() {
        let field = bit_field("0111110001", 10).0;
        let ranges = range_section(
            "000000000010 1 0000000000000010 0000000000000110 0 0000000000001010",
            10,
        )
        .0;

        for id in 0..=15 {
            assert_eq!(field.contains(id), ranges.contains(id), "vendor {id}");
        }
        assert_eq!(field.vendor_ids(), ranges.vendor_ids());
    }

    #[test_case(0 => false ; "zero")]
    #[test_case(1 => false ; "below range")]
    #[test_case(5 => true ; "in range")]
    #[test_case(10 => true ; "max vendor id")]
    #[test_case(11 => false ; "above max vendor id")]
    #[test_case(900 => false ; "listed but above max vendor id")]
    #[test_case(u16::MAX => false ; "largest id")]
    fn range_contains(id: u16) -> bool {
        // ranges 5-20 and 900, declared max vendor id 10
        range_section(
            "000000000010 1 0000000000000101 0000000000010100 0 0000001110000100",
            10,
        )
        .0
        .contains(id)
    }

    #[test]
    fn range_vendor_ids_are_clipped() {
        let (set, _) = range_section(
            "000000000010 1 0000000000000000 0000000000000010 1 0000000000001001 0000000000001111",
            10,
        );

        assert_eq!(set.vendor_ids(), IdSet::from([1, 2, 9, 10]));
    }

    #[test_case(0 => false ; "zero")]
    #[test_case(1 => true ; "first")]
    #[test_case(2 => false ; "unset")]
    #[test_case(10 => true ; "last")]
    #[test_case(11 => false ; "above max vendor id")]
    fn bit_field_contains(id: u16) -> bool {
        bit_field("1000000001", 10).0.contains(id)
    }

    #[test]
    fn bit_field_truncated() {
        let buf = b("10101010");
        let e = decode_bit_field(Bits::new(&buf), 10, 0).unwrap_err();

        assert!(matches!(
            e,
            TcfDecodeError::Truncated {
                needed: 10,
                available: 8,
                ..
            }
        ));
    }

    #[test_case("0000000" ; "missing count")]
    #[test_case("000000000001" ; "missing entry")]
    #[test_case("000000000001 1 0000000000000101 00000000" ; "missing range end")]
    #[test_case("000000000011 0 0000000000000001" ; "missing entries")]
    fn range_section_truncated(s: &str) {
        let buf = b(s);
        let e = decode_range_section(Bits::new(&buf), 10, 0).unwrap_err();

        assert!(matches!(e, TcfDecodeError::Truncated { .. }), "got {e:?}");
    }

    #[test]
    fn dispatch_on_encoding_flag() {
        let buf = b("000000000001 0 0000000000000011");
        let bits = Bits::new(&buf);

        let (ranges, _) = decode_vendor_set(bits, 3, true, 0).unwrap();
        let (field, _) = decode_vendor_set(bits, 3, false, 0).unwrap();

        assert!(ranges.is_range_encoded());
        assert!(!field.is_range_encoded());
    }
}
