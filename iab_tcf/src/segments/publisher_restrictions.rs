use crate::segments::vendors::{VendorRange, read_range_entries};
use crate::segments::{BitCursor, TcfDecodeError};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::iter::repeat_with;

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PublisherRestriction {
    pub purpose_id: u8,
    pub restriction_type: RestrictionType,
    pub restricted_vendors: Vec<VendorRange>,
}

impl PublisherRestriction {
    /// Returns `true` if the restriction applies to the given vendor.
    pub fn applies_to(&self, vendor_id: u16) -> bool {
        self.restricted_vendors
            .iter()
            .any(|r| r.contains(vendor_id))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, FromPrimitive)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RestrictionType {
    NotAllowed = 0,
    RequireConsent = 1,
    RequireLegitimateInterest = 2,
    Undefined = 3,
}

/// Reads the publisher restrictions list found at the end of the Core String.
///
/// Vendor lists of restrictions are always range encoded, there is no encoding flag.
pub(crate) fn read_publisher_restrictions(
    c: &mut BitCursor,
) -> Result<Vec<PublisherRestriction>, TcfDecodeError> {
    let n = c.read_unsigned::<u16>(12, "number of publisher restrictions")?;

    repeat_with(|| {
        Ok(PublisherRestriction {
            purpose_id: c.read_unsigned(6, "restriction purpose id")?,
            restriction_type: RestrictionType::from_u8(c.read_unsigned(2, "restriction type")?)
                .unwrap_or(RestrictionType::Undefined),
            restricted_vendors: read_range_entries(c)?,
        })
    })
    .take(usize::from(n))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Bits;
    use crate::core::tests::b;
    use test_case::test_case;

    fn restrictions(s: &str) -> Result<(Vec<PublisherRestriction>, usize), TcfDecodeError> {
        let buf = b(s);
        let mut c = BitCursor::new(Bits::new(&buf), 0);
        let r = read_publisher_restrictions(&mut c)?;
        Ok((r, c.position()))
    }

    #[test_case("000000000000" => (vec![], 12) ; "empty")]
    #[test_case("000000000001 000011 01 000000000001 0 0000000000000101" => (vec![
        PublisherRestriction {
            purpose_id: 3,
            restriction_type: RestrictionType::RequireConsent,
            restricted_vendors: vec![VendorRange { start: 5, end: 5 }],
        },
    ], 49) ; "1 element")]
    #[test_case("000000000010 000011 00 000000000001 0 0000000000000101 000111 10 000000000001 1 0000000000000001 0000000000010100" => (vec![
        PublisherRestriction {
            purpose_id: 3,
            restriction_type: RestrictionType::NotAllowed,
            restricted_vendors: vec![VendorRange { start: 5, end: 5 }],
        },
        PublisherRestriction {
            purpose_id: 7,
            restriction_type: RestrictionType::RequireLegitimateInterest,
            restricted_vendors: vec![VendorRange { start: 1, end: 20 }],
        },
    ], 102) ; "2 elements")]
    #[test_case("000000000001 000001 11 000000000000" => (vec![
        PublisherRestriction {
            purpose_id: 1,
            restriction_type: RestrictionType::Undefined,
            restricted_vendors: vec![],
        },
    ], 32) ; "undefined type")]
    fn read(s: &str) -> (Vec<PublisherRestriction>, usize) {
        restrictions(s).unwrap()
    }

    #[test_case("000000" ; "missing count")]
    #[test_case("000000000001 000011" ; "missing range list")]
    #[test_case("000000000010 000011 01 000000000001 0 0000000000000101" ; "missing second entry")]
    fn truncated(s: &str) {
        let e = restrictions(s).unwrap_err();
        assert!(matches!(e, TcfDecodeError::Truncated { .. }), "got {e:?}");
    }

    #[test]
    fn applies_to() {
        let r = PublisherRestriction {
            purpose_id: 2,
            restriction_type: RestrictionType::NotAllowed,
            restricted_vendors: vec![
                VendorRange { start: 10, end: 12 },
                VendorRange { start: 3, end: 3 },
            ],
        };

        assert!(r.applies_to(3));
        assert!(r.applies_to(11));
        assert!(!r.applies_to(4));
        assert!(!r.applies_to(0));
    }
}
