//! The Core String, first and mandatory segment of every TCF v2 string.
//!
//! Its header has a fixed layout of 230 bits, ending with the encoding flag of the
//! vendor consents list. Everything following it is variable length: vendor consents,
//! vendor legitimate interests, then publisher restrictions.
//!
use crate::core::Bits;
use crate::segments::publisher_restrictions::{PublisherRestriction, read_publisher_restrictions};
use crate::segments::vendors::{VendorSet, decode_vendor_set};
use crate::segments::{BitCursor, IdSet, TcfDecodeError};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Size of the fixed part of the header, up to and including the encoding flag of
/// the vendor consents list.
pub const MIN_CORE_STRING_BITS: usize = 230;

const MIN_VERSION: u8 = 2;
const NANOS_PER_DECISECOND: i128 = 100_000_000;

#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct Core {
    pub version: u8,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub created: OffsetDateTime,
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub last_updated: OffsetDateTime,
    pub cmp_id: u16,
    pub cmp_version: u16,
    pub consent_screen: u8,
    pub consent_language: String,
    pub vendor_list_version: u16,
    pub policy_version: u8,
    pub is_service_specific: bool,
    pub use_non_standard_stacks: bool,
    pub special_feature_optins: IdSet,
    pub purpose_consents: IdSet,
    pub purpose_legitimate_interests: IdSet,
    pub purpose_one_treatment: bool,
    pub publisher_country_code: String,
    pub vendor_consents: VendorSet,
    pub vendor_legitimate_interests: VendorSet,
    pub publisher_restrictions: Vec<PublisherRestriction>,
}

impl Core {
    /// The highest vendor ID covered by the vendor consents list.
    pub fn max_vendor_id(&self) -> u16 {
        self.vendor_consents.max_vendor_id()
    }
}

/// Decodes a Core String from its raw, already Base64-decoded, bytes.
pub(crate) fn decode_core(data: &[u8]) -> Result<Core, TcfDecodeError> {
    let bits = Bits::new(data);
    if bits.len() < MIN_CORE_STRING_BITS {
        return Err(TcfDecodeError::Malformed(format!(
            "core string is {} bits long, expected at least {MIN_CORE_STRING_BITS}",
            bits.len()
        )));
    }

    // the fixed header is known to be present from here
    let mut c = BitCursor::new(bits, 0);

    let version = c.read_unsigned(6, "version")?;
    if version < MIN_VERSION {
        return Err(TcfDecodeError::Malformed(format!(
            "unsupported core string version {version}"
        )));
    }

    let created = read_datetime(&mut c, "created")?;
    let last_updated = read_datetime(&mut c, "last updated")?;
    let cmp_id = c.read_unsigned(12, "cmp id")?;
    let cmp_version = c.read_unsigned(12, "cmp version")?;
    let consent_screen = c.read_unsigned(6, "consent screen")?;
    let consent_language = c.read_string(2, "consent language")?;
    let vendor_list_version = c.read_unsigned(12, "vendor list version")?;
    let policy_version = c.read_unsigned(6, "policy version")?;
    let is_service_specific = c.read_bool("is service specific")?;
    let use_non_standard_stacks = c.read_bool("use non standard stacks")?;
    let special_feature_optins = c.read_fixed_bitfield(12, "special feature optins")?;
    let purpose_consents = c.read_fixed_bitfield(24, "purpose consents")?;
    let purpose_legitimate_interests = c.read_fixed_bitfield(24, "purpose legitimate interests")?;
    let purpose_one_treatment = c.read_bool("purpose one treatment")?;
    let publisher_country_code = c.read_string(2, "publisher country code")?;

    let max_vendor_id = c.read_unsigned(16, "max vendor id")?;
    let is_range_encoded = c.read_bool("vendor consents encoding")?;
    let (vendor_consents, end) =
        decode_vendor_set(bits, max_vendor_id, is_range_encoded, c.position())?;

    c.seek(end);
    let li_max_vendor_id = c.read_unsigned(16, "legitimate interests max vendor id")?;
    let is_range_encoded = c.read_bool("vendor legitimate interests encoding")?;
    let (vendor_legitimate_interests, end) =
        decode_vendor_set(bits, li_max_vendor_id, is_range_encoded, c.position())?;

    c.seek(end);
    let publisher_restrictions = read_publisher_restrictions(&mut c)?;

    Ok(Core {
        version,
        created,
        last_updated,
        cmp_id,
        cmp_version,
        consent_screen,
        consent_language,
        vendor_list_version,
        policy_version,
        is_service_specific,
        use_non_standard_stacks,
        special_feature_optins,
        purpose_consents,
        purpose_legitimate_interests,
        purpose_one_treatment,
        publisher_country_code,
        vendor_consents,
        vendor_legitimate_interests,
        publisher_restrictions,
    })
}

/// Reads a 36-bit amount of deciseconds since the Unix epoch.
fn read_datetime(c: &mut BitCursor, name: &'static str) -> Result<OffsetDateTime, TcfDecodeError> {
    let deciseconds = c.read_unsigned::<u64>(36, name)?;

    OffsetDateTime::from_unix_timestamp_nanos(i128::from(deciseconds) * NANOS_PER_DECISECOND)
        .map_err(|e| TcfDecodeError::Malformed(format!("invalid {name} timestamp: {e}")))
}
