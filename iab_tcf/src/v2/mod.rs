//! Version 2 of the IAB Europe TCF consent string.
//!
//! A TCF v2 string is made of a mandatory Core String, optionally followed by other
//! segments, all separated by `.` characters:
//!
//! ```text
//! COyiILmOyiILmADACHENAPCAAAAAAAAAAAAAE5QBgALgAqgD8AQACSwEygJyAAAAAA.IAFKgA
//! ```
//!
//! Here the Core String is followed by a Disclosed Vendors segment.
//! Segments following the Core String may appear in any order, their type is read from
//! their first 3 bits.
//!
//! # Examples
//!
//! A [`TcfEuV2`] can be obtained with the [`TcfEuV2::parse_str`] method, or through
//! its [`FromStr`] implementation:
//!
//! ```
//! use iab_tcf::v2::{TcfEuV2, VendorConsents};
//! use iab_tcf::segments::TcfDecodeError;
//!
//! fn main() -> Result<(), TcfDecodeError> {
//!     let tcf: TcfEuV2 = "COyiILmOyiILmADACHENAPCAAAAAAAAAAAAAE5QBgALgAqgD8AQACSwEygJyAAAAAA.IAFKgA".parse()?;
//!
//!     assert_eq!(tcf.vendor_list_version(), 15);
//!     assert!(tcf.vendor_consent(42));
//!     assert!(tcf.has_disclosed_vendors());
//!     assert!(tcf.vendor_disclosed(3));
//!     Ok(())
//! }
//! ```
//!
//! If parsing fails, a [`TcfDecodeError`] is returned instead, and no partial result
//! is available.
//!
use crate::core::DecodeExt;
use crate::segments::core_string::{Core, decode_core};
use crate::segments::disclosed_vendors::decode_disclosed_vendors;
use crate::segments::publisher_restrictions::PublisherRestriction;
use crate::segments::vendors::VendorSet;
use crate::segments::{SegmentType, TcfDecodeError};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;
use tracing::{debug, trace};

const SEGMENT_SEPARATOR: char = '.';
const TCF_V2_PREFIX: char = 'C';

/// Read-only answers to the questions a consent string is meant for.
///
/// Queries are total: IDs the string has no room for return `false` rather than
/// failing.
pub trait VendorConsents {
    /// The version of the consent string.
    fn version(&self) -> u8;

    /// The time the consent string was first created.
    fn created(&self) -> OffsetDateTime;

    /// The time the consent string was last updated.
    fn last_updated(&self) -> OffsetDateTime;

    /// The ID of the CMP used to update the consent string.
    fn cmp_id(&self) -> u16;

    /// The version of the CMP used to update the consent string.
    fn cmp_version(&self) -> u16;

    /// The number of the CMP screen where consent was given.
    fn consent_screen(&self) -> u8;

    /// The two-letter ISO 639-1 language code used by the CMP to ask for consent, in uppercase.
    fn consent_language(&self) -> &str;

    /// The version of the Global Vendor List needed to interpret vendor IDs.
    fn vendor_list_version(&self) -> u16;

    /// The TCF policy version needed to interpret this consent string.
    fn tcf_policy_version(&self) -> u8;

    /// The upper bound (inclusive) of valid vendor IDs for [`vendor_consent`](VendorConsents::vendor_consent).
    fn max_vendor_id(&self) -> u16;

    /// Whether the user consented to the given purpose.
    ///
    /// Purposes outside of `1..=24` have no room in the string and return `false`.
    fn purpose_allowed(&self, purpose_id: u8) -> bool;

    /// Whether the given vendor has consent.
    ///
    /// IDs below 1 or above [`max_vendor_id`](VendorConsents::max_vendor_id) return
    /// `false`. IDs within that range may still be invalid depending on the vendor list.
    fn vendor_consent(&self, vendor_id: u16) -> bool;

    /// Whether the given vendor was disclosed to the user.
    ///
    /// Returns `false` both when the vendor was not disclosed and when the string
    /// has no Disclosed Vendors segment at all, use
    /// [`has_disclosed_vendors`](VendorConsents::has_disclosed_vendors) to tell them apart.
    fn vendor_disclosed(&self, vendor_id: u16) -> bool;

    /// The highest vendor ID of the Disclosed Vendors segment, 0 if absent.
    fn vendor_disclosed_max_vendor_id(&self) -> u16;

    /// Whether the string carries a Disclosed Vendors segment, disclosing any vendor or not.
    fn has_disclosed_vendors(&self) -> bool;
}

/// A decoded TCF v2 consent string.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub struct TcfEuV2 {
    pub core: Core,
    pub disclosed_vendors: Option<VendorSet>,
    /// Types of the segments following the Core String, in string order.
    pub segment_types: Vec<SegmentType>,
}

impl TcfEuV2 {
    /// Parses a complete, `.` separated, consent string.
    ///
    /// # Errors
    ///
    /// Returns a [`TcfDecodeError`] if the string is empty, if any non-empty segment is
    /// not valid Base64-URL, or if the Core String or the Disclosed Vendors segment
    /// cannot be decoded.
    ///
    /// # Example
    ///
    /// ```
    /// use iab_tcf::v2::TcfEuV2;
    /// use iab_tcf::segments::TcfDecodeError;
    ///
    /// let r = TcfEuV2::parse_str("");
    ///
    /// assert!(matches!(r, Err(TcfDecodeError::EmptyInput)));
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, TcfDecodeError> {
        if s.is_empty() {
            return Err(TcfDecodeError::EmptyInput);
        }

        let mut segments = s.split(SEGMENT_SEPARATOR);

        // first mandatory segment is the core string, split always yields it
        let core = segments.next().unwrap_or_default().decode_base64_url()?;
        let core = decode_core(&core)?;

        let mut disclosed_vendors = None;
        let mut segment_types = vec![];

        for segment in segments {
            if segment.is_empty() {
                debug!("skipping empty segment");
                continue;
            }

            let data = segment.decode_base64_url()?;
            let segment_type = SegmentType::read(&data)?;
            trace!(segment_type = %segment_type, len = data.len(), "dispatching segment");
            segment_types.push(segment_type);

            match segment_type {
                SegmentType::DisclosedVendors if disclosed_vendors.is_some() => {
                    debug!("ignoring duplicate disclosed vendors segment");
                }
                SegmentType::DisclosedVendors => {
                    disclosed_vendors = Some(decode_disclosed_vendors(&data)?);
                }
                t => {
                    debug!(segment_type = %t, "ignoring segment");
                }
            }
        }

        Ok(Self {
            core,
            disclosed_vendors,
            segment_types,
        })
    }

    /// Parses the raw bytes of a Core String, already isolated from the other segments
    /// and Base64-decoded.
    ///
    /// # Errors
    ///
    /// Returns a [`TcfDecodeError`] if the data is too short or otherwise cannot be
    /// decoded.
    pub fn parse_core(data: &[u8]) -> Result<Self, TcfDecodeError> {
        Ok(Self {
            core: decode_core(data)?,
            disclosed_vendors: None,
            segment_types: vec![],
        })
    }

    /// Whether the given vendor may rely on legitimate interest.
    pub fn vendor_legitimate_interest(&self, vendor_id: u16) -> bool {
        self.core.vendor_legitimate_interests.contains(vendor_id)
    }

    /// Whether legitimate interest was established for the given purpose.
    ///
    /// Purposes outside of `1..=24` return `false`.
    pub fn purpose_legitimate_interest(&self, purpose_id: u8) -> bool {
        self.core
            .purpose_legitimate_interests
            .contains(&u16::from(purpose_id))
    }

    /// Whether the user opted in to the given special feature.
    ///
    /// Special features outside of `1..=12` return `false`.
    pub fn special_feature_optin(&self, feature_id: u8) -> bool {
        self.core
            .special_feature_optins
            .contains(&u16::from(feature_id))
    }

    /// Returns the publisher restrictions which apply to the given vendor.
    pub fn publisher_restrictions_for(
        &self,
        vendor_id: u16,
    ) -> impl Iterator<Item = &PublisherRestriction> {
        self.core
            .publisher_restrictions
            .iter()
            .filter(move |r| r.applies_to(vendor_id))
    }
}

impl FromStr for TcfEuV2 {
    type Err = TcfDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl VendorConsents for TcfEuV2 {
    fn version(&self) -> u8 {
        self.core.version
    }

    fn created(&self) -> OffsetDateTime {
        self.core.created
    }

    fn last_updated(&self) -> OffsetDateTime {
        self.core.last_updated
    }

    fn cmp_id(&self) -> u16 {
        self.core.cmp_id
    }

    fn cmp_version(&self) -> u16 {
        self.core.cmp_version
    }

    fn consent_screen(&self) -> u8 {
        self.core.consent_screen
    }

    fn consent_language(&self) -> &str {
        &self.core.consent_language
    }

    fn vendor_list_version(&self) -> u16 {
        self.core.vendor_list_version
    }

    fn tcf_policy_version(&self) -> u8 {
        self.core.policy_version
    }

    fn max_vendor_id(&self) -> u16 {
        self.core.max_vendor_id()
    }

    fn purpose_allowed(&self, purpose_id: u8) -> bool {
        self.core.purpose_consents.contains(&u16::from(purpose_id))
    }

    fn vendor_consent(&self, vendor_id: u16) -> bool {
        self.core.vendor_consents.contains(vendor_id)
    }

    fn vendor_disclosed(&self, vendor_id: u16) -> bool {
        self.disclosed_vendors
            .as_ref()
            .is_some_and(|v| v.contains(vendor_id))
    }

    fn vendor_disclosed_max_vendor_id(&self) -> u16 {
        self.disclosed_vendors
            .as_ref()
            .map_or(0, |v| v.max_vendor_id())
    }

    fn has_disclosed_vendors(&self) -> bool {
        self.disclosed_vendors.is_some()
    }
}

/// Returns `true` if the string looks like a TCF v2 consent string.
///
/// Only the first character is checked, since every v2 string starts with a version
/// field of 2. This is a cheap heuristic, not a validation.
///
/// # Example
///
/// ```
/// use iab_tcf::v2::looks_like_v2;
///
/// assert!(looks_like_v2("COyiILmOyiILmADACHENAPCAAAAAAAAAAAAAE5QBgALgAqgD8AQACSwEygJyAAAAAA"));
/// assert!(!looks_like_v2("BOEFEAyOEFEAyAHABDENAI4AAAB9vABAASA"));
/// ```
pub fn looks_like_v2(s: &str) -> bool {
    s.starts_with(TCF_V2_PREFIX)
}
