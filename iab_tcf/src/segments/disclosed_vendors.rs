//! The Disclosed Vendors segment, mandatory since TCF 2.3.
//!
//! It lists the vendors which were disclosed to the user by the CMP, using the same
//! vendor list encodings as the Core String.
//!
use crate::core::Bits;
use crate::segments::vendors::{VendorSet, decode_vendor_set};
use crate::segments::{SegmentType, TcfDecodeError};

/// Segment type, max vendor ID and encoding flag take 20 bits.
const MIN_DISCLOSED_VENDORS_BYTES: usize = 3;
const VENDORS_START: usize = 20;

/// Decodes a Disclosed Vendors segment from its raw, already Base64-decoded, bytes.
///
/// The segment type found in the data is checked again.
pub(crate) fn decode_disclosed_vendors(data: &[u8]) -> Result<VendorSet, TcfDecodeError> {
    if data.len() < MIN_DISCLOSED_VENDORS_BYTES {
        return Err(TcfDecodeError::Malformed(format!(
            "disclosed vendors segment is {} bytes long, expected at least {MIN_DISCLOSED_VENDORS_BYTES}",
            data.len()
        )));
    }

    let bits = Bits::new(data);
    let segment_type = SegmentType::from(bits.read_unsigned::<u8>(0, 3)?);
    if segment_type != SegmentType::DisclosedVendors {
        return Err(TcfDecodeError::Malformed(format!(
            "expected disclosed vendors segment, found {segment_type:?}"
        )));
    }

    let max_vendor_id = bits.read_unsigned(3, 16)?;
    let is_range_encoded = bits.read_bool(19)?;
    let (vendors, _) = decode_vendor_set(bits, max_vendor_id, is_range_encoded, VENDORS_START)?;

    Ok(vendors)
}
