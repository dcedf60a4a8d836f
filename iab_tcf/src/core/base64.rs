use thiserror::Error;

/// The error type that describes failures to decode Base64 encoded strings.
#[derive(Error, Debug, Eq, PartialEq)]
pub enum DecodeError {
    /// An invalid byte was found in the input. The offset and offending byte are provided.
    #[error("invalid byte {1} at offset {0}")]
    InvalidByte(usize, u8),
}

/// Custom base64 implementation, 6-bits aligned, no padding,
/// using the URL Safe Base64 dictionary.
///
/// Trailing bits which do not fill a whole byte are dropped, so the output only
/// holds bits actually present in the string.
pub fn decode(s: &str) -> Result<Vec<u8>, DecodeError> {
    // output is never larger than the input string
    let mut buffer = Vec::with_capacity(s.len());
    let mut acc: u16 = 0;
    let mut acc_bits = 0;

    for (offset, b) in s.bytes().enumerate() {
        let value = base64_value(b).ok_or(DecodeError::InvalidByte(offset, b))?;
        acc = (acc << 6) | u16::from(value);
        acc_bits += 6;

        if acc_bits >= 8 {
            acc_bits -= 8;
            buffer.push((acc >> acc_bits) as u8);
            acc &= (1 << acc_bits) - 1;
        }
    }

    Ok(buffer)
}

fn base64_value(b: u8) -> Option<u8> {
    match b {
        b'A'..=b'Z' => Some(b - b'A'),
        b'a'..=b'z' => Some(b - b'a' + 26),
        b'0'..=b'9' => Some(b - b'0' + 52),
        b'-' => Some(62),
        b'_' => Some(63),
        _ => None,
    }
}
