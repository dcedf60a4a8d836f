use crate::core::base64::DecodeError;
use bitstream_io::{BigEndian, BitRead, BitReader, UnsignedInteger};
use std::collections::BTreeSet;
use thiserror::Error;

pub mod base64;

pub trait DecodeExt {
    fn decode_base64_url(&self) -> Result<Vec<u8>, DecodeError>;
}

impl DecodeExt for str {
    fn decode_base64_url(&self) -> Result<Vec<u8>, DecodeError> {
        base64::decode(self)
    }
}

/// A read went past the end of the buffer, or asked for an unsupported width.
#[derive(Error, Debug, Eq, PartialEq)]
#[error("cannot read {width} bits at offset {offset} from a {len} bits buffer")]
pub struct OutOfRange {
    pub offset: usize,
    pub width: usize,
    pub len: usize,
}

/// Random access, most-significant-bit-first view over a byte buffer.
///
/// All reads are pure functions of the buffer, the bit offset and the width.
#[derive(Clone, Copy, Debug)]
pub struct Bits<'a> {
    data: &'a [u8],
}

impl<'a> Bits<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Length of the buffer in bits.
    pub fn len(&self) -> usize {
        self.data.len() * 8
    }

    /// Checks that `width` bits are available starting at `offset`.
    pub fn ensure(&self, offset: usize, width: usize) -> Result<(), OutOfRange> {
        match offset.checked_add(width) {
            Some(end) if end <= self.len() => Ok(()),
            _ => Err(self.out_of_range(offset, width)),
        }
    }

    /// Reads an unsigned integer of 1 to 64 bits.
    ///
    /// The width must also fit in `U`, otherwise the read fails.
    pub fn read_unsigned<U: UnsignedInteger>(
        &self,
        offset: usize,
        width: u32,
    ) -> Result<U, OutOfRange> {
        let w = width as usize;
        if !(1..=64).contains(&width) {
            return Err(self.out_of_range(offset, w));
        }
        self.ensure(offset, w)?;

        self.reader_at(offset)?
            .read_unsigned_var::<U>(width)
            .map_err(|_| self.out_of_range(offset, w))
    }

    pub fn read_bool(&self, offset: usize) -> Result<bool, OutOfRange> {
        self.data
            .get(offset / 8)
            .map(|byte| (byte >> (7 - offset % 8)) & 1 == 1)
            .ok_or_else(|| self.out_of_range(offset, 1))
    }

    /// Reads `chars` 6-bit letters, 0 being `A`.
    pub fn read_string(&self, offset: usize, chars: usize) -> Result<String, OutOfRange> {
        self.ensure(offset, chars * 6)?;
        (0..chars)
            .map(|i| {
                self.read_unsigned::<u8>(offset + i * 6, 6)
                    .map(|n| char::from(b'A' + n))
            })
            .collect()
    }

    /// Reads `bits` consecutive flags, returning the 1-based positions of the set ones.
    pub fn read_fixed_bitfield(
        &self,
        offset: usize,
        bits: u16,
    ) -> Result<BTreeSet<u16>, OutOfRange> {
        self.ensure(offset, usize::from(bits))?;

        let mut r = self.reader_at(offset)?;
        let mut result = BTreeSet::new();
        for i in 1..=bits {
            if r
                .read_bit()
                .map_err(|_| self.out_of_range(offset, usize::from(bits)))?
            {
                result.insert(i);
            }
        }

        Ok(result)
    }

    fn reader_at(&self, offset: usize) -> Result<BitReader<&'a [u8], BigEndian>, OutOfRange> {
        let bytes = self
            .data
            .get(offset / 8..)
            .ok_or_else(|| self.out_of_range(offset, 0))?;
        let mut r = BitReader::endian(bytes, BigEndian);
        r.skip((offset % 8) as u32)
            .map_err(|_| self.out_of_range(offset, 0))?;

        Ok(r)
    }

    fn out_of_range(&self, offset: usize, width: usize) -> OutOfRange {
        OutOfRange {
            offset,
            width,
            len: self.len(),
        }
    }
}
