// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Bit-level primitives shared by the byte-stream and word-stream codecs.
//!
//! Streams are addressed by bit offset, where bit 0 is the most significant
//! bit of the first byte or word. Writers OR values into pre-zeroed storage
//! and never overwrite; readers bounds-check and surface
//! [`CodecError::BufferUnderrun`](crate::error::CodecError).

use snafu::{ensure, OptionExt};

use crate::error::{BufferUnderrunSnafu, InvalidPaddingSnafu, Result};

/// Fail with `InvalidPadding` unless `padding` is in `[0, 7]`.
pub fn validate_padding(padding: u8) -> Result<()> {
    ensure!(padding < 8, InvalidPaddingSnafu { padding });
    Ok(())
}

/// Minimum number of bits needed to represent `number` (0 for 0).
#[inline]
pub(crate) fn bits_used(number: u32) -> usize {
    (u32::BITS - number.leading_zeros()) as usize
}

/// Shift a byte left by up to 8 places, discarding bits that leave the byte.
#[inline]
pub fn shl_byte(byte: u8, places: u32) -> u8 {
    debug_assert!(places <= 8, "byte shift cannot exceed 8");
    (((byte as u16) << places) & 0xFF) as u8
}

/// Shift a byte right by up to 8 places.
#[inline]
pub fn shr_byte(byte: u8, places: u32) -> u8 {
    debug_assert!(places <= 8, "byte shift cannot exceed 8");
    ((byte as u16) >> places) as u8
}

/// Write the low `bits` bits of `value` into `bytes` starting at
/// `bit_offset`, most significant bit first. Returns the advanced offset.
///
/// The written range must be pre-allocated and zeroed: bits are
/// OR-accumulated into place.
pub fn write_bits(
    bytes: &mut [u8],
    mut bit_offset: usize,
    mut value: u32,
    mut bits: usize,
) -> usize {
    debug_assert!(bits <= 32, "cannot write more than 32 bits at once");
    debug_assert!(
        bits == 32 || value < (1u32 << bits),
        "value must fit in `bits` bits"
    );

    while bits > 0 {
        let index = bit_offset >> 3;
        let bit_index = bit_offset & 7;
        let writable = 8 - bit_index;
        let to_write = bits.min(writable);
        // E.g. 11 bits into 8 writable: emit the high 8 now, keep 3 for the
        // next byte.
        let shift = bits.abs_diff(writable);
        if writable < bits {
            bytes[index] |= (value >> shift) as u8;
        } else {
            bytes[index] |= ((value << shift) & 0xFF) as u8;
        }
        // shift <= 31 on every path, as bits <= 32 and writable >= 1.
        value &= (1u32 << shift) - 1;
        bit_offset += to_write;
        bits -= to_write;
    }
    bit_offset
}

/// Read `bits` bits from `bytes` starting at `bit_offset`.
pub fn read_bits(bytes: &[u8], mut bit_offset: usize, mut bits: usize) -> Result<u32> {
    debug_assert!(bits <= 32, "cannot read more than 32 bits at once");

    let mut number: u32 = 0;
    while bits > 0 {
        let index = bit_offset >> 3;
        let bit_index = bit_offset & 7;
        let readable = 8 - bit_index;
        let to_read = bits.min(readable);
        let byte = *bytes.get(index).context(BufferUnderrunSnafu { bit_offset })?;
        let extracted = byte & (0xFF >> bit_index);
        // The last iteration may consume only the top part of the byte.
        let to_shift = readable.saturating_sub(bits);
        number = (number << to_read) | (extracted >> to_shift) as u32;
        bit_offset += to_read;
        bits -= to_read;
    }
    Ok(number)
}

/// [`write_bits`] over 32-bit words; bit 0 is the MSB of word 0.
pub fn write_word_bits(
    words: &mut [u32],
    mut bit_offset: usize,
    mut value: u32,
    mut bits: usize,
) -> usize {
    debug_assert!(bits <= 32, "cannot write more than 32 bits at once");
    debug_assert!(
        bits == 32 || value < (1u32 << bits),
        "value must fit in `bits` bits"
    );

    while bits > 0 {
        let index = bit_offset >> 5;
        let bit_index = bit_offset & 31;
        let writable = 32 - bit_index;
        let to_write = bits.min(writable);
        let shift = bits.abs_diff(writable);
        if writable < bits {
            words[index] |= value >> shift;
        } else {
            words[index] |= value << shift;
        }
        value &= (1u32 << shift) - 1;
        bit_offset += to_write;
        bits -= to_write;
    }
    bit_offset
}

/// [`read_bits`] over 32-bit words.
pub fn read_word_bits(words: &[u32], bit_offset: usize, bits: usize) -> Result<u32> {
    debug_assert!(bits <= 32, "cannot read more than 32 bits at once");
    if bits == 0 {
        return Ok(0);
    }

    let index = bit_offset >> 5;
    let bit_index = bit_offset & 31;
    let readable = 32 - bit_index;
    let word = *words.get(index).context(BufferUnderrunSnafu { bit_offset })?;
    let extracted = word & (u32::MAX >> bit_index);
    let to_shift = readable.saturating_sub(bits);
    let mut number = extracted >> to_shift;
    // A 32-bit value spans at most two adjacent words, so no loop is needed.
    if bits > readable {
        let remaining = bits - readable;
        let next = *words
            .get(index + 1)
            .context(BufferUnderrunSnafu { bit_offset })?;
        number = (number << remaining) | (next >> (32 - remaining));
    }
    Ok(number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_validate_padding() {
        for padding in 0..=7 {
            validate_padding(padding).unwrap();
        }
        let err = validate_padding(8).unwrap_err();
        assert!(matches!(err, CodecError::InvalidPadding { padding: 8, .. }));
        assert!(validate_padding(255).is_err());
    }

    #[test]
    fn test_bits_used() {
        assert_eq!(bits_used(0), 0);
        assert_eq!(bits_used(1), 1);
        assert_eq!(bits_used(7), 3);
        assert_eq!(bits_used(8), 4);
        assert_eq!(bits_used(u32::MAX), 32);
    }

    #[test]
    fn test_byte_shifts() {
        assert_eq!(shl_byte(0b1110_0000, 1), 0b1100_0000);
        assert_eq!(shl_byte(0xFF, 8), 0);
        assert_eq!(shr_byte(0b0000_0111, 1), 0b0000_0011);
        assert_eq!(shr_byte(0xFF, 8), 0);
    }

    #[test]
    fn write_bits_crosses_byte_boundary() {
        let mut buf = vec![0u8; 2];
        let end = write_bits(&mut buf, 5, 0b101_101, 6);
        assert_eq!(end, 11);
        assert_eq!(buf, vec![0b0000_0101, 0b1010_0000]);
        assert_eq!(read_bits(&buf, 5, 6).unwrap(), 0b101_101);
    }

    #[test]
    fn write_bits_full_32_at_odd_offset() {
        let mut buf = vec![0u8; 5];
        write_bits(&mut buf, 3, 0xDEAD_BEEF, 32);
        assert_eq!(read_bits(&buf, 3, 32).unwrap(), 0xDEAD_BEEF);
    }

    #[test]
    fn read_bits_underruns_past_end() {
        let err = read_bits(&[0xFF], 4, 8).unwrap_err();
        assert!(matches!(err, CodecError::BufferUnderrun { .. }));
        // A zero-length read never touches the buffer.
        assert_eq!(read_bits(&[], 0, 0).unwrap(), 0);
    }

    #[test]
    fn write_word_bits_crosses_word_boundary() {
        let mut words = vec![0u32; 2];
        let end = write_word_bits(&mut words, 28, 0xAB, 8);
        assert_eq!(end, 36);
        assert_eq!(words[0], 0xA);
        assert_eq!(words[1], 0xB000_0000);
        assert_eq!(read_word_bits(&words, 28, 8).unwrap(), 0xAB);
    }

    #[test]
    fn read_word_bits_underruns_past_end() {
        let words = [u32::MAX];
        let err = read_word_bits(&words, 28, 8).unwrap_err();
        assert!(matches!(err, CodecError::BufferUnderrun { .. }));
    }

    fn mask_to_width(value: u32, width: usize) -> u32 {
        if width == 32 {
            value
        } else {
            value & ((1u32 << width) - 1)
        }
    }

    proptest! {
        #[test]
        fn roundtrip_byte_stream(
            values in prop::collection::vec(any::<u32>(), 1..=256),
            width in 1..=32_usize
        ) {
            let values: Vec<u32> = values.iter().map(|&v| mask_to_width(v, width)).collect();
            let mut buf = vec![0u8; (values.len() * width).div_ceil(8)];
            let mut offset = 0;
            for &value in &values {
                offset = write_bits(&mut buf, offset, value, width);
            }
            let mut out = Vec::with_capacity(values.len());
            for i in 0..values.len() {
                out.push(read_bits(&buf, i * width, width)?);
            }
            prop_assert_eq!(out, values);
        }

        #[test]
        fn roundtrip_word_stream(
            values in prop::collection::vec(any::<u32>(), 1..=256),
            width in 1..=32_usize
        ) {
            let values: Vec<u32> = values.iter().map(|&v| mask_to_width(v, width)).collect();
            let mut words = vec![0u32; (values.len() * width).div_ceil(32)];
            let mut offset = 0;
            for &value in &values {
                offset = write_word_bits(&mut words, offset, value, width);
            }
            let mut out = Vec::with_capacity(values.len());
            for i in 0..values.len() {
                out.push(read_word_bits(&words, i * width, width)?);
            }
            prop_assert_eq!(out, values);
        }
    }
}
