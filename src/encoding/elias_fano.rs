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

//! Elias-Fano codec for strictly increasing sequences.
//!
//! The head of the list is rewritten so that the first element travels as a
//! variable-byte prefix while the rest stays a strictly increasing tail of
//! deltas. The tail is then stored one of three ways:
//!
//! - a single-element list is just the variable-byte number;
//! - a dense tail (more than max/4 elements) becomes a characteristic bit
//!   vector, marked by a `0xFF` header byte;
//! - otherwise each delta splits at bit `l` into a fixed-width lower part
//!   and an upper part whose gaps are unary coded. The frame is
//!   `vbyte(prefix) ++ [l] ++ lowers ++ uppers`.

use bytes::{BufMut, BytesMut};
use snafu::{ensure, OptionExt};

use crate::bitbytearray::BitByteArray;
use crate::bits::read_bits;
use crate::encoding::{gaps, unary, vbyte, PackedBytes};
use crate::error::{BufferUnderrunSnafu, FormatSnafu, InvalidInputSnafu, Result};

/// Header byte marking the characteristic-vector layout.
const BIT_VECTOR_MARKER: u8 = 0xFF;

/// Encode a strictly increasing list of numbers.
pub fn encode(numbers: &[u32]) -> Result<PackedBytes> {
    ensure!(
        !numbers.is_empty(),
        InvalidInputSnafu {
            msg: "cannot encode an empty sequence"
        }
    );
    for pair in numbers.windows(2) {
        ensure!(
            pair[0] < pair[1],
            InvalidInputSnafu {
                msg: format!(
                    "sequence must be strictly increasing, got {} then {}",
                    pair[0], pair[1]
                )
            }
        );
    }
    if numbers.len() == 1 {
        return Ok(PackedBytes::from_parts(vbyte::encode(numbers[0]), 0));
    }

    let (prefix, tail) = rewrite_head(numbers);
    let len = tail.len();
    let max = tail[len - 1];

    let mut frame = BytesMut::new();
    vbyte::encode_into(&mut frame, prefix);

    // Dense tails compress better as a plain characteristic vector.
    if len > (max >> 2) as usize {
        frame.put_u8(BIT_VECTOR_MARKER);
        let vector = bit_vector_encode(&tail, max);
        frame.put_slice(vector.bytes());
        let padding = vector.padding();
        return Ok(PackedBytes::from_parts(frame.freeze(), padding));
    }

    let low_bits = lower_bit_count(max, len);
    let low_mask = (1u32 << low_bits) - 1;
    let mut uppers = Vec::with_capacity(len);
    let mut lowers = Vec::with_capacity(len);
    for &number in &tail {
        lowers.push(number & low_mask);
        uppers.push(number >> low_bits);
    }

    let mut merged = encode_lowers(&lowers, low_bits)?;
    let upper_stream = encode_uppers(&uppers)?;
    merged.extend(upper_stream.as_slice(), upper_stream.padding())?;

    frame.put_u8(low_bits as u8);
    frame.put_slice(merged.as_slice());
    let padding = merged.padding();
    Ok(PackedBytes::from_parts(frame.freeze(), padding))
}

/// Decode `count` numbers from an Elias-Fano frame.
pub fn decode(encoded: &[u8], count: usize) -> Result<Vec<u32>> {
    ensure!(
        count > 0,
        InvalidInputSnafu {
            msg: "count must be at least 1"
        }
    );
    if count == 1 {
        let (number, _) = vbyte::decode_one(encoded, 0)?;
        return Ok(vec![number]);
    }

    let (prefix, mut offset) = vbyte::decode_one(encoded, 0)?;
    let header = *encoded
        .get(offset >> 3)
        .context(BufferUnderrunSnafu { bit_offset: offset })?;
    offset += 8;

    let tail = if header == BIT_VECTOR_MARKER {
        bit_vector_decode(encoded, count, offset)?
    } else {
        decode_split(encoded, count, offset, header as usize)?
    };

    // Invert the head rewrite: the first two stream values sum to the
    // original first element, which offsets every later delta.
    let base = prefix.checked_add(tail[0]).context(FormatSnafu {
        msg: "first element overflows 32 bits",
    })?;
    let mut decoded = Vec::with_capacity(count);
    decoded.push(base);
    for &delta in &tail[1..] {
        let number = base.checked_add(delta).context(FormatSnafu {
            msg: "element overflows 32 bits",
        })?;
        decoded.push(number);
    }
    Ok(decoded)
}

/// Delta-since-min head rewrite. The first element is subtracted from the
/// rest, then split into a variable-byte prefix and a fresh tail head kept
/// strictly below the old second element. A leading zero cannot be split
/// (its unary gap would be negative), so the original list is passed
/// through behind a zero prefix.
fn rewrite_head(numbers: &[u32]) -> (u32, Vec<u32>) {
    let lead = numbers[0];
    if lead == 0 {
        return (0, numbers.to_vec());
    }
    let first_delta = numbers[1] - lead;
    let mut tail = Vec::with_capacity(numbers.len());
    tail.push(first_delta.min(lead) - 1);
    tail.extend(numbers[1..].iter().map(|&number| number - lead));
    let prefix = lead - tail[0];
    (prefix, tail)
}

/// Smallest l with len * 2^l >= max, i.e. ceil(log2(max / len)). The sparse
/// path guarantees max >= 4 * len, so l is always in [2, 31] and never
/// collides with the bit-vector marker.
fn lower_bit_count(max: u32, len: usize) -> usize {
    let mut low_bits = 0;
    while (len as u64) << low_bits < max as u64 {
        low_bits += 1;
    }
    low_bits
}

/// Pack each lower part into exactly `low_bits` bits, left-aligned within
/// its bytes.
fn encode_lowers(lowers: &[u32], low_bits: usize) -> Result<BitByteArray> {
    let size = low_bits.div_ceil(8);
    let padding = ((8 - low_bits % 8) % 8) as u8;
    let mut stream = BitByteArray::new();
    for &lower in lowers {
        let aligned = (lower << padding).to_be_bytes();
        stream.extend(&aligned[4 - size..], padding)?;
    }
    Ok(stream)
}

/// Gap the upper parts and unary-code each gap, unoptimized.
fn encode_uppers(uppers: &[u32]) -> Result<BitByteArray> {
    let mut stream = BitByteArray::new();
    for gap in gaps::encode(uppers)? {
        let encoded = unary::encode(gap, false)?;
        stream.extend(encoded.bytes(), encoded.padding())?;
    }
    Ok(stream)
}

/// Standard split decode: `count` lower parts of `low_bits` each, followed
/// by the unary-coded upper gaps.
fn decode_split(
    encoded: &[u8],
    count: usize,
    offset: usize,
    low_bits: usize,
) -> Result<Vec<u32>> {
    ensure!(
        low_bits < 32,
        FormatSnafu {
            msg: format!("lower width {low_bits} inconsistent with 32-bit values")
        }
    );
    let mut lower_offset = offset;
    let mut upper_offset = offset + low_bits * count;
    let mut tail = Vec::with_capacity(count);
    let mut upper: u32 = 0;
    for _ in 0..count {
        let lower = read_bits(encoded, lower_offset, low_bits)?;
        let gap = unary::decode(encoded, 1, false, upper_offset)?[0];
        upper = upper.checked_add(gap).context(FormatSnafu {
            msg: "upper part overflows 32 bits",
        })?;
        ensure!(
            upper <= u32::MAX >> low_bits,
            FormatSnafu {
                msg: "upper part overflows 32 bits"
            }
        );
        tail.push((upper << low_bits) | lower);
        lower_offset += low_bits;
        upper_offset += gap as usize + 1;
    }
    Ok(tail)
}

/// Characteristic vector over `[0, max]`: bit k, counted MSB-first within
/// each byte, is set iff k is in the list.
fn bit_vector_encode(numbers: &[u32], max: u32) -> PackedBytes {
    let bits = max as usize + 1;
    let mut bytes = vec![0u8; bits.div_ceil(8)];
    for &number in numbers {
        bytes[(number >> 3) as usize] |= 0x80 >> (number & 7);
    }
    let padding = ((8 - bits % 8) % 8) as u8;
    PackedBytes::from_parts(bytes.into(), padding)
}

/// Collect the positions of set bits until `count` members are found.
/// Whole `0xFF` bytes are expanded as runs of eight consecutive members.
fn bit_vector_decode(encoded: &[u8], count: usize, bit_offset: usize) -> Result<Vec<u32>> {
    let mut members = Vec::with_capacity(count);
    let mut byte_index = bit_offset >> 3;
    let mut bit_index = (bit_offset & 7) as u32;
    let mut position: u32 = 0;

    while members.len() < count {
        let byte = *encoded.get(byte_index).context(BufferUnderrunSnafu {
            bit_offset: byte_index * 8,
        })?;
        if byte == 0xFF && bit_index == 0 {
            for _ in 0..8 {
                members.push(position);
                position += 1;
            }
        } else {
            for bit in bit_index..8 {
                if byte & (0x80 >> bit) != 0 {
                    members.push(position);
                }
                position += 1;
            }
        }
        byte_index += 1;
        bit_index = 0;
    }

    members.truncate(count);
    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn roundtrip(numbers: &[u32]) -> Vec<u32> {
        let packed = encode(numbers).unwrap();
        decode(packed.bytes(), numbers.len()).unwrap()
    }

    #[test]
    fn single_number_is_plain_vbyte() {
        let packed = encode(&[300]).unwrap();
        assert_eq!(packed.bytes(), &[0x02, 0xAC]);
        assert_eq!(packed.padding(), 0);
        assert_eq!(decode(packed.bytes(), 1).unwrap(), vec![300]);
    }

    #[test]
    fn dense_range_uses_the_bit_vector() {
        let numbers: Vec<u32> = (0..100).collect();
        let packed = encode(&numbers).unwrap();
        // Zero lead: vbyte(0) then the marker byte.
        assert_eq!(packed.bytes()[0], 0x80);
        assert_eq!(packed.bytes()[1], BIT_VECTOR_MARKER);
        assert_eq!(decode(packed.bytes(), numbers.len()).unwrap(), numbers);
    }

    #[test]
    fn sparse_list_uses_the_split_layout() {
        let numbers = [0, 5, 1_000_000];
        let packed = encode(&numbers).unwrap();
        assert_eq!(packed.bytes()[0], 0x80);
        assert_ne!(packed.bytes()[1], BIT_VECTOR_MARKER);
        assert_eq!(decode(packed.bytes(), numbers.len()).unwrap(), numbers);
    }

    #[test]
    fn dense_list_away_from_zero() {
        let numbers: Vec<u32> = (1000..1100).collect();
        let packed = encode(&numbers).unwrap();
        assert_eq!(packed.bytes()[1], BIT_VECTOR_MARKER);
        assert_eq!(decode(packed.bytes(), numbers.len()).unwrap(), numbers);
    }

    #[test]
    fn sparse_list_away_from_zero() {
        let numbers = [1, 100, 200];
        let packed = encode(&numbers).unwrap();
        // Head rewrite: prefix 1, tail [0, 99, 199], l = 7.
        assert_eq!(packed.bytes()[0], 0x81);
        assert_eq!(packed.bytes()[1], 7);
        assert_eq!(decode(packed.bytes(), numbers.len()).unwrap(), numbers);
    }

    #[test]
    fn two_element_lists() {
        assert_eq!(roundtrip(&[0, 1]), vec![0, 1]);
        assert_eq!(roundtrip(&[1, 2]), vec![1, 2]);
        assert_eq!(roundtrip(&[5, 4_000_000]), vec![5, 4_000_000]);
        assert_eq!(roundtrip(&[0, u32::MAX]), vec![0, u32::MAX]);
    }

    #[test]
    fn rejects_unsorted_and_duplicate_input() {
        assert!(matches!(
            encode(&[3, 3]).unwrap_err(),
            CodecError::InvalidInput { .. }
        ));
        assert!(encode(&[5, 2]).is_err());
        assert!(encode(&[]).is_err());
    }

    #[test]
    fn rejects_zero_count() {
        let packed = encode(&[1, 2]).unwrap();
        assert!(matches!(
            decode(packed.bytes(), 0).unwrap_err(),
            CodecError::InvalidInput { .. }
        ));
    }

    #[test]
    fn truncated_frame_is_an_underrun() {
        let numbers = [0, 5, 1_000_000];
        let packed = encode(&numbers).unwrap();
        let cut = &packed.bytes()[..packed.bytes().len() - 1];
        assert!(decode(cut, numbers.len()).is_err());
    }

    #[test]
    fn strided_list_roundtrips() {
        let numbers: Vec<u32> = (0..5000).map(|i| i * 5).collect();
        assert_eq!(roundtrip(&numbers), numbers);
    }

    proptest! {
        #[test]
        fn roundtrip_arbitrary_sorted_sets(
            set in prop::collection::btree_set(0..=u32::MAX, 1..=512)
        ) {
            let numbers: Vec<u32> = set.into_iter().collect();
            prop_assert_eq!(roundtrip(&numbers), numbers);
        }

        #[test]
        fn roundtrip_dense_sets(
            set in prop::collection::btree_set(0..2000u32, 1..=512)
        ) {
            let numbers: Vec<u32> = set.into_iter().collect();
            prop_assert_eq!(roundtrip(&numbers), numbers);
        }
    }
}
