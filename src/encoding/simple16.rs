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

//! Simple-16 word codec.
//!
//! Each 32-bit word carries a 4-bit format tag in its top nibble plus 28
//! data bits, sliced into fixed-width slots according to one of 16 layouts.
//! Encoding is greedy: formats are tried from 15 (most slots) down to 0 and
//! the first whose slots fit the next values wins.

use crate::error::{FormatSnafu, Result};

/// Slot widths per format, indexed by the 4-bit tag. Each layout sums to the
/// 28 data bits of a word.
const FORMATS: [&[u32]; 16] = [
    &[28],
    &[14; 2],
    &[10, 9, 9],
    &[7; 4],
    &[5, 5, 6, 6, 6],
    &[6, 6, 6, 5, 5],
    &[4, 4, 5, 5, 5, 5],
    &[5, 5, 5, 5, 4, 4],
    &[4; 7],
    &[3, 4, 4, 4, 4, 3, 3, 3],
    &[4, 3, 3, 3, 3, 3, 3, 3, 3],
    &[2; 14],
    &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2],
    &[1, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2, 2, 2, 1, 1, 1, 1, 1, 1, 1],
    &[2, 2, 2, 2, 2, 2, 2, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    &[1; 28],
];

/// Number of data bits in a word, below the format tag.
const DATA_BITS: u32 = 28;

#[inline]
fn slot_mask(width: u32) -> u32 {
    (1u32 << width) - 1
}

/// Pick the first format (from 15 downwards) whose slots fit the values at
/// `start`. The check is capped at the remaining input so a short tail can
/// still use a many-slot format without over-fitting; unused slots encode
/// as zeros.
fn find_format(numbers: &[u32], start: usize) -> Result<(u32, &'static [u32])> {
    for format in (0..FORMATS.len()).rev() {
        let slots = FORMATS[format];
        let take = slots.len().min(numbers.len() - start);
        let fits = numbers[start..start + take]
            .iter()
            .zip(slots)
            .all(|(&number, &width)| number <= slot_mask(width));
        if fits {
            return Ok((format as u32, slots));
        }
    }
    // Format 0 offers a full 28-bit slot, so only a wider value lands here.
    FormatSnafu {
        msg: format!("value {} exceeds 28 bits", numbers[start]),
    }
    .fail()
}

/// Encode a list of numbers into 32-bit words. Values must fit in 28 bits.
pub fn encode(numbers: &[u32]) -> Result<Vec<u32>> {
    let mut encoded = vec![];
    let mut start = 0;
    while start < numbers.len() {
        let (format, slots) = find_format(numbers, start)?;
        let take = slots.len().min(numbers.len() - start);

        let mut word = format << DATA_BITS;
        let mut shift = DATA_BITS;
        for (&number, &width) in numbers[start..start + take].iter().zip(slots) {
            shift -= width;
            word |= number << shift;
        }
        encoded.push(word);
        start += take;
    }
    Ok(encoded)
}

/// Decode every slot of every word. With `strip_trailing_zeros` the zeros
/// that padded the final word's unused slots are removed; callers whose
/// data may legitimately end in zeros must keep them and re-slice using a
/// known element count.
pub fn decode(encoded: &[u32], strip_trailing_zeros: bool) -> Vec<u32> {
    let mut numbers = vec![];
    for &word in encoded {
        let format = (word >> DATA_BITS) as usize;
        let mut shift = DATA_BITS;
        for &width in FORMATS[format] {
            shift -= width;
            numbers.push((word >> shift) & slot_mask(width));
        }
    }
    if strip_trailing_zeros {
        while numbers.last() == Some(&0) {
            numbers.pop();
        }
    }
    numbers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn format_table_is_consistent() {
        for slots in FORMATS {
            assert_eq!(slots.iter().sum::<u32>(), DATA_BITS);
        }
    }

    #[test]
    fn twenty_eight_ones_fill_one_word() {
        let numbers = [1u32; 28];
        let encoded = encode(&numbers).unwrap();
        assert_eq!(encoded.len(), 1);
        assert_eq!(encoded[0] >> 28, 15);
        assert_eq!(decode(&encoded, false), numbers);
    }

    #[test]
    fn short_tail_is_not_over_fitted() {
        // 27 ones still pick format 15 rather than splitting into two words.
        let numbers = [1u32; 27];
        let encoded = encode(&numbers).unwrap();
        assert_eq!(encoded.len(), 1);
        assert_eq!(decode(&encoded, true), numbers);
    }

    #[test]
    fn wide_value_uses_single_slot_format() {
        let numbers = [(1 << 28) - 1];
        let encoded = encode(&numbers).unwrap();
        assert_eq!(encoded.len(), 1);
        assert_eq!(encoded[0] >> 28, 0);
        assert_eq!(decode(&encoded, true), numbers);
    }

    #[test]
    fn value_over_28_bits_is_a_format_error() {
        let err = encode(&[1 << 28]).unwrap_err();
        assert!(matches!(err, CodecError::FormatError { .. }));
    }

    #[test]
    fn stripping_preserves_interior_zeros() {
        let numbers = [0, 5, 0, 0, 3, 0, 0];
        let encoded = encode(&numbers).unwrap();
        assert_eq!(decode(&encoded, true), [0, 5, 0, 0, 3]);
        let unstripped = decode(&encoded, false);
        assert_eq!(&unstripped[..numbers.len()], numbers);
    }

    #[test]
    fn mixed_widths_roundtrip() {
        let numbers = [3, 200_000, 1, 1, 900, 900, 17, 0, 65_000];
        let encoded = encode(&numbers).unwrap();
        let decoded = decode(&encoded, false);
        assert_eq!(&decoded[..numbers.len()], numbers);
        assert!(decoded[numbers.len()..].iter().all(|&n| n == 0));
    }

    proptest! {
        #[test]
        fn roundtrip_28_bit_values(
            numbers in prop::collection::vec(0..(1u32 << 28), 1..=512)
        ) {
            let encoded = encode(&numbers)?;
            let decoded = decode(&encoded, false);
            prop_assert!(decoded.len() >= numbers.len());
            prop_assert_eq!(&decoded[..numbers.len()], &numbers[..]);
            prop_assert!(decoded[numbers.len()..].iter().all(|&n| n == 0));
        }
    }
}
