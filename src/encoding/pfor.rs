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

//! PForDelta (NewPFor variant) over 32-bit words.
//!
//! Numbers are packed into uniform b-bit slots. Values wider than b bits
//! store only their low b bits in place; their position and high bits go to
//! a side list that is Simple-16 compressed behind the slots. The stream is
//! `[header] ++ slots ++ simple16(indexes ++ high_bits)` with the header
//! word holding `b - 1` in its top 5 bits and the exception count below.
//!
//! The side list inherits Simple-16's 28-bit ceiling: a block that mixes
//! values near 2^32 with a narrow optimal slot width can produce exception
//! high bits too wide to compress, which [`encode`] surfaces as a
//! `FormatError`. Blocks whose values stay below 2^28 always encode.

use snafu::{ensure, OptionExt};

use crate::bits::{read_word_bits, write_word_bits};
use crate::encoding::simple16;
use crate::error::{BufferUnderrunSnafu, FormatSnafu, InvalidInputSnafu, Result};

/// Bits reserved for `b - 1` in the header word.
const WIDTH_HEADER_BITS: u32 = 5;
/// Low 27 header bits hold the exception count.
const EXCEPTION_COUNT_MASK: u32 = (1 << (32 - WIDTH_HEADER_BITS)) - 1;

#[inline]
fn slot_mask(width: usize) -> u32 {
    if width == 32 {
        u32::MAX
    } else {
        (1u32 << width) - 1
    }
}

/// Estimated encoded size in bits for `width`-bit slots: header plus slots,
/// charging a full uncompressed 32 bits per exception so that exceptions
/// are heavily penalized.
pub fn estimate_encoded_size(numbers: &[u32], width: usize) -> usize {
    debug_assert!((1..=32).contains(&width), "slot width must be in [1, 32]");
    let max_direct = slot_mask(width);
    let exceptions = numbers.iter().filter(|&&n| n > max_direct).count();
    32 + numbers.len() * width + exceptions * 32
}

/// Smallest estimated size wins; ties go to the narrower width.
fn find_optimal_width(numbers: &[u32]) -> usize {
    let mut optimal = 1;
    let mut optimal_size = estimate_encoded_size(numbers, 1);
    for width in 2..=32 {
        let size = estimate_encoded_size(numbers, width);
        if size < optimal_size {
            optimal = width;
            optimal_size = size;
        }
    }
    optimal
}

/// Encode a list of numbers into a PForDelta word stream.
pub fn encode(numbers: &[u32]) -> Result<Vec<u32>> {
    ensure!(
        numbers.len() <= EXCEPTION_COUNT_MASK as usize,
        InvalidInputSnafu {
            msg: "block too large for a 27-bit exception count"
        }
    );
    let width = find_optimal_width(numbers);
    let max_direct = slot_mask(width);

    let mut slots = vec![0u32; (numbers.len() * width).div_ceil(32)];
    let mut patches: Vec<u32> = vec![];
    let mut high_bits: Vec<u32> = vec![];
    let mut offset = 0;
    for (i, &number) in numbers.iter().enumerate() {
        let mut slot = number;
        if number > max_direct {
            patches.push(i as u32);
            high_bits.push(number >> width);
            slot &= max_direct;
        }
        offset = write_word_bits(&mut slots, offset, slot, width);
    }

    let header = (((width - 1) as u32) << (32 - WIDTH_HEADER_BITS)) | high_bits.len() as u32;
    let mut encoded = Vec::with_capacity(1 + slots.len());
    encoded.push(header);
    encoded.append(&mut slots);

    patches.append(&mut high_bits);
    encoded.extend_from_slice(&simple16::encode(&patches)?);
    Ok(encoded)
}

/// Decode `count` numbers from a PForDelta word stream.
pub fn decode(encoded: &[u32], count: usize) -> Result<Vec<u32>> {
    let header = *encoded
        .first()
        .context(BufferUnderrunSnafu { bit_offset: 0usize })?;
    let width = (header >> (32 - WIDTH_HEADER_BITS)) as usize + 1;
    let exception_count = (header & EXCEPTION_COUNT_MASK) as usize;
    let slots = &encoded[1..];

    let mut decoded = Vec::with_capacity(count);
    let mut offset = 0;
    for _ in 0..count {
        decoded.push(read_word_bits(slots, offset, width)?);
        offset += width;
    }

    if exception_count > 0 {
        ensure!(
            width < 32,
            FormatSnafu {
                msg: "32-bit slots cannot have exceptions"
            }
        );
        let slot_words = offset.div_ceil(32);
        let tail = slots.get(slot_words..).unwrap_or(&[]);
        // The side list never ends in a zero (high bits of an exception are
        // at least 1), so stripping only sheds format padding.
        let patches = simple16::decode(tail, true);
        ensure!(
            patches.len() >= exception_count * 2,
            FormatSnafu {
                msg: format!(
                    "exception block holds {} entries, header declares {}",
                    patches.len(),
                    exception_count * 2
                )
            }
        );
        for k in 0..exception_count {
            let index = patches[k] as usize;
            let high = patches[exception_count + k];
            ensure!(
                high <= u32::MAX >> width,
                FormatSnafu {
                    msg: "exception high bits overflow 32 bits"
                }
            );
            let slot = decoded.get_mut(index).context(FormatSnafu {
                msg: format!("exception index {index} out of range"),
            })?;
            *slot |= high << width;
        }
    }

    Ok(decoded)
}
