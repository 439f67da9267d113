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

//! Unary codec: n is represented as n ones followed by a zero terminator.
//!
//! The optimized mode drops the leading one (the reader re-adds 1 to every
//! decoded value), so n > 0 costs exactly n bits instead of n + 1.

use snafu::{ensure, OptionExt};

use crate::bits::shl_byte;
use crate::encoding::PackedBytes;
use crate::error::{BufferUnderrunSnafu, InvalidInputSnafu, Result};

/// Encode one number. Optimized mode rejects 0, which has no leading one to
/// drop.
pub fn encode(number: u32, optimize: bool) -> Result<PackedBytes> {
    let ones = number as usize;
    let bytes_required = (ones + 1).div_ceil(8);
    let mut padding = (7 - (ones % 8)) as u8;

    let mut encoded = vec![0xFFu8; bytes_required];
    // Shift the zero terminator and the padding zeros into the last byte.
    let last = encoded.len() - 1;
    encoded[last] = shl_byte(encoded[last], padding as u32 + 1);

    if optimize {
        ensure!(
            number != 0,
            InvalidInputSnafu {
                msg: "cannot represent 0 in optimized unary"
            }
        );
        if padding == 7 {
            // The last byte held nothing but the terminator; the shift below
            // re-creates the terminator in the byte before it.
            encoded.pop();
        }
        let last = encoded.len() - 1;
        encoded[last] = shl_byte(encoded[last], 1);
        padding = if padding < 7 { padding + 1 } else { 0 };
    }

    Ok(PackedBytes::from_parts(encoded.into(), padding))
}

/// Decode `count` numbers starting at `bit_offset`. Runs of whole `0xFF`
/// bytes are consumed without per-bit work.
pub fn decode(
    encoded: &[u8],
    count: usize,
    optimized: bool,
    bit_offset: usize,
) -> Result<Vec<u32>> {
    let mut decoded = Vec::with_capacity(count);
    let mut number = optimized as u32;
    let mut byte_index = bit_offset >> 3;
    let mut bit_index = (bit_offset & 7) as u32;

    for _ in 0..count {
        let read_mask = 0xFFu8 >> bit_index;
        let mut current = *encoded.get(byte_index).context(BufferUnderrunSnafu {
            bit_offset: byte_index * 8,
        })? & read_mask;

        if current == read_mask {
            // Every remaining bit of this byte is a one; skip whole 0xFF
            // bytes before scanning for the terminator.
            number += 8 - bit_index;
            byte_index += 1;
            loop {
                current = *encoded.get(byte_index).context(BufferUnderrunSnafu {
                    bit_offset: byte_index * 8,
                })?;
                if current != 0xFF {
                    break;
                }
                number += 8;
                byte_index += 1;
            }
            bit_index = 0;
        }

        while current & (0x80 >> bit_index) != 0 {
            number += 1;
            bit_index += 1;
        }

        decoded.push(number);
        number = optimized as u32;

        // Step past the terminator bit.
        bit_index = (bit_index + 1) & 7;
        if bit_index == 0 {
            byte_index += 1;
        }
    }

    Ok(decoded)
}

/// Encoded size of the numbers in bits: one bit per unary one, plus one
/// terminator per number in unoptimized mode.
pub fn encoded_size_bits(numbers: &[u32], optimized: bool) -> usize {
    let ones: usize = numbers.iter().map(|&n| n as usize).sum();
    if optimized {
        ones
    } else {
        ones + numbers.len()
    }
}
