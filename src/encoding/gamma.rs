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

//! Elias-Gamma codec.
//!
//! A number n > 0 with b = floor(log2 n) is stored as the unary encoding of b
//! followed by the low b bits of n (the leading one is implicit). 9 encodes
//! as `1110` + `001`, one byte `0b1110_0010` with padding 1.

use snafu::ensure;

use crate::bitbytearray::BitByteArray;
use crate::bits::{bits_used, read_bits};
use crate::encoding::{unary, PackedBytes};
use crate::error::{FormatSnafu, InvalidInputSnafu, Result};

/// Encode one number. Zero has no gamma representation.
pub fn encode(number: u32) -> Result<PackedBytes> {
    ensure!(
        number != 0,
        InvalidInputSnafu {
            msg: "cannot gamma-encode 0"
        }
    );
    let residual_bits = bits_used(number) - 1;
    let residual = number - (1u32 << residual_bits);

    let length = unary::encode(residual_bits as u32, false)?;
    let mut merged = BitByteArray::new();
    merged.extend(length.bytes(), length.padding())?;

    if residual_bits > 0 {
        let size = residual_bits.div_ceil(8);
        let padding = ((8 - residual_bits % 8) % 8) as u8;
        // Left-align the residual within its bytes.
        let aligned = (residual << padding).to_be_bytes();
        merged.extend(&aligned[4 - size..], padding)?;
    }

    Ok(merged.freeze())
}

/// Decode `count` numbers from the front of the stream.
pub fn decode(encoded: &[u8], count: usize) -> Result<Vec<u32>> {
    let mut decoded = Vec::with_capacity(count);
    let mut offset = 0;
    for _ in 0..count {
        let residual_bits = unary::decode(encoded, 1, false, offset)?[0] as usize;
        ensure!(
            residual_bits < 32,
            FormatSnafu {
                msg: "gamma length prefix exceeds 32 bits"
            }
        );
        // Step past the unary run and its terminator.
        offset += residual_bits + 1;
        let residual = read_bits(encoded, offset, residual_bits)?;
        decoded.push(residual + (1u32 << residual_bits));
        offset += residual_bits;
    }
    Ok(decoded)
}

/// Encoded size of the numbers in bits: 2 * floor(log2 n) + 1 per number.
pub fn encoded_size_bits(numbers: &[u32]) -> usize {
    numbers
        .iter()
        .map(|&number| 2 * (bits_used(number.max(1)) - 1) + 1)
        .sum()
}
