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

//! Fixed-width bit packing.
//!
//! Every number is stored in b bits, where b covers the largest value in
//! the list. The stream opens with the variable-byte encoding of b - 1.

use bytes::{BufMut, BytesMut};
use snafu::ensure;

use crate::bits::{bits_used, read_bits, write_bits};
use crate::encoding::{vbyte, PackedBytes};
use crate::error::{FormatSnafu, InvalidInputSnafu, Result};

fn width_for(numbers: &[u32]) -> usize {
    let max = numbers.iter().max().copied().unwrap_or(0);
    // An all-zeros list still needs one bit per slot.
    bits_used(max).max(1)
}

/// Encode a list of numbers into b-bit slots behind a width header.
pub fn encode(numbers: &[u32]) -> Result<PackedBytes> {
    ensure!(
        !numbers.is_empty(),
        InvalidInputSnafu {
            msg: "cannot bit-pack an empty sequence"
        }
    );
    let width = width_for(numbers);
    let total_bits = width * numbers.len();

    let mut packed = vec![0u8; total_bits.div_ceil(8)];
    let mut offset = 0;
    for &number in numbers {
        offset = write_bits(&mut packed, offset, number, width);
    }

    let mut encoded = BytesMut::with_capacity(1 + packed.len());
    vbyte::encode_into(&mut encoded, (width - 1) as u32);
    encoded.put_slice(&packed);

    let padding = ((8 - total_bits % 8) % 8) as u8;
    Ok(PackedBytes::from_parts(encoded.freeze(), padding))
}

/// Decode `count` numbers. The width header tells where the slots start;
/// the padding is implied by `count`.
pub fn decode(encoded: &[u8], count: usize) -> Result<Vec<u32>> {
    let (header, offset) = vbyte::decode_one(encoded, 0)?;
    let width = header as usize + 1;
    ensure!(
        width <= 32,
        FormatSnafu {
            msg: format!("slot width {width} exceeds 32 bits")
        }
    );
    (0..count)
        .map(|i| read_bits(encoded, offset + i * width, width))
        .collect()
}

/// Encoded size of the numbers in bits, width header included.
pub fn encoded_size_bits(numbers: &[u32]) -> usize {
    if numbers.is_empty() {
        return 0;
    }
    let width = width_for(numbers);
    width * numbers.len() + vbyte::encoded_size_bits(&[width as u32])
}
