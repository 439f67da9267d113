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

//! Variable-byte codec.
//!
//! Numbers are emitted as base-128 digits, most significant first, with the
//! high bit set on a number's final byte as terminator: 300 encodes as
//! `[0x02, 0xAC]`. Streams are the plain concatenation of encoded numbers.

use bytes::{BufMut, Bytes, BytesMut};
use snafu::ensure;

use crate::bits::bits_used;
use crate::error::{BufferUnderrunSnafu, FormatSnafu, Result};

/// Encode one number, appending its bytes to `writer`.
pub fn encode_into(writer: &mut BytesMut, number: u32) {
    // At most five base-128 digits for 32 bits, least significant first.
    let mut digits = [0u8; 5];
    let mut count = 0;
    let mut remaining = number;
    loop {
        digits[count] = (remaining & 0x7F) as u8;
        count += 1;
        if remaining < 0x80 {
            break;
        }
        remaining >>= 7;
    }
    // The terminator travels on the last emitted (least significant) digit.
    digits[0] |= 0x80;
    for i in (0..count).rev() {
        writer.put_u8(digits[i]);
    }
}

/// Encode one number as a standalone byte string.
pub fn encode(number: u32) -> Bytes {
    let mut writer = BytesMut::with_capacity(5);
    encode_into(&mut writer, number);
    writer.freeze()
}

/// Decode a single number starting at `bit_offset` (rounded down to its
/// byte). Returns the number and the bit offset just past its terminator.
pub fn decode_one(encoded: &[u8], bit_offset: usize) -> Result<(u32, usize)> {
    let mut number: u32 = 0;
    let start = bit_offset >> 3;
    for (i, &byte) in encoded.iter().enumerate().skip(start) {
        ensure!(
            number <= (u32::MAX >> 7),
            FormatSnafu {
                msg: "variable-byte value exceeds 32 bits"
            }
        );
        number = (number << 7) | (byte & 0x7F) as u32;
        if byte & 0x80 != 0 {
            return Ok((number, (i + 1) * 8));
        }
    }
    BufferUnderrunSnafu {
        bit_offset: encoded.len() * 8,
    }
    .fail()
}

/// Decode every number in the stream. A stream ending inside a number (no
/// terminator byte) is an error.
pub fn decode(encoded: &[u8]) -> Result<Vec<u32>> {
    let mut numbers = vec![];
    let mut offset = 0;
    while offset < encoded.len() * 8 {
        let (number, next) = decode_one(encoded, offset)?;
        numbers.push(number);
        offset = next;
    }
    Ok(numbers)
}

/// Encoded size of the numbers in bits: whole bytes, terminator overhead
/// included.
pub fn encoded_size_bits(numbers: &[u32]) -> usize {
    numbers
        .iter()
        .map(|&number| {
            let required = bits_used(number).max(1);
            let with_overhead = required + required.div_ceil(8);
            with_overhead.div_ceil(8) * 8
        })
        .sum()
}
