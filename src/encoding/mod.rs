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

//! Codecs for sequences of unsigned 32-bit integers.
//!
//! Every codec is a pure pipeline: `encode` maps a list of numbers to a
//! compact byte or 32-bit-word stream and `decode` recovers the original
//! list exactly. Codecs compose by convention at the call site, typically
//! [`gaps`] first and then a bit-level codec over the gap stream.

use bytes::Bytes;

use crate::bits::validate_padding;
use crate::error::Result;

pub mod bitpacking;
pub mod elias_fano;
pub mod gamma;
pub mod gaps;
pub mod pfor;
pub mod simple16;
pub mod unary;
pub mod vbyte;

/// An immutable byte stream packed at bit granularity.
///
/// `padding` is the number of unused low-order bits in the final byte, in
/// `[0, 7]`; 0 means the last byte is fully used. Decoders do not need the
/// padding (declared element counts drive every read), but it is part of
/// each codec's contract so that streams can be concatenated losslessly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedBytes {
    bytes: Bytes,
    padding: u8,
}

impl PackedBytes {
    pub fn new(bytes: Bytes, padding: u8) -> Result<Self> {
        validate_padding(padding)?;
        Ok(Self { bytes, padding })
    }

    pub(crate) fn from_parts(bytes: Bytes, padding: u8) -> Self {
        debug_assert!(padding < 8, "padding must be in range [0, 7]");
        Self { bytes, padding }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn padding(&self) -> u8 {
        self.padding
    }

    /// Number of meaningful bits in the stream.
    pub fn bit_len(&self) -> usize {
        self.bytes.len() * 8 - self.padding as usize
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}
