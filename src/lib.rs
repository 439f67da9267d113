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

//! Integer-sequence codecs for inverted-index posting lists.
//!
//! The [`encoding`] module holds the codecs: [`encoding::gaps`],
//! [`encoding::vbyte`], [`encoding::unary`], [`encoding::gamma`],
//! [`encoding::simple16`], [`encoding::bitpacking`], [`encoding::pfor`] and
//! [`encoding::elias_fano`]. All of them share the bit-level substrate in
//! [`bits`] and [`bitbytearray`].
//!
//! Every codec is a pure pipeline over caller-owned buffers: encoding maps
//! a list of `u32` to a compact byte or 32-bit-word stream, decoding maps
//! the stream (plus the declared element count, where the format needs one)
//! back to the exact original list. Nothing here performs I/O or keeps
//! state between calls, so distinct inputs can be processed from any number
//! of threads without synchronization.

pub mod bitbytearray;
pub mod bits;
pub mod encoding;
pub mod error;

pub use bitbytearray::BitByteArray;
pub use encoding::PackedBytes;
pub use error::{CodecError, Result};
