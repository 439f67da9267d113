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

use snafu::prelude::*;
use snafu::Location;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CodecError {
    #[snafu(display("padding must be in range [0, 7], got {}", padding))]
    InvalidPadding {
        padding: u8,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("invalid input: {}", msg))]
    InvalidInput {
        msg: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("buffer too short for read at bit {}", bit_offset))]
    BufferUnderrun {
        bit_offset: usize,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("malformed encoding: {}", msg))]
    FormatError {
        msg: String,
        #[snafu(implicit)]
        location: Location,
    },
}

pub type Result<T, E = CodecError> = std::result::Result<T, E>;
