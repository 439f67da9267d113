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

//! Gap (delta) encoding of sorted sequences.

use snafu::ensure;

use crate::error::{InvalidInputSnafu, Result};

/// Rewrite a non-decreasing sequence as its first element followed by the
/// differences between consecutive elements.
pub fn encode(numbers: &[u32]) -> Result<Vec<u32>> {
    ensure!(
        !numbers.is_empty(),
        InvalidInputSnafu {
            msg: "cannot gap-encode an empty sequence"
        }
    );
    let mut gaps = Vec::with_capacity(numbers.len());
    gaps.push(numbers[0]);
    for pair in numbers.windows(2) {
        ensure!(
            pair[1] >= pair[0],
            InvalidInputSnafu {
                msg: format!("sequence decreases from {} to {}", pair[0], pair[1])
            }
        );
        gaps.push(pair[1] - pair[0]);
    }
    Ok(gaps)
}

/// Prefix-sum inverse of [`encode`].
pub fn decode(gaps: &[u32]) -> Vec<u32> {
    let mut current = 0u32;
    gaps.iter()
        .map(|&gap| {
            current += gap;
            current
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn encode_posting_list() {
        let numbers = [1000, 1001, 1009, 2000, 2009];
        let gaps = encode(&numbers).unwrap();
        assert_eq!(gaps, vec![1000, 1, 8, 991, 9]);
        assert_eq!(decode(&gaps), numbers);
    }

    #[test]
    fn repeated_values_produce_zero_gaps() {
        let gaps = encode(&[7, 7, 7]).unwrap();
        assert_eq!(gaps, vec![7, 0, 0]);
        assert_eq!(decode(&gaps), vec![7, 7, 7]);
    }

    #[test]
    fn rejects_empty_and_decreasing_input() {
        assert!(matches!(
            encode(&[]).unwrap_err(),
            CodecError::InvalidInput { .. }
        ));
        assert!(encode(&[3, 2]).is_err());
    }

    #[test]
    fn decode_of_empty_is_empty() {
        assert_eq!(decode(&[]), Vec::<u32>::new());
    }

    proptest! {
        #[test]
        fn roundtrip_sorted_sequences(
            mut numbers in prop::collection::vec(0..=1_000_000u32, 1..=512)
        ) {
            numbers.sort_unstable();
            let gaps = encode(&numbers)?;
            prop_assert_eq!(decode(&gaps), numbers);
        }
    }
}
