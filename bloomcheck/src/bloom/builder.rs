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

use std::f64::consts::LN_2;

use tracing::debug;

use super::BloomFilter;
use crate::error::Error;

/// Smallest accepted bit count.
pub const MIN_NUM_BITS: u64 = 8;
/// Largest accepted bit count (512 MiB of bit storage).
pub const MAX_NUM_BITS: u64 = 1 << 35;
/// Smallest accepted hash count.
pub const MIN_NUM_HASHES: u32 = 1;

/// Builder for creating [`BloomFilter`] instances.
///
/// Provides two construction modes:
/// - [`with_accuracy()`](Self::with_accuracy): derive size and hash count from the
///   expected item count and a target false positive rate
/// - [`with_size()`](Self::with_size): specify exact bit count and hash count
///
/// Both validate their inputs up front, so [`build()`](Self::build) cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloomFilterBuilder {
    num_bits: u64,
    num_hashes: u32,
}

impl BloomFilterBuilder {
    /// Creates a builder with optimal parameters for a target accuracy.
    ///
    /// - size: `ceil(-n * ln(p) / ln(2)^2)`, at least [`MIN_NUM_BITS`]
    /// - hash count: `ceil(size / n * ln(2))`, at least [`MIN_NUM_HASHES`]
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParameter`](crate::error::ErrorKind::InvalidParameter) if
    /// `expected_items` is 0, `fpp` is not strictly between 0 and 1, or the derived
    /// size exceeds [`MAX_NUM_BITS`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomcheck::bloom::BloomFilterBuilder;
    /// let builder = BloomFilterBuilder::with_accuracy(1000, 0.01).unwrap();
    /// assert_eq!(builder.num_bits(), 9586);
    /// assert_eq!(builder.num_hashes(), 7);
    ///
    /// assert!(BloomFilterBuilder::with_accuracy(0, 0.01).is_err());
    /// assert!(BloomFilterBuilder::with_accuracy(1000, 1.0).is_err());
    /// ```
    pub fn with_accuracy(expected_items: u64, fpp: f64) -> Result<Self, Error> {
        if expected_items == 0 {
            return Err(Error::invalid_parameter(
                "expected items must be greater than 0",
            ));
        }
        if !(fpp > 0.0 && fpp < 1.0) {
            return Err(
                Error::invalid_parameter("false positive rate must be in (0, 1)")
                    .with_context("fpp", fpp),
            );
        }

        let num_bits = Self::suggest_num_bits(expected_items, fpp);
        if num_bits > MAX_NUM_BITS {
            return Err(
                Error::invalid_parameter(format!("derived size exceeds {MAX_NUM_BITS} bits"))
                    .with_context("expected_items", expected_items)
                    .with_context("fpp", fpp)
                    .with_context("num_bits", num_bits),
            );
        }
        let num_hashes = Self::suggest_num_hashes(expected_items, num_bits);

        Ok(BloomFilterBuilder {
            num_bits,
            num_hashes,
        })
    }

    /// Creates a builder with manual size specification.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidParameter`](crate::error::ErrorKind::InvalidParameter) if
    /// `num_bits` is outside [`MIN_NUM_BITS`]..=[`MAX_NUM_BITS`] or `num_hashes` is 0.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomcheck::bloom::BloomFilterBuilder;
    /// let filter = BloomFilterBuilder::with_size(10_000, 7).unwrap().build();
    /// assert_eq!(filter.size(), 10_000);
    ///
    /// assert!(BloomFilterBuilder::with_size(10_000, 0).is_err());
    /// assert!(BloomFilterBuilder::with_size(4, 1).is_err());
    /// ```
    pub fn with_size(num_bits: u64, num_hashes: u32) -> Result<Self, Error> {
        check_num_bits(num_bits).map_err(Error::invalid_parameter)?;
        check_num_hashes(num_hashes).map_err(Error::invalid_parameter)?;

        Ok(BloomFilterBuilder {
            num_bits,
            num_hashes,
        })
    }

    /// Returns the bit count the built filter will have.
    pub fn num_bits(&self) -> u64 {
        self.num_bits
    }

    /// Returns the hash count the built filter will use.
    pub fn num_hashes(&self) -> u32 {
        self.num_hashes
    }

    /// Builds an empty Bloom filter.
    pub fn build(self) -> BloomFilter {
        debug!(
            num_bits = self.num_bits,
            num_hashes = self.num_hashes,
            "created bloom filter"
        );
        BloomFilter::zeroed(self.num_bits, self.num_hashes)
    }

    /// Suggests the number of bits for `expected_items` keys at target FPR `fpp`.
    ///
    /// Formula: `m = ceil(-n * ln(p) / (ln(2)^2))`, raised to at least [`MIN_NUM_BITS`].
    /// The result is not capped; [`with_accuracy()`](Self::with_accuracy) rejects
    /// values above [`MAX_NUM_BITS`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomcheck::bloom::BloomFilterBuilder;
    /// assert_eq!(BloomFilterBuilder::suggest_num_bits(1000, 0.01), 9586);
    /// assert_eq!(BloomFilterBuilder::suggest_num_bits(1, 0.5), 8); // raised from 2
    /// ```
    pub fn suggest_num_bits(expected_items: u64, fpp: f64) -> u64 {
        let n = expected_items as f64;
        let ln2_squared = LN_2 * LN_2;

        let bits = (-n * fpp.ln() / ln2_squared).ceil() as u64;
        bits.max(MIN_NUM_BITS)
    }

    /// Suggests the number of hash functions for `expected_items` keys in `num_bits` bits.
    ///
    /// Formula: `k = ceil((m / n) * ln(2))`, raised to at least [`MIN_NUM_HASHES`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomcheck::bloom::BloomFilterBuilder;
    /// assert_eq!(BloomFilterBuilder::suggest_num_hashes(1000, 9586), 7);
    /// assert_eq!(BloomFilterBuilder::suggest_num_hashes(1000, 8), 1);
    /// ```
    pub fn suggest_num_hashes(expected_items: u64, num_bits: u64) -> u32 {
        let m = num_bits as f64;
        let n = expected_items as f64;

        let k = (m / n * LN_2).ceil() as u32;
        k.max(MIN_NUM_HASHES)
    }
}

pub(super) fn check_num_bits(num_bits: u64) -> Result<(), String> {
    if num_bits < MIN_NUM_BITS {
        return Err(format!(
            "size must be at least {MIN_NUM_BITS} bits, got {num_bits}"
        ));
    }
    if num_bits > MAX_NUM_BITS {
        return Err(format!(
            "size must not exceed {MAX_NUM_BITS} bits, got {num_bits}"
        ));
    }
    Ok(())
}

pub(super) fn check_num_hashes(num_hashes: u32) -> Result<(), String> {
    if num_hashes < MIN_NUM_HASHES {
        return Err(format!(
            "hash count must be at least {MIN_NUM_HASHES}, got {num_hashes}"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_optimal_parameters_n1000_fpr001() {
        let builder = BloomFilterBuilder::with_accuracy(1000, 0.01).unwrap();
        assert_eq!(builder.num_bits(), 9586);
        assert_eq!(builder.num_hashes(), 7);
    }

    #[test]
    fn test_optimal_parameters_n10_fpr001() {
        let builder = BloomFilterBuilder::with_accuracy(10, 0.01).unwrap();
        assert_eq!(builder.num_bits(), 96);
        assert_eq!(builder.num_hashes(), 7);
    }

    #[test]
    fn test_optimal_parameters_respect_minimums() {
        let cases = [
            (1, 0.999_999),
            (1, 0.5),
            (3, 0.9),
            (1, 1e-9),
            (1_000_000, 0.5),
            (u64::from(u32::MAX), 0.99),
        ];
        for (n, p) in cases {
            let builder = BloomFilterBuilder::with_accuracy(n, p).unwrap();
            assert!(builder.num_bits() >= MIN_NUM_BITS, "n={n} p={p}");
            assert!(builder.num_hashes() >= MIN_NUM_HASHES, "n={n} p={p}");
        }
    }

    #[test]
    fn test_lower_fpr_needs_more_bits() {
        let loose = BloomFilterBuilder::suggest_num_bits(100, 0.1);
        let tight = BloomFilterBuilder::suggest_num_bits(100, 0.01);
        assert!(tight > loose);
    }

    #[test]
    fn test_invalid_expected_items() {
        let err = BloomFilterBuilder::with_accuracy(0, 0.01).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_invalid_fpp() {
        for fpp in [0.0, 1.0, -0.5, 1.5, f64::NAN, f64::INFINITY] {
            let err = BloomFilterBuilder::with_accuracy(100, fpp).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidParameter, "fpp={fpp}");
        }
    }

    #[test]
    fn test_derived_size_too_large() {
        let err = BloomFilterBuilder::with_accuracy(u64::MAX, 1e-12).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_with_size_bounds() {
        assert!(BloomFilterBuilder::with_size(MIN_NUM_BITS, 1).is_ok());
        assert!(BloomFilterBuilder::with_size(MAX_NUM_BITS, 1).is_ok());

        let too_small = BloomFilterBuilder::with_size(MIN_NUM_BITS - 1, 1).unwrap_err();
        assert_eq!(too_small.kind(), ErrorKind::InvalidParameter);
        let too_large = BloomFilterBuilder::with_size(MAX_NUM_BITS + 1, 1).unwrap_err();
        assert_eq!(too_large.kind(), ErrorKind::InvalidParameter);
        let no_hashes = BloomFilterBuilder::with_size(64, 0).unwrap_err();
        assert_eq!(no_hashes.kind(), ErrorKind::InvalidParameter);
        assert_eq!(no_hashes.message(), "hash count must be at least 1, got 0");
    }
}
