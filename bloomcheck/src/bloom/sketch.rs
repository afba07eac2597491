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

use std::fmt;
use std::io;

use tracing::warn;

use super::BloomFilterBuilder;
use super::builder::check_num_bits;
use super::builder::check_num_hashes;
use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::error::Error;
use crate::hash::BitIndices;

/// Size of the persisted header: 8-byte size followed by a 4-byte hash count.
const HEADER_BYTES: usize = 12;

/// A Bloom filter over byte-string keys.
///
/// Provides fast membership queries with:
/// - No false negatives (inserted keys always return `true` until [`clear()`](Self::clear))
/// - Tunable false positive rate
/// - Size and hash count fixed at construction
///
/// The filter never stores the keys. It also does not count insertions, so the
/// caller supplies the number of distinct keys it inserted to
/// [`estimate_false_positive_rate()`](Self::estimate_false_positive_rate).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BloomFilter {
    /// Total number of bits in the filter (m)
    num_bits: u64,
    /// Number of bit positions per key (k)
    num_hashes: u32,
    /// Count of bits set to 1
    num_bits_set: u64,
    /// Bit array packed into u64 words, bit i in word i / 64 at position i % 64.
    /// Length = ceil(num_bits / 64); bits at positions >= num_bits are always 0.
    bit_array: Box<[u64]>,
}

impl BloomFilter {
    /// Creates an empty filter with `size` bits and `hash_count` hash functions.
    ///
    /// # Errors
    ///
    /// Fails if `hash_count` is 0 or `size` is outside
    /// [`MIN_NUM_BITS`](super::MIN_NUM_BITS)..=[`MAX_NUM_BITS`](super::MAX_NUM_BITS).
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomcheck::bloom::BloomFilter;
    /// let filter = BloomFilter::new(1024, 3).unwrap();
    /// assert_eq!(filter.size(), 1024);
    /// assert_eq!(filter.hash_count(), 3);
    /// assert!(filter.is_empty());
    /// ```
    pub fn new(size: u64, hash_count: u32) -> Result<Self, Error> {
        Ok(BloomFilterBuilder::with_size(size, hash_count)?.build())
    }

    /// Creates an empty filter sized for `expected_items` keys at false positive rate `fpp`.
    ///
    /// See [`BloomFilterBuilder::with_accuracy()`] for the formulas and error conditions.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomcheck::bloom::BloomFilter;
    /// let filter = BloomFilter::new_optimal(1000, 0.01).unwrap();
    /// assert_eq!(filter.size(), 9586);
    /// assert_eq!(filter.hash_count(), 7);
    /// ```
    pub fn new_optimal(expected_items: u64, fpp: f64) -> Result<Self, Error> {
        Ok(BloomFilterBuilder::with_accuracy(expected_items, fpp)?.build())
    }

    pub(super) fn zeroed(num_bits: u64, num_hashes: u32) -> Self {
        let num_words = num_bits.div_ceil(64) as usize;
        BloomFilter {
            num_bits,
            num_hashes,
            num_bits_set: 0,
            bit_array: vec![0u64; num_words].into_boxed_slice(),
        }
    }

    // ========================================================================
    // Query Operations
    // ========================================================================

    /// Tests whether a key is possibly in the set.
    ///
    /// Returns:
    /// - `true`: key was **possibly** inserted (or false positive)
    /// - `false`: key was **definitely not** inserted
    ///
    /// Stops at the first unset bit.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomcheck::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new_optimal(100, 0.01).unwrap();
    /// filter.insert("notes.txt");
    ///
    /// assert!(filter.might_contain("notes.txt"));
    /// assert!(!filter.might_contain("photo.png"));
    /// ```
    pub fn might_contain(&self, key: impl AsRef<[u8]>) -> bool {
        self.indices(key.as_ref())
            .all(|bit_index| self.get_bit(bit_index))
    }

    // ========================================================================
    // Update Operations
    // ========================================================================

    /// Inserts a key into the filter.
    ///
    /// After insertion, `might_contain(key)` returns `true` until the filter is cleared.
    /// Inserting the same key again changes nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomcheck::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(64, 2).unwrap();
    ///
    /// filter.insert("a.txt");
    /// filter.insert(String::from("b.txt"));
    /// filter.insert([0xde_u8, 0xad, 0xbe, 0xef]);
    ///
    /// assert!(filter.might_contain(b"a.txt"));
    /// ```
    pub fn insert(&mut self, key: impl AsRef<[u8]>) {
        for bit_index in self.indices(key.as_ref()) {
            self.set_bit(bit_index);
        }
    }

    /// Resets every bit to 0 while preserving size and hash count.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomcheck::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new_optimal(100, 0.01).unwrap();
    /// filter.insert("apple");
    /// assert!(!filter.is_empty());
    ///
    /// filter.clear();
    /// assert!(filter.is_empty());
    /// assert!(!filter.might_contain("apple"));
    /// ```
    pub fn clear(&mut self) {
        self.bit_array.fill(0);
        self.num_bits_set = 0;
    }

    // ========================================================================
    // Statistics and Properties
    // ========================================================================

    /// Returns the total number of bits in the filter (m).
    pub fn size(&self) -> u64 {
        self.num_bits
    }

    /// Returns the number of bit positions touched per key (k).
    pub fn hash_count(&self) -> u32 {
        self.num_hashes
    }

    /// Returns the number of bits set to 1.
    pub fn bits_set(&self) -> u64 {
        self.num_bits_set
    }

    /// Returns whether no bit is set.
    pub fn is_empty(&self) -> bool {
        self.num_bits_set == 0
    }

    /// Returns the fraction of bits set to 1.
    pub fn density(&self) -> f64 {
        self.num_bits_set as f64 / self.num_bits as f64
    }

    /// Estimates the false positive rate after `inserted_count` distinct insertions.
    ///
    /// Formula: `(1 - e^(-k * n / m))^k`, and exactly 0 when `n` is 0.
    ///
    /// The count comes from the caller; repeated inserts of one key should be
    /// counted once.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomcheck::bloom::BloomFilter;
    /// let filter = BloomFilter::new_optimal(1000, 0.01).unwrap();
    /// assert_eq!(filter.estimate_false_positive_rate(0), 0.0);
    ///
    /// let fpr = filter.estimate_false_positive_rate(1000);
    /// assert!((fpr - 0.01).abs() < 0.001);
    /// ```
    pub fn estimate_false_positive_rate(&self, inserted_count: u64) -> f64 {
        if inserted_count == 0 {
            return 0.0;
        }
        let k = f64::from(self.num_hashes);
        let exponent = -k * inserted_count as f64 / self.num_bits as f64;
        (1.0 - exponent.exp()).powf(k)
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Serializes the filter to its persisted byte image.
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomcheck::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new(8, 3).unwrap();
    /// filter.insert("a"); // bits 6, 7 and 0
    ///
    /// let bytes = filter.serialize();
    /// assert_eq!(&bytes[..8], &8u64.to_ne_bytes());
    /// assert_eq!(&bytes[8..12], &3u32.to_ne_bytes());
    /// assert_eq!(&bytes[12..], &[0b1100_0001]);
    /// ```
    pub fn serialize(&self) -> Vec<u8> {
        let num_bytes = self.num_bytes();
        let mut bytes = SketchBytes::with_capacity(HEADER_BYTES + num_bytes);

        bytes.write_u64_ne(self.num_bits);
        bytes.write_u32_ne(self.num_hashes);

        // Little-endian word bytes put bit i at byte i / 8, position i % 8.
        let mut remaining = num_bytes;
        for &word in self.bit_array.iter() {
            let chunk = word.to_le_bytes();
            let n = remaining.min(chunk.len());
            bytes.write(&chunk[..n]);
            remaining -= n;
        }

        bytes.into_bytes()
    }

    /// Deserializes a filter from its persisted byte image.
    ///
    /// Bits beyond `size` in the last payload byte are ignored. Bytes after the
    /// payload are ignored with a warning.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Io`](crate::error::ErrorKind::Io) if the header or payload is truncated
    /// - [`ErrorKind::InvalidData`](crate::error::ErrorKind::InvalidData) if the header
    ///   describes an impossible filter
    ///
    /// # Examples
    ///
    /// ```
    /// # use bloomcheck::bloom::BloomFilter;
    /// let mut original = BloomFilter::new_optimal(100, 0.01).unwrap();
    /// original.insert("test");
    ///
    /// let restored = BloomFilter::deserialize(&original.serialize()).unwrap();
    /// assert_eq!(original, restored);
    /// assert!(restored.might_contain("test"));
    /// ```
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let mut cursor = SketchSlice::new(bytes);

        let num_bits = cursor
            .read_u64_ne()
            .map_err(|err| Error::truncated("size", err))?;
        let num_hashes = cursor
            .read_u32_ne()
            .map_err(|err| Error::truncated("hash_count", err))?;

        check_num_bits(num_bits).map_err(Error::invalid_data)?;
        check_num_hashes(num_hashes).map_err(Error::invalid_data)?;

        // Check the payload length before allocating anything sized by the header.
        let num_bytes = num_bits.div_ceil(8) as usize;
        let available = cursor.remaining();
        if available < num_bytes {
            let err = io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {num_bytes} bytes, found {available}"),
            );
            return Err(Error::truncated("bit_array", err)
                .with_context("size", num_bits)
                .with_context("hash_count", num_hashes));
        }

        let mut filter = BloomFilter::zeroed(num_bits, num_hashes);
        let mut chunk = [0u8; 8];
        let mut remaining = num_bytes;
        for word in filter.bit_array.iter_mut() {
            let n = remaining.min(chunk.len());
            chunk.fill(0);
            cursor
                .read_exact(&mut chunk[..n])
                .map_err(|err| Error::truncated("bit_array", err))?;
            *word = u64::from_le_bytes(chunk);
            remaining -= n;
        }
        filter.mask_excess_bits();
        filter.recount_bits_set();

        let trailing = cursor.remaining();
        if trailing > 0 {
            warn!(trailing, "ignoring bytes after bloom filter payload");
        }

        Ok(filter)
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn indices(&self, key: &[u8]) -> BitIndices {
        BitIndices::new(key, self.num_hashes, self.num_bits)
    }

    /// Number of bytes in the packed payload.
    fn num_bytes(&self) -> usize {
        self.num_bits.div_ceil(8) as usize
    }

    fn get_bit(&self, bit_index: u64) -> bool {
        let word_index = (bit_index / 64) as usize;
        let mask = 1u64 << (bit_index % 64);
        (self.bit_array[word_index] & mask) != 0
    }

    /// Sets a single bit and updates the count if it wasn't already set.
    fn set_bit(&mut self, bit_index: u64) {
        let word_index = (bit_index / 64) as usize;
        let mask = 1u64 << (bit_index % 64);

        if (self.bit_array[word_index] & mask) == 0 {
            self.bit_array[word_index] |= mask;
            self.num_bits_set += 1;
        }
    }

    /// Zeroes the bits past `num_bits` in the last word.
    fn mask_excess_bits(&mut self) {
        let excess_bits = self.num_bits % 64;
        if excess_bits != 0 {
            if let Some(last) = self.bit_array.last_mut() {
                *last &= (1u64 << excess_bits) - 1;
            }
        }
    }

    fn recount_bits_set(&mut self) {
        self.num_bits_set = self
            .bit_array
            .iter()
            .map(|word| u64::from(word.count_ones()))
            .sum();
    }
}

/// Renders the bit array as a string of `0` and `1`, bit 0 first.
impl fmt::Display for BloomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit_index in 0..self.num_bits {
            f.write_str(if self.get_bit(bit_index) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_insert_sets_expected_bits() {
        let mut filter = BloomFilter::new(8, 3).unwrap();
        filter.insert("a");
        assert_eq!(filter.to_string(), "10000011");
        assert_eq!(filter.bits_set(), 3);
    }

    #[test]
    fn test_duplicate_insert_is_noop() {
        let mut filter = BloomFilter::new(128, 4).unwrap();
        filter.insert("same");
        let snapshot = filter.clone();
        filter.insert("same");
        assert_eq!(filter, snapshot);
    }

    #[test]
    fn test_statistics() {
        let mut filter = BloomFilter::new(8, 3).unwrap();
        assert!(filter.is_empty());
        assert_eq!(filter.density(), 0.0);

        filter.insert("a");
        assert!(!filter.is_empty());
        assert_eq!(filter.density(), 3.0 / 8.0);
    }

    #[test]
    fn test_serialize_bit_order_across_bytes() {
        let mut filter = BloomFilter::new(12, 1).unwrap();
        filter.insert("a"); // djb2("a") mod 12 = 10
        let bytes = filter.serialize();
        assert_eq!(bytes.len(), HEADER_BYTES + 2);
        assert_eq!(&bytes[HEADER_BYTES..], &[0x00, 0x04]);
    }

    #[test]
    fn test_serialize_length_spans_words() {
        let filter = BloomFilter::new(130, 2).unwrap();
        assert_eq!(filter.serialize().len(), HEADER_BYTES + 17);
    }

    #[test]
    fn test_deserialize_masks_excess_bits() {
        let mut bytes = BloomFilter::new(12, 1).unwrap().serialize();
        bytes[HEADER_BYTES + 1] = 0xF0; // bits 12..15 lie past the end
        let filter = BloomFilter::deserialize(&bytes).unwrap();
        assert!(filter.is_empty());
        assert_eq!(filter.serialize()[HEADER_BYTES + 1], 0x00);
    }

    #[test]
    fn test_deserialize_rejects_impossible_header() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&64u64.to_ne_bytes());
        bytes.extend_from_slice(&0u32.to_ne_bytes());
        bytes.extend_from_slice(&[0u8; 8]);
        let err = BloomFilter::deserialize(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0u64.to_ne_bytes());
        bytes.extend_from_slice(&1u32.to_ne_bytes());
        let err = BloomFilter::deserialize(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_deserialize_huge_size_without_payload() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&crate::bloom::MAX_NUM_BITS.to_ne_bytes());
        bytes.extend_from_slice(&7u32.to_ne_bytes());
        let err = BloomFilter::deserialize(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
