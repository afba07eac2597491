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

//! Bloom filter engine for probabilistic file and name existence checks.
//!
//! A Bloom filter answers "possibly present" or "definitely absent" for a key
//! without storing the keys themselves. False positives are possible, false
//! negatives are not.
//!
//! # Properties
//!
//! - **No false negatives**: If a key was inserted, `might_contain()` returns `true`
//!   until the filter is cleared
//! - **Possible false positives**: `might_contain()` may return `true` for keys never inserted
//! - **Fixed size**: size and hash count never change after construction
//! - **No removal**: individual keys cannot be deleted, only the whole filter cleared
//!
//! # Usage
//!
//! ```rust
//! use bloomcheck::bloom::BloomFilter;
//!
//! // Create a filter sized for 1000 keys with a 1% false positive rate
//! let mut filter = BloomFilter::new_optimal(1000, 0.01).unwrap();
//!
//! filter.insert("src/main.rs");
//! filter.insert(b"raw/bytes.bin");
//!
//! assert!(filter.might_contain("src/main.rs"));
//! assert!(!filter.might_contain("src/missing.rs")); // definitely absent (probably)
//!
//! // The filter does not count insertions; callers pass their own count.
//! println!("Est. FPR: {:.4}%", filter.estimate_false_positive_rate(2) * 100.0);
//! ```
//!
//! # Creating Filters
//!
//! ## By Accuracy
//!
//! ```rust
//! # use bloomcheck::bloom::BloomFilterBuilder;
//! let filter = BloomFilterBuilder::with_accuracy(
//!     1000, // Expected items
//!     0.01, // Target false positive rate (1%)
//! )
//! .unwrap()
//! .build();
//! assert_eq!(filter.size(), 9586);
//! assert_eq!(filter.hash_count(), 7);
//! ```
//!
//! ## By Size
//!
//! ```rust
//! # use bloomcheck::bloom::BloomFilterBuilder;
//! let filter = BloomFilterBuilder::with_size(
//!     10_000, // Number of bits
//!     7,      // Number of hash functions
//! )
//! .unwrap()
//! .build();
//! ```
//!
//! # Persistence
//!
//! The persisted image is a 12-byte header followed by the packed bits:
//!
//! | Offset | Field      | Width              |
//! |--------|------------|--------------------|
//! | 0      | size (m)   | 8 bytes, native    |
//! | 8      | hash count | 4 bytes, native    |
//! | 12     | bits       | ceil(m / 8) bytes  |
//!
//! Bit `i` lives in byte `i / 8` at bit position `i % 8` (least significant first).
//!
//! # Implementation Details
//!
//! - djb2 and sdbm base hashes, see [`crate::hash`]
//! - Double hashing `(h1 + i * h2) mod m` for the k indices
//! - Bits packed in `u64` words

mod builder;
mod file;
mod sketch;

pub use self::builder::BloomFilterBuilder;
pub use self::builder::MAX_NUM_BITS;
pub use self::builder::MIN_NUM_BITS;
pub use self::builder::MIN_NUM_HASHES;
pub use self::sketch::BloomFilter;
