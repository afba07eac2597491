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

use super::djb2;
use super::sdbm;

/// Computes the `i`-th bit index of `key` in a filter of `num_bits` bits.
///
/// Formula: `(h1 + i * h2) mod num_bits`, where `h1 = djb2(key) mod num_bits`
/// and `h2 = sdbm(key) mod num_bits`.
///
/// # Panics
///
/// Panics if `num_bits` is 0.
///
/// # Examples
///
/// ```
/// # use bloomcheck::hash::bit_index;
/// assert_eq!(bit_index(b"a", 0, 8), 6);
/// assert_eq!(bit_index(b"a", 1, 8), 7);
/// ```
pub fn bit_index(key: &[u8], i: u32, num_bits: u64) -> u64 {
    let h1 = djb2(key) % num_bits;
    let h2 = sdbm(key) % num_bits;
    combine(h1, h2, i, num_bits)
}

fn combine(h1: u64, h2: u64, i: u32, num_bits: u64) -> u64 {
    h1.wrapping_add(u64::from(i).wrapping_mul(h2)) % num_bits
}

/// Iterator over the `num_hashes` bit indices of one key.
///
/// Both base hashes are computed once up front; each step is a single
/// multiply-add.
///
/// # Examples
///
/// ```
/// # use bloomcheck::hash::BitIndices;
/// let indices: Vec<u64> = BitIndices::new(b"a", 3, 8).collect();
/// assert_eq!(indices, vec![6, 7, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct BitIndices {
    h1: u64,
    h2: u64,
    num_bits: u64,
    next: u32,
    num_hashes: u32,
}

impl BitIndices {
    /// # Panics
    ///
    /// Panics if `num_bits` is 0.
    pub fn new(key: &[u8], num_hashes: u32, num_bits: u64) -> Self {
        BitIndices {
            h1: djb2(key) % num_bits,
            h2: sdbm(key) % num_bits,
            num_bits,
            next: 0,
            num_hashes,
        }
    }
}

impl Iterator for BitIndices {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.next >= self.num_hashes {
            return None;
        }
        let index = combine(self.h1, self.h2, self.next, self.num_bits);
        self.next += 1;
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.num_hashes - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BitIndices {}
