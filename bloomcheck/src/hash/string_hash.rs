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

use std::hash::Hasher;

const DJB2_SEED: u64 = 5381;
const SDBM_SEED: u64 = 0;

/// Dan Bernstein's djb2 string hash: `hash = hash * 33 + byte`, seeded with 5381.
///
/// All arithmetic wraps at 64 bits.
#[derive(Debug, Clone, Copy)]
pub struct Djb2Hasher {
    hash: u64,
}

impl Default for Djb2Hasher {
    fn default() -> Self {
        Djb2Hasher { hash: DJB2_SEED }
    }
}

impl Hasher for Djb2Hasher {
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.hash = (self.hash << 5)
                .wrapping_add(self.hash)
                .wrapping_add(u64::from(b));
        }
    }
}

/// The sdbm string hash: `hash = byte + (hash << 6) + (hash << 16) - hash`, seeded with 0.
///
/// All arithmetic wraps at 64 bits.
#[derive(Debug, Clone, Copy)]
pub struct SdbmHasher {
    hash: u64,
}

impl Default for SdbmHasher {
    fn default() -> Self {
        SdbmHasher { hash: SDBM_SEED }
    }
}

impl Hasher for SdbmHasher {
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.hash = u64::from(b)
                .wrapping_add(self.hash << 6)
                .wrapping_add(self.hash << 16)
                .wrapping_sub(self.hash);
        }
    }
}

/// Returns the djb2 hash of `key`.
pub fn djb2(key: &[u8]) -> u64 {
    let mut hasher = Djb2Hasher::default();
    hasher.write(key);
    hasher.finish()
}

/// Returns the sdbm hash of `key`.
pub fn sdbm(key: &[u8]) -> u64 {
    let mut hasher = SdbmHasher::default();
    hasher.write(key);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_returns_seed() {
        assert_eq!(djb2(b""), 5381);
        assert_eq!(sdbm(b""), 0);
    }

    #[test]
    fn test_known_values() {
        assert_eq!(djb2(b"a"), 177_670);
        assert_eq!(sdbm(b"a"), 97);
        assert_eq!(djb2(b"hello"), 210_714_636_441);
        assert_eq!(sdbm(b"hello"), 7_416_051_667_693_574_450);
    }

    #[test]
    fn test_long_key_wraps_silently() {
        // 64 bytes is enough to overflow both accumulators many times over.
        let key = [0xFFu8; 64];
        assert_eq!(djb2(&key), djb2(&key));
        assert_eq!(sdbm(&key), sdbm(&key));
    }

    #[test]
    fn test_incremental_writes_match_one_shot() {
        let mut hasher = Djb2Hasher::default();
        hasher.write(b"rep");
        hasher.write(b"ort.txt");
        assert_eq!(hasher.finish(), djb2(b"report.txt"));

        let mut hasher = SdbmHasher::default();
        hasher.write(b"rep");
        hasher.write(b"ort.txt");
        assert_eq!(hasher.finish(), sdbm(b"report.txt"));
    }
}
