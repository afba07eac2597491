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

use std::fs;

use bloomcheck::bloom::BloomFilter;
use bloomcheck::error::ErrorKind;
use googletest::assert_that;
use googletest::prelude::contains_substring;
use googletest::prelude::eq;

const HEADER_BYTES: usize = 12;

fn populated_filter(size: u64, hash_count: u32, num_keys: usize) -> BloomFilter {
    let mut filter = BloomFilter::new(size, hash_count).unwrap();
    for i in 0..num_keys {
        filter.insert(format!("backup/{i:05}.tar.gz"));
    }
    filter
}

#[test]
fn test_byte_exact_layout() {
    let mut filter = BloomFilter::new(8, 3).unwrap();
    filter.insert("a");

    let mut expected = Vec::new();
    expected.extend_from_slice(&8u64.to_ne_bytes());
    expected.extend_from_slice(&3u32.to_ne_bytes());
    expected.push(0b1100_0001);
    assert_eq!(filter.serialize(), expected);
}

#[test]
fn test_payload_length() {
    for (size, payload) in [(8, 1), (9, 2), (64, 8), (65, 9), (9586, 1199)] {
        let filter = BloomFilter::new(size, 2).unwrap();
        assert_eq!(filter.serialize().len(), HEADER_BYTES + payload, "size {size}");
    }
}

#[test]
fn test_serialize_deserialize_empty() {
    let filter = BloomFilter::new_optimal(100, 0.01).unwrap();
    let restored = BloomFilter::deserialize(&filter.serialize()).unwrap();
    assert_eq!(filter, restored);
    assert!(restored.is_empty());
}

#[test]
fn test_serialize_deserialize_with_data() {
    for (size, hash_count) in [(8, 1), (13, 3), (1000, 7), (4097, 5)] {
        let filter = populated_filter(size, hash_count, 50);
        let bytes = filter.serialize();
        let restored = BloomFilter::deserialize(&bytes).unwrap();

        assert_eq!(restored.size(), filter.size());
        assert_eq!(restored.hash_count(), filter.hash_count());
        assert_eq!(restored.bits_set(), filter.bits_set());
        assert_eq!(restored.to_string(), filter.to_string());
        assert_eq!(restored, filter);
        assert_eq!(restored.serialize(), bytes);

        for i in 0..200 {
            let key = format!("backup/{i:05}.tar.gz");
            assert_eq!(restored.might_contain(&key), filter.might_contain(&key));
        }
    }
}

#[test]
fn test_truncated_header() {
    let bytes = populated_filter(1000, 7, 10).serialize();
    for len in [0, 4, 8, 11] {
        let err = BloomFilter::deserialize(&bytes[..len]).unwrap_err();
        assert_that!(err.kind(), eq(ErrorKind::Io));
        assert_that!(err.message(), contains_substring("truncated"));
    }
}

#[test]
fn test_truncated_payload() {
    let bytes = populated_filter(1000, 7, 10).serialize();
    for len in [HEADER_BYTES, HEADER_BYTES + 1, bytes.len() - 1] {
        let err = BloomFilter::deserialize(&bytes[..len]).unwrap_err();
        assert_that!(err.kind(), eq(ErrorKind::Io));
        assert_that!(err.message(), contains_substring("bit_array"));
    }
}

#[test]
fn test_trailing_bytes_are_ignored() {
    let filter = populated_filter(100, 3, 5);
    let mut bytes = filter.serialize();
    bytes.extend_from_slice(b"extra");
    let restored = BloomFilter::deserialize(&bytes).unwrap();
    assert_eq!(restored, filter);
}

#[test]
fn test_save_and_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("names.bloom");

    let filter = populated_filter(9586, 7, 1000);
    filter.save(&path).unwrap();
    assert_eq!(fs::read(&path).unwrap(), filter.serialize());

    let loaded = BloomFilter::load(&path).unwrap();
    assert_eq!(loaded, filter);
    for i in 0..1000 {
        assert!(loaded.might_contain(format!("backup/{i:05}.tar.gz")));
    }

    // No temporary file is left behind.
    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn test_save_overwrites_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("names.bloom");

    populated_filter(64, 2, 20).save(&path).unwrap();
    let replacement = BloomFilter::new(128, 3).unwrap();
    replacement.save(&path).unwrap();

    assert_eq!(BloomFilter::load(&path).unwrap(), replacement);
}

#[test]
fn test_loaded_filter_is_independent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("names.bloom");

    let original = populated_filter(512, 4, 10);
    original.save(&path).unwrap();

    let mut loaded = BloomFilter::load(&path).unwrap();
    loaded.insert("only/in/loaded");
    loaded.clear();
    assert!(loaded.is_empty());
    assert!(!original.is_empty());
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = BloomFilter::load(dir.path().join("missing.bloom")).unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::Io));
    assert_that!(err.to_string(), contains_substring("missing.bloom"));
}

#[test]
fn test_load_truncated_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.bloom");
    let bytes = populated_filter(1000, 7, 10).serialize();
    fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    let err = BloomFilter::load(&path).unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::Io));
}

#[test]
fn test_save_to_unwritable_destination() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no_such_dir").join("names.bloom");

    let err = BloomFilter::new(64, 2).unwrap().save(&path).unwrap_err();
    assert_that!(err.kind(), eq(ErrorKind::Io));
    assert!(!path.exists());
}
