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

//! The `<filter>.elements` side file: one inserted name per line.
//!
//! The filter itself never records what was inserted. This list exists only so
//! the command line can tell true positives from false positives and pass a
//! distinct-insertion count to the false positive estimator.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

/// Distinct names inserted into a filter, in insertion order.
#[derive(Debug, Default)]
pub struct ElementList {
    names: Vec<String>,
    seen: HashSet<String>,
}

impl ElementList {
    /// Returns the side file path for `filter_path`: `a.bloom` becomes `a.bloom.elements`.
    pub fn path_for(filter_path: &Path) -> PathBuf {
        let mut name = filter_path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".elements");
        filter_path.with_file_name(name)
    }

    /// Reads the side file, returning `Ok(None)` when it does not exist.
    pub fn read(path: &Path) -> io::Result<Option<Self>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err),
        };

        let mut list = ElementList::default();
        for line in text.lines() {
            list.push(line);
        }
        Ok(Some(list))
    }

    pub fn write(&self, path: &Path) -> io::Result<()> {
        let mut text = String::new();
        for name in &self.names {
            text.push_str(name);
            text.push('\n');
        }
        fs::write(path, text)
    }

    /// Records `name`, ignoring empty names. Returns whether it was new.
    pub fn push(&mut self, name: &str) -> bool {
        if name.is_empty() || self.seen.contains(name) {
            return false;
        }
        self.seen.insert(name.to_string());
        self.names.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn clear(&mut self) {
        self.names.clear();
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_for() {
        assert_eq!(
            ElementList::path_for(Path::new("data/files.bloom")),
            PathBuf::from("data/files.bloom.elements")
        );
    }

    #[test]
    fn test_push_deduplicates_and_skips_empty() {
        let mut list = ElementList::default();
        assert!(list.push("a.txt"));
        assert!(!list.push("a.txt"));
        assert!(!list.push(""));
        assert!(list.push("b.txt"));
        assert_eq!(list.len(), 2);
        assert!(list.contains("b.txt"));
        assert!(!list.contains("c.txt"));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.bloom.elements");

        let mut list = ElementList::default();
        list.push("one.txt");
        list.push("two.txt");
        list.write(&path).unwrap();

        let read = ElementList::read(&path).unwrap().unwrap();
        assert_eq!(read.len(), 2);
        assert!(read.contains("one.txt"));
        assert!(read.contains("two.txt"));
    }

    #[test]
    fn test_read_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ElementList::read(&dir.path().join("nope")).unwrap().is_none());
    }
}
