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

use std::ffi::OsString;
use std::fs;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tracing::debug;

use super::BloomFilter;
use crate::error::Error;

impl BloomFilter {
    /// Writes the filter's persisted image to `path`.
    ///
    /// The image is written to a temporary file next to `path`, synced, and
    /// renamed over `path`. On failure `path` keeps its previous contents and the
    /// temporary file is removed.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Io`](crate::error::ErrorKind::Io) if the file cannot be
    /// created, written or renamed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use bloomcheck::bloom::BloomFilter;
    /// let mut filter = BloomFilter::new_optimal(1000, 0.01).unwrap();
    /// filter.insert("report.txt");
    /// filter.save("files.bloom").unwrap();
    ///
    /// let restored = BloomFilter::load("files.bloom").unwrap();
    /// assert!(restored.might_contain("report.txt"));
    /// ```
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let bytes = self.serialize();
        let temp_path = temp_path_for(path);

        if let Err(err) = write_synced(&temp_path, &bytes) {
            // Best effort; the temporary file may not exist at all.
            let _ = fs::remove_file(&temp_path);
            return Err(Error::io("failed to write bloom filter", err)
                .with_context("path", path.display()));
        }

        if let Err(err) = fs::rename(&temp_path, path) {
            let _ = fs::remove_file(&temp_path);
            return Err(Error::io("failed to replace bloom filter file", err)
                .with_context("path", path.display()));
        }

        debug!(
            path = %path.display(),
            size = self.size(),
            hash_count = self.hash_count(),
            bytes = bytes.len(),
            "saved bloom filter"
        );
        Ok(())
    }

    /// Reads a filter from a file written by [`save()`](Self::save).
    ///
    /// The returned filter is independent of any other instance. On failure no
    /// filter is returned.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Io`](crate::error::ErrorKind::Io) if the file cannot be read or
    ///   its header or payload is truncated
    /// - [`ErrorKind::InvalidData`](crate::error::ErrorKind::InvalidData) if the header
    ///   describes an impossible filter
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|err| {
            Error::io("failed to read bloom filter", err).with_context("path", path.display())
        })?;

        let filter =
            BloomFilter::deserialize(&bytes).map_err(|err| err.with_context("path", path.display()))?;

        debug!(
            path = %path.display(),
            size = filter.size(),
            hash_count = filter.hash_count(),
            bits_set = filter.bits_set(),
            "loaded bloom filter"
        );
        Ok(filter)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// `<path>.tmp`, keeping any existing extension: `a.bloom` becomes `a.bloom.tmp`.
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
