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

use byteorder::ByteOrder;
use byteorder::NativeEndian;

/// Append-only byte buffer used to build a serialized filter image.
pub(crate) struct SketchBytes {
    bytes: Vec<u8>,
}

impl SketchBytes {
    /// Constructs an empty `SketchBytes` with at least the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Consumes the `SketchBytes` and returns the underlying `Vec<u8>`.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Writes the given byte slice to the `SketchBytes`.
    pub fn write(&mut self, buf: &[u8]) {
        self.bytes.extend_from_slice(buf);
    }

    /// Writes a 32-bit unsigned integer to the `SketchBytes` in native byte order.
    pub fn write_u32_ne(&mut self, n: u32) {
        let mut buf = [0u8; 4];
        NativeEndian::write_u32(&mut buf, n);
        self.write(&buf);
    }

    /// Writes a 64-bit unsigned integer to the `SketchBytes` in native byte order.
    pub fn write_u64_ne(&mut self, n: u64) {
        let mut buf = [0u8; 8];
        NativeEndian::write_u64(&mut buf, n);
        self.write(&buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_order_layout() {
        let mut bytes = SketchBytes::with_capacity(13);
        bytes.write_u64_ne(8);
        bytes.write_u32_ne(3);
        bytes.write(&[0xC1]);

        let mut expected = Vec::new();
        expected.extend_from_slice(&8u64.to_ne_bytes());
        expected.extend_from_slice(&3u32.to_ne_bytes());
        expected.push(0xC1);
        assert_eq!(bytes.into_bytes(), expected);
    }
}
