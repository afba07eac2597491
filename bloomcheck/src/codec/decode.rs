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

use std::io;
use std::io::Cursor;
use std::io::Read;

use byteorder::NativeEndian;
use byteorder::ReadBytesExt;

/// Sequential reader over a serialized filter image.
///
/// Every read either consumes exactly the requested width or fails with
/// [`io::ErrorKind::UnexpectedEof`].
pub(crate) struct SketchSlice<'a> {
    slice: Cursor<&'a [u8]>,
}

impl SketchSlice<'_> {
    pub fn new(slice: &[u8]) -> SketchSlice<'_> {
        SketchSlice {
            slice: Cursor::new(slice),
        }
    }

    /// Number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        let len = self.slice.get_ref().len() as u64;
        len.saturating_sub(self.slice.position()) as usize
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.slice.read_exact(buf)
    }

    pub fn read_u32_ne(&mut self) -> io::Result<u32> {
        self.slice.read_u32::<NativeEndian>()
    }

    pub fn read_u64_ne(&mut self) -> io::Result<u64> {
        self.slice.read_u64::<NativeEndian>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_native_fields() {
        let mut data = Vec::new();
        data.extend_from_slice(&9586u64.to_ne_bytes());
        data.extend_from_slice(&7u32.to_ne_bytes());
        data.push(0xFF);

        let mut cursor = SketchSlice::new(&data);
        assert_eq!(cursor.remaining(), 13);
        assert_eq!(cursor.read_u64_ne().unwrap(), 9586);
        assert_eq!(cursor.read_u32_ne().unwrap(), 7);
        assert_eq!(cursor.remaining(), 1);

        let mut buf = [0u8; 2];
        let err = cursor.read_exact(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_short_header_is_eof() {
        let data = [0u8; 5];
        let mut cursor = SketchSlice::new(&data);
        let err = cursor.read_u64_ne().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
