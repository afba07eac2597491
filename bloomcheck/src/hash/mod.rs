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

//! Non-cryptographic string hashes and the double-hashing index scheme.
//!
//! Every function here is a pure function of its inputs: the same key, bit
//! count and hash count always produce the same indices.

mod double_hashing;
mod string_hash;

pub use self::double_hashing::BitIndices;
pub use self::double_hashing::bit_index;
pub use self::string_hash::Djb2Hasher;
pub use self::string_hash::SdbmHasher;
pub use self::string_hash::djb2;
pub use self::string_hash::sdbm;
