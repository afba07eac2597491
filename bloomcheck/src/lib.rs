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

//! # bloomcheck
//!
//! A Bloom filter engine for testing file and name existence against a large
//! set without storing the set itself.
//!
//! - [`bloom`]: the filter, its parameter calculator and its persisted format
//! - [`hash`]: the djb2 / sdbm double-hashing index scheme
//! - [`error`]: the error type shared by all fallible operations
//!
//! The filter is a plain synchronous data structure with no internal locking.
//! Callers sharing one instance across threads must serialize mutations
//! themselves, for example with a `Mutex` or `RwLock`.

pub mod bloom;
pub mod error;
pub mod hash;

mod codec;
