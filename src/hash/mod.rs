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

//! Hash families for the Count-Min sketch.
//!
//! A sketch does not hash keys itself. It borrows a [`RowHasher`], an object that
//! evaluates one independent hash function per table row. Two families are provided:
//!
//! - [`MurmurHashFamily`]: MurmurHash3 x64/128 over the `(row, key)` pair.
//! - [`PairwiseHashFamily`]: Carter–Wegman `(a·x + b) mod p` functions, the family
//!   the original Count-Min analysis assumes.
//!
//! Any `Fn(usize, u32) -> u64` closure is a [`RowHasher`] as well.

mod murmurhash;
mod pairwise;

pub use self::murmurhash::MurmurHashFamily;
pub use self::pairwise::PairwiseHashFamily;

/// Default seed used by the provided hash families.
pub const DEFAULT_UPDATE_SEED: u64 = 9001;

/// Evaluates the hash function assigned to a sketch row.
///
/// Implementations must be deterministic: the same `(row, key)` pair always yields
/// the same value, otherwise updates and queries address different counters and the
/// sketch's estimation guarantees are lost. The sketch reduces the value modulo its
/// width, so all 64 bits should be well mixed.
pub trait RowHasher {
    /// Hashes `key` with the function of row `row`.
    fn hash(&self, row: usize, key: u32) -> u64;
}

impl<F> RowHasher for F
where
    F: Fn(usize, u32) -> u64,
{
    fn hash(&self, row: usize, key: u32) -> u64 {
        self(row, key)
    }
}
