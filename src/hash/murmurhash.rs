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

use crate::hash::DEFAULT_UPDATE_SEED;
use crate::hash::RowHasher;

/// Row-keyed MurmurHash3 x64/128 family.
///
/// Row `d` hashes the little-endian bytes of `(d as u64, key)` so every row sees an
/// independent-looking function while sharing one seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MurmurHashFamily {
    seed: u64,
}

impl Default for MurmurHashFamily {
    fn default() -> Self {
        Self::with_seed(DEFAULT_UPDATE_SEED)
    }
}

impl MurmurHashFamily {
    /// Creates a family with the given seed.
    pub fn with_seed(seed: u64) -> Self {
        MurmurHashFamily { seed }
    }

    /// Returns the seed of this family.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn murmur_seed(&self) -> u32 {
        (self.seed ^ (self.seed >> 32)) as u32
    }
}

impl RowHasher for MurmurHashFamily {
    fn hash(&self, row: usize, key: u32) -> u64 {
        let mut buf = [0u8; 12];
        buf[..8].copy_from_slice(&(row as u64).to_le_bytes());
        buf[8..].copy_from_slice(&key.to_le_bytes());
        let (h1, _) = mur3::murmurhash3_x64_128(&buf, self.murmur_seed());
        h1
    }
}
