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

use crate::common::RandomSource;
use crate::common::XorShift64;
use crate::hash::DEFAULT_UPDATE_SEED;
use crate::hash::RowHasher;

/// The Mersenne prime 2^61 - 1.
const MERSENNE_61: u64 = (1 << 61) - 1;

const GOLDEN_GAMMA: u64 = 0x9e3779b97f4a7c15;

/// Pairwise-independent Carter–Wegman family `h(x) = (a·x + b) mod p`.
///
/// The coefficients of row `d` are drawn from an [`XorShift64`] stream seeded by the
/// family seed and `d`, so no per-row state is stored and any row index is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairwiseHashFamily {
    seed: u64,
}

impl Default for PairwiseHashFamily {
    fn default() -> Self {
        Self::with_seed(DEFAULT_UPDATE_SEED)
    }
}

impl PairwiseHashFamily {
    /// Creates a family with the given seed.
    pub fn with_seed(seed: u64) -> Self {
        PairwiseHashFamily { seed }
    }

    /// Returns the seed of this family.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns the `(a, b)` coefficients of `row`, with `a` in `[1, p)` and `b` in `[0, p)`.
    pub fn coefficients(&self, row: usize) -> (u64, u64) {
        let stream = (row as u64).wrapping_add(1).wrapping_mul(GOLDEN_GAMMA);
        let mut rng = XorShift64::seeded(self.seed ^ stream);
        // discard the first outputs, they still resemble the seed
        rng.next_u64();
        rng.next_u64();
        let a = 1 + rng.next_below(MERSENNE_61 - 1);
        let b = rng.next_below(MERSENNE_61);
        (a, b)
    }
}

impl RowHasher for PairwiseHashFamily {
    fn hash(&self, row: usize, key: u32) -> u64 {
        let (a, b) = self.coefficients(row);
        let value = (a as u128) * (key as u128) + (b as u128);
        (value % MERSENNE_61 as u128) as u64
    }
}
