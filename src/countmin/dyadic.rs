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

//! Decomposition of key ranges into dyadic blocks.
//!
//! A block `(level, prefix)` covers the keys `prefix << level ..= ((prefix + 1) << level) - 1`.
//! A sketch with `b` range bits keeps one counter table per level `0..=b`, where level
//! `j` is updated with `key >> j`; the mass of a block is then a point query at
//! `prefix` on level `level`.

/// One aligned block of `2^level` consecutive keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DyadicBlock {
    /// Height of the block; it spans `2^level` keys.
    pub level: u32,
    /// The shared key prefix, i.e. the first key shifted right by `level`.
    pub prefix: u32,
}

impl DyadicBlock {
    /// First key covered by this block.
    pub fn first_key(&self) -> u64 {
        (self.prefix as u64) << self.level
    }

    /// Number of keys covered by this block.
    pub fn span(&self) -> u64 {
        1u64 << self.level
    }
}

/// Iterator over the maximal dyadic blocks partitioning a closed key range.
///
/// Blocks come out in ascending key order and never exceed `2^max_level` keys. A range
/// inside a single `2^max_level` window yields at most `2 * max_level` blocks; wider
/// ranges add one block per whole window.
#[derive(Debug, Clone)]
pub struct DyadicIntervals {
    next: u64,
    end: u64,
    max_level: u32,
}

impl DyadicIntervals {
    /// Decomposes `[l, r]` using blocks of at most `2^max_level` keys.
    ///
    /// # Panics
    ///
    /// Panics if `l > r` or `max_level > 32`.
    pub fn new(l: u32, r: u32, max_level: u32) -> Self {
        assert!(l <= r, "range start must not exceed range end");
        assert!(max_level <= 32, "max_level must be at most 32");
        DyadicIntervals {
            next: l as u64,
            end: r as u64 + 1,
            max_level,
        }
    }
}

impl Iterator for DyadicIntervals {
    type Item = DyadicBlock;

    fn next(&mut self) -> Option<DyadicBlock> {
        if self.next >= self.end {
            return None;
        }

        // alignment of the current start bounds the block height
        let mut level = if self.next == 0 {
            self.max_level
        } else {
            self.next.trailing_zeros().min(self.max_level)
        };
        while self.next + (1u64 << level) > self.end {
            level -= 1;
        }

        let block = DyadicBlock {
            level,
            prefix: (self.next >> level) as u32,
        };
        self.next += 1u64 << level;
        Some(block)
    }
}
