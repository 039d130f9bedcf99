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

#![allow(dead_code)]

use std::collections::HashMap;

/// Deterministic SplitMix64 stream for generating test workloads.
pub struct SplitMix64(u64);

impl SplitMix64 {
    pub fn new(seed: u64) -> Self {
        SplitMix64(seed)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }

    pub fn next_key(&mut self, universe: u32) -> u32 {
        (self.next_u64() % universe as u64) as u32
    }
}

/// Draws `n` keys from `[0, universe)`, with half of the draws from the 16 smallest keys.
pub fn skewed_stream(seed: u64, n: usize, universe: u32) -> Vec<u32> {
    let mut rng = SplitMix64::new(seed);
    (0..n)
        .map(|_| {
            if rng.next_u64() & 1 == 0 {
                rng.next_key(16)
            } else {
                rng.next_key(universe)
            }
        })
        .collect()
}

/// Exact frequency of every key in `keys`.
pub fn exact_counts(keys: &[u32]) -> HashMap<u32, u64> {
    let mut counts = HashMap::new();
    for &key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

/// Exact mass of the keys in `[l, r]`.
pub fn exact_range(counts: &HashMap<u32, u64>, l: u32, r: u32) -> u64 {
    counts
        .iter()
        .filter(|(key, _)| (l..=r).contains(*key))
        .map(|(_, count)| *count)
        .sum()
}
