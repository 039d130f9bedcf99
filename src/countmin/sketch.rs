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

use std::fmt;

use crate::countmin::CountMinSketchBuilder;
use crate::countmin::DyadicIntervals;
use crate::countmin::HeavyHitterPolicy;
use crate::countmin::table::CounterTable;
use crate::countmin::table::saturating_apply;
use crate::error::Error;
use crate::hash::RowHasher;

/// Count-Min sketch for estimating the frequency of `u32` keys.
///
/// The sketch owns a `depth × width` table of counters per level and borrows the hash
/// family that addresses them. The `'h` lifetime ties the sketch to that family, so
/// the family always outlives every sketch built on it.
///
/// See the [module documentation](super) for the error guarantees.
pub struct CountMinSketch<'h, H: RowHasher + ?Sized> {
    hash: &'h H,
    width: usize,
    depth: usize,
    range_bits: u8,
    epsilon: f64,
    delta: f64,
    total_weight: u64,
    /// `levels[j]` counts the key prefixes `key >> j`; `levels[0]` is the point table.
    levels: Vec<CounterTable>,
}

impl<'h, H: RowHasher + ?Sized> CountMinSketch<'h, H> {
    /// Creates a sketch sized for the given error bounds.
    ///
    /// `range_bits` (`b`) is the number of low key bits covered by the dyadic hierarchy
    /// used by [`range_sum`](Self::range_sum); see
    /// [`CountMinSketchBuilder::range_bits`].
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `epsilon` or `delta` is not in (0, 1) or `range_bits > 32`;
    /// `AllocationFailure` if the tables cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// # use countmin_sketch::countmin::CountMinSketch;
    /// # use countmin_sketch::hash::MurmurHashFamily;
    /// let family = MurmurHashFamily::default();
    /// let mut sketch = CountMinSketch::new(&family, 8, 0.1, 0.1).unwrap();
    /// sketch.update(42, 5);
    /// assert!(sketch.point(42) >= 5);
    /// assert!(sketch.above_threshold(42, 5));
    /// ```
    pub fn new(hash: &'h H, range_bits: u8, epsilon: f64, delta: f64) -> Result<Self, Error> {
        CountMinSketchBuilder::with_accuracy(epsilon, delta)
            .range_bits(range_bits)
            .build(hash)
    }

    pub(super) fn make(
        hash: &'h H,
        width: usize,
        depth: usize,
        range_bits: u8,
        epsilon: f64,
        delta: f64,
    ) -> Result<Self, Error> {
        let num_levels = range_bits as usize + 1;
        let mut levels = Vec::new();
        levels.try_reserve_exact(num_levels).map_err(|err| {
            Error::allocation_failure("cannot allocate level tables")
                .with_context("levels", num_levels)
                .set_source(err)
        })?;
        for _ in 0..num_levels {
            levels.push(CounterTable::try_new(width, depth)?);
        }

        tracing::debug!(
            width,
            depth,
            range_bits,
            epsilon,
            delta,
            "created count-min sketch"
        );
        Ok(CountMinSketch {
            hash,
            width,
            depth,
            range_bits,
            epsilon,
            delta,
            total_weight: 0,
            levels,
        })
    }

    /// Returns the number of columns per row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the number of rows, i.e. hash functions.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the number of key bits covered by the dyadic hierarchy.
    pub fn range_bits(&self) -> u8 {
        self.range_bits
    }

    /// Returns the relative error bound the sketch was sized for.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Returns the probability of exceeding the error bound.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Returns the borrowed hash family.
    pub fn hasher(&self) -> &'h H {
        self.hash
    }

    /// Returns the L1 mass: the sum of all applied deltas, floored at 0.
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Returns true if no counter holds any mass.
    pub fn is_empty(&self) -> bool {
        self.total_weight == 0 && self.levels[0].is_zero()
    }

    /// Returns the additive error bound `ceil(epsilon × total_weight)`.
    pub fn error_bound(&self) -> u64 {
        let bound = (self.epsilon * self.total_weight as f64).ceil();
        if bound >= u64::MAX as f64 {
            u64::MAX
        } else {
            bound as u64
        }
    }

    /// Adds one occurrence of `key`.
    pub fn increment(&mut self, key: u32) {
        self.update(key, 1);
    }

    /// Adds `delta` occurrences of `key`; a negative delta removes occurrences.
    ///
    /// Counters saturate at `0` and `u64::MAX` instead of wrapping.
    pub fn update(&mut self, key: u32, delta: i64) {
        if delta == 0 {
            return;
        }
        self.total_weight = saturating_apply(self.total_weight, delta).0;

        let mut saturated = false;
        for (level, table) in self.levels.iter_mut().enumerate() {
            let prefix = ((key as u64) >> level) as u32;
            for row in 0..self.depth {
                let column = column(self.hash, self.width, row, prefix);
                saturated |= table.add(row, column, delta);
            }
        }
        if saturated {
            tracing::trace!(key, delta, "count-min counter saturated");
        }
    }

    /// Returns the estimated frequency of `key`: the minimum of its counters.
    ///
    /// Never below the true frequency when only non-negative deltas were applied.
    pub fn point(&self, key: u32) -> u64 {
        self.estimate_at(0, key)
    }

    /// Returns the raw counter of `key` in row `row`, without the minimum across rows.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `row >= depth`.
    pub fn point_partial(&self, key: u32, row: usize) -> Result<u64, Error> {
        if row >= self.depth {
            return Err(Error::invalid_argument("row index out of range")
                .with_context("row", row)
                .with_context("depth", self.depth));
        }
        Ok(self.levels[0].get(row, self.column(row, key)))
    }

    /// Returns whether `point(key) >= threshold`.
    ///
    /// Stops at the first row whose counter is already below `threshold`.
    pub fn above_threshold(&self, key: u32, threshold: u64) -> bool {
        let table = &self.levels[0];
        (0..self.depth).all(|row| table.get(row, self.column(row, key)) >= threshold)
    }

    /// Estimates the total frequency of all keys in `[l, r]`.
    ///
    /// The range is split into aligned dyadic blocks no larger than `2^range_bits` keys
    /// and the block estimates are summed. Each block estimate is one-sided, so the
    /// result never undercounts under non-negative updates; the error adds up to
    /// `epsilon × total_weight` per block.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `l > r`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use countmin_sketch::countmin::CountMinSketch;
    /// # use countmin_sketch::hash::MurmurHashFamily;
    /// let family = MurmurHashFamily::default();
    /// let mut sketch = CountMinSketch::new(&family, 16, 0.01, 0.01).unwrap();
    /// for key in 100..200 {
    ///     sketch.increment(key);
    /// }
    /// assert!(sketch.range_sum(100, 199).unwrap() >= 100);
    /// assert!(sketch.range_sum(200, 100).is_err());
    /// ```
    pub fn range_sum(&self, l: u32, r: u32) -> Result<u64, Error> {
        if l > r {
            return Err(Error::invalid_argument("range start exceeds range end")
                .with_context("l", l)
                .with_context("r", r));
        }
        let sum = DyadicIntervals::new(l, r, self.range_bits as u32).fold(0u64, |sum, block| {
            sum.saturating_add(self.estimate_at(block.level as usize, block.prefix))
        });
        Ok(sum)
    }

    /// Returns `point(key)` plus the additive error bound, an upper bound on the true
    /// frequency that holds with probability `1 - delta`.
    pub fn upper_bound(&self, key: u32) -> u64 {
        self.point(key).saturating_add(self.error_bound())
    }

    /// Returns `point(key)` minus the additive error bound, floored at 0.
    pub fn lower_bound(&self, key: u32) -> u64 {
        self.point(key).saturating_sub(self.error_bound())
    }

    /// Returns whether `key` is a heavy hitter for the base `threshold` under `policy`,
    /// using this sketch's `epsilon` and total weight.
    pub fn is_heavy_hitter(&self, key: u32, threshold: u64, policy: HeavyHitterPolicy) -> bool {
        let effective = policy.threshold(self.total_weight, self.epsilon, threshold as f64);
        self.point(key) as f64 >= effective
    }

    /// Resets every counter and the total weight to zero.
    pub fn reset(&mut self) {
        for table in &mut self.levels {
            table.reset();
        }
        self.total_weight = 0;
    }

    /// Adds the counters of `other` into this sketch.
    ///
    /// Both sketches must have the same dimensions and range bits and must borrow the
    /// very same hash family object.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the sketches are incompatible.
    pub fn merge(&mut self, other: &CountMinSketch<'_, H>) -> Result<(), Error> {
        if !self.is_compatible(other) {
            return Err(Error::invalid_argument("incompatible sketch configuration")
                .with_context("width", format!("{} vs {}", self.width, other.width))
                .with_context("depth", format!("{} vs {}", self.depth, other.depth))
                .with_context(
                    "range_bits",
                    format!("{} vs {}", self.range_bits, other.range_bits),
                ));
        }
        for (dst, src) in self.levels.iter_mut().zip(other.levels.iter()) {
            dst.merge(src);
        }
        self.total_weight = self.total_weight.saturating_add(other.total_weight);
        tracing::debug!(
            total_weight = self.total_weight,
            "merged count-min sketch"
        );
        Ok(())
    }

    /// Returns whether `other` can be merged into this sketch.
    pub fn is_compatible(&self, other: &CountMinSketch<'_, H>) -> bool {
        self.width == other.width
            && self.depth == other.depth
            && self.range_bits == other.range_bits
            && std::ptr::addr_eq(self.hash, other.hash)
    }

    fn column(&self, row: usize, key: u32) -> usize {
        column(self.hash, self.width, row, key)
    }

    /// Minimum over rows of the counters of `prefix` at `level`.
    fn estimate_at(&self, level: usize, prefix: u32) -> u64 {
        let table = &self.levels[level];
        (0..self.depth)
            .map(|row| table.get(row, self.column(row, prefix)))
            .min()
            .unwrap_or(0)
    }
}

#[inline]
fn column<H: RowHasher + ?Sized>(hash: &H, width: usize, row: usize, key: u32) -> usize {
    (hash.hash(row, key) % width as u64) as usize
}

impl<H: RowHasher + ?Sized> Clone for CountMinSketch<'_, H> {
    fn clone(&self) -> Self {
        CountMinSketch {
            hash: self.hash,
            width: self.width,
            depth: self.depth,
            range_bits: self.range_bits,
            epsilon: self.epsilon,
            delta: self.delta,
            total_weight: self.total_weight,
            levels: self.levels.clone(),
        }
    }
}

impl<H: RowHasher + ?Sized> fmt::Debug for CountMinSketch<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountMinSketch")
            .field("width", &self.width)
            .field("depth", &self.depth)
            .field("range_bits", &self.range_bits)
            .field("epsilon", &self.epsilon)
            .field("delta", &self.delta)
            .field("total_weight", &self.total_weight)
            .finish_non_exhaustive()
    }
}
