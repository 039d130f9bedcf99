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

use crate::error::Error;

/// Largest number of counters a single table may hold.
pub(super) const MAX_TABLE_ENTRIES: usize = 1 << 30;

/// A `depth × width` matrix of saturating `u64` counters.
///
/// Rows are stored back to back in one allocation; `(row, column)` lives at
/// `row * width + column`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CounterTable {
    width: usize,
    depth: usize,
    counts: Vec<u64>,
}

impl CounterTable {
    /// Allocates a zero-filled table.
    ///
    /// Fails with `AllocationFailure` when the table is larger than
    /// [`MAX_TABLE_ENTRIES`] or the allocator refuses the request.
    pub(crate) fn try_new(width: usize, depth: usize) -> Result<Self, Error> {
        debug_assert!(width > 0 && depth > 0, "table dimensions must be positive");
        let entries = width.checked_mul(depth).ok_or_else(|| {
            Error::allocation_failure("width * depth overflows usize")
                .with_context("width", width)
                .with_context("depth", depth)
        })?;
        if entries > MAX_TABLE_ENTRIES {
            return Err(Error::allocation_failure(format!(
                "width * depth must be at most {MAX_TABLE_ENTRIES}"
            ))
            .with_context("width", width)
            .with_context("depth", depth));
        }

        let mut counts = Vec::new();
        counts.try_reserve_exact(entries).map_err(|err| {
            Error::allocation_failure("cannot allocate counter table")
                .with_context("entries", entries)
                .set_source(err)
        })?;
        counts.resize(entries, 0);
        Ok(CounterTable {
            width,
            depth,
            counts,
        })
    }

    #[cfg(test)]
    pub(crate) fn width(&self) -> usize {
        self.width
    }

    #[cfg(test)]
    pub(crate) fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    fn index(&self, row: usize, column: usize) -> usize {
        debug_assert!(row < self.depth && column < self.width);
        row * self.width + column
    }

    #[inline]
    pub(crate) fn get(&self, row: usize, column: usize) -> u64 {
        self.counts[self.index(row, column)]
    }

    /// Adds a signed delta to one counter, clamping into `[0, u64::MAX]`.
    ///
    /// Returns `true` when the result was clamped.
    #[inline]
    pub(crate) fn add(&mut self, row: usize, column: usize, delta: i64) -> bool {
        let index = self.index(row, column);
        let current = self.counts[index];
        let (next, clamped) = saturating_apply(current, delta);
        self.counts[index] = next;
        clamped
    }

    /// Returns the counters of `row`.
    #[cfg(test)]
    pub(crate) fn row(&self, row: usize) -> &[u64] {
        let start = row * self.width;
        &self.counts[start..start + self.width]
    }

    /// Adds every counter of `other` into this table.
    pub(crate) fn merge(&mut self, other: &CounterTable) {
        debug_assert_eq!((self.width, self.depth), (other.width, other.depth));
        for (dst, src) in self.counts.iter_mut().zip(other.counts.iter()) {
            *dst = dst.saturating_add(*src);
        }
    }

    pub(crate) fn reset(&mut self) {
        self.counts.fill(0);
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }
}

/// Applies `delta` to `value`, saturating at both ends of the `u64` range.
#[inline]
pub(crate) fn saturating_apply(value: u64, delta: i64) -> (u64, bool) {
    match value.checked_add_signed(delta) {
        Some(next) => (next, false),
        None if delta < 0 => (0, true),
        None => (u64::MAX, true),
    }
}
