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

use std::f64::consts::E;

use crate::countmin::CountMinSketch;
use crate::countmin::table::MAX_TABLE_ENTRIES;
use crate::error::Error;
use crate::hash::RowHasher;

/// Largest supported number of dyadic range bits (the width of a `u32` key).
pub const MAX_RANGE_BITS: u8 = 32;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Sizing {
    Accuracy { epsilon: f64, delta: f64 },
    Size { width: usize, depth: usize },
}

/// Builder for creating [`CountMinSketch`] instances.
///
/// Provides two construction modes:
/// - [`with_accuracy()`](Self::with_accuracy): Specify the error bound and failure
///   probability (recommended)
/// - [`with_size()`](Self::with_size): Specify the table dimensions directly
///
/// Parameters are validated by [`build()`](Self::build), which reports every problem
/// as an [`Error`] instead of panicking.
#[derive(Debug, Clone)]
pub struct CountMinSketchBuilder {
    sizing: Sizing,
    range_bits: u8,
}

impl CountMinSketchBuilder {
    /// Creates a builder whose dimensions are derived from error bounds.
    ///
    /// # Arguments
    ///
    /// - `epsilon`: additive error as a fraction of the total inserted mass, in (0, 1)
    /// - `delta`: probability that the error bound is exceeded, in (0, 1)
    ///
    /// # Examples
    ///
    /// ```
    /// # use countmin_sketch::countmin::CountMinSketchBuilder;
    /// # use countmin_sketch::hash::MurmurHashFamily;
    /// let family = MurmurHashFamily::default();
    /// let sketch = CountMinSketchBuilder::with_accuracy(0.01, 0.01)
    ///     .build(&family)
    ///     .unwrap();
    /// assert_eq!(sketch.width(), 272);
    /// assert_eq!(sketch.depth(), 5);
    /// ```
    pub fn with_accuracy(epsilon: f64, delta: f64) -> Self {
        CountMinSketchBuilder {
            sizing: Sizing::Accuracy { epsilon, delta },
            range_bits: 0,
        }
    }

    /// Creates a builder with explicit table dimensions.
    ///
    /// The implied bounds are `epsilon = e / width` and `delta = exp(-depth)`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use countmin_sketch::countmin::CountMinSketchBuilder;
    /// # use countmin_sketch::hash::PairwiseHashFamily;
    /// let family = PairwiseHashFamily::default();
    /// let sketch = CountMinSketchBuilder::with_size(1024, 4).build(&family).unwrap();
    /// assert_eq!(sketch.width(), 1024);
    /// ```
    pub fn with_size(width: usize, depth: usize) -> Self {
        CountMinSketchBuilder {
            sizing: Sizing::Size { width, depth },
            range_bits: 0,
        }
    }

    /// Sets how many low key bits the dyadic hierarchy covers (default: 0).
    ///
    /// The sketch keeps `range_bits + 1` counter tables, so every update costs
    /// `(range_bits + 1) × depth` hash evaluations. With `range_bits = 0` range sums
    /// fall back to summing point estimates key by key.
    pub fn range_bits(mut self, range_bits: u8) -> Self {
        self.range_bits = range_bits;
        self
    }

    /// Builds the sketch, borrowing `hash` for the sketch's whole lifetime.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `epsilon` or `delta` is outside (0, 1), a dimension is
    ///   zero, or `range_bits` exceeds [`MAX_RANGE_BITS`].
    /// - `AllocationFailure` if the counter tables cannot be allocated.
    pub fn build<'h, H>(self, hash: &'h H) -> Result<CountMinSketch<'h, H>, Error>
    where
        H: RowHasher + ?Sized,
    {
        if self.range_bits > MAX_RANGE_BITS {
            return Err(Error::invalid_argument(format!(
                "range_bits must be at most {MAX_RANGE_BITS}"
            ))
            .with_context("range_bits", self.range_bits));
        }

        let (width, depth, epsilon, delta) = match self.sizing {
            Sizing::Accuracy { epsilon, delta } => (
                Self::suggest_width(epsilon)?,
                Self::suggest_depth(delta)?,
                epsilon,
                delta,
            ),
            Sizing::Size { width, depth } => {
                if width == 0 || depth == 0 {
                    return Err(Error::invalid_argument("width and depth must be positive")
                        .with_context("width", width)
                        .with_context("depth", depth));
                }
                (width, depth, E / width as f64, (-(depth as f64)).exp())
            }
        };

        CountMinSketch::make(hash, width, depth, self.range_bits, epsilon, delta)
    }

    /// Suggests the number of columns for the given relative error.
    ///
    /// Formula: `width = ceil(e / epsilon)`
    ///
    /// # Examples
    ///
    /// ```
    /// # use countmin_sketch::countmin::CountMinSketchBuilder;
    /// assert_eq!(CountMinSketchBuilder::suggest_width(0.1).unwrap(), 28);
    /// assert!(CountMinSketchBuilder::suggest_width(1.0).is_err());
    /// ```
    pub fn suggest_width(epsilon: f64) -> Result<usize, Error> {
        if !(epsilon > 0.0 && epsilon < 1.0) {
            return Err(
                Error::invalid_argument("epsilon must be in (0, 1)").with_context("epsilon", epsilon)
            );
        }
        let width = (E / epsilon).ceil();
        if width > MAX_TABLE_ENTRIES as f64 {
            return Err(Error::allocation_failure(format!(
                "width must be at most {MAX_TABLE_ENTRIES}"
            ))
            .with_context("epsilon", epsilon));
        }
        Ok(width as usize)
    }

    /// Suggests the number of rows for the given failure probability.
    ///
    /// Formula: `depth = ceil(ln(1 / delta))`, at least 1.
    ///
    /// # Examples
    ///
    /// ```
    /// # use countmin_sketch::countmin::CountMinSketchBuilder;
    /// assert_eq!(CountMinSketchBuilder::suggest_depth(0.1).unwrap(), 3);
    /// assert!(CountMinSketchBuilder::suggest_depth(0.0).is_err());
    /// ```
    pub fn suggest_depth(delta: f64) -> Result<usize, Error> {
        if !(delta > 0.0 && delta < 1.0) {
            return Err(
                Error::invalid_argument("delta must be in (0, 1)").with_context("delta", delta)
            );
        }
        let depth = (-delta.ln()).ceil().max(1.0);
        Ok(depth as usize)
    }
}
