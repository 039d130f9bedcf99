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

//! Count-Min sketch implementation for frequency estimation.
//!
//! The Count-Min sketch keeps `depth` rows of `width` counters. Every row has its own
//! hash function, borrowed from a [`RowHasher`](crate::hash::RowHasher) family; an
//! update adds to one counter per row and a point query returns the smallest of them.
//!
//! # Guarantees
//!
//! With `width = ceil(e / epsilon)` and `depth = ceil(ln(1 / delta))`, and only
//! non-negative updates totalling `L1`:
//!
//! - estimates never undercount;
//! - an estimate exceeds the truth by more than `epsilon × L1` with probability at most
//!   `delta`.
//!
//! # Range sums
//!
//! A sketch built with `b` range bits also keeps one table per dyadic level `1..=b`
//! (level `j` is updated with `key >> j`). [`CountMinSketch::range_sum`] splits a key
//! range into [`DyadicIntervals`] and sums one estimate per block. With `b = 0` this
//! degenerates to one point query per key in the range.
//!
//! # Usage
//!
//! ```rust
//! use countmin_sketch::countmin::CountMinSketch;
//! use countmin_sketch::hash::MurmurHashFamily;
//!
//! let family = MurmurHashFamily::default();
//! let mut sketch = CountMinSketch::new(&family, 8, 0.01, 0.01).unwrap();
//!
//! sketch.increment(7);
//! sketch.update(42, 3);
//!
//! assert!(sketch.point(42) >= 3);
//! assert!(sketch.range_sum(0, 255).unwrap() >= 4);
//! ```
//!
//! # Configuration Helpers
//!
//! ```rust
//! use countmin_sketch::countmin::CountMinSketchBuilder;
//! use countmin_sketch::hash::PairwiseHashFamily;
//!
//! let width = CountMinSketchBuilder::suggest_width(0.01).unwrap();
//! let depth = CountMinSketchBuilder::suggest_depth(0.01).unwrap();
//!
//! let family = PairwiseHashFamily::with_seed(7);
//! let _sketch = CountMinSketchBuilder::with_size(width, depth)
//!     .range_bits(16)
//!     .build(&family)
//!     .unwrap();
//! ```

mod builder;
mod dyadic;
mod heavy_hitter;
mod sketch;
mod table;

pub use self::builder::CountMinSketchBuilder;
pub use self::builder::MAX_RANGE_BITS;
pub use self::dyadic::DyadicBlock;
pub use self::dyadic::DyadicIntervals;
pub use self::heavy_hitter::HeavyHitterPolicy;
pub use self::heavy_hitter::error_compensated_threshold;
pub use self::heavy_hitter::heavy_hitter_threshold;
pub use self::sketch::CountMinSketch;
