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

//! Reporting thresholds for heavy-hitter detection.
//!
//! A Count-Min estimate overshoots the true frequency by up to `epsilon × l1`. These
//! functions are the single place where a caller turns its base threshold into the one
//! it compares estimates against, keeping that policy out of the sketch itself.

/// Returns the threshold for heavy-hitter reporting.
///
/// This is the baseline policy: the base threshold `th` is returned unchanged and
/// neither `l1` nor `epsilon` is consulted, so keys whose estimate reaches `th` are
/// reported even when the overshoot alone could explain it. See
/// [`error_compensated_threshold`] for the variant that subtracts the error margin out.
///
/// # Examples
///
/// ```
/// # use countmin_sketch::countmin::heavy_hitter_threshold;
/// assert_eq!(heavy_hitter_threshold(1_000_000, 0.01, 500.0), 500.0);
/// ```
pub fn heavy_hitter_threshold(_l1: u64, _epsilon: f64, th: f64) -> f64 {
    th
}

/// Returns `th + epsilon × l1`, the threshold an estimate must reach before the key's
/// true frequency is known to reach `th` (with probability `1 - delta`).
///
/// # Examples
///
/// ```
/// # use countmin_sketch::countmin::error_compensated_threshold;
/// assert_eq!(error_compensated_threshold(1_000, 0.01, 50.0), 60.0);
/// ```
pub fn error_compensated_threshold(l1: u64, epsilon: f64, th: f64) -> f64 {
    th + epsilon * l1 as f64
}

/// Selects how a base threshold is adjusted for estimation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeavyHitterPolicy {
    /// Use the base threshold as is, see [`heavy_hitter_threshold`].
    #[default]
    PassThrough,
    /// Raise the threshold by the error margin, see [`error_compensated_threshold`].
    ErrorCompensated,
}

impl HeavyHitterPolicy {
    /// Applies this policy to the base threshold `th`.
    pub fn threshold(self, l1: u64, epsilon: f64, th: f64) -> f64 {
        match self {
            HeavyHitterPolicy::PassThrough => heavy_hitter_threshold(l1, epsilon, th),
            HeavyHitterPolicy::ErrorCompensated => error_compensated_threshold(l1, epsilon, th),
        }
    }
}
