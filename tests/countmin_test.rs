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

mod common;

use common::exact_counts;
use common::exact_range;
use common::skewed_stream;
use common::SplitMix64;
use countmin_sketch::countmin::CountMinSketch;
use countmin_sketch::countmin::CountMinSketchBuilder;
use countmin_sketch::countmin::HeavyHitterPolicy;
use countmin_sketch::error::ErrorKind;
use countmin_sketch::hash::MurmurHashFamily;
use countmin_sketch::hash::PairwiseHashFamily;
use countmin_sketch::hash::RowHasher;
use googletest::assert_that;
use googletest::prelude::contains_substring;
use googletest::prelude::eq;
use googletest::prelude::ge;

#[test]
fn test_fresh_sketch_is_zero() {
    let family = MurmurHashFamily::default();
    let sketch = CountMinSketch::new(&family, 32, 0.01, 0.01).unwrap();
    assert!(sketch.is_empty());
    assert_eq!(sketch.total_weight(), 0);
    for key in (0..1000).chain([u32::MAX - 1, u32::MAX]) {
        assert_eq!(sketch.point(key), 0);
        assert!(!sketch.above_threshold(key, 1));
    }
    assert_eq!(sketch.range_sum(0, u32::MAX).unwrap(), 0);
}

#[test]
fn test_concrete_scenario() {
    let family = MurmurHashFamily::default();
    let mut sketch = CountMinSketch::new(&family, 8, 0.1, 0.1).unwrap();
    assert_eq!(sketch.width(), 28);
    assert_eq!(sketch.depth(), 3);
    assert_eq!(sketch.range_bits(), 8);

    for _ in 0..5 {
        sketch.update(42, 1);
    }
    sketch.update(7, 1);

    assert_that!(sketch.point(42), ge(5u64));
    assert_that!(sketch.point(7), ge(1u64));
    assert!(sketch.above_threshold(42, 5));
    assert_that!(sketch.total_weight(), eq(6u64));
}

#[test]
fn test_never_undercounts() {
    let family = MurmurHashFamily::default();
    let mut sketch = CountMinSketch::new(&family, 0, 0.05, 0.05).unwrap();
    let keys = skewed_stream(1, 20_000, 5_000);
    for &key in &keys {
        sketch.increment(key);
    }
    for (key, count) in exact_counts(&keys) {
        assert!(
            sketch.point(key) >= count,
            "key {key}: estimate {} below true count {count}",
            sketch.point(key)
        );
    }
}

#[test]
fn test_error_bound_holds() {
    const N: usize = 10_000;
    const UNIVERSE: u32 = 2_000;
    let epsilon = 0.01;
    let delta = 0.01;

    let mut violations = 0usize;
    let mut checked = 0usize;
    for trial in 0..5u64 {
        let family = MurmurHashFamily::with_seed(trial);
        let mut sketch = CountMinSketch::new(&family, 0, epsilon, delta).unwrap();
        let mut rng = SplitMix64::new(100 + trial);
        let keys: Vec<u32> = (0..N).map(|_| rng.next_key(UNIVERSE)).collect();
        for &key in &keys {
            sketch.update(key, 1);
        }

        let slack = (epsilon * N as f64) as u64;
        let counts = exact_counts(&keys);
        for key in 0..UNIVERSE {
            let truth = counts.get(&key).copied().unwrap_or(0);
            checked += 1;
            if sketch.point(key) > truth + slack {
                violations += 1;
            }
        }
    }

    let rate = violations as f64 / checked as f64;
    assert!(rate <= delta, "violation rate {rate} exceeds delta {delta}");
}

#[test]
fn test_point_is_min_of_partials() {
    let family = PairwiseHashFamily::default();
    let mut sketch = CountMinSketch::new(&family, 0, 0.05, 0.01).unwrap();
    for &key in &skewed_stream(2, 5_000, 1_000) {
        sketch.increment(key);
    }
    for key in 0..1_000 {
        let min = (0..sketch.depth())
            .map(|row| sketch.point_partial(key, row).unwrap())
            .min()
            .unwrap();
        assert_eq!(sketch.point(key), min);
    }
}

#[test]
fn test_point_partial_rejects_bad_row() {
    let family = MurmurHashFamily::default();
    let sketch = CountMinSketch::new(&family, 0, 0.1, 0.1).unwrap();
    assert!(sketch.point_partial(1, sketch.depth() - 1).is_ok());

    let err = sketch.point_partial(1, sketch.depth()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_that!(err.message(), contains_substring("row index out of range"));
    assert_eq!(err.context_value("row"), Some("3"));
}

#[test]
fn test_threshold_matches_point() {
    let family = MurmurHashFamily::default();
    let mut sketch = CountMinSketch::new(&family, 0, 0.1, 0.05).unwrap();
    for &key in &skewed_stream(3, 2_000, 300) {
        sketch.increment(key);
    }
    for key in 0..300 {
        let estimate = sketch.point(key);
        for th in [0, 1, estimate.saturating_sub(1), estimate, estimate + 1, u64::MAX] {
            assert_eq!(sketch.above_threshold(key, th), estimate >= th);
        }
    }
}

#[test]
fn test_range_sum_single_point() {
    let family = MurmurHashFamily::default();
    for range_bits in [0, 8, 32] {
        let mut sketch = CountMinSketch::new(&family, range_bits, 0.05, 0.05).unwrap();
        for &key in &skewed_stream(4, 3_000, 500) {
            sketch.increment(key);
        }
        for key in [0, 1, 15, 255, 256, 499, 10_000, u32::MAX] {
            assert_eq!(sketch.range_sum(key, key).unwrap(), sketch.point(key));
        }
    }
}

#[test]
fn test_range_sum_full_cover_is_exact() {
    let family = MurmurHashFamily::default();
    let mut sketch = CountMinSketch::new(&family, 32, 0.01, 0.01).unwrap();
    let keys = skewed_stream(5, 4_000, 1 << 20);
    for &key in &keys {
        sketch.increment(key);
    }
    sketch.update(u32::MAX, 10);

    let total = keys.len() as u64 + 10;
    assert_eq!(sketch.total_weight(), total);
    assert_eq!(sketch.range_sum(0, u32::MAX).unwrap(), total);
}

#[test]
fn test_range_sum_never_undercounts() {
    let family = MurmurHashFamily::with_seed(11);
    let mut sketch = CountMinSketch::new(&family, 16, 0.01, 0.01).unwrap();
    let keys = skewed_stream(6, 10_000, 60_000);
    for &key in &keys {
        sketch.increment(key);
    }
    let counts = exact_counts(&keys);

    let mut rng = SplitMix64::new(7);
    for _ in 0..200 {
        let a = rng.next_key(70_000);
        let b = rng.next_key(70_000);
        let (l, r) = (a.min(b), a.max(b));
        let truth = exact_range(&counts, l, r);
        let estimate = sketch.range_sum(l, r).unwrap();
        assert!(estimate >= truth, "[{l}, {r}]: {estimate} < {truth}");
        // at most 2 * 16 blocks, each off by epsilon * N with high probability
        assert!(estimate <= truth + 32 * 100, "[{l}, {r}]: {estimate} vs {truth}");
    }
}

#[test]
fn test_range_sum_without_hierarchy_sums_points() {
    let family = MurmurHashFamily::default();
    let mut sketch = CountMinSketch::new(&family, 0, 0.05, 0.05).unwrap();
    for &key in &skewed_stream(8, 1_000, 100) {
        sketch.increment(key);
    }
    let naive: u64 = (10..=60).map(|key| sketch.point(key)).sum();
    assert_eq!(sketch.range_sum(10, 60).unwrap(), naive);
}

#[test]
fn test_range_sum_rejects_inverted_range() {
    let family = MurmurHashFamily::default();
    let sketch = CountMinSketch::new(&family, 8, 0.1, 0.1).unwrap();
    let err = sketch.range_sum(10, 9).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    let rendered = err.to_string();
    assert_that!(rendered.as_str(), contains_substring("l: 10, r: 9"));
}

#[test]
fn test_counters_saturate_instead_of_wrapping() {
    let family = MurmurHashFamily::default();
    let mut sketch = CountMinSketch::new(&family, 8, 0.1, 0.1).unwrap();
    let mut previous = 0;
    for _ in 0..4 {
        sketch.update(9, i64::MAX);
        let estimate = sketch.point(9);
        assert!(estimate >= previous, "counter wrapped from {previous} to {estimate}");
        previous = estimate;
    }
    assert_eq!(sketch.point(9), u64::MAX);
    assert_eq!(sketch.total_weight(), u64::MAX);
    assert_eq!(sketch.range_sum(0, 255).unwrap(), u64::MAX);

    sketch.increment(9);
    assert_eq!(sketch.point(9), u64::MAX);
    assert!(sketch.above_threshold(9, u64::MAX));
}

#[test]
fn test_invalid_sizing_arguments() {
    let family = MurmurHashFamily::default();
    for (epsilon, delta) in [(0.0, 0.1), (1.0, 0.1), (-0.5, 0.1), (0.1, 0.0), (0.1, 1.0)] {
        let err = CountMinSketch::new(&family, 8, epsilon, delta).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{epsilon}, {delta}");
    }

    let err = CountMinSketch::new(&family, 33, 0.1, 0.1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = CountMinSketch::new(&family, 0, 1e-12, 0.1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AllocationFailure);
}

#[test]
fn test_merge_equals_single_stream() {
    let family = MurmurHashFamily::default();
    let empty = CountMinSketch::new(&family, 12, 0.05, 0.05).unwrap();
    let mut whole = empty.clone();
    let mut left = empty.clone();
    let mut right = empty;

    let keys = skewed_stream(9, 6_000, 4_096);
    for (i, &key) in keys.iter().enumerate() {
        whole.increment(key);
        if i % 2 == 0 {
            left.increment(key);
        } else {
            right.increment(key);
        }
    }

    left.merge(&right).unwrap();
    assert_eq!(left.total_weight(), whole.total_weight());
    for key in 0..4_096 {
        assert_eq!(left.point(key), whole.point(key));
    }
    assert_eq!(
        left.range_sum(100, 3_000).unwrap(),
        whole.range_sum(100, 3_000).unwrap()
    );
}

#[test]
fn test_merge_rejects_other_dimensions() {
    let family = MurmurHashFamily::default();
    let mut a = CountMinSketch::new(&family, 0, 0.1, 0.1).unwrap();
    let b = CountMinSketch::new(&family, 0, 0.05, 0.1).unwrap();
    let c = CountMinSketch::new(&family, 4, 0.1, 0.1).unwrap();

    let err = a.merge(&b).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(err.context_value("width"), Some("28 vs 55"));
    assert!(a.merge(&c).is_err());
}

#[test]
fn test_heavy_hitter_policies() {
    let family = MurmurHashFamily::default();
    let mut sketch = CountMinSketch::new(&family, 0, 0.01, 0.01).unwrap();
    sketch.update(1, 500);
    for key in 100..600 {
        sketch.increment(key);
    }
    // l1 = 1000, epsilon * l1 = 10
    assert!(sketch.is_heavy_hitter(1, 500, HeavyHitterPolicy::PassThrough));
    assert!(!sketch.is_heavy_hitter(1, 500, HeavyHitterPolicy::ErrorCompensated));
    assert!(sketch.is_heavy_hitter(1, 480, HeavyHitterPolicy::ErrorCompensated));
    assert!(!sketch.is_heavy_hitter(100, 50, HeavyHitterPolicy::PassThrough));
}

#[test]
fn test_reset() {
    let family = PairwiseHashFamily::with_seed(3);
    let mut sketch = CountMinSketch::new(&family, 4, 0.1, 0.1).unwrap();
    sketch.update(3, 9);
    assert!(!sketch.is_empty());

    sketch.reset();
    assert!(sketch.is_empty());
    assert_eq!(sketch.point(3), 0);
    assert_eq!(sketch.range_sum(0, 15).unwrap(), 0);
}

#[test]
fn test_trait_object_family() {
    let murmur = MurmurHashFamily::default();
    let pairwise = PairwiseHashFamily::default();
    let families: [&dyn RowHasher; 2] = [&murmur, &pairwise];

    for family in families {
        let mut sketch = CountMinSketchBuilder::with_accuracy(0.05, 0.05)
            .range_bits(4)
            .build(family)
            .unwrap();
        sketch.update(12, 4);
        assert!(sketch.point(12) >= 4);
        assert!(sketch.range_sum(0, 15).unwrap() >= 4);
    }
}

#[test]
fn test_family_outlives_sketch() {
    let family = MurmurHashFamily::with_seed(99);
    {
        let mut sketch = CountMinSketch::new(&family, 0, 0.1, 0.1).unwrap();
        sketch.increment(1);
        assert!(std::ptr::eq(sketch.hasher(), &family));
    }
    // the sketch is gone, the borrowed family is untouched
    assert_eq!(family.seed(), 99);
    assert_eq!(family.hash(0, 1), MurmurHashFamily::with_seed(99).hash(0, 1));
}
