// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
use proptest::prelude::*;
use proptest::test_runner::{Config as PropConfig, RngAlgorithm, TestRng, TestRunner};

use aes5_core::{RateCategory, RateCategoryManager, ValidationCore, BASE_FREQUENCY_HZ};

const SEED_BYTES: [u8; 32] = [
    0xae, 0x05, 0x20, 0x18, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0,
];

fn pinned_runner() -> TestRunner {
    let rng = TestRng::from_seed(RngAlgorithm::ChaCha, &SEED_BYTES);
    TestRunner::new_with_rng(PropConfig::default(), rng)
}

fn bands_containing(frequency_hz: u32) -> usize {
    RateCategory::NAMED
        .into_iter()
        .filter(|c| c.frequency_range().is_some_and(|r| r.contains(&frequency_hz)))
        .count()
}

#[test]
fn every_frequency_lands_in_at_most_one_band() {
    let manager = RateCategoryManager::create(ValidationCore::new());
    for f in (0..=500_000).step_by(250) {
        let result = manager.classify_rate_category(f);
        match bands_containing(f) {
            0 => assert_eq!(result.category, RateCategory::Unknown, "{f}"),
            1 => assert!(result.category.frequency_range().is_some_and(|r| r.contains(&f))),
            n => panic!("{f} is in {n} bands"),
        }
    }
    let gap = manager.classify_rate_category(57_000);
    assert_eq!(gap.category, RateCategory::Unknown);
}

#[test]
fn classification_is_consistent_with_the_bands() {
    let mut runner = pinned_runner();
    runner
        .run(&(0_u32..=500_000), |f| {
            let manager = RateCategoryManager::create(ValidationCore::new());
            let result = manager.classify_rate_category(f);
            prop_assert_eq!(result.category, RateCategory::for_frequency(f));
            prop_assert_eq!(result.valid, bands_containing(f) == 1);
            prop_assert_eq!(result.valid, result.multiplier.is_some());
            if let Some(m) = result.multiplier {
                let expected = f64::from(f) / f64::from(BASE_FREQUENCY_HZ);
                prop_assert!((m - expected).abs() < 1e-12);
            }
            Ok(())
        })
        .expect("rate classification property");
}

#[test]
fn repeated_classification_is_idempotent() {
    let mut runner = pinned_runner();
    runner
        .run(&any::<u32>(), |f| {
            let manager = RateCategoryManager::create(ValidationCore::new());
            let first = manager.classify_rate_category(f);
            let second = manager.classify_rate_category(f);
            prop_assert_eq!(first, second);
            prop_assert_eq!(manager.get_metrics().total_validations, 1);
            Ok(())
        })
        .expect("memoised classification property");
}
