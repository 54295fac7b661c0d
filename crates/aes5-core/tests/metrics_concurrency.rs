// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
//! Shared validators under contention, and the runner seam.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use aes5_core::{
    CheckFn, ComplianceEngine, FrequencyValidator, MetricsSnapshot, RateCategory,
    RateCategoryManager, ValidationCore, ValidationResult, ValidationRunner,
};

const THREADS: u64 = 8;
const CALLS_PER_THREAD: u64 = 2_000;

#[test]
fn concurrent_validation_loses_no_samples() {
    let validator = FrequencyValidator::create(ComplianceEngine::new(), ValidationCore::new());
    std::thread::scope(|scope| {
        for t in 0..THREADS {
            let validator = &validator;
            scope.spawn(move || {
                for i in 0..CALLS_PER_THREAD {
                    // Even calls hit 48 kHz exactly, odd calls are 50 Hz off.
                    let f = if (t + i) % 2 == 0 { 48_000 } else { 48_050 };
                    let _ = validator.validate_frequency(f, 100);
                }
            });
        }
    });

    let m = validator.get_metrics();
    assert_eq!(m.total_validations, THREADS * CALLS_PER_THREAD);
    assert_eq!(m.successful_validations, THREADS * CALLS_PER_THREAD / 2);
    assert_eq!(m.failed_validations, THREADS * CALLS_PER_THREAD / 2);
    assert!(m.total_latency_ns >= m.max_latency_ns);

    validator.reset_metrics();
    assert_eq!(validator.get_metrics(), MetricsSnapshot::default());
}

#[test]
fn shared_rate_manager_never_returns_a_mixed_answer() {
    let manager = RateCategoryManager::create(ValidationCore::new());
    let inputs = [(44_100, RateCategory::Basic), (96_000, RateCategory::Double), (57_000, RateCategory::Unknown)];
    std::thread::scope(|scope| {
        for (f, expected) in inputs {
            let manager = &manager;
            scope.spawn(move || {
                for _ in 0..CALLS_PER_THREAD {
                    let result = manager.classify_rate_category(f);
                    assert_eq!(result.frequency_hz, f);
                    assert_eq!(result.category, expected);
                    assert_eq!(result.valid, expected != RateCategory::Unknown);
                }
            });
        }
    });
    let m = manager.get_metrics();
    assert!(m.total_validations >= 3);
    assert!(m.total_validations <= 3 * CALLS_PER_THREAD);
}

/// Runs the check like the real core but keeps every sample it saw.
#[derive(Default)]
struct RecordingRunner {
    samples: Mutex<Vec<(u32, ValidationResult)>>,
    resets: AtomicU64,
}

impl ValidationRunner for RecordingRunner {
    fn validate<C>(
        &self,
        value: u32,
        check: Option<CheckFn<C>>,
        context: Option<&C>,
    ) -> ValidationResult {
        let result = check.map_or(ValidationResult::InternalError, |check| check(value, context));
        self.samples.lock().expect("samples lock").push((value, result));
        result
    }

    fn metrics(&self) -> MetricsSnapshot {
        let samples = self.samples.lock().expect("samples lock");
        let ok = samples.iter().filter(|(_, r)| r.is_valid()).count() as u64;
        MetricsSnapshot {
            total_validations: samples.len() as u64,
            successful_validations: ok,
            failed_validations: samples.len() as u64 - ok,
            ..MetricsSnapshot::default()
        }
    }

    fn reset_metrics(&self) {
        self.samples.lock().expect("samples lock").clear();
        self.resets.fetch_add(1, Ordering::Relaxed);
    }

    fn meets_realtime_constraints(&self, _max_latency_ns: u64) -> bool {
        true
    }
}

#[test]
fn validator_records_one_sample_per_call_including_zero() {
    let validator = FrequencyValidator::create(ComplianceEngine::new(), RecordingRunner::default());
    let _ = validator.validate_frequency(0, 100);
    let _ = validator.validate_frequency(44_100, 100);
    let _ = validator.validate_frequency(50_000, 100);

    let m = validator.get_metrics();
    assert_eq!(m.total_validations, 3);
    assert_eq!(m.successful_validations, 1);
    validator.reset_metrics();
    assert_eq!(validator.get_metrics().total_validations, 0);
}

#[test]
fn rate_manager_skips_the_runner_on_a_memo_hit() {
    let manager = RateCategoryManager::create(RecordingRunner::default());
    manager.classify_rate_category(192_000);
    manager.classify_rate_category(192_000);
    manager.classify_rate_category(13_000);
    assert_eq!(manager.get_metrics().total_validations, 2);
    assert!(manager.meets_default_realtime_constraints());
}

/// Never runs the check; forces the components onto their fallback path.
struct SilentRunner;

impl ValidationRunner for SilentRunner {
    fn validate<C>(&self, _: u32, _: Option<CheckFn<C>>, _: Option<&C>) -> ValidationResult {
        ValidationResult::InternalError
    }

    fn metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot::default()
    }

    fn reset_metrics(&self) {}

    fn meets_realtime_constraints(&self, _: u64) -> bool {
        false
    }
}

#[test]
fn components_survive_a_runner_that_skips_the_check() {
    let validator = FrequencyValidator::create(ComplianceEngine::new(), SilentRunner);
    let result = validator.validate_frequency(48_000, 100);
    assert_eq!(result.status, ValidationResult::InternalError);
    assert_eq!(result.detected_frequency, 48_000);

    let manager = RateCategoryManager::create(SilentRunner);
    assert_eq!(manager.get_rate_category(96_000), RateCategory::Double);
}
