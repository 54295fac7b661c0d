// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Instrumented validation: run a caller-supplied check, time it, aggregate.
//!
//! [`ValidationCore`] does not know what it validates. It times the check,
//! folds the sample into [`ValidationMetrics`] and hands the check's verdict
//! back unchanged. There is no retry and no recovery.
//!
//! # Metrics ordering
//!
//! Each counter is updated with a relaxed atomic read-modify-write, so no
//! update is ever lost, but the counters are not synchronised with each
//! other. A reader racing writers may see a `total` that already includes a
//! sample whose `successful`/`failed` increment has not landed yet. The
//! metrics are advisory telemetry and must not gate correctness.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tracing::debug;

/// Maximum number of values a single [`ValidationCore::batch_validate`] call inspects.
pub const MAX_BATCH_SIZE: usize = 16;

/// Default latency budget for [`ValidationCore::meets_realtime_constraints`] (100 µs).
pub(crate) const DEFAULT_REALTIME_BUDGET_NS: u64 = 100_000;

/// Outcome of every validating operation. Never an error path: always a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ValidationResult {
    /// The value passed.
    Valid,
    /// Zero/degenerate input.
    InvalidInput,
    /// Computed correctly but outside the requested tolerance. Not a fault.
    OutOfTolerance,
    /// Caller-programming error: missing check function or context.
    InternalError,
}

impl ValidationResult {
    /// Returns `true` only for [`ValidationResult::Valid`].
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }

    /// One-line human-readable description.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Valid => "value satisfies AES5-2018",
            Self::InvalidInput => "invalid input (zero or degenerate value)",
            Self::OutOfTolerance => "value is outside the acceptable tolerance",
            Self::InternalError => "internal validation error (missing check or context)",
        }
    }
}

/// Check function executed by [`ValidationCore`]: `(value, context) -> verdict`.
///
/// The context is optional so that a missing context reaches the check, which
/// is expected to answer [`ValidationResult::InternalError`] when it needs one.
pub type CheckFn<C> = fn(u32, Option<&C>) -> ValidationResult;

/// Running counters owned by one [`ValidationCore`].
///
/// Zero at construction and monotonically non-decreasing until
/// [`ValidationCore::reset_metrics`].
#[derive(Debug, Default)]
pub struct ValidationMetrics {
    total_validations: AtomicU64,
    successful_validations: AtomicU64,
    failed_validations: AtomicU64,
    max_latency_ns: AtomicU64,
    total_latency_ns: AtomicU64,
}

impl ValidationMetrics {
    /// Creates zeroed counters.
    pub const fn new() -> Self {
        Self {
            total_validations: AtomicU64::new(0),
            successful_validations: AtomicU64::new(0),
            failed_validations: AtomicU64::new(0),
            max_latency_ns: AtomicU64::new(0),
            total_latency_ns: AtomicU64::new(0),
        }
    }

    /// Folds one sample in. Lock-free.
    pub fn record(&self, result: ValidationResult, latency_ns: u64) {
        self.total_validations.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ns
            .fetch_add(latency_ns, Ordering::Relaxed);
        if result.is_valid() {
            self.successful_validations
                .fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_validations.fetch_add(1, Ordering::Relaxed);
        }

        let mut current = self.max_latency_ns.load(Ordering::Relaxed);
        while latency_ns > current {
            match self.max_latency_ns.compare_exchange_weak(
                current,
                latency_ns,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }
    }

    /// Zeroes every counter.
    pub fn reset(&self) {
        self.total_validations.store(0, Ordering::Relaxed);
        self.successful_validations.store(0, Ordering::Relaxed);
        self.failed_validations.store(0, Ordering::Relaxed);
        self.max_latency_ns.store(0, Ordering::Relaxed);
        self.total_latency_ns.store(0, Ordering::Relaxed);
    }

    /// Largest single-sample latency seen since construction or reset.
    pub fn max_latency_ns(&self) -> u64 {
        self.max_latency_ns.load(Ordering::Relaxed)
    }

    /// Plain-value copy of the counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_validations: self.total_validations.load(Ordering::Relaxed),
            successful_validations: self.successful_validations.load(Ordering::Relaxed),
            failed_validations: self.failed_validations.load(Ordering::Relaxed),
            max_latency_ns: self.max_latency_ns.load(Ordering::Relaxed),
            total_latency_ns: self.total_latency_ns.load(Ordering::Relaxed),
        }
    }
}

/// Read-only copy of [`ValidationMetrics`] at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsSnapshot {
    /// Samples recorded (a batch counts once).
    pub total_validations: u64,
    /// Samples whose verdict was [`ValidationResult::Valid`].
    pub successful_validations: u64,
    /// Samples with any other verdict.
    pub failed_validations: u64,
    /// Largest single-sample latency.
    pub max_latency_ns: u64,
    /// Sum of all sample latencies.
    pub total_latency_ns: u64,
}

impl MetricsSnapshot {
    /// Mean latency per sample, or 0 before the first sample.
    pub fn average_latency_ns(&self) -> u64 {
        self.total_latency_ns
            .checked_div(self.total_validations)
            .unwrap_or(0)
    }

    /// Percentage (0.0–100.0) of samples that were valid, or 0.0 before the first sample.
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.total_validations == 0 {
            return 0.0;
        }
        self.successful_validations as f64 / self.total_validations as f64 * 100.0
    }
}

/// The seam between the validating components and their instrumentation.
///
/// [`ValidationCore`] is the production implementation. Tests substitute a
/// fake to observe exactly which samples a component records.
pub trait ValidationRunner {
    /// Runs `check(value, context)` and records one sample.
    fn validate<C>(
        &self,
        value: u32,
        check: Option<CheckFn<C>>,
        context: Option<&C>,
    ) -> ValidationResult;

    /// Current counters.
    fn metrics(&self) -> MetricsSnapshot;

    /// Zeroes the counters.
    fn reset_metrics(&self);

    /// `true` iff the worst recorded latency is within `max_latency_ns`.
    fn meets_realtime_constraints(&self, max_latency_ns: u64) -> bool;
}

/// Lock-free, timing-instrumented validation wrapper.
///
/// `Send + Sync`: share one instance by reference across threads freely.
#[derive(Debug, Default)]
pub struct ValidationCore {
    metrics: ValidationMetrics,
}

impl ValidationCore {
    /// Creates a core with zeroed metrics.
    pub fn new() -> Self {
        debug!(max_batch = MAX_BATCH_SIZE, "validation core created");
        Self {
            metrics: ValidationMetrics::new(),
        }
    }

    /// Times `check(value, context)` and records the sample.
    ///
    /// A missing `check` yields [`ValidationResult::InternalError`] and still
    /// records a zero-latency sample.
    pub fn validate<C>(
        &self,
        value: u32,
        check: Option<CheckFn<C>>,
        context: Option<&C>,
    ) -> ValidationResult {
        let Some(check) = check else {
            self.metrics.record(ValidationResult::InternalError, 0);
            return ValidationResult::InternalError;
        };

        let start = Instant::now();
        let result = check(value, context);
        self.metrics.record(result, elapsed_ns(start));
        result
    }

    /// Runs `check` over at most [`MAX_BATCH_SIZE`] values, stopping at the
    /// first non-`Valid` verdict, which is returned.
    ///
    /// The whole batch is timed as one window and records exactly one sample.
    /// An empty batch or a missing `check` yields
    /// [`ValidationResult::InternalError`] with a zero-latency sample.
    pub fn batch_validate<C>(
        &self,
        values: &[u32],
        check: Option<CheckFn<C>>,
        context: Option<&C>,
    ) -> ValidationResult {
        let Some(check) = check.filter(|_| !values.is_empty()) else {
            self.metrics.record(ValidationResult::InternalError, 0);
            return ValidationResult::InternalError;
        };

        let start = Instant::now();
        let result = values
            .iter()
            .take(MAX_BATCH_SIZE)
            .map(|&value| check(value, context))
            .find(|result| !result.is_valid())
            .unwrap_or(ValidationResult::Valid);
        self.metrics.record(result, elapsed_ns(start));
        result
    }

    /// Plain-value copy of the counters.
    pub fn get_metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Live atomic counters.
    pub fn metrics_view(&self) -> &ValidationMetrics {
        &self.metrics
    }

    /// Zeroes every counter.
    pub fn reset_metrics(&self) {
        self.metrics.reset();
        debug!("validation metrics reset");
    }

    /// `true` iff the *maximum* observed latency is `<= max_latency_ns`.
    ///
    /// Passive query over recorded history; nothing is ever aborted.
    pub fn meets_realtime_constraints(&self, max_latency_ns: u64) -> bool {
        self.metrics.max_latency_ns() <= max_latency_ns
    }

    /// [`meets_realtime_constraints`](Self::meets_realtime_constraints) with the 100 µs default.
    pub fn meets_default_realtime_constraints(&self) -> bool {
        self.meets_realtime_constraints(DEFAULT_REALTIME_BUDGET_NS)
    }
}

impl ValidationRunner for ValidationCore {
    fn validate<C>(
        &self,
        value: u32,
        check: Option<CheckFn<C>>,
        context: Option<&C>,
    ) -> ValidationResult {
        Self::validate(self, value, check, context)
    }

    fn metrics(&self) -> MetricsSnapshot {
        self.get_metrics()
    }

    fn reset_metrics(&self) {
        Self::reset_metrics(self);
    }

    fn meets_realtime_constraints(&self, max_latency_ns: u64) -> bool {
        Self::meets_realtime_constraints(self, max_latency_ns)
    }
}

fn elapsed_ns(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX)
}
