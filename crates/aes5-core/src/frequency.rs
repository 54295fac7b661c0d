// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Main-line frequency validation.
//!
//! `validate_frequency(f, tol)` maps `f` to its nearest reference frequency,
//! measures the deviation in ppm, compares it to `tol` and attributes the
//! clause of the reference. Every call, rejected zero input included, goes
//! through the injected [`ValidationRunner`] exactly once.

use std::cell::Cell;

use tracing::debug;

use crate::clause::{ClauseId, StandardFrequencyEntry, PRIMARY_FREQUENCY_HZ, STANDARD_FREQUENCIES};
use crate::compliance::ComplianceEngine;
use crate::settings::{SettingsError, ValidatorSettings};
use crate::validation::{CheckFn, MetricsSnapshot, ValidationCore, ValidationResult, ValidationRunner};

/// Default acceptance band, in ppm.
pub const DEFAULT_TOLERANCE_PPM: u32 = 100;

/// Tight acceptance band for clock-critical paths, in ppm.
pub const TIGHT_TOLERANCE_PPM: u32 = 50;

/// Absolute window, in hertz, within which a frequency counts as the primary 48 kHz.
pub const PRIMARY_TOLERANCE_HZ: u32 = 5;

pub(crate) const VALIDATOR_REALTIME_BUDGET_NS: u64 = 50_000;

/// Inclusive upper bound of a region that resolves to one reference frequency.
#[derive(Clone, Copy)]
struct ClosestRange {
    upper_hz: u32,
    reference_hz: u32,
}

const fn range(upper_hz: u32, reference_hz: u32) -> ClosestRange {
    ClosestRange {
        upper_hz,
        reference_hz,
    }
}

// Bounds sit on the midpoints between neighbours, ties going to the lower
// frequency. Inside [47976, 48100] the primary frequency owns everything
// except the exact pull-up value.
const CLOSEST_RANGES: [ClosestRange; 12] = [
    range(38_050, 32_000),
    range(46_026, 44_100),
    range(47_975, 47_952),
    range(48_047, 48_000),
    range(48_048, 48_048),
    range(48_100, 48_000),
    range(68_124, 48_048),
    range(92_100, 88_200),
    range(136_200, 96_000),
    range(184_200, 176_400),
    range(288_000, 192_000),
    range(u32::MAX, 384_000),
];

/// Nearest reference frequency to `frequency_hz`, by binary search over
/// [`CLOSEST_RANGES`]. Total: every `u32` resolves.
pub(crate) fn closest_standard_frequency(frequency_hz: u32) -> u32 {
    let index = CLOSEST_RANGES.partition_point(|r| r.upper_hz < frequency_hz);
    CLOSEST_RANGES
        .get(index)
        .map_or(384_000, |r| r.reference_hz)
}

/// `|measured − reference| × 10⁶ / reference`.
///
/// The scaled numerator is exact integer arithmetic; only the final division
/// is floating point. `0.0` when equal, `f64::MAX` for a zero reference.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn tolerance_ppm(measured_hz: u32, reference_hz: u32) -> f64 {
    if reference_hz == 0 {
        return f64::MAX;
    }
    let diff = u64::from(measured_hz.abs_diff(reference_hz));
    if diff == 0 {
        return 0.0;
    }
    let scaled = diff * 1_000_000;
    let reference = u64::from(reference_hz);
    (scaled / reference) as f64 + (scaled % reference) as f64 / reference as f64
}

/// Full outcome of one [`FrequencyValidator::validate_frequency`] call.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrequencyValidationResult {
    /// Verdict.
    pub status: ValidationResult,
    /// The input frequency.
    pub detected_frequency: u32,
    /// Nearest reference frequency (0 for zero input).
    pub closest_standard_frequency: u32,
    /// Measured deviation from `closest_standard_frequency`, in ppm.
    pub tolerance_ppm: f64,
    /// Clause of `closest_standard_frequency`.
    pub applicable_clause: ClauseId,
}

impl FrequencyValidationResult {
    const fn rejected(status: ValidationResult, detected_frequency: u32) -> Self {
        Self {
            status,
            detected_frequency,
            closest_standard_frequency: 0,
            tolerance_ppm: 0.0,
            applicable_clause: ClauseId::Unknown,
        }
    }

    /// `true` iff the verdict is [`ValidationResult::Valid`].
    pub const fn is_valid(&self) -> bool {
        self.status.is_valid()
    }

    /// Human-readable description of the verdict.
    pub const fn description(&self) -> &'static str {
        self.status.description()
    }
}

/// Context handed to [`frequency_validation_check`].
///
/// Carries the tolerance in and the full result out. Lives on the caller's
/// stack for the duration of one call.
#[derive(Debug)]
pub struct FrequencyCheck<'a> {
    engine: &'a ComplianceEngine,
    tolerance_ppm: u32,
    outcome: Cell<Option<FrequencyValidationResult>>,
}

impl<'a> FrequencyCheck<'a> {
    /// Context checking against `tolerance_ppm` with clauses from `engine`.
    pub fn new(engine: &'a ComplianceEngine, tolerance_ppm: u32) -> Self {
        Self {
            engine,
            tolerance_ppm,
            outcome: Cell::new(None),
        }
    }

    /// Result of the most recent check run with this context.
    pub fn outcome(&self) -> Option<FrequencyValidationResult> {
        self.outcome.get()
    }

    fn evaluate(&self, frequency_hz: u32) -> FrequencyValidationResult {
        if frequency_hz == 0 {
            return FrequencyValidationResult::rejected(ValidationResult::InvalidInput, 0);
        }
        let closest = closest_standard_frequency(frequency_hz);
        let deviation = tolerance_ppm(frequency_hz, closest);
        let status = if deviation <= f64::from(self.tolerance_ppm) {
            ValidationResult::Valid
        } else {
            ValidationResult::OutOfTolerance
        };
        FrequencyValidationResult {
            status,
            detected_frequency: frequency_hz,
            closest_standard_frequency: closest,
            tolerance_ppm: deviation,
            applicable_clause: self
                .engine
                .clause_for_frequency(closest)
                .unwrap_or(ClauseId::Unknown),
        }
    }
}

/// Frequency check in [`CheckFn`] shape, usable directly with
/// [`ValidationCore::validate`] and [`ValidationCore::batch_validate`].
///
/// A missing context yields [`ValidationResult::InternalError`].
pub fn frequency_validation_check(
    frequency_hz: u32,
    context: Option<&FrequencyCheck<'_>>,
) -> ValidationResult {
    let Some(context) = context else {
        return ValidationResult::InternalError;
    };
    let outcome = context.evaluate(frequency_hz);
    context.outcome.set(Some(outcome));
    outcome.status
}

/// Validates sampling frequencies against the AES5-2018 reference table.
///
/// Owns its [`ComplianceEngine`] and its runner; both are fixed at
/// construction. `Send + Sync` whenever the runner is.
#[derive(Debug)]
pub struct FrequencyValidator<R = ValidationCore> {
    engine: ComplianceEngine,
    core: R,
    default_tolerance_ppm: u32,
    realtime_budget_ns: u64,
}

impl<R: ValidationRunner> FrequencyValidator<R> {
    /// Builds a validator with the default tolerance and realtime budget.
    pub fn create(engine: ComplianceEngine, core: R) -> Self {
        debug!(
            tolerance_ppm = DEFAULT_TOLERANCE_PPM,
            budget_ns = VALIDATOR_REALTIME_BUDGET_NS,
            "frequency validator created"
        );
        Self {
            engine,
            core,
            default_tolerance_ppm: DEFAULT_TOLERANCE_PPM,
            realtime_budget_ns: VALIDATOR_REALTIME_BUDGET_NS,
        }
    }

    /// Builds a validator from user settings, rejecting unusable ones.
    pub fn with_config(
        engine: ComplianceEngine,
        core: R,
        settings: &ValidatorSettings,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        debug!(
            tolerance_ppm = settings.default_tolerance_ppm,
            budget_ns = settings.realtime_budget_ns,
            "frequency validator configured"
        );
        Ok(Self {
            engine,
            core,
            default_tolerance_ppm: settings.default_tolerance_ppm,
            realtime_budget_ns: settings.realtime_budget_ns,
        })
    }

    /// Validates `frequency_hz` against its nearest reference frequency.
    ///
    /// `Valid` iff the deviation is at most `tolerance_ppm`; zero input is
    /// `InvalidInput`. Records exactly one runner sample.
    pub fn validate_frequency(&self, frequency_hz: u32, tolerance_ppm: u32) -> FrequencyValidationResult {
        let context = FrequencyCheck::new(&self.engine, tolerance_ppm);
        let check_fn: CheckFn<FrequencyCheck<'_>> = frequency_validation_check;
        let status = self.core.validate(frequency_hz, Some(check_fn), Some(&context));
        context
            .outcome()
            .unwrap_or_else(|| FrequencyValidationResult::rejected(status, frequency_hz))
    }

    /// [`validate_frequency`](Self::validate_frequency) at the configured default tolerance.
    pub fn validate_frequency_default(&self, frequency_hz: u32) -> FrequencyValidationResult {
        self.validate_frequency(frequency_hz, self.default_tolerance_ppm)
    }

    /// Nearest reference frequency to `frequency_hz`.
    pub fn find_closest_standard_frequency(&self, frequency_hz: u32) -> u32 {
        closest_standard_frequency(frequency_hz)
    }

    /// Deviation of `measured_hz` from `reference_hz`, in ppm.
    pub fn calculate_tolerance_ppm(&self, measured_hz: u32, reference_hz: u32) -> f64 {
        tolerance_ppm(measured_hz, reference_hz)
    }

    /// `true` iff `frequency_hz` is within ±[`PRIMARY_TOLERANCE_HZ`] of 48 kHz.
    pub fn is_primary_frequency(&self, frequency_hz: u32) -> bool {
        frequency_hz.abs_diff(PRIMARY_FREQUENCY_HZ) <= PRIMARY_TOLERANCE_HZ
    }

    /// The reference table, sorted by frequency.
    pub fn standard_frequencies(&self) -> &'static [StandardFrequencyEntry] {
        &STANDARD_FREQUENCIES
    }

    /// The clause engine this validator attributes with.
    pub fn engine(&self) -> &ComplianceEngine {
        &self.engine
    }

    /// Tolerance used by [`validate_frequency_default`](Self::validate_frequency_default).
    pub fn default_tolerance_ppm(&self) -> u32 {
        self.default_tolerance_ppm
    }

    /// Runner counters.
    pub fn get_metrics(&self) -> MetricsSnapshot {
        self.core.metrics()
    }

    /// Zeroes the runner counters.
    pub fn reset_metrics(&self) {
        self.core.reset_metrics();
    }

    /// `true` iff the worst recorded latency is within `max_latency_ns`.
    pub fn meets_realtime_constraints(&self, max_latency_ns: u64) -> bool {
        self.core.meets_realtime_constraints(max_latency_ns)
    }

    /// Realtime check against the configured budget (50 µs unless configured).
    pub fn meets_default_realtime_constraints(&self) -> bool {
        self.meets_realtime_constraints(self.realtime_budget_ns)
    }
}
