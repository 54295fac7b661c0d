// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! AES5-2018 sampling-frequency validation core.
//!
//! Four components, composed bottom-up:
//!
//! - [`ComplianceEngine`]: clause reference → set of compliant frequencies.
//! - [`ValidationCore`]: lock-free, timing-instrumented wrapper around a
//!   caller-supplied check, aggregating [`ValidationMetrics`].
//! - [`FrequencyValidator`]: nearest reference frequency, ppm deviation,
//!   tolerance verdict and clause attribution.
//! - [`RateCategoryManager`]: Quarter…Octuple rate bands and the multiplier
//!   relative to the 48 kHz base.
//!
//! Collaborators are injected once through the `create` factories and never
//! reassigned:
//!
//! ```
//! use aes5_core::{ComplianceEngine, FrequencyValidator, ValidationCore, ValidationResult};
//!
//! let validator = FrequencyValidator::create(ComplianceEngine::new(), ValidationCore::new());
//! let result = validator.validate_frequency(48_000, 100);
//! assert_eq!(result.status, ValidationResult::Valid);
//! assert_eq!(validator.get_metrics().total_validations, 1);
//! ```
//!
//! # Hot-path contract
//!
//! Every validating call is synchronous, allocation-free and returns a value.
//! Nothing on the per-call path panics or logs; `tracing` events are emitted
//! only at construction, reset and configuration time.
//!
//! [`conversion`] carries sample-rate conversion *metadata* (reduced ratios,
//! samples per video frame). No audio is ever resampled here.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod clause;
mod compliance;
pub mod conversion;
mod frequency;
mod rate;
mod settings;
mod validation;

/// Clause identifiers and the compiled-in reference frequency table.
pub use clause::{
    ClauseId, StandardFrequencyEntry, UnknownClause, ANNEX_A_PULL_DOWN_HZ, ANNEX_A_PULL_UP_HZ,
    PRIMARY_FREQUENCY_HZ, STANDARD_FREQUENCIES,
};
/// Clause → frequency-set lookups.
pub use compliance::ComplianceEngine;
/// Main-line frequency check: closest reference, ppm deviation, clause.
pub use frequency::{
    frequency_validation_check, FrequencyCheck, FrequencyValidationResult, FrequencyValidator,
    DEFAULT_TOLERANCE_PPM, PRIMARY_TOLERANCE_HZ, TIGHT_TOLERANCE_PPM,
};
/// Rate-band classification relative to the 48 kHz base.
pub use rate::{RateCategory, RateCategoryManager, RateCategoryResult, BASE_FREQUENCY_HZ};
/// Tunable defaults shared by the validator, the rate manager and the CLI.
pub use settings::{SettingsError, ValidatorSettings};
/// Instrumented execution, metrics and the runner seam.
pub use validation::{
    CheckFn, MetricsSnapshot, ValidationCore, ValidationMetrics, ValidationResult,
    ValidationRunner, MAX_BATCH_SIZE,
};
