// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tunable defaults for the validator and the rate manager.

use thiserror::Error;

use crate::frequency::{DEFAULT_TOLERANCE_PPM, VALIDATOR_REALTIME_BUDGET_NS};
use crate::rate::RATE_REALTIME_BUDGET_NS;

/// Rejected [`ValidatorSettings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// A zero tolerance would reject every frequency that is not exact.
    #[error("[AES5_ZERO_TOLERANCE] default_tolerance_ppm must be greater than zero")]
    ZeroTolerance,
    /// A zero latency budget can never be met.
    #[error("[AES5_ZERO_BUDGET] {field} must be greater than zero")]
    ZeroBudget {
        /// Name of the offending field.
        field: &'static str,
    },
}

/// User-adjustable defaults. Missing fields deserialize to their defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ValidatorSettings {
    /// Tolerance used by `validate_frequency_default`, in ppm.
    pub default_tolerance_ppm: u32,
    /// Realtime budget of the frequency validator, in nanoseconds.
    pub realtime_budget_ns: u64,
    /// Realtime budget of the rate-category manager, in nanoseconds.
    pub rate_realtime_budget_ns: u64,
}

impl Default for ValidatorSettings {
    fn default() -> Self {
        Self {
            default_tolerance_ppm: DEFAULT_TOLERANCE_PPM,
            realtime_budget_ns: VALIDATOR_REALTIME_BUDGET_NS,
            rate_realtime_budget_ns: RATE_REALTIME_BUDGET_NS,
        }
    }
}

impl ValidatorSettings {
    /// Checks that every field is usable.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.default_tolerance_ppm == 0 {
            return Err(SettingsError::ZeroTolerance);
        }
        if self.realtime_budget_ns == 0 {
            return Err(SettingsError::ZeroBudget {
                field: "realtime_budget_ns",
            });
        }
        if self.rate_realtime_budget_ns == 0 {
            return Err(SettingsError::ZeroBudget {
                field: "rate_realtime_budget_ns",
            });
        }
        Ok(())
    }

    /// Copy with a different default tolerance.
    pub fn with_tolerance_ppm(self, default_tolerance_ppm: u32) -> Self {
        Self {
            default_tolerance_ppm,
            ..self
        }
    }
}
