// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Clause identifiers and the compiled-in AES5-2018 reference table.
//!
//! # Canonical clause map
//!
//! Every reference frequency belongs to exactly one clause:
//!
//! | clause | frequencies (Hz) |
//! |--------|------------------|
//! | 5.1    | 48 000 |
//! | 5.2    | 44 100, 88 200, 96 000, 176 400, 192 000, 384 000 |
//! | 5.4    | 32 000 |
//! | A      | 47 952, 48 048 |
//!
//! The integer multiples of the 44.1/48 kHz families live under 5.2; there is
//! no separate "multiples" clause. [`ComplianceEngine`](crate::ComplianceEngine)
//! and [`FrequencyValidator`](crate::FrequencyValidator) both read this table,
//! so their clause attribution cannot drift apart.

use std::fmt;
use std::str::FromStr;

/// AES5-2018 Section 5.1 primary sampling frequency.
pub const PRIMARY_FREQUENCY_HZ: u32 = 48_000;

/// 48 kHz pulled down by 1000/1001 (Annex A), rounded to the nearest hertz.
pub const ANNEX_A_PULL_DOWN_HZ: u32 = 47_952;

/// 48 kHz pulled up by 1001/1000 (Annex A).
pub const ANNEX_A_PULL_UP_HZ: u32 = 48_048;

/// Identifier for a rule within AES5-2018 that a frequency can satisfy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ClauseId {
    /// Section 5.1: primary sampling frequency (48 kHz).
    Section5_1,
    /// Section 5.2: other recommended frequencies and their integer multiples.
    Section5_2,
    /// Section 5.4: legacy sampling frequency (32 kHz).
    Section5_4,
    /// Annex A: pull-up / pull-down variants of 48 kHz.
    AnnexA,
    /// No clause applies.
    Unknown,
}

impl ClauseId {
    /// Every clause that has a frequency set, in table order.
    pub const KNOWN: [Self; 4] = [
        Self::Section5_1,
        Self::Section5_2,
        Self::Section5_4,
        Self::AnnexA,
    ];

    /// Canonical textual reference (`"5.1"`, `"5.2"`, `"5.4"`, `"A"`, `"unknown"`).
    pub const fn reference(self) -> &'static str {
        match self {
            Self::Section5_1 => "5.1",
            Self::Section5_2 => "5.2",
            Self::Section5_4 => "5.4",
            Self::AnnexA => "A",
            Self::Unknown => "unknown",
        }
    }

    /// Short human-readable title of the clause.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Section5_1 => "primary sampling frequency",
            Self::Section5_2 => "other recommended sampling frequencies",
            Self::Section5_4 => "legacy sampling frequency",
            Self::AnnexA => "pull-up/pull-down variants",
            Self::Unknown => "not covered by AES5-2018",
        }
    }

    /// Lossy parse: anything unrecognised becomes [`ClauseId::Unknown`].
    pub fn from_reference(text: &str) -> Self {
        text.parse().unwrap_or(Self::Unknown)
    }

    /// Returns `true` for every variant except [`ClauseId::Unknown`].
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub(crate) const fn table_index(self) -> Option<usize> {
        match self {
            Self::Section5_1 => Some(0),
            Self::Section5_2 => Some(1),
            Self::Section5_4 => Some(2),
            Self::AnnexA => Some(3),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for ClauseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reference())
    }
}

/// A clause reference that does not name any AES5-2018 clause this crate knows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("[AES5_UNKNOWN_CLAUSE] {0:?} is not a recognised AES5-2018 clause reference")]
pub struct UnknownClause(pub String);

impl FromStr for ClauseId {
    type Err = UnknownClause;

    /// Accepts `5.1`, `5.2`, `5.4`, `A`, `A.1` and `Annex A`, case-insensitively,
    /// with an optional `AES5-2018` / `AES5` prefix and optional `Section`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let mut rest = lowered.as_str();
        for prefix in ["aes5-2018", "aes5"] {
            if let Some(stripped) = rest.strip_prefix(prefix) {
                rest = stripped.trim_start_matches([' ', ':', '-']);
                break;
            }
        }
        rest = rest
            .strip_prefix("section")
            .or_else(|| rest.strip_prefix('§'))
            .unwrap_or(rest)
            .trim_start();
        match rest {
            "5.1" => Ok(Self::Section5_1),
            "5.2" => Ok(Self::Section5_2),
            "5.4" => Ok(Self::Section5_4),
            "a" | "a.1" | "annex a" | "annex_a" | "annex-a" => Ok(Self::AnnexA),
            _ => Err(UnknownClause(s.to_owned())),
        }
    }
}

/// One reference point of the AES5-2018 table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StandardFrequencyEntry {
    /// Nominal sampling frequency in hertz.
    pub nominal_frequency_hz: u32,
    /// Clause the frequency satisfies.
    pub clause: ClauseId,
    /// Default acceptance band around the nominal frequency.
    pub tolerance_ppm: u32,
}

impl StandardFrequencyEntry {
    const fn new(nominal_frequency_hz: u32, clause: ClauseId) -> Self {
        Self {
            nominal_frequency_hz,
            clause,
            tolerance_ppm: crate::DEFAULT_TOLERANCE_PPM,
        }
    }

    /// Inclusive `(min, max)` hertz band implied by `tolerance_ppm`.
    ///
    /// Computed in integer arithmetic; the band edges are truncated towards the
    /// nominal frequency so that every value inside is really within tolerance.
    pub const fn tolerance_band(&self) -> (u32, u32) {
        let nominal = self.nominal_frequency_hz as u64;
        let delta = nominal * self.tolerance_ppm as u64 / 1_000_000;
        #[allow(clippy::cast_possible_truncation)]
        let delta = delta as u32;
        (
            self.nominal_frequency_hz.saturating_sub(delta),
            self.nominal_frequency_hz.saturating_add(delta),
        )
    }
}

/// The reference table, sorted by frequency.
pub const STANDARD_FREQUENCIES: [StandardFrequencyEntry; 10] = [
    StandardFrequencyEntry::new(32_000, ClauseId::Section5_4),
    StandardFrequencyEntry::new(44_100, ClauseId::Section5_2),
    StandardFrequencyEntry::new(ANNEX_A_PULL_DOWN_HZ, ClauseId::AnnexA),
    StandardFrequencyEntry::new(PRIMARY_FREQUENCY_HZ, ClauseId::Section5_1),
    StandardFrequencyEntry::new(ANNEX_A_PULL_UP_HZ, ClauseId::AnnexA),
    StandardFrequencyEntry::new(88_200, ClauseId::Section5_2),
    StandardFrequencyEntry::new(96_000, ClauseId::Section5_2),
    StandardFrequencyEntry::new(176_400, ClauseId::Section5_2),
    StandardFrequencyEntry::new(192_000, ClauseId::Section5_2),
    StandardFrequencyEntry::new(384_000, ClauseId::Section5_2),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_and_unique() {
        for pair in STANDARD_FREQUENCIES.windows(2) {
            assert!(pair[0].nominal_frequency_hz < pair[1].nominal_frequency_hz);
        }
    }

    #[test]
    fn pull_variants_follow_the_1001_factor() {
        assert_eq!(ANNEX_A_PULL_UP_HZ, PRIMARY_FREQUENCY_HZ * 1001 / 1000);
        // 48000 * 1000 / 1001 = 47952.047...
        assert_eq!(
            ANNEX_A_PULL_DOWN_HZ,
            PRIMARY_FREQUENCY_HZ * 1000 / 1001
        );
    }

    #[test]
    fn parses_clause_references() {
        assert_eq!("5.1".parse::<ClauseId>(), Ok(ClauseId::Section5_1));
        assert_eq!(" 5.2 ".parse::<ClauseId>(), Ok(ClauseId::Section5_2));
        assert_eq!("AES5-2018 Section 5.4".parse::<ClauseId>(), Ok(ClauseId::Section5_4));
        assert_eq!("A.1".parse::<ClauseId>(), Ok(ClauseId::AnnexA));
        assert_eq!("Annex A".parse::<ClauseId>(), Ok(ClauseId::AnnexA));
        assert_eq!(
            "nonexistent-clause".parse::<ClauseId>(),
            Err(UnknownClause("nonexistent-clause".to_owned()))
        );
        assert_eq!(ClauseId::from_reference("5.3"), ClauseId::Unknown);
    }

    #[test]
    fn display_round_trips_through_parse() {
        for clause in ClauseId::KNOWN {
            assert_eq!(clause.to_string().parse::<ClauseId>(), Ok(clause));
        }
        assert_eq!(ClauseId::Unknown.to_string(), "unknown");
        assert!(!ClauseId::Unknown.is_known());
    }

    #[test]
    fn tolerance_band_brackets_nominal() {
        let primary = STANDARD_FREQUENCIES[3];
        assert_eq!(primary.nominal_frequency_hz, 48_000);
        assert_eq!(primary.tolerance_band(), (47_996, 48_004));
    }
}
