// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Clause → compliant-frequency lookups.

use std::sync::OnceLock;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::clause::{ClauseId, STANDARD_FREQUENCIES};

struct ClauseTable {
    by_clause: [FxHashSet<u32>; 4],
    all: FxHashSet<u32>,
    empty: FxHashSet<u32>,
}

impl ClauseTable {
    fn build() -> Self {
        let mut by_clause: [FxHashSet<u32>; 4] = Default::default();
        let mut all = FxHashSet::default();
        for entry in &STANDARD_FREQUENCIES {
            if let Some(index) = entry.clause.table_index() {
                by_clause[index].insert(entry.nominal_frequency_hz);
            }
            all.insert(entry.nominal_frequency_hz);
        }
        debug!(
            clauses = by_clause.len(),
            frequencies = all.len(),
            "AES5 clause table built"
        );
        Self {
            by_clause,
            all,
            empty: FxHashSet::default(),
        }
    }

    fn set(&self, clause: ClauseId) -> &FxHashSet<u32> {
        clause
            .table_index()
            .map_or(&self.empty, |index| &self.by_clause[index])
    }
}

static CLAUSE_TABLE: OnceLock<ClauseTable> = OnceLock::new();

/// Answers "does frequency *f* satisfy clause *c*?".
///
/// Immutable after construction; the clause sets are built once per process
/// and shared by every engine. `Send + Sync`, cheap to copy.
#[derive(Clone, Copy)]
pub struct ComplianceEngine {
    table: &'static ClauseTable,
}

impl ComplianceEngine {
    /// Returns an engine backed by the process-wide clause table.
    pub fn new() -> Self {
        Self {
            table: CLAUSE_TABLE.get_or_init(ClauseTable::build),
        }
    }

    /// `true` iff `frequency_hz` is in the set of `clause`.
    ///
    /// Zero is never compliant; [`ClauseId::Unknown`] has an empty set.
    pub fn verify_clause_compliance(&self, frequency_hz: u32, clause: ClauseId) -> bool {
        frequency_hz != 0 && self.table.set(clause).contains(&frequency_hz)
    }

    /// Same as [`verify_clause_compliance`](Self::verify_clause_compliance)
    /// with a textual reference such as `"5.1"` or `"Annex A"`.
    ///
    /// An unparseable reference is not compliant.
    pub fn verify_clause_reference(&self, frequency_hz: u32, reference: &str) -> bool {
        self.verify_clause_compliance(frequency_hz, ClauseId::from_reference(reference))
    }

    /// The frequency set of `clause`; empty for [`ClauseId::Unknown`].
    pub fn get_supported_frequencies(&self, clause: ClauseId) -> &'static FxHashSet<u32> {
        self.table.set(clause)
    }

    /// Every frequency any clause accepts.
    pub fn all_supported_frequencies(&self) -> &'static FxHashSet<u32> {
        &self.table.all
    }

    /// `true` iff `clause` has a non-empty frequency set.
    pub fn is_clause_supported(&self, clause: ClauseId) -> bool {
        !self.table.set(clause).is_empty()
    }

    /// The clause whose set contains `frequency_hz`, if any.
    pub fn clause_for_frequency(&self, frequency_hz: u32) -> Option<ClauseId> {
        ClauseId::KNOWN
            .into_iter()
            .find(|&clause| self.verify_clause_compliance(frequency_hz, clause))
    }
}

impl Default for ComplianceEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ComplianceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComplianceEngine")
            .field("frequencies", &self.table.all.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_frequency_is_section_5_1_only() {
        let engine = ComplianceEngine::new();
        assert!(engine.verify_clause_compliance(48_000, ClauseId::Section5_1));
        assert!(!engine.verify_clause_compliance(48_000, ClauseId::Section5_2));
        assert!(!engine.verify_clause_compliance(44_100, ClauseId::Section5_1));
    }

    #[test]
    fn zero_and_unknown_are_never_compliant() {
        let engine = ComplianceEngine::new();
        for clause in ClauseId::KNOWN {
            assert!(!engine.verify_clause_compliance(0, clause));
        }
        assert!(!engine.verify_clause_compliance(48_000, ClauseId::Unknown));
        assert!(engine.get_supported_frequencies(ClauseId::Unknown).is_empty());
        assert!(!engine.is_clause_supported(ClauseId::Unknown));
    }

    #[test]
    fn clause_sets_match_the_reference_table() {
        let engine = ComplianceEngine::new();
        let five_two = engine.get_supported_frequencies(ClauseId::Section5_2);
        for f in [44_100, 88_200, 96_000, 176_400, 192_000, 384_000] {
            assert!(five_two.contains(&f), "{f} missing from 5.2");
        }
        assert_eq!(five_two.len(), 6);

        let annex = engine.get_supported_frequencies(ClauseId::AnnexA);
        assert!(annex.contains(&47_952) && annex.contains(&48_048));
        assert_eq!(engine.all_supported_frequencies().len(), STANDARD_FREQUENCIES.len());
    }

    #[test]
    fn textual_references_resolve() {
        let engine = ComplianceEngine::new();
        assert!(engine.verify_clause_reference(32_000, "5.4"));
        assert!(engine.verify_clause_reference(48_048, "Annex A"));
        assert!(!engine.verify_clause_reference(48_000, "nonexistent-clause"));
    }

    #[test]
    fn every_reference_frequency_has_exactly_one_clause() {
        let engine = ComplianceEngine::new();
        for entry in &STANDARD_FREQUENCIES {
            let hits = ClauseId::KNOWN
                .into_iter()
                .filter(|&c| engine.verify_clause_compliance(entry.nominal_frequency_hz, c))
                .count();
            assert_eq!(hits, 1);
            assert_eq!(
                engine.clause_for_frequency(entry.nominal_frequency_hz),
                Some(entry.clause)
            );
        }
        assert_eq!(engine.clause_for_frequency(22_050), None);
    }
}
