// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rate-band classification relative to the 48 kHz base (AES5-2018 §5.3).

use std::cell::Cell;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

use crate::settings::{SettingsError, ValidatorSettings};
use crate::validation::{CheckFn, MetricsSnapshot, ValidationCore, ValidationResult, ValidationRunner};

/// Reference frequency every multiplier is relative to.
pub const BASE_FREQUENCY_HZ: u32 = 48_000;

pub(crate) const RATE_REALTIME_BUDGET_NS: u64 = 10_000;

/// Rate band of a sampling frequency. Bands are disjoint and non-adjacent;
/// anything in a gap is [`RateCategory::Unknown`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum RateCategory {
    /// Outside every band.
    Unknown = 0,
    /// 7.75–13.5 kHz.
    Quarter = 1,
    /// 15.5–27 kHz.
    Half = 2,
    /// 31–54 kHz.
    Basic = 3,
    /// 62–108 kHz.
    Double = 4,
    /// 124–216 kHz.
    Quadruple = 5,
    /// 248–432 kHz.
    Octuple = 6,
}

impl RateCategory {
    /// The six named bands, ascending.
    pub const NAMED: [Self; 6] = [
        Self::Quarter,
        Self::Half,
        Self::Basic,
        Self::Double,
        Self::Quadruple,
        Self::Octuple,
    ];

    /// Classifies `frequency_hz` without touching any metrics.
    pub fn for_frequency(frequency_hz: u32) -> Self {
        classify(frequency_hz)
    }

    /// Lower-case band name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Quarter => "quarter",
            Self::Half => "half",
            Self::Basic => "basic",
            Self::Double => "double",
            Self::Quadruple => "quadruple",
            Self::Octuple => "octuple",
        }
    }

    /// AES5-2018 section defining the band.
    pub const fn section(self) -> Option<&'static str> {
        match self {
            Self::Unknown => None,
            _ => Some("5.3"),
        }
    }

    /// Inclusive hertz bounds of the band.
    pub const fn bounds(self) -> Option<(u32, u32)> {
        match self {
            Self::Unknown => None,
            Self::Quarter => Some((7_750, 13_500)),
            Self::Half => Some((15_500, 27_000)),
            Self::Basic => Some((31_000, 54_000)),
            Self::Double => Some((62_000, 108_000)),
            Self::Quadruple => Some((124_000, 216_000)),
            Self::Octuple => Some((248_000, 432_000)),
        }
    }

    /// [`bounds`](Self::bounds) as a range.
    pub fn frequency_range(self) -> Option<RangeInclusive<u32>> {
        self.bounds().map(|(lo, hi)| lo..=hi)
    }

    /// Multiplier of the band's nominal rate relative to 48 kHz.
    pub const fn nominal_multiplier(self) -> Option<f64> {
        match self {
            Self::Unknown => None,
            Self::Quarter => Some(0.25),
            Self::Half => Some(0.5),
            Self::Basic => Some(1.0),
            Self::Double => Some(2.0),
            Self::Quadruple => Some(4.0),
            Self::Octuple => Some(8.0),
        }
    }

    /// Human-readable description.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Unknown => "outside every AES5-2018 rate band",
            Self::Quarter => "quarter rate (nominally 12 kHz)",
            Self::Half => "half rate (nominally 24 kHz)",
            Self::Basic => "basic rate (nominally 48 kHz)",
            Self::Double => "double rate (nominally 96 kHz)",
            Self::Quadruple => "quadruple rate (nominally 192 kHz)",
            Self::Octuple => "octuple rate (nominally 384 kHz)",
        }
    }

    /// `false` only for [`RateCategory::Unknown`].
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    const fn from_tag(tag: u8) -> Self {
        match tag {
            1 => Self::Quarter,
            2 => Self::Half,
            3 => Self::Basic,
            4 => Self::Double,
            5 => Self::Quadruple,
            6 => Self::Octuple,
            _ => Self::Unknown,
        }
    }
}

const fn classify_by_range(frequency_hz: u32) -> RateCategory {
    match frequency_hz {
        7_750..=13_500 => RateCategory::Quarter,
        15_500..=27_000 => RateCategory::Half,
        31_000..=54_000 => RateCategory::Basic,
        62_000..=108_000 => RateCategory::Double,
        124_000..=216_000 => RateCategory::Quadruple,
        248_000..=432_000 => RateCategory::Octuple,
        _ => RateCategory::Unknown,
    }
}

/// One slot per whole kilohertz, 0 through 432 kHz.
const KHZ_TABLE_LEN: usize = 433;

static KHZ_TABLE: [RateCategory; KHZ_TABLE_LEN] = build_khz_table();

#[allow(clippy::cast_possible_truncation)]
const fn build_khz_table() -> [RateCategory; KHZ_TABLE_LEN] {
    let mut table = [RateCategory::Unknown; KHZ_TABLE_LEN];
    let mut khz = 0;
    while khz < KHZ_TABLE_LEN {
        table[khz] = classify_by_range(khz as u32 * 1_000);
        khz += 1;
    }
    table
}

fn classify(frequency_hz: u32) -> RateCategory {
    if frequency_hz % 1_000 == 0 {
        if let Some(&category) = KHZ_TABLE.get((frequency_hz / 1_000) as usize) {
            return category;
        }
    }
    classify_by_range(frequency_hz)
}

/// Outcome of [`RateCategoryManager::classify_rate_category`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RateCategoryResult {
    /// The input frequency.
    pub frequency_hz: u32,
    /// Band the frequency falls in.
    pub category: RateCategory,
    /// `frequency_hz / 48000` for a known band, `None` otherwise.
    pub multiplier: Option<f64>,
    /// `true` iff `category` is a named band.
    pub valid: bool,
}

impl RateCategoryResult {
    fn new(frequency_hz: u32, category: RateCategory) -> Self {
        let valid = category.is_known();
        Self {
            frequency_hz,
            category,
            multiplier: valid
                .then(|| f64::from(frequency_hz) / f64::from(BASE_FREQUENCY_HZ)),
            valid,
        }
    }
}

#[derive(Default)]
struct RateCheck {
    outcome: Cell<Option<RateCategory>>,
}

fn rate_classification_check(frequency_hz: u32, context: Option<&RateCheck>) -> ValidationResult {
    let Some(context) = context else {
        return ValidationResult::InternalError;
    };
    let category = classify(frequency_hz);
    context.outcome.set(Some(category));
    if category.is_known() {
        ValidationResult::Valid
    } else {
        ValidationResult::InvalidInput
    }
}

// Memo slot layout: bit 63 occupied, bits 32..40 category tag, bits 0..32 frequency.
const MEMO_OCCUPIED: u64 = 1 << 63;

const fn pack_memo(frequency_hz: u32, category: RateCategory) -> u64 {
    MEMO_OCCUPIED | ((category as u64) << 32) | frequency_hz as u64
}

#[allow(clippy::cast_possible_truncation)]
const fn unpack_memo(slot: u64) -> Option<(u32, RateCategory)> {
    if slot & MEMO_OCCUPIED == 0 {
        return None;
    }
    Some((slot as u32, RateCategory::from_tag((slot >> 32) as u8)))
}

/// Classifies frequencies into rate bands and derives the 48 kHz multiplier.
///
/// Repeating the last classified frequency is answered from a single-slot
/// memo without recording a metrics sample. The slot is one atomic word, so
/// sharing a manager between threads never yields a torn answer.
#[derive(Debug)]
pub struct RateCategoryManager<R = ValidationCore> {
    core: R,
    memo: AtomicU64,
    realtime_budget_ns: u64,
}

impl<R: ValidationRunner> RateCategoryManager<R> {
    /// Builds a manager with an empty memo and the 10 µs default budget.
    pub fn create(core: R) -> Self {
        debug!(budget_ns = RATE_REALTIME_BUDGET_NS, "rate category manager created");
        Self {
            core,
            memo: AtomicU64::new(0),
            realtime_budget_ns: RATE_REALTIME_BUDGET_NS,
        }
    }

    /// Builds a manager with the configured realtime budget.
    pub fn with_config(core: R, settings: &ValidatorSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        debug!(
            budget_ns = settings.rate_realtime_budget_ns,
            "rate category manager configured"
        );
        Ok(Self {
            core,
            memo: AtomicU64::new(0),
            realtime_budget_ns: settings.rate_realtime_budget_ns,
        })
    }

    /// Band, multiplier and validity of `frequency_hz`.
    pub fn classify_rate_category(&self, frequency_hz: u32) -> RateCategoryResult {
        if let Some((cached_hz, category)) = unpack_memo(self.memo.load(Ordering::Relaxed)) {
            if cached_hz == frequency_hz {
                return RateCategoryResult::new(frequency_hz, category);
            }
        }

        let context = RateCheck::default();
        let check_fn: CheckFn<RateCheck> = rate_classification_check;
        self.core.validate(frequency_hz, Some(check_fn), Some(&context));
        let category = context
            .outcome
            .get()
            .unwrap_or_else(|| classify(frequency_hz));

        self.memo
            .store(pack_memo(frequency_hz, category), Ordering::Relaxed);
        RateCategoryResult::new(frequency_hz, category)
    }

    /// Band of `frequency_hz`.
    pub fn get_rate_category(&self, frequency_hz: u32) -> RateCategory {
        self.classify_rate_category(frequency_hz).category
    }

    /// `frequency_hz / 48000` when in a band.
    pub fn calculate_rate_multiplier(&self, frequency_hz: u32) -> Option<f64> {
        self.classify_rate_category(frequency_hz).multiplier
    }

    /// `true` iff `frequency_hz` is in a named band.
    pub fn is_valid_rate_category(&self, frequency_hz: u32) -> bool {
        self.classify_rate_category(frequency_hz).valid
    }

    /// Forgets the memoised classification.
    pub fn clear_cache(&self) {
        self.memo.store(0, Ordering::Relaxed);
    }

    /// Runner counters.
    pub fn get_metrics(&self) -> MetricsSnapshot {
        self.core.metrics()
    }

    /// Zeroes the runner counters. The memo is kept.
    pub fn reset_metrics(&self) {
        self.core.reset_metrics();
    }

    /// `true` iff the worst recorded latency is within `max_latency_ns`.
    pub fn meets_realtime_constraints(&self, max_latency_ns: u64) -> bool {
        self.core.meets_realtime_constraints(max_latency_ns)
    }

    /// Realtime check against the configured budget (10 µs unless configured).
    pub fn meets_default_realtime_constraints(&self) -> bool {
        self.meets_realtime_constraints(self.realtime_budget_ns)
    }
}
