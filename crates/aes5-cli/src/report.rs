// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Table and JSON rendering.

use aes5_core::conversion::{ConversionRatio, SamplesPerFrame};
use aes5_core::{
    FrequencyValidationResult, RateCategoryResult, StandardFrequencyEntry, ValidationResult,
    ValidatorSettings,
};
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

fn table<const N: usize>(header: [&str; N]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub const fn status_label(status: ValidationResult) -> &'static str {
    match status {
        ValidationResult::Valid => "valid",
        ValidationResult::InvalidInput => "invalid input",
        ValidationResult::OutOfTolerance => "out of tolerance",
        ValidationResult::InternalError => "internal error",
    }
}

pub fn validations(results: &[FrequencyValidationResult]) -> Table {
    let mut t = table(["frequency (Hz)", "closest (Hz)", "deviation (ppm)", "clause", "status"]);
    for r in results {
        t.add_row(vec![
            r.detected_frequency.to_string(),
            r.closest_standard_frequency.to_string(),
            format!("{:.2}", r.tolerance_ppm),
            r.applicable_clause.to_string(),
            status_label(r.status).to_owned(),
        ]);
    }
    t
}

pub fn classifications(results: &[RateCategoryResult]) -> Table {
    let mut t = table(["frequency (Hz)", "category", "multiplier", "valid"]);
    for r in results {
        t.add_row(vec![
            r.frequency_hz.to_string(),
            r.category.name().to_owned(),
            r.multiplier.map_or_else(|| "-".to_owned(), |m| format!("{m:.4}")),
            r.valid.to_string(),
        ]);
    }
    t
}

pub fn reference_table(entries: &[StandardFrequencyEntry]) -> Table {
    let mut t = table(["frequency (Hz)", "clause", "title", "tolerance (ppm)", "band (Hz)"]);
    for e in entries {
        let (lo, hi) = e.tolerance_band();
        t.add_row(vec![
            e.nominal_frequency_hz.to_string(),
            e.clause.to_string(),
            e.clause.title().to_owned(),
            e.tolerance_ppm.to_string(),
            format!("{lo}..={hi}"),
        ]);
    }
    t
}

#[derive(Debug, Serialize)]
pub struct RatioReport {
    pub source_hz: u32,
    pub target_hz: u32,
    pub ratio: String,
    pub numerator: u32,
    pub denominator: u32,
    pub simple: bool,
    pub identity: bool,
}

impl RatioReport {
    pub fn new(source_hz: u32, target_hz: u32, ratio: ConversionRatio) -> Self {
        Self {
            source_hz,
            target_hz,
            ratio: ratio.to_string(),
            numerator: ratio.numerator(),
            denominator: ratio.denominator(),
            simple: ratio.is_simple(),
            identity: ratio.is_identity(),
        }
    }

    pub fn table(&self) -> Table {
        let mut t = table(["source (Hz)", "target (Hz)", "ratio", "simple"]);
        t.add_row(vec![
            self.source_hz.to_string(),
            self.target_hz.to_string(),
            self.ratio.clone(),
            self.simple.to_string(),
        ]);
        t
    }
}

#[derive(Debug, Serialize)]
pub struct FrameRow {
    pub frame_rate: &'static str,
    pub samples_per_frame: f64,
    pub samples_per_cycle: u64,
    pub frames_per_cycle: u64,
    pub integer: bool,
}

impl From<&SamplesPerFrame> for FrameRow {
    fn from(spf: &SamplesPerFrame) -> Self {
        Self {
            frame_rate: spf.frame_rate.label(),
            samples_per_frame: spf.as_f64(),
            samples_per_cycle: spf.samples_per_cycle(),
            frames_per_cycle: spf.frames_per_cycle(),
            integer: spf.is_integer(),
        }
    }
}

pub fn frames(rows: &[FrameRow]) -> Table {
    let mut t = table(["fps", "samples/frame", "cycle", "integer"]);
    for row in rows {
        t.add_row(vec![
            row.frame_rate.to_owned(),
            format!("{:.3}", row.samples_per_frame),
            format!("{} / {}", row.samples_per_cycle, row.frames_per_cycle),
            row.integer.to_string(),
        ]);
    }
    t
}

pub fn settings(settings: &ValidatorSettings, location: &str) -> Table {
    let mut t = table(["setting", "value"]);
    t.add_row(vec!["default_tolerance_ppm".to_owned(), settings.default_tolerance_ppm.to_string()]);
    t.add_row(vec!["realtime_budget_ns".to_owned(), settings.realtime_budget_ns.to_string()]);
    t.add_row(vec![
        "rate_realtime_budget_ns".to_owned(),
        settings.rate_realtime_budget_ns.to_string(),
    ]);
    t.add_row(vec!["location".to_owned(), location.to_owned()]);
    t
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes5_core::conversion::{samples_per_video_frame, VideoFrameRate};
    use aes5_core::STANDARD_FREQUENCIES;

    #[test]
    fn reference_table_has_a_row_per_entry() {
        let rendered = reference_table(&STANDARD_FREQUENCIES).to_string();
        assert!(rendered.contains("47952"));
        assert!(rendered.contains("47996..=48004"));
        assert_eq!(reference_table(&STANDARD_FREQUENCIES).row_iter().count(), STANDARD_FREQUENCIES.len());
    }

    #[test]
    fn frame_rows_show_the_cycle() {
        let row = FrameRow::from(&samples_per_video_frame(48_000, VideoFrameRate::Ntsc29_97));
        assert_eq!(row.frame_rate, "29.97");
        assert!(frames(&[row]).to_string().contains("8008 / 5"));
    }
}
