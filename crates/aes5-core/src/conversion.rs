// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Metadata about moving audio between sampling frequencies and video frame
//! rates. Nothing here touches samples.
//!
//! ```
//! use aes5_core::conversion::{samples_per_video_frame, ConversionRatio, VideoFrameRate};
//!
//! let ratio = ConversionRatio::between(32_000, 48_000).unwrap();
//! assert_eq!((ratio.numerator(), ratio.denominator()), (3, 2));
//! assert!(ratio.is_simple());
//!
//! let ntsc = samples_per_video_frame(48_000, VideoFrameRate::Ntsc29_97);
//! assert_eq!((ntsc.samples_per_cycle(), ntsc.frames_per_cycle()), (8_008, 5));
//! ```

use std::fmt;

/// Largest term a conversion ratio may have and still count as simple.
pub const SIMPLE_RATIO_MAX_TERM: u32 = 8;

const fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Reduced `target:source` ratio: output samples per input samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConversionRatio {
    numerator: u32,
    denominator: u32,
}

impl ConversionRatio {
    /// Ratio for converting `source_hz` to `target_hz`; `None` if either is zero.
    #[allow(clippy::cast_possible_truncation)]
    pub fn between(source_hz: u32, target_hz: u32) -> Option<Self> {
        if source_hz == 0 || target_hz == 0 {
            return None;
        }
        // The gcd divides both, so the quotients still fit in u32.
        let g = gcd(u64::from(target_hz), u64::from(source_hz)) as u32;
        Some(Self {
            numerator: target_hz / g,
            denominator: source_hz / g,
        })
    }

    /// Output-side term.
    pub const fn numerator(&self) -> u32 {
        self.numerator
    }

    /// Input-side term.
    pub const fn denominator(&self) -> u32 {
        self.denominator
    }

    /// Both terms are at most [`SIMPLE_RATIO_MAX_TERM`].
    pub const fn is_simple(&self) -> bool {
        self.numerator <= SIMPLE_RATIO_MAX_TERM && self.denominator <= SIMPLE_RATIO_MAX_TERM
    }

    /// 1:1.
    pub const fn is_identity(&self) -> bool {
        self.numerator == 1 && self.denominator == 1
    }

    /// The ratio as a float.
    pub fn as_f64(&self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }
}

impl fmt::Display for ConversionRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.numerator, self.denominator)
    }
}

/// Video frame rates with a defined audio relationship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VideoFrameRate {
    /// Film, 24 fps.
    Fps24,
    /// PAL, 25 fps.
    Fps25,
    /// 30 fps.
    Fps30,
    /// PAL progressive, 50 fps.
    Fps50,
    /// 60 fps.
    Fps60,
    /// 24000/1001 fps.
    Ntsc23_976,
    /// 30000/1001 fps.
    Ntsc29_97,
    /// 60000/1001 fps.
    Ntsc59_94,
}

impl VideoFrameRate {
    /// Every supported rate, integer rates first.
    pub const ALL: [Self; 8] = [
        Self::Fps24,
        Self::Fps25,
        Self::Fps30,
        Self::Fps50,
        Self::Fps60,
        Self::Ntsc23_976,
        Self::Ntsc29_97,
        Self::Ntsc59_94,
    ];

    /// Exact rate as `(frames, seconds)`.
    pub const fn as_fraction(self) -> (u32, u32) {
        match self {
            Self::Fps24 => (24, 1),
            Self::Fps25 => (25, 1),
            Self::Fps30 => (30, 1),
            Self::Fps50 => (50, 1),
            Self::Fps60 => (60, 1),
            Self::Ntsc23_976 => (24_000, 1_001),
            Self::Ntsc29_97 => (30_000, 1_001),
            Self::Ntsc59_94 => (60_000, 1_001),
        }
    }

    /// Conventional label (`"25"`, `"29.97"`).
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fps24 => "24",
            Self::Fps25 => "25",
            Self::Fps30 => "30",
            Self::Fps50 => "50",
            Self::Fps60 => "60",
            Self::Ntsc23_976 => "23.976",
            Self::Ntsc29_97 => "29.97",
            Self::Ntsc59_94 => "59.94",
        }
    }

    /// `true` for the 1000/1001 rates.
    pub const fn is_ntsc(self) -> bool {
        matches!(self, Self::Ntsc23_976 | Self::Ntsc29_97 | Self::Ntsc59_94)
    }
}

impl fmt::Display for VideoFrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} fps", self.label())
    }
}

/// Samples per video frame as an exact reduced fraction.
///
/// `samples_per_cycle` samples span exactly `frames_per_cycle` frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SamplesPerFrame {
    /// Audio sampling frequency.
    pub sample_rate_hz: u32,
    /// Video frame rate.
    pub frame_rate: VideoFrameRate,
    samples: u64,
    frames: u64,
}

impl SamplesPerFrame {
    /// Samples in one frame cycle.
    pub const fn samples_per_cycle(&self) -> u64 {
        self.samples
    }

    /// Frames after which the sample count becomes integral again.
    pub const fn frames_per_cycle(&self) -> u64 {
        self.frames
    }

    /// Every frame carries the same whole number of samples.
    pub const fn is_integer(&self) -> bool {
        self.frames == 1
    }

    /// Mean samples per frame.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> f64 {
        self.samples as f64 / self.frames as f64
    }
}

/// Exact samples per frame of `sample_rate_hz` audio at `frame_rate`.
pub fn samples_per_video_frame(sample_rate_hz: u32, frame_rate: VideoFrameRate) -> SamplesPerFrame {
    let (frames, seconds) = frame_rate.as_fraction();
    let samples = u64::from(sample_rate_hz) * u64::from(seconds);
    let frames = u64::from(frames);
    let g = gcd(samples, frames).max(1);
    SamplesPerFrame {
        sample_rate_hz,
        frame_rate,
        samples: samples / g,
        frames: frames / g,
    }
}

/// Half of `sample_rate_hz`, rounded down.
pub const fn nyquist_hz(sample_rate_hz: u32) -> u32 {
    sample_rate_hz / 2
}

/// `true` iff the Nyquist frequency of `sample_rate_hz` is strictly above `bandwidth_hz`.
pub fn supports_bandwidth(sample_rate_hz: u32, bandwidth_hz: u32) -> bool {
    u64::from(sample_rate_hz) > 2 * u64::from(bandwidth_hz)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn reduces_ratios() {
        let r = ConversionRatio::between(32_000, 48_000).unwrap();
        assert_eq!(r.to_string(), "3:2");
        assert!(r.is_simple());

        let r = ConversionRatio::between(32_000, 44_100).unwrap();
        assert_eq!(r.to_string(), "441:320");
        assert!(!r.is_simple());

        let r = ConversionRatio::between(48_000, 44_100).unwrap();
        assert_eq!((r.numerator(), r.denominator()), (147, 160));
    }

    #[test]
    fn identity_and_zero() {
        assert!(ConversionRatio::between(48_000, 48_000).unwrap().is_identity());
        assert_eq!(ConversionRatio::between(0, 48_000), None);
        assert_eq!(ConversionRatio::between(48_000, 0), None);
        let double = ConversionRatio::between(48_000, 96_000).unwrap();
        assert!((double.as_f64() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn primary_frequency_per_integer_frame_rate() {
        for (rate, expected) in [
            (VideoFrameRate::Fps24, 2_000),
            (VideoFrameRate::Fps25, 1_920),
            (VideoFrameRate::Fps30, 1_600),
            (VideoFrameRate::Fps50, 960),
            (VideoFrameRate::Fps60, 800),
        ] {
            let spf = samples_per_video_frame(48_000, rate);
            assert!(spf.is_integer(), "{rate}");
            assert_eq!(spf.samples_per_cycle(), expected);
        }
        assert_eq!(
            samples_per_video_frame(44_100, VideoFrameRate::Fps25).samples_per_cycle(),
            1_764
        );
    }

    #[test]
    fn ntsc_rates_cycle_over_several_frames() {
        let spf = samples_per_video_frame(48_000, VideoFrameRate::Ntsc29_97);
        assert!(!spf.is_integer());
        assert_eq!((spf.samples_per_cycle(), spf.frames_per_cycle()), (8_008, 5));
        assert!((spf.as_f64() - 1_601.6).abs() < 1e-9);

        let film = samples_per_video_frame(48_000, VideoFrameRate::Ntsc23_976);
        assert_eq!((film.samples_per_cycle(), film.frames_per_cycle()), (2_002, 1));

        let progressive = samples_per_video_frame(48_000, VideoFrameRate::Ntsc59_94);
        assert_eq!(
            (progressive.samples_per_cycle(), progressive.frames_per_cycle()),
            (4_004, 5)
        );
    }

    #[test]
    fn nyquist_limits() {
        assert_eq!(nyquist_hz(48_000), 24_000);
        assert!(supports_bandwidth(48_000, 20_000));
        assert!(supports_bandwidth(32_000, 15_000));
        assert!(!supports_bandwidth(40_000, 20_000));
        assert!(supports_bandwidth(96_000, 40_000));
    }
}
