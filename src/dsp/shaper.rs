//! Waveshaper Bank
//!
//! Eight nonlinear transfer curves, each mapping one input sample to one
//! output sample with no memory. The bank is a plain function table indexed
//! by [`Waveshaper`]: it carries no mutable state, so it is safe to call
//! from any thread.

use serde::{Deserialize, Serialize};

/// Number of transfer curves in the bank
pub const WAVESHAPER_COUNT: usize = 8;

/// Selectable distortion transfer curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Waveshaper {
    /// Symmetric clamp at ±0.5
    HardClip,
    /// Cubic soft knee, saturating at ±1, whole curve scaled by 0.5
    SoftClip,
    /// Exponential approach to ±1
    Exponential,
    /// Absolute value; output is never negative
    #[default]
    FullWaveRectifier,
    /// Positive half only
    HalfWaveRectifier,
    /// Three iterated cubic stages; diverges for inputs beyond ~1.3
    ArayaSuyama,
    /// (2|x| - x^2) * sign(x)
    DoidicSymmetric,
    /// Three-region asymmetric polynomial over [-1, 1]
    DoidicAsymmetric,
}

impl Waveshaper {
    /// All curves, in bank order
    pub const ALL: [Waveshaper; WAVESHAPER_COUNT] = [
        Waveshaper::HardClip,
        Waveshaper::SoftClip,
        Waveshaper::Exponential,
        Waveshaper::FullWaveRectifier,
        Waveshaper::HalfWaveRectifier,
        Waveshaper::ArayaSuyama,
        Waveshaper::DoidicSymmetric,
        Waveshaper::DoidicAsymmetric,
    ];

    /// Display labels, in bank order
    pub const LABELS: [&'static str; WAVESHAPER_COUNT] = [
        "Hard clipping",
        "Soft clipping",
        "Exponential",
        "Full-wave rectifier",
        "Half-wave rectifier",
        "Araya & Suyama",
        "Doidic symmetric",
        "Doidic asymmetric",
    ];

    /// Look up a curve by bank index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Curve for a raw control-parameter value (round, then clamp to the bank)
    pub fn from_target(value: f32) -> Self {
        let index = value.round().clamp(0.0, (WAVESHAPER_COUNT - 1) as f32) as usize;
        Self::ALL[index]
    }

    /// Bank index of this curve
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        Self::LABELS[self.index()]
    }

    /// Parse a curve from a bank index or a label fragment
    pub fn parse(raw: &str) -> Option<Self> {
        if let Ok(index) = raw.trim().parse::<usize>() {
            return Self::from_index(index);
        }
        match raw.trim().to_ascii_lowercase().as_str() {
            "hard" | "hard-clip" | "hard clipping" => Some(Self::HardClip),
            "soft" | "soft-clip" | "soft clipping" => Some(Self::SoftClip),
            "exp" | "exponential" => Some(Self::Exponential),
            "full-wave" | "full" | "full-wave rectifier" => Some(Self::FullWaveRectifier),
            "half-wave" | "half" | "half-wave rectifier" => Some(Self::HalfWaveRectifier),
            "araya" | "araya-suyama" => Some(Self::ArayaSuyama),
            "doidic-sym" | "doidic symmetric" => Some(Self::DoidicSymmetric),
            "doidic-asym" | "doidic asymmetric" => Some(Self::DoidicAsymmetric),
            _ => None,
        }
    }

    /// Apply this curve to one sample
    #[inline]
    pub fn apply(self, sample: f32) -> f32 {
        match self {
            Waveshaper::HardClip => hard_clip(sample),
            Waveshaper::SoftClip => soft_clip(sample),
            Waveshaper::Exponential => exponential(sample),
            Waveshaper::FullWaveRectifier => full_wave_rectifier(sample),
            Waveshaper::HalfWaveRectifier => half_wave_rectifier(sample),
            Waveshaper::ArayaSuyama => araya_suyama(sample),
            Waveshaper::DoidicSymmetric => doidic_symmetric(sample),
            Waveshaper::DoidicAsymmetric => doidic_asymmetric(sample),
        }
    }

    /// Apply this curve to a whole channel in place
    pub fn process(self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.apply(*sample);
        }
    }
}

// ============================================================================
// Transfer functions
// ============================================================================

fn hard_clip(x: f32) -> f32 {
    x.clamp(-0.5, 0.5)
}

/// Linear up to ±1/3, quadratic knee to ±2/3, flat at ±1 beyond; the whole
/// curve is scaled by 0.5, so the linear region passes samples through
/// unchanged and output stays inside ±0.5.
fn soft_clip(x: f32) -> f32 {
    const KNEE_LO: f32 = 1.0 / 3.0;
    const KNEE_HI: f32 = 2.0 / 3.0;

    let shaped = if x > KNEE_HI {
        1.0
    } else if x > KNEE_LO {
        1.0 - (2.0 - 3.0 * x).powi(2) / 3.0
    } else if x < -KNEE_HI {
        -1.0
    } else if x < -KNEE_LO {
        -1.0 + (2.0 + 3.0 * x).powi(2) / 3.0
    } else {
        2.0 * x
    };

    0.5 * shaped
}

fn exponential(x: f32) -> f32 {
    if x > 0.0 {
        1.0 - (-x).exp()
    } else {
        -1.0 + x.exp()
    }
}

fn full_wave_rectifier(x: f32) -> f32 {
    x.abs()
}

fn half_wave_rectifier(x: f32) -> f32 {
    if x > 0.0 {
        x
    } else {
        0.0
    }
}

/// Three iterations of f(y) = 1.5 * y * (1 - y^2/3). Unstable once |input|
/// passes ~1.3; the surrounding gain staging is responsible for keeping the
/// signal inside that envelope, and no clamping happens here.
fn araya_suyama(x: f32) -> f32 {
    let stage = |y: f32| 1.5 * y * (1.0 - y * y / 3.0);
    stage(stage(stage(x)))
}

fn doidic_symmetric(x: f32) -> f32 {
    (2.0 * x.abs() - x * x) * x.signum()
}

/// Asymmetric three-region polynomial. Defined over [-1, 1]; input outside
/// that range is clamped to the nearest boundary first, so every sample has
/// a finite output.
fn doidic_asymmetric(x: f32) -> f32 {
    const KNEE: f32 = -0.08905;
    const SHELF: f32 = 0.320018;

    let x = x.clamp(-1.0, 1.0);
    if x < KNEE {
        let p = x.abs() - 0.032847;
        -0.75 * (p.powi(12) + p / 3.0) + 0.01
    } else if x < SHELF {
        -6.153 * x * x + 3.9375 * x
    } else {
        0.630035
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    #[test_case(Waveshaper::HardClip; "hard clip")]
    #[test_case(Waveshaper::SoftClip; "soft clip")]
    #[test_case(Waveshaper::Exponential; "exponential")]
    #[test_case(Waveshaper::ArayaSuyama; "araya suyama")]
    #[test_case(Waveshaper::DoidicSymmetric; "doidic symmetric")]
    fn odd_symmetry(shaper: Waveshaper) {
        for x in [0.05_f32, 0.2, 0.45, 0.7, 0.95] {
            assert_relative_eq!(shaper.apply(-x), -shaper.apply(x), epsilon = 1e-6);
        }
    }

    #[test]
    fn hard_clip_points() {
        assert_eq!(Waveshaper::HardClip.apply(0.7), 0.5);
        assert_eq!(Waveshaper::HardClip.apply(-0.7), -0.5);
        assert_eq!(Waveshaper::HardClip.apply(0.3), 0.3);
    }

    #[test]
    fn soft_clip_linear_region_is_identity() {
        for x in [-0.3_f32, -0.1, 0.0, 0.15, 1.0 / 3.0] {
            assert_relative_eq!(Waveshaper::SoftClip.apply(x), x, epsilon = 1e-6);
        }
    }

    #[test]
    fn soft_clip_saturates_at_half() {
        assert_relative_eq!(Waveshaper::SoftClip.apply(0.9), 0.5);
        assert_relative_eq!(Waveshaper::SoftClip.apply(-2.0), -0.5);
    }

    #[test]
    fn rectifiers() {
        assert_eq!(Waveshaper::FullWaveRectifier.apply(-0.4), 0.4);
        assert_eq!(Waveshaper::FullWaveRectifier.apply(0.4), 0.4);
        assert_eq!(Waveshaper::HalfWaveRectifier.apply(0.4), 0.4);
        assert_eq!(Waveshaper::HalfWaveRectifier.apply(-0.4), 0.0);
    }

    #[test]
    fn exponential_saturates() {
        assert!(Waveshaper::Exponential.apply(10.0) > 0.9999);
        assert!(Waveshaper::Exponential.apply(-10.0) < -0.9999);
        assert_relative_eq!(Waveshaper::Exponential.apply(0.0), 0.0);
    }

    #[test]
    fn araya_suyama_unit_fixed_point() {
        // f(1) = 1.5 * (1 - 1/3) = 1, so 1 survives all three stages
        assert_relative_eq!(Waveshaper::ArayaSuyama.apply(1.0), 1.0, epsilon = 1e-6);
        assert!(Waveshaper::ArayaSuyama.apply(0.5).abs() <= 1.0);
    }

    #[test]
    fn doidic_symmetric_points() {
        assert_relative_eq!(Waveshaper::DoidicSymmetric.apply(0.5), 0.75);
        assert_relative_eq!(Waveshaper::DoidicSymmetric.apply(-0.5), -0.75);
        assert_relative_eq!(Waveshaper::DoidicSymmetric.apply(1.0), 1.0);
    }

    #[test]
    fn doidic_asymmetric_defined_everywhere() {
        // boundary and out-of-range inputs take the clamped region values
        assert_relative_eq!(Waveshaper::DoidicAsymmetric.apply(1.0), 0.630035);
        assert_eq!(
            Waveshaper::DoidicAsymmetric.apply(2.0),
            Waveshaper::DoidicAsymmetric.apply(1.0)
        );
        assert_eq!(
            Waveshaper::DoidicAsymmetric.apply(-3.0),
            Waveshaper::DoidicAsymmetric.apply(-1.0)
        );
        for x in [-5.0_f32, -1.0, -0.08905, 0.0, 0.320018, 1.0, 5.0] {
            assert!(Waveshaper::DoidicAsymmetric.apply(x).is_finite());
        }
    }

    #[test]
    fn doidic_asymmetric_upper_knee_is_continuous() {
        let below = Waveshaper::DoidicAsymmetric.apply(0.320017);
        assert_relative_eq!(below, 0.630035, epsilon = 1e-3);
    }

    #[test]
    fn index_round_trip() {
        for (i, shaper) in Waveshaper::ALL.iter().enumerate() {
            assert_eq!(shaper.index(), i);
            assert_eq!(Waveshaper::from_index(i), Some(*shaper));
        }
        assert_eq!(Waveshaper::from_index(8), None);
    }

    #[test]
    fn from_target_rounds_and_clamps() {
        assert_eq!(Waveshaper::from_target(0.4), Waveshaper::HardClip);
        assert_eq!(Waveshaper::from_target(2.6), Waveshaper::FullWaveRectifier);
        assert_eq!(Waveshaper::from_target(-3.0), Waveshaper::HardClip);
        assert_eq!(Waveshaper::from_target(99.0), Waveshaper::DoidicAsymmetric);
    }

    #[test]
    fn parse_names_and_indexes() {
        assert_eq!(Waveshaper::parse("hard"), Some(Waveshaper::HardClip));
        assert_eq!(Waveshaper::parse("3"), Some(Waveshaper::FullWaveRectifier));
        assert_eq!(Waveshaper::parse("araya"), Some(Waveshaper::ArayaSuyama));
        assert_eq!(Waveshaper::parse("nope"), None);
    }

    #[test]
    fn process_whole_channel() {
        let mut samples = [-1.0, 0.5, -0.25, 0.0];
        Waveshaper::FullWaveRectifier.process(&mut samples);
        assert_eq!(samples, [1.0, 0.5, 0.25, 0.0]);
    }
}
