//! Tone Filter
//!
//! A first-order shelving filter realized as a second-order IIR section with
//! the trailing coefficients held at zero. The shelf leaves DC untouched and
//! applies the configured gain toward Nyquist, tilting the spectrum around
//! the fixed design frequency. Each audio channel owns an independent
//! instance; there is no cross-channel state.

/// Design frequency of the tone shelf, in radians per sample
pub const TONE_SHELF_FREQUENCY: f64 = std::f64::consts::PI * 0.01;

/// Normalized section coefficients
///
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2),
/// all values pre-divided by a0. b2 and a2 stay zero for the shelf.
#[derive(Debug, Clone, Copy)]
struct ShelfCoefficients {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl ShelfCoefficients {
    /// Pass-through section
    fn identity() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }

    /// First-order shelf from the bilinear prototype
    ///
    /// Requires `discrete_frequency > 0` and `gain > 0`; both come from
    /// fixed design constants or a range-clamped parameter, so violating
    /// them is a programming error.
    fn shelf(discrete_frequency: f64, gain: f64) -> Self {
        debug_assert!(discrete_frequency > 0.0);
        debug_assert!(gain > 0.0);

        let tan_half_wc = (discrete_frequency / 2.0).tan();
        let sqrt_gain = gain.sqrt();

        let b0 = sqrt_gain * tan_half_wc + gain;
        let b1 = sqrt_gain * tan_half_wc - gain;
        let a0 = sqrt_gain * tan_half_wc + 1.0;
        let a1 = sqrt_gain * tan_half_wc - 1.0;

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: 0.0,
            a1: a1 / a0,
            a2: 0.0,
        }
    }
}

/// Per-channel tone shelf with its delay-line state
///
/// Stable for gains in the ±24 dB control range and free of NaN/Inf for any
/// finite input. Coefficients are recomputed once per block by the chain,
/// not per sample.
#[derive(Debug, Clone)]
pub struct ToneFilter {
    coeffs: ShelfCoefficients,
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl ToneFilter {
    /// Filter in pass-through configuration with cleared state
    pub fn new() -> Self {
        Self {
            coeffs: ShelfCoefficients::identity(),
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Rederive the section coefficients for a shelf gain (linear, > 0)
    pub fn update_coefficients(&mut self, discrete_frequency: f64, gain: f64) {
        self.coeffs = ShelfCoefficients::shelf(discrete_frequency, gain);
    }

    /// Run the section over a channel in place (Direct Form I)
    pub fn process_samples(&mut self, samples: &mut [f32]) {
        let c = self.coeffs;
        for sample in samples.iter_mut() {
            let x = *sample as f64;
            let y = c.b0 * x + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;

            self.x2 = self.x1;
            self.x1 = x;
            self.y2 = self.y1;
            self.y1 = y;

            *sample = y as f32;
        }
    }

    /// Clear the four delay registers, keeping the coefficients
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for ToneFilter {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unity_gain_is_identity() {
        let mut filter = ToneFilter::new();
        filter.update_coefficients(TONE_SHELF_FREQUENCY, 1.0);

        let input = [0.5_f32, -0.25, 1.0, 0.0, -1.0, 0.125, 0.75, -0.6];
        let mut samples = input;
        filter.process_samples(&mut samples);

        for (out, inp) in samples.iter().zip(&input) {
            assert_relative_eq!(*out, *inp, epsilon = 1e-6);
        }
    }

    #[test]
    fn dc_gain_is_unity_for_any_shelf_gain() {
        for gain_db in [-24.0_f64, -6.0, 6.0, 24.0] {
            let gain = 10.0_f64.powf(gain_db / 20.0);
            let mut filter = ToneFilter::new();
            filter.update_coefficients(TONE_SHELF_FREQUENCY, gain);

            let mut samples = vec![1.0_f32; 4000];
            filter.process_samples(&mut samples);

            let settled = *samples.last().unwrap();
            assert!(
                (settled - 1.0).abs() < 1e-3,
                "gain {} dB settled at {}",
                gain_db,
                settled
            );
        }
    }

    #[test]
    fn nyquist_gain_matches_shelf_gain() {
        let gain = 4.0; // +12 dB
        let mut filter = ToneFilter::new();
        filter.update_coefficients(TONE_SHELF_FREQUENCY, gain);

        // alternating-sign input probes the response at Nyquist
        let mut samples: Vec<f32> = (0..4000)
            .map(|i| if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        filter.process_samples(&mut samples);

        let settled = samples[3999].abs();
        assert_relative_eq!(settled, gain as f32, epsilon = 0.05);
    }

    #[test]
    fn extreme_gains_stay_finite() {
        for gain_db in [-24.0_f64, 24.0] {
            let gain = 10.0_f64.powf(gain_db / 20.0);
            let mut filter = ToneFilter::new();
            filter.update_coefficients(TONE_SHELF_FREQUENCY, gain);

            let mut samples: Vec<f32> = (0..10_000)
                .map(|i| ((i as f32 * 0.37).sin() * 1.5).clamp(-1.0, 1.0))
                .collect();
            filter.process_samples(&mut samples);

            assert!(samples.iter().all(|s| s.is_finite()));
        }
    }

    #[test]
    fn reset_clears_state_but_keeps_coefficients() {
        let mut filter = ToneFilter::new();
        filter.update_coefficients(TONE_SHELF_FREQUENCY, 2.0);

        let mut warmup = [1.0_f32; 64];
        filter.process_samples(&mut warmup);
        filter.reset();

        // identical fresh filter produces identical output after the reset
        let mut fresh = ToneFilter::new();
        fresh.update_coefficients(TONE_SHELF_FREQUENCY, 2.0);

        let input = [0.3_f32, -0.7, 0.2, 0.9];
        let mut a = input;
        let mut b = input;
        filter.process_samples(&mut a);
        fresh.process_samples(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn silence_in_silence_out() {
        let mut filter = ToneFilter::new();
        filter.update_coefficients(TONE_SHELF_FREQUENCY, 15.848932);

        let mut samples = [0.0_f32; 512];
        filter.process_samples(&mut samples);
        assert!(samples.iter().all(|&s| s == 0.0));
    }
}
