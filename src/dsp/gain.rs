//! Gain Stage
//!
//! Applies a linear gain factor to every sample of a block. Used twice in
//! the chain: input trim before the tone filter, output trim after the
//! waveshaper. The stage holds no smoothing of its own; it is handed an
//! already-smoothed linear value once per block.

use crate::engine::buffer::AudioBuffer;

/// Block-wide linear gain
#[derive(Debug, Clone, Copy)]
pub struct GainStage {
    gain: f32,
}

impl GainStage {
    /// Unity gain stage
    pub fn new() -> Self {
        Self { gain: 1.0 }
    }

    /// Set the multiplicative factor (linear, not dB)
    #[inline]
    pub fn set_linear(&mut self, gain: f32) {
        self.gain = gain;
    }

    /// Current linear factor
    #[inline]
    pub fn linear(&self) -> f32 {
        self.gain
    }

    /// Multiply every sample in every channel by the current factor
    pub fn process(&self, buffer: &mut AudioBuffer) {
        // Unity gain optimization
        if (self.gain - 1.0).abs() < f32::EPSILON {
            return;
        }

        for channel in buffer.channels_mut() {
            for sample in channel.iter_mut() {
                *sample *= self.gain;
            }
        }
    }
}

impl Default for GainStage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::buffer::ChannelLayout;

    fn filled_buffer(value: f32) -> AudioBuffer {
        let mut buffer = AudioBuffer::new(64, ChannelLayout::Stereo, 48000);
        for channel in buffer.channels_mut() {
            channel.fill(value);
        }
        buffer
    }

    #[test]
    fn test_process_scales_all_channels() {
        let mut stage = GainStage::new();
        stage.set_linear(0.5);

        let mut buffer = filled_buffer(0.8);
        stage.process(&mut buffer);

        for ch in 0..buffer.num_channels() {
            assert!(buffer.channel(ch).iter().all(|&s| (s - 0.4).abs() < 1e-6));
        }
    }

    #[test]
    fn test_unity_gain_leaves_samples_untouched() {
        let stage = GainStage::new();
        let mut buffer = filled_buffer(0.37);
        stage.process(&mut buffer);
        assert!(buffer.channel(0).iter().all(|&s| s == 0.37));
    }

    #[test]
    fn test_zero_gain_silences() {
        let mut stage = GainStage::new();
        stage.set_linear(0.0);
        let mut buffer = filled_buffer(1.0);
        stage.process(&mut buffer);
        assert!(buffer.channel(1).iter().all(|&s| s == 0.0));
    }
}
