//! Audio Buffer Management
//!
//! The block type handed to the processing chain: non-interleaved 32-bit
//! float samples, one `Vec<f32>` per channel, all channels the same length.
//! Buffers are produced by the host (or the file loader), mutated in place
//! by the chain, and never retained after a processing call returns.

use crate::error::{RaspError, Result};

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert decibels to linear amplitude
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert linear amplitude to decibels
///
/// Returns -f32::INFINITY for zero or negative input.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

// ============================================================================
// Channel Layout
// ============================================================================

/// Audio channel configuration
///
/// Mono and stereo are the only supported layouts, matching the bus
/// configurations the effect is designed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChannelLayout {
    /// Single channel (mono)
    Mono,
    /// Two channels (stereo: left, right)
    #[default]
    Stereo,
}

impl ChannelLayout {
    /// Returns the number of channels for this layout
    pub fn num_channels(&self) -> usize {
        match self {
            ChannelLayout::Mono => 1,
            ChannelLayout::Stereo => 2,
        }
    }

    /// Create a ChannelLayout from a channel count
    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(ChannelLayout::Mono),
            2 => Some(ChannelLayout::Stereo),
            _ => None,
        }
    }
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Core audio buffer type for all block processing
///
/// Stores audio as non-interleaved 32-bit floating point samples.
/// Each channel is a separate `Vec<f32>` of identical length.
///
/// # Example
/// ```
/// use rasp::engine::{AudioBuffer, ChannelLayout};
///
/// let buffer = AudioBuffer::new(512, ChannelLayout::Stereo, 48000);
/// assert_eq!(buffer.num_channels(), 2);
/// assert_eq!(buffer.num_samples(), 512);
/// ```
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Sample data: outer Vec is channels, inner Vec is samples
    samples: Vec<Vec<f32>>,
    /// Sample rate in Hz
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a new buffer with the given length and layout, zero-filled
    pub fn new(num_samples: usize, layout: ChannelLayout, sample_rate: u32) -> Self {
        let samples = vec![vec![0.0_f32; num_samples]; layout.num_channels()];
        Self {
            samples,
            sample_rate,
        }
    }

    /// Create a buffer from interleaved sample data (L, R, L, R, ... for stereo)
    ///
    /// Fails if the data length is not divisible by the channel count.
    pub fn from_interleaved(
        interleaved: &[f32],
        layout: ChannelLayout,
        sample_rate: u32,
    ) -> Result<Self> {
        let num_channels = layout.num_channels();

        if interleaved.len() % num_channels != 0 {
            return Err(RaspError::InvalidAudio {
                reason: format!(
                    "Interleaved data length {} is not divisible by channel count {}",
                    interleaved.len(),
                    num_channels
                ),
            });
        }

        let num_samples = interleaved.len() / num_channels;
        let mut samples = vec![Vec::with_capacity(num_samples); num_channels];
        for frame in interleaved.chunks_exact(num_channels) {
            for (ch, &sample) in frame.iter().enumerate() {
                samples[ch].push(sample);
            }
        }

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Convert the buffer to interleaved order (L, R, L, R, ... for stereo)
    pub fn to_interleaved(&self) -> Vec<f32> {
        let num_channels = self.num_channels();
        let num_samples = self.num_samples();
        let mut interleaved = Vec::with_capacity(num_channels * num_samples);

        for sample_idx in 0..num_samples {
            for channel in &self.samples {
                interleaved.push(channel[sample_idx]);
            }
        }

        interleaved
    }

    /// Get the number of channels
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.samples.len()
    }

    /// Get the number of samples per channel
    #[inline]
    pub fn num_samples(&self) -> usize {
        self.samples.first().map(|ch| ch.len()).unwrap_or(0)
    }

    /// Check if the buffer holds no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_samples() == 0
    }

    /// Get the sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get a channel's samples as a slice
    ///
    /// # Panics
    /// Panics if `channel` is out of range.
    #[inline]
    pub fn channel(&self, channel: usize) -> &[f32] {
        &self.samples[channel]
    }

    /// Get a channel's samples as a mutable slice
    ///
    /// # Panics
    /// Panics if `channel` is out of range.
    #[inline]
    pub fn channel_mut(&mut self, channel: usize) -> &mut [f32] {
        &mut self.samples[channel]
    }

    /// Iterate over channels as mutable slices
    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> + '_ {
        self.samples.iter_mut().map(|ch| ch.as_mut_slice())
    }

    /// Copy another buffer's samples into this one
    ///
    /// Copies the overlapping channel/sample region; both buffers keep
    /// their own dimensions.
    pub fn copy_from(&mut self, other: &AudioBuffer) {
        for (dst, src) in self.samples.iter_mut().zip(&other.samples) {
            let n = dst.len().min(src.len());
            dst[..n].copy_from_slice(&src[..n]);
        }
    }

    /// Fill every channel with silence
    pub fn clear(&mut self) {
        for channel in &mut self.samples {
            channel.fill(0.0);
        }
    }

    /// Peak level across all channels, in dB
    ///
    /// Returns -f32::INFINITY for empty or silent buffers.
    pub fn peak_db(&self) -> f32 {
        let peak = self
            .samples
            .iter()
            .flat_map(|channel| channel.iter())
            .map(|&s| s.abs())
            .fold(0.0_f32, f32::max);
        linear_to_db(peak)
    }

    /// RMS level across all channels, in dB
    ///
    /// Returns -f32::INFINITY for empty or silent buffers.
    pub fn rms_db(&self) -> f32 {
        let total = self.num_channels() * self.num_samples();
        if total == 0 {
            return f32::NEG_INFINITY;
        }

        let sum_squares: f64 = self
            .samples
            .iter()
            .flat_map(|channel| channel.iter())
            .map(|&s| (s as f64) * (s as f64))
            .sum();

        linear_to_db((sum_squares / total as f64).sqrt() as f32)
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
    fn test_new_buffer_is_silent() {
        let buffer = AudioBuffer::new(256, ChannelLayout::Stereo, 44100);
        assert_eq!(buffer.num_channels(), 2);
        assert_eq!(buffer.num_samples(), 256);
        assert!(buffer.channel(0).iter().all(|&s| s == 0.0));
        assert!(buffer.channel(1).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_db_linear_round_trip() {
        assert_relative_eq!(db_to_linear(0.0), 1.0);
        assert_relative_eq!(db_to_linear(20.0), 10.0, epsilon = 1e-5);
        assert_relative_eq!(linear_to_db(db_to_linear(-6.0)), -6.0, epsilon = 1e-4);
        assert_eq!(linear_to_db(0.0), f32::NEG_INFINITY);
    }

    #[test]
    fn test_interleave_round_trip() {
        let data = [0.1, -0.1, 0.2, -0.2, 0.3, -0.3];
        let buffer = AudioBuffer::from_interleaved(&data, ChannelLayout::Stereo, 48000).unwrap();
        assert_eq!(buffer.num_samples(), 3);
        assert_eq!(buffer.channel(0), &[0.1, 0.2, 0.3]);
        assert_eq!(buffer.channel(1), &[-0.1, -0.2, -0.3]);
        assert_eq!(buffer.to_interleaved(), data);
    }

    #[test]
    fn test_interleave_length_mismatch() {
        let data = [0.1, -0.1, 0.2];
        let result = AudioBuffer::from_interleaved(&data, ChannelLayout::Stereo, 48000);
        assert!(result.is_err());
    }

    #[test]
    fn test_layout_from_count() {
        assert_eq!(ChannelLayout::from_count(1), Some(ChannelLayout::Mono));
        assert_eq!(ChannelLayout::from_count(2), Some(ChannelLayout::Stereo));
        assert_eq!(ChannelLayout::from_count(6), None);
    }

    #[test]
    fn test_peak_db() {
        let mut buffer = AudioBuffer::new(4, ChannelLayout::Mono, 48000);
        buffer.channel_mut(0).copy_from_slice(&[0.0, 0.5, -1.0, 0.25]);
        assert_relative_eq!(buffer.peak_db(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_clear() {
        let mut buffer = AudioBuffer::new(8, ChannelLayout::Stereo, 48000);
        buffer.channel_mut(0).fill(0.7);
        buffer.clear();
        assert!(buffer.channel(0).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_copy_from_overlap() {
        let mut dst = AudioBuffer::new(4, ChannelLayout::Stereo, 48000);
        let mut src = AudioBuffer::new(2, ChannelLayout::Stereo, 48000);
        src.channel_mut(0).copy_from_slice(&[0.1, 0.2]);
        dst.copy_from(&src);
        assert_eq!(dst.channel(0), &[0.1, 0.2, 0.0, 0.0]);
    }
}
