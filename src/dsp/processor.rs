//! Distortion Processor
//!
//! The per-block pipeline: input trim → per-channel tone shelf → selected
//! waveshaper → output trim. The processor owns all audio-side state (gain
//! stages, smoothers, one tone filter per channel) and shares its parameter
//! targets with the control context through an `Arc<ParamSet>`.
//!
//! `process_block` is the hot path: it allocates nothing, takes no locks,
//! logs nothing and runs in time proportional to block size x channel
//! count. `prepare` must complete before any concurrent `process_block`
//! call; the `&mut` receiver makes that the caller's obligation at the type
//! level.

use std::sync::Arc;

use tracing::debug;

use crate::dsp::gain::GainStage;
use crate::dsp::params::{ParamId, ParamSet, Smoother, SMOOTHING_TIME_SECS};
use crate::dsp::shaper::Waveshaper;
use crate::dsp::tone::{ToneFilter, TONE_SHELF_FREQUENCY};
use crate::engine::buffer::AudioBuffer;
use crate::error::{RaspError, Result};

/// The distortion effect chain
///
/// # Example
/// ```
/// use rasp::dsp::{DistortionProcessor, ParamId};
/// use rasp::engine::{AudioBuffer, ChannelLayout};
///
/// let mut processor = DistortionProcessor::new();
/// processor.prepare(48000.0, 512, 2).unwrap();
///
/// let mut block = AudioBuffer::new(512, ChannelLayout::Stereo, 48000);
/// processor.process_block(&mut block);
/// ```
pub struct DistortionProcessor {
    params: Arc<ParamSet>,
    input_smoother: Smoother,
    output_smoother: Smoother,
    tone_smoother: Smoother,
    input_gain: GainStage,
    output_gain: GainStage,
    /// Exactly one filter per prepared input channel
    filters: Vec<ToneFilter>,
    sample_rate: f64,
    max_block_size: usize,
    num_channels: usize,
}

impl DistortionProcessor {
    /// Unprepared processor with every parameter at its default
    pub fn new() -> Self {
        Self {
            params: Arc::new(ParamSet::new()),
            input_smoother: Smoother::new(),
            output_smoother: Smoother::new(),
            tone_smoother: Smoother::new(),
            input_gain: GainStage::new(),
            output_gain: GainStage::new(),
            filters: Vec::new(),
            sample_rate: 0.0,
            max_block_size: 0,
            num_channels: 0,
        }
    }

    /// Shared handle to the parameter targets
    ///
    /// The control and persistence layers write through this handle at any
    /// time, including while audio is running.
    pub fn params(&self) -> Arc<ParamSet> {
        Arc::clone(&self.params)
    }

    /// Whether `prepare` has succeeded at least once
    pub fn is_prepared(&self) -> bool {
        self.num_channels > 0
    }

    /// Prepared input channel count
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Prepared sample rate in Hz (0 before the first `prepare`)
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Configure for a sample rate, maximum block size and channel count
    ///
    /// Idempotent; safe to call again on any configuration change. Discards
    /// previous filter state, snaps all smoothers to their current targets
    /// and computes initial filter coefficients.
    pub fn prepare(
        &mut self,
        sample_rate: f64,
        max_block_size: usize,
        num_channels: usize,
    ) -> Result<()> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(RaspError::InvalidSampleRate { sample_rate });
        }
        if num_channels == 0 {
            return Err(RaspError::InvalidChannelCount {
                channels: num_channels,
            });
        }
        if max_block_size == 0 {
            return Err(RaspError::InvalidBlockSize {
                size: max_block_size,
            });
        }

        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        self.num_channels = num_channels;

        let p = &self.params;
        self.input_smoother
            .reset(sample_rate, SMOOTHING_TIME_SECS, p.target(ParamId::InputGain));
        self.output_smoother
            .reset(sample_rate, SMOOTHING_TIME_SECS, p.target(ParamId::OutputGain));
        self.tone_smoother
            .reset(sample_rate, SMOOTHING_TIME_SECS, p.target(ParamId::Tone));

        self.filters.clear();
        self.filters.resize_with(num_channels, ToneFilter::new);
        let tone_db = self.tone_smoother.current();
        self.update_filters(tone_db);

        debug!(
            sample_rate,
            max_block_size, num_channels, "prepared distortion chain"
        );
        Ok(())
    }

    /// Clear filter delay state without touching parameters or configuration
    pub fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.reset();
        }
    }

    /// Process one audio block in place
    ///
    /// Valid only after a successful `prepare`; before that the call leaves
    /// the buffer untouched. Channels beyond the prepared input count are
    /// zeroed on the way out (mono-in/stereo-out safety).
    pub fn process_block(&mut self, buffer: &mut AudioBuffer) {
        if !self.is_prepared() {
            return;
        }
        debug_assert!(buffer.num_samples() <= self.max_block_size);

        // 1. input trim
        let input_db = self.input_smoother.next(self.params.target(ParamId::InputGain));
        self.input_gain
            .set_linear((ParamId::InputGain.descriptor().to_effective)(input_db));
        self.input_gain.process(buffer);

        // 2. tone shelf, coefficients rederived once per block from the
        //    smoothed value
        let tone_db = self.tone_smoother.next(self.params.target(ParamId::Tone));
        self.update_filters(tone_db);
        for (channel, filter) in buffer.channels_mut().zip(self.filters.iter_mut()) {
            filter.process_samples(channel);
        }

        // 3. waveshaper, selected by the unsmoothed target (a discrete
        //    index must not glide)
        let shaper = Waveshaper::from_target(self.params.target(ParamId::DistortionType));
        for channel in buffer.channels_mut() {
            shaper.process(channel);
        }

        // 4. output trim
        let output_db = self.output_smoother.next(self.params.target(ParamId::OutputGain));
        self.output_gain
            .set_linear((ParamId::OutputGain.descriptor().to_effective)(output_db));
        self.output_gain.process(buffer);

        // 5. silence output-only channels
        for channel in buffer.channels_mut().skip(self.num_channels) {
            channel.fill(0.0);
        }
    }

    /// Currently selected transfer curve
    pub fn selected_waveshaper(&self) -> Waveshaper {
        Waveshaper::from_target(self.params.target(ParamId::DistortionType))
    }

    /// Rederive every channel filter's coefficients from a tone gain in dB
    fn update_filters(&mut self, tone_db: f32) {
        let gain = 10.0_f64.powf(tone_db as f64 * 0.05);
        for filter in &mut self.filters {
            filter.update_coefficients(TONE_SHELF_FREQUENCY, gain);
        }
    }
}

impl Default for DistortionProcessor {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
