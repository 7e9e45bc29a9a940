//! Audio file I/O
//!
//! WAV import/export used by the offline driver. Files are processed at
//! their native sample rate, so no rate conversion happens here: the
//! processor is prepared with whatever rate the file carries.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::engine::buffer::{AudioBuffer, ChannelLayout};
use crate::error::{RaspError, Result};

/// Export format configuration
#[derive(Debug, Clone, Copy)]
pub struct ExportFormat {
    /// Bit depth: 16 (int) or 32 (float)
    pub bit_depth: u16,
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat { bit_depth: 32 }
    }
}

/// Import a WAV file as an [`AudioBuffer`]
///
/// Int 16/24/32 and float 32 sources are normalized to f32. Only mono and
/// stereo files are accepted.
pub fn import_audio(path: &Path) -> Result<AudioBuffer> {
    let reader = WavReader::open(path).map_err(|e| RaspError::InvalidAudio {
        reason: format!("Failed to open WAV file: {}", e),
    })?;

    let spec = reader.spec();
    let channels = spec.channels as usize;

    let layout = ChannelLayout::from_count(channels).ok_or_else(|| RaspError::UnsupportedFormat {
        format: format!("{}-channel audio (only mono/stereo supported)", channels),
    })?;

    let samples = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)?;

    AudioBuffer::from_interleaved(&samples, layout, spec.sample_rate)
}

/// Export an [`AudioBuffer`] to a WAV file
///
/// Writes at the buffer's sample rate, as 32-bit float or 16-bit int
/// depending on the format.
pub fn export_audio(buffer: &AudioBuffer, path: &Path, format: ExportFormat) -> Result<()> {
    if format.bit_depth != 16 && format.bit_depth != 32 {
        return Err(RaspError::UnsupportedFormat {
            format: format!("{}-bit output (only 16, 32 supported)", format.bit_depth),
        });
    }

    let spec = WavSpec {
        channels: buffer.num_channels() as u16,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: format.bit_depth,
        sample_format: if format.bit_depth == 32 {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };

    let mut writer = WavWriter::create(path, spec)?;

    match format.bit_depth {
        16 => {
            for sample in buffer.to_interleaved() {
                let scaled = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
                writer.write_sample(scaled)?;
            }
        }
        _ => {
            for sample in buffer.to_interleaved() {
                writer.write_sample(sample)?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}

/// Generate a mono sine-wave test buffer
///
/// Useful for exercising the processing pipeline in tests and examples.
pub fn generate_test_tone(frequency: f32, duration_secs: f32, sample_rate: u32) -> AudioBuffer {
    let num_samples = (duration_secs * sample_rate as f32) as usize;
    let mut buffer = AudioBuffer::new(num_samples, ChannelLayout::Mono, sample_rate);

    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sample_rate as f32;
    for (i, sample) in buffer.channel_mut(0).iter_mut().enumerate() {
        *sample = (angular_freq * i as f32).sin();
    }

    buffer
}

/// Read samples from a WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<Vec<f32>> {
    match sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(RaspError::from),
        SampleFormat::Int => match bits_per_sample {
            16 => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32768.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(RaspError::from),
            24 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 8388608.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(RaspError::from),
            32 => reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / 2147483648.0))
                .collect::<std::result::Result<Vec<f32>, _>>()
                .map_err(RaspError::from),
            bits => Err(RaspError::UnsupportedFormat {
                format: format!("{}-bit integer audio", bits),
            }),
        },
    }
}

// ============================================================================
// Tests
// ============================================================================
