//! Rasp CLI - Offline Distortion Driver
//!
//! Applies the distortion chain to a WAV file, feeding it through
//! `process_block` in fixed-size chunks exactly the way a plugin host
//! would.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rasp::dsp::{DistortionProcessor, ParamId, Waveshaper};
use rasp::engine::{export_audio, import_audio, AudioBuffer, ChannelLayout, ExportFormat};

#[derive(Parser)]
#[command(
    name = "rasp-cli",
    version,
    about = "Apply the rasp distortion chain to a WAV file"
)]
struct Cli {
    /// Input WAV file
    input: PathBuf,

    /// Output WAV file
    output: PathBuf,

    /// Waveshaper, by name or bank index 0-7 (e.g. "hard", "full-wave", 5)
    #[arg(short, long, default_value = "full-wave")]
    shaper: String,

    /// Input gain in dB [-60, 24]
    #[arg(long, default_value_t = 12.0, allow_negative_numbers = true)]
    input_gain: f32,

    /// Output gain in dB [-60, 24]
    #[arg(long, default_value_t = -24.0, allow_negative_numbers = true)]
    output_gain: f32,

    /// Tone shelf gain in dB [-24, 24]
    #[arg(long, default_value_t = 12.0, allow_negative_numbers = true)]
    tone: f32,

    /// Processing block size in samples
    #[arg(long, default_value_t = 512)]
    block_size: usize,

    /// Output bit depth (16 or 32)
    #[arg(long, default_value_t = 32)]
    bit_depth: u16,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let shaper = Waveshaper::parse(&cli.shaper)
        .with_context(|| format!("unknown waveshaper: {}", cli.shaper))?;

    let mut buffer = import_audio(&cli.input)
        .with_context(|| format!("failed to read {}", cli.input.display()))?;

    info!(
        channels = buffer.num_channels(),
        samples = buffer.num_samples(),
        sample_rate = buffer.sample_rate(),
        peak_db = buffer.peak_db(),
        "loaded input"
    );

    let mut processor = DistortionProcessor::new();
    let params = processor.params();
    params.set_target(ParamId::DistortionType, shaper.index() as f32);
    params.set_target(ParamId::InputGain, cli.input_gain);
    params.set_target(ParamId::OutputGain, cli.output_gain);
    params.set_target(ParamId::Tone, cli.tone);

    processor.prepare(
        buffer.sample_rate() as f64,
        cli.block_size,
        buffer.num_channels(),
    )?;
    info!(shaper = shaper.label(), "processing");

    process_in_blocks(&mut processor, &mut buffer, cli.block_size);

    info!(peak_db = buffer.peak_db(), rms_db = buffer.rms_db(), "processed");

    export_audio(
        &buffer,
        &cli.output,
        ExportFormat {
            bit_depth: cli.bit_depth,
        },
    )
    .with_context(|| format!("failed to write {}", cli.output.display()))?;

    info!(output = %cli.output.display(), "done");
    Ok(())
}

/// Feed the whole file through the processor in host-callback-sized chunks
fn process_in_blocks(processor: &mut DistortionProcessor, buffer: &mut AudioBuffer, block_size: usize) {
    let layout = match ChannelLayout::from_count(buffer.num_channels()) {
        Some(layout) => layout,
        None => return, // import enforces mono/stereo
    };

    let mut block = AudioBuffer::new(block_size, layout, buffer.sample_rate());
    let total = buffer.num_samples();
    let mut offset = 0;

    while offset < total {
        let len = block_size.min(total - offset);
        for ch in 0..buffer.num_channels() {
            block.channel_mut(ch)[..len].copy_from_slice(&buffer.channel(ch)[offset..offset + len]);
            block.channel_mut(ch)[len..].fill(0.0);
        }

        processor.process_block(&mut block);

        for ch in 0..buffer.num_channels() {
            buffer.channel_mut(ch)[offset..offset + len].copy_from_slice(&block.channel(ch)[..len]);
        }
        offset += len;
    }
}
