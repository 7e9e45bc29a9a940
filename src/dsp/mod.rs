//! Distortion DSP Core
//!
//! The signal chain and everything it is made of: smoothed parameters, the
//! per-channel tone shelf, the waveshaper bank and the two gain stages,
//! orchestrated per block by [`DistortionProcessor`].

mod gain;
mod params;
mod processor;
mod shaper;
mod tone;

pub use gain::GainStage;
pub use params::{
    ParamDescriptor, ParamId, ParamKind, ParamSet, Smoother, DESCRIPTORS, SMOOTHING_TIME_SECS,
};
pub use processor::DistortionProcessor;
pub use shaper::{Waveshaper, WAVESHAPER_COUNT};
pub use tone::{ToneFilter, TONE_SHELF_FREQUENCY};
