//! Rasp - Real-Time Distortion Effect Core
//!
//! A gain → tone-filter → waveshaper → gain chain that processes audio
//! blocks in place with bounded per-sample cost.
//!
//! # Architecture
//!
//! Two execution contexts share the processor:
//! - the control context writes parameter targets through a shared
//!   [`dsp::ParamSet`] handle (lock-free, any time);
//! - the audio context calls [`dsp::DistortionProcessor::process_block`]
//!   once per host callback, smoothing parameters toward their targets as
//!   it goes.
//!
//! The waveshaper bank is a stateless function table; the tone shelf keeps
//! independent state per channel; the two gain stages carry nothing but a
//! linear factor.

pub mod dsp;
pub mod engine;
pub mod error;

pub use error::{RaspError, Result};
