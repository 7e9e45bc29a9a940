//! Parameter model
//!
//! Three pieces, split along the control/audio boundary:
//!
//! - [`ParamDescriptor`]: static identity, range, default and effective-value
//!   conversion for each control, tagged with the widget kind the control
//!   layer should bind ([`ParamKind`]).
//! - [`ParamSet`]: the shared target store. One atomic f32 slot per
//!   parameter, written by the control context and read by the audio
//!   context. Single writer, single reader per slot, relaxed ordering;
//!   a stale read is self-correcting because every read feeds continued
//!   smoothing.
//! - [`Smoother`]: per-parameter one-pole smoothing state, owned
//!   exclusively by the processor on the audio thread.

use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::dsp::shaper::Waveshaper;
use crate::engine::buffer::db_to_linear;
use crate::error::Result;

/// Smoothing time constant in seconds (one smoothing step covers ~63% of a
/// target change per time constant)
pub const SMOOTHING_TIME_SECS: f64 = 1e-3;

// ============================================================================
// Descriptors
// ============================================================================

/// Parameter identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamId {
    /// Waveshaper selection, discrete index into the bank
    DistortionType,
    /// Input trim in dB, applied before the tone filter
    InputGain,
    /// Output trim in dB, applied after the waveshaper
    OutputGain,
    /// Tone shelf gain in dB
    Tone,
}

impl ParamId {
    /// All parameters, in declaration order
    pub const ALL: [ParamId; 4] = [
        ParamId::DistortionType,
        ParamId::InputGain,
        ParamId::OutputGain,
        ParamId::Tone,
    ];

    /// Number of parameters
    pub const COUNT: usize = Self::ALL.len();

    #[inline]
    fn index(self) -> usize {
        self as usize
    }

    /// Stable key used by the persistence mapping
    pub fn key(self) -> &'static str {
        match self {
            ParamId::DistortionType => "distortion_type",
            ParamId::InputGain => "input_gain",
            ParamId::OutputGain => "output_gain",
            ParamId::Tone => "tone",
        }
    }

    /// Inverse of [`ParamId::key`]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|id| id.key() == key)
    }

    /// Static descriptor for this parameter
    pub fn descriptor(self) -> &'static ParamDescriptor {
        &DESCRIPTORS[self.index()]
    }
}

/// Widget kind a control layer should bind to a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Continuous value on a linear slider
    Slider,
    /// On/off value
    Toggle,
    /// Discrete index into a fixed list of labels
    Choice { items: &'static [&'static str] },
}

/// Static description of one parameter
///
/// `to_effective` is the pure mapping from the stored value to the value the
/// signal path consumes (dB to linear for the gain controls, identity
/// otherwise). Keeping it here rather than inline in the processor lets the
/// conversion be swapped and tested on its own.
pub struct ParamDescriptor {
    pub id: ParamId,
    pub name: &'static str,
    pub unit: &'static str,
    pub kind: ParamKind,
    pub min: f32,
    pub max: f32,
    pub default: f32,
    pub to_effective: fn(f32) -> f32,
}

fn identity(value: f32) -> f32 {
    value
}

/// The four controls of the distortion chain
pub static DESCRIPTORS: [ParamDescriptor; ParamId::COUNT] = [
    ParamDescriptor {
        id: ParamId::DistortionType,
        name: "Distortion type",
        unit: "",
        kind: ParamKind::Choice {
            items: &Waveshaper::LABELS,
        },
        min: 0.0,
        max: 7.0,
        default: 3.0,
        to_effective: identity,
    },
    ParamDescriptor {
        id: ParamId::InputGain,
        name: "Input gain",
        unit: "dB",
        kind: ParamKind::Slider,
        min: -60.0,
        max: 24.0,
        default: 12.0,
        to_effective: db_to_linear,
    },
    ParamDescriptor {
        id: ParamId::OutputGain,
        name: "Output gain",
        unit: "dB",
        kind: ParamKind::Slider,
        min: -60.0,
        max: 24.0,
        default: -24.0,
        to_effective: db_to_linear,
    },
    ParamDescriptor {
        id: ParamId::Tone,
        name: "Tone",
        unit: "dB",
        kind: ParamKind::Slider,
        min: -24.0,
        max: 24.0,
        default: 12.0,
        to_effective: identity,
    },
];

// ============================================================================
// Shared target store
// ============================================================================

/// f32 stored as a word-sized atomic
struct AtomicF32 {
    value: AtomicU32,
}

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self {
            value: AtomicU32::new(value.to_bits()),
        }
    }

    fn store(&self, value: f32) {
        self.value.store(value.to_bits(), Ordering::Relaxed);
    }

    fn load(&self) -> f32 {
        f32::from_bits(self.value.load(Ordering::Relaxed))
    }
}

/// Lock-free store of parameter targets, shared between the control and
/// audio contexts via `Arc`
///
/// Out-of-range writes are clamped silently to the parameter's range:
/// automation and UI widgets legitimately send boundary values, so a write
/// never fails.
pub struct ParamSet {
    targets: [AtomicF32; ParamId::COUNT],
}

impl Default for ParamSet {
    fn default() -> Self {
        Self {
            targets: ParamId::ALL.map(|id| AtomicF32::new(id.descriptor().default)),
        }
    }
}

impl ParamSet {
    /// Create a store with every parameter at its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new target, clamped to the parameter's range
    ///
    /// Does not change the smoothed value; the audio side glides toward the
    /// new target over the smoothing time constant.
    pub fn set_target(&self, id: ParamId, value: f32) {
        let d = id.descriptor();
        self.targets[id.index()].store(value.clamp(d.min, d.max));
    }

    /// Read the raw, unsmoothed target
    pub fn target(&self, id: ParamId) -> f32 {
        self.targets[id.index()].load()
    }

    /// Read the target mapped through the parameter's effective-value
    /// conversion
    pub fn effective_target(&self, id: ParamId) -> f32 {
        (id.descriptor().to_effective)(self.target(id))
    }

    /// Key/value mapping of all targets, for the persistence layer
    pub fn snapshot(&self) -> Value {
        let mut map = serde_json::Map::new();
        for id in ParamId::ALL {
            map.insert(id.key().to_string(), json!(self.target(id)));
        }
        Value::Object(map)
    }

    /// Restore targets from a [`ParamSet::snapshot`] mapping
    ///
    /// Missing keys keep their current targets; values are clamped on the
    /// way in. Unknown keys are ignored.
    pub fn restore(&self, state: &Value) {
        for id in ParamId::ALL {
            if let Some(value) = state.get(id.key()).and_then(Value::as_f64) {
                self.set_target(id, value as f32);
            }
        }
    }

    /// [`ParamSet::snapshot`] serialized to a JSON string
    pub fn snapshot_json(&self) -> String {
        self.snapshot().to_string()
    }

    /// Restore targets from a [`ParamSet::snapshot_json`] string
    pub fn restore_json(&self, raw: &str) -> Result<()> {
        let state: Value = serde_json::from_str(raw)?;
        self.restore(&state);
        Ok(())
    }
}

// ============================================================================
// Smoothing
// ============================================================================

/// One-pole smoothing state for a single parameter
///
/// Owned by the processor and advanced on the audio thread only. The value
/// glides toward whatever target it is handed:
/// `current += (target - current) * coeff`, with the coefficient chosen so a
/// step reaches ~63% of the distance within one time constant.
#[derive(Debug, Clone, Copy)]
pub struct Smoother {
    current: f32,
    coeff: f32,
}

impl Smoother {
    /// Unconfigured smoother; passes targets through until the first reset
    pub fn new() -> Self {
        Self {
            current: 0.0,
            coeff: 1.0,
        }
    }

    /// Reconfigure for a sample rate and snap to `snap_to` with no residual
    /// glide
    pub fn reset(&mut self, sample_rate: f64, time_constant_secs: f64, snap_to: f32) {
        debug_assert!(sample_rate > 0.0);
        let tau_samples = time_constant_secs * sample_rate;
        self.coeff = if tau_samples <= 0.0 {
            1.0
        } else {
            (1.0 - (-1.0 / tau_samples).exp()) as f32
        };
        self.current = snap_to;
    }

    /// Advance one smoothing step toward `target` and return the new value
    #[inline]
    pub fn next(&mut self, target: f32) -> f32 {
        self.current += (target - self.current) * self.coeff;
        self.current
    }

    /// Read the smoothed value without advancing
    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }
}

impl Default for Smoother {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
