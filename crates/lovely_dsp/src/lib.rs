//! Lovely DSP - Transformer Saturation Signal Path
//!
//! This crate provides the real-time audio path of the Lovely Transformer:
//! - Two-band crossover (1 kHz) using BiQuad filters
//! - Preisach-inspired hysteresis saturation with even/odd harmonic shaping
//! - Block processor that saturates each band and mixes them back together
//! - Control parameter descriptors and per-block snapshots
//!
//! # Architecture
//!
//! The DSP chain follows a strict "no allocation in audio callback" rule.
//! Scratch buffers are sized when the processor is configured, and control
//! parameters are read once per block.

mod crossover;
mod error;
mod hysteresis;
mod params;
mod processor;

pub use crossover::{Band, Crossover, CROSSOVER_FREQUENCY};
pub use error::DspError;
pub use hysteresis::{HysteresisModel, HISTORY_LEN};
pub use params::{ControlParams, ParamId};
pub use processor::{ProcessContext, TransformerProcessor, HIGH_BAND_DRIVE, LOW_BAND_DRIVE};
