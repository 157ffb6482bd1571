//! Shared Control Parameters
//!
//! The UI / automation thread writes parameter values here while the audio
//! thread reads them. Each value is an `f32` stored as bits in an
//! `AtomicU32`, so neither side ever blocks.
//!
//! The audio thread takes one [`SharedParams::snapshot`] at the top of each
//! block and hands that copy to the processor; a block never observes a
//! value changing halfway through.

use std::sync::atomic::{AtomicU32, Ordering};

use lovely_dsp::{ControlParams, ParamId};

use crate::error::{EngineError, EngineResult};

/// Lock-free parameter store shared between control and audio threads
pub struct SharedParams {
    drive_bits: AtomicU32,
    output_gain_bits: AtomicU32,
    even_harmonics_bits: AtomicU32,
    odd_harmonics_bits: AtomicU32,
    hysteresis_width_bits: AtomicU32,
    asymmetry_skew_bits: AtomicU32,
}

impl SharedParams {
    pub fn new(params: ControlParams) -> Self {
        let shared = Self {
            drive_bits: AtomicU32::new(0),
            output_gain_bits: AtomicU32::new(0),
            even_harmonics_bits: AtomicU32::new(0),
            odd_harmonics_bits: AtomicU32::new(0),
            hysteresis_width_bits: AtomicU32::new(0),
            asymmetry_skew_bits: AtomicU32::new(0),
        };
        shared.store(&params);
        shared
    }

    fn slot(&self, param: ParamId) -> &AtomicU32 {
        match param {
            ParamId::Drive => &self.drive_bits,
            ParamId::OutputGain => &self.output_gain_bits,
            ParamId::EvenHarmonics => &self.even_harmonics_bits,
            ParamId::OddHarmonics => &self.odd_harmonics_bits,
            ParamId::HysteresisWidth => &self.hysteresis_width_bits,
            ParamId::AsymmetrySkew => &self.asymmetry_skew_bits,
        }
    }

    /// Set one parameter, clamped into its range. Returns the stored value.
    pub fn set(&self, param: ParamId, value: f32) -> f32 {
        // NaN would survive clamp(); fall back to the default instead
        let value = if value.is_nan() {
            param.default_value()
        } else {
            param.clamp(value)
        };
        // Relaxed ordering is fine: each value is independent
        self.slot(param).store(value.to_bits(), Ordering::Relaxed);
        value
    }

    /// Set a parameter by its stable id (e.g. `"outputGain"`)
    pub fn set_by_id(&self, id: &str, value: f32) -> EngineResult<f32> {
        let param =
            ParamId::from_id(id).ok_or_else(|| EngineError::UnknownParameter(id.to_string()))?;
        Ok(self.set(param, value))
    }

    pub fn get(&self, param: ParamId) -> f32 {
        f32::from_bits(self.slot(param).load(Ordering::Relaxed))
    }

    /// Replace every value at once (each one clamped)
    pub fn store(&self, params: &ControlParams) {
        for param in ParamId::ALL {
            self.set(param, params.get(param));
        }
    }

    /// Copy of all six values for one block
    pub fn snapshot(&self) -> ControlParams {
        let mut params = ControlParams::default();
        for param in ParamId::ALL {
            params.set(param, self.get(param));
        }
        params
    }
}

impl Default for SharedParams {
    fn default() -> Self {
        Self::new(ControlParams::default())
    }
}
