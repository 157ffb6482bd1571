//! Control Parameters
//!
//! The six user-facing controls, their descriptors, and the per-block
//! snapshot that the processor consumes.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Identifies one of the six controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    Drive,
    OutputGain,
    EvenHarmonics,
    OddHarmonics,
    HysteresisWidth,
    AsymmetrySkew,
}

impl ParamId {
    /// Every control in display order
    pub const ALL: [ParamId; 6] = [
        ParamId::Drive,
        ParamId::OutputGain,
        ParamId::EvenHarmonics,
        ParamId::OddHarmonics,
        ParamId::HysteresisWidth,
        ParamId::AsymmetrySkew,
    ];

    /// Stable identifier used by hosts and saved state
    pub fn id(self) -> &'static str {
        match self {
            ParamId::Drive => "drive",
            ParamId::OutputGain => "outputGain",
            ParamId::EvenHarmonics => "evenHarmonics",
            ParamId::OddHarmonics => "oddHarmonics",
            ParamId::HysteresisWidth => "hysteresis",
            ParamId::AsymmetrySkew => "asymmetry",
        }
    }

    /// Human-readable name for UI
    pub fn name(self) -> &'static str {
        match self {
            ParamId::Drive => "Drive",
            ParamId::OutputGain => "Output Gain",
            ParamId::EvenHarmonics => "Even Harmonics",
            ParamId::OddHarmonics => "Odd Harmonics",
            ParamId::HysteresisWidth => "Hysteresis",
            ParamId::AsymmetrySkew => "Asymmetry",
        }
    }

    pub fn range(self) -> RangeInclusive<f32> {
        match self {
            ParamId::Drive => 0.1..=10.0,
            ParamId::OutputGain => 0.0..=2.0,
            ParamId::EvenHarmonics | ParamId::OddHarmonics | ParamId::HysteresisWidth => 0.0..=1.0,
            ParamId::AsymmetrySkew => -0.5..=0.5,
        }
    }

    /// Slider resolution
    pub fn step(self) -> f32 {
        match self {
            ParamId::Drive => 0.1,
            _ => 0.01,
        }
    }

    pub fn default_value(self) -> f32 {
        match self {
            ParamId::Drive => 1.0,
            ParamId::OutputGain => 1.0,
            ParamId::EvenHarmonics => 0.3,
            ParamId::OddHarmonics => 1.0,
            ParamId::HysteresisWidth => 0.2,
            ParamId::AsymmetrySkew => 0.1,
        }
    }

    /// Clamp a value into this control's range
    pub fn clamp(self, value: f32) -> f32 {
        let range = self.range();
        value.clamp(*range.start(), *range.end())
    }

    /// Look a control up by its stable identifier
    pub fn from_id(id: &str) -> Option<ParamId> {
        Self::ALL.into_iter().find(|param| param.id() == id)
    }
}

/// One block's worth of control values
///
/// Read once at the top of a block and passed by value, so a block never
/// sees a half-updated set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControlParams {
    pub drive: f32,
    pub output_gain: f32,
    pub even_harmonics: f32,
    pub odd_harmonics: f32,
    #[serde(rename = "hysteresis")]
    pub hysteresis_width: f32,
    #[serde(rename = "asymmetry")]
    pub asymmetry_skew: f32,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            drive: ParamId::Drive.default_value(),
            output_gain: ParamId::OutputGain.default_value(),
            even_harmonics: ParamId::EvenHarmonics.default_value(),
            odd_harmonics: ParamId::OddHarmonics.default_value(),
            hysteresis_width: ParamId::HysteresisWidth.default_value(),
            asymmetry_skew: ParamId::AsymmetrySkew.default_value(),
        }
    }
}

impl ControlParams {
    pub fn get(&self, param: ParamId) -> f32 {
        match param {
            ParamId::Drive => self.drive,
            ParamId::OutputGain => self.output_gain,
            ParamId::EvenHarmonics => self.even_harmonics,
            ParamId::OddHarmonics => self.odd_harmonics,
            ParamId::HysteresisWidth => self.hysteresis_width,
            ParamId::AsymmetrySkew => self.asymmetry_skew,
        }
    }

    /// Store a value without clamping
    pub fn set(&mut self, param: ParamId, value: f32) {
        let slot = match param {
            ParamId::Drive => &mut self.drive,
            ParamId::OutputGain => &mut self.output_gain,
            ParamId::EvenHarmonics => &mut self.even_harmonics,
            ParamId::OddHarmonics => &mut self.odd_harmonics,
            ParamId::HysteresisWidth => &mut self.hysteresis_width,
            ParamId::AsymmetrySkew => &mut self.asymmetry_skew,
        };
        *slot = value;
    }

    /// Copy with every field forced into its range
    ///
    /// The processor never re-validates; hosts that accept arbitrary input
    /// should call this before handing the snapshot over.
    pub fn clamped(&self) -> Self {
        let mut params = *self;
        for param in ParamId::ALL {
            params.set(param, param.clamp(self.get(param)));
        }
        params
    }
}
