//! Two-Band Crossover Filter Bank
//!
//! Splits a signal into complementary low and high bands at a fixed 1 kHz
//! corner. Each band is a single second-order Butterworth section from the
//! RBJ Audio EQ Cookbook. Coefficients are shared across channels; every
//! channel owns its own delay line.

use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type, Q_BUTTERWORTH_F32};

use crate::error::DspError;

/// Corner frequency of the crossover (Hz)
pub const CROSSOVER_FREQUENCY: f32 = 1000.0;

/// Which side of the crossover a filter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Low,
    High,
}

impl Band {
    /// Generate the second-order coefficients for this band
    fn to_coefficients(self, sample_rate: f32) -> Result<Coefficients<f32>, DspError> {
        let filter_type = match self {
            Band::Low => Type::LowPass,
            Band::High => Type::HighPass,
        };

        Coefficients::<f32>::from_params(
            filter_type,
            sample_rate.hz(),
            CROSSOVER_FREQUENCY.hz(),
            Q_BUTTERWORTH_F32,
        )
        .map_err(|_| DspError::InvalidCoefficients {
            frequency: CROSSOVER_FREQUENCY,
            sample_rate,
        })
    }
}

/// Reject anything that isn't a finite, positive rate before it reaches the
/// `biquad` frequency constructors.
pub(crate) fn validate_sample_rate(sample_rate: f32) -> Result<(), DspError> {
    if sample_rate.is_finite() && sample_rate > 0.0 {
        Ok(())
    } else {
        Err(DspError::InvalidSampleRate(sample_rate))
    }
}

/// Low-pass / high-pass filter pair with per-channel state
///
/// Designed for real-time use: `process_low()` and `process_high()` never
/// allocate. Only `configure()` touches the heap.
pub struct Crossover {
    // DirectForm2Transposed: better numerical stability than DF1
    low: Vec<DirectForm2Transposed<f32>>,
    high: Vec<DirectForm2Transposed<f32>>,
    sample_rate: f32,
}

impl Crossover {
    /// Build a crossover for `channels` channels at `sample_rate`
    pub fn new(sample_rate: f32, channels: usize) -> Result<Self, DspError> {
        let mut crossover = Self {
            low: Vec::new(),
            high: Vec::new(),
            sample_rate,
        };
        crossover.configure(sample_rate, channels)?;
        Ok(crossover)
    }

    /// Recompute coefficients for a new sample rate and clear every delay line
    ///
    /// On error the previous coefficients and filter state are left untouched.
    pub fn configure(&mut self, sample_rate: f32, channels: usize) -> Result<(), DspError> {
        validate_sample_rate(sample_rate)?;

        // Both sets are computed before anything is replaced
        let low_coeffs = Band::Low.to_coefficients(sample_rate)?;
        let high_coeffs = Band::High.to_coefficients(sample_rate)?;

        self.low = (0..channels)
            .map(|_| DirectForm2Transposed::<f32>::new(low_coeffs))
            .collect();
        self.high = (0..channels)
            .map(|_| DirectForm2Transposed::<f32>::new(high_coeffs))
            .collect();
        self.sample_rate = sample_rate;

        Ok(())
    }

    /// Low-pass one channel's samples in place
    ///
    /// # Real-time Safety
    /// No allocations. O(n) where n = buffer length.
    #[inline]
    pub fn process_low(&mut self, channel: usize, buffer: &mut [f32]) -> Result<(), DspError> {
        let channels = self.low.len();
        let filter = self
            .low
            .get_mut(channel)
            .ok_or(DspError::ChannelCountMismatch {
                expected: channels,
                got: channel + 1,
            })?;
        run_filter(filter, buffer);
        Ok(())
    }

    /// High-pass one channel's samples in place
    ///
    /// # Real-time Safety
    /// No allocations. O(n) where n = buffer length.
    #[inline]
    pub fn process_high(&mut self, channel: usize, buffer: &mut [f32]) -> Result<(), DspError> {
        let channels = self.high.len();
        let filter = self
            .high
            .get_mut(channel)
            .ok_or(DspError::ChannelCountMismatch {
                expected: channels,
                got: channel + 1,
            })?;
        run_filter(filter, buffer);
        Ok(())
    }

    /// Number of channels with their own delay state
    pub fn channels(&self) -> usize {
        self.low.len()
    }

    /// Get sample rate
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Reset filter state (clear delay lines) without touching coefficients
    pub fn reset(&mut self) {
        for filter in self.low.iter_mut().chain(self.high.iter_mut()) {
            filter.reset_state();
        }
    }
}

#[inline]
fn run_filter(filter: &mut DirectForm2Transposed<f32>, buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        *sample = filter.run(*sample);
    }
}
