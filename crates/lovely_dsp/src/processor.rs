//! Transformer Block Processor
//!
//! Orchestrates one block of audio: duplicate each channel into a low and a
//! high band, filter both through the crossover, saturate each band through
//! that channel's hysteresis model at a band-specific drive, then sum the
//! bands and apply output gain.
//!
//! # Real-time Safety Contract
//!
//! `process_block()` and `process_block_into()` follow these rules:
//! - NO heap allocations (scratch buffers are sized in `configure()`)
//! - NO syscalls, NO locks, NO logging
//! - O(n) in block length
//!
//! `configure()` allocates and must only be called while the stream is stopped.

use crate::crossover::{validate_sample_rate, Crossover};
use crate::error::DspError;
use crate::hysteresis::HysteresisModel;
use crate::params::ControlParams;

/// Drive multiplier for the low band (cores saturate first at low frequencies)
pub const LOW_BAND_DRIVE: f32 = 1.5;

/// Drive multiplier for the high band
pub const HIGH_BAND_DRIVE: f32 = 0.5;

/// Magnitudes below this are flushed to zero to keep subnormals out of the chain
const DENORMAL_THRESHOLD: f32 = 1e-20;

/// Stream metadata the processor is configured with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessContext {
    pub sample_rate: f32,
    pub channels: usize,
    /// Largest block the host will hand over in one call
    pub max_block_size: usize,
}

impl ProcessContext {
    pub fn new(sample_rate: f32, channels: usize, max_block_size: usize) -> Self {
        Self {
            sample_rate,
            channels,
            max_block_size,
        }
    }
}

/// Everything that only exists after a successful `configure()`
struct Prepared {
    context: ProcessContext,
    crossover: Crossover,
    low_band: Vec<f32>,
    high_band: Vec<f32>,
}

/// Two-band transformer saturation for up to `channels` channels
///
/// Channel 0 uses the left model, every other channel the right model.
pub struct TransformerProcessor {
    prepared: Option<Prepared>,
    models: [HysteresisModel; 2],
}

impl TransformerProcessor {
    /// Create an unconfigured processor; blocks are refused until `configure()`
    pub fn new() -> Self {
        Self {
            prepared: None,
            models: [HysteresisModel::new(), HysteresisModel::new()],
        }
    }

    /// Create and configure in one step
    pub fn with_context(context: ProcessContext) -> Result<Self, DspError> {
        let mut processor = Self::new();
        processor.configure(context)?;
        Ok(processor)
    }

    /// Prepare for a new sample rate / block size / channel count
    ///
    /// Rebuilds the crossover, sizes the scratch buffers and clears all
    /// saturation history. On error the previous configuration stays in force.
    pub fn configure(&mut self, context: ProcessContext) -> Result<(), DspError> {
        validate_sample_rate(context.sample_rate)?;
        if context.channels == 0 {
            return Err(DspError::InvalidChannelCount(context.channels));
        }
        if context.max_block_size == 0 {
            return Err(DspError::InvalidBlockSize(context.max_block_size));
        }

        let crossover = Crossover::new(context.sample_rate, context.channels)?;

        self.prepared = Some(Prepared {
            context,
            crossover,
            low_band: vec![0.0; context.max_block_size],
            high_band: vec![0.0; context.max_block_size],
        });
        for model in &mut self.models {
            model.reset();
        }

        Ok(())
    }

    /// Clear filter delay lines and saturation history, keeping the configuration
    pub fn reset_state(&mut self) {
        if let Some(prepared) = self.prepared.as_mut() {
            prepared.crossover.reset();
        }
        for model in &mut self.models {
            model.reset();
        }
    }

    /// Process planar channel buffers in place
    ///
    /// Channels at index `num_input_channels` and above have no input and are
    /// overwritten with silence. All channel slices must share one length.
    pub fn process_block(
        &mut self,
        channels: &mut [&mut [f32]],
        num_input_channels: usize,
        params: &ControlParams,
    ) -> Result<(), DspError> {
        let prepared = self.prepared.as_mut().ok_or(DspError::NotConfigured)?;

        let block_len = channels.first().map_or(0, |channel| channel.len());
        if let Some(ragged) = channels.iter().find(|channel| channel.len() != block_len) {
            return Err(DspError::BufferSizeMismatch {
                expected: block_len,
                got: ragged.len(),
            });
        }

        let active = num_input_channels.min(channels.len());
        check_channel_capacity(prepared, active)?;

        apply_params(&mut self.models, params);

        for (index, channel) in channels.iter_mut().enumerate() {
            if index >= active {
                channel.fill(0.0);
                continue;
            }

            let model = &mut self.models[index.min(1)];
            let max_block = prepared.context.max_block_size;
            for chunk in channel.chunks_mut(max_block) {
                load_bands(prepared, chunk);
                render(prepared, model, index, chunk, params)?;
            }
        }

        Ok(())
    }

    /// Process `input` into a caller-provided `output` of identical shape
    pub fn process_block_into(
        &mut self,
        input: &[&[f32]],
        output: &mut [&mut [f32]],
        params: &ControlParams,
    ) -> Result<(), DspError> {
        let prepared = self.prepared.as_mut().ok_or(DspError::NotConfigured)?;

        if input.len() != output.len() {
            return Err(DspError::ChannelCountMismatch {
                expected: input.len(),
                got: output.len(),
            });
        }

        let block_len = input.first().map_or(0, |channel| channel.len());
        let lengths = input
            .iter()
            .map(|channel| channel.len())
            .chain(output.iter().map(|channel| channel.len()));
        for len in lengths {
            if len != block_len {
                return Err(DspError::BufferSizeMismatch {
                    expected: block_len,
                    got: len,
                });
            }
        }

        check_channel_capacity(prepared, input.len())?;

        apply_params(&mut self.models, params);

        let max_block = prepared.context.max_block_size;
        for (index, (source, destination)) in input.iter().zip(output.iter_mut()).enumerate() {
            let model = &mut self.models[index.min(1)];
            for (source_chunk, destination_chunk) in source
                .chunks(max_block)
                .zip(destination.chunks_mut(max_block))
            {
                load_bands(prepared, source_chunk);
                render(prepared, model, index, destination_chunk, params)?;
            }
        }

        Ok(())
    }

    /// Whether `configure()` has succeeded at least once
    pub fn is_configured(&self) -> bool {
        self.prepared.is_some()
    }

    /// Current configuration, if any
    pub fn context(&self) -> Option<ProcessContext> {
        self.prepared.as_ref().map(|prepared| prepared.context)
    }

    /// Saturation model serving `channel` (channels past stereo share the right one)
    pub fn model_for_channel(&self, channel: usize) -> &HysteresisModel {
        &self.models[channel.min(1)]
    }
}

impl Default for TransformerProcessor {
    fn default() -> Self {
        Self::new()
    }
}

fn check_channel_capacity(prepared: &Prepared, channels: usize) -> Result<(), DspError> {
    let capacity = prepared.crossover.channels();
    if channels > capacity {
        return Err(DspError::ChannelCountMismatch {
            expected: capacity,
            got: channels,
        });
    }
    Ok(())
}

/// Snapshot the block's shaping parameters into both models
fn apply_params(models: &mut [HysteresisModel; 2], params: &ControlParams) {
    for model in models.iter_mut() {
        model.set_density_params(params.hysteresis_width, params.asymmetry_skew);
        model.set_harmonics(params.even_harmonics, params.odd_harmonics);
    }
}

/// Copy one chunk of input into both band buffers
#[inline]
fn load_bands(prepared: &mut Prepared, input: &[f32]) {
    let len = input.len();
    prepared.low_band[..len].copy_from_slice(input);
    prepared.high_band[..len].copy_from_slice(input);
}

/// Filter the loaded bands, saturate and mix into `output`
///
/// `output.len()` must not exceed the configured block size.
#[inline]
fn render(
    prepared: &mut Prepared,
    model: &mut HysteresisModel,
    channel: usize,
    output: &mut [f32],
    params: &ControlParams,
) -> Result<(), DspError> {
    let len = output.len();
    let low_band = &mut prepared.low_band[..len];
    let high_band = &mut prepared.high_band[..len];

    prepared.crossover.process_low(channel, low_band)?;
    prepared.crossover.process_high(channel, high_band)?;

    let low_drive = params.drive * LOW_BAND_DRIVE;
    let high_drive = params.drive * HIGH_BAND_DRIVE;

    for ((out, &low), &high) in output.iter_mut().zip(low_band.iter()).zip(high_band.iter()) {
        let saturated_low = model.process(flush_denormal(low), low_drive);
        let saturated_high = model.process(flush_denormal(high), high_drive);
        *out = flush_denormal((saturated_low + saturated_high) * params.output_gain);
    }

    Ok(())
}

#[inline(always)]
fn flush_denormal(x: f32) -> f32 {
    if x.abs() < DENORMAL_THRESHOLD {
        0.0
    } else {
        x
    }
}
