//! Transformer Engine - Main Entry Point
//!
//! The TransformerEngine is what a host wrapper talks to. It owns the DSP
//! processor, the shared parameter store and the stream lifecycle.
//!
//! # Lifecycle
//!
//! ```text
//!   with_config ──▶ (stopped) ──start──▶ (running) ──stop──▶ (stopped)
//!                      │  ▲                 │
//!                   prepare                process / process_into
//!                 (new rate, block size)   (audio thread, once per block)
//! ```
//!
//! `prepare` reallocates scratch buffers and is only allowed while stopped.
//! `process` takes one parameter snapshot per block and never logs,
//! allocates or locks.

use std::sync::Arc;

use lovely_dsp::{ParamId, TransformerProcessor};
use tracing::{debug, info, warn};

use crate::config::{EngineConfig, StreamConfig};
use crate::error::{EngineError, EngineResult};
use crate::shared::SharedParams;

/// Host-facing wrapper around the transformer DSP
pub struct TransformerEngine {
    processor: TransformerProcessor,

    /// Written by the control thread, snapshotted by the audio thread
    params: Arc<SharedParams>,

    /// Current configuration
    config: EngineConfig,

    /// Whether the stream is currently running
    is_running: bool,
}

impl TransformerEngine {
    /// Create a new engine with default configuration
    pub fn new() -> EngineResult<Self> {
        Self::with_config(EngineConfig::default())
    }

    /// Create a new engine with custom configuration
    pub fn with_config(config: EngineConfig) -> EngineResult<Self> {
        config.stream.validate().map_err(|e| {
            warn!("Rejected engine configuration: {}", e);
            EngineError::ConfigError(e)
        })?;

        let processor = TransformerProcessor::with_context(config.stream.to_process_context())?;
        let params = Arc::new(SharedParams::new(config.params));

        info!(
            sample_rate = config.stream.sample_rate,
            channels = config.stream.channels,
            max_block_size = config.stream.max_block_size,
            "Transformer engine created"
        );

        Ok(Self {
            processor,
            params,
            config,
            is_running: false,
        })
    }

    /// Reconfigure for a new stream format (sample rate change etc.)
    ///
    /// Clears all filter and saturation state. Fails with `AlreadyRunning`
    /// while the stream is active; on any error the previous configuration
    /// stays in force.
    pub fn prepare(&mut self, stream: StreamConfig) -> EngineResult<()> {
        if self.is_running {
            warn!("Cannot reconfigure while running");
            return Err(EngineError::AlreadyRunning);
        }

        stream.validate().map_err(|e| {
            warn!("Rejected stream configuration: {}", e);
            EngineError::ConfigError(e)
        })?;

        self.processor.configure(stream.to_process_context())?;

        info!(
            sample_rate = stream.sample_rate,
            channels = stream.channels,
            max_block_size = stream.max_block_size,
            "Transformer engine prepared"
        );
        self.config.stream = stream;
        Ok(())
    }

    /// Convenience for a host that only reports a new sample rate
    pub fn set_sample_rate(&mut self, sample_rate: u32) -> EngineResult<()> {
        let stream = StreamConfig {
            sample_rate,
            ..self.config.stream.clone()
        };
        self.prepare(stream)
    }

    /// Start the stream; processing state starts from silence
    pub fn start(&mut self) -> EngineResult<()> {
        if self.is_running {
            warn!("Engine already running");
            return Err(EngineError::AlreadyRunning);
        }

        self.processor.reset_state();
        self.is_running = true;
        info!("Transformer engine started");
        Ok(())
    }

    /// Stop the stream
    pub fn stop(&mut self) -> EngineResult<()> {
        if !self.is_running {
            return Err(EngineError::NotRunning);
        }

        self.is_running = false;
        info!("Transformer engine stopped");
        Ok(())
    }

    /// Clear saturation history and filter delay lines (e.g. after a gap in the stream)
    pub fn reset_state(&mut self) {
        self.processor.reset_state();
        debug!("Transformer state reset");
    }

    /// Process one block in place
    ///
    /// Channels at index `num_input_channels` and above are silenced.
    ///
    /// # Real-time Safety
    /// No allocations, no locks, no logging.
    #[inline]
    pub fn process(
        &mut self,
        channels: &mut [&mut [f32]],
        num_input_channels: usize,
    ) -> EngineResult<()> {
        if !self.is_running {
            return Err(EngineError::NotRunning);
        }

        let params = self.params.snapshot();
        self.processor.process_block(channels, num_input_channels, &params)?;
        Ok(())
    }

    /// Process one block into a caller-provided output of identical shape
    ///
    /// # Real-time Safety
    /// No allocations, no locks, no logging.
    #[inline]
    pub fn process_into(
        &mut self,
        input: &[&[f32]],
        output: &mut [&mut [f32]],
    ) -> EngineResult<()> {
        if !self.is_running {
            return Err(EngineError::NotRunning);
        }

        let params = self.params.snapshot();
        self.processor.process_block_into(input, output, &params)?;
        Ok(())
    }

    /// Handle for the control thread
    pub fn params(&self) -> Arc<SharedParams> {
        Arc::clone(&self.params)
    }

    /// Set a single parameter (clamped); returns the stored value
    pub fn set_param(&self, param: ParamId, value: f32) -> f32 {
        self.params.set(param, value)
    }

    /// Set a parameter by its stable id (e.g. `"drive"`)
    pub fn set_param_by_id(&self, id: &str, value: f32) -> EngineResult<f32> {
        self.params.set_by_id(id, value)
    }

    /// Check if engine is running
    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// Get current configuration (stream plus the initial parameter values)
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Read-only access to the DSP state (for meters and tests)
    pub fn processor(&self) -> &TransformerProcessor {
        &self.processor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lovely_dsp::{ControlParams, HISTORY_LEN};
    use std::thread;

    fn sine(len: usize, freq: f32, sample_rate: f32) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_engine_creation() {
        let result = TransformerEngine::new();
        assert!(result.is_ok());
    }

    #[test]
    fn test_engine_config() {
        let config = EngineConfig::low_latency();
        let engine = TransformerEngine::with_config(config.clone()).unwrap();
        assert_eq!(engine.config(), &config);
        assert_eq!(
            engine.processor().context(),
            Some(config.stream.to_process_context())
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.stream.sample_rate = 0;
        assert!(matches!(
            TransformerEngine::with_config(config),
            Err(EngineError::ConfigError(_))
        ));
    }

    #[test]
    fn test_engine_not_running_initially() {
        let engine = TransformerEngine::new().unwrap();
        assert!(!engine.is_running());
    }

    #[test]
    fn test_start_stop() {
        let mut engine = TransformerEngine::new().unwrap();

        engine.start().unwrap();
        assert!(engine.is_running());
        assert!(matches!(engine.start(), Err(EngineError::AlreadyRunning)));

        engine.stop().unwrap();
        assert!(!engine.is_running());
        assert!(matches!(engine.stop(), Err(EngineError::NotRunning)));
    }

    #[test]
    fn test_process_requires_running() {
        let mut engine = TransformerEngine::new().unwrap();
        let mut left = vec![0.5_f32; 64];

        let result = engine.process(&mut [left.as_mut_slice()], 1);
        assert!(matches!(result, Err(EngineError::NotRunning)));
        assert!(left.iter().all(|&s| s == 0.5));
    }

    #[test]
    fn test_prepare_rejected_while_running() {
        let mut engine = TransformerEngine::new().unwrap();
        engine.start().unwrap();

        let stream = StreamConfig {
            sample_rate: 96000,
            ..StreamConfig::default()
        };
        assert!(matches!(
            engine.prepare(stream.clone()),
            Err(EngineError::AlreadyRunning)
        ));

        engine.stop().unwrap();
        engine.prepare(stream).unwrap();
        assert_eq!(engine.config().stream.sample_rate, 96000);
    }

    #[test]
    fn test_failed_prepare_keeps_previous_config() {
        let mut engine = TransformerEngine::new().unwrap();

        assert!(engine.set_sample_rate(0).is_err());
        assert_eq!(engine.config().stream.sample_rate, 48000);
        assert_eq!(
            engine.processor().context().map(|ctx| ctx.sample_rate),
            Some(48000.0)
        );
    }

    #[test]
    fn test_prepare_clears_state() {
        let mut engine = TransformerEngine::new().unwrap();
        engine.start().unwrap();

        let mut left = sine(512, 200.0, 48000.0);
        let mut right = sine(512, 200.0, 48000.0);
        engine
            .process(&mut [left.as_mut_slice(), right.as_mut_slice()], 2)
            .unwrap();
        assert!(engine
            .processor()
            .model_for_channel(0)
            .history()
            .iter()
            .any(|&h| h != 0.0));

        engine.stop().unwrap();
        engine.set_sample_rate(44100).unwrap();
        assert_eq!(
            engine.processor().model_for_channel(0).history(),
            [0.0; HISTORY_LEN]
        );
    }

    #[test]
    fn test_silence_after_reset() {
        let mut engine = TransformerEngine::new().unwrap();
        engine.start().unwrap();
        engine.set_param(ParamId::Drive, 10.0);
        engine.set_param(ParamId::EvenHarmonics, 1.0);

        let mut left = sine(512, 80.0, 48000.0);
        let mut right = sine(512, 6000.0, 48000.0);
        engine
            .process(&mut [left.as_mut_slice(), right.as_mut_slice()], 2)
            .unwrap();

        engine.reset_state();

        let mut left = vec![0.0_f32; 512];
        let mut right = vec![0.0_f32; 512];
        engine
            .process(&mut [left.as_mut_slice(), right.as_mut_slice()], 2)
            .unwrap();
        assert!(left.iter().chain(right.iter()).all(|&s| s == 0.0));
    }

    #[test]
    fn test_param_changes_apply_next_block() {
        let mut engine = TransformerEngine::new().unwrap();
        engine.start().unwrap();

        let mut block = sine(256, 440.0, 48000.0);
        engine.process(&mut [block.as_mut_slice()], 1).unwrap();
        assert!(block.iter().any(|&s| s != 0.0));

        // Control thread mutes through its own handle
        let params = engine.params();
        thread::spawn(move || {
            params.set(ParamId::OutputGain, 0.0);
        })
        .join()
        .unwrap();

        let mut block = sine(256, 440.0, 48000.0);
        engine.process(&mut [block.as_mut_slice()], 1).unwrap();
        assert!(block.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_set_param_by_id() {
        let engine = TransformerEngine::new().unwrap();

        assert_eq!(engine.set_param_by_id("drive", 20.0).unwrap(), 10.0);
        assert_eq!(engine.params().get(ParamId::Drive), 10.0);
        assert!(matches!(
            engine.set_param_by_id("tone", 0.5),
            Err(EngineError::UnknownParameter(_))
        ));
    }

    #[test]
    fn test_initial_params_from_config() {
        let config = EngineConfig {
            params: ControlParams {
                drive: 2.5,
                ..ControlParams::default()
            },
            ..EngineConfig::default()
        };
        let engine = TransformerEngine::with_config(config).unwrap();
        assert_eq!(engine.params().snapshot().drive, 2.5);
    }

    #[test]
    fn test_process_into_shape_mismatch() {
        let mut engine = TransformerEngine::new().unwrap();
        engine.start().unwrap();

        let input = sine(128, 440.0, 48000.0);
        let mut output = vec![0.0_f32; 64];
        let result = engine.process_into(&[input.as_slice()], &mut [output.as_mut_slice()]);

        match result {
            Err(EngineError::DspError(err)) => assert!(err.is_shape_mismatch()),
            other => panic!("expected shape mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_process_into_matches_in_place() {
        let input_l = sine(300, 150.0, 48000.0);
        let input_r = sine(300, 1800.0, 48000.0);

        let mut a = TransformerEngine::new().unwrap();
        a.start().unwrap();
        let mut left = input_l.clone();
        let mut right = input_r.clone();
        a.process(&mut [left.as_mut_slice(), right.as_mut_slice()], 2).unwrap();

        let mut b = TransformerEngine::new().unwrap();
        b.start().unwrap();
        let mut out_l = vec![0.0_f32; 300];
        let mut out_r = vec![0.0_f32; 300];
        b.process_into(
            &[input_l.as_slice(), input_r.as_slice()],
            &mut [out_l.as_mut_slice(), out_r.as_mut_slice()],
        )
        .unwrap();

        assert_eq!(left, out_l);
        assert_eq!(right, out_r);
    }
}
