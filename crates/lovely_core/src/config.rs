//! Engine and Stream Configuration

use lovely_dsp::{ControlParams, ProcessContext};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Audio stream configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Sample rate in Hz (e.g., 44100, 48000, 96000)
    pub sample_rate: u32,

    /// Number of audio channels (1 = mono, 2 = stereo)
    pub channels: u16,

    /// Largest block the host will deliver, in frames. Scratch buffers are
    /// sized from this once, never in the audio callback.
    pub max_block_size: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channels: 2,
            max_block_size: 512,
        }
    }
}

impl StreamConfig {
    /// Calculate latency in milliseconds for one full block
    pub fn latency_ms(&self) -> f32 {
        (self.max_block_size as f32 / self.sample_rate as f32) * 1000.0
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate < 8000 || self.sample_rate > 192000 {
            return Err(format!("Invalid sample rate: {}", self.sample_rate));
        }
        if self.channels == 0 || self.channels > 8 {
            return Err(format!("Invalid channel count: {}", self.channels));
        }
        if self.max_block_size < 16 || self.max_block_size > 8192 {
            return Err(format!("Invalid block size: {}", self.max_block_size));
        }
        Ok(())
    }

    /// Only mono-in/mono-out and stereo-in/stereo-out layouts are offered to hosts
    pub fn is_layout_supported(input_channels: u16, output_channels: u16) -> bool {
        matches!(output_channels, 1 | 2) && input_channels == output_channels
    }

    /// Convert to the DSP crate's processing context
    pub fn to_process_context(&self) -> ProcessContext {
        ProcessContext::new(
            self.sample_rate as f32,
            self.channels as usize,
            self.max_block_size as usize,
        )
    }
}

/// Overall engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Stream configuration
    pub stream: StreamConfig,

    /// Initial control values
    #[serde(default)]
    pub params: ControlParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stream: StreamConfig::default(),
            params: ControlParams::default(),
        }
    }
}

impl EngineConfig {
    /// Create config optimized for low latency
    pub fn low_latency() -> Self {
        Self {
            stream: StreamConfig {
                sample_rate: 48000,
                channels: 2,
                max_block_size: 128, // ~2.6ms latency
            },
            params: ControlParams::default(),
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> EngineResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.stream.validate().map_err(EngineError::ConfigError)?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StreamConfig::default();
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.channels, 2);
        assert_eq!(config.max_block_size, 512);
    }

    #[test]
    fn test_latency_calculation() {
        let config = StreamConfig {
            sample_rate: 48000,
            channels: 2,
            max_block_size: 480, // Exactly 10ms at 48kHz
        };
        let latency = config.latency_ms();
        assert!((latency - 10.0).abs() < 0.01);
    }

    #[test]
    fn test_validation() {
        let valid = StreamConfig::default();
        assert!(valid.validate().is_ok());

        let invalid_rate = StreamConfig {
            sample_rate: 0,
            ..Default::default()
        };
        assert!(invalid_rate.validate().is_err());

        let invalid_channels = StreamConfig {
            channels: 0,
            ..Default::default()
        };
        assert!(invalid_channels.validate().is_err());

        let invalid_block = StreamConfig {
            max_block_size: 10,
            ..Default::default()
        };
        assert!(invalid_block.validate().is_err());
    }

    #[test]
    fn test_layout_support() {
        assert!(StreamConfig::is_layout_supported(1, 1));
        assert!(StreamConfig::is_layout_supported(2, 2));
        assert!(!StreamConfig::is_layout_supported(1, 2));
        assert!(!StreamConfig::is_layout_supported(6, 6));
        assert!(!StreamConfig::is_layout_supported(0, 0));
    }

    #[test]
    fn test_process_context_conversion() {
        let ctx = StreamConfig::default().to_process_context();
        assert_eq!(ctx.sample_rate, 48000.0);
        assert_eq!(ctx.channels, 2);
        assert_eq!(ctx.max_block_size, 512);
    }

    #[test]
    fn test_config_serialization() {
        let mut config = EngineConfig::low_latency();
        config.params.drive = 3.5;

        let json = config.to_json().unwrap();
        let deserialized = EngineConfig::from_json(&json).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_params_use_defaults() {
        let json = r#"{
            "stream": { "sample_rate": 44100, "channels": 1, "max_block_size": 256 }
        }"#;

        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.stream.sample_rate, 44100);
        assert_eq!(config.params, ControlParams::default());
    }

    #[test]
    fn test_invalid_json_config_rejected() {
        let json = r#"{
            "stream": { "sample_rate": 0, "channels": 2, "max_block_size": 512 }
        }"#;
        assert!(matches!(
            EngineConfig::from_json(json),
            Err(EngineError::ConfigError(_))
        ));

        assert!(matches!(
            EngineConfig::from_json("{ not json"),
            Err(EngineError::ParseError(_))
        ));
    }
}
