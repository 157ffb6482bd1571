//! Lovely Core - Transformer Engine
//!
//! This crate wraps the DSP path for a host (plugin shell, standalone app):
//! - Stream configuration and validation (serde)
//! - Lock-free parameter sharing between control and audio threads
//! - Stream lifecycle: prepare, start, stop, reset
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Control Thread (UI / automation)            │
//! │          SharedParams::set ──▶ AtomicU32 per parameter      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │ snapshot() once per block
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Audio Thread                           │
//! │   Input ──▶ Crossover ──▶ Hysteresis (low/high) ──▶ Mix     │
//! │              (Zero allocation in this path)                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod engine;
mod error;
mod shared;

pub use config::{EngineConfig, StreamConfig};
pub use engine::TransformerEngine;
pub use error::{EngineError, EngineResult};
pub use shared::SharedParams;

// Re-export DSP types for convenience
pub use lovely_dsp::{ControlParams, DspError, ParamId, ProcessContext, TransformerProcessor};
