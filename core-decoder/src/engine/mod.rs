//! # Decoding Engine Contract
//!
//! The decode session never performs bitstream decoding itself. It drives an
//! external engine through the [`DecodingEngine`] trait:
//!
//! ```text
//! EngineFactory::open → configure(Pcm16) → init(config) → decode_one* → reset_state* → close
//! ```
//!
//! An engine decodes exactly one access unit per `decode_one` call and keeps
//! at most one frame of latency, so draining a session needs no engine
//! interaction.
//!
//! ## Implementations
//!
//! | Engine | Backend | Feature Flag |
//! |--------|---------|--------------|
//! | [`SymphoniaAacEngine`] | `symphonia-codec-aac` (pure Rust) | `engine-symphonia` |
//!
//! Hosts with their own decoder (a hardware codec, a system library) implement
//! [`EngineFactory`] and [`DecodingEngine`] and pass the factory to
//! [`plugin_init_with_engine`](crate::plugin::plugin_init_with_engine).

use bridge_traits::platform::{PlatformSend, PlatformSendSync};
use thiserror::Error;

#[cfg(feature = "engine-symphonia")]
mod aac_config;

#[cfg(feature = "engine-symphonia")]
mod sample_converter;

#[cfg(feature = "engine-symphonia")]
mod symphonia;

#[cfg(feature = "engine-symphonia")]
pub use self::symphonia::{SymphoniaAacEngine, SymphoniaEngineFactory};

#[cfg(feature = "engine-symphonia")]
pub use aac_config::{AdtsHeader, AudioSpecificConfig};

#[cfg(feature = "engine-symphonia")]
pub use sample_converter::SampleConverter;

/// Errors reported by a decoding engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine instance could not be allocated.
    #[error("Engine allocation failed: {0}")]
    OpenFailed(String),

    /// The requested output format is not produced by this engine.
    #[error("Unsupported output format: {0:?}")]
    UnsupportedOutput(OutputFormat),

    /// The decoder-specific configuration was rejected.
    #[error("Invalid decoder configuration: {0}")]
    InvalidConfig(String),

    /// `decode_one` was called before a successful `init`.
    #[error("Engine not initialized")]
    NotInitialized,

    /// The engine flagged an error while decoding an access unit.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// PCM output formats an engine can be asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Interleaved signed 16-bit integers
    Pcm16,
    /// Interleaved 32-bit floats
    Float32,
}

/// Stream parameters negotiated by `init`.
///
/// Both fields are zero when the engine deferred discovery to the first
/// access unit (empty decoder-specific configuration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamParams {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of interleaved channels
    pub channels: u8,
}

impl StreamParams {
    pub fn new(sample_rate: u32, channels: u8) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }

    /// Returns `true` once the engine has reported real stream parameters.
    pub fn is_known(&self) -> bool {
        self.sample_rate > 0 && self.channels > 0
    }
}

/// Output of one `decode_one` call.
///
/// `pcm` is borrowed from the engine and only valid until the next call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame<'a> {
    /// Interleaved PCM produced for this unit. May be longer than
    /// `sample_count`; only the first `sample_count` samples are valid.
    pub pcm: &'a [i16],
    /// Total decoded samples across all channels. Zero while the engine is
    /// priming.
    pub sample_count: usize,
    /// Channel count of the decoded audio
    pub channels: u8,
    /// Sample rate of the decoded audio in Hz
    pub sample_rate: u32,
    /// Input bytes consumed from the access unit
    pub bytes_consumed: usize,
}

impl<'a> DecodedFrame<'a> {
    /// A frame that produced no output (priming or buffering).
    pub fn empty(bytes_consumed: usize) -> Self {
        Self {
            pcm: &[],
            sample_count: 0,
            channels: 0,
            sample_rate: 0,
            bytes_consumed,
        }
    }
}

/// A single-frame decoding engine instance, exclusively owned by one session.
pub trait DecodingEngine: PlatformSend {
    /// Select the PCM output format. Called once, before `init`.
    fn configure(&mut self, format: OutputFormat) -> EngineResult<()>;

    /// Initialise the engine with decoder-specific configuration bytes.
    ///
    /// An empty slice asks the engine to derive the configuration from the
    /// first access unit, if it supports that.
    fn init(&mut self, config: &[u8]) -> EngineResult<StreamParams>;

    /// Decode exactly one access unit.
    fn decode_one(&mut self, input: &[u8]) -> EngineResult<DecodedFrame<'_>>;

    /// Discard internal decode state (after a seek) without reallocating.
    fn reset_state(&mut self);

    /// Release the engine instance.
    fn close(self: Box<Self>);
}

/// Allocates decoding engine instances.
pub trait EngineFactory: PlatformSendSync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Allocate a fresh, unconfigured engine.
    fn open(&self) -> EngineResult<Box<dyn DecodingEngine>>;
}

/// Engine factory used when the host does not provide one.
#[cfg(feature = "engine-symphonia")]
pub fn default_engine_factory() -> Option<std::sync::Arc<dyn EngineFactory>> {
    Some(std::sync::Arc::new(SymphoniaEngineFactory))
}

#[cfg(not(feature = "engine-symphonia"))]
pub fn default_engine_factory() -> Option<std::sync::Arc<dyn EngineFactory>> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_params_known() {
        assert!(!StreamParams::default().is_known());
        assert!(!StreamParams::new(44100, 0).is_known());
        assert!(StreamParams::new(48000, 2).is_known());
    }

    #[test]
    fn test_empty_frame_has_no_samples() {
        let frame = DecodedFrame::empty(17);
        assert_eq!(frame.sample_count, 0);
        assert!(frame.pcm.is_empty());
        assert_eq!(frame.bytes_consumed, 17);
    }
}
