//! # Host Bridge Traits
//!
//! Contracts between the AAC decoder core and the host media pipeline.
//!
//! ## Overview
//!
//! The host delivers encoded access units one at a time and receives decoded
//! PCM through a callback sink. Everything the decoder needs from the host is
//! expressed as a trait in this crate so the core can be driven by any media
//! pipeline (a browser plugin host, a desktop player, or a test harness).
//!
//! ## Traits
//!
//! ### Per-session
//! - [`AudioHost`](host::AudioHost) - Allocates output sample buffers and takes back consumed input
//! - [`AudioDecoderCallback`](callback::AudioDecoderCallback) - Receives decoded output, errors and completion signals
//!
//! ### Process-wide
//! - [`PlatformApi`](host::PlatformApi) - Platform services handed over when the plugin is loaded
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Data Types
//!
//! - [`CodecSettings`](audio::CodecSettings) - Codec tag plus decoder-specific configuration bytes
//! - [`EncodedUnit`](audio::EncodedUnit) - One encoded access unit with its presentation timestamp
//! - [`AudioSamples`](audio::AudioSamples) - Host-allocated PCM output buffer
//!
//! ## Error Handling
//!
//! Host implementations report failures with [`BridgeError`](error::BridgeError).
//! The decoder never surfaces `BridgeError` directly to the host; it folds
//! bridge failures into the [`ErrorKind`](callback::ErrorKind) taxonomy
//! delivered through `on_error`.
//!
//! ## Thread Safety
//!
//! Host-facing traits require `Send + Sync` on native targets (see
//! [`platform`]) so a session can be moved between host threads between calls.

pub mod audio;
pub mod callback;
pub mod error;
pub mod host;
pub mod log;
pub mod platform;

pub use error::BridgeError;

// Re-export commonly used types
pub use audio::{AudioCodecType, AudioSamples, CodecSettings, EncodedUnit, SampleFormat};
pub use callback::{AudioDecoderCallback, ErrorKind};
pub use host::{AudioHost, PlatformApi};
pub use log::{LogEntry, LogLevel, LoggerSink};
