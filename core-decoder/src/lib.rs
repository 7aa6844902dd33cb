//! # Core Decoder Module
//!
//! Streaming AAC decoder adapter: turns encoded access units delivered by a
//! host into interleaved 16-bit PCM, one unit per call.
//!
//! ## Overview
//!
//! - [`session`] - per-stream state machine (init, decode, reset, drain, close)
//! - [`pipeline`] - the per-call decode step and output buffer sizing
//! - [`engine`] - the decoding engine contract and the Symphonia AAC engine
//! - [`registry`] - capability lookup for the plugin surface
//! - [`plugin`] - process-wide entry points
//!
//! ## Usage
//!
//! ```ignore
//! use core_decoder::{plugin, HostContext, AUDIO_DECODER_CAPABILITY};
//! use bridge_traits::{CodecSettings, EncodedUnit};
//!
//! plugin::plugin_init(config)?;
//!
//! let mut session = plugin::plugin_get_api(
//!     AUDIO_DECODER_CAPABILITY,
//!     HostContext::new(host, &callback),
//! )?;
//!
//! session.init_decode(&CodecSettings::aac(esds_config));
//! session.decode(EncodedUnit::new(access_unit, pts));
//! // callback receives on_decoded + on_input_exhausted
//!
//! session.decoding_complete();
//! ```

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod plugin;
pub mod registry;
pub mod session;

pub use engine::{
    DecodedFrame, DecodingEngine, EngineError, EngineFactory, OutputFormat, StreamParams,
};
pub use error::{DecoderError, Operation, Result};
pub use pipeline::output_size_bytes;
pub use registry::{CapabilityRegistry, HostContext, AUDIO_DECODER_CAPABILITY};
pub use session::{AudioDecoderApi, DecodeSession, SessionState};
