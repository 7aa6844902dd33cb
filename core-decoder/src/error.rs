//! # Decoder Error Types
//!
//! Every failure inside the decoder is a [`DecoderError`]. The host only ever
//! sees the coarse [`ErrorKind`] delivered through its callback; the full
//! error is logged.

use crate::engine::EngineError;
use crate::session::SessionState;
use bridge_traits::{BridgeError, ErrorKind};
use std::fmt;
use thiserror::Error;

/// Session operations that can be rejected by the state guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Init,
    Decode,
    Reset,
    Drain,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Init => "init_decode",
            Operation::Decode => "decode",
            Operation::Reset => "reset",
            Operation::Drain => "drain",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while serving a decode session.
#[derive(Error, Debug)]
pub enum DecoderError {
    // ========================================================================
    // Initialisation Errors
    // ========================================================================
    /// The host requested a codec other than AAC.
    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),

    /// The host requested a capability this plugin does not provide.
    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    /// No engine instance could be allocated.
    #[error("Decoding engine unavailable: {0}")]
    EngineUnavailable(EngineError),

    /// The engine rejected its output format or configuration.
    #[error("Decoder initialization failed: {0}")]
    InitializationFailed(EngineError),

    /// Empty configuration while deferred configuration is disabled.
    #[error("Decoder configuration is empty and deferred configuration is disabled")]
    DeferredConfigDisabled,

    // ========================================================================
    // State Errors
    // ========================================================================
    /// Operation invoked in a state that does not permit it.
    #[error("{operation} not permitted in state {state:?}")]
    NotReady {
        operation: Operation,
        state: SessionState,
    },

    // ========================================================================
    // Decoding Errors
    // ========================================================================
    /// The engine flagged an error for an access unit.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// The engine left part of the access unit unconsumed.
    #[error("Engine consumed {consumed} of {available} input bytes")]
    PartialConsumption { consumed: usize, available: usize },

    /// The engine reported output that cannot describe valid PCM.
    #[error("Invalid decoded frame: {0}")]
    InvalidFrame(String),

    /// The host could not provide an output buffer.
    #[error("Output buffer allocation failed: {0}")]
    BufferAllocation(BridgeError),

    // ========================================================================
    // Plugin Errors
    // ========================================================================
    #[error("Decoder plugin not initialized")]
    PluginNotInitialized,

    #[error("Decoder plugin already initialized")]
    PluginAlreadyInitialized,

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),
}

impl DecoderError {
    /// The error kind reported to the host.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DecoderError::UnsupportedCodec(_)
            | DecoderError::UnknownCapability(_)
            | DecoderError::Config(_) => ErrorKind::InvalidArgument,

            DecoderError::EngineUnavailable(_) => ErrorKind::ResourceExhausted,

            DecoderError::InitializationFailed(_) | DecoderError::DeferredConfigDisabled => {
                ErrorKind::InitializationFailed
            }

            DecoderError::NotReady { operation, .. } => match operation {
                Operation::Decode => ErrorKind::DecodeFailed,
                _ => ErrorKind::Generic,
            },

            DecoderError::Engine(_)
            | DecoderError::PartialConsumption { .. }
            | DecoderError::InvalidFrame(_)
            | DecoderError::BufferAllocation(_) => ErrorKind::DecodeFailed,

            DecoderError::PluginNotInitialized | DecoderError::PluginAlreadyInitialized => {
                ErrorKind::Generic
            }
        }
    }
}

/// Result type for decoder operations.
pub type Result<T> = std::result::Result<T, DecoderError>;
