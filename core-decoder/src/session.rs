//! # Decode Session
//!
//! One [`DecodeSession`] covers a single stream from `init_decode` to
//! `decoding_complete`.
//!
//! ## State Machine
//!
//! ```text
//!                 init_decode
//! Uninitialized ──────────────► Initializing ──ok──► Ready ◄─┐ decode / reset / drain
//!                                    │                 │    ─┘
//!                                    └──err──► Faulted │
//!                                                 │    │
//!                          decoding_complete ─────┴────┴──► Closed
//! ```
//!
//! The engine instance lives inside the `Ready` state, so it exists exactly
//! when the session is ready. Every other state rejects decode, reset and
//! drain with an error notification and never reaches the engine.
//!
//! ## Notifications
//!
//! Each entry point reports its outcome through the host callback before
//! returning:
//!
//! | Operation | Success | Failure |
//! |-----------|---------|---------|
//! | `init_decode` | none | `on_error` |
//! | `decode` | `on_decoded`?, `on_input_exhausted` | `on_error` |
//! | `reset` | `on_reset_complete` | `on_error` |
//! | `drain` | `on_drain_complete` | `on_error` |
//!
//! The encoded unit passed to `decode` is always handed back to the host
//! through [`AudioHost::release_samples`], after `on_decoded` and before
//! `on_input_exhausted` or `on_error`.

use crate::engine::{
    DecodingEngine, EngineFactory, EngineResult, OutputFormat, StreamParams,
};
use crate::error::{DecoderError, Operation, Result};
use crate::pipeline::FramePipeline;
use crate::registry::HostContext;
use bridge_traits::platform::PlatformSend;
use bridge_traits::{
    AudioCodecType, AudioDecoderCallback, AudioHost, CodecSettings, EncodedUnit, SampleFormat,
};
use core_runtime::config::DecoderSettings;
use std::mem;
use std::sync::{Arc, Weak};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Operations a host can issue against a decode session.
pub trait AudioDecoderApi: PlatformSend {
    /// Configure the session for a stream. Only valid once, on a fresh session.
    fn init_decode(&mut self, settings: &CodecSettings);

    /// Decode one encoded access unit.
    fn decode(&mut self, unit: EncodedUnit);

    /// Discard decoder state after a seek.
    fn reset(&mut self);

    /// Signal end of stream.
    fn drain(&mut self);

    /// Current lifecycle state.
    fn state(&self) -> SessionState;

    /// Release the engine and the session itself.
    fn decoding_complete(self: Box<Self>);
}

/// Observable lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    Uninitialized,
    Initializing,
    Ready,
    Faulted,
    Closed,
}

struct ActiveDecoder {
    engine: Box<dyn DecodingEngine>,
    negotiated: StreamParams,
}

enum Lifecycle {
    Uninitialized,
    Initializing,
    Ready(ActiveDecoder),
    Faulted,
    Closed,
}

/// AAC decode session driving one engine instance.
pub struct DecodeSession {
    id: Uuid,
    lifecycle: Lifecycle,
    host: Arc<dyn AudioHost>,
    callback: Weak<dyn AudioDecoderCallback>,
    engines: Arc<dyn EngineFactory>,
    settings: DecoderSettings,
}

impl DecodeSession {
    /// Create an uninitialised session. No engine is allocated until
    /// [`AudioDecoderApi::init_decode`].
    pub fn new(
        context: HostContext,
        engines: Arc<dyn EngineFactory>,
        settings: DecoderSettings,
    ) -> Self {
        let id = Uuid::new_v4();
        debug!(session = %id, engine = engines.name(), "Decode session created");

        Self {
            id,
            lifecycle: Lifecycle::Uninitialized,
            host: context.host,
            callback: context.callback,
            engines,
            settings,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Channel count and sample rate reported by the engine at init.
    ///
    /// `None` unless the session is ready. Both values are zero when the
    /// engine deferred configuration to the first access unit.
    pub fn negotiated_format(&self) -> Option<StreamParams> {
        match &self.lifecycle {
            Lifecycle::Ready(active) => Some(active.negotiated),
            _ => None,
        }
    }

    /// Release the engine in place. The session stays addressable in
    /// [`SessionState::Closed`] and rejects every further operation.
    pub fn close(&mut self) {
        self.teardown();
    }

    fn open_engine(&self, codec: &CodecSettings) -> Result<ActiveDecoder> {
        if codec.codec != AudioCodecType::Aac {
            return Err(DecoderError::UnsupportedCodec(format!("{:?}", codec.codec)));
        }

        if !codec.has_extra_data() && !self.settings.allow_deferred_config {
            return Err(DecoderError::DeferredConfigDisabled);
        }

        let mut engine = self
            .engines
            .open()
            .map_err(DecoderError::EngineUnavailable)?;

        match configure_engine(engine.as_mut(), &codec.extra_data) {
            Ok(negotiated) => Ok(ActiveDecoder { engine, negotiated }),
            Err(err) => {
                engine.close();
                Err(DecoderError::InitializationFailed(err))
            }
        }
    }

    fn ready_mut(&mut self, operation: Operation) -> Result<&mut ActiveDecoder> {
        let state = self.state();
        match &mut self.lifecycle {
            Lifecycle::Ready(active) => Ok(active),
            _ => Err(DecoderError::NotReady { operation, state }),
        }
    }

    // notify and report only run inside the operation spans, which carry
    // the session id
    fn notify(&self, f: impl FnOnce(&dyn AudioDecoderCallback)) {
        match self.callback.upgrade() {
            Some(callback) => f(callback.as_ref()),
            None => warn!("Callback sink dropped, notification discarded"),
        }
    }

    fn report(&self, err: &DecoderError) {
        let kind = err.kind();
        warn!(error = %err, ?kind, "Reporting decoder error");
        self.notify(|callback| callback.on_error(kind));
    }

    fn teardown(&mut self) {
        match mem::replace(&mut self.lifecycle, Lifecycle::Closed) {
            Lifecycle::Ready(active) => {
                active.engine.close();
                debug!(session = %self.id, "Engine released");
            }
            Lifecycle::Closed => {}
            _ => debug!(session = %self.id, "Session closed without an engine"),
        }
    }
}

fn configure_engine(engine: &mut dyn DecodingEngine, config: &[u8]) -> EngineResult<StreamParams> {
    engine.configure(OutputFormat::Pcm16)?;
    engine.init(config)
}

impl AudioDecoderApi for DecodeSession {
    #[instrument(skip(self, settings), fields(session = %self.id, codec = ?settings.codec))]
    fn init_decode(&mut self, settings: &CodecSettings) {
        if !matches!(self.lifecycle, Lifecycle::Uninitialized) {
            let err = DecoderError::NotReady {
                operation: Operation::Init,
                state: self.state(),
            };
            self.report(&err);
            return;
        }

        self.lifecycle = Lifecycle::Initializing;

        match self.open_engine(settings) {
            Ok(active) => {
                info!(
                    sample_rate = active.negotiated.sample_rate,
                    channels = active.negotiated.channels,
                    deferred = !active.negotiated.is_known(),
                    "Decoder ready"
                );
                self.lifecycle = Lifecycle::Ready(active);
            }
            Err(err) => {
                error!(error = %err, "Decoder initialization failed");
                self.lifecycle = Lifecycle::Faulted;
                self.report(&err);
            }
        }
    }

    #[instrument(
        skip(self, unit),
        fields(session = %self.id, timestamp = unit.timestamp(), len = unit.len())
    )]
    fn decode(&mut self, unit: EncodedUnit) {
        debug_assert_eq!(unit.format(), SampleFormat::Encoded);

        let state = self.state();
        let result = match &mut self.lifecycle {
            Lifecycle::Ready(active) => FramePipeline::new(self.host.as_ref(), &self.settings)
                .run(active.engine.as_mut(), &unit),
            _ => Err(DecoderError::NotReady {
                operation: Operation::Decode,
                state,
            }),
        };

        match result {
            Ok(decoded) => {
                if let Some(samples) = decoded {
                    self.notify(|callback| callback.on_decoded(samples));
                }
                self.host.release_samples(unit);
                self.notify(|callback| callback.on_input_exhausted());
            }
            Err(err) => {
                self.host.release_samples(unit);
                self.report(&err);
            }
        }
    }

    #[instrument(skip(self), fields(session = %self.id))]
    fn reset(&mut self) {
        let outcome = self
            .ready_mut(Operation::Reset)
            .map(|active| active.engine.reset_state());

        match outcome {
            Ok(()) => {
                debug!("Engine state reset");
                self.notify(|callback| callback.on_reset_complete());
            }
            Err(err) => self.report(&err),
        }
    }

    #[instrument(skip(self), fields(session = %self.id))]
    fn drain(&mut self) {
        // Single-frame engine: nothing is buffered between calls
        match self.ready_mut(Operation::Drain).map(|_| ()) {
            Ok(()) => {
                debug!("Drain complete");
                self.notify(|callback| callback.on_drain_complete());
            }
            Err(err) => self.report(&err),
        }
    }

    fn state(&self) -> SessionState {
        match self.lifecycle {
            Lifecycle::Uninitialized => SessionState::Uninitialized,
            Lifecycle::Initializing => SessionState::Initializing,
            Lifecycle::Ready(_) => SessionState::Ready,
            Lifecycle::Faulted => SessionState::Faulted,
            Lifecycle::Closed => SessionState::Closed,
        }
    }

    fn decoding_complete(mut self: Box<Self>) {
        info!(session = %self.id, state = ?self.state(), "Decoding complete");
        self.teardown();
    }
}

impl Drop for DecodeSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
