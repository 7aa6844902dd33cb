//! Result-consuming interface implemented by the host.
//!
//! Every decode call produces exactly one of:
//! - a single [`AudioDecoderCallback::on_error`], or
//! - an optional [`AudioDecoderCallback::on_decoded`] followed by exactly one
//!   [`AudioDecoderCallback::on_input_exhausted`].
//!
//! Reset and drain requests answer with their completion notification, or with
//! `on_error` when the session cannot service them.

use crate::{audio::AudioSamples, platform::PlatformSendSync};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error kinds reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Unsupported codec type or unknown capability name
    InvalidArgument,
    /// Engine or buffer allocation failed
    ResourceExhausted,
    /// The engine rejected the codec configuration
    InitializationFailed,
    /// The engine flagged an error on a given unit, or the session could not decode
    DecodeFailed,
    /// The request is not valid in the session's current state
    Generic,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidArgument => "invalid argument",
            ErrorKind::ResourceExhausted => "resource exhausted",
            ErrorKind::InitializationFailed => "initialization failed",
            ErrorKind::DecodeFailed => "decode failed",
            ErrorKind::Generic => "generic error",
        };
        f.write_str(name)
    }
}

/// Callback sink receiving the decoder's notifications.
///
/// The decoder only holds a weak reference to the sink; the host owns it and
/// must keep it alive for as long as it issues operations on the session.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::callback::{AudioDecoderCallback, ErrorKind};
/// use bridge_traits::audio::AudioSamples;
///
/// struct Sink;
///
/// impl AudioDecoderCallback for Sink {
///     fn on_error(&self, kind: ErrorKind) { eprintln!("decoder error: {kind}"); }
///     fn on_decoded(&self, samples: AudioSamples) { /* queue for playback */ }
///     fn on_input_exhausted(&self) { /* feed the next unit */ }
///     fn on_reset_complete(&self) {}
///     fn on_drain_complete(&self) {}
/// }
/// ```
pub trait AudioDecoderCallback: PlatformSendSync {
    /// An operation failed.
    fn on_error(&self, kind: ErrorKind);

    /// A decoded PCM buffer is ready. Ownership passes to the sink.
    fn on_decoded(&self, samples: AudioSamples);

    /// The decoder has finished with the last input unit and can accept another.
    fn on_input_exhausted(&self);

    /// Internal decoder state was discarded.
    fn on_reset_complete(&self);

    /// All pending output has been delivered.
    fn on_drain_complete(&self);
}
