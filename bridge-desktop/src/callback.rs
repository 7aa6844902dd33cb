//! Recording Callback Sink

use bridge_traits::{AudioDecoderCallback, AudioSamples, ErrorKind};
use parking_lot::Mutex;

/// One notification received from a decode session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackEvent {
    Error(ErrorKind),
    Decoded(AudioSamples),
    InputExhausted,
    ResetComplete,
    DrainComplete,
}

impl CallbackEvent {
    pub fn is_error(&self) -> bool {
        matches!(self, CallbackEvent::Error(_))
    }
}

/// [`AudioDecoderCallback`] that records every notification in arrival order.
///
/// Useful for embedders that poll for output instead of reacting inside the
/// callback, and for asserting notification order in tests.
#[derive(Debug, Default)]
pub struct RecordingCallback {
    events: Mutex<Vec<CallbackEvent>>,
}

impl RecordingCallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events.
    pub fn events(&self) -> Vec<CallbackEvent> {
        self.events.lock().clone()
    }

    /// Remove and return all recorded events.
    pub fn take(&self) -> Vec<CallbackEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Error kinds received so far.
    pub fn errors(&self) -> Vec<ErrorKind> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                CallbackEvent::Error(kind) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    /// Decoded buffers received so far.
    pub fn decoded(&self) -> Vec<AudioSamples> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                CallbackEvent::Decoded(samples) => Some(samples.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: CallbackEvent) {
        self.events.lock().push(event);
    }
}

impl AudioDecoderCallback for RecordingCallback {
    fn on_error(&self, kind: ErrorKind) {
        self.push(CallbackEvent::Error(kind));
    }

    fn on_decoded(&self, samples: AudioSamples) {
        self.push(CallbackEvent::Decoded(samples));
    }

    fn on_input_exhausted(&self) {
        self.push(CallbackEvent::InputExhausted);
    }

    fn on_reset_complete(&self) {
        self.push(CallbackEvent::ResetComplete);
    }

    fn on_drain_complete(&self) {
        self.push(CallbackEvent::DrainComplete);
    }
}
