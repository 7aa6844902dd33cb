//! # Desktop Bridge Implementations
//!
//! In-process implementations of the host contracts for desktop embedders
//! (macOS, Windows, Linux) and for tests.
//!
//! ## Overview
//!
//! - `HeapAudioHost` - heap-backed sample buffer factory with an optional
//!   outstanding-buffer limit
//! - `RecordingCallback` - callback sink that records every notification
//! - `DesktopPlatform` - platform services handed to the plugin at load
//! - `MemoryLoggerSink` - log sink keeping entries in memory
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopPlatform, HeapAudioHost, RecordingCallback};
//! use bridge_traits::AudioDecoderCallback;
//! use std::sync::Arc;
//!
//! let host = Arc::new(HeapAudioHost::new());
//! let recorder = Arc::new(RecordingCallback::new());
//! let callback: Arc<dyn AudioDecoderCallback> = recorder.clone();
//!
//! // Pass host + callback to the decoder, then inspect recorder.events()
//! ```

mod callback;
mod host;
mod platform;

pub use callback::{CallbackEvent, RecordingCallback};
pub use host::HeapAudioHost;
pub use platform::{DesktopPlatform, MemoryLoggerSink, DESKTOP_PLATFORM_VERSION};
